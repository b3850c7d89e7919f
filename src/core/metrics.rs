use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::core::config::Settings;

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub(crate) fn init(settings: &Settings) -> anyhow::Result<()> {
    if !settings.telemetry().prometheus_enabled || PROM_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = PROM_HANDLE.set(handle);
    Ok(())
}

pub(crate) fn render() -> Option<String> {
    PROM_HANDLE.get().map(|handle| handle.render())
}

/// Domain counters; no-ops until a recorder is installed.
pub(crate) fn record_login(success: bool) {
    let outcome = if success { "success" } else { "failure" };
    metrics::counter!("auth_login_total", "outcome" => outcome).increment(1);
}

pub(crate) fn record_grade_assigned() {
    metrics::counter!("grades_assigned_total").increment(1);
}

pub(crate) fn record_exam_registration() {
    metrics::counter!("exam_registrations_total").increment(1);
}

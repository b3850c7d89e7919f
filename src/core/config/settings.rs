use super::parsing::{
    env_optional, env_or_default, parse_algorithm, parse_bool, parse_cors_origins,
    parse_environment, parse_u16, parse_u32, parse_u64,
};
use super::secret::load_or_create_secret_key;
use super::types::{
    AdminSettings, ApiSettings, ConfigError, CorsSettings, DatabaseSettings, RuntimeSettings,
    SecuritySettings, ServerHost, ServerPort, ServerSettings, Settings, TelemetrySettings,
};

impl Settings {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let host = env_or_default("TRANSCRIPTS_HOST", "0.0.0.0");
        let port = env_or_default("TRANSCRIPTS_PORT", "8000");

        let environment = parse_environment(
            env_optional("TRANSCRIPTS_ENV").or_else(|| env_optional("ENVIRONMENT")),
        );
        let strict_config = env_optional("TRANSCRIPTS_STRICT_CONFIG")
            .map(|value| parse_bool(&value))
            .unwrap_or(false)
            || environment.is_production();

        let project_name = env_or_default("PROJECT_NAME", "Exam Transcripts API");
        let version = env_or_default("VERSION", env!("CARGO_PKG_VERSION"));

        let (secret_key, secret_key_generated) = match env_optional("SECRET_KEY") {
            Some(value) => (value, false),
            None => (load_or_create_secret_key(), true),
        };
        let access_token_expire_minutes = parse_u64(
            "ACCESS_TOKEN_EXPIRE_MINUTES",
            env_or_default("ACCESS_TOKEN_EXPIRE_MINUTES", "30"),
        )?;
        let algorithm = parse_algorithm(env_or_default("ALGORITHM", "HS256"))?;

        let cors_origins = parse_cors_origins(env_optional("ALLOWED_ORIGINS"))?;

        let postgres_server = env_or_default("POSTGRES_SERVER", "localhost");
        let postgres_port = parse_u16("POSTGRES_PORT", env_or_default("POSTGRES_PORT", "5432"))?;
        let postgres_user = env_or_default("POSTGRES_USER", "transcripts");
        let postgres_password = env_or_default("POSTGRES_PASSWORD", "");
        let postgres_db = env_or_default("POSTGRES_DB", "exam_transcripts");
        let database_url = env_optional("DATABASE_URL");
        let max_connections =
            parse_u32("DB_MAX_CONNECTIONS", env_or_default("DB_MAX_CONNECTIONS", "30"))?;

        let first_superuser_email =
            env_or_default("FIRST_SUPERUSER_EMAIL", "admin@transcripts.local");
        let first_superuser_password = env_or_default("FIRST_SUPERUSER_PASSWORD", "");

        let log_level = env_or_default("TRANSCRIPTS_LOG_LEVEL", "info");
        let json = env_optional("TRANSCRIPTS_LOG_JSON").map(|value| parse_bool(&value)).unwrap_or(false);
        let prometheus_enabled =
            env_optional("PROMETHEUS_ENABLED").map(|value| parse_bool(&value)).unwrap_or(false);

        let settings = Self {
            server: ServerSettings { host: ServerHost::parse(host)?, port: ServerPort::parse(port)? },
            runtime: RuntimeSettings { environment, strict_config },
            api: ApiSettings { project_name, version },
            security: SecuritySettings {
                secret_key,
                secret_key_generated,
                access_token_expire_minutes,
                algorithm,
            },
            cors: CorsSettings { origins: cors_origins },
            database: DatabaseSettings {
                postgres_server,
                postgres_port,
                postgres_user,
                postgres_password,
                postgres_db,
                database_url,
                max_connections,
            },
            admin: AdminSettings { first_superuser_email, first_superuser_password },
            telemetry: TelemetrySettings { log_level, json, prometheus_enabled },
        };

        settings.validate()?;

        Ok(settings)
    }

    pub(crate) fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host.0, self.server.port.0)
    }

    pub(crate) fn server_host(&self) -> &str {
        &self.server.host.0
    }

    pub(crate) fn server_port(&self) -> u16 {
        self.server.port.0
    }

    pub(crate) fn api(&self) -> &ApiSettings {
        &self.api
    }

    pub(crate) fn security(&self) -> &SecuritySettings {
        &self.security
    }

    pub(crate) fn cors(&self) -> &CorsSettings {
        &self.cors
    }

    pub(crate) fn database(&self) -> &DatabaseSettings {
        &self.database
    }

    pub(crate) fn admin(&self) -> &AdminSettings {
        &self.admin
    }

    pub(crate) fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    pub(crate) fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.security.access_token_expire_minutes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "ACCESS_TOKEN_EXPIRE_MINUTES",
                value: String::from("0"),
            });
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                field: "DB_MAX_CONNECTIONS",
                value: String::from("0"),
            });
        }

        if !self.runtime.strict_config {
            return Ok(());
        }

        if self.security.secret_key_generated {
            return Err(ConfigError::MissingSecret("SECRET_KEY"));
        }

        if self.database.database_url.is_none() && self.database.postgres_password.is_empty() {
            return Err(ConfigError::MissingSecret("POSTGRES_PASSWORD"));
        }

        if self.admin.first_superuser_password.is_empty() {
            return Err(ConfigError::MissingSecret("FIRST_SUPERUSER_PASSWORD"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    #[tokio::test]
    async fn load_uses_defaults_for_optional_values() {
        let _guard = test_support::env_lock().await;
        test_support::set_test_env();
        std::env::remove_var("ACCESS_TOKEN_EXPIRE_MINUTES");
        std::env::remove_var("TRANSCRIPTS_PORT");

        let settings = Settings::load().expect("settings");

        assert_eq!(settings.security().access_token_expire_minutes, 30);
        assert_eq!(settings.security().algorithm, "HS256");
        assert!(!settings.security().secret_key_generated);
        assert_eq!(settings.server_port(), 8000);
    }

    #[tokio::test]
    async fn strict_mode_requires_superuser_password() {
        let _guard = test_support::env_lock().await;
        test_support::set_test_env();
        std::env::set_var("TRANSCRIPTS_STRICT_CONFIG", "1");
        std::env::remove_var("FIRST_SUPERUSER_PASSWORD");

        let result = Settings::load();

        std::env::set_var("TRANSCRIPTS_STRICT_CONFIG", "0");
        assert!(matches!(result, Err(ConfigError::MissingSecret("FIRST_SUPERUSER_PASSWORD"))));
    }

    #[tokio::test]
    async fn zero_token_lifetime_is_rejected() {
        let _guard = test_support::env_lock().await;
        test_support::set_test_env();
        std::env::set_var("ACCESS_TOKEN_EXPIRE_MINUTES", "0");

        let result = Settings::load();

        std::env::remove_var("ACCESS_TOKEN_EXPIRE_MINUTES");
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { field: "ACCESS_TOKEN_EXPIRE_MINUTES", .. })
        ));
    }
}

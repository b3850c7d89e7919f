//! Registration and grading workflow on top of the assignment ledger.
//!
//! An assignment starts `Pending` on registration, becomes `Graded` when a
//! supervisor assigns a vote (re-grading overwrites), and only returns to
//! `Pending` through [`clear_grade`].

use serde::Serialize;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::core::time::primitive_now_utc;
use crate::db::models::UserExam;
use crate::repositories::{self, exams::ExamStatistics, user_exams::UserExamRow, StoreError};

pub(crate) const MIN_VOTE: f64 = 0.0;
pub(crate) const MAX_VOTE: f64 = 100.0;

#[derive(Debug, Error)]
pub(crate) enum GradingError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(&'static str),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub(crate) enum GradeStatus {
    Graded,
    Pending,
}

impl GradeStatus {
    pub(crate) fn of(vote: Option<f64>) -> Self {
        if vote.is_some() {
            Self::Graded
        } else {
            Self::Pending
        }
    }
}

pub(crate) fn letter_grade(vote: Option<f64>) -> &'static str {
    match vote {
        None => "N/A",
        Some(vote) if vote >= 90.0 => "A",
        Some(vote) if vote >= 80.0 => "B",
        Some(vote) if vote >= 70.0 => "C",
        Some(vote) if vote >= 60.0 => "D",
        Some(_) => "F",
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Share of graded assignments as a percentage; 0 without participants.
pub(crate) fn completion_rate(graded: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    round2(graded as f64 / total as f64 * 100.0)
}

pub(crate) fn validate_vote(vote: f64) -> Result<f64, GradingError> {
    if !vote.is_finite() || !(MIN_VOTE..=MAX_VOTE).contains(&vote) {
        return Err(GradingError::Validation(format!(
            "Vote must be between {MIN_VOTE} and {MAX_VOTE}"
        )));
    }
    Ok(round2(vote))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub(crate) struct UserGradeSummary {
    pub(crate) total_exams: usize,
    pub(crate) graded_exams: usize,
    pub(crate) pending_exams: usize,
    pub(crate) average_grade: Option<f64>,
    pub(crate) completion_rate: f64,
}

impl UserGradeSummary {
    pub(crate) fn from_votes(votes: impl IntoIterator<Item = Option<f64>>) -> Self {
        let mut total = 0usize;
        let mut graded = 0usize;
        let mut sum = 0.0;

        for vote in votes {
            total += 1;
            if let Some(vote) = vote {
                graded += 1;
                sum += vote;
            }
        }

        Self {
            total_exams: total,
            graded_exams: graded,
            pending_exams: total - graded,
            average_grade: (graded > 0).then(|| round2(sum / graded as f64)),
            completion_rate: completion_rate(graded as i64, total as i64),
        }
    }
}

pub(crate) async fn register(
    pool: &PgPool,
    user_id: &str,
    exam_id: &str,
) -> Result<UserExam, GradingError> {
    let assignment = repositories::user_exams::register(
        pool,
        repositories::user_exams::RegisterParams {
            id: &Uuid::new_v4().to_string(),
            user_id,
            exam_id,
            now: primitive_now_utc(),
        },
    )
    .await
    .map_err(|err| match err {
        StoreError::UniqueViolation(_) => {
            GradingError::Conflict("You are already registered for this exam")
        }
        StoreError::ForeignKeyViolation(constraint)
            if constraint == repositories::user_exams::FK_USER =>
        {
            GradingError::NotFound("User not found")
        }
        StoreError::ForeignKeyViolation(_) => GradingError::NotFound("Exam not found"),
        StoreError::Other(err) => GradingError::Database(err),
    })?;

    Ok(assignment)
}

pub(crate) async fn assign_grade(
    pool: &PgPool,
    user_id: &str,
    exam_id: &str,
    vote: f64,
) -> Result<UserExam, GradingError> {
    let vote = validate_vote(vote)?;

    if repositories::exams::find_by_id(pool, exam_id).await?.is_none() {
        return Err(GradingError::NotFound("Exam not found"));
    }

    repositories::user_exams::set_vote(pool, user_id, exam_id, vote, primitive_now_utc())
        .await?
        .ok_or(GradingError::NotFound("User is not registered for this exam"))
}

/// Not routed; only the ledger itself returns an assignment to pending.
#[allow(dead_code)]
pub(crate) async fn clear_grade(
    pool: &PgPool,
    user_id: &str,
    exam_id: &str,
) -> Result<Option<UserExam>, GradingError> {
    let cleared =
        repositories::user_exams::clear_vote(pool, user_id, exam_id, primitive_now_utc()).await?;
    Ok(cleared)
}

pub(crate) async fn grades_for_user(
    pool: &PgPool,
    user_id: &str,
) -> Result<(Vec<UserExamRow>, UserGradeSummary), GradingError> {
    let rows = repositories::user_exams::list_for_user(pool, user_id).await?;
    let summary = UserGradeSummary::from_votes(rows.iter().map(|row| row.vote));
    Ok((rows, summary))
}

pub(crate) async fn exam_statistics(
    pool: &PgPool,
    exam_id: &str,
) -> Result<ExamStatistics, GradingError> {
    if repositories::exams::find_by_id(pool, exam_id).await?.is_none() {
        return Err(GradingError::NotFound("Exam not found"));
    }

    let mut stats = repositories::exams::statistics(pool, exam_id).await?;
    stats.mean_grade = stats.mean_grade.map(round2);
    Ok(stats)
}

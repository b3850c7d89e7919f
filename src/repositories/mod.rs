pub(crate) mod exams;
pub(crate) mod health;
pub(crate) mod user_exams;
pub(crate) mod users;

use thiserror::Error;

/// Storage failures with constraint violations split out, so callers can
/// answer with conflict or not-found instead of a raw database error.
#[derive(Debug, Error)]
pub(crate) enum StoreError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),
    #[error("foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),
    #[error(transparent)]
    Other(#[from] sqlx::Error),
}

impl StoreError {
    pub(crate) fn classify(error: sqlx::Error) -> Self {
        if let Some(db_err) = error.as_database_error() {
            let constraint = db_err.constraint().unwrap_or("unknown").to_string();
            if db_err.is_unique_violation() {
                return Self::UniqueViolation(constraint);
            }
            if db_err.is_foreign_key_violation() {
                return Self::ForeignKeyViolation(constraint);
            }
        }

        Self::Other(error)
    }
}

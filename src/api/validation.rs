use std::borrow::Cow;

use time::Date;
use validator::ValidationError;

use crate::api::errors::ApiError;
use crate::core::time::today_utc;

pub(crate) const MIN_PASSWORD_LEN: usize = 8;
pub(crate) const MIN_TITLE_LEN: usize = 3;
pub(crate) const MAX_TITLE_LEN: usize = 255;

/// `validator` hook: at least eight characters with a letter and a digit.
pub(crate) fn password_strength(password: &str) -> Result<(), ValidationError> {
    let message = if password.chars().count() < MIN_PASSWORD_LEN {
        Some("Password must be at least 8 characters long")
    } else if !password.chars().any(|c| c.is_numeric()) {
        Some("Password must contain at least one number")
    } else if !password.chars().any(|c| c.is_alphabetic()) {
        Some("Password must contain at least one letter")
    } else {
        None
    };

    match message {
        Some(message) => {
            Err(ValidationError::new("password_strength").with_message(Cow::Borrowed(message)))
        }
        None => Ok(()),
    }
}

/// Collapses runs of whitespace and enforces the title length bounds.
pub(crate) fn normalize_title(raw: &str) -> Result<String, ApiError> {
    let title = raw.split_whitespace().collect::<Vec<_>>().join(" ");

    if title.is_empty() {
        return Err(ApiError::Validation("Exam title cannot be empty".to_string()));
    }
    if title.chars().count() < MIN_TITLE_LEN {
        return Err(ApiError::Validation(
            "Exam title must be at least 3 characters long".to_string(),
        ));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ApiError::Validation(format!(
            "Exam title must be at most {MAX_TITLE_LEN} characters long"
        )));
    }

    Ok(title)
}

pub(crate) fn ensure_not_past(date: Date) -> Result<(), ApiError> {
    if date < today_utc() {
        return Err(ApiError::Validation("Exam date cannot be in the past".to_string()));
    }
    Ok(())
}

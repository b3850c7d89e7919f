use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::validation::password_strength;
use crate::core::time::format_primitive;
use crate::db::models::User;
use crate::db::types::UserRole;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct UserLogin {
    #[validate(email(message = "value is not a valid email address"))]
    pub(crate) email: String,
    #[validate(length(min = 1, message = "password must not be empty"))]
    pub(crate) password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct UserCreate {
    #[validate(email(message = "value is not a valid email address"))]
    pub(crate) email: String,
    #[validate(custom(function = "password_strength"))]
    pub(crate) password: String,
    #[serde(default = "default_user_role")]
    pub(crate) role: UserRole,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct UserUpdate {
    #[serde(default)]
    #[validate(email(message = "value is not a valid email address"))]
    pub(crate) email: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "password_strength"))]
    pub(crate) password: Option<String>,
    #[serde(default)]
    pub(crate) role: Option<UserRole>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserListQuery {
    pub(crate) role: Option<UserRole>,
    #[serde(default)]
    pub(crate) skip: i64,
    #[serde(default = "crate::api::pagination::default_limit")]
    pub(crate) limit: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct UserResponse {
    pub(crate) id: String,
    pub(crate) email: String,
    pub(crate) role: UserRole,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl UserResponse {
    pub(crate) fn from_db(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.role,
            created_at: format_primitive(user.created_at),
            updated_at: format_primitive(user.updated_at),
        }
    }
}

fn default_user_role() -> UserRole {
    UserRole::User
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_defaults_to_user_role() {
        let payload: UserCreate =
            serde_json::from_value(serde_json::json!({"email": "a@b.io", "password": "abc12345"}))
                .unwrap();
        assert_eq!(payload.role, UserRole::User);
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn create_rejects_weak_password_and_bad_email() {
        let payload = UserCreate {
            email: "not-an-email".to_string(),
            password: "password".to_string(),
            role: UserRole::User,
        };
        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn update_skips_absent_fields() {
        let payload: UserUpdate =
            serde_json::from_value(serde_json::json!({"role": "supervisor"})).unwrap();
        assert!(payload.validate().is_ok());
        assert_eq!(payload.role, Some(UserRole::Supervisor));
    }
}

use serde::Serialize;

use crate::core::permissions::RolePermissions;
use crate::schemas::user::UserResponse;

#[derive(Debug, Serialize)]
pub(crate) struct TokenResponse {
    pub(crate) access_token: String,
    pub(crate) token_type: String,
    pub(crate) expires_in: i64,
    pub(crate) user: UserResponse,
}

#[derive(Debug, Serialize)]
pub(crate) struct MeResponse {
    pub(crate) user: UserResponse,
    pub(crate) permissions: RolePermissions,
}

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::extract::ApiJson;
use crate::api::guards::CurrentUser;
use crate::core::permissions::RolePermissions;
use crate::core::state::AppState;
use crate::core::{metrics, security};
use crate::db::models::User;
use crate::repositories;
use crate::schemas::auth::{MeResponse, TokenResponse};
use crate::schemas::user::{UserLogin, UserResponse};
use crate::schemas::SuccessResponse;

const BAD_CREDENTIALS: &str = "Invalid email or password";

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<UserLogin>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = repositories::users::find_by_email(state.db(), &payload.email)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load user"))?;

    // Argon2 verification runs on the blocking pool.
    let verified = match &user {
        Some(user) => {
            let password = payload.password.clone();
            let hash = user.hashed_password.clone();
            tokio::task::spawn_blocking(move || security::verify_password(&password, &hash))
                .await
                .map_err(|e| ApiError::internal(e, "Password verification task failed"))?
        }
        None => false,
    };

    let Some(user) = user.filter(|_| verified) else {
        metrics::record_login(false);
        tracing::info!(email = %payload.email, "Rejected login attempt");
        return Err(ApiError::Unauthorized(BAD_CREDENTIALS));
    };

    metrics::record_login(true);
    tracing::info!(user_id = %user.id, role = user.role.as_str(), "User logged in");

    issue_for(&state, user).map(Json)
}

async fn refresh(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<TokenResponse>, ApiError> {
    tracing::debug!(user_id = %user.id, "Refreshing access token");
    issue_for(&state, user).map(Json)
}

/// Tokens are stateless; the client discards its copy and the token stays
/// valid until it expires.
async fn logout(CurrentUser(user): CurrentUser) -> Json<SuccessResponse> {
    tracing::info!(user_id = %user.id, "User logged out");
    Json(SuccessResponse { success: true, message: "Successfully logged out".to_string() })
}

async fn me(CurrentUser(user): CurrentUser) -> Json<MeResponse> {
    let permissions = RolePermissions::for_role(user.role);
    Json(MeResponse { user: UserResponse::from_db(user), permissions })
}

fn issue_for(state: &AppState, user: User) -> Result<TokenResponse, ApiError> {
    let issued = security::issue_token(&user.id, &user.email, user.role, state.settings(), None)
        .map_err(|e| ApiError::internal(e, "Failed to create access token"))?;

    Ok(TokenResponse {
        access_token: issued.token,
        token_type: "bearer".to_string(),
        expires_in: issued.expires_in,
        user: UserResponse::from_db(user),
    })
}

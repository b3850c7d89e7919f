use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

use crate::api::errors::ApiError;
use crate::core::permissions::{self, Requirement};
use crate::core::{security, state::AppState};
use crate::db::models::User;
use crate::repositories;

const INVALID_CREDENTIALS: &str = "Could not validate credentials";

/// Any caller with a valid bearer token whose account still exists.
pub(crate) struct CurrentUser(pub(crate) User);
pub(crate) struct CurrentAdmin(pub(crate) User);
pub(crate) struct CurrentSupervisor(pub(crate) User);
/// Admin or supervisor.
pub(crate) struct CurrentStaff(pub(crate) User);

async fn authenticate(parts: &mut Parts, state: &AppState) -> Result<User, ApiError> {
    let auth_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(ApiError::Unauthorized(INVALID_CREDENTIALS))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .or_else(|| auth_header.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(ApiError::Unauthorized(INVALID_CREDENTIALS))?;

    let claims = security::verify_token(token, state.settings())
        .map_err(|_| ApiError::Unauthorized(INVALID_CREDENTIALS))?;

    let user = repositories::users::find_by_id(state.db(), &claims.sub)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load user"))?;

    let Some(user) = user else {
        tracing::debug!(user_id = %claims.sub, "Token subject no longer exists");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS));
    };

    Ok(user)
}

async fn authorized(
    parts: &mut Parts,
    state: &AppState,
    required: Requirement,
) -> Result<User, ApiError> {
    let user = authenticate(parts, state).await?;

    // The stored role wins over the one in the token, so demotions apply at once.
    permissions::authorize(user.role, required).map_err(|denied| {
        tracing::info!(user_id = %user.id, role = user.role.as_str(), "Permission denied");
        ApiError::from(denied)
    })?;

    Ok(user)
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authorized(parts, state, Requirement::AnyAuthenticated).await.map(CurrentUser)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authorized(parts, state, Requirement::AdminOnly).await.map(CurrentAdmin)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentSupervisor {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authorized(parts, state, Requirement::SupervisorOnly).await.map(CurrentSupervisor)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentStaff {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authorized(parts, state, Requirement::SupervisorOrAdmin).await.map(CurrentStaff)
    }
}

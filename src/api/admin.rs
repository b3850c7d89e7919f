use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::extract::{ApiJson, ApiQuery};
use crate::api::guards::{CurrentAdmin, CurrentStaff};
use crate::api::validation::{ensure_not_past, normalize_title};
use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::UserRole;
use crate::repositories::{self, StoreError};
use crate::schemas::exam::{ExamCreate, ExamResponse, ExamStatisticsResponse, ExamUpdate};
use crate::schemas::user::{UserCreate, UserListQuery, UserResponse, UserUpdate};
use crate::schemas::MessageResponse;
use crate::services::grading;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/exams", post(create_exam))
        .route("/exams/:exam_id", patch(update_exam).delete(delete_exam))
        .route("/exams/:exam_id/statistics", get(exam_statistics))
        .route("/users", get(list_users).post(create_user))
        .route("/users/:user_id", patch(update_user).delete(delete_user))
}

fn title_conflict() -> ApiError {
    ApiError::Conflict("Exam with this title already exists".to_string())
}

fn email_conflict() -> ApiError {
    ApiError::Conflict("User with this email already exists".to_string())
}

async fn create_exam(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
    ApiJson(payload): ApiJson<ExamCreate>,
) -> Result<Json<ExamResponse>, ApiError> {
    let title = normalize_title(&payload.title)?;
    ensure_not_past(payload.date)?;

    let now = primitive_now_utc();
    let exam = repositories::exams::create(
        state.db(),
        repositories::exams::CreateExam {
            id: &Uuid::new_v4().to_string(),
            title: &title,
            date: payload.date,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|err| match err {
        StoreError::UniqueViolation(_) => title_conflict(),
        other => ApiError::internal(other, "Failed to create exam"),
    })?;

    tracing::info!(exam_id = %exam.id, admin_id = %admin.id, title = %exam.title, "Exam created");

    Ok(Json(ExamResponse::from_db(exam)))
}

async fn update_exam(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
    Path(exam_id): Path<String>,
    ApiJson(payload): ApiJson<ExamUpdate>,
) -> Result<Json<ExamResponse>, ApiError> {
    let title = payload.title.as_deref().map(normalize_title).transpose()?;

    let exam = repositories::exams::update(
        state.db(),
        &exam_id,
        repositories::exams::UpdateExam {
            title: title.as_deref(),
            date: payload.date,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|err| match err {
        StoreError::UniqueViolation(_) => title_conflict(),
        other => ApiError::internal(other, "Failed to update exam"),
    })?
    .ok_or_else(|| ApiError::NotFound("Exam not found".to_string()))?;

    tracing::info!(exam_id = %exam.id, admin_id = %admin.id, "Exam updated");

    Ok(Json(ExamResponse::from_db(exam)))
}

async fn delete_exam(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
    Path(exam_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = repositories::exams::delete_by_id(state.db(), &exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete exam"))?;

    if !deleted {
        return Err(ApiError::NotFound("Exam not found".to_string()));
    }

    tracing::info!(exam_id = %exam_id, admin_id = %admin.id, "Exam deleted");

    Ok(Json(MessageResponse { message: "Exam deleted successfully".to_string() }))
}

async fn exam_statistics(
    State(state): State<AppState>,
    CurrentStaff(_staff): CurrentStaff,
    Path(exam_id): Path<String>,
) -> Result<Json<ExamStatisticsResponse>, ApiError> {
    let stats = grading::exam_statistics(state.db(), &exam_id).await?;
    Ok(Json(ExamStatisticsResponse::new(exam_id, stats)))
}

/// Supervisors only ever see regular `user` accounts, whatever they ask for.
async fn list_users(
    State(state): State<AppState>,
    CurrentStaff(caller): CurrentStaff,
    ApiQuery(params): ApiQuery<UserListQuery>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let role = match caller.role {
        UserRole::Admin => params.role,
        UserRole::Supervisor | UserRole::User => Some(UserRole::User),
    };

    let users = repositories::users::list_all(
        state.db(),
        repositories::users::ListUsersParams { role, skip: params.skip, limit: params.limit },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to list users"))?;

    Ok(Json(users.into_iter().map(UserResponse::from_db).collect()))
}

async fn create_user(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
    ApiJson(payload): ApiJson<UserCreate>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let hashed_password = security::hash_password(&payload.password)
        .map_err(|e| ApiError::internal(e, "Failed to hash password"))?;

    let now = primitive_now_utc();
    let user = repositories::users::create(
        state.db(),
        repositories::users::CreateUser {
            id: &Uuid::new_v4().to_string(),
            email: &payload.email,
            hashed_password,
            role: payload.role,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|err| match err {
        StoreError::UniqueViolation(_) => email_conflict(),
        other => ApiError::internal(other, "Failed to create user"),
    })?;

    tracing::info!(
        user_id = %user.id,
        admin_id = %admin.id,
        role = user.role.as_str(),
        "User created"
    );

    Ok((StatusCode::CREATED, Json(UserResponse::from_db(user))))
}

async fn update_user(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
    Path(user_id): Path<String>,
    ApiJson(payload): ApiJson<UserUpdate>,
) -> Result<Json<UserResponse>, ApiError> {
    let hashed_password = payload
        .password
        .as_deref()
        .map(security::hash_password)
        .transpose()
        .map_err(|e| ApiError::internal(e, "Failed to hash password"))?;

    let user = repositories::users::update(
        state.db(),
        &user_id,
        repositories::users::UpdateUser {
            email: payload.email,
            hashed_password,
            role: payload.role,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|err| match err {
        StoreError::UniqueViolation(_) => email_conflict(),
        other => ApiError::internal(other, "Failed to update user"),
    })?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    tracing::info!(user_id = %user.id, admin_id = %admin.id, "User updated");

    Ok(Json(UserResponse::from_db(user)))
}

async fn delete_user(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
    Path(user_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = repositories::users::delete_by_id(state.db(), &user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete user"))?;

    if !deleted {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    tracing::info!(user_id = %user_id, admin_id = %admin.id, "User deleted");

    Ok(Json(MessageResponse { message: "User deleted successfully".to_string() }))
}

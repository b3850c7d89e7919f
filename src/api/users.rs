use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::metrics;
use crate::core::state::AppState;
use crate::core::time::format_date;
use crate::repositories;
use crate::schemas::grading::{MyExamsResponse, Registration, RegistrationResponse, UserExamResponse};
use crate::services::grading;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/exams/:exam_id/register", post(register_for_exam))
        .route("/me/exams", get(my_exams))
}

async fn register_for_exam(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(exam_id): Path<String>,
) -> Result<Json<RegistrationResponse>, ApiError> {
    let exam = repositories::exams::find_by_id(state.db(), &exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam"))?
        .ok_or_else(|| ApiError::NotFound("Exam not found".to_string()))?;

    let assignment = grading::register(state.db(), &user.id, &exam.id).await?;

    metrics::record_exam_registration();
    tracing::info!(
        assignment_id = %assignment.id,
        exam_id = %exam.id,
        user_id = %user.id,
        "User registered for exam"
    );

    Ok(Json(RegistrationResponse {
        success: true,
        message: format!("Successfully registered for exam '{}'", exam.title),
        registration: Registration {
            exam_id: exam.id,
            exam_title: exam.title,
            exam_date: format_date(exam.date),
            status: "registered",
        },
    }))
}

async fn my_exams(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<MyExamsResponse>, ApiError> {
    let (rows, statistics) = grading::grades_for_user(state.db(), &user.id).await?;

    Ok(Json(MyExamsResponse {
        exams: rows.into_iter().map(UserExamResponse::from_row).collect(),
        statistics,
    }))
}

use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::extract::ApiJson;
use crate::api::guards::CurrentSupervisor;
use crate::core::metrics;
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::grading::{
    GradedAssignment, UngradedAssignmentResponse, UngradedListResponse, VoteRequest, VoteResponse,
};
use crate::services::grading::{self, letter_grade};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/ungraded-assignments", get(list_ungraded))
        .route("/exams/:exam_id/vote", put(assign_vote))
}

async fn list_ungraded(
    State(state): State<AppState>,
    CurrentSupervisor(_supervisor): CurrentSupervisor,
) -> Result<Json<UngradedListResponse>, ApiError> {
    let rows = repositories::user_exams::list_ungraded(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list ungraded assignments"))?;

    let assignments: Vec<_> = rows.into_iter().map(UngradedAssignmentResponse::from_row).collect();

    Ok(Json(UngradedListResponse { success: true, total: assignments.len(), assignments }))
}

async fn assign_vote(
    State(state): State<AppState>,
    CurrentSupervisor(supervisor): CurrentSupervisor,
    Path(exam_id): Path<String>,
    ApiJson(payload): ApiJson<VoteRequest>,
) -> Result<Json<VoteResponse>, ApiError> {
    let assignment =
        grading::assign_grade(state.db(), &payload.user_id, &exam_id, payload.vote).await?;

    metrics::record_grade_assigned();
    tracing::info!(
        exam_id = %assignment.exam_id,
        user_id = %assignment.user_id,
        supervisor_id = %supervisor.id,
        vote = ?assignment.vote,
        "Grade assigned"
    );

    let vote = assignment.vote.unwrap_or(payload.vote);
    Ok(Json(VoteResponse {
        success: true,
        message: format!("Vote {vote} assigned successfully"),
        assignment: GradedAssignment {
            letter_grade: letter_grade(assignment.vote),
            user_id: assignment.user_id,
            exam_id: assignment.exam_id,
            vote: assignment.vote,
        },
    }))
}

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::extract::ApiQuery;
use crate::api::pagination::PageParams;
use crate::core::state::AppState;
use crate::core::time::format_date;
use crate::repositories;
use crate::repositories::exams::{ExamFilter, ExamSort, SortField, SortOrder};
use crate::schemas::exam::{
    AppliedFilters, ExamListQuery, ExamListResponse, ExamResponse, PublicExamDetail,
};

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/exams", get(list_exams)).route("/exams/:exam_id", get(exam_detail))
}

async fn list_exams(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ExamListQuery>,
) -> Result<Json<ExamListResponse>, ApiError> {
    let page = PageParams::new(query.page, query.page_size);
    let sort = ExamSort {
        field: SortField::from_param(query.sort_by.as_deref()),
        order: SortOrder::from_param(query.sort_order.as_deref()),
    };
    let filter = ExamFilter {
        title_contains: query.title.filter(|title| !title.trim().is_empty()),
        date_from: query.date_from,
        date_to: query.date_to,
    };

    let exams =
        repositories::exams::list(state.db(), &filter, sort, page.offset(), page.page_size)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to list exams"))?;
    let total = repositories::exams::count(state.db(), &filter)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count exams"))?;

    Ok(Json(ExamListResponse {
        exams: exams.into_iter().map(ExamResponse::from_db).collect(),
        pagination: page.meta(total),
        filters: AppliedFilters {
            title: filter.title_contains,
            date_from: filter.date_from.map(format_date),
            date_to: filter.date_to.map(format_date),
            sort_by: sort.field.as_str(),
            sort_order: sort.order.as_str(),
        },
    }))
}

async fn exam_detail(
    State(state): State<AppState>,
    Path(exam_id): Path<String>,
) -> Result<Json<PublicExamDetail>, ApiError> {
    let exam = repositories::exams::find_by_id(state.db(), &exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam"))?
        .ok_or_else(|| ApiError::NotFound("Exam not found".to_string()))?;

    let stats = repositories::exams::statistics(state.db(), &exam.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load exam statistics"))?;

    Ok(Json(PublicExamDetail { exam: ExamResponse::from_db(exam), statistics: stats.into() }))
}

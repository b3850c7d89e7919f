use serde::{Deserialize, Serialize};
use time::Date;
use validator::Validate;

use crate::api::pagination::PaginationMeta;
use crate::core::time::{deserialize_date, deserialize_option_date, format_date, format_primitive};
use crate::db::models::Exam;
use crate::repositories::exams::ExamStatistics;
use crate::services::grading::completion_rate;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ExamCreate {
    #[validate(length(min = 1, max = 255, message = "title must be 1-255 characters"))]
    pub(crate) title: String,
    #[serde(deserialize_with = "deserialize_date")]
    pub(crate) date: Date,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ExamUpdate {
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "title must be 1-255 characters"))]
    pub(crate) title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_option_date")]
    pub(crate) date: Option<Date>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExamListQuery {
    pub(crate) title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_option_date")]
    pub(crate) date_from: Option<Date>,
    #[serde(default, deserialize_with = "deserialize_option_date")]
    pub(crate) date_to: Option<Date>,
    pub(crate) sort_by: Option<String>,
    pub(crate) sort_order: Option<String>,
    pub(crate) page: Option<i64>,
    pub(crate) page_size: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamResponse {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) date: String,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl ExamResponse {
    pub(crate) fn from_db(exam: Exam) -> Self {
        Self {
            id: exam.id,
            title: exam.title,
            date: format_date(exam.date),
            created_at: format_primitive(exam.created_at),
            updated_at: format_primitive(exam.updated_at),
        }
    }
}

/// Filters echoed back exactly as applied, after sort fallbacks.
#[derive(Debug, Serialize)]
pub(crate) struct AppliedFilters {
    pub(crate) title: Option<String>,
    pub(crate) date_from: Option<String>,
    pub(crate) date_to: Option<String>,
    pub(crate) sort_by: &'static str,
    pub(crate) sort_order: &'static str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamListResponse {
    pub(crate) exams: Vec<ExamResponse>,
    pub(crate) pagination: PaginationMeta,
    pub(crate) filters: AppliedFilters,
}

#[derive(Debug, Serialize)]
pub(crate) struct PublicExamStatistics {
    pub(crate) total_participants: i64,
    pub(crate) completion_rate: f64,
}

impl From<ExamStatistics> for PublicExamStatistics {
    fn from(stats: ExamStatistics) -> Self {
        Self {
            total_participants: stats.participant_count,
            completion_rate: completion_rate(stats.graded_count, stats.participant_count),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct PublicExamDetail {
    pub(crate) exam: ExamResponse,
    pub(crate) statistics: PublicExamStatistics,
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamStatisticsResponse {
    pub(crate) exam_id: String,
    pub(crate) participant_count: i64,
    pub(crate) graded_count: i64,
    pub(crate) pending_count: i64,
    pub(crate) mean_grade: Option<f64>,
    pub(crate) completion_rate: f64,
}

impl ExamStatisticsResponse {
    pub(crate) fn new(exam_id: String, stats: ExamStatistics) -> Self {
        Self {
            exam_id,
            participant_count: stats.participant_count,
            graded_count: stats.graded_count,
            pending_count: stats.pending_count,
            mean_grade: stats.mean_grade,
            completion_rate: completion_rate(stats.graded_count, stats.participant_count),
        }
    }
}

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::{format_date, format_primitive};
use crate::repositories::user_exams::{UngradedAssignment, UserExamRow};
use crate::services::grading::{letter_grade, GradeStatus, UserGradeSummary};

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct VoteRequest {
    #[validate(length(min = 1, message = "user_id must not be empty"))]
    pub(crate) user_id: String,
    pub(crate) vote: f64,
}

#[derive(Debug, Serialize)]
pub(crate) struct GradedAssignment {
    pub(crate) user_id: String,
    pub(crate) exam_id: String,
    pub(crate) vote: Option<f64>,
    pub(crate) letter_grade: &'static str,
}

#[derive(Debug, Serialize)]
pub(crate) struct VoteResponse {
    pub(crate) success: bool,
    pub(crate) message: String,
    pub(crate) assignment: GradedAssignment,
}

#[derive(Debug, Serialize)]
pub(crate) struct UngradedAssignmentResponse {
    pub(crate) user_id: String,
    pub(crate) user_email: String,
    pub(crate) user_full_name: String,
    pub(crate) exam_id: String,
    pub(crate) exam_title: String,
    pub(crate) exam_date: String,
}

impl UngradedAssignmentResponse {
    pub(crate) fn from_row(row: UngradedAssignment) -> Self {
        Self {
            user_id: row.user_id,
            // Accounts carry no display name; the email stands in for it.
            user_full_name: row.user_email.clone(),
            user_email: row.user_email,
            exam_id: row.exam_id,
            exam_title: row.exam_title,
            exam_date: format_date(row.exam_date),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct UngradedListResponse {
    pub(crate) success: bool,
    pub(crate) assignments: Vec<UngradedAssignmentResponse>,
    pub(crate) total: usize,
}

#[derive(Debug, Serialize)]
pub(crate) struct Registration {
    pub(crate) exam_id: String,
    pub(crate) exam_title: String,
    pub(crate) exam_date: String,
    pub(crate) status: &'static str,
}

#[derive(Debug, Serialize)]
pub(crate) struct RegistrationResponse {
    pub(crate) success: bool,
    pub(crate) message: String,
    pub(crate) registration: Registration,
}

#[derive(Debug, Serialize)]
pub(crate) struct UserExamResponse {
    pub(crate) exam_id: String,
    pub(crate) exam_title: String,
    pub(crate) exam_date: String,
    pub(crate) vote: Option<f64>,
    pub(crate) is_graded: bool,
    pub(crate) grade_status: GradeStatus,
    pub(crate) letter_grade: &'static str,
    pub(crate) registered_at: String,
}

impl UserExamResponse {
    pub(crate) fn from_row(row: UserExamRow) -> Self {
        Self {
            exam_id: row.exam_id,
            exam_title: row.exam_title,
            exam_date: format_date(row.exam_date),
            vote: row.vote,
            is_graded: row.vote.is_some(),
            grade_status: GradeStatus::of(row.vote),
            letter_grade: letter_grade(row.vote),
            registered_at: format_primitive(row.registered_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct MyExamsResponse {
    pub(crate) exams: Vec<UserExamResponse>,
    pub(crate) statistics: UserGradeSummary,
}

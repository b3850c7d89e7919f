use sqlx::PgPool;
use time::{Date, PrimitiveDateTime};

use crate::db::models::UserExam;
use crate::repositories::StoreError;

const COLUMNS: &str = "id, user_id, exam_id, vote, created_at, updated_at";

pub(crate) const FK_USER: &str = "fk_user_exams_user";

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct UngradedAssignment {
    pub(crate) user_id: String,
    pub(crate) user_email: String,
    pub(crate) exam_id: String,
    pub(crate) exam_title: String,
    pub(crate) exam_date: Date,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct UserExamRow {
    pub(crate) exam_id: String,
    pub(crate) exam_title: String,
    pub(crate) exam_date: Date,
    pub(crate) vote: Option<f64>,
    pub(crate) registered_at: PrimitiveDateTime,
}

#[cfg(test)]
pub(crate) async fn find(
    pool: &PgPool,
    user_id: &str,
    exam_id: &str,
) -> Result<Option<UserExam>, sqlx::Error> {
    sqlx::query_as::<_, UserExam>(&format!(
        "SELECT {COLUMNS} FROM user_exams WHERE user_id = $1 AND exam_id = $2"
    ))
    .bind(user_id)
    .bind(exam_id)
    .fetch_optional(pool)
    .await
}

pub(crate) struct RegisterParams<'a> {
    pub id: &'a str,
    pub user_id: &'a str,
    pub exam_id: &'a str,
    pub now: PrimitiveDateTime,
}

/// Plain insert; `uq_user_exam` rejects a second registration for the same
/// pair and the foreign keys reject vanished users or exams.
pub(crate) async fn register(
    pool: &PgPool,
    params: RegisterParams<'_>,
) -> Result<UserExam, StoreError> {
    sqlx::query_as::<_, UserExam>(&format!(
        "INSERT INTO user_exams (id, user_id, exam_id, vote, created_at, updated_at)
         VALUES ($1,$2,$3,NULL,$4,$4)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.user_id)
    .bind(params.exam_id)
    .bind(params.now)
    .fetch_one(pool)
    .await
    .map_err(StoreError::classify)
}

pub(crate) async fn list_ungraded(pool: &PgPool) -> Result<Vec<UngradedAssignment>, sqlx::Error> {
    sqlx::query_as::<_, UngradedAssignment>(
        "SELECT ue.user_id,
                u.email AS user_email,
                ue.exam_id,
                e.title AS exam_title,
                e.date AS exam_date
         FROM user_exams ue
         JOIN users u ON u.id = ue.user_id
         JOIN exams e ON e.id = ue.exam_id
         WHERE ue.vote IS NULL
         ORDER BY e.date, u.email, ue.id",
    )
    .fetch_all(pool)
    .await
}

/// Overwrites any previous grade. Returns `None` when the user is not
/// registered for the exam. The range is checked by the caller and again by
/// `ck_user_exams_vote_range`.
pub(crate) async fn set_vote(
    pool: &PgPool,
    user_id: &str,
    exam_id: &str,
    vote: f64,
    now: PrimitiveDateTime,
) -> Result<Option<UserExam>, sqlx::Error> {
    sqlx::query_as::<_, UserExam>(&format!(
        "UPDATE user_exams SET vote = $1, updated_at = $2
         WHERE user_id = $3 AND exam_id = $4
         RETURNING {COLUMNS}",
    ))
    .bind(vote)
    .bind(now)
    .bind(user_id)
    .bind(exam_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn clear_vote(
    pool: &PgPool,
    user_id: &str,
    exam_id: &str,
    now: PrimitiveDateTime,
) -> Result<Option<UserExam>, sqlx::Error> {
    sqlx::query_as::<_, UserExam>(&format!(
        "UPDATE user_exams SET vote = NULL, updated_at = $1
         WHERE user_id = $2 AND exam_id = $3
         RETURNING {COLUMNS}",
    ))
    .bind(now)
    .bind(user_id)
    .bind(exam_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn list_for_user(
    pool: &PgPool,
    user_id: &str,
) -> Result<Vec<UserExamRow>, sqlx::Error> {
    sqlx::query_as::<_, UserExamRow>(
        "SELECT ue.exam_id,
                e.title AS exam_title,
                e.date AS exam_date,
                ue.vote,
                ue.created_at AS registered_at
         FROM user_exams ue
         JOIN exams e ON e.id = ue.exam_id
         WHERE ue.user_id = $1
         ORDER BY e.date, e.title",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

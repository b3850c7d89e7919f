use sqlx::{PgPool, Postgres, QueryBuilder};
use time::{Date, PrimitiveDateTime};

use crate::db::models::Exam;
use crate::repositories::StoreError;

pub(crate) const COLUMNS: &str = "id, title, date, created_at, updated_at";

#[derive(Debug, Clone, Default)]
pub(crate) struct ExamFilter {
    pub title_contains: Option<String>,
    pub date_from: Option<Date>,
    pub date_to: Option<Date>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum SortField {
    #[default]
    Date,
    Title,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    /// Unknown or missing values sort by date.
    pub(crate) fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("title") => Self::Title,
            Some("created_at") => Self::CreatedAt,
            Some("updated_at") => Self::UpdatedAt,
            _ => Self::Date,
        }
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Title => "title",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub(crate) fn from_param(value: Option<&str>) -> Self {
        match value.map(|raw| raw.trim().to_ascii_lowercase()).as_deref() {
            Some("desc") => Self::Desc,
            _ => Self::Asc,
        }
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ExamSort {
    pub field: SortField,
    pub order: SortOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, sqlx::FromRow)]
pub(crate) struct ExamStatistics {
    pub(crate) participant_count: i64,
    pub(crate) graded_count: i64,
    pub(crate) pending_count: i64,
    /// Mean over graded assignments; `None` when nothing is graded yet.
    pub(crate) mean_grade: Option<f64>,
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Exam>, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!("SELECT {COLUMNS} FROM exams WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

#[allow(dead_code)]
pub(crate) async fn find_by_title(pool: &PgPool, title: &str) -> Result<Option<Exam>, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!("SELECT {COLUMNS} FROM exams WHERE title = $1"))
        .bind(title)
        .fetch_optional(pool)
        .await
}

pub(crate) struct CreateExam<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub date: Date,
    pub created_at: PrimitiveDateTime,
    pub updated_at: PrimitiveDateTime,
}

pub(crate) async fn create(pool: &PgPool, params: CreateExam<'_>) -> Result<Exam, StoreError> {
    sqlx::query_as::<_, Exam>(&format!(
        "INSERT INTO exams (id, title, date, created_at, updated_at)
         VALUES ($1,$2,$3,$4,$5)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.title)
    .bind(params.date)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(pool)
    .await
    .map_err(StoreError::classify)
}

pub(crate) struct UpdateExam<'a> {
    pub title: Option<&'a str>,
    pub date: Option<Date>,
    pub updated_at: PrimitiveDateTime,
}

pub(crate) async fn update(
    pool: &PgPool,
    id: &str,
    params: UpdateExam<'_>,
) -> Result<Option<Exam>, StoreError> {
    sqlx::query_as::<_, Exam>(&format!(
        "UPDATE exams SET
            title = COALESCE($1, title),
            date = COALESCE($2, date),
            updated_at = $3
         WHERE id = $4
         RETURNING {COLUMNS}",
    ))
    .bind(params.title)
    .bind(params.date)
    .bind(params.updated_at)
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(StoreError::classify)
}

/// Assignments of the exam go with it (`ON DELETE CASCADE`).
pub(crate) async fn delete_by_id(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM exams WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    for ch in value.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &ExamFilter) {
    if let Some(title) = filter.title_contains.as_deref().map(str::trim).filter(|t| !t.is_empty())
    {
        builder.push(" AND title ILIKE ");
        builder.push_bind(format!("%{}%", escape_like(title)));
        builder.push(" ESCAPE '\\'");
    }

    if let Some(date_from) = filter.date_from {
        builder.push(" AND date >= ");
        builder.push_bind(date_from);
    }

    if let Some(date_to) = filter.date_to {
        builder.push(" AND date <= ");
        builder.push_bind(date_to);
    }
}

pub(crate) async fn list(
    pool: &PgPool,
    filter: &ExamFilter,
    sort: ExamSort,
    skip: i64,
    limit: i64,
) -> Result<Vec<Exam>, sqlx::Error> {
    let mut builder =
        QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM exams WHERE 1=1"));
    push_filter(&mut builder, filter);

    // Column names come from a closed enum, never from the request.
    builder.push(format!(
        " ORDER BY {column} {order}, id {order} OFFSET ",
        column = sort.field.as_str(),
        order = sort.order.as_sql()
    ));
    builder.push_bind(skip.max(0));
    builder.push(" LIMIT ");
    builder.push_bind(limit.clamp(1, 1000));

    builder.build_query_as::<Exam>().fetch_all(pool).await
}

pub(crate) async fn count(pool: &PgPool, filter: &ExamFilter) -> Result<i64, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM exams WHERE 1=1");
    push_filter(&mut builder, filter);

    builder.build_query_scalar::<i64>().fetch_one(pool).await
}

pub(crate) async fn statistics(pool: &PgPool, exam_id: &str) -> Result<ExamStatistics, sqlx::Error> {
    sqlx::query_as::<_, ExamStatistics>(
        "SELECT COUNT(*) AS participant_count,
                COUNT(vote) AS graded_count,
                COUNT(*) - COUNT(vote) AS pending_count,
                AVG(vote) AS mean_grade
         FROM user_exams
         WHERE exam_id = $1",
    )
    .bind(exam_id)
    .fetch_one(pool)
    .await
}

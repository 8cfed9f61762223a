use sqlx::types::Json as SqlxJson;
use sqlx::{PgPool, Postgres, QueryBuilder};
use time::PrimitiveDateTime;

use crate::db::models::Question;
use crate::db::types::{DifficultyLevel, QuestionSource, QuestionType};

pub(crate) const QUESTION_COLUMNS: &str = "\
    id, user_id, question_text, question_type, options, correct_answer, grade_level, textbook, \
    chapter, source, difficulty_level, points, created_at, updated_at";

/// Same columns as [`QUESTION_COLUMNS`], qualified with the `q` alias for joins.
pub(crate) const QUALIFIED_QUESTION_COLUMNS: &str = "\
    q.id, q.user_id, q.question_text, q.question_type, q.options, q.correct_answer, \
    q.grade_level, q.textbook, q.chapter, q.source, q.difficulty_level, q.points, q.created_at, \
    q.updated_at";

pub(crate) struct QuestionFields<'a> {
    pub(crate) question_text: &'a str,
    pub(crate) question_type: QuestionType,
    pub(crate) options: Option<serde_json::Value>,
    pub(crate) correct_answer: Option<&'a str>,
    pub(crate) grade_level: &'a str,
    pub(crate) textbook: &'a str,
    pub(crate) chapter: &'a str,
    pub(crate) source: QuestionSource,
    pub(crate) difficulty_level: DifficultyLevel,
    pub(crate) points: i32,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    user_id: &str,
    fields: QuestionFields<'_>,
    now: PrimitiveDateTime,
) -> Result<Question, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "INSERT INTO questions (
            user_id, question_text, question_type, options, correct_answer, grade_level,
            textbook, chapter, source, difficulty_level, points, created_at, updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13)
         RETURNING {QUESTION_COLUMNS}"
    ))
    .bind(user_id)
    .bind(fields.question_text)
    .bind(fields.question_type)
    .bind(fields.options.map(SqlxJson))
    .bind(fields.correct_answer)
    .bind(fields.grade_level)
    .bind(fields.textbook)
    .bind(fields.chapter)
    .bind(fields.source)
    .bind(fields.difficulty_level)
    .bind(fields.points)
    .bind(now)
    .bind(now)
    .fetch_one(executor)
    .await
}

pub(crate) async fn update(
    executor: impl sqlx::PgExecutor<'_>,
    id: i64,
    fields: QuestionFields<'_>,
    now: PrimitiveDateTime,
) -> Result<Option<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "UPDATE questions SET
            question_text = $1,
            question_type = $2,
            options = $3,
            correct_answer = $4,
            grade_level = $5,
            textbook = $6,
            chapter = $7,
            source = $8,
            difficulty_level = $9,
            points = $10,
            updated_at = $11
         WHERE id = $12
         RETURNING {QUESTION_COLUMNS}"
    ))
    .bind(fields.question_text)
    .bind(fields.question_type)
    .bind(fields.options.map(SqlxJson))
    .bind(fields.correct_answer)
    .bind(fields.grade_level)
    .bind(fields.textbook)
    .bind(fields.chapter)
    .bind(fields.source)
    .bind(fields.difficulty_level)
    .bind(fields.points)
    .bind(now)
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn find_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: i64,
) -> Result<Option<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!("SELECT {QUESTION_COLUMNS} FROM questions WHERE id = $1"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Row-locks the question until the surrounding transaction ends.
pub(crate) async fn find_by_id_for_update(
    executor: impl sqlx::PgExecutor<'_>,
    id: i64,
) -> Result<Option<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "SELECT {QUESTION_COLUMNS} FROM questions WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn delete(
    executor: impl sqlx::PgExecutor<'_>,
    id: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM questions WHERE id = $1").bind(id).execute(executor).await?;
    Ok(result.rows_affected() > 0)
}

/// Exact-match narrowing over one owner's questions. `None` means "no predicate".
#[derive(Debug, Default)]
pub(crate) struct FilterParams {
    pub(crate) user_id: String,
    pub(crate) grade_level: Option<String>,
    pub(crate) difficulty: Option<DifficultyLevel>,
    pub(crate) question_type: Option<QuestionType>,
    pub(crate) source: Option<QuestionSource>,
    pub(crate) textbook: Option<String>,
    pub(crate) chapter: Option<String>,
    pub(crate) search: Option<String>,
}

fn push_filters<'a>(builder: &mut QueryBuilder<'a, Postgres>, params: &'a FilterParams) {
    builder.push(" WHERE user_id = ");
    builder.push_bind(&params.user_id);

    if let Some(grade_level) = &params.grade_level {
        builder.push(" AND grade_level = ");
        builder.push_bind(grade_level);
    }
    if let Some(difficulty) = params.difficulty {
        builder.push(" AND difficulty_level = ");
        builder.push_bind(difficulty);
    }
    if let Some(question_type) = params.question_type {
        builder.push(" AND question_type = ");
        builder.push_bind(question_type);
    }
    if let Some(source) = params.source {
        builder.push(" AND source = ");
        builder.push_bind(source);
    }
    if let Some(textbook) = &params.textbook {
        builder.push(" AND textbook = ");
        builder.push_bind(textbook);

        if let Some(chapter) = &params.chapter {
            builder.push(" AND chapter = ");
            builder.push_bind(chapter);
        }
    }
    if let Some(search) = &params.search {
        builder.push(" AND question_text ILIKE ");
        builder.push_bind(format!("%{}%", escape_like(search)));
    }
}

/// Escapes LIKE metacharacters so the term matches literally (backslash is the default escape).
pub(crate) fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

pub(crate) async fn count_by_filters(
    pool: &PgPool,
    params: &FilterParams,
) -> Result<i64, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM questions");
    push_filters(&mut builder, params);

    builder.build_query_scalar::<i64>().fetch_one(pool).await
}

pub(crate) async fn list_by_filters(
    pool: &PgPool,
    params: &FilterParams,
    offset: i64,
    limit: i64,
) -> Result<Vec<Question>, sqlx::Error> {
    let mut builder =
        QueryBuilder::<Postgres>::new(format!("SELECT {QUESTION_COLUMNS} FROM questions"));
    push_filters(&mut builder, params);

    builder.push(" ORDER BY created_at DESC, id DESC");
    builder.push(" OFFSET ");
    builder.push_bind(offset.max(0));
    builder.push(" LIMIT ");
    builder.push_bind(limit.clamp(1, 1000));

    builder.build_query_as::<Question>().fetch_all(pool).await
}

pub(crate) async fn distinct_grade_levels(
    pool: &PgPool,
    user_id: &str,
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT grade_level
         FROM questions
         WHERE user_id = $1
         GROUP BY grade_level
         ORDER BY grade_level COLLATE \"C\"",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn distinct_textbooks(
    pool: &PgPool,
    user_id: &str,
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT textbook
         FROM questions
         WHERE user_id = $1
         GROUP BY textbook
         ORDER BY textbook COLLATE \"C\"",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Returns the subset of `ids` that exist and belong to `user_id`.
/// Rows are share-locked so they cannot change owner or vanish before the caller commits.
pub(crate) async fn lock_owned_ids(
    executor: &mut sqlx::Transaction<'_, Postgres>,
    user_id: &str,
    ids: &[i64],
) -> Result<Vec<i64>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_scalar(
        "SELECT id
         FROM questions
         WHERE user_id = $1 AND id = ANY($2)
         FOR SHARE",
    )
    .bind(user_id)
    .bind(ids)
    .fetch_all(&mut **executor)
    .await
}

pub(crate) async fn list_for_owner(
    pool: &PgPool,
    user_id: &str,
) -> Result<Vec<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "SELECT {QUESTION_COLUMNS}
         FROM questions
         WHERE user_id = $1
         ORDER BY created_at DESC, id DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_recent(
    pool: &PgPool,
    user_id: &str,
    limit: i64,
) -> Result<Vec<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "SELECT {QUESTION_COLUMNS}
         FROM questions
         WHERE user_id = $1
         ORDER BY created_at DESC, id DESC
         LIMIT $2"
    ))
    .bind(user_id)
    .bind(limit.clamp(1, 100))
    .fetch_all(pool)
    .await
}

pub(crate) async fn count_for_owner(pool: &PgPool, user_id: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM questions WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
}

pub(crate) async fn count_by_type(
    pool: &PgPool,
    user_id: &str,
) -> Result<Vec<(QuestionType, i64)>, sqlx::Error> {
    sqlx::query_as::<_, (QuestionType, i64)>(
        "SELECT question_type, COUNT(*)
         FROM questions
         WHERE user_id = $1
         GROUP BY question_type",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn count_by_difficulty(
    pool: &PgPool,
    user_id: &str,
) -> Result<Vec<(DifficultyLevel, i64)>, sqlx::Error> {
    sqlx::query_as::<_, (DifficultyLevel, i64)>(
        "SELECT difficulty_level, COUNT(*)
         FROM questions
         WHERE user_id = $1
         GROUP BY difficulty_level",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

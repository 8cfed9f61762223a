use sqlx::{PgPool, Postgres};
use time::PrimitiveDateTime;

use crate::db::models::{PaperQuestion, TestPaper};
use crate::repositories::questions::QUALIFIED_QUESTION_COLUMNS;

pub(crate) const TEST_PAPER_COLUMNS: &str = "\
    id, user_id, title, grade_level, subject, duration_minutes, instructions, total_points, \
    created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct TestPaperSummaryRow {
    #[sqlx(flatten)]
    pub(crate) paper: TestPaper,
    pub(crate) questions_count: i64,
}

pub(crate) struct TestPaperFields<'a> {
    pub(crate) title: &'a str,
    pub(crate) grade_level: &'a str,
    pub(crate) subject: &'a str,
    pub(crate) duration_minutes: Option<i32>,
    pub(crate) instructions: Option<&'a str>,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    user_id: &str,
    fields: TestPaperFields<'_>,
    now: PrimitiveDateTime,
) -> Result<TestPaper, sqlx::Error> {
    sqlx::query_as::<_, TestPaper>(&format!(
        "INSERT INTO test_papers (
            user_id, title, grade_level, subject, duration_minutes, instructions, total_points,
            created_at, updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6,0,$7,$8)
         RETURNING {TEST_PAPER_COLUMNS}"
    ))
    .bind(user_id)
    .bind(fields.title)
    .bind(fields.grade_level)
    .bind(fields.subject)
    .bind(fields.duration_minutes)
    .bind(fields.instructions)
    .bind(now)
    .bind(now)
    .fetch_one(executor)
    .await
}

pub(crate) async fn update_details(
    executor: impl sqlx::PgExecutor<'_>,
    id: i64,
    fields: TestPaperFields<'_>,
    now: PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE test_papers SET
            title = $1,
            grade_level = $2,
            subject = $3,
            duration_minutes = $4,
            instructions = $5,
            updated_at = $6
         WHERE id = $7",
    )
    .bind(fields.title)
    .bind(fields.grade_level)
    .bind(fields.subject)
    .bind(fields.duration_minutes)
    .bind(fields.instructions)
    .bind(now)
    .bind(id)
    .execute(executor)
    .await?;
    Ok(())
}

pub(crate) async fn find_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: i64,
) -> Result<Option<TestPaper>, sqlx::Error> {
    sqlx::query_as::<_, TestPaper>(&format!(
        "SELECT {TEST_PAPER_COLUMNS} FROM test_papers WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
}

/// Row-locks the paper until the surrounding transaction ends.
pub(crate) async fn find_by_id_for_update(
    executor: &mut sqlx::Transaction<'_, Postgres>,
    id: i64,
) -> Result<Option<TestPaper>, sqlx::Error> {
    sqlx::query_as::<_, TestPaper>(&format!(
        "SELECT {TEST_PAPER_COLUMNS} FROM test_papers WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(&mut **executor)
    .await
}

pub(crate) async fn delete(
    executor: impl sqlx::PgExecutor<'_>,
    id: i64,
) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM test_papers WHERE id = $1").bind(id).execute(executor).await?;
    Ok(result.rows_affected() > 0)
}

/// Detaches every question from the paper and attaches `question_ids` in order,
/// numbering positions from 1.
pub(crate) async fn replace_associations(
    executor: &mut sqlx::Transaction<'_, Postgres>,
    test_paper_id: i64,
    question_ids: &[i64],
    now: PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM test_paper_questions WHERE test_paper_id = $1")
        .bind(test_paper_id)
        .execute(&mut **executor)
        .await?;

    for (index, question_id) in question_ids.iter().enumerate() {
        sqlx::query(
            "INSERT INTO test_paper_questions (
                test_paper_id, question_id, \"order\", created_at, updated_at
             ) VALUES ($1,$2,$3,$4,$5)",
        )
        .bind(test_paper_id)
        .bind(question_id)
        .bind(index as i32 + 1)
        .bind(now)
        .bind(now)
        .execute(&mut **executor)
        .await?;
    }

    Ok(())
}

/// Closes gaps left by removed associations so positions run `1..=n` again.
pub(crate) async fn renumber_positions(
    executor: impl sqlx::PgExecutor<'_>,
    test_paper_id: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE test_paper_questions tpq SET \"order\" = ranked.position
         FROM (
            SELECT id, ROW_NUMBER() OVER (ORDER BY \"order\", id)::int AS position
            FROM test_paper_questions
            WHERE test_paper_id = $1
         ) ranked
         WHERE tpq.id = ranked.id AND tpq.\"order\" <> ranked.position",
    )
    .bind(test_paper_id)
    .execute(executor)
    .await?;
    Ok(())
}

/// Sets `total_points` to the sum of the currently attached questions' points.
pub(crate) async fn recompute_total_points(
    executor: impl sqlx::PgExecutor<'_>,
    test_paper_id: i64,
    now: PrimitiveDateTime,
) -> Result<TestPaper, sqlx::Error> {
    sqlx::query_as::<_, TestPaper>(&format!(
        "UPDATE test_papers SET
            total_points = (
                SELECT COALESCE(SUM(q.points), 0)::int
                FROM test_paper_questions tpq
                JOIN questions q ON q.id = tpq.question_id
                WHERE tpq.test_paper_id = $1
            ),
            updated_at = $2
         WHERE id = $1
         RETURNING {TEST_PAPER_COLUMNS}"
    ))
    .bind(test_paper_id)
    .bind(now)
    .fetch_one(executor)
    .await
}

pub(crate) async fn list_ids_containing_question(
    executor: &mut sqlx::Transaction<'_, Postgres>,
    question_id: i64,
) -> Result<Vec<i64>, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT test_paper_id
         FROM test_paper_questions
         WHERE question_id = $1
         ORDER BY test_paper_id",
    )
    .bind(question_id)
    .fetch_all(&mut **executor)
    .await
}

pub(crate) async fn list_questions(
    executor: impl sqlx::PgExecutor<'_>,
    test_paper_id: i64,
) -> Result<Vec<PaperQuestion>, sqlx::Error> {
    sqlx::query_as::<_, PaperQuestion>(&format!(
        "SELECT {QUALIFIED_QUESTION_COLUMNS}, tpq.\"order\" AS position
         FROM test_paper_questions tpq
         JOIN questions q ON q.id = tpq.question_id
         WHERE tpq.test_paper_id = $1
         ORDER BY tpq.\"order\""
    ))
    .bind(test_paper_id)
    .fetch_all(executor)
    .await
}

pub(crate) async fn count_for_owner(pool: &PgPool, user_id: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM test_papers WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
}

pub(crate) async fn list_for_owner(
    pool: &PgPool,
    user_id: &str,
    offset: i64,
    limit: i64,
) -> Result<Vec<TestPaperSummaryRow>, sqlx::Error> {
    sqlx::query_as::<_, TestPaperSummaryRow>(
        "SELECT tp.id, tp.user_id, tp.title, tp.grade_level, tp.subject, tp.duration_minutes,
                tp.instructions, tp.total_points, tp.created_at, tp.updated_at,
                COALESCE(items.questions_count, 0) AS questions_count
         FROM test_papers tp
         LEFT JOIN (
             SELECT test_paper_id, COUNT(*) AS questions_count
             FROM test_paper_questions
             GROUP BY test_paper_id
         ) items ON items.test_paper_id = tp.id
         WHERE tp.user_id = $1
         ORDER BY tp.created_at DESC, tp.id DESC
         OFFSET $2
         LIMIT $3",
    )
    .bind(user_id)
    .bind(offset.max(0))
    .bind(limit.clamp(1, 1000))
    .fetch_all(pool)
    .await
}

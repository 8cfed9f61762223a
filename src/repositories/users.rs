use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::User;

const COLUMNS: &str = "id, email, full_name, hashed_password, is_active, created_at, updated_at";

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE lower(email) = lower($1)"))
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn exists_by_email(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM users WHERE lower(email) = lower($1))",
    )
    .bind(email)
    .fetch_one(pool)
    .await
}

pub(crate) struct CreateUser<'a> {
    pub(crate) id: &'a str,
    pub(crate) email: &'a str,
    pub(crate) full_name: &'a str,
    pub(crate) hashed_password: String,
    pub(crate) is_active: bool,
    pub(crate) now: PrimitiveDateTime,
}

pub(crate) async fn create(pool: &PgPool, params: CreateUser<'_>) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (id, email, full_name, hashed_password, is_active, created_at, updated_at)
         VALUES ($1,$2,$3,$4,$5,$6,$7)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.email)
    .bind(params.full_name)
    .bind(params.hashed_password)
    .bind(params.is_active)
    .bind(params.now)
    .bind(params.now)
    .fetch_one(pool)
    .await
}

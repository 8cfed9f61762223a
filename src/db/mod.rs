pub(crate) mod models;
pub(crate) mod types;

use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};

use crate::core::config::Settings;

pub(crate) async fn init_pool(settings: &Settings) -> Result<PgPool, sqlx::Error> {
    let database = settings.database();
    let connect_options: PgConnectOptions = database.url.parse()?;
    let connect_options = connect_options
        .application_name("question-bank")
        .log_statements(tracing::log::LevelFilter::Off);

    PgPoolOptions::new()
        .max_connections(database.max_connections)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(30))
        .test_before_acquire(true)
        .connect_with(connect_options)
        .await
}

pub(crate) async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Postgres SQLSTATE for a unique-constraint violation.
pub(crate) const UNIQUE_VIOLATION: &str = "23505";

pub(crate) fn is_unique_violation(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db_error) => db_error.code().as_deref() == Some(UNIQUE_VIOLATION),
        _ => false,
    }
}

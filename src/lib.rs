pub(crate) mod api;
pub(crate) mod core;
pub(crate) mod db;
pub(crate) mod repositories;
pub(crate) mod schemas;
pub(crate) mod services;

#[cfg(test)]
mod test_support;

use crate::core::{config::Settings, redis::RedisHandle, state::AppState, telemetry};

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    telemetry::init_tracing(&settings)?;
    core::metrics::init(&settings)?;

    let db_pool = db::init_pool(&settings).await?;
    db::run_migrations(&db_pool).await?;

    let redis = RedisHandle::new(settings.redis().url.clone());
    if let Err(err) = redis.connect().await {
        tracing::error!(error = %err, "Failed to connect to Redis; auth rate limiting disabled");
    } else {
        tracing::info!("Redis connected successfully");
    }

    let state = AppState::new(settings, db_pool, redis.clone());
    let app = api::router::router(state.clone());
    let listener = tokio::net::TcpListener::bind(state.settings().server().addr()).await?;

    tracing::info!(
        host = %state.settings().server().host,
        port = state.settings().server().port,
        environment = %state.settings().runtime().environment.as_str(),
        "Question bank API listening"
    );

    let result =
        axum::serve(listener, app).with_graceful_shutdown(core::shutdown::shutdown_signal()).await;

    redis.disconnect().await;
    tracing::info!("Redis disconnected");

    result?;

    Ok(())
}

use std::sync::Arc;

use redis::aio::ConnectionManager;
use redis::{cmd, Client, RedisError};
use tokio::sync::RwLock;

const RATE_LIMIT_SCRIPT: &str = r#"
    local current = redis.call("INCR", KEYS[1])
    if current == 1 then
        redis.call("EXPIRE", KEYS[1], ARGV[1])
    end
    return current
"#;

/// Lazily connected Redis handle. The service keeps running without Redis;
/// rate limiting then lets every request through.
#[derive(Clone)]
pub(crate) struct RedisHandle {
    url: String,
    manager: Arc<RwLock<Option<ConnectionManager>>>,
}

#[derive(Debug, Clone)]
pub(crate) enum RedisHealth {
    Healthy,
    Disconnected,
    Unhealthy(String),
}

impl RedisHandle {
    pub(crate) fn new(url: String) -> Self {
        Self { url, manager: Arc::new(RwLock::new(None)) }
    }

    pub(crate) async fn connect(&self) -> Result<(), RedisError> {
        let client = Client::open(self.url.clone())?;
        let manager = ConnectionManager::new(client).await?;
        *self.manager.write().await = Some(manager);
        Ok(())
    }

    pub(crate) async fn disconnect(&self) {
        *self.manager.write().await = None;
    }

    pub(crate) async fn health(&self) -> RedisHealth {
        let Some(mut manager) = self.current().await else {
            return RedisHealth::Disconnected;
        };

        match cmd("PING").query_async::<_, String>(&mut manager).await {
            Ok(_) => RedisHealth::Healthy,
            Err(err) => RedisHealth::Unhealthy(err.to_string()),
        }
    }

    /// Fixed-window counter; returns `false` once `limit` hits were seen in the window.
    pub(crate) async fn rate_limit(
        &self,
        key: &str,
        limit: u64,
        window_seconds: u64,
    ) -> Result<bool, RedisError> {
        let Some(mut manager) = self.current().await else {
            return Ok(true);
        };

        let current: i64 = redis::Script::new(RATE_LIMIT_SCRIPT)
            .key(key)
            .arg(window_seconds as i64)
            .invoke_async(&mut manager)
            .await?;

        Ok(current <= limit as i64)
    }

    async fn current(&self) -> Option<ConnectionManager> {
        self.manager.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::{RedisHandle, RedisHealth};

    #[tokio::test]
    async fn disconnected_handle_allows_requests() {
        let redis = RedisHandle::new("redis://127.0.0.1:6379/1".to_string());

        assert!(redis.rate_limit("rl:login:someone@example.org", 1, 60).await.unwrap());
        assert!(matches!(redis.health().await, RedisHealth::Disconnected));
    }
}

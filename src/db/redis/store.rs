use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use redis::Client;
use std::fmt::Display;

use crate::db::KeyValueStore;
use crate::error::AppResult;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StorageKey {
    /// Reading history of one browser session
    ReadingHistory(String),
}

impl Display for StorageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageKey::ReadingHistory(session) => write!(f, "reading-history:{}", session),
        }
    }
}

/// Opens a Redis connection manager for session storage
///
/// The manager multiplexes a single connection and reconnects on failure,
/// so it is cheap to clone into every request.
pub async fn create_redis_store(redis_url: &str) -> anyhow::Result<RedisStore> {
    let client = Client::open(redis_url)?;
    let manager = ConnectionManager::new(client).await?;
    Ok(RedisStore { manager })
}

/// Key-value store backed by Redis
#[derive(Clone)]
pub struct RedisStore {
    manager: ConnectionManager,
}

#[async_trait::async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &StorageKey) -> AppResult<Option<String>> {
        let mut conn = self.manager.clone();
        let value: Option<String> = conn.get(key.to_string()).await?;
        Ok(value)
    }

    async fn set(&self, key: &StorageKey, value: String) -> AppResult<()> {
        let mut conn = self.manager.clone();
        let _: () = conn.set(key.to_string(), value).await?;
        Ok(())
    }

    async fn delete(&self, key: &StorageKey) -> AppResult<()> {
        let mut conn = self.manager.clone();
        let _: () = conn.del(key.to_string()).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}

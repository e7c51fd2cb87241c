use crate::error::AppResult;

pub mod memory;
pub mod postgres;
pub mod redis;

pub use self::memory::MemoryStore;
pub use self::postgres::{create_pool, run_migrations};
pub use self::redis::{create_redis_store, RedisStore, StorageKey};

/// String key-value storage backing per-session state
///
/// Implementations hold one JSON document per key. A missing key reads as `None`;
/// deleting a missing key is not an error.
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &StorageKey) -> AppResult<Option<String>>;

    async fn set(&self, key: &StorageKey, value: String) -> AppResult<()>;

    async fn delete(&self, key: &StorageKey) -> AppResult<()>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

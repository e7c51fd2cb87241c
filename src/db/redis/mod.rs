pub mod store;

pub use store::create_redis_store;
pub use store::RedisStore;
pub use store::StorageKey;

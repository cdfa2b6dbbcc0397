//! Store backend implementations.
//!
//! Concrete implementations of `kvcache_core::cache::KeyValueStore`. The
//! backend is chosen at runtime from `Config::backend`:
//!
//! - `redis` (default): a Redis server reached through the `redis` crate
//! - `memory`: an in-process store with the same observable semantics

use std::sync::Arc;

use kvcache_core::cache::{KeyValueStore, Result};

use crate::config::{Backend, Config};

pub mod memory;
pub mod redis_impl;
mod status;

pub use memory::MemoryStore;
pub use redis_impl::RedisStore;
pub use status::ConnectionStatus;

/// Opens the store selected by `config`.
///
/// # Errors
///
/// Returns an error if the Redis URL is invalid. An unreachable server is not
/// an error: the store starts disconnected.
pub async fn open_store(config: &Config) -> Result<Arc<dyn KeyValueStore>> {
    match config.backend {
        Backend::Redis => {
            let store = RedisStore::new(
                &config.redis_url,
                config.health_interval(),
                config.connect_timeout(),
            )
            .await?;
            Ok(Arc::new(store))
        }
        Backend::Memory => {
            tracing::info!(max_entries = config.max_entries, "Using in-memory store");
            Ok(Arc::new(MemoryStore::new(config.max_entries)))
        }
    }
}

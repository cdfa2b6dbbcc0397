use async_trait::async_trait;

use super::{KeyTtl, Result, Ttl};

/// Port to an external key-value store.
///
/// Implementations wrap a single connection and forward each call as one
/// store command. They perform no retries.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns whether the underlying connection is currently established.
    fn is_connected(&self) -> bool;

    /// Gets a value by key.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Sets a value without touching its expiration.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Sets a value and its expiration in a single command.
    async fn set_with_expiry(&self, key: &str, value: &str, ttl: Ttl) -> Result<()>;

    /// Sets the expiration of an existing key. Returns false if the key does not exist.
    async fn expire(&self, key: &str, ttl: Ttl) -> Result<bool>;

    /// Deletes a key. Returns false if the key did not exist.
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Reports the remaining lifetime of a key.
    async fn time_to_live(&self, key: &str) -> Result<KeyTtl>;
}

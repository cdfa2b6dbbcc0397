//! Connection-scoped cache facade.
//!
//! `CacheFacade` owns one store connection and forwards each operation to it.
//! It holds no entries of its own; expiration is left to the store. The
//! facade is cheap to clone and is meant to be built once by the composition
//! root and handed to whatever needs cache access.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use kvcache_core::cache::{CacheError, CacheValue, ExpiryMode, KeyTtl, KeyValueStore, Result, Ttl};

use crate::config::Config;
use crate::store::open_store;

/// Thin facade over a single key-value store connection.
#[derive(Clone)]
pub struct CacheFacade {
    store: Arc<dyn KeyValueStore>,
    expiry_mode: ExpiryMode,
}

impl CacheFacade {
    /// Wraps an already opened store.
    pub fn new(store: Arc<dyn KeyValueStore>, expiry_mode: ExpiryMode) -> Self {
        Self { store, expiry_mode }
    }

    /// Opens the configured store and wraps it.
    ///
    /// An unreachable server does not fail construction: the error is logged
    /// and `is_alive()` reports false until the store answers.
    ///
    /// # Errors
    ///
    /// Returns an error if the store configuration is invalid.
    pub async fn connect(config: &Config) -> Result<Self> {
        let store = open_store(config).await?;
        tracing::debug!(expiry_mode = %config.expiry_mode, "Cache facade ready");
        Ok(Self::new(store, config.expiry_mode))
    }

    pub fn expiry_mode(&self) -> ExpiryMode {
        self.expiry_mode
    }

    /// Returns whether the store connection is currently established.
    pub fn is_alive(&self) -> bool {
        self.store.is_connected()
    }

    /// Gets the string form of the value stored under `key`.
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        tracing::debug!(key, "cache get");
        self.store.get(key).await
    }

    /// Stores `value` under `key`, expiring after `duration`.
    ///
    /// Sub-second durations round up to one second.
    ///
    /// # Errors
    ///
    /// - `CacheError::InvalidTtl` if `duration` is zero; the store is not touched.
    /// - `CacheError::ExpirationNotApplied` in `ExpiryMode::Separate` when the
    ///   value was written but the expiration write failed.
    /// - Any transport or command error from the store.
    pub async fn set(
        &self,
        key: &str,
        value: impl Into<CacheValue>,
        duration: Duration,
    ) -> Result<()> {
        let ttl = Ttl::from_duration(duration)?;
        let encoded = value.into().encode();
        tracing::debug!(key, ttl_secs = ttl.as_secs(), mode = %self.expiry_mode, "cache set");

        match self.expiry_mode {
            ExpiryMode::Atomic => self.store.set_with_expiry(key, &encoded, ttl).await,
            ExpiryMode::Separate => {
                self.store.set(key, &encoded).await?;
                match self.store.expire(key, ttl).await {
                    Ok(true) => Ok(()),
                    Ok(false) => {
                        // Deleted or evicted between the two writes.
                        tracing::debug!(key, "key gone before expiration was set");
                        Ok(())
                    }
                    Err(e) => {
                        tracing::warn!(key, error = %e, "value written without expiration");
                        Err(CacheError::ExpirationNotApplied {
                            key: key.to_string(),
                            reason: e.to_string(),
                        })
                    }
                }
            }
        }
    }

    /// Deletes `key`. Deleting a missing key is not an error.
    pub async fn del(&self, key: &str) -> Result<()> {
        let existed = self.store.delete(key).await?;
        tracing::debug!(key, existed, "cache del");
        Ok(())
    }

    /// Reports the remaining lifetime of `key`.
    pub async fn ttl(&self, key: &str) -> Result<KeyTtl> {
        self.store.time_to_live(key).await
    }
}

impl fmt::Debug for CacheFacade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheFacade")
            .field("expiry_mode", &self.expiry_mode)
            .field("alive", &self.is_alive())
            .finish()
    }
}

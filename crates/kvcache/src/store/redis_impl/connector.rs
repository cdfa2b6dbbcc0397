//! Lazily established Redis connection.
//!
//! The `ConnectionManager` is created on first successful contact with the
//! server. Until then every caller (commands and the monitor) makes one
//! bounded attempt, so an unreachable server is reported in about one
//! connection timeout instead of blocking construction.

use std::time::Duration;

use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use tokio::sync::OnceCell;

/// Retries after the first failed attempt, per connect.
const CONNECT_RETRIES: usize = 1;
/// Cap on the backoff between attempts, in milliseconds.
const MAX_RETRY_DELAY_MS: u64 = 500;

pub struct Connector {
    client: redis::Client,
    timeout: Duration,
    manager: OnceCell<ConnectionManager>,
}

impl Connector {
    pub fn new(client: redis::Client, timeout: Duration) -> Self {
        Self {
            client,
            timeout,
            manager: OnceCell::new(),
        }
    }

    /// Returns true once a connection manager exists.
    pub fn is_established(&self) -> bool {
        self.manager.initialized()
    }

    /// Returns a handle to the shared connection, connecting first if needed.
    ///
    /// Once established, the manager reconnects on its own after drops.
    pub async fn connection(&self) -> redis::RedisResult<ConnectionManager> {
        self.manager
            .get_or_try_init(|| {
                let config = manager_config(self.timeout);
                ConnectionManager::new_with_config(self.client.clone(), config)
            })
            .await
            .cloned()
    }
}

fn manager_config(timeout: Duration) -> ConnectionManagerConfig {
    ConnectionManagerConfig::new()
        .set_number_of_retries(CONNECT_RETRIES)
        .set_max_delay(MAX_RETRY_DELAY_MS)
        .set_connection_timeout(timeout)
}

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use kvcache_core::cache::{ConnectionState, KeyTtl, KeyValueStore, Result, Ttl};

use super::connector::Connector;
use super::error::{is_transport_error, map_redis_error};
use super::monitor::ConnectionMonitor;
use crate::store::status::ConnectionStatus;

/// Redis store backend using a connection manager.
///
/// One multiplexed connection is shared by every caller; each call clones
/// the manager handle and issues exactly one command. An unreachable server
/// does not fail construction: the store starts disconnected and connects
/// on the first command or monitor probe that reaches the server.
pub struct RedisStore {
    connector: Arc<Connector>,
    status: Arc<ConnectionStatus>,
    _monitor: ConnectionMonitor,
}

impl RedisStore {
    /// Creates a new Redis store.
    ///
    /// # Arguments
    ///
    /// * `url` - Redis connection URL (e.g., "redis://127.0.0.1:6379")
    /// * `health_interval` - Interval between background liveness probes
    /// * `connect_timeout` - Upper bound for a single connection attempt
    ///
    /// # Errors
    ///
    /// Returns `CacheError::OperationFailed` if `url` is not a valid Redis URL.
    pub async fn new(
        url: &str,
        health_interval: Duration,
        connect_timeout: Duration,
    ) -> Result<Self> {
        let client = redis::Client::open(url).map_err(map_redis_error)?;
        let addr = client.get_connection_info().addr.to_string();
        let connector = Arc::new(Connector::new(client, connect_timeout));

        let initial = match connector.connection().await {
            Ok(_) => {
                tracing::info!(%addr, "Connected to Redis");
                ConnectionState::Connected
            }
            Err(e) => {
                tracing::error!(%addr, error = %e, "Redis client error");
                ConnectionState::Disconnected
            }
        };

        let status = Arc::new(ConnectionStatus::new("redis", initial));
        let monitor = ConnectionMonitor::spawn(
            Arc::clone(&connector),
            Arc::clone(&status),
            health_interval,
        );

        Ok(Self {
            connector,
            status,
            _monitor: monitor,
        })
    }

    /// Feeds a reply into the status flag and maps its error.
    fn observe<T>(&self, result: redis::RedisResult<T>) -> Result<T> {
        match result {
            Ok(value) => {
                self.status.mark_connected();
                Ok(value)
            }
            Err(e) => {
                if is_transport_error(&e) {
                    self.status.record_failure(&e.to_string());
                }
                Err(map_redis_error(e))
            }
        }
    }

    /// Runs one command on the shared connection, connecting first if needed.
    async fn run<T, F, Fut>(&self, command: F) -> Result<T>
    where
        F: FnOnce(ConnectionManager) -> Fut,
        Fut: Future<Output = redis::RedisResult<T>>,
    {
        let result = match self.connector.connection().await {
            Ok(conn) => command(conn).await,
            Err(e) => Err(e),
        };
        self.observe(result)
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    fn is_connected(&self) -> bool {
        self.status.is_connected()
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.run(|mut conn| async move { conn.get::<_, Option<String>>(key).await }).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.run(|mut conn| async move { conn.set::<_, _, ()>(key, value).await }).await
    }

    async fn set_with_expiry(&self, key: &str, value: &str, ttl: Ttl) -> Result<()> {
        self.run(|mut conn| async move { conn.set_ex::<_, _, ()>(key, value, ttl.as_secs()).await })
            .await
    }

    async fn expire(&self, key: &str, ttl: Ttl) -> Result<bool> {
        let seconds = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        self.run(|mut conn| async move { conn.expire::<_, bool>(key, seconds).await }).await
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        self.run(|mut conn| async move { conn.del::<_, i64>(key).await })
            .await
            .map(|removed| removed > 0)
    }

    async fn time_to_live(&self, key: &str) -> Result<KeyTtl> {
        self.run(|mut conn| async move { conn.ttl::<_, i64>(key).await })
            .await
            .map(KeyTtl::from_reply)
    }
}

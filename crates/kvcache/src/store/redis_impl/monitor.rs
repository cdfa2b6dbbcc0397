//! Background connection monitor.
//!
//! Periodically sends `PING` over the shared connection, connecting first if
//! the server was unreachable so far. Every failure is logged once as it
//! arrives and transport failures flip the shared status flag. A successful
//! reply flips it back. The monitor never closes or replaces an established
//! connection; reconnecting is left to the `ConnectionManager`.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::connector::Connector;
use super::error::is_transport_error;
use crate::store::status::ConnectionStatus;

/// Handle to the monitor task. The task is aborted on drop.
pub struct ConnectionMonitor {
    handle: JoinHandle<()>,
}

impl ConnectionMonitor {
    /// Spawns the monitor on the current tokio runtime.
    pub fn spawn(
        connector: Arc<Connector>,
        status: Arc<ConnectionStatus>,
        interval: Duration,
    ) -> Self {
        let handle = tokio::spawn(run_monitor_loop(connector, status, interval));
        Self { handle }
    }
}

impl Drop for ConnectionMonitor {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Outcome of a single probe.
#[derive(Debug)]
enum Probe {
    Alive,
    Failed { reason: String, transport: bool },
}

async fn probe(connector: &Connector, timeout: Duration) -> Probe {
    let ping = async {
        let mut conn = connector.connection().await?;
        redis::cmd("PING").query_async::<String>(&mut conn).await
    };
    let reply = tokio::time::timeout(timeout, ping).await;

    match reply {
        Ok(Ok(_)) => Probe::Alive,
        Ok(Err(e)) => Probe::Failed {
            transport: is_transport_error(&e),
            reason: e.to_string(),
        },
        Err(_) => Probe::Failed {
            reason: format!("PING timed out after {}ms", timeout.as_millis()),
            transport: true,
        },
    }
}

async fn run_monitor_loop(
    connector: Arc<Connector>,
    status: Arc<ConnectionStatus>,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    // The first tick completes immediately; construction just tried to connect.
    ticker.tick().await;

    loop {
        ticker.tick().await;

        match probe(&connector, interval).await {
            Probe::Alive => {
                status.mark_connected();
            }
            Probe::Failed {
                reason,
                transport: true,
            } => {
                status.record_failure(&reason);
            }
            Probe::Failed {
                reason,
                transport: false,
            } => {
                tracing::error!(error = %reason, "Redis client error");
            }
        }
    }
}

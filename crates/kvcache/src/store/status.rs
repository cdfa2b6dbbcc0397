//! Shared connection state flag.

use std::sync::atomic::{AtomicBool, Ordering};

use kvcache_core::cache::ConnectionState;

/// Connected/disconnected flag shared between a store and its monitor.
///
/// Transitions are logged once per edge; repeated marks in the same state
/// are silent.
#[derive(Debug)]
pub struct ConnectionStatus {
    backend: &'static str,
    connected: AtomicBool,
}

impl ConnectionStatus {
    /// Creates a status flag for `backend`, starting in `initial` state.
    pub fn new(backend: &'static str, initial: ConnectionState) -> Self {
        Self {
            backend,
            connected: AtomicBool::new(initial.is_connected()),
        }
    }

    pub fn state(&self) -> ConnectionState {
        ConnectionState::from(self.is_connected())
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Records that the transport answered. Returns true on a transition.
    pub fn mark_connected(&self) -> bool {
        let was_connected = self.connected.swap(true, Ordering::AcqRel);
        if !was_connected {
            tracing::info!(backend = self.backend, "Cache connection restored");
        }
        !was_connected
    }

    /// Records a transport failure. Returns true on a transition.
    pub fn mark_disconnected(&self, reason: &str) -> bool {
        let was_connected = self.connected.swap(false, Ordering::AcqRel);
        if was_connected {
            tracing::error!(backend = self.backend, %reason, "Cache connection lost");
        }
        was_connected
    }

    /// Records a transport error observed on the live connection.
    ///
    /// Emits exactly one `error!` per call: the loss message on a transition,
    /// the client error otherwise. Returns true on a transition.
    pub fn record_failure(&self, reason: &str) -> bool {
        let transitioned = self.mark_disconnected(reason);
        if !transitioned {
            tracing::error!(backend = self.backend, %reason, "Cache client error");
        }
        transitioned
    }
}

//! kvcache - a connection-scoped key-value cache facade.
//!
//! The facade owns one connection to an external store (Redis by default),
//! reports its liveness and forwards `get`, `set` with expiration and `del`.

pub mod cli;
pub mod config;
pub mod facade;
pub mod output;
pub mod store;

pub use config::{Backend, Config};
pub use facade::CacheFacade;
pub use kvcache_core::cache::{
    CacheError, CacheValue, ConnectionState, ExpiryMode, KeyTtl, Result, ValueKind,
};

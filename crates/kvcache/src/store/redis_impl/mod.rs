//! Redis store backend.
//!
//! Wraps one lazily established `ConnectionManager` and a background monitor
//! that probes the connection and logs transport errors as they happen.

mod connector;
mod error;
mod monitor;
mod store;

pub use store::RedisStore;

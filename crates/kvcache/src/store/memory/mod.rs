//! In-memory store backend.
//!
//! Mirrors the Redis backend's observable behavior in-process: string values,
//! per-key expiration, delete-as-no-op for missing keys and a connection flag
//! that can be severed to simulate transport loss.

mod store;

pub use store::MemoryStore;

//! Core types for kvcache.
//!
//! This crate holds the pure pieces of the cache facade: the value model,
//! expiration types, the error taxonomy and the `KeyValueStore` port that
//! concrete backends implement. It performs no I/O.

pub mod cache;

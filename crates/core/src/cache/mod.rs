mod error;
mod expiry;
mod traits;
mod value;

pub use error::{CacheError, Result};
pub use expiry::{ConnectionState, ExpiryMode, KeyTtl, Ttl};
pub use traits::KeyValueStore;
pub use value::{CacheValue, ValueKind};

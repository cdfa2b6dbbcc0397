//! Redis error mapping to CacheError.

use kvcache_core::cache::CacheError;

/// Returns true if the error comes from the transport rather than the command.
pub fn is_transport_error(err: &redis::RedisError) -> bool {
    err.is_connection_refusal()
        || err.is_timeout()
        || err.is_connection_dropped()
        || err.is_io_error()
}

/// Maps Redis errors to CacheError.
pub fn map_redis_error(err: redis::RedisError) -> CacheError {
    if is_transport_error(&err) {
        CacheError::ConnectionFailed(err.to_string())
    } else {
        CacheError::OperationFailed(err.to_string())
    }
}

use thiserror::Error;

/// Errors that can occur during cache operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("Cache connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Cache operation failed: {0}")]
    OperationFailed(String),
    /// The value was written but its expiration was not. The key is left
    /// without a TTL until it is overwritten or deleted.
    #[error("Expiration not applied to '{key}': {reason}")]
    ExpirationNotApplied { key: String, reason: String },
    #[error("Invalid TTL: {0}")]
    InvalidTtl(String),
    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

impl CacheError {
    /// Returns true if the error comes from the transport rather than from
    /// a single command.
    pub fn is_connection_error(&self) -> bool {
        matches!(self, CacheError::ConnectionFailed(_))
    }
}

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

//! Output formatting for CLI results.

use serde::Serialize;

use kvcache_core::cache::{ConnectionState, KeyTtl};

use crate::cli::OutputFormat;

/// Result of a liveness check.
#[derive(Debug, Serialize)]
pub struct PingOutput {
    pub alive: bool,
    pub state: ConnectionState,
}

/// Result of a read.
#[derive(Debug, Serialize)]
pub struct GetOutput {
    pub key: String,
    pub value: Option<String>,
}

/// Result of a TTL lookup.
#[derive(Debug, Serialize)]
pub struct TtlOutput {
    pub key: String,
    pub ttl: KeyTtl,
}

/// Format a value as JSON.
pub fn format_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

/// Format a ping result.
pub fn format_ping(output: &PingOutput, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => format_json(output),
        OutputFormat::Pretty => format!("Connection: {}", output.state),
    }
}

/// Format a read result. A missing key prints as `(nil)`.
pub fn format_get(output: &GetOutput, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => format_json(output),
        OutputFormat::Pretty => match &output.value {
            Some(value) => value.clone(),
            None => "(nil)".to_string(),
        },
    }
}

/// Format a TTL result.
pub fn format_ttl(output: &TtlOutput, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => format_json(output),
        OutputFormat::Pretty => format!("{}: {}", output.key, output.ttl),
    }
}

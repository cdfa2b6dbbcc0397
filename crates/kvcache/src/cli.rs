//! CLI command definitions.

use clap::{Parser, Subcommand, ValueEnum};

use kvcache_core::cache::{ExpiryMode, ValueKind};

use crate::config::{Backend, Config};

/// Key-value cache facade over Redis.
#[derive(Debug, Parser)]
#[command(name = "kvcache")]
#[command(version, about = "Key-value cache facade over Redis", long_about = None)]
pub struct Cli {
    /// Redis connection URL. Overrides REDIS_URL.
    #[arg(long)]
    pub redis_url: Option<String>,

    /// Store backend. Overrides CACHE_BACKEND.
    #[arg(long)]
    pub backend: Option<Backend>,

    /// How values and expirations are written: "atomic" or "separate".
    /// Overrides CACHE_EXPIRY_MODE.
    #[arg(long)]
    pub expiry_mode: Option<ExpiryMode>,

    /// Output format.
    #[arg(long, default_value = "pretty")]
    pub format: OutputFormat,

    /// Suppress non-essential output.
    #[arg(long)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Applies command-line overrides on top of `config`.
    pub fn apply_to(&self, mut config: Config) -> Config {
        if let Some(url) = &self.redis_url {
            config.redis_url = url.clone();
        }
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if let Some(mode) = self.expiry_mode {
            config.expiry_mode = mode;
        }
        config
    }
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Raw JSON output.
    Json,
    /// Human-readable output.
    #[default]
    Pretty,
}

/// Kind a value argument is parsed as before being stored.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum KindArg {
    #[default]
    Text,
    Integer,
    Float,
    Boolean,
}

impl From<KindArg> for ValueKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Text => ValueKind::Text,
            KindArg::Integer => ValueKind::Integer,
            KindArg::Float => ValueKind::Float,
            KindArg::Boolean => ValueKind::Boolean,
        }
    }
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Report whether the store connection is alive.
    Ping,
    /// Read a key.
    Get {
        /// Key to read.
        key: String,
    },
    /// Write a key with an expiration.
    Set {
        /// Key to write.
        key: String,
        /// Value to store.
        value: String,
        /// Expiration in seconds.
        #[arg(long, short)]
        ttl: u64,
        /// Parse the value as this kind before storing it.
        #[arg(long, default_value = "text")]
        kind: KindArg,
    },
    /// Delete a key. Missing keys are not an error.
    Del {
        /// Key to delete.
        key: String,
    },
    /// Show the remaining lifetime of a key.
    Ttl {
        /// Key to inspect.
        key: String,
    },
}

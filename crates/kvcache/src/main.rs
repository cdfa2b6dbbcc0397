//! kvcache CLI entry point.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kvcache::cli::{Cli, Commands};
use kvcache::output::{format_get, format_ping, format_ttl, GetOutput, PingOutput, TtlOutput};
use kvcache::{CacheFacade, CacheValue, Config, ConnectionState};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber; stdout is reserved for command output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kvcache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = cli.apply_to(Config::from_env());

    let cache = CacheFacade::connect(&config)
        .await
        .with_context(|| format!("failed to open {:?} cache backend", config.backend))?;

    match cli.command {
        Commands::Ping => {
            let alive = cache.is_alive();
            let output = PingOutput {
                alive,
                state: ConnectionState::from(alive),
            };
            println!("{}", format_ping(&output, cli.format));
            if !alive {
                anyhow::bail!("cache connection is down");
            }
        }
        Commands::Get { key } => {
            let value = cache.get(&key).await?;
            println!("{}", format_get(&GetOutput { key, value }, cli.format));
        }
        Commands::Set {
            key,
            value,
            ttl,
            kind,
        } => {
            let value = CacheValue::parse(&value, kind.into())?;
            cache.set(&key, value, Duration::from_secs(ttl)).await?;
            if !cli.quiet {
                println!("Set {} (expires in {}s)", key, ttl);
            }
        }
        Commands::Del { key } => {
            cache.del(&key).await?;
            if !cli.quiet {
                println!("Deleted {}", key);
            }
        }
        Commands::Ttl { key } => {
            let ttl = cache.ttl(&key).await?;
            println!("{}", format_ttl(&TtlOutput { key, ttl }, cli.format));
        }
    }

    Ok(())
}

//! Integration test infrastructure.
//!
//! Runs the kvcache test suite against a real Redis server.
//!
//! # Usage
//!
//! ```bash
//! # Start Redis in a container, run the tests, stop the container
//! cargo xtask integration
//!
//! # Skip container management (assumes Redis is already running)
//! cargo xtask integration --no-docker
//!
//! # Leave the container running afterwards
//! cargo xtask integration --keep-containers
//! ```

pub mod error;

pub use error::{IntegrationError, Result};

use std::time::Duration;

use crate::containers::{
    detect_runtime, is_running, redis_url, start_container, stop_container, wait_for_health,
    ContainerRuntime, REDIS_SPEC,
};
use crate::prelude::*;

/// Integration test command.
#[derive(Debug, clap::Parser)]
#[command(long_about = "Run integration tests against a real Redis server.

This command starts a Redis container with Docker or Podman, waits for it
to answer PING, runs the kvcache test suite with REDIS_URL pointing at it,
and stops the container afterwards.

Environment variables:
  REDIS_URL  - Redis URL used with --no-docker (default: redis://127.0.0.1:6379)")]
pub struct IntegrationCommand {
    /// Skip Docker container management (assume Redis is already running).
    #[arg(long)]
    pub no_docker: bool,

    /// Keep containers running after tests complete.
    #[arg(long)]
    pub keep_containers: bool,

    /// Timeout in seconds for container health checks.
    #[arg(long, default_value = "30")]
    pub health_timeout: u64,
}

/// Main entry point for integration command.
pub async fn run(command: IntegrationCommand, global: crate::Global) -> Result<()> {
    if !global.is_silent() {
        aprintln!("{}", p_b("Integration Tests"));
        aprintln!();
    }

    let runtime = if command.no_docker {
        if !global.is_silent() {
            aprintln!(
                "{} {}",
                p_y("⚠️"),
                "Skipping Redis container management (--no-docker)"
            );
        }
        None
    } else {
        Some(detect_runtime().await?)
    };

    let url = if command.no_docker {
        std::env::var("REDIS_URL").unwrap_or_else(|_| redis_url(&REDIS_SPEC))
    } else {
        redis_url(&REDIS_SPEC)
    };

    let mut redis_started = false;
    if let Some(rt) = runtime {
        redis_started = start_redis_container(command.health_timeout, &global, rt).await?;
    }

    let passed = run_tests(&url, &global).await;

    if !command.keep_containers {
        if let Some(rt) = runtime {
            if redis_started {
                stop_redis_container(&global, rt).await?;
            }
        }
    } else if redis_started && !global.is_silent() {
        aprintln!(
            "{} {}",
            p_y("⚠️"),
            "Containers left running (--keep-containers)"
        );
    }

    aprintln!();
    if passed? {
        aprintln!("{} {}", p_g("✅"), p_g("All integration tests passed!"));
        Ok(())
    } else {
        aprintln!("{} {}", p_r("❌"), p_r("Some integration tests failed"));
        Err(IntegrationError::TestFailed(
            "kvcache test suite failed".to_string(),
        ))
    }
}

/// Runs `cargo test` for the kvcache crates against `url`.
async fn run_tests(url: &str, global: &crate::Global) -> Result<bool> {
    if !global.is_silent() {
        aprintln!("{} Running tests with REDIS_URL={}", p_b("  →"), p_y(url));
    }

    let status = tokio::process::Command::new("cargo")
        .args(["test", "-p", "kvcache", "-p", "kvcache_core"])
        .env("REDIS_URL", url)
        .status()
        .await?;

    Ok(status.success())
}

/// Start the Redis container. Returns false if one was already running.
async fn start_redis_container(
    timeout_secs: u64,
    global: &crate::Global,
    runtime: ContainerRuntime,
) -> Result<bool> {
    if is_running(runtime, REDIS_SPEC.name).await? {
        if !global.is_silent() {
            aprintln!("{} {}", p_y("⚠️"), "Redis container already running");
        }
        return Ok(false);
    }

    if !global.is_silent() {
        aprintln!("{} {}", p_b("🐳"), "Starting Redis container...");
    }

    start_container(runtime, &REDIS_SPEC).await?;

    if !global.is_silent() {
        aprintln!(
            "{} {}",
            p_b("⏳"),
            format!("Waiting for Redis health (max {}s)...", timeout_secs)
        );
    }

    wait_for_health(runtime, &REDIS_SPEC, Duration::from_secs(timeout_secs)).await?;

    if !global.is_silent() {
        aprintln!("{} {}", p_g("✅"), "Redis is ready");
    }

    Ok(true)
}

/// Stop the Redis container.
async fn stop_redis_container(global: &crate::Global, runtime: ContainerRuntime) -> Result<()> {
    if !global.is_silent() {
        aprintln!("{} {}", p_b("🐳"), "Stopping Redis container...");
    }

    stop_container(runtime, REDIS_SPEC.name).await?;

    if !global.is_silent() {
        aprintln!("{} {}", p_g("✅"), "Redis container stopped");
    }

    Ok(())
}

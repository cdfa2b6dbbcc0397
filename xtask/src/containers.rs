//! Container management for the Redis test dependency.
//!
//! Pure functions build command arguments; I/O functions run the container
//! runtime, check health and manage the container lifecycle.

use std::time::Duration;

use tokio::process::Command;

use crate::integration::{IntegrationError, Result};

/// Container runtime (Docker or Podman).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContainerRuntime {
    #[default]
    Docker,
    Podman,
}

/// Specification for a container.
#[derive(Debug, Clone)]
pub struct ContainerSpec {
    pub name: &'static str,
    pub image: &'static str,
    pub port: u16,
    pub command: Option<&'static str>,
}

/// Redis container specification. No volume: test data is throwaway.
pub const REDIS_SPEC: ContainerSpec = ContainerSpec {
    name: "kvcache-redis",
    image: "redis:7-alpine",
    port: 6379,
    command: Some("redis-server --save '' --appendonly no"),
};

// ============================================================================
// Pure Functions
// ============================================================================

/// Builds arguments for `docker run` / `podman run`.
pub fn container_run_args(spec: &ContainerSpec) -> Vec<String> {
    let mut args = vec![
        "run".to_string(),
        "--name".to_string(),
        spec.name.to_string(),
        "-d".to_string(),
        "--rm".to_string(),
        "-p".to_string(),
        format!("{}:{}", spec.port, spec.port),
        spec.image.to_string(),
    ];

    if let Some(cmd) = spec.command {
        args.extend(cmd.split_whitespace().map(|arg| arg.replace('\'', "")));
    }

    args
}

/// Returns the Redis URL a test run should use for `spec`.
pub fn redis_url(spec: &ContainerSpec) -> String {
    format!("redis://127.0.0.1:{}", spec.port)
}

/// Returns the command name for the container runtime.
pub fn runtime_command(runtime: ContainerRuntime) -> &'static str {
    match runtime {
        ContainerRuntime::Docker => "docker",
        ContainerRuntime::Podman => "podman",
    }
}

// ============================================================================
// I/O Functions
// ============================================================================

/// Detects which container runtime is available, Docker first.
pub async fn detect_runtime() -> Result<ContainerRuntime> {
    for runtime in [ContainerRuntime::Docker, ContainerRuntime::Podman] {
        let output = Command::new(runtime_command(runtime))
            .arg("--version")
            .output()
            .await;

        if let Ok(output) = output {
            if output.status.success() {
                return Ok(runtime);
            }
        }
    }

    Err(IntegrationError::DockerNotAvailable(
        "Neither docker nor podman found in PATH".to_string(),
    ))
}

/// Returns true if a container named `name` is running.
pub async fn is_running(runtime: ContainerRuntime, name: &str) -> Result<bool> {
    let output = Command::new(runtime_command(runtime))
        .args(["ps", "-q", "-f", &format!("name={}", name)])
        .output()
        .await?;

    Ok(!String::from_utf8_lossy(&output.stdout).trim().is_empty())
}

/// Stops and removes a container.
///
/// Errors are ignored since the container might not exist.
pub async fn stop_container(runtime: ContainerRuntime, name: &str) -> Result<()> {
    let cmd = runtime_command(runtime);

    let _ = Command::new(cmd).args(["stop", name]).output().await;
    let _ = Command::new(cmd).args(["rm", name]).output().await;

    Ok(())
}

/// Starts a container, replacing any stopped container with the same name.
pub async fn start_container(runtime: ContainerRuntime, spec: &ContainerSpec) -> Result<()> {
    stop_container(runtime, spec.name).await?;

    let args = container_run_args(spec);
    let output = Command::new(runtime_command(runtime))
        .args(&args)
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(IntegrationError::ContainerFailed(format!(
            "Failed to start container '{}': {}",
            spec.name, stderr
        )));
    }

    Ok(())
}

/// Polls `redis-cli ping` inside the container until it answers or `timeout` passes.
pub async fn wait_for_health(
    runtime: ContainerRuntime,
    spec: &ContainerSpec,
    timeout: Duration,
) -> Result<()> {
    let start = std::time::Instant::now();
    let poll_interval = Duration::from_millis(500);

    while start.elapsed() < timeout {
        if check_redis_health(runtime, spec.name).await {
            return Ok(());
        }
        tokio::time::sleep(poll_interval).await;
    }

    Err(IntegrationError::ContainerNotHealthy {
        name: spec.name.to_string(),
        timeout_secs: timeout.as_secs(),
    })
}

async fn check_redis_health(runtime: ContainerRuntime, name: &str) -> bool {
    let output = Command::new(runtime_command(runtime))
        .args(["exec", name, "redis-cli", "ping"])
        .output()
        .await;

    match output {
        Ok(output) => {
            output.status.success() && String::from_utf8_lossy(&output.stdout).trim() == "PONG"
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_run_args_redis() {
        let args = container_run_args(&REDIS_SPEC);

        assert_eq!(&args[..3], ["run", "--name", "kvcache-redis"]);
        assert!(args.contains(&"-d".to_string()));
        assert!(args.contains(&"6379:6379".to_string()));
        assert!(args.contains(&"redis:7-alpine".to_string()));
        assert!(args.contains(&"redis-server".to_string()));
        assert!(args.contains(&"--appendonly".to_string()));
        assert!(args.contains(&"no".to_string()));
    }

    #[test]
    fn test_container_run_args_strip_quotes() {
        let args = container_run_args(&REDIS_SPEC);
        let save = args.iter().position(|a| a == "--save").unwrap();
        assert_eq!(args[save + 1], "");
    }

    #[test]
    fn test_container_run_args_without_command() {
        let spec = ContainerSpec {
            name: "plain",
            image: "redis:7-alpine",
            port: 6400,
            command: None,
        };
        let args = container_run_args(&spec);

        assert_eq!(args.last().unwrap(), "redis:7-alpine");
        assert!(args.contains(&"6400:6400".to_string()));
    }

    #[test]
    fn test_redis_url() {
        assert_eq!(redis_url(&REDIS_SPEC), "redis://127.0.0.1:6379");
    }

    #[test]
    fn test_runtime_command() {
        assert_eq!(runtime_command(ContainerRuntime::Docker), "docker");
        assert_eq!(runtime_command(ContainerRuntime::Podman), "podman");
    }
}

//! Docker invocation for the jaxbox launchers.
//!
//! This module builds `docker run` argument lists and invokes the docker
//! binary, either detached (batch launches, output captured) or in the
//! foreground with inherited stdio (interactive shell).

use crate::error::LaunchError;
use secrecy::{ExposeSecret, SecretString};
use std::path::PathBuf;
use std::process::ExitStatus;
use tracing::debug;

/// How the container is attached to the launcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunMode {
    /// `-d`: docker prints the container id and returns immediately
    Detached,
    /// `-i -t`: the TTY is handed to docker until the container exits
    Interactive,
}

/// A single `docker run` invocation, pinned to one GPU device.
///
/// The argument list is materialized by [`DockerRun::args`], which is pure
/// and unit-testable; [`DockerRun::spawn`] and [`DockerRun::run_foreground`]
/// hand it to the docker binary.
#[derive(Debug, Clone)]
pub struct DockerRun {
    image: String,
    device: u32,
    mode: RunMode,
    name: Option<String>,
    env: Vec<(String, String)>,
    secret_env: Vec<(String, SecretString)>,
    volumes: Vec<(PathBuf, String)>,
    command: Vec<String>,
}

impl DockerRun {
    /// A detached run (`docker run -d`) on the given device
    pub fn detached(image: impl Into<String>, device: u32) -> Self {
        Self::new(image.into(), device, RunMode::Detached)
    }

    /// An interactive run (`docker run -i -t`) on the given device
    pub fn interactive(image: impl Into<String>, device: u32) -> Self {
        Self::new(image.into(), device, RunMode::Interactive)
    }

    fn new(image: String, device: u32, mode: RunMode) -> Self {
        Self {
            image,
            device,
            mode,
            name: None,
            env: Vec::new(),
            secret_env: Vec::new(),
            volumes: Vec::new(),
            command: Vec::new(),
        }
    }

    /// Set the container name (`--name`)
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Inject an environment variable (`-e KEY=VALUE`)
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Inject a secret environment variable.
    ///
    /// The value is only exposed when the argument list is materialized.
    pub fn secret_env(mut self, key: impl Into<String>, value: SecretString) -> Self {
        self.secret_env.push((key.into(), value));
        self
    }

    /// Bind-mount a host path into the container (`-v HOST:TARGET`)
    pub fn volume(mut self, host: PathBuf, target: impl Into<String>) -> Self {
        self.volumes.push((host, target.into()));
        self
    }

    /// Set the command executed inside the container.
    ///
    /// Arguments are forwarded as given; an empty command leaves the image's
    /// default entrypoint command in effect.
    pub fn command(mut self, command: impl IntoIterator<Item = String>) -> Self {
        self.command = command.into_iter().collect();
        self
    }

    /// The GPU device this run is pinned to
    pub fn device(&self) -> u32 {
        self.device
    }

    /// Materialize the full `docker run` argument list
    pub fn args(&self) -> Vec<String> {
        let mut args = vec!["run".to_string()];

        match self.mode {
            RunMode::Detached => args.push("-d".to_string()),
            RunMode::Interactive => {
                args.push("-i".to_string());
                args.push("-t".to_string());
            }
        }

        args.push("--gpus".to_string());
        args.push(format!("device={}", self.device));

        if let Some(name) = &self.name {
            args.push("--name".to_string());
            args.push(name.clone());
        }

        for (key, value) in &self.env {
            args.push("-e".to_string());
            args.push(format!("{key}={value}"));
        }

        for (key, value) in &self.secret_env {
            args.push("-e".to_string());
            args.push(format!("{key}={}", value.expose_secret()));
        }

        for (host, target) in &self.volumes {
            args.push("-v".to_string());
            args.push(format!("{}:{}", host.display(), target));
        }

        args.push(self.image.clone());
        args.extend(self.command.iter().cloned());

        args
    }

    /// Start the container detached and return the container id docker prints.
    ///
    /// A non-zero docker exit surfaces as [`LaunchError::DockerFailed`] with
    /// docker's stderr attached; nothing is retried.
    pub async fn spawn(&self) -> Result<String, LaunchError> {
        if let Some(name) = &self.name {
            validate_container_name(name)?;
        }

        debug!(device = self.device, image = %self.image, "starting detached container");

        let output = tokio::process::Command::new("docker")
            .args(self.args())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(LaunchError::DockerFailed {
                status: output.status,
                stderr,
            });
        }

        let container_id = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(container_id)
    }

    /// Run the container in the foreground with inherited stdio.
    ///
    /// Used for the interactive shell: docker owns the TTY until the
    /// container exits, and the exit status is returned as-is.
    pub fn run_foreground(&self) -> Result<ExitStatus, LaunchError> {
        if let Some(name) = &self.name {
            validate_container_name(name)?;
        }

        debug!(device = self.device, image = %self.image, "starting interactive container");

        let status = std::process::Command::new("docker")
            .args(self.args())
            .status()?;

        Ok(status)
    }
}

/// Validate a container name against Docker's allowed character set.
///
/// Names must start with an ASCII alphanumeric and may contain alphanumerics,
/// underscores, dots, and hyphens.
fn validate_container_name(name: &str) -> Result<(), LaunchError> {
    let starts_ok = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphanumeric());
    let chars_ok = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-');

    if !starts_ok || !chars_ok {
        return Err(LaunchError::InvalidContainerName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contains_pair(args: &[String], flag: &str, value: &str) -> bool {
        args.windows(2)
            .any(|pair| pair[0] == flag && pair[1] == value)
    }

    #[test]
    fn detached_run_pins_device_and_name() {
        let run = DockerRun::detached("purejaxrl", 3).name("purejaxrl_3");
        let args = run.args();

        assert_eq!(args[0], "run");
        assert!(args.contains(&"-d".to_string()));
        assert!(!args.contains(&"-t".to_string()));
        assert!(contains_pair(&args, "--gpus", "device=3"));
        assert!(contains_pair(&args, "--name", "purejaxrl_3"));
    }

    #[test]
    fn interactive_run_requests_a_tty() {
        let run = DockerRun::interactive("purejaxrl", 0)
            .command(["/bin/bash".to_string()]);
        let args = run.args();

        assert!(args.contains(&"-i".to_string()));
        assert!(args.contains(&"-t".to_string()));
        assert!(!args.contains(&"-d".to_string()));
        assert!(contains_pair(&args, "--gpus", "device=0"));
        assert_eq!(args.last().unwrap(), "/bin/bash");
    }

    #[test]
    fn command_is_forwarded_unmodified_after_the_image() {
        let command = vec![
            "python".to_string(),
            "ppo_continuous_action.py".to_string(),
            "--seed".to_string(),
            "42".to_string(),
        ];
        let run = DockerRun::detached("purejaxrl", 0).command(command.clone());
        let args = run.args();

        let image_pos = args.iter().position(|a| a == "purejaxrl").unwrap();
        assert_eq!(&args[image_pos + 1..], command.as_slice());
    }

    #[test]
    fn empty_command_ends_with_the_image() {
        let run = DockerRun::detached("purejaxrl", 0);
        assert_eq!(run.args().last().unwrap(), "purejaxrl");
    }

    #[test]
    fn env_and_volumes_are_rendered_as_docker_flags() {
        let run = DockerRun::detached("purejaxrl", 1)
            .env("XLA_PYTHON_CLIENT_PREALLOCATE", "false")
            .secret_env("WANDB_API_KEY", SecretString::from("local-abc".to_string()))
            .volume(PathBuf::from("/data/exp"), "/home/workdir");
        let args = run.args();

        assert!(contains_pair(&args, "-e", "XLA_PYTHON_CLIENT_PREALLOCATE=false"));
        assert!(contains_pair(&args, "-e", "WANDB_API_KEY=local-abc"));
        assert!(contains_pair(&args, "-v", "/data/exp:/home/workdir"));
    }

    #[test]
    fn container_names_are_validated() {
        assert!(validate_container_name("purejaxrl_0").is_ok());
        assert!(validate_container_name("a.b-c_1").is_ok());
        assert!(validate_container_name("bad/name").is_err());
        assert!(validate_container_name("-leading").is_err());
        assert!(validate_container_name("").is_err());
        assert!(validate_container_name("has space").is_err());
    }
}

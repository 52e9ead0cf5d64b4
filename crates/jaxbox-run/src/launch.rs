//! Planning and fan-out for batch launches.
//!
//! One detached `docker run` is planned per selected GPU device; the
//! containers are independent, so they are spawned concurrently and the
//! results joined without any ordering guarantee between them.

use jaxbox_common::config::Config;
use jaxbox_common::docker::DockerRun;
use jaxbox_common::error::LaunchError;
use secrecy::SecretString;
use std::path::PathBuf;

/// Build one detached run per device, replicating the original script's
/// environment: the WandB key, the JAX/TF runtime flags, the PYTHONPATH,
/// and the working-directory mount.
pub fn plan_launches(
    config: &Config,
    devices: &[u32],
    command: &[String],
    api_key: &SecretString,
    host_dir: PathBuf,
) -> Vec<DockerRun> {
    devices
        .iter()
        .map(|&device| {
            DockerRun::detached(config.image.clone(), device)
                .name(format!("{}_{}", config.container_prefix, device))
                .secret_env("WANDB_API_KEY", api_key.clone())
                .env("XLA_PYTHON_CLIENT_PREALLOCATE", "false")
                .env("TF_CUDNN_DETERMINISTIC", "1")
                .env("PYTHONPATH", config.workdir.as_str())
                .volume(host_dir.clone(), config.workdir.as_str())
                .command(command.to_vec())
        })
        .collect()
}

/// Spawn every planned run concurrently and join the results.
///
/// A failed launch never aborts the others; each device reports its own
/// container id or error.
pub async fn launch_all(runs: Vec<DockerRun>) -> Vec<(u32, Result<String, LaunchError>)> {
    let mut handles = Vec::with_capacity(runs.len());
    for run in runs {
        let device = run.device();
        handles.push((device, tokio::spawn(async move { run.spawn().await })));
    }

    let mut results = Vec::with_capacity(handles.len());
    for (device, handle) in handles {
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => Err(LaunchError::Spawn(std::io::Error::other(e))),
        };
        results.push((device, result));
    }
    results
}

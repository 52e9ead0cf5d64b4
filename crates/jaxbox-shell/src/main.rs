use clap::Parser;
use jaxbox_common::config::Config;
use jaxbox_common::credentials::read_wandb_key;
use jaxbox_common::docker::DockerRun;
use jaxbox_common::logging::setup_logging;
use jaxbox_shell::cli::Args;
use std::process::ExitCode;
use tracing::{error, info};

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Load configuration
    let config = match Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    setup_logging(&config, args.tracing);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        image = %config.image,
        "starting jaxbox-shell"
    );

    let api_key = match read_wandb_key(&config.wandb_key_file) {
        Ok(key) => key,
        Err(e) => {
            error!(error = %e, "failed to read WandB API key");
            return ExitCode::FAILURE;
        }
    };

    let host_dir = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            error!(error = %e, "failed to resolve working directory");
            return ExitCode::FAILURE;
        }
    };

    // Always device 0, always a TTY, always a bash shell in the mounted
    // working directory.
    let run = DockerRun::interactive(config.image.clone(), 0)
        .secret_env("WANDB_API_KEY", api_key)
        .env("XLA_PYTHON_CLIENT_PREALLOCATE", "false")
        .env("TF_CUDNN_DETERMINISTIC", "1")
        .env("PYTHONPATH", config.workdir.as_str())
        .volume(host_dir, config.workdir.as_str())
        .command(["/bin/bash".to_string()]);

    match run.run_foreground() {
        Ok(status) => {
            info!(status = %status, "container exited");
            match status.code() {
                Some(0) => ExitCode::SUCCESS,
                Some(code) => ExitCode::from(code.clamp(1, 255) as u8),
                None => ExitCode::FAILURE,
            }
        }
        Err(e) => {
            error!(error = %e, "failed to start interactive container");
            ExitCode::FAILURE
        }
    }
}

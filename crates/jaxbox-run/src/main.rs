use clap::Parser;
use jaxbox_common::config::Config;
use jaxbox_common::credentials::read_wandb_key;
use jaxbox_common::gpu::{self, GpuSelector};
use jaxbox_common::logging::setup_logging;
use jaxbox_run::cli::Args;
use jaxbox_run::launch::{launch_all, plan_launches};
use std::process::ExitCode;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
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

    // Expand the selector before touching anything external
    let selector = match args.gpus.parse::<GpuSelector>() {
        Ok(selector) => selector,
        Err(e) => {
            error!(selector = %args.gpus, error = %e, "invalid GPU selector");
            return ExitCode::FAILURE;
        }
    };
    let devices = selector.expand(config.gpu_count);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        image = %config.image,
        devices = ?devices,
        "starting jaxbox-run"
    );

    // Best-effort probe, for the log only; docker owns the real device check
    let detected = gpu::detect_gpus();
    if !detected.is_empty() {
        info!(count = detected.len(), "host GPUs detected");
        for &device in &devices {
            if device as usize >= detected.len() {
                warn!(
                    device,
                    detected = detected.len(),
                    "requested device index beyond detected GPUs"
                );
            }
        }
    }

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

    let runs = plan_launches(&config, &devices, &args.command, &api_key, host_dir);
    let results = launch_all(runs).await;

    let mut failures = 0usize;
    for (device, result) in results {
        match result {
            Ok(container_id) => {
                info!(device, container = %container_id, "container started");
            }
            Err(e) => {
                failures += 1;
                error!(device, error = %e, "launch failed");
            }
        }
    }

    if failures > 0 {
        error!(failures, "some launches failed");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

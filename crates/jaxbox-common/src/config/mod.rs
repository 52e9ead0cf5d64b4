//! Configuration for the jaxbox launchers.
//!
//! Configuration is loaded from environment variables using the figment
//! crate. Every field has a default matching the original purejaxrl Docker
//! setup, so both binaries work with no configuration at all on a standard
//! training host.

use figment::{Figment, providers::Env};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Launcher configuration loaded from environment variables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Docker image to run
    /// Default: purejaxrl
    #[serde(default = "default_image")]
    pub image: String,

    /// Prefix for batch container names; the GPU index is appended
    /// Default: purejaxrl
    #[serde(default = "default_container_prefix")]
    pub container_prefix: String,

    /// Mount target inside the container, also injected as PYTHONPATH
    /// Default: /home/workdir
    #[serde(default = "default_workdir")]
    pub workdir: String,

    /// Path of the file holding the WandB API key
    /// Default: $HOME/.oxwhirl_wandb_api_key
    #[serde(default = "default_wandb_key_file")]
    pub wandb_key_file: PathBuf,

    /// Number of devices the `all` selector expands to
    /// Default: 8
    #[serde(default = "default_gpu_count")]
    pub gpu_count: u32,

    /// Log level
    /// Default: info
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_image() -> String {
    "purejaxrl".to_string()
}

fn default_container_prefix() -> String {
    "purejaxrl".to_string()
}

fn default_workdir() -> String {
    "/home/workdir".to_string()
}

fn default_wandb_key_file() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".oxwhirl_wandb_api_key"),
        None => PathBuf::from(".oxwhirl_wandb_api_key"),
    }
}

fn default_gpu_count() -> u32 {
    8
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from environment variables
    pub fn load() -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Env::raw().map(|k| {
                // Map environment variable names to struct field names
                match k.as_str() {
                    "JAXBOX_IMAGE" => "image".into(),
                    "JAXBOX_CONTAINER_PREFIX" => "container_prefix".into(),
                    "JAXBOX_WORKDIR" => "workdir".into(),
                    "WANDB_API_KEY_FILE" => "wandb_key_file".into(),
                    "JAXBOX_GPU_COUNT" => "gpu_count".into(),
                    "LOG_LEVEL" => "log_level".into(),
                    _ => k.into(),
                }
            }))
            .extract()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_original_scripts() {
        figment::Jail::expect_with(|_jail| {
            let config = Config::load().expect("load with no environment");
            assert_eq!(config.image, "purejaxrl");
            assert_eq!(config.container_prefix, "purejaxrl");
            assert_eq!(config.workdir, "/home/workdir");
            assert_eq!(config.gpu_count, 8);
            assert_eq!(config.log_level, "info");
            assert!(
                config
                    .wandb_key_file
                    .ends_with(".oxwhirl_wandb_api_key")
            );
            Ok(())
        });
    }

    #[test]
    fn environment_overrides_are_mapped() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("JAXBOX_IMAGE", "purejaxrl:nightly");
            jail.set_env("JAXBOX_GPU_COUNT", "4");
            jail.set_env("WANDB_API_KEY_FILE", "/tmp/key");
            let config = Config::load().expect("load with overrides");
            assert_eq!(config.image, "purejaxrl:nightly");
            assert_eq!(config.gpu_count, 4);
            assert_eq!(config.wandb_key_file, PathBuf::from("/tmp/key"));
            Ok(())
        });
    }
}

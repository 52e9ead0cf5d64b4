use crate::error::LaunchError;
use std::process::Command;
use std::str::FromStr;
use tracing::{debug, warn};

/// Which GPUs a batch launch targets.
///
/// Parsed from the batch binary's first positional argument: the literal
/// `all`, or whitespace-separated device indices such as `"2 5"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GpuSelector {
    All,
    Ids(Vec<u32>),
}

impl FromStr for GpuSelector {
    type Err = LaunchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim() == "all" {
            return Ok(GpuSelector::All);
        }

        let ids = s
            .split_whitespace()
            .map(|token| {
                token
                    .parse::<u32>()
                    .map_err(|_| LaunchError::InvalidSelector(token.to_string()))
            })
            .collect::<Result<Vec<u32>, LaunchError>>()?;

        if ids.is_empty() {
            return Err(LaunchError::EmptySelector);
        }

        Ok(GpuSelector::Ids(ids))
    }
}

impl GpuSelector {
    /// Expand the selector into concrete device indices.
    ///
    /// `All` expands to `0..gpu_count`; an explicit list is returned as
    /// given, duplicates and order included.
    pub fn expand(&self, gpu_count: u32) -> Vec<u32> {
        match self {
            GpuSelector::All => (0..gpu_count).collect(),
            GpuSelector::Ids(ids) => ids.clone(),
        }
    }
}

/// Detect the names of installed GPUs using nvidia-smi.
///
/// Best-effort: hosts without nvidia-smi get an empty list and a warning.
/// The result is only used for startup logging, never to gate a launch.
pub fn detect_gpus() -> Vec<String> {
    match query_nvidia_gpus() {
        Ok(names) => {
            debug!(count = names.len(), "detected GPUs");
            names
        }
        Err(e) => {
            warn!("failed to detect GPUs: {}", e);
            Vec::new()
        }
    }
}

/// Query GPU names via nvidia-smi
fn query_nvidia_gpus() -> anyhow::Result<Vec<String>> {
    let output = Command::new("nvidia-smi")
        .args(["--query-gpu=name", "--format=csv,noheader"])
        .output()?;

    if !output.status.success() {
        anyhow::bail!("nvidia-smi failed to query GPU names");
    }

    let names = String::from_utf8(output.stdout)?
        .lines()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect();

    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_expands_to_every_device() {
        let selector: GpuSelector = "all".parse().unwrap();
        assert_eq!(selector, GpuSelector::All);
        assert_eq!(selector.expand(8), vec![0, 1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn explicit_list_expands_to_exactly_those_devices() {
        let selector: GpuSelector = "2 5".parse().unwrap();
        assert_eq!(selector, GpuSelector::Ids(vec![2, 5]));
        assert_eq!(selector.expand(8), vec![2, 5]);
    }

    #[test]
    fn expansion_ignores_gpu_count_for_explicit_lists() {
        let selector: GpuSelector = "11".parse().unwrap();
        assert_eq!(selector.expand(8), vec![11]);
    }

    #[test]
    fn non_numeric_token_is_rejected() {
        let err = "0 two".parse::<GpuSelector>().unwrap_err();
        assert!(matches!(err, LaunchError::InvalidSelector(token) if token == "two"));
    }

    #[test]
    fn blank_selector_is_rejected() {
        let err = "   ".parse::<GpuSelector>().unwrap_err();
        assert!(matches!(err, LaunchError::EmptySelector));
    }
}

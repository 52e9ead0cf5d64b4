use std::path::PathBuf;
use std::process::ExitStatus;

/// Error type for launch operations
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    /// The credential file could not be read
    #[error("failed to read credential file {path}: {source}")]
    CredentialRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The credential file exists but holds no key
    #[error("credential file {path} is empty")]
    CredentialEmpty { path: PathBuf },

    /// A GPU selector token was not `all` or a device index
    #[error("invalid GPU selector token '{0}': expected `all` or device indices")]
    InvalidSelector(String),

    /// The GPU selector named no devices
    #[error("GPU selector names no devices")]
    EmptySelector,

    /// A container name contains characters Docker rejects
    #[error("invalid container name '{0}': contains disallowed characters")]
    InvalidContainerName(String),

    /// The docker binary could not be spawned
    #[error("failed to invoke docker: {0}")]
    Spawn(#[from] std::io::Error),

    /// Docker ran but reported failure
    #[error("docker run exited with {status}: {stderr}")]
    DockerFailed { status: ExitStatus, stderr: String },
}

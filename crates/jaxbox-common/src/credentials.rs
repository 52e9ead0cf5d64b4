use crate::error::LaunchError;
use secrecy::SecretString;
use std::path::Path;

/// Read the WandB API key from a credential file.
///
/// The file is expected to hold the bare key, optionally followed by a
/// trailing newline. The key is wrapped in [`SecretString`] so it never
/// appears in logs or `Debug` output.
pub fn read_wandb_key(path: &Path) -> Result<SecretString, LaunchError> {
    let raw = std::fs::read_to_string(path).map_err(|source| LaunchError::CredentialRead {
        path: path.to_path_buf(),
        source,
    })?;

    let key = raw.trim();
    if key.is_empty() {
        return Err(LaunchError::CredentialEmpty {
            path: path.to_path_buf(),
        });
    }

    Ok(SecretString::from(key.to_string()))
}

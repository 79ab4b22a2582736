//! Encoder binary discovery.
//!
//! Resolution order: explicit configuration override, the
//! `CLIPFORGE_FFMPEG` environment variable, then a `PATH` walk. All
//! checks happen before any process is spawned so a missing binary is a
//! precondition error, not an execution failure.

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use std::path::{Path, PathBuf};

/// Environment variable overriding the encoder binary location.
pub const ENCODER_ENV_VAR: &str = "CLIPFORGE_FFMPEG";

#[cfg(windows)]
const ENCODER_BINARY: &str = "ffmpeg.exe";
#[cfg(not(windows))]
const ENCODER_BINARY: &str = "ffmpeg";

/// Locates the encoder binary.
pub fn resolve_encoder(config: &CoreConfig) -> CoreResult<PathBuf> {
    if let Some(path) = &config.encoder_path {
        if path.is_file() {
            return Ok(path.clone());
        }
        return Err(CoreError::EncoderNotFound(format!(
            "configured encoder path does not exist: {}",
            path.display()
        )));
    }

    if let Ok(env_path) = std::env::var(ENCODER_ENV_VAR) {
        let path = PathBuf::from(&env_path);
        if path.is_file() {
            log::debug!("Using encoder from {ENCODER_ENV_VAR}: {env_path}");
            return Ok(path);
        }
        return Err(CoreError::EncoderNotFound(format!(
            "{ENCODER_ENV_VAR} is set but invalid: {env_path}"
        )));
    }

    search_path().ok_or_else(|| {
        CoreError::EncoderNotFound(format!("{ENCODER_BINARY} not found on PATH"))
    })
}

fn search_path() -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .map(|dir| dir.join(ENCODER_BINARY))
        .find(|candidate| candidate.is_file())
}

/// Logs the encoder version (first line of `-version` output). Failures
/// are debug-logged and otherwise ignored.
pub fn log_encoder_version(encoder: &Path) {
    match std::process::Command::new(encoder).arg("-version").output() {
        Ok(output) => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            if let Some(line) = stdout.lines().next() {
                log::info!("Encoder version: {line}");
            }
        }
        Err(err) => log::debug!("Failed to probe encoder version: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_override_must_exist() {
        let mut config = CoreConfig::default();
        config.encoder_path = Some(PathBuf::from("/nonexistent/ffmpeg"));
        assert!(matches!(
            resolve_encoder(&config),
            Err(CoreError::EncoderNotFound(_))
        ));
    }

    #[test]
    fn test_configured_override_wins() {
        // Any existing file satisfies the override check; resolution does
        // not validate that it is actually an encoder.
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("fake-encoder");
        std::fs::write(&file, b"").unwrap();
        let mut config = CoreConfig::default();
        config.encoder_path = Some(file.clone());
        assert_eq!(resolve_encoder(&config).unwrap(), file);
    }
}

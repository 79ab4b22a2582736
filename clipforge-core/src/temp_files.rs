//! Temporary file path helpers.
//!
//! Transient artifacts (currently only rasterized text watermarks) get
//! unique names in a caller-chosen directory. Cleanup is the owner's
//! responsibility; see `watermark::ResolvedWatermark`.

use crate::config::CoreConfig;
use rand::distributions::Alphanumeric;
use rand::{Rng, thread_rng};
use std::path::{Path, PathBuf};

/// Returns a unique file path with a random suffix. Does not create the file.
#[must_use]
pub fn create_temp_file_path(dir: &Path, prefix: &str, extension: &str) -> PathBuf {
    let suffix: String = thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    dir.join(format!("{prefix}_{suffix}.{extension}"))
}

/// The directory used for transient files.
#[must_use]
pub fn resolve_temp_dir(config: &CoreConfig) -> PathBuf {
    config
        .temp_dir
        .clone()
        .unwrap_or_else(std::env::temp_dir)
}

//! Core configuration structures and constants.
//!
//! `CoreConfig` is built by consumers of the library (such as the CLI)
//! and passed to the transcoder to control encode defaults, encoder
//! binary resolution, and runner behavior.

use std::path::PathBuf;
use std::time::Duration;

/// Default video codec used when the spec carries no override.
pub const DEFAULT_VIDEO_CODEC: &str = "libx264";

/// Default encoder speed/quality preset.
pub const DEFAULT_PRESET: &str = "veryfast";

/// Default CRF (Constant Rate Factor) quality value.
/// Lower values produce higher quality but larger files.
pub const DEFAULT_CRF: u8 = 20;

/// Default audio codec used when the spec carries no override.
pub const DEFAULT_AUDIO_CODEC: &str = "aac";

/// Default audio bitrate in kbit/s for the default audio codec.
pub const DEFAULT_AUDIO_BITRATE_K: u32 = 192;

/// How often the runner checks for process exit and cancellation.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Main configuration for the clipforge-core library.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Explicit path to the encoder binary. When unset the binary is
    /// resolved from the `CLIPFORGE_FFMPEG` environment variable, then
    /// from `PATH`.
    pub encoder_path: Option<PathBuf>,
    /// Video codec applied when the spec has no override.
    pub video_codec: String,
    /// Encoder preset passed alongside the default video codec.
    pub preset: String,
    /// CRF quality value passed alongside the default video codec.
    pub crf: u8,
    /// Audio codec applied when the spec has no override.
    pub audio_codec: String,
    /// Audio bitrate (kbit/s) applied with the default audio codec.
    pub audio_bitrate_k: u32,
    /// Poll interval for process exit and cancellation checks.
    pub poll_interval: Duration,
    /// Directory for transient files such as rasterized text watermarks.
    /// Falls back to the system temp directory.
    pub temp_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            encoder_path: None,
            video_codec: DEFAULT_VIDEO_CODEC.to_string(),
            preset: DEFAULT_PRESET.to_string(),
            crf: DEFAULT_CRF,
            audio_codec: DEFAULT_AUDIO_CODEC.to_string(),
            audio_bitrate_k: DEFAULT_AUDIO_BITRATE_K,
            poll_interval: DEFAULT_POLL_INTERVAL,
            temp_dir: None,
        }
    }
}

impl CoreConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

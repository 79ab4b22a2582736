//! Core library for the Clipforge media edit transcoding engine.
//!
//! Turns a declarative [`EditSpec`] (trim, crop, rotate, flip, speed,
//! volume, watermark, transcode overrides) into an encoder argument
//! vector, executes the external encoder with live progress and
//! cooperative cancellation, and sequences multiple jobs through a
//! strictly serial batch queue.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use clipforge_core::{CancellationToken, CoreConfig, EditSpec, Transcoder};
//!
//! let mut spec = EditSpec::new("/media/clip.mp4");
//! spec.speed = 1.5;
//!
//! let transcoder = Transcoder::new(CoreConfig::default());
//! let token = CancellationToken::new();
//! let ok = transcoder.run_job(
//!     &spec,
//!     &mut |event| println!("{:3.0}% {}", event.percent, event.message),
//!     &token,
//! );
//! assert!(ok);
//! ```

pub mod cancel;
pub mod compiler;
pub mod config;
pub mod error;
pub mod external;
pub mod processing;
pub mod progress;
pub mod queue;
pub mod spec;
pub mod temp_files;
pub mod utils;
pub mod watermark;

// Re-exports for public API
pub use cancel::CancellationToken;
pub use compiler::{compile, CompiledCommand, GraphKind};
pub use config::CoreConfig;
pub use error::{CoreError, CoreResult};
pub use external::runner::RunStatus;
pub use external::{probe_summary, resolve_encoder, MediaSummary};
pub use processing::{
    effective_audio_codec, effective_video_codec, resolve_output_path, JobRunner, Transcoder,
};
pub use progress::ProgressEvent;
pub use queue::{BatchQueue, Job, JobId, JobStatus, QueueSink};
pub use spec::{
    CropRect, EditSpec, Orientation, ScaleTarget, WatermarkPosition, WatermarkSettings,
};
pub use utils::{format_bytes, format_duration, parse_ffmpeg_time};

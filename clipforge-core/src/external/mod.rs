//! Integration with the external encoder and prober binaries.

pub mod encoder;
pub mod probe;
pub mod runner;

pub use encoder::{log_encoder_version, resolve_encoder, ENCODER_ENV_VAR};
pub use probe::{probe_duration_secs, probe_summary, MediaSummary};
pub use runner::{run_encode, RunStatus};

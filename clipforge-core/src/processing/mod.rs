//! Transcode orchestration.
//!
//! Composes the compiler and the process runner into the single
//! run-job entry point used by both interactive single-file requests
//! and the batch queue. Everything below this boundary may return
//! errors; nothing above it should ever see a panic. Expected failures
//! become `false` plus a logged reason.

use crate::cancel::CancellationToken;
use crate::compiler;
use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::runner::{self, RunStatus};
use crate::external::{encoder, probe};
use crate::progress::{ProgressEvent, ProgressParser};
use crate::spec::EditSpec;
use crate::{temp_files, watermark};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

/// Executes one edit job end to end.
///
/// The trait seam exists so the batch queue can be driven by a scripted
/// runner in tests, mirroring how collaborators consume the engine.
pub trait JobRunner: Send + Sync {
    /// Runs the job to a terminal state. Precondition violations
    /// (invalid spec, missing input, missing encoder) surface as
    /// errors; everything after a successful spawn is a `RunStatus`.
    fn run(
        &self,
        spec: &EditSpec,
        on_progress: &mut dyn FnMut(ProgressEvent),
        cancel: &CancellationToken,
    ) -> CoreResult<RunStatus>;
}

/// The production orchestrator: resolves paths, compiles the spec, and
/// drives the encoder.
#[derive(Debug, Clone, Default)]
pub struct Transcoder {
    config: CoreConfig,
}

impl Transcoder {
    #[must_use]
    pub fn new(config: CoreConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Runs one job and reports the boolean outcome: `true` only on
    /// confirmed success. Expected failures are logged, never thrown.
    pub fn run_job(
        &self,
        spec: &EditSpec,
        on_progress: &mut dyn FnMut(ProgressEvent),
        cancel: &CancellationToken,
    ) -> bool {
        match self.run(spec, on_progress, cancel) {
            Ok(RunStatus::Succeeded) => true,
            Ok(RunStatus::Cancelled) => false,
            Ok(RunStatus::Failed { exit_code }) => {
                log::error!(
                    "Encode failed for {} (exit code {exit_code:?})",
                    spec.input.display()
                );
                false
            }
            Err(err) => {
                log::error!("Encode aborted for {}: {err}", spec.input.display());
                on_progress(ProgressEvent::finished(false));
                false
            }
        }
    }
}

impl JobRunner for Transcoder {
    fn run(
        &self,
        spec: &EditSpec,
        on_progress: &mut dyn FnMut(ProgressEvent),
        cancel: &CancellationToken,
    ) -> CoreResult<RunStatus> {
        spec.validate()?;

        let file_label = spec
            .input
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| spec.input.display().to_string());
        log::info!("[{file_label}] Starting processing");

        if !spec.input.is_file() {
            return Err(CoreError::InputNotFound(spec.input.clone()));
        }
        let encoder_bin = encoder::resolve_encoder(&self.config)?;

        let output_path = resolve_output_path(spec, Local::now());

        // Rasterize a text watermark before compilation; the effective
        // spec then carries only an image watermark. The guard keeps the
        // transient image alive for the duration of the run.
        let mut effective = spec.clone();
        let _watermark_guard = match &spec.watermark {
            Some(settings) if settings.text.is_some() => {
                let temp_dir = temp_files::resolve_temp_dir(&self.config);
                let resolved = watermark::resolve(settings, &encoder_bin, &temp_dir)?;
                if let Some(wm) = effective.watermark.as_mut() {
                    wm.image = Some(resolved.path().to_path_buf());
                    wm.text = None;
                }
                Some(resolved)
            }
            _ => None,
        };

        let command = compiler::compile(&effective, &output_path, &self.config)?;
        log::info!("[{file_label}] Command: {}", command.args.join(" "));

        let probed_total = match probe::probe_duration_secs(&spec.input) {
            Ok(total) => total,
            Err(err) => {
                log::debug!("[{file_label}] Duration probe failed: {err}");
                None
            }
        };

        on_progress(ProgressEvent::starting());
        let parser = ProgressParser::new(spec.trim_start, spec.trim_end, probed_total);
        let status = runner::run_encode(
            &encoder_bin,
            &command,
            parser,
            self.config.poll_interval,
            on_progress,
            cancel,
        )?;

        match status {
            RunStatus::Succeeded => {
                log::info!("[{file_label}] Finished: {}", output_path.display());
                on_progress(ProgressEvent::finished(true));
            }
            RunStatus::Cancelled => {
                remove_partial_output(&command.output_path);
                log::info!("[{file_label}] Cancelled by request");
                on_progress(ProgressEvent::finished(false));
            }
            RunStatus::Failed { .. } => {
                on_progress(ProgressEvent::finished(false));
            }
        }

        Ok(status)
    }
}

/// Resolves the output path for a spec: an explicit output wins;
/// otherwise the input's directory and stem, suffixed with a timestamp
/// so repeated runs on one input never silently overwrite a previous
/// result, with the extension override applied.
#[must_use]
pub fn resolve_output_path(spec: &EditSpec, now: DateTime<Local>) -> PathBuf {
    if let Some(output) = &spec.output {
        return output.clone();
    }
    let dir = spec.input.parent().unwrap_or_else(|| Path::new("."));
    let stem = spec
        .input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let extension = spec.output_extension.clone().unwrap_or_else(|| {
        spec.input
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_else(|| "mp4".to_string())
    });
    let timestamp = now.format("%Y-%m-%d_%H.%M.%S");
    dir.join(format!("{stem}_{timestamp}.{extension}"))
}

/// Effective video codec label for display.
#[must_use]
pub fn effective_video_codec(spec: &EditSpec, config: &CoreConfig) -> String {
    spec.video_codec
        .clone()
        .unwrap_or_else(|| format!("{} (auto)", config.video_codec))
}

/// Effective audio codec label for display.
#[must_use]
pub fn effective_audio_codec(spec: &EditSpec, config: &CoreConfig) -> String {
    if spec.mute {
        "none (muted)".to_string()
    } else {
        spec.audio_codec
            .clone()
            .unwrap_or_else(|| format!("{} (auto)", config.audio_codec))
    }
}

fn remove_partial_output(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => log::info!("Removed partial output {}", path.display()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => log::warn!("Failed to remove partial output {}: {err}", path.display()),
    }
}

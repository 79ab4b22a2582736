//! Edit-to-argument-list compilation.
//!
//! Deterministically translates a validated [`EditSpec`] into the
//! encoder argument vector. Pure: no I/O and no process spawning
//! happens here, so compiling the same spec twice yields identical
//! commands.

pub mod args;
pub mod filters;
pub mod graph;

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::spec::EditSpec;
use crate::utils::format_seek;
use args::{AudioOutput, CommandArgs};
use std::path::{Path, PathBuf};

/// Whether the command uses a simple per-stream filter chain or a
/// multi-input complex graph. Complex exactly when a watermark is
/// present; the two forms are not interchangeable at the argument level
/// because their stream mapping differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphKind {
    SimpleChain,
    ComplexGraph,
}

/// A compiled invocation: the argument vector, the graph form, and the
/// output path checked for existence after the process exits. Owned by
/// the run that produced it and discarded afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledCommand {
    pub args: Vec<String>,
    pub graph: GraphKind,
    pub output_path: PathBuf,
}

impl CompiledCommand {
    #[must_use]
    pub fn is_complex(&self) -> bool {
        self.graph == GraphKind::ComplexGraph
    }
}

/// Compiles a fully resolved spec against the given output path.
///
/// Text watermarks must have been rasterized beforehand so the spec
/// carries only an image watermark here; a remaining text source is a
/// contract violation, as is any spec failing [`EditSpec::validate`].
pub fn compile(
    spec: &EditSpec,
    output_path: &Path,
    config: &CoreConfig,
) -> CoreResult<CompiledCommand> {
    spec.validate()?;

    let video_filters = filters::video_filters(spec);
    let audio_filters = filters::audio_filters(spec);

    let mut cmd = CommandArgs::new()
        .seek(
            spec.trim_start.map(format_seek),
            spec.trim_end.map(format_seek),
        )
        .input(spec.input.to_string_lossy().into_owned());

    let graph_kind = if let Some(watermark) = &spec.watermark {
        let image = watermark.image.as_ref().ok_or_else(|| {
            CoreError::InvalidSpec(
                "text watermark must be rasterized before compilation".to_string(),
            )
        })?;
        cmd = cmd
            .input(image.to_string_lossy().into_owned())
            .filter_complex(graph::overlay_graph(watermark, &video_filters))
            .map("[outv]");
        if !spec.mute {
            // Marked optional: a silent source must not fail the job.
            cmd = cmd.map("0:a?");
        }
        GraphKind::ComplexGraph
    } else {
        for filter in video_filters {
            cmd = cmd.video_filter(filter);
        }
        GraphKind::SimpleChain
    };

    for filter in audio_filters {
        cmd = cmd.audio_filter(filter);
    }

    let video_codec = spec
        .video_codec
        .clone()
        .unwrap_or_else(|| config.video_codec.clone());
    cmd = cmd
        .video_codec(video_codec)
        .preset(config.preset.clone())
        .crf(config.crf);

    cmd = cmd.audio(if spec.mute {
        AudioOutput::Disabled
    } else {
        match &spec.audio_codec {
            Some(codec) => AudioOutput::Encode {
                codec: codec.clone(),
                bitrate_k: None,
            },
            None => AudioOutput::Encode {
                codec: config.audio_codec.clone(),
                bitrate_k: Some(config.audio_bitrate_k),
            },
        }
    });

    for raw in &spec.extra_args {
        cmd = cmd.extra(raw);
    }

    let args = cmd
        .output(output_path.to_string_lossy().into_owned())
        .build();

    Ok(CompiledCommand {
        args,
        graph: graph_kind,
        output_path: output_path.to_path_buf(),
    })
}

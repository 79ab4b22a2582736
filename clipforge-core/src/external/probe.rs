//! Media probing via ffprobe.
//!
//! Used to seed the progress total before an encode and to back the
//! CLI's file summary. Probe failures are recoverable: the runner can
//! still discover the duration from the encoder's own header output.

use crate::error::{CoreError, CoreResult};
use ffprobe::ffprobe;
use std::path::Path;

/// Container-level summary of a media file.
#[derive(Debug, Default, Clone)]
pub struct MediaSummary {
    /// Duration in seconds, when the container reports one.
    pub duration_secs: Option<f64>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub video_codec: Option<String>,
    /// Channel count per audio stream, in stream order.
    pub audio_channels: Vec<i64>,
}

/// Container duration in seconds, when reported.
pub fn probe_duration_secs(input: &Path) -> CoreResult<Option<f64>> {
    match ffprobe(input) {
        Ok(metadata) => Ok(metadata
            .format
            .duration
            .as_deref()
            .and_then(|d| d.parse::<f64>().ok())),
        Err(err) => Err(CoreError::Probe(format!(
            "ffprobe failed for {}: {err:?}",
            input.display()
        ))),
    }
}

/// Full summary for display purposes.
pub fn probe_summary(input: &Path) -> CoreResult<MediaSummary> {
    let metadata = ffprobe(input).map_err(|err| {
        CoreError::Probe(format!("ffprobe failed for {}: {err:?}", input.display()))
    })?;

    let mut summary = MediaSummary {
        duration_secs: metadata
            .format
            .duration
            .as_deref()
            .and_then(|d| d.parse::<f64>().ok()),
        ..MediaSummary::default()
    };

    for stream in &metadata.streams {
        match stream.codec_type.as_deref() {
            Some("video") if summary.width.is_none() => {
                summary.width = stream.width;
                summary.height = stream.height;
                summary.video_codec = stream.codec_name.clone();
            }
            Some("audio") => summary.audio_channels.push(stream.channels.unwrap_or(0)),
            _ => {}
        }
    }

    Ok(summary)
}

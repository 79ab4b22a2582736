//! Watermark source resolution and text rasterization.
//!
//! Text watermarks are rendered once to a transparent PNG before
//! compilation and from then on behave exactly like image watermarks.
//! Rendering shells out to the encoder's `lavfi` drawtext source, so no
//! separate font stack is required.

use crate::error::{CoreError, CoreResult};
use crate::spec::WatermarkSettings;
use crate::temp_files;
use crate::utils::fmt_trimmed;
use std::path::{Path, PathBuf};
use std::process::Command;

/// A watermark image ready for compilation. Rasterized text images are
/// transient and removed on drop; caller-supplied images are left alone.
#[derive(Debug)]
pub struct ResolvedWatermark {
    path: PathBuf,
    temporary: bool,
}

impl ResolvedWatermark {
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ResolvedWatermark {
    fn drop(&mut self) {
        if self.temporary {
            if let Err(err) = std::fs::remove_file(&self.path) {
                if err.kind() != std::io::ErrorKind::NotFound {
                    log::warn!(
                        "Failed to remove temporary watermark {}: {err}",
                        self.path.display()
                    );
                }
            }
        }
    }
}

/// Resolves the watermark source to an on-disk image, rasterizing text
/// through the encoder when needed.
pub fn resolve(
    settings: &WatermarkSettings,
    encoder: &Path,
    temp_dir: &Path,
) -> CoreResult<ResolvedWatermark> {
    if let Some(image) = &settings.image {
        if !image.is_file() {
            return Err(CoreError::Watermark(format!(
                "watermark image not found: {}",
                image.display()
            )));
        }
        return Ok(ResolvedWatermark {
            path: image.clone(),
            temporary: false,
        });
    }

    let text = settings.text.as_deref().ok_or_else(|| {
        CoreError::Watermark("watermark has neither image nor text".to_string())
    })?;
    let path = rasterize_text(encoder, text, settings.font_size, temp_dir)?;
    Ok(ResolvedWatermark {
        path,
        temporary: true,
    })
}

/// Renders text onto a transparent canvas sized from the font metrics
/// and writes a single PNG frame.
fn rasterize_text(
    encoder: &Path,
    text: &str,
    font_size: f32,
    temp_dir: &Path,
) -> CoreResult<PathBuf> {
    std::fs::create_dir_all(temp_dir)?;
    let path = temp_files::create_temp_file_path(temp_dir, "wm_text", "png");

    // Approximate canvas: average glyph advance of ~0.6em plus padding.
    let width = (text.chars().count() as f32 * font_size * 0.6).ceil() as u32 + 20;
    let height = (font_size * 1.5).ceil() as u32 + 10;

    let source = format!("color=c=black@0.0:s={width}x{height}:d=1,format=rgba");
    let drawtext = format!(
        "drawtext=text='{}':fontcolor=white:fontsize={}:x=10:y=5",
        escape_text(text),
        fmt_trimmed(f64::from(font_size), 2),
    );

    let output = Command::new(encoder)
        .args(["-y", "-f", "lavfi", "-i", &source, "-vf", &drawtext, "-frames:v", "1"])
        .arg(&path)
        .output()
        .map_err(|err| {
            CoreError::Watermark(format!("failed to start encoder for text rendering: {err}"))
        })?;

    if !output.status.success() || !path.is_file() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CoreError::Watermark(format!(
            "text rasterization failed: {}",
            stderr.trim()
        )));
    }

    log::debug!("Rendered text watermark to {}", path.display());
    Ok(path)
}

/// Single-quote is the only metacharacter inside a quoted filter value;
/// it is emitted as close-quote, escaped quote, reopen-quote.
fn escape_text(text: &str) -> String {
    text.replace('\'', r"'\''")
}

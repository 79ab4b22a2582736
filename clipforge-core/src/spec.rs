//! The edit specification: the complete, immutable description of one
//! requested transformation.
//!
//! An `EditSpec` is fully resolved before it reaches the compiler; the
//! compiler never mutates it. Validation enforces the contract rules
//! (positive speed, ordered trim bounds, watermark source exclusivity)
//! before anything is spawned.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Tolerance below which a speed multiplier counts as unchanged.
pub(crate) const SPEED_EPSILON: f32 = 0.01;

fn default_speed() -> f32 {
    1.0
}

fn default_font_size() -> f32 {
    32.0
}

fn default_opacity() -> f32 {
    1.0
}

fn default_watermark_scale() -> f32 {
    0.15
}

/// Pixel-space crop rectangle in source-resolution coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Target resolution class. Absence means keep the source resolution.
///
/// Each class scales preserving aspect ratio and pads to the exact
/// target frame (letterbox/pillarbox) so the output always has the
/// canonical dimensions for that class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScaleTarget {
    P240,
    P360,
    P480,
    P720,
    P1080,
    P1440,
    P2160,
}

impl ScaleTarget {
    /// Canonical output dimensions for this class.
    #[must_use]
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            Self::P240 => (426, 240),
            Self::P360 => (640, 360),
            Self::P480 => (854, 480),
            Self::P720 => (1280, 720),
            Self::P1080 => (1920, 1080),
            Self::P1440 => (2560, 1440),
            Self::P2160 => (3840, 2160),
        }
    }

    pub(crate) fn filter(self) -> String {
        let (w, h) = self.dimensions();
        format!(
            "scale={w}:{h}:force_original_aspect_ratio=decrease,pad={w}:{h}:(ow-iw)/2:(oh-ih)/2"
        )
    }
}

/// Orientation change. At most one rotation can be active, by construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum Orientation {
    #[default]
    None,
    Rotate90,
    Rotate180,
    Rotate270,
    /// Arbitrary rotation in degrees; the output canvas grows to the
    /// rotated bounding box with black fill.
    Custom(f32),
}

/// Where the watermark lands on the output frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum WatermarkPosition {
    TopLeft,
    TopRight,
    BottomLeft,
    #[default]
    BottomRight,
    Center,
    /// Explicit pixel offsets from the top-left corner.
    Custom { x: i64, y: i64 },
}

/// Watermark source and placement.
///
/// Exactly one of `image` and `text` must be set. Text watermarks are
/// rasterized to a transparent image before compilation and from then
/// on behave exactly like image watermarks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatermarkSettings {
    #[serde(default)]
    pub image: Option<PathBuf>,
    #[serde(default)]
    pub text: Option<String>,
    /// Font size for text watermarks.
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    #[serde(default)]
    pub position: WatermarkPosition,
    /// Opacity in [0, 1].
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    /// Watermark width as a fraction of the processed video width.
    #[serde(default = "default_watermark_scale")]
    pub scale: f32,
}

impl WatermarkSettings {
    /// Image watermark with default placement.
    #[must_use]
    pub fn image(path: impl Into<PathBuf>) -> Self {
        Self {
            image: Some(path.into()),
            text: None,
            font_size: default_font_size(),
            position: WatermarkPosition::default(),
            opacity: default_opacity(),
            scale: default_watermark_scale(),
        }
    }

    /// Text watermark with default placement.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            image: None,
            text: Some(text.into()),
            font_size: default_font_size(),
            position: WatermarkPosition::default(),
            opacity: default_opacity(),
            scale: default_watermark_scale(),
        }
    }
}

/// The complete description of one requested transformation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditSpec {
    pub input: PathBuf,
    /// Explicit output path. When unset the orchestrator derives one
    /// next to the input with a timestamp suffix.
    pub output: Option<PathBuf>,
    /// Output container extension override (e.g. "mkv"), without dot.
    pub output_extension: Option<String>,

    // Geometry
    pub crop: Option<CropRect>,
    pub scale: Option<ScaleTarget>,

    // Orientation
    pub orientation: Orientation,
    pub flip_horizontal: bool,
    pub flip_vertical: bool,
    pub grayscale: bool,

    // Temporal
    #[serde(with = "duration_secs")]
    pub trim_start: Option<Duration>,
    #[serde(with = "duration_secs")]
    pub trim_end: Option<Duration>,
    /// Playback speed multiplier; 1.0 leaves timing untouched.
    pub speed: f32,

    // Audio
    pub mute: bool,
    pub stereo_to_mono: bool,
    /// Signed decibel deltas, summed into one gain stage.
    pub volume_adjustments_db: Vec<f32>,

    // Transcode overrides
    pub video_codec: Option<String>,
    pub audio_codec: Option<String>,

    pub watermark: Option<WatermarkSettings>,

    /// Raw argument strings appended verbatim (whitespace-split).
    pub extra_args: Vec<String>,
}

impl Default for EditSpec {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            output: None,
            output_extension: None,
            crop: None,
            scale: None,
            orientation: Orientation::None,
            flip_horizontal: false,
            flip_vertical: false,
            grayscale: false,
            trim_start: None,
            trim_end: None,
            speed: default_speed(),
            mute: false,
            stereo_to_mono: false,
            volume_adjustments_db: Vec::new(),
            video_codec: None,
            audio_codec: None,
            watermark: None,
            extra_args: Vec::new(),
        }
    }
}

impl EditSpec {
    #[must_use]
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            ..Self::default()
        }
    }

    /// Whether the speed multiplier differs meaningfully from 1.0.
    #[must_use]
    pub fn has_speed_change(&self) -> bool {
        (self.speed - 1.0).abs() > SPEED_EPSILON
    }

    /// Checks the contract rules. Must pass before compilation; a
    /// violating spec is a programming error at the caller and fails
    /// fast rather than being silently ignored.
    pub fn validate(&self) -> CoreResult<()> {
        if self.input.as_os_str().is_empty() {
            return Err(CoreError::InvalidSpec("input path is empty".to_string()));
        }
        if !(self.speed > 0.0) {
            return Err(CoreError::InvalidSpec(format!(
                "speed multiplier must be positive, got {}",
                self.speed
            )));
        }
        if let (Some(start), Some(end)) = (self.trim_start, self.trim_end) {
            if start >= end {
                return Err(CoreError::InvalidSpec(
                    "trim start must be before trim end".to_string(),
                ));
            }
        }
        if let Some(crop) = &self.crop {
            if crop.width == 0 || crop.height == 0 {
                return Err(CoreError::InvalidSpec(
                    "crop rectangle must have a non-zero size".to_string(),
                ));
            }
        }
        if let Some(watermark) = &self.watermark {
            match (&watermark.image, &watermark.text) {
                (Some(_), Some(_)) => {
                    return Err(CoreError::InvalidSpec(
                        "watermark image and text are mutually exclusive".to_string(),
                    ));
                }
                (None, None) => {
                    return Err(CoreError::InvalidSpec(
                        "watermark requires an image or text".to_string(),
                    ));
                }
                _ => {}
            }
            if !(0.0..=1.0).contains(&watermark.opacity) {
                return Err(CoreError::InvalidSpec(format!(
                    "watermark opacity must be within [0, 1], got {}",
                    watermark.opacity
                )));
            }
            if !(watermark.scale > 0.0) {
                return Err(CoreError::InvalidSpec(
                    "watermark scale must be positive".to_string(),
                ));
            }
            if watermark.text.is_some() && !(watermark.font_size > 0.0) {
                return Err(CoreError::InvalidSpec(
                    "watermark font size must be positive".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// (De)serializes `Option<Duration>` as fractional seconds, the form
/// batch manifests use.
mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => serializer.serialize_some(&duration.as_secs_f64()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        let secs: Option<f64> = Option::deserialize(deserializer)?;
        secs.map(|s| {
            if s >= 0.0 && s.is_finite() {
                Ok(Duration::from_secs_f64(s))
            } else {
                Err(D::Error::custom(format!("invalid duration: {s}")))
            }
        })
        .transpose()
    }
}

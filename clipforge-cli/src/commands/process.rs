//! The `process` subcommand: one edit job end to end.

use clap::Args;
use clipforge_core::{
    CancellationToken, CoreConfig, CropRect, EditSpec, Orientation, ScaleTarget, Transcoder,
    WatermarkPosition, WatermarkSettings,
};
use std::path::PathBuf;
use std::time::Duration;

use crate::progress;

#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Input media file
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Explicit output path (default: input name with timestamp suffix)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Output container extension override, without dot (e.g. mkv)
    #[arg(long, value_name = "EXT")]
    pub extension: Option<String>,

    /// Trim start, in seconds
    #[arg(long, value_name = "SECONDS")]
    pub trim_start: Option<f64>,

    /// Trim end, in seconds
    #[arg(long, value_name = "SECONDS")]
    pub trim_end: Option<f64>,

    /// Crop rectangle as X:Y:W:H in source pixels
    #[arg(long, value_name = "X:Y:W:H")]
    pub crop: Option<String>,

    /// Target resolution class (240p, 360p, 480p, 720p, 1080p, 1440p, 2160p)
    #[arg(long, value_name = "CLASS")]
    pub scale: Option<String>,

    /// Fixed clockwise rotation
    #[arg(long, value_parser = ["90", "180", "270"], value_name = "DEG")]
    pub rotate: Option<String>,

    /// Arbitrary rotation in degrees
    #[arg(long, conflicts_with = "rotate", value_name = "DEG")]
    pub rotate_deg: Option<f32>,

    /// Mirror horizontally
    #[arg(long)]
    pub hflip: bool,

    /// Mirror vertically
    #[arg(long)]
    pub vflip: bool,

    /// Convert to grayscale
    #[arg(long)]
    pub grayscale: bool,

    /// Playback speed multiplier
    #[arg(long, default_value_t = 1.0, value_name = "FACTOR")]
    pub speed: f32,

    /// Strip the audio track
    #[arg(long)]
    pub mute: bool,

    /// Downmix stereo to mono
    #[arg(long)]
    pub mono: bool,

    /// Volume adjustment in dB (repeatable; values are summed)
    #[arg(long = "volume", value_name = "DB", allow_hyphen_values = true)]
    pub volume_db: Vec<f32>,

    /// Watermark image file
    #[arg(long, value_name = "IMAGE")]
    pub watermark: Option<PathBuf>,

    /// Watermark text, rendered to an image before processing
    #[arg(long, conflicts_with = "watermark", value_name = "TEXT")]
    pub watermark_text: Option<String>,

    /// Watermark position: top-left, top-right, bottom-left,
    /// bottom-right, center, or X,Y pixel offsets
    #[arg(long, default_value = "bottom-right", value_name = "POS")]
    pub watermark_position: String,

    /// Watermark opacity in [0,1]
    #[arg(long, default_value_t = 1.0, value_name = "ALPHA")]
    pub watermark_opacity: f32,

    /// Watermark width as a fraction of the video width
    #[arg(long, default_value_t = 0.15, value_name = "FRACTION")]
    pub watermark_scale: f32,

    /// Font size for text watermarks
    #[arg(long, default_value_t = 32.0, value_name = "PT")]
    pub watermark_font_size: f32,

    /// Video codec override (e.g. libx265, copy)
    #[arg(long, value_name = "CODEC")]
    pub video_codec: Option<String>,

    /// Audio codec override (e.g. libopus, copy)
    #[arg(long, value_name = "CODEC")]
    pub audio_codec: Option<String>,

    /// Extra encoder arguments appended verbatim (repeatable)
    #[arg(long = "encoder-arg", value_name = "ARG")]
    pub encoder_args: Vec<String>,

    /// Path to the encoder binary (falls back to CLIPFORGE_FFMPEG, then PATH)
    #[arg(long, value_name = "PATH")]
    pub encoder: Option<PathBuf>,
}

pub fn run(args: &ProcessArgs) -> i32 {
    let spec = match build_spec(args) {
        Ok(spec) => spec,
        Err(message) => {
            eprintln!("error: {message}");
            return 2;
        }
    };

    let mut config = CoreConfig::default();
    config.encoder_path = args.encoder.clone();
    log::debug!("Edit spec: {spec:?}");

    if let Ok(encoder_bin) = clipforge_core::resolve_encoder(&config) {
        clipforge_core::external::log_encoder_version(&encoder_bin);
    }

    // Pin the planned path now so the summary matches the actual output.
    let mut spec = spec;
    let planned = clipforge_core::resolve_output_path(&spec, chrono::Local::now());
    spec.output = Some(planned.clone());

    println!("Input:  {}", spec.input.display());
    println!("Output: {}", planned.display());
    println!(
        "Video:  {}",
        clipforge_core::effective_video_codec(&spec, &config)
    );
    println!(
        "Audio:  {}",
        clipforge_core::effective_audio_codec(&spec, &config)
    );

    let transcoder = Transcoder::new(config);
    let bar = progress::encode_bar();
    let token = CancellationToken::new();
    let ok = transcoder.run_job(&spec, &mut |event| progress::update_bar(&bar, &event), &token);

    if ok {
        bar.finish_with_message("done");
        println!("Done: {}", planned.display());
        0
    } else {
        bar.abandon_with_message("error");
        eprintln!("Processing failed; run with -v for encoder output");
        1
    }
}

/// Translates the argument surface into an `EditSpec`.
pub fn build_spec(args: &ProcessArgs) -> Result<EditSpec, String> {
    let mut spec = EditSpec::new(&args.input);
    spec.output = args.output.clone();
    spec.output_extension = args.extension.clone();
    spec.trim_start = args
        .trim_start
        .map(|secs| parse_secs(secs, "--trim-start"))
        .transpose()?;
    spec.trim_end = args
        .trim_end
        .map(|secs| parse_secs(secs, "--trim-end"))
        .transpose()?;
    spec.crop = args.crop.as_deref().map(parse_crop).transpose()?;
    spec.scale = args.scale.as_deref().map(parse_scale).transpose()?;

    spec.orientation = match (&args.rotate, args.rotate_deg) {
        (Some(rotate), _) => match rotate.as_str() {
            "90" => Orientation::Rotate90,
            "180" => Orientation::Rotate180,
            _ => Orientation::Rotate270,
        },
        (None, Some(degrees)) => Orientation::Custom(degrees),
        (None, None) => Orientation::None,
    };

    spec.flip_horizontal = args.hflip;
    spec.flip_vertical = args.vflip;
    spec.grayscale = args.grayscale;
    spec.speed = args.speed;
    spec.mute = args.mute;
    spec.stereo_to_mono = args.mono;
    spec.volume_adjustments_db = args.volume_db.clone();
    spec.video_codec = args.video_codec.clone();
    spec.audio_codec = args.audio_codec.clone();
    spec.extra_args = args.encoder_args.clone();

    if args.watermark.is_some() || args.watermark_text.is_some() {
        spec.watermark = Some(WatermarkSettings {
            image: args.watermark.clone(),
            text: args.watermark_text.clone(),
            font_size: args.watermark_font_size,
            position: parse_position(&args.watermark_position)?,
            opacity: args.watermark_opacity,
            scale: args.watermark_scale,
        });
    }

    spec.validate().map_err(|err| err.to_string())?;
    Ok(spec)
}

fn parse_secs(secs: f64, flag: &str) -> Result<Duration, String> {
    if secs.is_finite() && secs >= 0.0 {
        Ok(Duration::from_secs_f64(secs))
    } else {
        Err(format!("{flag} must be a non-negative number of seconds"))
    }
}

fn parse_crop(value: &str) -> Result<CropRect, String> {
    let parts: Vec<&str> = value.split(':').collect();
    if parts.len() != 4 {
        return Err(format!("invalid crop '{value}', expected X:Y:W:H"));
    }
    let mut numbers = [0u32; 4];
    for (slot, part) in numbers.iter_mut().zip(&parts) {
        *slot = part
            .trim()
            .parse()
            .map_err(|_| format!("invalid crop '{value}', expected X:Y:W:H"))?;
    }
    Ok(CropRect {
        x: numbers[0],
        y: numbers[1],
        width: numbers[2],
        height: numbers[3],
    })
}

fn parse_scale(value: &str) -> Result<ScaleTarget, String> {
    match value.to_ascii_lowercase().as_str() {
        "240p" => Ok(ScaleTarget::P240),
        "360p" => Ok(ScaleTarget::P360),
        "480p" => Ok(ScaleTarget::P480),
        "720p" => Ok(ScaleTarget::P720),
        "1080p" => Ok(ScaleTarget::P1080),
        "1440p" => Ok(ScaleTarget::P1440),
        "2160p" | "4k" => Ok(ScaleTarget::P2160),
        _ => Err(format!(
            "unknown resolution class '{value}' (expected 240p..2160p)"
        )),
    }
}

fn parse_position(value: &str) -> Result<WatermarkPosition, String> {
    match value.to_ascii_lowercase().as_str() {
        "top-left" => return Ok(WatermarkPosition::TopLeft),
        "top-right" => return Ok(WatermarkPosition::TopRight),
        "bottom-left" => return Ok(WatermarkPosition::BottomLeft),
        "bottom-right" => return Ok(WatermarkPosition::BottomRight),
        "center" => return Ok(WatermarkPosition::Center),
        _ => {}
    }
    let parts: Vec<&str> = value.split(',').collect();
    if parts.len() == 2 {
        let x = parts[0].trim().parse().ok();
        let y = parts[1].trim().parse().ok();
        if let (Some(x), Some(y)) = (x, y) {
            return Ok(WatermarkPosition::Custom { x, y });
        }
    }
    Err(format!(
        "invalid watermark position '{value}' (expected an anchor name or X,Y)"
    ))
}

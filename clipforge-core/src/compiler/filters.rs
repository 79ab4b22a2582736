//! Per-stream filter chain construction.
//!
//! The video stage order is fixed because each stage's output size and
//! orientation feeds the next: crop, scale, rotation, flips, grayscale,
//! then the presentation-timestamp rescale for speed changes.

use crate::spec::{EditSpec, Orientation};
use crate::utils::fmt_trimmed;

/// Single-stage tempo range accepted by the encoder. Multipliers outside
/// it must be chained through a boundary stage.
const TEMPO_MIN: f32 = 0.5;
const TEMPO_MAX: f32 = 2.0;

/// Decomposes a speed multiplier into valid tempo stages.
#[must_use]
pub fn tempo_stages(multiplier: f32) -> Vec<f32> {
    if multiplier < TEMPO_MIN {
        vec![TEMPO_MIN, multiplier / TEMPO_MIN]
    } else if multiplier > TEMPO_MAX {
        vec![TEMPO_MAX, multiplier / TEMPO_MAX]
    } else {
        vec![multiplier]
    }
}

/// Video filter stages for the spec, in application order. Disabled
/// stages are simply absent.
#[must_use]
pub fn video_filters(spec: &EditSpec) -> Vec<String> {
    let mut filters = Vec::new();

    if let Some(crop) = &spec.crop {
        filters.push(format!(
            "crop={}:{}:{}:{}",
            crop.width, crop.height, crop.x, crop.y
        ));
    }

    if let Some(scale) = spec.scale {
        filters.push(scale.filter());
    }

    match spec.orientation {
        Orientation::None => {}
        Orientation::Rotate90 => filters.push("transpose=clock".to_string()),
        Orientation::Rotate180 => {
            // Two quarter turns compose into the half turn.
            filters.push("transpose=clock,transpose=clock".to_string());
        }
        Orientation::Rotate270 => filters.push("transpose=cclock".to_string()),
        Orientation::Custom(degrees) => {
            let radians = fmt_trimmed(f64::from(degrees) * std::f64::consts::PI / 180.0, 8);
            filters.push(format!(
                "rotate={radians}:'rotw(iw,ih)':'roth(iw,ih)':0:0:black"
            ));
        }
    }

    if spec.flip_horizontal {
        filters.push("hflip".to_string());
    }
    if spec.flip_vertical {
        filters.push("vflip".to_string());
    }
    if spec.grayscale {
        filters.push("hue=s=0".to_string());
    }

    if spec.has_speed_change() {
        let pts_factor = fmt_trimmed(1.0 / f64::from(spec.speed), 4);
        filters.push(format!("setpts={pts_factor}*PTS"));
    }

    filters
}

/// Audio filter stages for the spec: gain, mono downmix, then tempo.
/// Muted specs get no audio filters at all.
#[must_use]
pub fn audio_filters(spec: &EditSpec) -> Vec<String> {
    if spec.mute {
        return Vec::new();
    }

    let mut filters = Vec::new();

    let gain_db: f32 = spec.volume_adjustments_db.iter().sum();
    if gain_db != 0.0 {
        filters.push(format!("volume={}dB", fmt_trimmed(f64::from(gain_db), 3)));
    }

    if spec.stereo_to_mono {
        // Explicit energy-preserving downmix, not a bare channel-count change.
        filters.push("pan=mono|c0=.5*c0+.5*c1".to_string());
    }

    if spec.has_speed_change() {
        for stage in tempo_stages(spec.speed) {
            filters.push(format!("atempo={}", fmt_trimmed(f64::from(stage), 4)));
        }
    }

    filters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{CropRect, ScaleTarget};

    #[test]
    fn test_tempo_stages_in_range() {
        assert_eq!(tempo_stages(0.5), vec![0.5]);
        assert_eq!(tempo_stages(1.0), vec![1.0]);
        assert_eq!(tempo_stages(1.5), vec![1.5]);
        assert_eq!(tempo_stages(2.0), vec![2.0]);
    }

    #[test]
    fn test_tempo_stages_below_range() {
        assert_eq!(tempo_stages(0.25), vec![0.5, 0.5]);
        assert_eq!(tempo_stages(0.4), vec![0.5, 0.8]);
        // Product of the stages recovers the requested multiplier.
        let stages = tempo_stages(0.3);
        assert_eq!(stages.len(), 2);
        assert!((stages.iter().product::<f32>() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_tempo_stages_above_range() {
        assert_eq!(tempo_stages(3.0), vec![2.0, 1.5]);
        assert_eq!(tempo_stages(4.0), vec![2.0, 2.0]);
        let stages = tempo_stages(2.5);
        assert!((stages.iter().product::<f32>() - 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_video_filter_order() {
        let mut spec = EditSpec::new("clip.mp4");
        spec.crop = Some(CropRect {
            x: 10,
            y: 20,
            width: 640,
            height: 480,
        });
        spec.scale = Some(ScaleTarget::P720);
        spec.orientation = Orientation::Rotate90;
        spec.flip_horizontal = true;
        spec.speed = 2.0;

        let filters = video_filters(&spec);
        assert_eq!(
            filters,
            vec![
                "crop=640:480:10:20".to_string(),
                "scale=1280:720:force_original_aspect_ratio=decrease,pad=1280:720:(ow-iw)/2:(oh-ih)/2"
                    .to_string(),
                "transpose=clock".to_string(),
                "hflip".to_string(),
                "setpts=0.5*PTS".to_string(),
            ]
        );
    }

    #[test]
    fn test_rotation_variants() {
        let mut spec = EditSpec::new("clip.mp4");
        spec.orientation = Orientation::Rotate180;
        assert_eq!(
            video_filters(&spec),
            vec!["transpose=clock,transpose=clock".to_string()]
        );

        spec.orientation = Orientation::Rotate270;
        assert_eq!(video_filters(&spec), vec!["transpose=cclock".to_string()]);

        spec.orientation = Orientation::Custom(90.0);
        assert_eq!(
            video_filters(&spec),
            vec!["rotate=1.57079633:'rotw(iw,ih)':'roth(iw,ih)':0:0:black".to_string()]
        );
    }

    #[test]
    fn test_unit_speed_emits_no_setpts() {
        let mut spec = EditSpec::new("clip.mp4");
        spec.speed = 1.0;
        assert!(video_filters(&spec).is_empty());
        // Within the epsilon counts as unchanged.
        spec.speed = 1.005;
        assert!(video_filters(&spec).is_empty());
    }

    #[test]
    fn test_audio_gain_summed() {
        let mut spec = EditSpec::new("clip.mp4");
        spec.volume_adjustments_db = vec![2.0, -5.0, 1.5];
        assert_eq!(audio_filters(&spec), vec!["volume=-1.5dB".to_string()]);
    }

    #[test]
    fn test_zero_gain_emits_no_filter() {
        let mut spec = EditSpec::new("clip.mp4");
        spec.volume_adjustments_db = vec![3.0, -3.0];
        assert!(audio_filters(&spec).is_empty());
    }

    #[test]
    fn test_mono_downmix_expression() {
        let mut spec = EditSpec::new("clip.mp4");
        spec.stereo_to_mono = true;
        assert_eq!(
            audio_filters(&spec),
            vec!["pan=mono|c0=.5*c0+.5*c1".to_string()]
        );
    }

    #[test]
    fn test_audio_chain_order_and_tempo_chaining() {
        let mut spec = EditSpec::new("clip.mp4");
        spec.volume_adjustments_db = vec![2.5];
        spec.stereo_to_mono = true;
        spec.speed = 0.25;
        assert_eq!(
            audio_filters(&spec),
            vec![
                "volume=2.5dB".to_string(),
                "pan=mono|c0=.5*c0+.5*c1".to_string(),
                "atempo=0.5".to_string(),
                "atempo=0.5".to_string(),
            ]
        );
    }

    #[test]
    fn test_mute_suppresses_audio_filters() {
        let mut spec = EditSpec::new("clip.mp4");
        spec.mute = true;
        spec.volume_adjustments_db = vec![4.0];
        spec.stereo_to_mono = true;
        spec.speed = 3.0;
        assert!(audio_filters(&spec).is_empty());
    }
}

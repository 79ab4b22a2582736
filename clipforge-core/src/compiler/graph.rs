//! Complex filter graph assembly for watermark overlay.
//!
//! With a watermark present the command becomes a two-input graph: the
//! primary video runs through the ordinary chain into a named [main]
//! node (an identity pass-through when no stages apply), the watermark
//! is scaled relative to the processed main video, opacity is applied
//! through the alpha channel, and the overlay lands at the requested
//! position in [outv].

use crate::spec::{WatermarkPosition, WatermarkSettings};
use crate::utils::fmt_min_one;

/// Pixel inset used by the named anchor positions.
const ANCHOR_INSET: u32 = 10;

/// Overlay position expression in terms of the background (W/H) and
/// overlay (w/h) dimensions.
#[must_use]
pub(crate) fn position_expr(position: WatermarkPosition) -> String {
    match position {
        WatermarkPosition::TopLeft => format!("x={ANCHOR_INSET}:y={ANCHOR_INSET}"),
        WatermarkPosition::TopRight => format!("x=W-w-{ANCHOR_INSET}:y={ANCHOR_INSET}"),
        WatermarkPosition::BottomLeft => format!("x={ANCHOR_INSET}:y=H-h-{ANCHOR_INSET}"),
        WatermarkPosition::BottomRight => {
            format!("x=W-w-{ANCHOR_INSET}:y=H-h-{ANCHOR_INSET}")
        }
        WatermarkPosition::Center => "x=(W-w)/2:y=(H-h)/2".to_string(),
        WatermarkPosition::Custom { x, y } => format!("x={x}:y={y}"),
    }
}

/// Builds the full overlay graph from the main-video filter stages and
/// the watermark placement settings.
#[must_use]
pub(crate) fn overlay_graph(settings: &WatermarkSettings, main_filters: &[String]) -> String {
    // Never leave the primary stream unreferenced: an empty chain still
    // routes through an identity node.
    let main_chain = if main_filters.is_empty() {
        "null".to_string()
    } else {
        main_filters.join(",")
    };

    let scale = fmt_min_one(f64::from(settings.scale), 2);
    let opacity = fmt_min_one(f64::from(settings.opacity), 2);
    let position = position_expr(settings.position);

    format!(
        "[0:v]{main_chain}[main];\
         [1:v][main]scale2ref=w=iw*{scale}:h=-1[wm_sized][main_ref];\
         [wm_sized]format=rgba,colorchannelmixer=aa={opacity}[wm_final];\
         [main_ref][wm_final]overlay={position}[outv]"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_positions() {
        assert_eq!(position_expr(WatermarkPosition::TopLeft), "x=10:y=10");
        assert_eq!(position_expr(WatermarkPosition::TopRight), "x=W-w-10:y=10");
        assert_eq!(position_expr(WatermarkPosition::BottomLeft), "x=10:y=H-h-10");
        assert_eq!(
            position_expr(WatermarkPosition::BottomRight),
            "x=W-w-10:y=H-h-10"
        );
        assert_eq!(
            position_expr(WatermarkPosition::Center),
            "x=(W-w)/2:y=(H-h)/2"
        );
    }

    #[test]
    fn test_custom_position_uses_literal_offsets() {
        assert_eq!(
            position_expr(WatermarkPosition::Custom { x: 42, y: 7 }),
            "x=42:y=7"
        );
    }

    #[test]
    fn test_graph_with_empty_main_chain() {
        let settings = WatermarkSettings::image("logo.png");
        let graph = overlay_graph(&settings, &[]);
        assert_eq!(
            graph,
            "[0:v]null[main];\
             [1:v][main]scale2ref=w=iw*0.15:h=-1[wm_sized][main_ref];\
             [wm_sized]format=rgba,colorchannelmixer=aa=1.0[wm_final];\
             [main_ref][wm_final]overlay=x=W-w-10:y=H-h-10[outv]"
        );
    }

    #[test]
    fn test_graph_routes_main_filters() {
        let mut settings = WatermarkSettings::image("logo.png");
        settings.opacity = 0.5;
        settings.scale = 0.2;
        settings.position = WatermarkPosition::Center;
        let filters = vec!["hflip".to_string(), "vflip".to_string()];
        let graph = overlay_graph(&settings, &filters);
        assert!(graph.starts_with("[0:v]hflip,vflip[main];"));
        assert!(graph.contains("scale2ref=w=iw*0.2:h=-1"));
        assert!(graph.contains("colorchannelmixer=aa=0.5"));
        assert!(graph.ends_with("overlay=x=(W-w)/2:y=(H-h)/2[outv]"));
    }
}

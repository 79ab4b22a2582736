//! Progress event model and encoder diagnostic parsing.
//!
//! The encoder reports everything on its error stream. The parser pulls
//! the total duration out of the first `Duration:` header line, then
//! turns each `time=` status line into a progress event, folding in the
//! `speed=` and `size=` telemetry tokens when they appear. Lines that
//! match nothing are not errors; they simply produce no event.

use crate::utils::format_duration;
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;

/// Percent ceiling while the process is still running. 100 is only ever
/// reported after the process has exited successfully, so a stream token
/// can never signal a premature "done".
const RUNNING_PERCENT_CEILING: f64 = 99.0;

/// Speed factors at or below this are too noisy for an ETA.
const MIN_ETA_SPEED: f32 = 0.01;

static DURATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Duration:\s*(\d+):(\d+):(\d+(?:\.\d+)?)").unwrap());
static TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"time=(\d+):(\d+):(\d+(?:\.\d+)?)").unwrap());
static SPEED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"speed=\s*(\d+(?:\.\d+)?)x").unwrap());
static SIZE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)size=\s*(\d+)\s*(kB|mB|gB|B)").unwrap());

/// A single progress update from a running encode. Produced continuously
/// by the runner, consumed by the orchestrator's callback; never
/// persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    /// 0–99 while the process runs; 100 only after confirmed success.
    pub percent: f64,
    /// Human-readable status line.
    pub message: String,
    /// Encoder speed factor relative to realtime, when reported.
    pub speed: Option<f32>,
    /// Estimated time remaining, when derivable.
    pub eta: Option<Duration>,
    /// Output size token as last reported by the encoder.
    pub output_size: Option<String>,
}

impl ProgressEvent {
    pub(crate) fn starting() -> Self {
        Self {
            percent: 0.0,
            message: "Starting...".to_string(),
            speed: None,
            eta: None,
            output_size: None,
        }
    }

    pub(crate) fn finished(success: bool) -> Self {
        Self {
            percent: if success { 100.0 } else { 0.0 },
            message: if success { "done" } else { "error" }.to_string(),
            speed: None,
            eta: None,
            output_size: None,
        }
    }
}

/// Incremental parser over encoder diagnostic lines.
///
/// The first `Duration:` line establishes the total exactly once;
/// subsequent matches are ignored. Trim bounds override the total with
/// the trimmed span so percentages track the trimmed output, not the
/// source. Reported percentages are monotonically non-decreasing.
#[derive(Debug)]
pub struct ProgressParser {
    total_secs: Option<f64>,
    trim_start: Option<f64>,
    trim_end: Option<f64>,
    last_percent: f64,
    last_speed: Option<f32>,
    last_size: Option<String>,
}

impl ProgressParser {
    /// `probed_total` seeds the total from an up-front probe; the trim
    /// adjustment applies to it the same way as to a discovered total.
    #[must_use]
    pub fn new(
        trim_start: Option<Duration>,
        trim_end: Option<Duration>,
        probed_total: Option<f64>,
    ) -> Self {
        let mut parser = Self {
            total_secs: None,
            trim_start: trim_start.map(|d| d.as_secs_f64()),
            trim_end: trim_end.map(|d| d.as_secs_f64()),
            last_percent: 0.0,
            last_speed: None,
            last_size: None,
        };
        if let Some(total) = probed_total {
            if total > 0.0 {
                parser.total_secs = Some(parser.apply_trim(total));
            }
        }
        parser
    }

    fn apply_trim(&self, source_secs: f64) -> f64 {
        match (self.trim_start, self.trim_end) {
            (Some(start), Some(end)) => (end - start).max(0.0),
            (Some(start), None) => (source_secs - start).max(0.0),
            (None, Some(end)) => end,
            (None, None) => source_secs,
        }
    }

    /// Consumes one diagnostic line, returning an event when the line
    /// carries a position update.
    pub fn parse_line(&mut self, line: &str) -> Option<ProgressEvent> {
        if let Some(caps) = SPEED_RE.captures(line) {
            self.last_speed = caps[1].parse().ok();
        }
        if let Some(caps) = SIZE_RE.captures(line) {
            self.last_size = Some(format!("{}{}", &caps[1], &caps[2]));
        }

        if self.total_secs.is_none() {
            if let Some(secs) = DURATION_RE.captures(line).and_then(|c| captured_secs(&c)) {
                if secs > 0.0 {
                    self.total_secs = Some(self.apply_trim(secs));
                }
            }
        }

        let current = TIME_RE.captures(line).and_then(|c| captured_secs(&c))?;
        let total = self.total_secs?;
        if total <= 0.0 {
            return None;
        }

        let percent = (current / total * 100.0)
            .min(RUNNING_PERCENT_CEILING)
            .max(self.last_percent);
        self.last_percent = percent;

        let eta = match self.last_speed {
            Some(speed) if speed > MIN_ETA_SPEED && current > 0.0 && total > current => {
                Some(Duration::from_secs_f64((total - current) / f64::from(speed)))
            }
            _ => None,
        };

        let mut message = format!(
            "Processing... {} / {}",
            format_duration(current),
            format_duration(total)
        );
        if let Some(speed) = self.last_speed {
            message.push_str(&format!(" ({speed}x)"));
        }
        if let Some(eta) = eta {
            message.push_str(&format!(" - ETA: {}", format_duration(eta.as_secs_f64())));
        }

        Some(ProgressEvent {
            percent,
            message,
            speed: self.last_speed,
            eta,
            output_size: self.last_size.clone(),
        })
    }
}

fn captured_secs(caps: &regex::Captures<'_>) -> Option<f64> {
    let hours: f64 = caps.get(1)?.as_str().parse().ok()?;
    let minutes: f64 = caps.get(2)?.as_str().parse().ok()?;
    let seconds: f64 = caps.get(3)?.as_str().parse().ok()?;
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "  Duration: 00:01:40.00, start: 0.000000, bitrate: 1000 kb/s";

    fn status_line(time: &str, speed: &str) -> String {
        format!("frame=  100 fps=25 q=29.0 size=    1024kB time={time} bitrate=1000.0kbits/s speed={speed}x")
    }

    #[test]
    fn test_duration_discovered_once() {
        let mut parser = ProgressParser::new(None, None, None);
        assert!(parser.parse_line(HEADER).is_none());
        // A later, different Duration line must not move the total.
        parser.parse_line("  Duration: 00:10:00.00, start: 0.000000");
        let event = parser.parse_line(&status_line("00:00:50.00", "1.0")).unwrap();
        assert!((event.percent - 50.0).abs() < 0.01);
    }

    #[test]
    fn test_no_event_before_duration_known() {
        let mut parser = ProgressParser::new(None, None, None);
        assert!(parser.parse_line(&status_line("00:00:10.00", "1.0")).is_none());
    }

    #[test]
    fn test_percent_capped_at_99_while_running() {
        let mut parser = ProgressParser::new(None, None, Some(100.0));
        let event = parser.parse_line(&status_line("00:01:40.00", "1.0")).unwrap();
        assert!((event.percent - 99.0).abs() < f64::EPSILON);
        // Even past the end the ceiling holds.
        let event = parser.parse_line(&status_line("00:02:30.00", "1.0")).unwrap();
        assert!((event.percent - 99.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_percent_monotonically_non_decreasing() {
        let mut parser = ProgressParser::new(None, None, Some(100.0));
        let first = parser.parse_line(&status_line("00:00:50.00", "1.0")).unwrap();
        // A regressed time token must not lower the reported percent.
        let second = parser.parse_line(&status_line("00:00:40.00", "1.0")).unwrap();
        assert!(second.percent >= first.percent);
    }

    #[test]
    fn test_trim_overrides_discovered_duration() {
        let mut parser = ProgressParser::new(
            Some(Duration::from_secs(10)),
            Some(Duration::from_secs(30)),
            None,
        );
        parser.parse_line(HEADER);
        // Total is the 20s trimmed span, not the 100s source.
        let event = parser.parse_line(&status_line("00:00:10.00", "1.0")).unwrap();
        assert!((event.percent - 50.0).abs() < 0.01);
    }

    #[test]
    fn test_trim_end_only_overrides_total() {
        let mut parser = ProgressParser::new(None, Some(Duration::from_secs(25)), None);
        parser.parse_line(HEADER);
        let event = parser.parse_line(&status_line("00:00:05.00", "1.0")).unwrap();
        assert!((event.percent - 20.0).abs() < 0.01);
    }

    #[test]
    fn test_trim_applies_to_probed_total() {
        let parser = ProgressParser::new(
            Some(Duration::from_secs(5)),
            Some(Duration::from_secs(15)),
            Some(100.0),
        );
        assert_eq!(parser.total_secs, Some(10.0));
    }

    #[test]
    fn test_speed_and_eta() {
        let mut parser = ProgressParser::new(None, None, Some(100.0));
        let event = parser.parse_line(&status_line("00:00:40.00", "2.0")).unwrap();
        assert_eq!(event.speed, Some(2.0));
        // 60 seconds remaining at 2x -> 30 seconds.
        assert_eq!(event.eta, Some(Duration::from_secs(30)));
        assert!(event.message.contains("(2x)"));
        assert!(event.message.contains("ETA: 00:00:30"));
    }

    #[test]
    fn test_negligible_speed_gives_no_eta() {
        let mut parser = ProgressParser::new(None, None, Some(100.0));
        let event = parser.parse_line(&status_line("00:00:40.00", "0.0")).unwrap();
        assert_eq!(event.eta, None);
    }

    #[test]
    fn test_size_token_carried_through() {
        let mut parser = ProgressParser::new(None, None, Some(100.0));
        let event = parser.parse_line(&status_line("00:00:10.00", "1.0")).unwrap();
        assert_eq!(event.output_size.as_deref(), Some("1024kB"));
    }

    #[test]
    fn test_unrelated_lines_produce_no_event() {
        let mut parser = ProgressParser::new(None, None, Some(100.0));
        assert!(parser.parse_line("Stream #0:0(und): Video: h264").is_none());
        assert!(parser.parse_line("").is_none());
        assert!(parser.parse_line("Press [q] to stop, [?] for help").is_none());
    }

    #[test]
    fn test_finished_events() {
        assert_eq!(ProgressEvent::finished(true).percent, 100.0);
        assert_eq!(ProgressEvent::finished(true).message, "done");
        assert_eq!(ProgressEvent::finished(false).percent, 0.0);
        assert_eq!(ProgressEvent::finished(false).message, "error");
    }
}

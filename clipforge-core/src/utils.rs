//! Utility functions for formatting and parsing.
//!
//! Small helpers shared across the compiler and the progress layer:
//! duration formatting, encoder time-token parsing, and the trimmed
//! decimal formatting used in filter expressions.

use std::time::Duration;

/// Formats seconds as HH:MM:SS (e.g., 3725.0 -> "01:02:05"). Returns "??:??:??" for invalid inputs.
#[must_use]
pub fn format_duration(seconds: f64) -> String {
    if seconds < 0.0 || !seconds.is_finite() {
        return "??:??:??".to_string();
    }

    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Formats a duration as HH:MM:SS.mmm, the form taken by seek bounds.
#[must_use]
pub fn format_seek(value: Duration) -> String {
    let total_ms = value.as_millis();
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;
    format!("{hours:02}:{minutes:02}:{secs:02}.{millis:03}")
}

/// Formats bytes with appropriate binary units (B, KiB, MiB, GiB).
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = KIB * 1024.0;
    const GIB: f64 = MIB * 1024.0;

    let bytes_f64 = bytes as f64;
    if bytes_f64 >= GIB {
        format!("{:.2} GiB", bytes_f64 / GIB)
    } else if bytes_f64 >= MIB {
        format!("{:.2} MiB", bytes_f64 / MIB)
    } else if bytes_f64 >= KIB {
        format!("{:.2} KiB", bytes_f64 / KIB)
    } else {
        format!("{bytes} B")
    }
}

/// Parses an encoder time token (HH:MM:SS or HH:MM:SS.ms) to seconds. Returns None if invalid.
#[must_use]
pub fn parse_ffmpeg_time(time: &str) -> Option<f64> {
    let parts: Vec<&str> = time.split(':').collect();
    if parts.len() == 3 {
        let hours = parts[0].parse::<f64>().ok()?;
        let minutes = parts[1].parse::<f64>().ok()?;
        let seconds = parts[2].parse::<f64>().ok()?;
        Some(hours * 3600.0 + minutes * 60.0 + seconds)
    } else {
        None
    }
}

/// Formats a value with at most `max_decimals` fractional digits,
/// trailing zeros removed. Filter expressions use this form so that
/// compiling the same spec always yields identical text.
#[must_use]
pub fn fmt_trimmed(value: f64, max_decimals: usize) -> String {
    let rendered = format!("{value:.max_decimals$}");
    let trimmed = rendered.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Like [`fmt_trimmed`] but always keeps at least one fractional digit
/// (scale2ref and opacity expressions take this form).
#[must_use]
pub fn fmt_min_one(value: f64, max_decimals: usize) -> String {
    let trimmed = fmt_trimmed(value, max_decimals);
    if trimmed.contains('.') {
        trimmed
    } else {
        format!("{trimmed}.0")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.0), "00:00:00");
        assert_eq!(format_duration(59.0), "00:00:59");
        assert_eq!(format_duration(3661.0), "01:01:01");
        assert_eq!(format_duration(86399.0), "23:59:59");
        // Fractional seconds truncate.
        assert_eq!(format_duration(59.9), "00:00:59");
        // Invalid inputs.
        assert_eq!(format_duration(-1.0), "??:??:??");
        assert_eq!(format_duration(f64::NAN), "??:??:??");
        assert_eq!(format_duration(f64::INFINITY), "??:??:??");
    }

    #[test]
    fn test_format_seek() {
        assert_eq!(format_seek(Duration::from_secs(0)), "00:00:00.000");
        assert_eq!(format_seek(Duration::from_millis(5500)), "00:00:05.500");
        assert_eq!(format_seek(Duration::from_secs(3723)), "01:02:03.000");
        assert_eq!(
            format_seek(Duration::from_millis(3_600_000 + 90_250)),
            "01:01:30.250"
        );
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1024), "1.00 KiB");
        assert_eq!(format_bytes(1536), "1.50 KiB");
        assert_eq!(format_bytes(1024 * 1024 * 2), "2.00 MiB");
        assert_eq!(format_bytes(1024 * 1024 * 1024), "1.00 GiB");
    }

    #[test]
    fn test_parse_ffmpeg_time() {
        assert_eq!(parse_ffmpeg_time("00:00:00"), Some(0.0));
        assert_eq!(parse_ffmpeg_time("01:02:03"), Some(3723.0));
        assert_eq!(parse_ffmpeg_time("00:00:01.25"), Some(1.25));
        assert_eq!(parse_ffmpeg_time("01:30:45.75"), Some(5445.75));
        assert_eq!(parse_ffmpeg_time(""), None);
        assert_eq!(parse_ffmpeg_time("00:00"), None);
        assert_eq!(parse_ffmpeg_time("aa:bb:cc"), None);
    }

    #[test]
    fn test_fmt_trimmed() {
        assert_eq!(fmt_trimmed(1.0, 4), "1");
        assert_eq!(fmt_trimmed(0.5, 4), "0.5");
        assert_eq!(fmt_trimmed(0.3333333, 4), "0.3333");
        assert_eq!(fmt_trimmed(-3.0, 3), "-3");
        assert_eq!(fmt_trimmed(2.5, 3), "2.5");
        assert_eq!(fmt_trimmed(1.570_796_326_79, 8), "1.57079633");
        assert_eq!(fmt_trimmed(0.0, 4), "0");
    }

    #[test]
    fn test_fmt_min_one() {
        assert_eq!(fmt_min_one(1.0, 2), "1.0");
        assert_eq!(fmt_min_one(0.15, 2), "0.15");
        assert_eq!(fmt_min_one(0.5, 2), "0.5");
        assert_eq!(fmt_min_one(0.0, 2), "0.0");
    }
}

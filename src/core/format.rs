//! Human-readable rendering of byte counts, rates and durations
//!
//! Only used at output time. All arithmetic happens on raw numbers elsewhere.

use std::time::Duration;

/// Binary (1024-based) size units, smallest first
const UNITS: [&str; 9] = ["B", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Scales a byte count to the largest unit keeping the value below 1024.
///
/// The unit is chosen on the value as printed with two decimals, so
/// `1_048_575` reads `1.00 MB` rather than `1024.00 KB`. Values past the last
/// unit stay in `YB` even when >= 1024.
pub fn scale_bytes(size: f64) -> (f64, &'static str) {
    let mut value = size;
    let mut idx = 0;
    while (value * 100.0).round() / 100.0 >= 1024.0 && idx < UNITS.len() - 1 {
        value /= 1024.0;
        idx += 1;
    }
    (value, UNITS[idx])
}

/// Formats a byte count, e.g. `5242880` -> `5.00 MB`
pub fn human_bytes(size: u64) -> String {
    let (value, unit) = scale_bytes(size as f64);
    format!("{value:.2} {unit}")
}

/// Formats a transfer rate in bytes per second, e.g. `1.50 MB/s`
pub fn human_rate(bytes_per_sec: f64) -> String {
    let (value, unit) = scale_bytes(bytes_per_sec.max(0.0));
    format!("{value:.2} {unit}/s")
}

/// Formats milliseconds as `w:d:h:m:s`, dropping zero-valued units.
///
/// `90_000` gives `1m:30s`; anything under a second gives an empty string.
pub fn format_millis(milliseconds: u64) -> String {
    let seconds = milliseconds / 1000;
    let (minutes, seconds) = (seconds / 60, seconds % 60);
    let (hours, minutes) = (minutes / 60, minutes % 60);
    let (days, hours) = (hours / 24, hours % 24);
    let (weeks, days) = (days / 7, days % 7);

    [(weeks, "w"), (days, "d"), (hours, "h"), (minutes, "m"), (seconds, "s")]
        .iter()
        .filter(|(amount, _)| *amount > 0)
        .map(|(amount, suffix)| format!("{amount}{suffix}"))
        .collect::<Vec<_>>()
        .join(":")
}

/// Formats a `Duration` with [`format_millis`]
pub fn format_duration(duration: Duration) -> String {
    format_millis(duration.as_millis().min(u64::MAX as u128) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_bytes_units() {
        assert_eq!(human_bytes(0), "0.00 B");
        assert_eq!(human_bytes(1023), "1023.00 B");
        assert_eq!(human_bytes(1024), "1.00 KB");
        assert_eq!(human_bytes(1536), "1.50 KB");
        assert_eq!(human_bytes(5 * 1024 * 1024), "5.00 MB");
        assert_eq!(human_bytes(10_485_760), "10.00 MB");
        assert_eq!(human_bytes(3 * 1024 * 1024 * 1024), "3.00 GB");
    }

    #[test]
    fn test_scale_bytes_stays_below_1024() {
        let samples = [0u64, 1, 512, 1023, 1024, 1025, 999_999, 1 << 20, (1 << 30) + 7, 1 << 40, u64::MAX];
        for n in samples {
            let (value, unit) = scale_bytes(n as f64);
            assert!(value < 1024.0, "{n} scaled to {value} {unit}");

            let power = UNITS.iter().position(|u| *u == unit).unwrap() as i32;
            let restored = value * 1024f64.powi(power);
            let tolerance = (n as f64) * 1e-9 + 1e-9;
            assert!((restored - n as f64).abs() <= tolerance, "{n} restored as {restored}");
        }
    }

    #[test]
    fn test_unit_follows_rounded_value() {
        assert_eq!(human_bytes(1_048_575), "1.00 MB");
        assert_eq!(human_bytes(1_048_570), "1023.99 KB");
        assert_eq!(human_bytes((1 << 30) - 1), "1.00 GB");
        assert_eq!(human_rate(1023.996), "1.00 KB/s");
    }

    #[test]
    fn test_scale_bytes_caps_at_largest_unit() {
        let huge = 1024f64.powi(9) * 3.0;
        let (value, unit) = scale_bytes(huge);
        assert_eq!(unit, "YB");
        assert!((value - 3072.0).abs() < 1e-6);
    }

    #[test]
    fn test_human_rate() {
        assert_eq!(human_rate(0.0), "0.00 B/s");
        assert_eq!(human_rate(1024.0 * 1024.0 * 1.5), "1.50 MB/s");
    }

    #[test]
    fn test_format_millis() {
        assert_eq!(format_millis(0), "");
        assert_eq!(format_millis(999), "");
        assert_eq!(format_millis(1_000), "1s");
        assert_eq!(format_millis(90_000), "1m:30s");
        assert_eq!(format_millis(3_600_000), "1h");
        assert_eq!(format_millis(3_605_000), "1h:5s");
        assert_eq!(format_millis(8 * 24 * 3_600_000 + 61_000), "1w:1d:1m:1s");
    }

    #[test]
    fn test_format_millis_never_leads_with_zero() {
        for ms in (0..200_000_000u64).step_by(7_919_777) {
            let out = format_millis(ms);
            assert!(!out.starts_with('0'), "{ms} rendered as {out}");
            assert!(!out.contains(":0"), "{ms} rendered as {out}");
        }
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(125)), "2m:5s");
        assert_eq!(format_duration(Duration::ZERO), "");
    }
}

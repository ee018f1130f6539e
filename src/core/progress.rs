//! Transfer progress tracking
//!
//! A `TransferProgress` is a snapshot of one download: how many bytes went
//! through, how many are expected, and how long it took so far. Percentage,
//! speed and ETA are derived from those numbers and are `None` whenever the
//! inputs can't produce a meaningful value.

use std::fmt;
use std::time::Duration;

use crate::core::format::{format_duration, human_bytes, human_rate};

/// Snapshot of an in-flight transfer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransferProgress {
    /// Bytes written to the destination so far
    pub transferred: u64,
    /// Expected total from `Content-Length`, if the server sent one
    pub total: Option<u64>,
    /// Time since the first byte was requested
    pub elapsed: Duration,
}

impl TransferProgress {
    pub fn new(transferred: u64, total: Option<u64>, elapsed: Duration) -> Self {
        Self {
            transferred,
            total,
            elapsed,
        }
    }

    /// Completion in percent, `None` when the total is unknown or zero
    pub fn percentage(&self) -> Option<f64> {
        match self.total {
            Some(total) if total > 0 => Some(self.transferred as f64 / total as f64 * 100.0),
            _ => None,
        }
    }

    /// Average speed in bytes per second, `None` before any time has elapsed
    pub fn speed(&self) -> Option<f64> {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            Some(self.transferred as f64 / secs)
        } else {
            None
        }
    }

    /// Estimated time remaining at the current average speed
    pub fn eta(&self) -> Option<Duration> {
        let total = self.total?;
        let speed = self.speed().filter(|s| *s > 0.0)?;
        let remaining = total.saturating_sub(self.transferred) as f64;
        Duration::try_from_secs_f64(remaining / speed).ok()
    }

    pub fn is_complete(&self) -> bool {
        self.total.is_some_and(|total| self.transferred >= total)
    }
}

impl fmt::Display for TransferProgress {
    /// Renders `Downloading 50.00% | 5.00 MB / 10.00 MB | 1.00 MB/s | ETA 5s`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let percentage = match self.percentage() {
            Some(p) => format!("{p:.2}%"),
            None => "?%".to_string(),
        };
        let total = match self.total {
            Some(total) => human_bytes(total),
            None => "unknown".to_string(),
        };
        let speed = match self.speed() {
            Some(speed) => human_rate(speed),
            None => "-- B/s".to_string(),
        };
        let eta = match self.eta().map(format_duration) {
            // sub-second remainders format as an empty string
            Some(eta) if eta.is_empty() => "0s".to_string(),
            Some(eta) => eta,
            None => "unknown".to_string(),
        };

        write!(
            f,
            "Downloading {} | {} / {} | {} | ETA {}",
            percentage,
            human_bytes(self.transferred),
            total,
            speed,
            eta
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_half_way() {
        let progress = TransferProgress::new(5_242_880, Some(10_485_760), Duration::from_secs(5));
        assert_eq!(progress.percentage(), Some(50.0));
    }

    #[test]
    fn test_unknown_total_has_no_percentage_or_eta() {
        let progress = TransferProgress::new(1024, None, Duration::from_secs(1));
        assert_eq!(progress.percentage(), None);
        assert_eq!(progress.eta(), None);
        assert_eq!(progress.speed(), Some(1024.0));
        assert!(!progress.is_complete());
    }

    #[test]
    fn test_zero_total_has_no_percentage() {
        let progress = TransferProgress::new(0, Some(0), Duration::from_secs(1));
        assert_eq!(progress.percentage(), None);
        assert!(progress.is_complete());
    }

    #[test]
    fn test_zero_elapsed_has_no_speed() {
        let progress = TransferProgress::new(4096, Some(8192), Duration::ZERO);
        assert_eq!(progress.speed(), None);
        assert_eq!(progress.eta(), None);
    }

    #[test]
    fn test_eta_from_average_speed() {
        // 5 MB in 5s = 1 MB/s, 5 MB left
        let progress = TransferProgress::new(5_242_880, Some(10_485_760), Duration::from_secs(5));
        assert_eq!(progress.speed(), Some(1_048_576.0));
        assert_eq!(progress.eta(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_eta_out_of_range() {
        let progress = TransferProgress::new(1, Some(u64::MAX), Duration::from_secs(u64::MAX / 4));
        assert_eq!(progress.eta(), None);
    }

    #[test]
    fn test_eta_when_nothing_transferred_yet() {
        let progress = TransferProgress::new(0, Some(100), Duration::from_secs(2));
        assert_eq!(progress.eta(), None);
    }

    #[test]
    fn test_display_line() {
        let progress = TransferProgress::new(5_242_880, Some(10_485_760), Duration::from_secs(5));
        assert_eq!(
            progress.to_string(),
            "Downloading 50.00% | 5.00 MB / 10.00 MB | 1.00 MB/s | ETA 5s"
        );
    }

    #[test]
    fn test_display_line_unknown_total() {
        let progress = TransferProgress::new(2048, None, Duration::from_secs(2));
        assert_eq!(
            progress.to_string(),
            "Downloading ?% | 2.00 KB / unknown | 1.00 KB/s | ETA unknown"
        );
    }
}

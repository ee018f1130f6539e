//! CLI-specific progress handling for mediafire-dl
//!
//! Renders the library's progress snapshots on a single status line.

use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use mediafire_dl::{ProgressCallback, TransferProgress};

/// Creates the status line used while a file streams in
pub fn create_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .expect("Failed to create progress style"),
    );
    pb
}

/// Progress manager for one download
pub struct ProgressManager {
    pub pb: ProgressBar,
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressManager {
    pub fn new() -> Self {
        Self {
            pb: create_progress_bar(),
        }
    }

    /// Callback that writes each snapshot onto the status line
    pub fn callback(&self) -> ProgressCallback {
        let pb = self.pb.clone();
        Arc::new(move |progress: &TransferProgress| {
            pb.set_message(progress.to_string());
            pb.tick();
        })
    }

    pub fn finish(&self, message: String) {
        self.pb.finish_with_message(message);
    }

    /// Leave the last progress line visible after a failure
    pub fn abandon(&self) {
        self.pb.abandon();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_callback_sets_message() {
        let manager = ProgressManager::new();
        let callback = manager.callback();

        callback(&TransferProgress::new(5_242_880, Some(10_485_760), Duration::from_secs(5)));

        assert_eq!(
            manager.pb.message(),
            "Downloading 50.00% | 5.00 MB / 10.00 MB | 1.00 MB/s | ETA 5s"
        );
        manager.finish("done".to_string());
        assert!(manager.pb.is_finished());
    }
}

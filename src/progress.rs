//! Progress reporting utilities

use indicatif::{ProgressBar, ProgressStyle};

/// Progress reporter for batch runs
///
/// Safe to share across rayon workers; a minimal reporter draws nothing.
#[derive(Debug)]
pub struct ProgressReporter {
    pub datasets_pb: Option<ProgressBar>,
}

impl ProgressReporter {
    /// Create progress reporter for a batch of `total` datasets
    pub fn new_for_batch(total: u64) -> Self {
        Self {
            datasets_pb: Some(create_progress_bar(total, "Diffing datasets")),
        }
    }

    /// Create minimal progress reporter (no progress bars)
    pub fn new_minimal() -> Self {
        Self { datasets_pb: None }
    }

    /// Mark one dataset as done
    pub fn inc(&self, stem: &str) {
        if let Some(pb) = &self.datasets_pb {
            pb.set_message(stem.to_string());
            pb.inc(1);
        }
    }

    /// Finish and leave a final message
    pub fn finish(&self, message: &str) {
        if let Some(pb) = &self.datasets_pb {
            pb.finish_with_message(message.to_string());
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        if let Some(pb) = self.datasets_pb.take() {
            if !pb.is_finished() {
                pb.finish_and_clear();
            }
        }
    }
}

/// Create a progress bar with known total
fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>4}/{len:4} {msg}")
            .expect("Invalid progress template")
            .progress_chars("#>-"),
    );
    pb.set_message(message.to_string());
    pb
}

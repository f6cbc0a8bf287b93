//! Progress reporting for the repository ingestion loop.
//!
//! The CLI drives an `IndicatifReporter`; library callers and tests use
//! `NoopReporter`.

use indicatif::{ProgressBar, ProgressStyle};

/// Trait for reporting ingestion progress.
pub trait ProgressReporter: Send + Sync {
    /// Begin a new phase with an optional total count.
    fn start(&self, phase: &str, total: Option<u64>);

    /// Advance progress by one step, labeled with the current repository.
    fn step(&self, label: &str);

    /// Mark the current phase as finished.
    fn finish(&self);

    /// Display an informational line above the bar.
    fn message(&self, msg: &str);
}

/// Silent reporter for library callers and tests.
#[derive(Debug, Default)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn start(&self, _phase: &str, _total: Option<u64>) {}
    fn step(&self, _label: &str) {}
    fn finish(&self) {}
    fn message(&self, _msg: &str) {}
}

/// Reporter backed by an `indicatif` progress bar for CLI use.
#[derive(Debug)]
pub struct IndicatifReporter {
    bar: ProgressBar,
}

impl Default for IndicatifReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl IndicatifReporter {
    pub fn new() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }
}

impl ProgressReporter for IndicatifReporter {
    fn start(&self, phase: &str, total: Option<u64>) {
        if let Some(total) = total {
            self.bar.set_length(total);
            self.bar.set_style(
                ProgressStyle::with_template(
                    "{spinner:.green} {msg} [{bar:30.cyan/blue}] {pos}/{len} ({eta})",
                )
                .unwrap()
                .progress_chars("=> "),
            );
        } else {
            self.bar.set_length(0);
            self.bar.set_style(
                ProgressStyle::with_template("{spinner:.green} {msg} {pos} items").unwrap(),
            );
        }
        self.bar.set_message(phase.to_string());
        self.bar.reset();
    }

    fn step(&self, label: &str) {
        self.bar.set_message(label.to_string());
        self.bar.inc(1);
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }

    fn message(&self, msg: &str) {
        self.bar.println(msg);
    }
}

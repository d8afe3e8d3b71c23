// synothumb/src/processors/report.rs
use crate::core::{FailureDetail, Outcome, OutcomeStatus};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Receives one record per finished file. Workers call it concurrently.
pub trait OutcomeSink: Sync {
    fn record(&self, outcome: &Outcome);
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub failures: Vec<(PathBuf, FailureDetail)>,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.processed + self.skipped + self.failed
    }
}

/// Thread-safe counters plus the failure list.
#[derive(Default)]
pub struct Tally {
    processed: AtomicUsize,
    skipped: AtomicUsize,
    failed: AtomicUsize,
    failures: Mutex<Vec<(PathBuf, FailureDetail)>>,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn summary(&self) -> RunSummary {
        let mut failures = self
            .failures
            .lock()
            .map(|failures| failures.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone());
        failures.sort_by(|a, b| a.0.cmp(&b.0));

        RunSummary {
            processed: self.processed.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            failures,
        }
    }
}

impl OutcomeSink for Tally {
    fn record(&self, outcome: &Outcome) {
        match outcome.status {
            OutcomeStatus::Processed => {
                self.processed.fetch_add(1, Ordering::Relaxed);
            }
            OutcomeStatus::Skipped => {
                self.skipped.fetch_add(1, Ordering::Relaxed);
            }
            OutcomeStatus::Failed => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                if let Some(detail) = &outcome.error {
                    let mut failures = self
                        .failures
                        .lock()
                        .unwrap_or_else(|poisoned| poisoned.into_inner());
                    failures.push((outcome.path.clone(), detail.clone()));
                }
            }
        }
    }
}

/// Logs each outcome, advances the progress bar and prints failures above it.
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    pub fn new(total: usize) -> Self {
        Self::with_bar(create_progress_bar(total))
    }

    pub fn with_bar(bar: ProgressBar) -> Self {
        Self { bar }
    }

    pub fn finish(&self, summary: &RunSummary) {
        self.bar.finish_with_message(format!(
            "{} processed, {} skipped, {} failed",
            summary.processed, summary.skipped, summary.failed
        ));
    }
}

impl OutcomeSink for ProgressReporter {
    fn record(&self, outcome: &Outcome) {
        log_outcome(outcome);
        if outcome.status == OutcomeStatus::Failed {
            self.bar
                .println(format!("Error: {}", outcome.path.display()));
        }
        self.bar.inc(1);
    }
}

pub fn log_outcome(outcome: &Outcome) {
    let name = outcome
        .path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    match (&outcome.status, &outcome.error) {
        (OutcomeStatus::Skipped, _) => log::info!("Skipped (already exists): {}", name),
        (OutcomeStatus::Processed, _) => {
            log::info!("{} processed: {}", capitalize(outcome.category.label()), name)
        }
        (OutcomeStatus::Failed, Some(detail)) => log::error!(
            "Error processing {} {} [{:?}]: {}",
            outcome.category.label(),
            outcome.path.display(),
            detail.kind,
            detail.message
        ),
        (OutcomeStatus::Failed, None) => log::error!(
            "Error processing {} {}",
            outcome.category.label(),
            outcome.path.display()
        ),
    }
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn create_progress_bar(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb.set_message("Generating thumbnails");
    pb
}

//! Console reporting collaborators: a leveled message sink and a progress
//! sink.
//!
//! The core pipeline reports through these narrow traits only, so embedders
//! can swap in their own sinks (or [`NullProgress`] to stay silent).

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

/// Leveled, user-facing message sink.
pub trait MessageSink {
    fn error(&self, message: &str);
    fn warning(&self, message: &str);
    fn notice(&self, message: &str);
    fn info(&self, message: &str);
}

/// Progress sink driven by the save pipeline: an upper bound, increments,
/// and completion.
pub trait ProgressReporter {
    /// Upper bound on upcoming progress, when known.
    fn max_hint(&mut self, max: u64);
    /// Advance by `amount` steps.
    fn progress_by(&mut self, amount: u64);
    /// Work finished; release any display resources.
    fn done(&mut self);
}

/// Message sink printing colored output to the terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl MessageSink for ConsoleSink {
    fn error(&self, message: &str) {
        eprintln!("{} {message}", "error:".red().bold());
    }

    fn warning(&self, message: &str) {
        eprintln!("{} {message}", "warning:".yellow().bold());
    }

    fn notice(&self, message: &str) {
        println!("{} {message}", "note:".cyan());
    }

    fn info(&self, message: &str) {
        println!("{message}");
    }
}

/// Progress reporter rendering an indicatif bar.
#[derive(Debug, Default)]
pub struct ConsoleProgress {
    bar: Option<ProgressBar>,
}

impl ConsoleProgress {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressReporter for ConsoleProgress {
    fn max_hint(&mut self, max: u64) {
        let bar = ProgressBar::new(max);
        bar.set_style(
            ProgressStyle::with_template("{bar:30.cyan/blue} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        self.bar = Some(bar);
    }

    fn progress_by(&mut self, amount: u64) {
        if let Some(bar) = &self.bar {
            bar.inc(amount);
        }
    }

    fn done(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

/// Progress reporter that discards everything. For tests and quiet mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgress;

impl ProgressReporter for NullProgress {
    fn max_hint(&mut self, _max: u64) {}
    fn progress_by(&mut self, _amount: u64) {}
    fn done(&mut self) {}
}

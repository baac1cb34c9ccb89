//! Generation progress reporting.
//!
//! Reporters observe the batch as it runs; the pipeline never waits on
//! them and they must not fail. Console and null implementations cover
//! the CLI and tests; anything else can implement the trait.

use std::io::Write;

/// Events reported while a batch runs.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Batch started
    GenerationStarted {
        /// Planned number of units (tokens) to produce
        total: usize,
    },
    /// One token finished
    TokenCompleted {
        /// Units completed so far
        completed: usize,
        /// Planned total
        total: usize,
        /// Human-readable unit label (e.g. "imp", "imp_reminder1")
        label: String,
    },
    /// A unit was skipped after a validation or render failure
    UnitSkipped {
        /// Unit label
        label: String,
        /// Why it was skipped
        reason: String,
    },
    /// Batch finished, by completion or cancellation
    GenerationFinished {
        /// Tokens actually produced
        produced: usize,
        /// Planned total
        total: usize,
        /// Whether the batch stopped on a cancellation signal
        cancelled: bool,
    },
}

/// Trait for progress reporters.
pub trait ProgressReporter: Send + Sync {
    /// Report a progress event.
    fn report(&self, event: ProgressEvent);

    /// Check if this reporter wants verbose output.
    fn is_verbose(&self) -> bool {
        false
    }
}

/// A progress reporter that discards all events.
#[derive(Debug, Default)]
pub struct NullProgress;

impl NullProgress {
    /// Create a new null progress reporter.
    pub fn new() -> Self {
        Self
    }
}

impl ProgressReporter for NullProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// A reporter that prints one line per event to stderr.
#[derive(Debug, Default)]
pub struct ConsoleProgress {
    verbose: bool,
}

impl ConsoleProgress {
    /// Create a console reporter.
    pub fn new() -> Self {
        Self { verbose: false }
    }

    /// Enable per-token lines.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

impl ProgressReporter for ConsoleProgress {
    fn report(&self, event: ProgressEvent) {
        let stderr = std::io::stderr();
        let mut out = stderr.lock();
        let _ = match event {
            ProgressEvent::GenerationStarted { total } => {
                writeln!(out, "Generating {} tokens", total)
            }
            ProgressEvent::TokenCompleted { completed, total, label } => {
                if self.verbose {
                    writeln!(out, "  [{}/{}] {}", completed, total, label)
                } else {
                    write!(out, "\r  {}/{}", completed, total)
                }
            }
            ProgressEvent::UnitSkipped { label, reason } => {
                writeln!(out, "  skipped {}: {}", label, reason)
            }
            ProgressEvent::GenerationFinished { produced, total, cancelled } => {
                if cancelled {
                    writeln!(out, "\ncancelled after {}/{} tokens", produced, total)
                } else {
                    writeln!(out, "\ndone: {}/{} tokens", produced, total)
                }
            }
        };
    }

    fn is_verbose(&self) -> bool {
        self.verbose
    }
}

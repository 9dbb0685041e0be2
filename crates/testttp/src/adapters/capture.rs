//! Capturing reporter adapter

use crate::error::Fatal;
use crate::ports::Reporter;

/// How a failure was reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// Recorded, execution continued.
    Error,
    /// Recorded, execution aborted.
    Fatal,
}

/// A single recorded failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Reporting mode.
    pub kind: ReportKind,
    /// Failure message.
    pub message: String,
}

/// Reporter that records failures instead of failing the surrounding test.
///
/// Useful for checking how assertions behave, including ones written on top
/// of this crate.
#[derive(Debug, Default)]
pub struct CapturingReporter {
    reports: Vec<Report>,
}

impl CapturingReporter {
    /// Creates an empty reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            reports: Vec::new(),
        }
    }

    /// All reports in the order they were made.
    #[must_use]
    pub fn reports(&self) -> &[Report] {
        &self.reports
    }

    /// Messages of all reports in order.
    #[must_use]
    pub fn messages(&self) -> Vec<&str> {
        self.reports.iter().map(|r| r.message.as_str()).collect()
    }

    /// Whether a fatal report was made.
    #[must_use]
    pub fn aborted(&self) -> bool {
        self.reports.iter().any(|r| r.kind == ReportKind::Fatal)
    }

    /// Consumes the reporter, returning its reports.
    #[must_use]
    pub fn into_reports(self) -> Vec<Report> {
        self.reports
    }
}

impl Reporter for CapturingReporter {
    fn error(&mut self, message: String) {
        self.reports.push(Report {
            kind: ReportKind::Error,
            message,
        });
    }

    fn fatal(&mut self, message: String) -> Fatal {
        let fatal = Fatal::new(message.clone());
        self.reports.push(Report {
            kind: ReportKind::Fatal,
            message,
        });
        fatal
    }

    fn failed(&self) -> bool {
        !self.reports.is_empty()
    }
}

//! Test-reporting port

use crate::error::Fatal;

/// Handle through which assertions report failures.
///
/// The two reporting modes are explicit: [`Reporter::error`] records a
/// failure and lets the caller carry on, [`Reporter::fatal`] records it and
/// hands back a [`Fatal`] token that stops the current dispatch.
pub trait Reporter {
    /// Marks the current check as failed and continues.
    fn error(&mut self, message: String);

    /// Marks the current check as failed and aborts.
    ///
    /// Implementations may unwind instead of returning.
    #[must_use = "return Err(fatal) to stop the dispatch"]
    fn fatal(&mut self, message: String) -> Fatal;

    /// Whether any failure has been reported.
    fn failed(&self) -> bool;
}

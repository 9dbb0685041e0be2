//! Reporter adapter for the built-in test harness
//!
//! A `#[test]` function fails by panicking. Fatal reports panic on the spot;
//! continue-style reports are collected and raised together once the harness
//! goes out of scope.

use std::fmt::Write as _;

use crate::error::Fatal;
use crate::ports::Reporter;

/// Reporter for use inside `#[test]` functions.
///
/// ```
/// use bytes::Bytes;
/// use http::Request;
/// use testttp::{ResponseRecorder, TestHarness, get, status_ok};
///
/// fn handler(w: &mut ResponseRecorder, _req: Request<Bytes>) {
///     w.write_body(b"ok");
/// }
///
/// let mut t = TestHarness::new();
/// get(&mut t, &handler, "/", &[&status_ok()]);
/// t.finish();
/// ```
#[derive(Debug, Default)]
pub struct TestHarness {
    name: Option<String>,
    errors: Vec<String>,
}

impl TestHarness {
    /// Creates an unnamed harness.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            name: None,
            errors: Vec::new(),
        }
    }

    /// Creates a harness whose failure output is prefixed with `name`.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            errors: Vec::new(),
        }
    }

    /// Failures recorded so far.
    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Ends the check.
    ///
    /// # Panics
    ///
    /// Panics with every recorded failure if there is at least one.
    #[allow(clippy::panic)]
    pub fn finish(mut self) {
        if !self.errors.is_empty() {
            let summary = self.summary();
            self.errors.clear();
            panic!("{summary}");
        }
    }

    fn summary(&self) -> String {
        let mut out = self
            .name
            .as_ref()
            .map_or_else(String::new, |name| format!("{name}: "));
        let _ = write!(out, "{} failure(s)", self.errors.len());
        for message in &self.errors {
            let _ = write!(out, "\n\t{message}");
        }
        out
    }
}

impl Reporter for TestHarness {
    fn error(&mut self, message: String) {
        tracing::error!(name = self.name.as_deref(), %message, "check failed");
        self.errors.push(message);
    }

    #[allow(clippy::panic)]
    fn fatal(&mut self, message: String) -> Fatal {
        tracing::error!(name = self.name.as_deref(), %message, "check failed, aborting");
        self.errors.push(message);
        let summary = self.summary();
        // Drop must not raise the same failures a second time.
        self.errors.clear();
        panic!("{summary}");
    }

    fn failed(&self) -> bool {
        !self.errors.is_empty()
    }
}

impl Drop for TestHarness {
    fn drop(&mut self) {
        if std::thread::panicking() {
            return;
        }
        assert!(self.errors.is_empty(), "{}", self.summary());
    }
}

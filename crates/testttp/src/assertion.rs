//! Response assertions
//!
//! Assertions are evaluated in order against the captured response of one
//! dispatch. Status checks abort on mismatch; custom checks decide for
//! themselves through the reporter they are handed.

use http::header::{HeaderName, HeaderValue};

use crate::error::Outcome;
use crate::ports::Reporter;
use crate::recorder::ResponseRecorder;

/// A check run against a captured response.
pub trait Assertion {
    /// Inspects `w`, reporting through `t`.
    ///
    /// # Errors
    ///
    /// Returns the [`crate::Fatal`] token when the check reported fatally.
    fn check(&self, t: &mut dyn Reporter, w: &ResponseRecorder) -> Outcome;
}

/// Exact status-code matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    expected: u16,
}

impl Status {
    /// The status code this assertion expects.
    #[must_use]
    pub const fn expected(&self) -> u16 {
        self.expected
    }
}

impl Assertion for Status {
    fn check(&self, t: &mut dyn Reporter, w: &ResponseRecorder) -> Outcome {
        let got = w.status().as_u16();
        if got == self.expected {
            return Ok(());
        }
        Err(t.fatal(format!(
            "received incorrect status code:\twant: {}\tgot: {}",
            self.expected, got
        )))
    }
}

/// Caller-supplied check.
pub struct Resp<F> {
    assert_fn: F,
}

impl<F> std::fmt::Debug for Resp<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resp").finish_non_exhaustive()
    }
}

impl<F> Assertion for Resp<F>
where
    F: Fn(&mut dyn Reporter, &ResponseRecorder) -> Outcome,
{
    fn check(&self, t: &mut dyn Reporter, w: &ResponseRecorder) -> Outcome {
        (self.assert_fn)(t, w)
    }
}

/// Header presence or value matcher. Mismatches do not abort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    name: HeaderName,
    value: Option<HeaderValue>,
}

impl Header {
    /// Additionally requires the header to equal `value`.
    #[must_use]
    pub fn value(mut self, value: HeaderValue) -> Self {
        self.value = Some(value);
        self
    }
}

impl Assertion for Header {
    fn check(&self, t: &mut dyn Reporter, w: &ResponseRecorder) -> Outcome {
        match (w.header(&self.name), &self.value) {
            (None, _) => t.error(format!("missing header: {}", self.name)),
            (Some(got), Some(want)) if got != want => t.error(format!(
                "incorrect header {}:\twant: {:?}\tgot: {:?}",
                self.name, want, got
            )),
            _ => {}
        }
        Ok(())
    }
}

/// Wraps a custom check on the captured response.
///
/// The function picks its own failure mode: `t.error(..)` to keep going,
/// `Err(t.fatal(..))` to stop the dispatch.
pub const fn resp<F>(assert_fn: F) -> Resp<F>
where
    F: Fn(&mut dyn Reporter, &ResponseRecorder) -> Outcome,
{
    Resp { assert_fn }
}

/// Verifies the response status equals `status`; aborts on mismatch.
#[must_use]
pub const fn status(status: u16) -> Status {
    Status { expected: status }
}

/// Verifies the response carries header `name`.
#[must_use]
pub const fn header(name: HeaderName) -> Header {
    Header { name, value: None }
}

/// Verifies the status code is 200 (OK).
#[must_use]
pub const fn status_ok() -> Status {
    status(200)
}

/// Verifies the status code is 201 (Created).
#[must_use]
pub const fn status_created() -> Status {
    status(201)
}

/// Verifies the status code is 202 (Accepted).
#[must_use]
pub const fn status_accepted() -> Status {
    status(202)
}

/// Verifies the status code is 204 (No Content).
#[must_use]
pub const fn status_no_content() -> Status {
    status(204)
}

/// Verifies the status code is 206 (Partial Content).
#[must_use]
pub const fn status_partial_content() -> Status {
    status(206)
}

/// Verifies the status code is 404 (Not Found).
#[must_use]
pub const fn status_not_found() -> Status {
    status(404)
}

/// Verifies the status code is 422 (Unprocessable Entity).
#[must_use]
pub const fn status_unprocessable_entity() -> Status {
    status(422)
}

/// Verifies the status code is 500 (Internal Server Error).
#[must_use]
pub const fn status_internal_server_error() -> Status {
    status(500)
}

/// Verifies the status code is 501 (Not Implemented).
#[must_use]
pub const fn status_not_implemented() -> Status {
    status(501)
}

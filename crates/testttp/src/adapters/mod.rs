//! Adapters for the reporting and handler ports.

mod capture;
mod harness;
mod service;

pub use capture::{CapturingReporter, Report, ReportKind};
pub use harness::TestHarness;
pub use service::ServiceHandler;

//! Port definitions (interfaces)
//!
//! The two boundaries of a dispatch: the handler being exercised and the
//! test-reporting handle failures are reported through.

mod handler;
mod reporter;

pub use handler::Handler;
pub use reporter::Reporter;

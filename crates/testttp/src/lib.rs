//! testttp - in-process HTTP handler assertions
//!
//! Dispatches a synthetic request to a handler, records the response and runs
//! a list of assertions against it in order.
//!
//! ```
//! use bytes::Bytes;
//! use http::{Request, StatusCode};
//! use testttp::{CapturingReporter, ResponseRecorder, delete, get, status_created, status_no_content};
//!
//! fn handler(w: &mut ResponseRecorder, req: Request<Bytes>) {
//!     if *req.method() == http::Method::DELETE {
//!         w.write_header(StatusCode::NO_CONTENT);
//!     }
//! }
//!
//! let mut t = CapturingReporter::new();
//! delete(&mut t, &handler, "/", &[&status_no_content()]);
//! assert!(t.messages().is_empty());
//!
//! get(&mut t, &handler, "/", &[&status_created()]);
//! assert_eq!(t.messages(), ["received incorrect status code:\twant: 201\tgot: 200"]);
//! ```

pub mod adapters;
pub mod assertion;
pub mod dispatch;
pub mod error;
pub mod logging;
pub mod ports;
pub mod recorder;

pub use adapters::{CapturingReporter, Report, ReportKind, ServiceHandler, TestHarness};
pub use assertion::{
    Assertion, Header, Resp, Status, header, resp, status, status_accepted, status_created,
    status_internal_server_error, status_no_content, status_not_found, status_not_implemented,
    status_ok, status_partial_content, status_unprocessable_entity,
};
pub use dispatch::{Dispatcher, delete, get, http, patch, post, put};
pub use error::{DispatchError, DispatchResult, Fatal, Outcome, ResponseError};
pub use logging::init_tracing;
pub use ports::{Handler, Reporter};
pub use recorder::ResponseRecorder;

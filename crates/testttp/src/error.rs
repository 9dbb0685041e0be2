//! Error types

use thiserror::Error;

/// Errors raised while preparing a dispatch.
///
/// Inside a dispatch call these never surface as values: they are turned into
/// a fatal report on the test handle. They are returned directly only from
/// configuration entry points such as [`crate::Dispatcher::with_header`].
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The HTTP method string is not a valid token.
    #[error("invalid HTTP method: {0}")]
    InvalidMethod(#[from] http::method::InvalidMethod),

    /// The target path cannot be parsed as a URI.
    #[error("invalid URI: {0}")]
    InvalidUri(#[from] http::uri::InvalidUri),

    /// The target is neither a path, an absolute URI nor `*`.
    #[error("invalid request target: {0}")]
    InvalidTarget(String),

    /// A default header name is invalid.
    #[error("invalid header name: {0}")]
    InvalidHeaderName(#[from] http::header::InvalidHeaderName),

    /// A default header value is invalid.
    #[error("invalid header value: {0}")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

    /// The request builder rejected its inputs.
    #[error("request builder error: {0}")]
    Request(#[from] http::Error),

    /// The runtime driving an async service could not be created.
    #[error("failed to start runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

/// Result type alias for dispatch setup.
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Errors raised while reading a captured response body.
#[derive(Debug, Error)]
pub enum ResponseError {
    /// The body is not valid UTF-8.
    #[error("response body is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// The body could not be decoded as JSON into the requested type.
    #[error("failed to decode JSON body: {0}")]
    Json(#[from] serde_json::Error),
}

/// Control-flow token returned by a fatal report.
///
/// Holding one means the current dispatch must stop running assertions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
#[must_use = "return Err(fatal) to stop the dispatch"]
pub struct Fatal {
    message: String,
}

impl Fatal {
    /// Creates a token carrying the reported message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The message that was reported.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Result of running one assertion.
pub type Outcome = Result<(), Fatal>;

//! Captured response
//!
//! The in-memory response sink handed to the handler under test. After the
//! handler returns, assertions read it through a shared reference.

use std::io;

use bytes::{Bytes, BytesMut};
use http::header::{AsHeaderName, HeaderMap, HeaderValue};
use http::StatusCode;
use serde::de::DeserializeOwned;

use crate::error::ResponseError;

/// Records the status, headers and body written by a handler.
#[derive(Debug, Clone)]
pub struct ResponseRecorder {
    status: StatusCode,
    headers: HeaderMap,
    body: BytesMut,
    wrote_header: bool,
}

impl Default for ResponseRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseRecorder {
    /// Creates an empty recorder with status 200 and no headers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: BytesMut::new(),
            wrote_header: false,
        }
    }

    /// Commits the response status.
    ///
    /// Only the first call takes effect, mirroring a real connection where the
    /// status line is sent once.
    pub fn write_header(&mut self, status: StatusCode) {
        if self.wrote_header {
            tracing::warn!(
                current = self.status.as_u16(),
                ignored = status.as_u16(),
                "superfluous write_header call"
            );
            return;
        }
        self.status = status;
        self.wrote_header = true;
    }

    /// Appends bytes to the body, committing status 200 if none was written.
    pub fn write_body(&mut self, chunk: &[u8]) {
        if !self.wrote_header {
            self.write_header(StatusCode::OK);
        }
        self.body.extend_from_slice(chunk);
    }

    /// Mutable access to the response headers.
    pub const fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Sets a header, replacing any previous values.
    pub fn insert_header<K>(&mut self, name: K, value: HeaderValue)
    where
        K: http::header::IntoHeaderName,
    {
        self.headers.insert(name, value);
    }

    /// The recorded status code.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Whether the handler committed a status explicitly or by writing a body.
    #[must_use]
    pub const fn wrote_header(&self) -> bool {
        self.wrote_header
    }

    /// The recorded headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The first value of a header, if present.
    #[must_use]
    pub fn header<K: AsHeaderName>(&self, name: K) -> Option<&HeaderValue> {
        self.headers.get(name)
    }

    /// The raw body bytes.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// An owned copy of the body.
    #[must_use]
    pub fn body_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(&self.body)
    }

    /// The body as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseError::Utf8`] if the body is not valid UTF-8.
    pub fn text(&self) -> Result<&str, ResponseError> {
        Ok(std::str::from_utf8(&self.body)?)
    }

    /// Decodes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseError::Json`] if the body does not decode into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ResponseError> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

impl io::Write for ResponseRecorder {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_body(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

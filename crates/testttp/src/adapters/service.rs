//! Tower service adapter
//!
//! Lets an `axum::Router`, or any other cloneable tower service, stand in as
//! the handler under test. Each request is driven to completion on a private
//! current-thread runtime, so dispatch stays synchronous.

use std::fmt::Display;

use axum::body::Body;
use axum::response::Response;
use bytes::Bytes;
use http::{Request, StatusCode};
use http_body_util::BodyExt;
use tokio::runtime::{Builder, Runtime};
use tower::{Service, ServiceExt};

use crate::error::DispatchResult;
use crate::ports::Handler;
use crate::recorder::ResponseRecorder;

/// Handler backed by a tower service.
///
/// Must not be used from inside an async runtime: serving blocks the calling
/// thread on its own runtime.
#[derive(Debug)]
pub struct ServiceHandler<S> {
    service: S,
    runtime: Runtime,
}

impl<S> ServiceHandler<S> {
    /// Wraps `service`, creating the runtime that drives it.
    ///
    /// # Errors
    ///
    /// Returns [`crate::DispatchError::Runtime`] if the runtime cannot be built.
    pub fn new(service: S) -> DispatchResult<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        Ok(Self { service, runtime })
    }

    /// The wrapped service.
    #[must_use]
    pub const fn service(&self) -> &S {
        &self.service
    }
}

impl<S> Handler for ServiceHandler<S>
where
    S: Service<Request<Body>, Response = Response> + Clone,
    S::Error: Display,
{
    fn serve(&self, w: &mut ResponseRecorder, req: Request<Bytes>) {
        let service = self.service.clone();
        let result = self.runtime.block_on(async move {
            let response = service
                .oneshot(req.map(Body::from))
                .await
                .map_err(|e| format!("service error: {e}"))?;
            let (parts, body) = response.into_parts();
            let bytes = body
                .collect()
                .await
                .map_err(|e| format!("body error: {e}"))?
                .to_bytes();
            Ok::<_, String>((parts, bytes))
        });

        match result {
            Ok((parts, bytes)) => {
                w.write_header(parts.status);
                w.headers_mut().extend(parts.headers);
                w.write_body(&bytes);
            }
            Err(message) => {
                tracing::error!(%message, "service under test failed");
                w.write_header(StatusCode::INTERNAL_SERVER_ERROR);
                w.write_body(message.as_bytes());
            }
        }
    }
}

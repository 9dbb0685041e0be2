//! Handler port

use bytes::Bytes;
use http::Request;

use crate::recorder::ResponseRecorder;

/// The HTTP request processor under test.
///
/// A handler receives the synthetic request and writes its response into the
/// recorder. It runs to completion before any assertion is evaluated.
pub trait Handler {
    /// Serves one request.
    fn serve(&self, w: &mut ResponseRecorder, req: Request<Bytes>);
}

impl<F> Handler for F
where
    F: Fn(&mut ResponseRecorder, Request<Bytes>),
{
    fn serve(&self, w: &mut ResponseRecorder, req: Request<Bytes>) {
        self(w, req);
    }
}

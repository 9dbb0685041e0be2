//! Request dispatch
//!
//! One dispatch is one synchronous request/response cycle: build the request,
//! run the handler once, then run the assertions in the order given against
//! the single captured response. A fatal report ends the loop.

use std::panic::Location;

use bytes::Bytes;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::{Method, Request, Uri};

use crate::assertion::Assertion;
use crate::error::{DispatchError, DispatchResult};
use crate::ports::{Handler, Reporter};
use crate::recorder::ResponseRecorder;

/// A handler together with request defaults applied to every dispatch.
#[derive(Debug, Clone)]
pub struct Dispatcher<H> {
    handler: H,
    headers: HeaderMap,
}

impl<H> Dispatcher<H> {
    /// Creates a dispatcher with no default headers.
    #[must_use]
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            headers: HeaderMap::new(),
        }
    }

    /// Adds a header sent with every request.
    ///
    /// # Errors
    ///
    /// Returns an error if the name or value is not a valid header.
    pub fn with_header(mut self, name: &str, value: &str) -> DispatchResult<Self> {
        let name = HeaderName::from_bytes(name.as_bytes())?;
        let value = HeaderValue::from_str(value)?;
        self.headers.append(name, value);
        Ok(self)
    }

    /// The handler under test.
    #[must_use]
    pub const fn handler(&self) -> &H {
        &self.handler
    }

    /// The default request headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

impl<H: Handler> Dispatcher<H> {
    /// Dispatches a GET request.
    #[track_caller]
    pub fn get(&self, t: &mut dyn Reporter, path: &str, assertions: &[&dyn Assertion]) {
        run(t, &self.handler, &self.headers, "GET", path, None, assertions);
    }

    /// Dispatches a POST request.
    #[track_caller]
    pub fn post(
        &self,
        t: &mut dyn Reporter,
        path: &str,
        body: impl Into<Bytes>,
        assertions: &[&dyn Assertion],
    ) {
        let body = Some(body.into());
        run(t, &self.handler, &self.headers, "POST", path, body, assertions);
    }

    /// Dispatches a PUT request.
    #[track_caller]
    pub fn put(
        &self,
        t: &mut dyn Reporter,
        path: &str,
        body: impl Into<Bytes>,
        assertions: &[&dyn Assertion],
    ) {
        let body = Some(body.into());
        run(t, &self.handler, &self.headers, "PUT", path, body, assertions);
    }

    /// Dispatches a PATCH request.
    #[track_caller]
    pub fn patch(
        &self,
        t: &mut dyn Reporter,
        path: &str,
        body: impl Into<Bytes>,
        assertions: &[&dyn Assertion],
    ) {
        let body = Some(body.into());
        run(t, &self.handler, &self.headers, "PATCH", path, body, assertions);
    }

    /// Dispatches a DELETE request.
    #[track_caller]
    pub fn delete(&self, t: &mut dyn Reporter, path: &str, assertions: &[&dyn Assertion]) {
        run(t, &self.handler, &self.headers, "DELETE", path, None, assertions);
    }

    /// Dispatches a request with an arbitrary method.
    #[track_caller]
    pub fn http(
        &self,
        t: &mut dyn Reporter,
        method: &str,
        path: &str,
        body: Option<Bytes>,
        assertions: &[&dyn Assertion],
    ) {
        run(t, &self.handler, &self.headers, method, path, body, assertions);
    }
}

/// Tests that `handler` handles a GET request to `path`.
#[track_caller]
pub fn get<H: Handler + ?Sized>(
    t: &mut dyn Reporter,
    handler: &H,
    path: &str,
    assertions: &[&dyn Assertion],
) {
    run(t, handler, &HeaderMap::new(), "GET", path, None, assertions);
}

/// Tests that `handler` handles a POST request to `path`.
#[track_caller]
pub fn post<H: Handler + ?Sized>(
    t: &mut dyn Reporter,
    handler: &H,
    path: &str,
    body: impl Into<Bytes>,
    assertions: &[&dyn Assertion],
) {
    let body = Some(body.into());
    run(t, handler, &HeaderMap::new(), "POST", path, body, assertions);
}

/// Tests that `handler` handles a PUT request to `path`.
#[track_caller]
pub fn put<H: Handler + ?Sized>(
    t: &mut dyn Reporter,
    handler: &H,
    path: &str,
    body: impl Into<Bytes>,
    assertions: &[&dyn Assertion],
) {
    let body = Some(body.into());
    run(t, handler, &HeaderMap::new(), "PUT", path, body, assertions);
}

/// Tests that `handler` handles a PATCH request to `path`.
#[track_caller]
pub fn patch<H: Handler + ?Sized>(
    t: &mut dyn Reporter,
    handler: &H,
    path: &str,
    body: impl Into<Bytes>,
    assertions: &[&dyn Assertion],
) {
    let body = Some(body.into());
    run(t, handler, &HeaderMap::new(), "PATCH", path, body, assertions);
}

/// Tests that `handler` handles a DELETE request to `path`.
#[track_caller]
pub fn delete<H: Handler + ?Sized>(
    t: &mut dyn Reporter,
    handler: &H,
    path: &str,
    assertions: &[&dyn Assertion],
) {
    run(t, handler, &HeaderMap::new(), "DELETE", path, None, assertions);
}

/// Tests that `handler` handles whatever request is described.
///
/// A method or path that cannot form a request is reported fatally and the
/// handler is never called.
#[track_caller]
pub fn http<H: Handler + ?Sized>(
    t: &mut dyn Reporter,
    handler: &H,
    method: &str,
    path: &str,
    body: Option<Bytes>,
    assertions: &[&dyn Assertion],
) {
    run(t, handler, &HeaderMap::new(), method, path, body, assertions);
}

fn build_request(
    method: &str,
    path: &str,
    body: Option<Bytes>,
    defaults: &HeaderMap,
) -> DispatchResult<Request<Bytes>> {
    let method = Method::from_bytes(method.as_bytes())?;
    let uri: Uri = path.parse()?;
    check_target(&uri, path)?;
    let mut req = Request::builder()
        .method(method)
        .uri(uri)
        .body(body.unwrap_or_default())?;
    req.headers_mut().extend(defaults.clone());
    Ok(req)
}

/// Accepts origin-form (`/path`), absolute-form (`scheme://...`) or `*`.
fn check_target(uri: &Uri, target: &str) -> DispatchResult<()> {
    let origin_form = uri.authority().is_none() && uri.path().starts_with('/');
    if origin_form || uri.scheme().is_some() || target == "*" {
        Ok(())
    } else {
        Err(DispatchError::InvalidTarget(target.to_string()))
    }
}

#[track_caller]
fn run<H: Handler + ?Sized>(
    t: &mut dyn Reporter,
    handler: &H,
    defaults: &HeaderMap,
    method: &str,
    path: &str,
    body: Option<Bytes>,
    assertions: &[&dyn Assertion],
) {
    let caller = Location::caller();
    let req = match build_request(method, path, body, defaults) {
        Ok(req) => req,
        Err(err) => {
            let _ = t.fatal(format!("failed to build request: {err}"));
            return;
        }
    };

    tracing::debug!(%caller, method, path, "dispatching request");
    let mut w = ResponseRecorder::new();
    handler.serve(&mut w, req);
    tracing::debug!(%caller, status = w.status().as_u16(), "handler returned");

    for (index, assertion) in assertions.iter().enumerate() {
        tracing::trace!(index, "running assertion");
        if let Err(fatal) = assertion.check(t, &w) {
            tracing::debug!(
                %caller,
                index,
                skipped = assertions.len() - index - 1,
                %fatal,
                "assertion aborted dispatch"
            );
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use ::http::StatusCode;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::adapters::{CapturingReporter, ReportKind};
    use crate::assertion::{resp, status, status_created, status_ok};

    fn echo_method(w: &mut ResponseRecorder, req: Request<Bytes>) {
        w.write_body(req.method().as_str().as_bytes());
    }

    #[test]
    fn test_handler_sees_method_and_path_once() {
        let calls = RefCell::new(Vec::new());
        let handler = |w: &mut ResponseRecorder, req: Request<Bytes>| {
            calls
                .borrow_mut()
                .push((req.method().clone(), req.uri().path().to_string()));
            w.write_header(StatusCode::OK);
        };

        let mut t = CapturingReporter::new();
        get(&mut t, &handler, "/a", &[]);
        post(&mut t, &handler, "/b", "x", &[]);
        put(&mut t, &handler, "/c", "x", &[]);
        patch(&mut t, &handler, "/d", "x", &[]);
        delete(&mut t, &handler, "/e", &[]);
        http(&mut t, &handler, "OPTIONS", "/f", None, &[]);

        assert!(!t.failed());
        assert_eq!(
            calls.into_inner(),
            vec![
                (Method::GET, "/a".to_string()),
                (Method::POST, "/b".to_string()),
                (Method::PUT, "/c".to_string()),
                (Method::PATCH, "/d".to_string()),
                (Method::DELETE, "/e".to_string()),
                (Method::OPTIONS, "/f".to_string()),
            ]
        );
    }

    #[test]
    fn test_body_reaches_handler() {
        let seen = RefCell::new(Bytes::new());
        let handler = |_w: &mut ResponseRecorder, req: Request<Bytes>| {
            *seen.borrow_mut() = req.into_body();
        };

        let mut t = CapturingReporter::new();
        post(&mut t, &handler, "/", r#"{"id":1}"#, &[]);
        assert_eq!(seen.borrow().as_ref(), br#"{"id":1}"#);

        get(&mut t, &handler, "/", &[]);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_assertions_run_in_order_on_same_response() {
        let seen = RefCell::new(Vec::new());
        let record = |tag: &'static str| {
            let seen = &seen;
            resp(move |_t, w| {
                seen.borrow_mut().push((tag, std::ptr::from_ref(w) as usize));
                Ok(())
            })
        };
        let (first, second, third) = (record("first"), record("second"), record("third"));

        let mut t = CapturingReporter::new();
        get(&mut t, &echo_method, "/", &[&first, &second, &third]);

        let seen = seen.into_inner();
        let tags: Vec<_> = seen.iter().map(|(tag, _)| *tag).collect();
        assert_eq!(tags, vec!["first", "second", "third"]);
        assert!(seen.iter().all(|(_, addr)| *addr == seen[0].1));
    }

    #[test]
    fn test_fatal_stops_remaining_assertions() {
        let ran = Cell::new(false);
        let later = resp(|_t, _w| {
            ran.set(true);
            Ok(())
        });

        let mut t = CapturingReporter::new();
        get(&mut t, &echo_method, "/", &[&status_created(), &later]);

        assert!(!ran.get());
        assert!(t.aborted());
        assert_eq!(t.reports().len(), 1);
    }

    #[test]
    fn test_returned_fatal_from_custom_check_stops_dispatch() {
        let ran = Cell::new(false);
        let abort = resp(|t, _w| Err(t.fatal("body unreadable".to_string())));
        let later = resp(|_t, _w| {
            ran.set(true);
            Ok(())
        });

        let mut t = CapturingReporter::new();
        get(&mut t, &echo_method, "/", &[&abort, &later, &status_ok()]);

        assert!(!ran.get());
        assert_eq!(t.messages(), vec!["body unreadable"]);
    }

    #[test]
    fn test_continue_reports_keep_going() {
        let soft = resp(|t, _w| {
            t.error("soft failure".to_string());
            Ok(())
        });

        let mut t = CapturingReporter::new();
        get(&mut t, &echo_method, "/", &[&soft, &soft, &status_ok()]);

        assert!(!t.aborted());
        assert_eq!(t.messages(), vec!["soft failure", "soft failure"]);
    }

    #[test]
    fn test_invalid_method_is_fatal_and_skips_handler() {
        let called = Cell::new(false);
        let handler = |_w: &mut ResponseRecorder, _req: Request<Bytes>| called.set(true);

        let mut t = CapturingReporter::new();
        http(&mut t, &handler, "BAD METHOD", "/", None, &[&status(200)]);

        assert!(!called.get());
        assert_eq!(t.reports().len(), 1);
        assert_eq!(t.reports()[0].kind, ReportKind::Fatal);
        assert!(t.messages()[0].starts_with("failed to build request: invalid HTTP method"));
    }

    #[test]
    fn test_invalid_path_is_fatal() {
        let mut t = CapturingReporter::new();
        get(&mut t, &echo_method, "/has space", &[]);

        assert!(t.aborted());
        assert!(t.messages()[0].starts_with("failed to build request: invalid URI"));
    }

    #[test]
    fn test_relative_target_is_fatal_and_skips_handler() {
        let called = Cell::new(false);
        let handler = |_w: &mut ResponseRecorder, _req: Request<Bytes>| called.set(true);

        for target in ["foo", "example.com"] {
            let mut t = CapturingReporter::new();
            http(&mut t, &handler, "GET", target, None, &[&status(418)]);

            assert_eq!(t.reports().len(), 1);
            assert_eq!(t.reports()[0].kind, ReportKind::Fatal);
            assert_eq!(
                t.messages()[0],
                format!("failed to build request: invalid request target: {target}")
            );
        }
        assert!(!called.get());
    }

    #[test]
    fn test_absolute_and_asterisk_targets_are_accepted() {
        let seen = RefCell::new(Vec::new());
        let handler = |_w: &mut ResponseRecorder, req: Request<Bytes>| {
            seen.borrow_mut().push(req.uri().to_string());
        };

        let mut t = CapturingReporter::new();
        get(&mut t, &handler, "http://example.com/items?page=2", &[]);
        http(&mut t, &handler, "OPTIONS", "*", None, &[]);

        assert!(!t.failed());
        assert_eq!(
            seen.into_inner(),
            vec!["http://example.com/items?page=2".to_string(), "*".to_string()]
        );
    }

    #[test]
    fn test_dispatcher_applies_default_headers() {
        let handler = |w: &mut ResponseRecorder, req: Request<Bytes>| {
            if let Some(token) = req.headers().get("authorization") {
                w.insert_header("x-echo", token.clone());
            }
        };
        let dispatcher = Dispatcher::new(handler)
            .with_header("Authorization", "Bearer abc")
            .unwrap();
        assert_eq!(dispatcher.headers().len(), 1);

        let echoed = resp(|t, w| {
            if w.header("x-echo").is_none_or(|v| v != "Bearer abc") {
                t.error("default header not sent".to_string());
            }
            Ok(())
        });

        let mut t = CapturingReporter::new();
        dispatcher.get(&mut t, "/", &[&status_ok(), &echoed]);
        dispatcher.delete(&mut t, "/", &[&echoed]);
        dispatcher.http(&mut t, "HEAD", "/", None, &[&echoed]);
        assert!(!t.failed(), "{:?}", t.messages());
    }

    #[test]
    fn test_dispatcher_keeps_handler() {
        let dispatcher = Dispatcher::new(echo_method);
        let mut w = ResponseRecorder::new();
        dispatcher
            .handler()
            .serve(&mut w, Request::delete("/").body(Bytes::new()).unwrap());
        assert_eq!(w.text().unwrap(), "DELETE");
        assert!(dispatcher.headers().is_empty());
    }

    #[test]
    fn test_dispatcher_rejects_invalid_headers() {
        let dispatcher = Dispatcher::new(echo_method);
        assert!(dispatcher.clone().with_header("bad name", "v").is_err());
        assert!(dispatcher.with_header("x-ok", "bad\nvalue").is_err());
    }
}

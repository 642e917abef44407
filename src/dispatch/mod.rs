//! One-shot dispatch of prepared requests.
//!
//! [`resolve`] turns a [`RouteMatch`] into exactly one [`Outcome`]: 404 for
//! an unmatched path, 501 when no controller or method handler is bound, and
//! otherwise whatever the handler reports. Handler errors and panics are
//! contained and surfaced through the outcome's error slot — the dispatcher
//! itself never fails, whatever the input looked like.
//!
//! [`dispatch`] is the fire-and-complete-once form: resolution runs on a
//! spawned task and the outcome is sent over a oneshot channel, so the
//! caller is never blocked past issuing the call. Concurrent dispatches are
//! independent; each consumes its own `RouteMatch`.

use bytes::Bytes;
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::controller::HandlerError;
use crate::http::{Headers, Status};
use crate::router::RouteMatch;

/// A failure produced while running a handler.
///
/// Carried in [`Outcome::error`]; never raised past the dispatch boundary.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The handler returned an error.
    #[error("handler failed: {0}")]
    Handler(#[source] HandlerError),

    /// The handler panicked; the panic was contained by the dispatcher.
    #[error("handler panicked")]
    Panicked,
}

/// The single completion shape for every dispatch:
/// `(error, status, headers, payload)`.
///
/// There is no secondary error channel — soft decode failures, routing
/// misses, unimplemented methods, and handler failures all flow through
/// this one shape.
#[derive(Debug)]
pub struct Outcome {
    /// Set only when the handler itself failed or panicked.
    pub error: Option<DispatchError>,
    pub status: Status,
    pub headers: Headers,
    pub payload: Option<Bytes>,
}

impl Outcome {
    // A bare status outcome: no error, no headers, no payload.
    fn bare(status: Status) -> Self {
        Self {
            error: None,
            status,
            headers: Headers::new(),
            payload: None,
        }
    }

    fn failed(error: DispatchError) -> Self {
        Self {
            error: Some(error),
            status: Status::INTERNAL_SERVER_ERROR,
            headers: Headers::new(),
            payload: None,
        }
    }

    /// Returns `true` if the error slot is populated.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Resolves a prepared request to its [`Outcome`].
///
/// - No route matched: `404 Not Found`.
/// - Matched route with no controller attached, or a controller that does
///   not implement the method: `501 Not Implemented` (the controller
///   defaults produce this).
/// - Otherwise the handler's `(status, headers, payload)` is forwarded; a
///   handler error or panic yields status 500 with the error slot set.
pub async fn resolve(route_match: RouteMatch) -> Outcome {
    let (context, matched) = route_match.into_parts();

    let Some(matched) = matched else {
        debug!(path = context.path(), "no route matched");
        return Outcome::bare(Status::NOT_FOUND);
    };

    let Some(controller) = matched.controller else {
        debug!(route = matched.index, "no controller attached");
        return Outcome::bare(Status::NOT_IMPLEMENTED);
    };

    let method = context.method().clone();
    debug!(route = matched.index, method = %method, "dispatching");

    // The handler runs in its own task so a panic is contained here instead
    // of unwinding through the dispatcher.
    match tokio::spawn(controller.call(&method, context)).await {
        Ok(Ok(reply)) => {
            let (status, headers, payload) = reply.into_parts();
            Outcome {
                error: None,
                status,
                headers,
                payload,
            }
        }
        Ok(Err(error)) => {
            warn!(route = matched.index, error = %error, "handler failed");
            Outcome::failed(DispatchError::Handler(error))
        }
        Err(_) => {
            warn!(route = matched.index, "handler panicked");
            Outcome::failed(DispatchError::Panicked)
        }
    }
}

/// Dispatches a prepared request, completing exactly once on `completion`.
///
/// Resolution runs on a spawned task, so this returns as soon as the work is
/// issued. If the receiver was dropped the outcome is discarded. Must be
/// called within a tokio runtime.
pub fn dispatch(route_match: RouteMatch, completion: oneshot::Sender<Outcome>) {
    tokio::spawn(async move {
        let outcome = resolve(route_match).await;
        let _ = completion.send(outcome);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::controller::{Controller, HandlerFuture, Reply};
    use crate::http::Method;
    use crate::router::Router;

    struct Bare;
    impl Controller for Bare {}

    struct Greets;
    impl Controller for Greets {
        fn get(&self, ctx: Context) -> HandlerFuture {
            Box::pin(async move {
                let id = ctx.params().get("id").unwrap_or("nobody").to_owned();
                Ok(Reply::new(Status::OK)
                    .header("Content-Type", "text/plain")
                    .payload(format!("hello {id}")))
            })
        }
    }

    struct Fails;
    impl Controller for Fails {
        fn get(&self, _ctx: Context) -> HandlerFuture {
            Box::pin(async { Err("database unreachable".into()) })
        }
    }

    struct Panics;
    impl Controller for Panics {
        fn get(&self, _ctx: Context) -> HandlerFuture {
            Box::pin(async { panic!("handler exploded") })
        }
    }

    fn router_with(controller: impl Controller + 'static) -> Router {
        let mut router = Router::new();
        router.route("/abc/{id}").unwrap().attach(controller);
        router
    }

    async fn dispatched(router: &Router, raw_path: &str, client: Option<&str>) -> Outcome {
        let client = client.map(|c| c.parse().unwrap());
        let prepared = router.prepare(client, raw_path, Method::Get, Headers::new(), "");
        let (tx, rx) = oneshot::channel();
        router.dispatch(prepared, tx);
        rx.await.expect("dispatch completes exactly once")
    }

    #[tokio::test]
    async fn bare_controller_completes_with_501() {
        let router = router_with(Bare);
        let outcome = dispatched(&router, "/abc/123", Some("::1")).await;
        assert!(outcome.error.is_none());
        assert_eq!(outcome.status, Status::NOT_IMPLEMENTED);
        assert!(outcome.headers.is_empty());
        assert!(outcome.payload.is_none());
    }

    #[tokio::test]
    async fn missing_client_address_still_501() {
        let router = router_with(Bare);
        let outcome = dispatched(&router, "/abc/123", None).await;
        assert!(outcome.error.is_none());
        assert_eq!(outcome.status, Status::NOT_IMPLEMENTED);
    }

    #[tokio::test]
    async fn no_controller_attached_is_501() {
        let mut router = Router::new();
        router.route("/abc/{id}").unwrap();
        let outcome = dispatched(&router, "/abc/123", None).await;
        assert!(outcome.error.is_none());
        assert_eq!(outcome.status, Status::NOT_IMPLEMENTED);
    }

    #[tokio::test]
    async fn unmatched_path_is_404() {
        let router = router_with(Greets);
        let outcome = dispatched(&router, "/nothing", None).await;
        assert!(outcome.error.is_none());
        assert_eq!(outcome.status, Status::NOT_FOUND);
        assert!(outcome.headers.is_empty());
        assert!(outcome.payload.is_none());
    }

    #[tokio::test]
    async fn handler_reply_is_forwarded() {
        let router = router_with(Greets);
        let outcome = dispatched(&router, "/abc/ada", None).await;
        assert!(outcome.error.is_none());
        assert_eq!(outcome.status, Status::OK);
        assert_eq!(outcome.headers.get("content-type"), Some("text/plain"));
        assert_eq!(outcome.payload.unwrap().as_ref(), b"hello ada");
    }

    #[tokio::test]
    async fn handler_error_fills_error_slot() {
        let router = router_with(Fails);
        let outcome = dispatched(&router, "/abc/1", None).await;
        assert!(outcome.is_error());
        assert!(matches!(outcome.error, Some(DispatchError::Handler(_))));
        assert_eq!(outcome.status, Status::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn handler_panic_is_contained() {
        let router = router_with(Panics);
        let outcome = dispatched(&router, "/abc/1", None).await;
        assert!(matches!(outcome.error, Some(DispatchError::Panicked)));
        assert_eq!(outcome.status, Status::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn resolve_without_channel() {
        let router = router_with(Greets);
        let prepared = router.prepare(None, "/abc/42", Method::Get, Headers::new(), "");
        let outcome = resolve(prepared).await;
        assert_eq!(outcome.status, Status::OK);
    }

    #[tokio::test]
    async fn concurrent_dispatches_are_independent() {
        let router = router_with(Greets);
        let (tx_a, rx_a) = oneshot::channel();
        let (tx_b, rx_b) = oneshot::channel();
        router.dispatch(
            router.prepare(None, "/abc/a", Method::Get, Headers::new(), ""),
            tx_a,
        );
        router.dispatch(
            router.prepare(None, "/abc/b", Method::Get, Headers::new(), ""),
            tx_b,
        );
        let (a, b) = (rx_a.await.unwrap(), rx_b.await.unwrap());
        assert_eq!(a.payload.unwrap().as_ref(), b"hello a");
        assert_eq!(b.payload.unwrap().as_ref(), b"hello b");
    }
}

//! The handler capability contract.
//!
//! A [`Controller`] exposes one entry point per supported HTTP method. Every
//! entry point has a default body answering `501 Not Implemented`, so an
//! empty `impl Controller for T {}` satisfies the contract and resolves
//! every method to 501; concrete controllers override only the methods they
//! support. The dispatcher reaches handlers through
//! [`Controller::call`], which routes by method name.

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;

use crate::context::Context;
use crate::http::{Headers, Method, Status};

/// The error type controllers surface; boxed so handlers can use `?` on
/// anything.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Type-erased, heap-allocated future returned by controller entry points.
///
/// Entry points box their futures so the trait stays dyn-compatible and
/// controllers can be stored behind `Arc<dyn Controller>`.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<Reply, HandlerError>> + Send>>;

/// What a handler reports back: a status, headers, and an optional payload.
///
/// # Examples
///
/// ```
/// use strada::controller::Reply;
/// use strada::http::Status;
///
/// let reply = Reply::new(Status::OK)
///     .header("Content-Type", "application/json")
///     .payload(r#"{"ok":true}"#);
/// assert_eq!(reply.status(), Status::OK);
/// ```
#[derive(Debug, Clone)]
pub struct Reply {
    status: Status,
    headers: Headers,
    payload: Option<Bytes>,
}

impl Reply {
    /// Creates a reply with the given status, no headers, and no payload.
    pub fn new(status: Status) -> Self {
        Self {
            status,
            headers: Headers::new(),
            payload: None,
        }
    }

    /// Appends a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sets the payload.
    #[must_use]
    pub fn payload(mut self, payload: impl Into<Bytes>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Returns the status.
    pub fn status(&self) -> Status {
        self.status
    }

    /// Returns the headers.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Returns the payload, if one was set.
    pub fn payload_bytes(&self) -> Option<&Bytes> {
        self.payload.as_ref()
    }

    /// Decomposes the reply into its `(status, headers, payload)` parts.
    pub fn into_parts(self) -> (Status, Headers, Option<Bytes>) {
        (self.status, self.headers, self.payload)
    }
}

// The shared default for every unimplemented entry point.
fn not_implemented() -> HandlerFuture {
    Box::pin(async { Ok(Reply::new(Status::NOT_IMPLEMENTED)) })
}

/// A pluggable set of per-method request handlers.
///
/// # Examples
///
/// ```
/// use strada::context::Context;
/// use strada::controller::{Controller, HandlerFuture, Reply};
/// use strada::http::Status;
///
/// struct Echo;
///
/// impl Controller for Echo {
///     fn get(&self, ctx: Context) -> HandlerFuture {
///         Box::pin(async move {
///             let id = ctx.params().get("id").unwrap_or("?").to_owned();
///             Ok(Reply::new(Status::OK).payload(id))
///         })
///     }
/// }
/// ```
pub trait Controller: Send + Sync {
    /// Handles `GET` requests.
    fn get(&self, ctx: Context) -> HandlerFuture {
        let _ = ctx;
        not_implemented()
    }

    /// Handles `POST` requests.
    fn post(&self, ctx: Context) -> HandlerFuture {
        let _ = ctx;
        not_implemented()
    }

    /// Handles `PUT` requests.
    fn put(&self, ctx: Context) -> HandlerFuture {
        let _ = ctx;
        not_implemented()
    }

    /// Handles `DELETE` requests.
    fn delete(&self, ctx: Context) -> HandlerFuture {
        let _ = ctx;
        not_implemented()
    }

    /// Handles `HEAD` requests.
    fn head(&self, ctx: Context) -> HandlerFuture {
        let _ = ctx;
        not_implemented()
    }

    /// Handles `OPTIONS` requests.
    fn options(&self, ctx: Context) -> HandlerFuture {
        let _ = ctx;
        not_implemented()
    }

    /// Handles `PATCH` requests.
    fn patch(&self, ctx: Context) -> HandlerFuture {
        let _ = ctx;
        not_implemented()
    }

    /// Routes to the entry point for `method`.
    ///
    /// Custom methods resolve to 501 like any unimplemented entry point.
    fn call(&self, method: &Method, ctx: Context) -> HandlerFuture {
        match method {
            Method::Get => self.get(ctx),
            Method::Post => self.post(ctx),
            Method::Put => self.put(ctx),
            Method::Delete => self.delete(ctx),
            Method::Head => self.head(ctx),
            Method::Options => self.options(ctx),
            Method::Patch => self.patch(ctx),
            Method::Custom(_) => not_implemented(),
        }
    }
}

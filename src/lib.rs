//! # strada
//!
//! An async request-routing core: path patterns, content-type-driven body
//! decoding, and one-shot dispatch to pluggable controllers.
//!
//! strada sits between a transport layer and application controllers. The
//! transport hands it already-separated request fields (client address, raw
//! path, method, headers, raw body); strada resolves the route, decodes the
//! query string and body, and dispatches to the matched controller,
//! completing exactly once with an `(error, status, headers, payload)`
//! outcome the caller serializes. It never performs socket I/O.
//!
//! ## Quick Start
//!
//! ```rust
//! use strada::context::Context;
//! use strada::controller::{Controller, HandlerFuture, Reply};
//! use strada::http::{Headers, Method, Status};
//! use strada::router::Router;
//! use tokio::sync::oneshot;
//!
//! struct Users;
//!
//! impl Controller for Users {
//!     fn get(&self, ctx: Context) -> HandlerFuture {
//!         Box::pin(async move {
//!             let id = ctx.params().get("id").unwrap_or("unknown").to_owned();
//!             Ok(Reply::new(Status::OK).payload(id))
//!         })
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut router = Router::new();
//!     router.route("/users/{id}").unwrap().attach(Users);
//!
//!     let prepared = router.prepare(None, "/users/42?verbose=1", Method::Get, Headers::new(), "");
//!     let (tx, rx) = oneshot::channel();
//!     router.dispatch(prepared, tx);
//!
//!     let outcome = rx.await.unwrap();
//!     assert_eq!(outcome.status, Status::OK);
//! }
//! ```
//!
//! ## Matching model
//!
//! Patterns mix literal segments and `{name}` parameters. Trailing parameter
//! segments are optional, so `/abc/{id}` answers both `/abc` and `/abc/123`.
//! Routes match in registration order; first registered wins. Body decoding
//! never fails — malformed input of any content type degrades to an empty
//! parameter map rather than aborting routing.

pub mod body;
pub mod context;
pub mod controller;
pub mod dispatch;
pub mod http;
pub mod pattern;
pub mod query;
pub mod router;

// ── Convenience re-exports ────────────────────────────────────────────────────
pub use context::{Context, Params};
pub use controller::{Controller, HandlerError, HandlerFuture, Reply};
pub use dispatch::{DispatchError, Outcome};
pub use http::{Headers, Method, Status};
pub use pattern::{PathPattern, PatternError};
pub use router::{Route, RouteMatch, Router};

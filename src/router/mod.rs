//! Route registration, lookup, and request preparation.
//!
//! [`Router`] is an ordered, append-only table of [`Route`]s. Registration
//! happens once at setup (`route` compiles a pattern, [`Route::attach`] binds
//! a controller); the table is read-only while serving, so concurrent
//! lookups need no locking.
//!
//! Routes are matched in registration order; the first route whose pattern
//! matches the incoming path wins. [`Router::prepare`] resolves one raw
//! request into an immutable [`RouteMatch`] — path normalization, route
//! lookup, query decoding, and body decoding in a single pass — which
//! [`Router::dispatch`] then hands to the dispatcher.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::oneshot;
use tracing::debug;

use crate::body;
use crate::context::{Context, Params};
use crate::controller::Controller;
use crate::dispatch::{self, Outcome};
use crate::http::{Headers, Method};
use crate::pattern::{PathPattern, PatternError, normalize};
use crate::query::{self, QuerySource};

/// A registered route: a compiled pattern, its registration index, and an
/// optionally attached controller.
///
/// A route with no controller resolves every method to `501 Not Implemented`.
pub struct Route {
    pattern: PathPattern,
    index: usize,
    controller: Option<Arc<dyn Controller>>,
}

impl Route {
    /// Attaches a controller to this route.
    ///
    /// Requests matched to the route dispatch through the controller's
    /// per-method entry points.
    pub fn attach(&mut self, controller: impl Controller + 'static) -> &mut Self {
        self.controller = Some(Arc::new(controller));
        self
    }

    /// Returns the registration index (position in the table).
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the compiled pattern.
    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    /// Returns `true` if a controller has been attached.
    pub fn has_controller(&self) -> bool {
        self.controller.is_some()
    }
}

// The route side of a successful match, cloned into the RouteMatch so
// dispatch owns everything it needs.
pub(crate) struct MatchedRoute {
    pub(crate) index: usize,
    pub(crate) controller: Option<Arc<dyn Controller>>,
}

/// The immutable, per-request result of resolving path, query, and body
/// against the route table.
///
/// Owned solely by the request that produced it; dispatch consumes it.
pub struct RouteMatch {
    context: Context,
    matched: Option<MatchedRoute>,
}

impl RouteMatch {
    /// Returns `true` if a route matched.
    pub fn is_match(&self) -> bool {
        self.matched.is_some()
    }

    /// Returns the matched route's registration index, if any.
    pub fn route_index(&self) -> Option<usize> {
        self.matched.as_ref().map(|m| m.index)
    }

    /// Returns the prepared request context.
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Returns the positional capture at `index`, if bound.
    pub fn capture(&self, index: usize) -> Option<&str> {
        self.context.capture(index)
    }

    /// Returns the named parameter bound by the matched pattern, if any.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.context.params().get(name)
    }

    pub(crate) fn into_parts(self) -> (Context, Option<MatchedRoute>) {
        (self.context, self.matched)
    }
}

/// An ordered, append-only request router.
///
/// # Examples
///
/// ```
/// use strada::router::Router;
///
/// let mut router = Router::new();
/// router.route("/abc/{id}").unwrap();
///
/// let found = router.find("/abc/123?a=1").unwrap();
/// assert_eq!(found.index(), 0);
/// ```
#[derive(Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Creates an empty router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers and compiles a new route, returning it for controller
    /// attachment.
    ///
    /// # Errors
    ///
    /// [`PatternError::DuplicateParam`] when the pattern repeats a parameter
    /// name.
    pub fn route(&mut self, pattern: &str) -> Result<&mut Route, PatternError> {
        let pattern = PathPattern::compile(pattern)?;
        let index = self.routes.len();
        self.routes.push(Route {
            pattern,
            index,
            controller: None,
        });
        Ok(&mut self.routes[index])
    }

    /// Returns the number of registered routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if no routes have been registered.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Normalizes a raw path: the query component and one trailing slash are
    /// stripped.
    pub fn parse_path<'a>(&self, raw: &'a str) -> &'a str {
        normalize(raw)
    }

    /// Decodes a query source into a flat string map.
    pub fn parse_query_parameters<'a>(
        &self,
        source: impl Into<QuerySource<'a>>,
    ) -> HashMap<String, String> {
        query::parse_query_parameters(source)
    }

    /// Decodes a request body into a flat string map, driven by the
    /// `content-type` header.
    pub fn parse_body(
        &self,
        raw: impl AsRef<[u8]>,
        headers: &Headers,
    ) -> HashMap<String, String> {
        body::parse_body(raw, headers)
    }

    /// Finds the first registered route matching `raw_path`.
    ///
    /// The path is normalized first, so trailing slashes and query suffixes
    /// never prevent a match.
    pub fn find(&self, raw_path: &str) -> Option<&Route> {
        let path = normalize(raw_path);
        self.routes
            .iter()
            .find(|route| route.pattern.matches(path).is_some())
    }

    /// Resolves one raw request into an immutable [`RouteMatch`].
    ///
    /// Normalizes the path, decodes the query component and body, resolves
    /// the route, and merges the pattern's positional and named bindings.
    /// Never fails: an unmatched path yields a `RouteMatch` in the explicit
    /// no-match state, and undecodable query/body input yields empty maps.
    pub fn prepare(
        &self,
        client_addr: Option<IpAddr>,
        raw_path: &str,
        method: Method,
        headers: Headers,
        raw_body: impl Into<Bytes>,
    ) -> RouteMatch {
        let path = normalize(raw_path);

        let query_fragment = match raw_path.find('?') {
            Some(pos) => &raw_path[pos + 1..],
            None => "",
        };
        let query = query::parse_query_parameters(query_fragment);

        let raw_body = raw_body.into();
        let body = body::parse_body(&raw_body, &headers);

        let mut captures = Vec::new();
        let mut params = Params::new();
        let mut matched = None;
        for route in &self.routes {
            if let Some(bound) = route.pattern.matches(path) {
                for (name, value) in route.pattern.param_names().zip(&bound) {
                    if let Some(value) = value {
                        params.insert(name.to_owned(), value.clone());
                    }
                }
                matched = Some(MatchedRoute {
                    index: route.index,
                    controller: route.controller.clone(),
                });
                captures = bound;
                break;
            }
        }

        debug!(
            path,
            matched = matched.as_ref().map(|m| m.index),
            "prepared request"
        );

        let context = Context::new(
            client_addr,
            path.to_owned(),
            method,
            headers,
            query,
            body,
            raw_body,
            params,
            captures,
        );
        RouteMatch { context, matched }
    }

    /// Dispatches a prepared request.
    ///
    /// Exactly one [`Outcome`] is sent on `completion`, from a spawned task;
    /// the caller is never blocked past issuing the call. Must be called
    /// within a tokio runtime.
    pub fn dispatch(&self, route_match: RouteMatch, completion: oneshot::Sender<Outcome>) {
        dispatch::dispatch(route_match, completion);
    }
}

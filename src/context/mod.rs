//! The per-request view handed to controllers.
//!
//! A [`Context`] bundles everything a handler may consult: the client
//! address, normalized path, method, headers, decoded query and body maps,
//! the raw body bytes, and the values bound by the matched route pattern
//! (positionally and by name). It is built once per request by
//! [`Router::prepare`](crate::router::Router::prepare), owned solely by that
//! request, and discarded after dispatch completes.

use std::collections::HashMap;
use std::net::IpAddr;

use bytes::Bytes;
use serde::Serialize;

use crate::http::{Headers, Method};

/// Named path parameters extracted from the matched route.
///
/// # Examples
///
/// ```
/// use strada::context::Params;
///
/// let mut params = Params::new();
/// params.insert("id".to_owned(), "123".to_owned());
/// assert_eq!(params.get("id"), Some("123"));
/// ```
#[derive(Debug, Clone, Default, Serialize)]
pub struct Params {
    map: HashMap<String, String>,
}

impl Params {
    /// Creates an empty parameter map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a parameter value.
    pub fn insert(&mut self, name: String, value: String) {
        self.map.insert(name, value);
    }

    /// Returns the value bound to `name`, if any.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.map.get(name).map(String::as_str)
    }

    /// Returns the number of bound parameters.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if no parameters are bound.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterates over `(name, value)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// The immutable per-request data a controller receives.
pub struct Context {
    client_addr: Option<IpAddr>,
    path: String,
    method: Method,
    headers: Headers,
    query: HashMap<String, String>,
    body: HashMap<String, String>,
    raw_body: Bytes,
    params: Params,
    captures: Vec<Option<String>>,
}

impl Context {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        client_addr: Option<IpAddr>,
        path: String,
        method: Method,
        headers: Headers,
        query: HashMap<String, String>,
        body: HashMap<String, String>,
        raw_body: Bytes,
        params: Params,
        captures: Vec<Option<String>>,
    ) -> Self {
        Self {
            client_addr,
            path,
            method,
            headers,
            query,
            body,
            raw_body,
            params,
            captures,
        }
    }

    /// Returns the client address, when the transport supplied one.
    pub fn client_addr(&self) -> Option<IpAddr> {
        self.client_addr
    }

    /// Returns the normalized request path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the request method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request headers.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Returns the decoded query parameters.
    pub fn query(&self) -> &HashMap<String, String> {
        &self.query
    }

    /// Returns the decoded body parameters.
    pub fn body(&self) -> &HashMap<String, String> {
        &self.body
    }

    /// Returns the raw body bytes, untouched by the body decoder.
    pub fn raw_body(&self) -> &Bytes {
        &self.raw_body
    }

    /// Returns the named path parameters.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Returns the positional capture list, in pattern-parameter order.
    ///
    /// Optional trailing parameters elided by the request path appear as
    /// `None`.
    pub fn captures(&self) -> &[Option<String>] {
        &self.captures
    }

    /// Returns the capture at `index`, if present and bound.
    pub fn capture(&self, index: usize) -> Option<&str> {
        self.captures.get(index)?.as_deref()
    }

    /// Deserializes the raw body as JSON into `T`.
    pub fn json<T>(&self) -> Result<T, serde_json::Error>
    where
        T: serde::de::DeserializeOwned,
    {
        serde_json::from_slice(&self.raw_body)
    }
}

//! Query-string decoding.
//!
//! [`parse_query_parameters`] accepts either a raw query-string fragment or
//! an already key/value-structured source and yields a flat string map. It
//! never fails: pairs that do not survive decoding are skipped.

use std::collections::HashMap;

use percent_encoding::percent_decode_str;

/// A query-parameter source: raw text, or pairs the transport already split.
///
/// Percent-decoding and `&`/`=` splitting apply only to raw text; structured
/// pairs pass through unchanged.
pub enum QuerySource<'a> {
    /// A raw query-string fragment, e.g. `a=1&b=2`.
    Raw(&'a str),
    /// Already-structured key/value pairs.
    Pairs(HashMap<String, String>),
}

impl<'a> From<&'a str> for QuerySource<'a> {
    fn from(raw: &'a str) -> Self {
        QuerySource::Raw(raw)
    }
}

impl From<HashMap<String, String>> for QuerySource<'_> {
    fn from(pairs: HashMap<String, String>) -> Self {
        QuerySource::Pairs(pairs)
    }
}

/// Normalizes a query source to a flat string map.
///
/// # Examples
///
/// ```
/// use strada::query::parse_query_parameters;
///
/// let params = parse_query_parameters("a=1&b=2&c=3");
/// assert_eq!(params.get("a").map(String::as_str), Some("1"));
/// assert_eq!(params.get("c").map(String::as_str), Some("3"));
/// ```
pub fn parse_query_parameters<'a>(source: impl Into<QuerySource<'a>>) -> HashMap<String, String> {
    match source.into() {
        QuerySource::Raw(raw) => parse_form_encoded(raw),
        QuerySource::Pairs(pairs) => pairs,
    }
}

/// Decodes `key=value` pairs joined by `&`.
///
/// `+` decodes to a space; percent escapes decode per RFC 3986. A pair whose
/// key or value does not decode to valid UTF-8 is skipped. A key with no `=`
/// binds the empty string.
pub fn parse_form_encoded(raw: &str) -> HashMap<String, String> {
    raw.split('&')
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| {
            let mut parts = pair.splitn(2, '=');
            let key = decode_component(parts.next()?)?;
            let value = match parts.next() {
                Some(v) => decode_component(v)?,
                None => String::new(),
            };
            Some((key, value))
        })
        .collect()
}

// `+` means space in form encoding and must be mapped before percent-decoding.
fn decode_component(raw: &str) -> Option<String> {
    let unplussed = raw.replace('+', " ");
    percent_decode_str(&unplussed)
        .decode_utf8()
        .ok()
        .map(|decoded| decoded.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_fragment() {
        let params = parse_query_parameters("a=1&b=2&c=3");
        assert_eq!(params.len(), 3);
        assert_eq!(params["a"], "1");
        assert_eq!(params["b"], "2");
        assert_eq!(params["c"], "3");
    }

    #[test]
    fn structured_pairs_pass_through() {
        let pairs: HashMap<String, String> = [("a", "1"), ("b", "2"), ("c", "3")]
            .into_iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        let params = parse_query_parameters(pairs);
        assert_eq!(params["a"], "1");
        assert_eq!(params["b"], "2");
        assert_eq!(params["c"], "3");
    }

    #[test]
    fn percent_and_plus_decoding() {
        let params = parse_query_parameters("name=John+Doe&city=S%C3%A3o%20Paulo");
        assert_eq!(params["name"], "John Doe");
        assert_eq!(params["city"], "São Paulo");
    }

    #[test]
    fn key_without_value() {
        let params = parse_query_parameters("flag&a=1");
        assert_eq!(params["flag"], "");
        assert_eq!(params["a"], "1");
    }

    #[test]
    fn invalid_utf8_escape_skipped() {
        // %FF is not valid UTF-8 on its own; the pair is dropped, not fatal.
        let params = parse_query_parameters("bad=%FF&good=1");
        assert_eq!(params.get("bad"), None);
        assert_eq!(params["good"], "1");
    }

    #[test]
    fn empty_fragment() {
        assert!(parse_query_parameters("").is_empty());
    }
}

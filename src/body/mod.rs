//! Content-type-driven request body decoding.
//!
//! [`parse_body`] looks up the `content-type` header case-insensitively,
//! classifies it into a closed set of recognized kinds, and runs the matching
//! sub-decoder: url-encoded forms, JSON objects, or multipart/form-data.
//!
//! The decoder never fails. Malformed payloads, unknown content types, and
//! undecodable input all degrade to an empty map — body decoding errors must
//! not abort routing.

use std::collections::HashMap;

use tracing::debug;

use crate::http::Headers;
use crate::query;

mod multipart;

// The recognized body content kinds, resolved from the content-type header.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ContentKind {
    UrlEncoded,
    Json,
    Multipart { boundary: String },
    Unknown,
}

impl ContentKind {
    fn from_headers(headers: &Headers) -> Self {
        let Some(content_type) = headers.get("content-type") else {
            return Self::Unknown;
        };
        let primary = content_type.split(';').next().unwrap_or("").trim();

        if primary.eq_ignore_ascii_case("application/x-www-form-urlencoded") {
            Self::UrlEncoded
        } else if primary.eq_ignore_ascii_case("application/json") {
            Self::Json
        } else if primary.eq_ignore_ascii_case("multipart/form-data") {
            // Multipart is undecodable without a boundary token.
            match multipart::boundary_token(content_type) {
                Some(boundary) => Self::Multipart {
                    boundary: boundary.to_owned(),
                },
                None => Self::Unknown,
            }
        } else {
            Self::Unknown
        }
    }
}

/// Decodes a request body into a flat string map, driven by `content-type`.
///
/// The body may be text or a raw byte sequence; bytes are decoded once,
/// lossily, as UTF-8 before any sub-decoder runs.
///
/// # Examples
///
/// ```
/// use strada::body::parse_body;
/// use strada::http::Headers;
///
/// let headers: Headers =
///     [("content-type", "application/x-www-form-urlencoded")].into_iter().collect();
/// let fields = parse_body("a=1&b=2&c=3", &headers);
/// assert_eq!(fields["b"], "2");
/// ```
pub fn parse_body(raw: impl AsRef<[u8]>, headers: &Headers) -> HashMap<String, String> {
    let text = String::from_utf8_lossy(raw.as_ref());

    match ContentKind::from_headers(headers) {
        ContentKind::UrlEncoded => query::parse_form_encoded(&text),
        ContentKind::Json => parse_json_object(&text),
        ContentKind::Multipart { boundary } => multipart::decode(&text, &boundary),
        ContentKind::Unknown => {
            debug!(
                content_type = headers.get("content-type").unwrap_or("<none>"),
                "no body decoder for content type"
            );
            HashMap::new()
        }
    }
}

// A JSON body must be a single object. String values pass through; any other
// value is rendered to its JSON text so the map stays string-to-string.
fn parse_json_object(text: &str) -> HashMap<String, String> {
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(serde_json::Value::Object(map)) => map
            .into_iter()
            .map(|(key, value)| match value {
                serde_json::Value::String(s) => (key, s),
                other => (key, other.to_string()),
            })
            .collect(),
        Ok(_) | Err(_) => {
            debug!("body is not a JSON object");
            HashMap::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(content_type: &str) -> Headers {
        [("content-type", content_type)].into_iter().collect()
    }

    #[test]
    fn urlencoded_text() {
        let fields = parse_body(
            "a=1&b=2&c=3",
            &headers("application/x-www-form-urlencoded"),
        );
        assert_eq!(fields["a"], "1");
        assert_eq!(fields["b"], "2");
        assert_eq!(fields["c"], "3");
    }

    #[test]
    fn urlencoded_bytes() {
        let fields = parse_body(
            b"a=1&b=2&c=3".as_slice(),
            &headers("application/x-www-form-urlencoded"),
        );
        assert_eq!(fields["a"], "1");
        assert_eq!(fields["b"], "2");
        assert_eq!(fields["c"], "3");
    }

    #[test]
    fn json_text() {
        let fields = parse_body(r#"{"a":"1","b":"2","c":"3"}"#, &headers("application/json"));
        assert_eq!(fields["a"], "1");
        assert_eq!(fields["b"], "2");
        assert_eq!(fields["c"], "3");
    }

    #[test]
    fn json_bytes() {
        let fields = parse_body(
            br#"{"a":"1","b":"2","c":"3"}"#.as_slice(),
            &headers("application/json"),
        );
        assert_eq!(fields["a"], "1");
        assert_eq!(fields["c"], "3");
    }

    #[test]
    fn json_non_string_values_rendered() {
        let fields = parse_body(r#"{"n":1,"t":true,"z":null}"#, &headers("application/json"));
        assert_eq!(fields["n"], "1");
        assert_eq!(fields["t"], "true");
        assert_eq!(fields["z"], "null");
    }

    #[test]
    fn json_parse_failure_yields_empty_map() {
        assert!(parse_body("{not json", &headers("application/json")).is_empty());
    }

    #[test]
    fn json_non_object_yields_empty_map() {
        assert!(parse_body("[1,2,3]", &headers("application/json")).is_empty());
        assert!(parse_body("\"just a string\"", &headers("application/json")).is_empty());
    }

    #[test]
    fn json_with_charset_parameter() {
        let fields = parse_body(
            r#"{"a":"1"}"#,
            &headers("application/json; charset=utf-8"),
        );
        assert_eq!(fields["a"], "1");
    }

    #[test]
    fn multipart_well_formed() {
        let body = "?\r\nContent-Disposition: form-data; name=\"testkey\"\r\n\r\ntestvalue\r\n?";
        let fields = parse_body(body, &headers("multipart/form-data;boundary=?"));
        assert_eq!(fields.len(), 1);
        assert_eq!(fields["testkey"], "testvalue");
    }

    #[test]
    fn multipart_malformed_yields_empty_map() {
        let fields = parse_body(
            "bad?multipart\r\nform\r\ndata",
            &headers("multipart/form-data;boundary=?"),
        );
        assert!(fields.is_empty());
    }

    #[test]
    fn multipart_without_boundary_yields_empty_map() {
        let body = "--b\r\nContent-Disposition: form-data; name=\"k\"\r\n\r\nv\r\n--b--";
        assert!(parse_body(body, &headers("multipart/form-data")).is_empty());
    }

    #[test]
    fn content_type_header_name_case_insensitive() {
        let headers: Headers = [("Content-Type", "application/json")].into_iter().collect();
        let fields = parse_body(r#"{"a":"1"}"#, &headers);
        assert_eq!(fields["a"], "1");
    }

    #[test]
    fn unknown_content_type_yields_empty_map() {
        assert!(parse_body("a=1", &headers("text/plain")).is_empty());
    }

    #[test]
    fn missing_content_type_yields_empty_map() {
        assert!(parse_body("a=1", &Headers::new()).is_empty());
    }

    #[test]
    fn invalid_utf8_body_does_not_panic() {
        let fields = parse_body(
            [0xFF, 0xFE, 0xFD].as_slice(),
            &headers("application/json"),
        );
        assert!(fields.is_empty());
    }
}

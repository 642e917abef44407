//! Hand-rolled `multipart/form-data` decoding.
//!
//! The decoder splits the body on the boundary delimiter, then splits each
//! part at the first blank line into a header block and a value block, and
//! recovers the field name from the part's `Content-Disposition` header.
//! Nothing here ever fails: unrecognizable parts are skipped and a body with
//! no boundary structure decodes to an empty map.

use std::collections::HashMap;

/// Extracts the `boundary` token from a content-type's parameter list.
///
/// Handles quoted and bare values; the parameter name is case-insensitive.
pub(super) fn boundary_token(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.trim().split_once('=')?;
        if !name.trim().eq_ignore_ascii_case("boundary") {
            return None;
        }
        let value = value.trim().trim_matches('"');
        (!value.is_empty()).then_some(value)
    })
}

/// Decodes a multipart body into field-name → value bindings.
///
/// The delimiter is the dashed RFC 2046 form (`--boundary`) when the body
/// contains it; some transports hand us bodies separated by the bare token,
/// which is used as the fallback.
pub(super) fn decode(body: &str, boundary: &str) -> HashMap<String, String> {
    let dashed = format!("--{boundary}");
    let delimiter: &str = if body.contains(&dashed) {
        &dashed
    } else {
        boundary
    };

    let mut fields = HashMap::new();
    for part in body.split(delimiter) {
        let Some((head, value)) = split_part(part) else {
            continue;
        };
        let Some(name) = disposition_name(head) else {
            continue;
        };
        fields.insert(name.to_owned(), value.trim().to_owned());
    }
    fields
}

// Splits a part into its header block and value block at the first blank line.
fn split_part(part: &str) -> Option<(&str, &str)> {
    part.split_once("\r\n\r\n")
        .or_else(|| part.split_once("\n\n"))
}

// Recovers the field name from the part's Content-Disposition header.
// The `name` parameter is matched exactly so `filename` is never mistaken
// for it.
fn disposition_name(head: &str) -> Option<&str> {
    head.lines().find_map(|line| {
        let (header, value) = line.split_once(':')?;
        if !header.trim().eq_ignore_ascii_case("content-disposition") {
            return None;
        }
        value.split(';').find_map(|param| {
            let (key, value) = param.trim().split_once('=')?;
            if !key.trim().eq_ignore_ascii_case("name") {
                return None;
            }
            let value = value.trim().trim_matches('"');
            (!value.is_empty()).then_some(value)
        })
    })
}

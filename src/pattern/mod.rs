//! Route pattern compilation and path matching.
//!
//! A pattern string like `/users/{id}` compiles into an ordered sequence of
//! literal and named-parameter segments. Matching walks the candidate path
//! segment-wise:
//!
//! | Pattern           | Path           | Result                         |
//! |-------------------|----------------|--------------------------------|
//! | `/users`          | `/users`       | match, no captures             |
//! | `/users/{id}`     | `/users/42`    | match, `id → "42"`             |
//! | `/users/{id}`     | `/users`       | match, `id` absent             |
//! | `/users/{id}`     | `/users/42/x`  | no match (no trailing wildcard)|
//!
//! Trailing parameter segments are optional: a shorter candidate still
//! matches as long as every elided segment is a parameter. Literal segments
//! may never be elided. This lets one route answer both `/abc` and
//! `/abc/123` without a separate optional syntax.

use thiserror::Error;

/// Registration-time pattern errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatternError {
    /// A parameter name appears more than once in one pattern.
    #[error("duplicate parameter name `{name}` in route pattern")]
    DuplicateParam { name: String },
}

// A single pattern segment: an exact literal or a named capture (`{name}`).
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A compiled route pattern.
///
/// Built once at route-registration time and immutable thereafter.
///
/// # Examples
///
/// ```
/// use strada::pattern::PathPattern;
///
/// let pattern = PathPattern::compile("/abc/{id}").unwrap();
/// assert_eq!(pattern.matches("/abc/123"), Some(vec![Some("123".to_owned())]));
/// assert_eq!(pattern.matches("/abc"), Some(vec![None]));
/// assert_eq!(pattern.matches("/def"), None);
/// ```
#[derive(Debug, Clone)]
pub struct PathPattern {
    segments: Vec<Segment>,
}

/// Normalizes a raw request path.
///
/// Everything from the first `?` onward is dropped, then one trailing `/` is
/// stripped unless the remainder is the root. Idempotent; returns a borrowed
/// sub-slice of the input.
///
/// # Examples
///
/// ```
/// use strada::pattern::normalize;
///
/// assert_eq!(normalize("/abc/def/?q=2"), "/abc/def");
/// assert_eq!(normalize("/abc/def/"), "/abc/def");
/// assert_eq!(normalize("/abc/def"), "/abc/def");
/// assert_eq!(normalize("/"), "/");
/// ```
pub fn normalize(raw: &str) -> &str {
    let path = match raw.find('?') {
        Some(pos) => &raw[..pos],
        None => raw,
    };
    if path.len() > 1 && path.ends_with('/') {
        &path[..path.len() - 1]
    } else {
        path
    }
}

impl PathPattern {
    /// Compiles a pattern string.
    ///
    /// The pattern is split on `/`; each non-empty component of the form
    /// `{name}` becomes a named parameter, everything else a literal.
    ///
    /// # Errors
    ///
    /// [`PatternError::DuplicateParam`] when a parameter name repeats within
    /// the pattern.
    pub fn compile(pattern: &str) -> Result<Self, PatternError> {
        let mut segments = Vec::new();
        let mut seen: Vec<&str> = Vec::new();

        for part in pattern.split('/').filter(|s| !s.is_empty()) {
            let segment = match part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
                Some(name) if !name.is_empty() => {
                    if seen.contains(&name) {
                        return Err(PatternError::DuplicateParam {
                            name: name.to_owned(),
                        });
                    }
                    seen.push(name);
                    Segment::Param(name.to_owned())
                }
                _ => Segment::Literal(part.to_owned()),
            };
            segments.push(segment);
        }

        Ok(Self { segments })
    }

    /// Iterates over the parameter names in pattern order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Returns the number of named parameters in this pattern.
    pub fn param_count(&self) -> usize {
        self.param_names().count()
    }

    /// Matches an already-normalized path against this pattern.
    ///
    /// On success returns the positional capture list in pattern-parameter
    /// order; parameters elided by a shorter candidate bind `None`. The list
    /// always has [`param_count`](Self::param_count) entries.
    pub fn matches(&self, normalized_path: &str) -> Option<Vec<Option<String>>> {
        let candidate: Vec<&str> = normalized_path
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        // No trailing wildcard: a longer candidate can never match.
        if candidate.len() > self.segments.len() {
            return None;
        }

        let mut captures = Vec::with_capacity(self.param_count());
        for (segment, value) in self.segments.iter().zip(&candidate) {
            match segment {
                Segment::Literal(text) => {
                    if text != value {
                        return None;
                    }
                }
                Segment::Param(_) => captures.push(Some((*value).to_owned())),
            }
        }

        // Remaining pattern segments are optional only when all are parameters.
        for segment in &self.segments[candidate.len()..] {
            match segment {
                Segment::Literal(_) => return None,
                Segment::Param(_) => captures.push(None),
            }
        }

        Some(captures)
    }
}

//! `Url` and `UrlSegment` — the input side of resolution
//!
//! A URL string is split into `/`-delimited segments. Each segment is
//! percent-decoded and may carry matrix parameters (`;key=value`), which are
//! kept as the segment's opaque parameter map. Query parameters and the
//! fragment ride along untouched so they survive redirects.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

/// One `/`-delimited token of a URL.
///
/// The parameter map is opaque to the resolver. It is filled from matrix
/// parameters when parsing, and custom matchers may attach their own entries
/// to the segments they bind.
///
/// # Example
///
/// ```
/// use routeweave::UrlSegment;
///
/// let segment = UrlSegment::new("users").with_parameter("sort", "asc");
/// assert_eq!(segment.path(), "users");
/// assert_eq!(segment.parameter("sort"), Some("asc"));
/// assert_eq!(segment.to_string(), "users;sort=asc");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct UrlSegment {
    path: String,
    parameters: BTreeMap<String, String>,
}

impl UrlSegment {
    /// Create a segment without parameters.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            parameters: BTreeMap::new(),
        }
    }

    /// Attach a parameter (builder pattern).
    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// A copy of this segment with a different path, keeping its parameters.
    ///
    /// Custom matchers use this to bind part of a segment (e.g. the handle of
    /// an `@handle` segment) while preserving its matrix parameters.
    #[must_use]
    pub fn with_path(&self, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            parameters: self.parameters.clone(),
        }
    }

    /// The decoded segment text.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// All parameters attached to this segment.
    #[must_use]
    pub fn parameters(&self) -> &BTreeMap<String, String> {
        &self.parameters
    }

    /// A single parameter by key.
    #[must_use]
    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).map(String::as_str)
    }

    pub(crate) fn parse(raw: &str) -> Self {
        let mut parts = raw.split(';');
        let path = decode(parts.next().unwrap_or_default());
        let parameters = parts
            .filter(|p| !p.is_empty())
            .map(|p| match p.split_once('=') {
                Some((k, v)) => (decode(k), decode(v)),
                None => (decode(p), String::new()),
            })
            .collect();
        Self { path, parameters }
    }
}

impl fmt::Display for UrlSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&urlencoding::encode(&self.path))?;
        for (k, v) in &self.parameters {
            if v.is_empty() {
                write!(f, ";{}", urlencoding::encode(k))?;
            } else {
                write!(f, ";{}={}", urlencoding::encode(k), urlencoding::encode(v))?;
            }
        }
        Ok(())
    }
}

impl From<&str> for UrlSegment {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

/// A parsed URL: path segments, query parameters, and fragment.
///
/// Parsing never fails. Leading and trailing slashes are ignored, so `""`,
/// `"/"` and `"//"` all have zero segments. Invalid percent-encodings are kept
/// verbatim.
///
/// # Example
///
/// ```
/// use routeweave::Url;
///
/// let url = Url::parse("/blog/5;draft=true?tab=comments#top");
/// assert_eq!(url.segments().len(), 2);
/// assert_eq!(url.segments()[1].parameter("draft"), Some("true"));
/// assert_eq!(url.query_param("tab"), Some("comments"));
/// assert_eq!(url.fragment(), Some("top"));
/// assert_eq!(url.path(), "/blog/5;draft=true");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Url {
    segments: Vec<UrlSegment>,
    query: BTreeMap<String, String>,
    fragment: Option<String>,
}

impl Url {
    /// Parse a URL string.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let (rest, fragment) = match input.split_once('#') {
            Some((rest, fragment)) => (rest, Some(decode(fragment))),
            None => (input, None),
        };
        let (path, query) = rest.split_once('?').unwrap_or((rest, ""));

        Self {
            segments: parse_segments(path),
            query: parse_query(query),
            fragment,
        }
    }

    /// Build a URL from pre-split segments, with no query or fragment.
    #[must_use]
    pub fn from_segments(segments: Vec<UrlSegment>) -> Self {
        Self {
            segments,
            ..Self::default()
        }
    }

    /// Path segments in order.
    #[must_use]
    pub fn segments(&self) -> &[UrlSegment] {
        &self.segments
    }

    /// Query parameters (last occurrence wins for repeated keys).
    #[must_use]
    pub fn query(&self) -> &BTreeMap<String, String> {
        &self.query
    }

    /// A single query parameter.
    #[must_use]
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// The fragment, without the leading `#`.
    #[must_use]
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// The serialized path only (always starts with `/`).
    #[must_use]
    pub fn path(&self) -> String {
        let mut out = String::from("/");
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                out.push('/');
            }
            out.push_str(&segment.to_string());
        }
        out
    }

    /// Replace the segments, keeping query and fragment.
    #[must_use]
    pub(crate) fn with_segments(mut self, segments: Vec<UrlSegment>) -> Self {
        self.segments = segments;
        self
    }

    /// Replace the query.
    #[must_use]
    pub(crate) fn with_query(mut self, query: BTreeMap<String, String>) -> Self {
        self.query = query;
        self
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())?;
        for (i, (k, v)) in self.query.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{sep}{}={}", urlencoding::encode(k), urlencoding::encode(v))?;
        }
        if let Some(fragment) = &self.fragment {
            write!(f, "#{}", urlencoding::encode(fragment))?;
        }
        Ok(())
    }
}

impl From<&str> for Url {
    fn from(input: &str) -> Self {
        Self::parse(input)
    }
}

pub(crate) fn parse_segments(path: &str) -> Vec<UrlSegment> {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed.split('/').map(UrlSegment::parse).collect()
}

pub(crate) fn parse_query(query: &str) -> BTreeMap<String, String> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            (!k.is_empty()).then(|| (decode(k), decode(v)))
        })
        .collect()
}

/// Percent-decode, keeping the input verbatim when it does not decode.
pub(crate) fn decode(raw: &str) -> String {
    urlencoding::decode(raw).map_or_else(|_| raw.to_owned(), Cow::into_owned)
}

//! Redirect targets — compiled at composition, applied during resolution
//!
//! A target is a small template: `/`-separated segments where `:name` is
//! replaced by a bound parameter, plus an optional query string.
//!
//! - `"/heroes"` is absolute and replaces the whole path.
//! - `"list"` is relative and lands under the segments consumed by the
//!   redirecting route's ancestors.
//! - Segments the redirecting route left unconsumed are appended.

use std::collections::BTreeMap;

use crate::pattern::{RESERVED, WILDCARD};
use crate::url::{decode, parse_query};
use crate::{PatternToken, RouteError, Url, UrlSegment, MAX_PATTERN_LENGTH};

/// A compiled `redirect_to` value.
///
/// # Example
///
/// ```
/// use routeweave::RedirectTarget;
///
/// let target = RedirectTarget::compile("/hero/:id?tab=info").unwrap();
/// assert!(target.is_absolute());
/// assert_eq!(target.param_names().collect::<Vec<_>>(), ["id"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectTarget {
    source: String,
    absolute: bool,
    tokens: Vec<PatternToken>,
    query: Option<BTreeMap<String, String>>,
}

impl RedirectTarget {
    /// Compile a redirect target.
    ///
    /// # Errors
    ///
    /// [`RouteError::MalformedPattern`] for empty segments, empty parameter
    /// names, `**`, an unencoded `;` in a literal, or a fragment. [`RouteError::PatternTooLong`] beyond
    /// [`MAX_PATTERN_LENGTH`].
    pub fn compile(target: &str) -> Result<Self, RouteError> {
        if target.len() > MAX_PATTERN_LENGTH {
            return Err(RouteError::PatternTooLong {
                len: target.len(),
                max: MAX_PATTERN_LENGTH,
            });
        }

        let malformed = |reason: &str| RouteError::MalformedPattern {
            pattern: target.to_owned(),
            reason: reason.to_owned(),
        };

        if target.contains('#') {
            return Err(malformed("a redirect target cannot carry a fragment"));
        }

        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Some(parse_query(query))),
            None => (target, None),
        };

        let absolute = path.starts_with('/');
        let body = path.strip_prefix('/').unwrap_or(path);
        if body.starts_with('/') {
            return Err(malformed("empty path segment"));
        }
        let body = body.strip_suffix('/').unwrap_or(body);

        let mut tokens = Vec::new();
        if !body.is_empty() {
            for part in body.split('/') {
                let token = match part {
                    "" => return Err(malformed("empty path segment")),
                    WILDCARD => return Err(malformed("`**` is not allowed in a redirect target")),
                    _ => match part.strip_prefix(':') {
                        Some("") => return Err(malformed("empty parameter name")),
                        Some(name) => PatternToken::Param(name.to_owned()),
                        None if part.contains(RESERVED) => {
                            return Err(malformed("`;` must be percent-encoded in a literal"))
                        }
                        None => PatternToken::Literal(decode(part)),
                    },
                };
                tokens.push(token);
            }
        }

        Ok(Self {
            source: target.to_owned(),
            absolute,
            tokens,
            query,
        })
    }

    /// The target as written.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns `true` when the target starts with `/`.
    #[must_use]
    pub fn is_absolute(&self) -> bool {
        self.absolute
    }

    #[must_use]
    pub fn tokens(&self) -> &[PatternToken] {
        &self.tokens
    }

    /// Query parameters that replace the original query, if the target has any.
    #[must_use]
    pub fn query(&self) -> Option<&BTreeMap<String, String>> {
        self.query.as_ref()
    }

    /// Names of the parameters substituted into the target.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().filter_map(|t| match t {
            PatternToken::Param(name) => Some(name.as_str()),
            _ => None,
        })
    }

    /// Build the URL to resolve next.
    ///
    /// `ancestors` are the segments consumed above the redirecting route,
    /// `rest` the segments it left unconsumed. `original` supplies the query
    /// and fragment that carry over.
    pub(crate) fn apply(
        &self,
        params: &BTreeMap<String, UrlSegment>,
        ancestors: &[UrlSegment],
        rest: &[UrlSegment],
        original: &Url,
    ) -> Result<Url, RouteError> {
        let mut segments = if self.absolute {
            Vec::with_capacity(self.tokens.len() + rest.len())
        } else {
            ancestors.to_vec()
        };

        for token in &self.tokens {
            match token {
                PatternToken::Literal(path) => segments.push(UrlSegment::new(path.as_str())),
                PatternToken::Param(name) => match params.get(name) {
                    Some(segment) => segments.push(segment.clone()),
                    None => {
                        return Err(RouteError::UnboundRedirectParam {
                            target: self.source.clone(),
                            param: name.clone(),
                        })
                    }
                },
                PatternToken::Wildcard => {}
            }
        }
        segments.extend_from_slice(rest);

        let url = original.clone().with_segments(segments);
        Ok(match &self.query {
            Some(query) => url.with_query(query.clone()),
            None => url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(path: &str) -> UrlSegment {
        UrlSegment::new(path)
    }

    fn apply(
        target: &str,
        params: &[(&str, &str)],
        ancestors: &[&str],
        rest: &[&str],
        original: &str,
    ) -> Result<String, RouteError> {
        let params = params.iter().map(|(k, v)| ((*k).to_owned(), seg(v))).collect();
        let ancestors: Vec<_> = ancestors.iter().map(|s| seg(s)).collect();
        let rest: Vec<_> = rest.iter().map(|s| seg(s)).collect();
        RedirectTarget::compile(target)
            .unwrap()
            .apply(&params, &ancestors, &rest, &Url::parse(original))
            .map(|url| url.to_string())
    }

    #[test]
    fn compile_absolute_and_relative() {
        let abs = RedirectTarget::compile("/a/:id").unwrap();
        assert!(abs.is_absolute());
        assert_eq!(
            abs.tokens(),
            [PatternToken::Literal("a".into()), PatternToken::Param("id".into())]
        );

        let rel = RedirectTarget::compile("list").unwrap();
        assert!(!rel.is_absolute());
    }

    #[test]
    fn compile_root_target() {
        let root = RedirectTarget::compile("/").unwrap();
        assert!(root.is_absolute());
        assert!(root.tokens().is_empty());
    }

    #[test]
    fn compile_query() {
        let t = RedirectTarget::compile("/login?next=home").unwrap();
        assert_eq!(t.query().unwrap()["next"], "home");
    }

    #[test]
    fn compile_rejects_bad_targets() {
        for target in ["/a//b", "//", "//a", "a//", "/a/:", "/**", "/a#frag", "/b;v=1"] {
            assert!(
                matches!(RedirectTarget::compile(target), Err(RouteError::MalformedPattern { .. })),
                "target {target:?}"
            );
        }
    }

    #[test]
    fn absolute_replaces_path() {
        assert_eq!(apply("/heroes", &[], &["x"], &[], "/x/old").unwrap(), "/heroes");
    }

    #[test]
    fn relative_keeps_ancestors() {
        assert_eq!(apply("list", &[], &["admin"], &[], "/admin").unwrap(), "/admin/list");
    }

    #[test]
    fn leftover_segments_are_appended() {
        assert_eq!(apply("/new", &[], &[], &["a", "b"], "/old/a/b").unwrap(), "/new/a/b");
    }

    #[test]
    fn params_are_substituted() {
        assert_eq!(apply("/hero/:id", &[("id", "7")], &[], &[], "/old/7").unwrap(), "/hero/7");
    }

    #[test]
    fn unbound_param_is_error() {
        let err = apply("/hero/:id", &[], &[], &[], "/old").unwrap_err();
        assert_eq!(
            err,
            RouteError::UnboundRedirectParam {
                target: "/hero/:id".into(),
                param: "id".into(),
            }
        );
    }

    #[test]
    fn original_query_and_fragment_survive() {
        assert_eq!(apply("/b", &[], &[], &[], "/a?x=1#top").unwrap(), "/b?x=1#top");
    }

    #[test]
    fn target_query_replaces_original() {
        assert_eq!(apply("/b?y=2", &[], &[], &[], "/a?x=1").unwrap(), "/b?y=2");
    }

    #[test]
    fn literals_are_percent_decoded() {
        let t = RedirectTarget::compile("/hello%20world/a%3Bb").unwrap();
        assert_eq!(
            t.tokens(),
            [
                PatternToken::Literal("hello world".into()),
                PatternToken::Literal("a;b".into()),
            ]
        );
        assert_eq!(apply("/a%3Bb", &[], &[], &[], "/x").unwrap(), "/a%3Bb");
    }
}

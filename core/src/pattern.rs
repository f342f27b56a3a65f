//! Pattern compiler — path-pattern strings to segment tokens
//!
//! The grammar is deliberately small:
//!
//! | Pattern | Tokens | Matches |
//! |---------|--------|---------|
//! | `""` | none | zero segments at this level |
//! | `"blog"` | `Literal("blog")` | exactly `blog` |
//! | `"blog/:id"` | `Literal("blog")`, `Param("id")` | `blog/<any non-empty>` |
//! | `"**"` | `Wildcard` | everything remaining, including nothing |
//!
//! Anything more expressive goes through a [`SegmentMatcher`].

use std::collections::BTreeMap;

use crate::url::decode;
use crate::{MatcherOutcome, RouteError, SegmentMatcher, UrlSegment, MAX_PATTERN_LENGTH};

/// The wildcard pattern.
pub(crate) const WILDCARD: &str = "**";

/// Characters that split a URL before its segments are decoded.
pub(crate) const RESERVED: [char; 3] = [';', '?', '#'];

/// One compiled token of a path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternToken {
    /// Requires exact string equality with the (decoded) segment.
    Literal(String),
    /// Matches any non-empty segment and binds it to the name.
    Param(String),
    /// Consumes all remaining segments. Only ever the sole token.
    Wildcard,
}

/// A compiled path pattern.
///
/// # Example
///
/// ```
/// use routeweave::{CompiledPattern, PatternToken, SegmentMatcher, Url};
///
/// let pattern = CompiledPattern::compile("blog/:id").unwrap();
/// assert_eq!(
///     pattern.tokens(),
///     [PatternToken::Literal("blog".into()), PatternToken::Param("id".into())]
/// );
///
/// let url = Url::parse("blog/5");
/// let outcome = pattern.match_segments(url.segments()).unwrap();
/// assert_eq!(outcome.consumed, 2);
/// assert_eq!(outcome.params["id"].path(), "5");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPattern {
    source: String,
    tokens: Vec<PatternToken>,
}

impl CompiledPattern {
    /// Compile a pattern string.
    ///
    /// # Errors
    ///
    /// - [`RouteError::PatternTooLong`] beyond [`MAX_PATTERN_LENGTH`]
    /// - [`RouteError::MalformedPattern`] for a leading `/`, an empty segment,
    ///   an empty or duplicate parameter name, `**` mixed with other segments,
    ///   or an unencoded `;`, `?` or `#` in a literal
    pub fn compile(pattern: &str) -> Result<Self, RouteError> {
        if pattern.len() > MAX_PATTERN_LENGTH {
            return Err(RouteError::PatternTooLong {
                len: pattern.len(),
                max: MAX_PATTERN_LENGTH,
            });
        }

        let malformed = |reason: &str| RouteError::MalformedPattern {
            pattern: pattern.to_owned(),
            reason: reason.to_owned(),
        };

        if pattern.is_empty() {
            return Ok(Self {
                source: String::new(),
                tokens: Vec::new(),
            });
        }
        if pattern.starts_with('/') {
            return Err(malformed("a route pattern cannot start with a slash"));
        }

        let parts: Vec<&str> = pattern.split('/').collect();
        let mut tokens = Vec::with_capacity(parts.len());
        for part in &parts {
            let token = match *part {
                "" => return Err(malformed("empty path segment")),
                WILDCARD if parts.len() > 1 => {
                    return Err(malformed("`**` must be the only segment of a pattern"))
                }
                WILDCARD => PatternToken::Wildcard,
                _ => match part.strip_prefix(':') {
                    Some("") => return Err(malformed("empty parameter name")),
                    Some(name) => {
                        if tokens.contains(&PatternToken::Param(name.to_owned())) {
                            return Err(malformed("duplicate parameter name"));
                        }
                        PatternToken::Param(name.to_owned())
                    }
                    None if part.contains(RESERVED) => {
                        return Err(malformed("`;`, `?` and `#` must be percent-encoded in a literal"))
                    }
                    None => PatternToken::Literal(decode(part)),
                },
            };
            tokens.push(token);
        }

        Ok(Self {
            source: pattern.to_owned(),
            tokens,
        })
    }

    /// The pattern as written.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The compiled tokens.
    #[must_use]
    pub fn tokens(&self) -> &[PatternToken] {
        &self.tokens
    }

    /// Returns `true` for the `**` pattern.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        matches!(self.tokens.as_slice(), [PatternToken::Wildcard])
    }

    /// Returns `true` for the empty pattern.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Names of all parameters, in pattern order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().filter_map(|t| match t {
            PatternToken::Param(name) => Some(name.as_str()),
            _ => None,
        })
    }
}

impl SegmentMatcher for CompiledPattern {
    /// Prefix match: succeeds when every token matches the corresponding
    /// leading segment. Unconsumed trailing segments are left to the caller.
    fn match_segments(&self, segments: &[UrlSegment]) -> Option<MatcherOutcome> {
        if self.is_wildcard() {
            return Some(MatcherOutcome::consumed(segments.len()));
        }
        if self.tokens.len() > segments.len() {
            return None;
        }

        let mut params = BTreeMap::new();
        for (token, segment) in self.tokens.iter().zip(segments) {
            match token {
                PatternToken::Literal(expected) => {
                    if segment.path() != expected.as_str() {
                        return None;
                    }
                }
                PatternToken::Param(name) => {
                    if segment.path().is_empty() {
                        return None;
                    }
                    params.insert(name.clone(), segment.clone());
                }
                PatternToken::Wildcard => {
                    return Some(MatcherOutcome::consumed(segments.len()));
                }
            }
        }

        Some(MatcherOutcome {
            consumed: self.tokens.len(),
            params,
        })
    }
}

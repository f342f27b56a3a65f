//! `SegmentMatcher` — the custom matcher protocol
//!
//! When the pattern grammar is not expressive enough, a route carries a
//! [`SegmentMatcher`] instead of a pattern. The matcher sees the remaining
//! segments at its level and either declines or reports how many leading
//! segments it consumed and which parameters it bound.
//!
//! # Available Matchers
//!
//! - [`CompiledPattern`](crate::CompiledPattern) — the pattern grammar itself
//! - [`FnMatcher`] — a named closure
//! - [`RegexSegmentMatcher`] — regex over the first segment, named captures bind params

use std::collections::BTreeMap;
use std::fmt::{self, Debug};
use std::sync::Arc;

use regex::Regex;

use crate::{RouteError, UrlSegment, MAX_REGEX_PATTERN_LENGTH};

/// What a successful [`SegmentMatcher`] reports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatcherOutcome {
    /// Number of leading segments consumed. Must not exceed the input length;
    /// the resolver treats a larger value as "no match".
    pub consumed: usize,
    /// Parameters bound by the match. Values are whole segments so matchers
    /// can attach their own parameter data.
    pub params: BTreeMap<String, UrlSegment>,
}

impl MatcherOutcome {
    /// An outcome consuming `consumed` segments with no parameters.
    #[must_use]
    pub fn consumed(consumed: usize) -> Self {
        Self {
            consumed,
            params: BTreeMap::new(),
        }
    }

    /// Bind a parameter (builder pattern).
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, segment: UrlSegment) -> Self {
        self.params.insert(name.into(), segment);
        self
    }
}

/// Matches a route against the remaining URL segments at its level.
///
/// # Contract
///
/// - Return `None` to decline.
/// - `consumed` may be less than `segments.len()`; the rest is handed to the
///   route's children. A value above `segments.len()` is downgraded to `None`.
/// - Implementations must be pure: the resolver may call a matcher several
///   times for the same input (e.g. after a redirect) and expects the same answer.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` so a composed tree can be shared
/// across threads.
///
/// # Example
///
/// ```
/// use routeweave::{MatcherOutcome, SegmentMatcher, UrlSegment};
///
/// #[derive(Debug)]
/// struct NumericId;
///
/// impl SegmentMatcher for NumericId {
///     fn match_segments(&self, segments: &[UrlSegment]) -> Option<MatcherOutcome> {
///         match segments {
///             [only] if !only.path().is_empty() && only.path().bytes().all(|b| b.is_ascii_digit()) => {
///                 Some(MatcherOutcome::consumed(1).with_param("id", only.clone()))
///             }
///             _ => None,
///         }
///     }
/// }
///
/// assert!(NumericId.match_segments(&[UrlSegment::new("123")]).is_some());
/// assert!(NumericId.match_segments(&[UrlSegment::new("abc")]).is_none());
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `SegmentMatcher`",
    label = "this type cannot match URL segments",
    note = "implement `match_segments(&self, &[UrlSegment]) -> Option<MatcherOutcome>`, or wrap a closure in `FnMatcher::new`"
)]
pub trait SegmentMatcher: Send + Sync + Debug {
    /// Match against the remaining segments at this level.
    fn match_segments(&self, segments: &[UrlSegment]) -> Option<MatcherOutcome>;
}

// Blanket implementations for shared and boxed matchers
#[diagnostic::do_not_recommend]
impl SegmentMatcher for Arc<dyn SegmentMatcher> {
    fn match_segments(&self, segments: &[UrlSegment]) -> Option<MatcherOutcome> {
        (**self).match_segments(segments)
    }
}

#[diagnostic::do_not_recommend]
impl SegmentMatcher for Box<dyn SegmentMatcher> {
    fn match_segments(&self, segments: &[UrlSegment]) -> Option<MatcherOutcome> {
        (**self).match_segments(segments)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// FnMatcher
// ═══════════════════════════════════════════════════════════════════════════════

/// A closure used as a [`SegmentMatcher`].
///
/// The name only shows up in `Debug` output and resolution traces.
///
/// # Example
///
/// ```
/// use routeweave::{FnMatcher, MatcherOutcome, SegmentMatcher, UrlSegment};
///
/// let handle = FnMatcher::new("handle", |segments: &[UrlSegment]| {
///     let first = segments.first()?;
///     let name = first.path().strip_prefix('@')?;
///     Some(MatcherOutcome::consumed(1).with_param("username", first.with_path(name)))
/// });
///
/// let outcome = handle.match_segments(&[UrlSegment::new("@bob")]).unwrap();
/// assert_eq!(outcome.params["username"].path(), "bob");
/// ```
pub struct FnMatcher<F> {
    name: String,
    f: F,
}

impl<F> FnMatcher<F>
where
    F: Fn(&[UrlSegment]) -> Option<MatcherOutcome> + Send + Sync,
{
    /// Wrap a closure.
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> SegmentMatcher for FnMatcher<F>
where
    F: Fn(&[UrlSegment]) -> Option<MatcherOutcome> + Send + Sync,
{
    fn match_segments(&self, segments: &[UrlSegment]) -> Option<MatcherOutcome> {
        (self.f)(segments)
    }
}

impl<F> Debug for FnMatcher<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FnMatcher").field(&self.name).finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RegexSegmentMatcher
// ═══════════════════════════════════════════════════════════════════════════════

/// Tests the first remaining segment against a regex.
///
/// Uses the `regex` crate (linear time, no backtracking), so patterns from
/// untrusted configuration cannot blow up. Anchor the regex (`^...$`) to test
/// the whole segment.
///
/// On a match the segment is consumed and:
/// - each named capture group that participated binds a parameter of the
///   same name to the captured text,
/// - [`bind`](Self::bind) additionally binds the whole segment.
///
/// With [`exact`](Self::exact), only a single remaining segment is accepted.
///
/// # Example
///
/// ```
/// use routeweave::{RegexSegmentMatcher, SegmentMatcher, Url};
///
/// let numeric = RegexSegmentMatcher::new(r"^\d+$").unwrap().bind("id").exact();
///
/// let outcome = numeric.match_segments(Url::parse("123").segments()).unwrap();
/// assert_eq!(outcome.params["id"].path(), "123");
///
/// assert!(numeric.match_segments(Url::parse("abc").segments()).is_none());
/// assert!(numeric.match_segments(Url::parse("123/456").segments()).is_none());
/// ```
#[derive(Clone)]
pub struct RegexSegmentMatcher {
    regex: Regex,
    param: Option<String>,
    exact: bool,
}

impl RegexSegmentMatcher {
    /// Compile a segment regex.
    ///
    /// # Errors
    ///
    /// - [`RouteError::PatternTooLong`] beyond [`MAX_REGEX_PATTERN_LENGTH`]
    /// - [`RouteError::InvalidRegex`] if the regex does not compile
    pub fn new(pattern: &str) -> Result<Self, RouteError> {
        if pattern.len() > MAX_REGEX_PATTERN_LENGTH {
            return Err(RouteError::PatternTooLong {
                len: pattern.len(),
                max: MAX_REGEX_PATTERN_LENGTH,
            });
        }
        let regex = Regex::new(pattern).map_err(|e| RouteError::InvalidRegex {
            pattern: pattern.to_owned(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            regex,
            param: None,
            exact: false,
        })
    }

    /// Bind the whole matched segment to `name`.
    #[must_use]
    pub fn bind(mut self, name: impl Into<String>) -> Self {
        self.param = Some(name.into());
        self
    }

    /// Only match when exactly one segment remains.
    #[must_use]
    pub fn exact(mut self) -> Self {
        self.exact = true;
        self
    }

    /// The regex source.
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }
}

impl Debug for RegexSegmentMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RegexSegmentMatcher")
            .field(&self.regex.as_str())
            .finish()
    }
}

impl SegmentMatcher for RegexSegmentMatcher {
    fn match_segments(&self, segments: &[UrlSegment]) -> Option<MatcherOutcome> {
        if self.exact && segments.len() != 1 {
            return None;
        }
        let first = segments.first()?;
        let captures = self.regex.captures(first.path())?;

        let mut outcome = MatcherOutcome::consumed(1);
        for name in self.regex.capture_names().flatten() {
            if let Some(m) = captures.name(name) {
                outcome.params.insert(name.to_owned(), first.with_path(m.as_str()));
            }
        }
        if let Some(param) = &self.param {
            outcome.params.insert(param.clone(), first.clone());
        }
        Some(outcome)
    }
}

//! Resolver — first-match-wins walk of a composed tree
//!
//! # Algorithm
//!
//! For each sibling in composed order, offer it the remaining segments:
//!
//! 1. The pattern or matcher declines → next sibling.
//! 2. `Full` strategy with segments left over → next sibling.
//! 3. The route redirects → substitute the target and restart at the root.
//! 4. The route has no children and segments are left over → next sibling.
//! 5. The route has no children → match.
//! 6. The route has children → descend with the leftover segments. Whatever
//!    the children decide is final; later siblings are never retried.
//!
//! Redirect passes repeat until a match, a failure, a revisited URL
//! ([`RouteError::RedirectLoop`]) or [`MAX_REDIRECTS`] redirects.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::ptr;

use crate::{
    CandidateOutcome, CandidateTrace, MatchStrategy, ResolveTrace, Route, RouteError, RouteTree,
    Url, UrlSegment, MAX_REDIRECTS,
};

// ═══════════════════════════════════════════════════════════════════════════════
// Result types
// ═══════════════════════════════════════════════════════════════════════════════

/// One matched route along the resolved path.
pub struct MatchedLevel<'t, P> {
    route: &'t Route<P>,
    consumed: usize,
    params: BTreeMap<String, UrlSegment>,
}

impl<'t, P> MatchedLevel<'t, P> {
    #[must_use]
    pub fn route(&self) -> &'t Route<P> {
        self.route
    }

    /// Segments consumed by this route's own pattern or matcher.
    #[must_use]
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Parameters bound at this level only.
    #[must_use]
    pub fn params(&self) -> &BTreeMap<String, UrlSegment> {
        &self.params
    }
}

impl<P> Clone for MatchedLevel<'_, P> {
    fn clone(&self) -> Self {
        Self {
            route: self.route,
            consumed: self.consumed,
            params: self.params.clone(),
        }
    }
}

impl<P> PartialEq for MatchedLevel<'_, P> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.route, other.route)
            && self.consumed == other.consumed
            && self.params == other.params
    }
}

impl<P> fmt::Debug for MatchedLevel<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchedLevel")
            .field("route", &self.route.full_path())
            .field("consumed", &self.consumed)
            .field("params", &self.params)
            .finish()
    }
}

/// The outcome of a successful resolution.
///
/// Borrows the [`RouteTree`] it was resolved against.
pub struct ResolvedMatch<'t, P> {
    levels: Vec<MatchedLevel<'t, P>>,
    leaf: &'t Route<P>,
    params: BTreeMap<String, String>,
    param_segments: BTreeMap<String, UrlSegment>,
    url: Url,
    redirects: Vec<String>,
}

impl<'t, P> ResolvedMatch<'t, P> {
    /// The deepest matched route.
    #[must_use]
    pub fn route(&self) -> &'t Route<P> {
        self.leaf
    }

    /// Matched routes from root to leaf.
    #[must_use]
    pub fn levels(&self) -> &[MatchedLevel<'t, P>] {
        &self.levels
    }

    /// The deepest payload along the matched path.
    #[must_use]
    pub fn payload(&self) -> Option<&'t P> {
        self.levels.iter().rev().find_map(|level| level.route.payload())
    }

    /// Payloads from root to leaf, skipping routes without one.
    pub fn payloads(&self) -> impl Iterator<Item = &'t P> + '_ {
        self.levels.iter().filter_map(|level| level.route.payload())
    }

    /// All bound parameters. On a name collision the deeper binding wins.
    #[must_use]
    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// A bound parameter with its segment parameters.
    #[must_use]
    pub fn param_segment(&self, name: &str) -> Option<&UrlSegment> {
        self.param_segments.get(name)
    }

    /// Segments consumed at each level, root to leaf.
    #[must_use]
    pub fn consumed(&self) -> Vec<usize> {
        self.levels.iter().map(MatchedLevel::consumed).collect()
    }

    /// The URL that finally matched (after redirects).
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Every redirect target followed, in order.
    #[must_use]
    pub fn redirects(&self) -> &[String] {
        &self.redirects
    }
}

impl<P> Clone for ResolvedMatch<'_, P> {
    fn clone(&self) -> Self {
        Self {
            levels: self.levels.clone(),
            leaf: self.leaf,
            params: self.params.clone(),
            param_segments: self.param_segments.clone(),
            url: self.url.clone(),
            redirects: self.redirects.clone(),
        }
    }
}

impl<P> PartialEq for ResolvedMatch<'_, P> {
    fn eq(&self, other: &Self) -> bool {
        self.levels == other.levels
            && ptr::eq(self.leaf, other.leaf)
            && self.param_segments == other.param_segments
            && self.url == other.url
            && self.redirects == other.redirects
    }
}

impl<P: fmt::Debug> fmt::Debug for ResolvedMatch<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedMatch")
            .field("route", &self.leaf.full_path())
            .field("payload", &self.payload())
            .field("levels", &self.levels)
            .field("params", &self.params)
            .field("url", &self.url.to_string())
            .field("redirects", &self.redirects)
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Resolution
// ═══════════════════════════════════════════════════════════════════════════════

impl<P> RouteTree<P> {
    /// Resolve a URL string.
    ///
    /// # Errors
    ///
    /// [`RouteError::NoRouteMatched`], [`RouteError::RedirectLoop`],
    /// [`RouteError::RedirectLimitExceeded`] or
    /// [`RouteError::UnboundRedirectParam`].
    pub fn resolve(&self, url: &str) -> Result<ResolvedMatch<'_, P>, RouteError> {
        self.resolve_url(Url::parse(url))
    }

    /// Resolve an already parsed URL.
    ///
    /// # Errors
    ///
    /// See [`RouteTree::resolve`].
    pub fn resolve_url(&self, url: Url) -> Result<ResolvedMatch<'_, P>, RouteError> {
        self.run(url, &mut Recorder::disabled())
    }

    /// Resolve pre-split segments (no query, no fragment).
    ///
    /// # Errors
    ///
    /// See [`RouteTree::resolve`].
    pub fn resolve_segments(
        &self,
        segments: &[UrlSegment],
    ) -> Result<ResolvedMatch<'_, P>, RouteError> {
        self.resolve_url(Url::from_segments(segments.to_vec()))
    }

    /// Resolve with a full trace of every candidate examined.
    ///
    /// The trace's `result` is identical to what [`resolve`](Self::resolve)
    /// returns for the same input.
    pub fn resolve_with_trace(&self, url: &str) -> ResolveTrace<'_, P> {
        let mut recorder = Recorder::enabled();
        let result = self.run(Url::parse(url), &mut recorder);
        ResolveTrace {
            result,
            candidates: recorder.candidates.unwrap_or_default(),
        }
    }

    fn run(&self, url: Url, recorder: &mut Recorder) -> Result<ResolvedMatch<'_, P>, RouteError> {
        let mut current = url;
        let mut chain = vec![current.to_string()];
        let mut visited: HashSet<String> = chain.iter().cloned().collect();
        let mut redirects = Vec::new();

        loop {
            recorder.pass = redirects.len();
            let mut walk = Walk::default();
            let step = scan_level(
                &self.routes,
                current.segments(),
                0,
                0,
                &current,
                &mut walk,
                recorder,
            )?;

            match step {
                Step::Matched(leaf) => {
                    tracing::debug!(url = %current, route = leaf.full_path(), "resolved");
                    return Ok(walk.finish(leaf, current, redirects));
                }
                Step::Unmatched => {
                    tracing::debug!(url = %current, "no route matched");
                    return Err(RouteError::NoRouteMatched {
                        url: current.to_string(),
                    });
                }
                Step::Redirect(next) => {
                    let target = next.to_string();
                    chain.push(target.clone());
                    if !visited.insert(target.clone()) {
                        tracing::debug!(chain = ?chain, "redirect loop");
                        return Err(RouteError::RedirectLoop { chain });
                    }
                    if redirects.len() >= MAX_REDIRECTS {
                        return Err(RouteError::RedirectLimitExceeded {
                            max: MAX_REDIRECTS,
                            last: target,
                        });
                    }
                    tracing::debug!(from = %current, to = %target, "following redirect");
                    redirects.push(target);
                    current = next;
                }
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Internals
// ═══════════════════════════════════════════════════════════════════════════════

/// Per-pass state. Never outlives one resolution.
struct Walk<'t, P> {
    levels: Vec<MatchedLevel<'t, P>>,
    params: BTreeMap<String, UrlSegment>,
}

impl<P> Default for Walk<'_, P> {
    fn default() -> Self {
        Self {
            levels: Vec::new(),
            params: BTreeMap::new(),
        }
    }
}

impl<'t, P> Walk<'t, P> {
    fn bind(&mut self, route: &'t Route<P>, consumed: usize, params: BTreeMap<String, UrlSegment>) {
        // Last write wins on collisions.
        self.params
            .extend(params.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.levels.push(MatchedLevel {
            route,
            consumed,
            params,
        });
    }

    fn finish(self, leaf: &'t Route<P>, url: Url, redirects: Vec<String>) -> ResolvedMatch<'t, P> {
        let params = self
            .params
            .iter()
            .map(|(k, v)| (k.clone(), v.path().to_owned()))
            .collect();
        ResolvedMatch {
            levels: self.levels,
            leaf,
            params,
            param_segments: self.params,
            url,
            redirects,
        }
    }
}

enum Step<'t, P> {
    Matched(&'t Route<P>),
    Redirect(Url),
    Unmatched,
}

struct Recorder {
    candidates: Option<Vec<CandidateTrace>>,
    pass: usize,
}

impl Recorder {
    fn disabled() -> Self {
        Self {
            candidates: None,
            pass: 0,
        }
    }

    fn enabled() -> Self {
        Self {
            candidates: Some(Vec::new()),
            pass: 0,
        }
    }

    fn record<P>(
        &mut self,
        depth: usize,
        index: usize,
        route: &Route<P>,
        remaining: &[UrlSegment],
        outcome: CandidateOutcome,
    ) {
        if let Some(candidates) = &mut self.candidates {
            candidates.push(CandidateTrace {
                pass: self.pass,
                depth,
                index,
                route: route.describe(),
                remaining: Url::from_segments(remaining.to_vec()).path(),
                outcome,
            });
        }
    }
}

fn scan_level<'t, P>(
    routes: &'t [Route<P>],
    segments: &[UrlSegment],
    offset: usize,
    depth: usize,
    url: &Url,
    walk: &mut Walk<'t, P>,
    recorder: &mut Recorder,
) -> Result<Step<'t, P>, RouteError> {
    let remaining = &segments[offset..];

    for (index, route) in routes.iter().enumerate() {
        let Some(outcome) = route.match_segments(remaining) else {
            tracing::trace!(depth, route = route.full_path(), "declined");
            recorder.record(depth, index, route, remaining, CandidateOutcome::Declined);
            continue;
        };

        let consumed = outcome.consumed;
        if consumed > remaining.len() {
            tracing::warn!(
                route = route.full_path(),
                consumed,
                available = remaining.len(),
                "matcher consumed more segments than offered, treating as no match"
            );
            recorder.record(
                depth,
                index,
                route,
                remaining,
                CandidateOutcome::ConsumedOutOfRange {
                    consumed,
                    available: remaining.len(),
                },
            );
            continue;
        }

        let leftover = remaining.len() - consumed;
        if route.strategy() == MatchStrategy::Full && leftover > 0 {
            tracing::trace!(depth, route = route.full_path(), leftover, "full match required");
            recorder.record(
                depth,
                index,
                route,
                remaining,
                CandidateOutcome::NotFull {
                    consumed,
                    available: remaining.len(),
                },
            );
            continue;
        }

        if let Some(target) = route.redirect() {
            walk.params.extend(outcome.params);
            let next = target.apply(&walk.params, &segments[..offset], &remaining[consumed..], url)?;
            tracing::trace!(depth, route = route.full_path(), to = %next, "redirect");
            recorder.record(
                depth,
                index,
                route,
                remaining,
                CandidateOutcome::Redirected {
                    to: next.to_string(),
                },
            );
            return Ok(Step::Redirect(next));
        }

        if route.children().is_empty() {
            if leftover > 0 {
                tracing::trace!(depth, route = route.full_path(), leftover, "segments left over");
                recorder.record(
                    depth,
                    index,
                    route,
                    remaining,
                    CandidateOutcome::Leftover {
                        remaining: leftover,
                    },
                );
                continue;
            }
            recorder.record(depth, index, route, remaining, CandidateOutcome::Matched { consumed });
            walk.bind(route, consumed, outcome.params);
            return Ok(Step::Matched(route));
        }

        recorder.record(depth, index, route, remaining, CandidateOutcome::Descended { consumed });
        walk.bind(route, consumed, outcome.params);
        return scan_level(
            route.children(),
            segments,
            offset + consumed,
            depth + 1,
            url,
            walk,
            recorder,
        );
    }

    Ok(Step::Unmatched)
}

//! Route definitions — the raw, builder-friendly configuration
//!
//! A [`RouteDefinition`] is what callers write. It is never matched directly:
//! the [`Composer`](crate::Composer) validates a list of definitions and turns
//! it into an immutable [`RouteTree`](crate::RouteTree).

use std::fmt;
use std::sync::Arc;

use crate::SegmentMatcher;

/// How much of the remaining URL a route's own match must consume.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum MatchStrategy {
    /// The pattern may match a leading part of the remaining segments.
    #[default]
    Prefix,
    /// The pattern must consume every remaining segment, leaving nothing for
    /// children.
    Full,
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prefix => f.write_str("prefix"),
            Self::Full => f.write_str("full"),
        }
    }
}

/// What a route matches against: a path pattern or a custom matcher, never both.
#[derive(Debug, Clone)]
pub enum RouteMatch {
    /// A path pattern (`""`, `"blog/:id"`, `"**"`, ...).
    Path(String),
    /// A caller-supplied matcher.
    Matcher(Arc<dyn SegmentMatcher>),
}

impl Default for RouteMatch {
    fn default() -> Self {
        Self::Path(String::new())
    }
}

impl fmt::Display for RouteMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(pattern) => write!(f, "{pattern:?}"),
            Self::Matcher(matcher) => write!(f, "{matcher:?}"),
        }
    }
}

/// One entry of a route configuration.
///
/// `P` is the caller's payload (a component, a handler id, ...). It is carried
/// through to the [`ResolvedMatch`](crate::ResolvedMatch) and never inspected.
///
/// # Example
///
/// ```
/// use routeweave::{MatchStrategy, RouteDefinition};
///
/// let admin: RouteDefinition<&str> = RouteDefinition::path("admin")
///     .payload("AdminShell")
///     .child(RouteDefinition::path("").payload("Dashboard"))
///     .child(RouteDefinition::path("users/:id").payload("UserDetail"));
///
/// assert_eq!(admin.children.len(), 2);
/// assert_eq!(admin.strategy, MatchStrategy::Prefix);
/// ```
#[derive(Debug, Clone)]
pub struct RouteDefinition<P> {
    /// Pattern or custom matcher.
    pub route_match: RouteMatch,
    /// Prefix (default) or full match.
    pub strategy: MatchStrategy,
    /// Redirect target fired when this route matches.
    pub redirect_to: Option<String>,
    /// Nested routes, scanned with the segments this route leaves over.
    pub children: Vec<RouteDefinition<P>>,
    /// Additional child lists merged in at composition, in order.
    pub feature_routes: Vec<Vec<RouteDefinition<P>>>,
    /// Opaque caller data.
    pub payload: Option<P>,
}

impl<P> Default for RouteDefinition<P> {
    fn default() -> Self {
        Self {
            route_match: RouteMatch::default(),
            strategy: MatchStrategy::default(),
            redirect_to: None,
            children: Vec::new(),
            feature_routes: Vec::new(),
            payload: None,
        }
    }
}

impl<P> RouteDefinition<P> {
    /// A route matching a path pattern.
    #[must_use]
    pub fn path(pattern: impl Into<String>) -> Self {
        Self {
            route_match: RouteMatch::Path(pattern.into()),
            ..Self::default()
        }
    }

    /// A route matching through a custom matcher.
    #[must_use]
    pub fn matcher(matcher: impl SegmentMatcher + 'static) -> Self {
        Self::matcher_arc(Arc::new(matcher))
    }

    /// A route matching through an already shared custom matcher.
    #[must_use]
    pub fn matcher_arc(matcher: Arc<dyn SegmentMatcher>) -> Self {
        Self {
            route_match: RouteMatch::Matcher(matcher),
            ..Self::default()
        }
    }

    /// Redirect to `target` when this route matches.
    #[must_use]
    pub fn redirect_to(mut self, target: impl Into<String>) -> Self {
        self.redirect_to = Some(target.into());
        self
    }

    /// Shorthand for `.strategy(MatchStrategy::Full)`.
    #[must_use]
    pub fn full(self) -> Self {
        self.strategy(MatchStrategy::Full)
    }

    #[must_use]
    pub fn strategy(mut self, strategy: MatchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Replace the children.
    #[must_use]
    pub fn children(mut self, children: Vec<RouteDefinition<P>>) -> Self {
        self.children = children;
        self
    }

    /// Append one child.
    #[must_use]
    pub fn child(mut self, child: RouteDefinition<P>) -> Self {
        self.children.push(child);
        self
    }

    /// Append a feature list to be merged into the children.
    #[must_use]
    pub fn feature_routes(mut self, routes: Vec<RouteDefinition<P>>) -> Self {
        self.feature_routes.push(routes);
        self
    }

    #[must_use]
    pub fn payload(mut self, payload: P) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Short human-readable form used in errors and logs.
    #[must_use]
    pub fn describe(&self) -> String {
        match &self.redirect_to {
            Some(target) => format!("{} -> {target}", self.route_match),
            None => self.route_match.to_string(),
        }
    }
}

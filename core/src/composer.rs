//! Route tree composer — definitions to an immutable, validated tree
//!
//! Composition runs once per configuration. Everything that can be checked
//! without a URL is checked here, so resolution only ever fails for reasons
//! that depend on the URL being resolved.
//!
//! # Ordering
//!
//! At every level, siblings are laid out as: base definitions in order, then
//! each feature list in order, then the single `**` route (wherever it was
//! declared). Given base `[**, a]` and a merged list `[b]`, the composed level
//! is `[a, b, **]`.

use std::sync::Arc;

use crate::{
    CompiledPattern, MatchStrategy, MatcherOutcome, RedirectTarget, RouteDefinition, RouteError,
    RouteMatch, SegmentMatcher, UrlSegment, MAX_DEPTH, MAX_ROUTES_PER_LEVEL,
};

// ═══════════════════════════════════════════════════════════════════════════════
// Composer
// ═══════════════════════════════════════════════════════════════════════════════

/// Merges a base route list with feature lists and compiles the result.
///
/// # Example
///
/// ```
/// use routeweave::{Composer, RouteDefinition};
///
/// let tree = Composer::new(vec![
///     RouteDefinition::path("**").payload("NotFound"),
///     RouteDefinition::path("a").payload("A"),
/// ])
/// .merge(vec![RouteDefinition::path("b").payload("B")])
/// .compose()
/// .unwrap();
///
/// let order: Vec<_> = tree.routes().iter().map(|r| r.full_path()).collect();
/// assert_eq!(order, ["/a", "/b", "/**"]);
/// ```
#[derive(Debug, Clone)]
pub struct Composer<P> {
    base: Vec<RouteDefinition<P>>,
    features: Vec<Vec<RouteDefinition<P>>>,
}

impl<P> Composer<P> {
    /// Start from a base route list.
    #[must_use]
    pub fn new(base: Vec<RouteDefinition<P>>) -> Self {
        Self {
            base,
            features: Vec::new(),
        }
    }

    /// Merge a feature list into the root level (builder pattern).
    #[must_use]
    pub fn merge(mut self, routes: Vec<RouteDefinition<P>>) -> Self {
        self.features.push(routes);
        self
    }

    /// Validate and compile every level.
    ///
    /// # Errors
    ///
    /// Any pattern or redirect target error, [`RouteError::AmbiguousWildcard`],
    /// [`RouteError::InvalidRoute`], [`RouteError::DepthExceeded`] or
    /// [`RouteError::TooManyRoutes`].
    pub fn compose(self) -> Result<RouteTree<P>, RouteError> {
        let routes = compose_level(self.base, self.features, "", 1)?;
        let tree = RouteTree { routes };
        tracing::debug!(routes = tree.len(), depth = tree.depth(), "composed route tree");
        Ok(tree)
    }
}

fn compose_level<P>(
    base: Vec<RouteDefinition<P>>,
    features: Vec<Vec<RouteDefinition<P>>>,
    parent: &str,
    depth: usize,
) -> Result<Vec<Route<P>>, RouteError> {
    let count = base.len() + features.iter().map(Vec::len).sum::<usize>();
    if count == 0 {
        return Ok(Vec::new());
    }
    if depth > MAX_DEPTH {
        return Err(RouteError::DepthExceeded {
            depth,
            max: MAX_DEPTH,
        });
    }
    if count > MAX_ROUTES_PER_LEVEL {
        return Err(RouteError::TooManyRoutes {
            count,
            max: MAX_ROUTES_PER_LEVEL,
        });
    }

    let mut routes = Vec::with_capacity(count);
    let mut wildcards = Vec::new();
    for def in base.into_iter().chain(features.into_iter().flatten()) {
        let route = compile_route(def, parent, depth)?;
        if route.is_wildcard() {
            wildcards.push(route);
        } else {
            routes.push(route);
        }
    }

    if wildcards.len() > 1 {
        return Err(RouteError::AmbiguousWildcard {
            level: if parent.is_empty() { "/".to_owned() } else { parent.to_owned() },
            count: wildcards.len(),
        });
    }
    routes.append(&mut wildcards);
    Ok(routes)
}

fn compile_route<P>(
    def: RouteDefinition<P>,
    parent: &str,
    depth: usize,
) -> Result<Route<P>, RouteError> {
    let matcher = match def.route_match {
        RouteMatch::Path(pattern) => CompiledMatch::Pattern(CompiledPattern::compile(&pattern)?),
        RouteMatch::Matcher(matcher) => CompiledMatch::Custom(matcher),
    };
    let full_path = match &matcher {
        CompiledMatch::Pattern(p) if p.is_empty() => parent.to_owned(),
        CompiledMatch::Pattern(p) => format!("{parent}/{}", p.source()),
        CompiledMatch::Custom(m) => format!("{parent}/{{{m:?}}}"),
    };

    let invalid = |reason: &str| RouteError::InvalidRoute {
        path: if full_path.is_empty() { "/".to_owned() } else { full_path.clone() },
        reason: reason.to_owned(),
    };

    let has_children =
        !def.children.is_empty() || def.feature_routes.iter().any(|list| !list.is_empty());
    let is_wildcard = matches!(&matcher, CompiledMatch::Pattern(p) if p.is_wildcard());

    if def.redirect_to.is_some() && has_children {
        return Err(invalid("a redirect route cannot have children"));
    }
    if is_wildcard && has_children {
        return Err(invalid("a wildcard route cannot have children"));
    }
    if def.redirect_to.is_none() && def.payload.is_none() && !has_children {
        return Err(invalid("route has no payload, redirect or children"));
    }

    let redirect = match &def.redirect_to {
        Some(target) => Some(RedirectTarget::compile(target)?),
        None => None,
    };

    if redirect.is_some()
        && def.strategy == MatchStrategy::Prefix
        && matches!(&matcher, CompiledMatch::Pattern(p) if p.is_empty())
    {
        let path = if full_path.is_empty() { "/" } else { full_path.as_str() };
        tracing::warn!(
            path,
            target = def.redirect_to.as_deref().unwrap_or_default(),
            "empty-path prefix redirect matches every URL at its level; consider `full`"
        );
    }

    let children = compose_level(def.children, def.feature_routes, &full_path, depth + 1)?;

    Ok(Route {
        matcher,
        strategy: def.strategy,
        redirect,
        children,
        payload: def.payload,
        full_path,
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// Route / RouteTree
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
enum CompiledMatch {
    Pattern(CompiledPattern),
    Custom(Arc<dyn SegmentMatcher>),
}

/// A composed, validated route.
#[derive(Debug, Clone)]
pub struct Route<P> {
    matcher: CompiledMatch,
    strategy: MatchStrategy,
    redirect: Option<RedirectTarget>,
    children: Vec<Route<P>>,
    payload: Option<P>,
    full_path: String,
}

impl<P> Route<P> {
    /// The compiled pattern, or `None` for a custom-matcher route.
    #[must_use]
    pub fn pattern(&self) -> Option<&CompiledPattern> {
        match &self.matcher {
            CompiledMatch::Pattern(p) => Some(p),
            CompiledMatch::Custom(_) => None,
        }
    }

    /// The custom matcher, or `None` for a pattern route.
    #[must_use]
    pub fn custom_matcher(&self) -> Option<&Arc<dyn SegmentMatcher>> {
        match &self.matcher {
            CompiledMatch::Pattern(_) => None,
            CompiledMatch::Custom(m) => Some(m),
        }
    }

    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.pattern().is_some_and(CompiledPattern::is_wildcard)
    }

    #[must_use]
    pub fn strategy(&self) -> MatchStrategy {
        self.strategy
    }

    #[must_use]
    pub fn redirect(&self) -> Option<&RedirectTarget> {
        self.redirect.as_ref()
    }

    #[must_use]
    pub fn children(&self) -> &[Route<P>] {
        &self.children
    }

    #[must_use]
    pub fn payload(&self) -> Option<&P> {
        self.payload.as_ref()
    }

    /// Parent patterns joined with `/` (`"/admin/users/:id"`). Custom matchers
    /// appear as `{Debug}`. The empty pattern adds nothing.
    #[must_use]
    pub fn full_path(&self) -> &str {
        if self.full_path.is_empty() {
            "/"
        } else {
            &self.full_path
        }
    }

    /// Short human-readable form used in traces and logs.
    #[must_use]
    pub fn describe(&self) -> String {
        let matcher = match &self.matcher {
            CompiledMatch::Pattern(p) => format!("{:?}", p.source()),
            CompiledMatch::Custom(m) => format!("{m:?}"),
        };
        match &self.redirect {
            Some(target) => format!("{matcher} -> {}", target.source()),
            None => matcher,
        }
    }

    pub(crate) fn match_segments(&self, segments: &[UrlSegment]) -> Option<MatcherOutcome> {
        match &self.matcher {
            CompiledMatch::Pattern(p) => p.match_segments(segments),
            CompiledMatch::Custom(m) => m.match_segments(segments),
        }
    }

    fn depth(&self) -> usize {
        1 + self.children.iter().map(Route::depth).max().unwrap_or(0)
    }
}

/// An immutable composed route tree.
///
/// Built by [`Composer::compose`]. Resolution methods live in the resolver
/// module ([`RouteTree::resolve`] and friends). `Send + Sync` whenever `P` is.
#[derive(Debug, Clone)]
pub struct RouteTree<P> {
    pub(crate) routes: Vec<Route<P>>,
}

impl<P> RouteTree<P> {
    /// Compose a tree from a single route list. Shorthand for
    /// `Composer::new(routes).compose()`.
    ///
    /// # Errors
    ///
    /// See [`Composer::compose`].
    pub fn new(routes: Vec<RouteDefinition<P>>) -> Result<Self, RouteError> {
        Composer::new(routes).compose()
    }

    /// Root-level routes in scan order.
    #[must_use]
    pub fn routes(&self) -> &[Route<P>] {
        &self.routes
    }

    /// Number of root-level routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Deepest nesting level (`0` for an empty tree).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.routes.iter().map(Route::depth).max().unwrap_or(0)
    }
}

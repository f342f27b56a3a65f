//! routeweave - ordered URL route resolution
//!
//! Given an ordered configuration of route definitions and an incoming URL,
//! routeweave determines which definition matches, extracts parameters, and
//! follows redirects.
//!
//! # Architecture
//!
//! Data flows one way: raw configuration → composed tree → resolver → match.
//!
//! - [`RouteDefinition<P>`] — Raw, builder-friendly route entry (pattern or custom matcher)
//! - [`Composer<P>`] — Merges base and feature route lists, validates, compiles patterns
//! - [`RouteTree<P>`] — Immutable composed tree, shareable across threads
//! - [`ResolvedMatch`] — Matched definitions per level, parameters, redirects followed
//! - [`SegmentMatcher`] — Escape hatch for matching beyond the pattern grammar
//!
//! # Key Design Insights
//!
//! 1. **Pattern XOR matcher**: [`RouteMatch`] is an enum, so a definition can never
//!    carry both a pattern and a custom matcher.
//!
//! 2. **Wildcard last**: composition always moves the single `**` route of a level
//!    behind every other route, including routes merged from feature lists.
//!
//! 3. **No backtracking**: once a route with children is chosen, failure of its
//!    children fails the resolution. Later siblings are never retried.
//!
//! # Example
//!
//! ```
//! use routeweave::prelude::*;
//!
//! let tree: RouteTree<&str> = Composer::new(vec![
//!     RouteDefinition::path("").redirect_to("/heroes").full(),
//!     RouteDefinition::path("heroes").payload("HeroList"),
//!     RouteDefinition::path("hero/:id").payload("HeroDetail"),
//!     RouteDefinition::path("**").payload("PageNotFound"),
//! ])
//! .compose()
//! .unwrap();
//!
//! let matched = tree.resolve("/hero/42").unwrap();
//! assert_eq!(matched.payload(), Some(&"HeroDetail"));
//! assert_eq!(matched.param("id"), Some("42"));
//!
//! let matched = tree.resolve("/").unwrap();
//! assert_eq!(matched.payload(), Some(&"HeroList"));
//! assert_eq!(matched.redirects(), ["/heroes"]);
//! ```

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod composer;
mod pattern;
mod redirect;
mod resolver;
mod route;
mod segment_matcher;
mod trace;
mod url;

#[cfg(feature = "registry")]
mod config;
#[cfg(feature = "registry")]
mod registry;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

// Core types
pub use composer::{Composer, Route, RouteTree};
pub use pattern::{CompiledPattern, PatternToken};
pub use redirect::RedirectTarget;
pub use resolver::{MatchedLevel, ResolvedMatch};
pub use route::{MatchStrategy, RouteDefinition, RouteMatch};
pub use segment_matcher::{FnMatcher, MatcherOutcome, RegexSegmentMatcher, SegmentMatcher};
pub use url::{Url, UrlSegment};

// Registry (feature-gated)
#[cfg(feature = "registry")]
pub use config::{RegexSegmentMatcherConfig, RouteConfig, RouteDefinitionConfig, TypedConfig};
#[cfg(feature = "registry")]
pub use registry::{register_core_matchers, IntoSegmentMatcher, Registry, RegistryBuilder};

// Trace types
pub use trace::{CandidateOutcome, CandidateTrace, ResolveTrace};

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use routeweave::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Trace types
        CandidateOutcome,
        CandidateTrace,
        // Core types
        Composer,
        FnMatcher,
        MatchStrategy,
        MatchedLevel,
        MatcherOutcome,
        RegexSegmentMatcher,
        ResolveTrace,
        ResolvedMatch,
        Route,
        RouteDefinition,
        // Errors
        RouteError,
        RouteMatch,
        RouteTree,
        // Traits
        SegmentMatcher,
        Url,
        UrlSegment,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum nesting depth of a composed route tree.
///
/// The resolver recurses once per level, so this also bounds its stack use.
/// Enforced by [`Composer::compose`].
pub const MAX_DEPTH: usize = 32;

/// Maximum number of sibling routes in a single composed level.
pub const MAX_ROUTES_PER_LEVEL: usize = 512;

/// Maximum number of redirects followed during one resolution.
///
/// Loops that revisit a URL fail earlier with [`RouteError::RedirectLoop`];
/// this limit catches chains that grow without repeating.
pub const MAX_REDIRECTS: usize = 16;

/// Maximum length of a path pattern or redirect target.
pub const MAX_PATTERN_LENGTH: usize = 2048;

/// Maximum length for regex patterns used by [`RegexSegmentMatcher`].
pub const MAX_REGEX_PATTERN_LENGTH: usize = 1024;

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors from composition and resolution.
///
/// Everything except [`NoRouteMatched`](Self::NoRouteMatched),
/// [`RedirectLoop`](Self::RedirectLoop), [`RedirectLimitExceeded`](Self::RedirectLimitExceeded)
/// and [`UnboundRedirectParam`](Self::UnboundRedirectParam) is raised while composing,
/// never while resolving.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// The scan exhausted a sibling list without a match.
    #[error("no route matched \"{url}\"")]
    NoRouteMatched {
        /// The URL being resolved when matching failed (after redirects).
        url: String,
    },

    /// A path pattern or redirect target is not valid.
    #[error("malformed pattern \"{pattern}\": {reason}")]
    MalformedPattern {
        /// The offending pattern.
        pattern: String,
        /// What is wrong with it.
        reason: String,
    },

    /// More than one `**` route ended up in the same composed level.
    #[error(
        "{count} wildcard routes declared under \"{level}\" — only one `**` route is allowed per level"
    )]
    AmbiguousWildcard {
        /// Path of the parent route (`"/"` for the root level).
        level: String,
        /// Number of wildcard routes found.
        count: usize,
    },

    /// A chain of redirects revisited a URL.
    #[error("redirect loop: {}", chain.join(" -> "))]
    RedirectLoop {
        /// Every URL visited, ending with the repeated one.
        chain: Vec<String>,
    },

    /// More redirects than [`MAX_REDIRECTS`] were followed.
    #[error("followed more than {max} redirects, last target \"{last}\"")]
    RedirectLimitExceeded {
        /// Maximum allowed.
        max: usize,
        /// The last redirect target produced.
        last: String,
    },

    /// A redirect target references a parameter the match did not bind.
    #[error("cannot redirect to \"{target}\": parameter \":{param}\" is not bound")]
    UnboundRedirectParam {
        /// The redirect target as configured.
        target: String,
        /// The missing parameter name.
        param: String,
    },

    /// A route definition combines fields in an unsupported way.
    #[error("invalid route \"{path}\": {reason}")]
    InvalidRoute {
        /// Full path of the route (parents joined with `/`).
        path: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A regex for a [`RegexSegmentMatcher`] failed to compile.
    #[error("invalid regex \"{pattern}\": {reason}")]
    InvalidRegex {
        /// The regex source.
        pattern: String,
        /// The underlying error message.
        reason: String,
    },

    /// A pattern exceeds [`MAX_PATTERN_LENGTH`] or [`MAX_REGEX_PATTERN_LENGTH`].
    #[error("pattern length is {len}, but maximum allowed is {max}")]
    PatternTooLong {
        /// Actual length.
        len: usize,
        /// Maximum allowed.
        max: usize,
    },

    /// Route nesting exceeds [`MAX_DEPTH`].
    #[error(
        "route nesting depth is {depth}, but maximum allowed is {max} — flatten your route tree"
    )]
    DepthExceeded {
        /// Depth reached.
        depth: usize,
        /// Maximum allowed.
        max: usize,
    },

    /// A composed level has more than [`MAX_ROUTES_PER_LEVEL`] routes.
    #[error("route level has {count} routes, but maximum allowed is {max}")]
    TooManyRoutes {
        /// Actual count.
        count: usize,
        /// Maximum allowed.
        max: usize,
    },

    /// Configuration deserialization or construction failed.
    #[error("invalid config: {reason}")]
    InvalidConfig {
        /// The underlying error message.
        reason: String,
    },

    /// A matcher type URL was not found in the registry.
    #[error("unknown matcher type URL \"{type_url}\"{}", available_suffix(available))]
    UnknownTypeUrl {
        /// The unregistered type URL.
        type_url: String,
        /// Type URLs that ARE registered (sorted).
        available: Vec<String>,
    },
}

impl RouteError {
    /// The variant name, stable for matching in fixtures and tooling.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NoRouteMatched { .. } => "NoRouteMatched",
            Self::MalformedPattern { .. } => "MalformedPattern",
            Self::AmbiguousWildcard { .. } => "AmbiguousWildcard",
            Self::RedirectLoop { .. } => "RedirectLoop",
            Self::RedirectLimitExceeded { .. } => "RedirectLimitExceeded",
            Self::UnboundRedirectParam { .. } => "UnboundRedirectParam",
            Self::InvalidRoute { .. } => "InvalidRoute",
            Self::InvalidRegex { .. } => "InvalidRegex",
            Self::PatternTooLong { .. } => "PatternTooLong",
            Self::DepthExceeded { .. } => "DepthExceeded",
            Self::TooManyRoutes { .. } => "TooManyRoutes",
            Self::InvalidConfig { .. } => "InvalidConfig",
            Self::UnknownTypeUrl { .. } => "UnknownTypeUrl",
        }
    }
}

fn available_suffix(available: &[String]) -> String {
    if available.is_empty() {
        " — no matcher types are registered".to_owned()
    } else {
        format!(" — registered: {}", available.join(", "))
    }
}

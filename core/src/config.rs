//! Config types for data-driven route trees.
//!
//! These types mirror [`RouteDefinition`](crate::RouteDefinition) but are
//! serde-deserializable, so a route tree can come from JSON or YAML via
//! [`Registry::load_routes()`](crate::Registry::load_routes).
//!
//! # Relationship to runtime types
//!
//! | Config type | Runtime type | Loader method |
//! |-------------|-------------|---------------|
//! | [`RouteConfig`] | [`RouteTree`](crate::RouteTree) | `Registry::load_routes()` |
//! | [`RouteDefinitionConfig`] | [`RouteDefinition`](crate::RouteDefinition) | `Registry::load_definitions()` |
//! | [`TypedConfig`] | `Arc<dyn SegmentMatcher>` | via registry factory |
//!
//! # Shape
//!
//! ```yaml
//! routes:
//!   - path: ""
//!     redirect_to: /start
//!     path_match: full
//!   - path: start
//!     payload: Start
//!   - matcher:
//!       type_url: routeweave.core.v1.RegexSegmentMatcher
//!       config: { pattern: '^\d+$', param: id, exact: true }
//!     payload: Numeric
//! feature_routes:
//!   - - path: extra
//!       payload: Extra
//! ```

use serde::Deserialize;

use crate::MatchStrategy;

/// Configuration for a whole [`RouteTree`](crate::RouteTree).
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "P: Deserialize<'de>"))]
#[serde(deny_unknown_fields)]
pub struct RouteConfig<P> {
    /// Root-level routes, in order.
    pub routes: Vec<RouteDefinitionConfig<P>>,

    /// Feature lists merged into the root level after `routes`.
    #[serde(default, alias = "featureRoutes")]
    pub feature_routes: Vec<Vec<RouteDefinitionConfig<P>>>,
}

/// Configuration for a [`RouteDefinition`](crate::RouteDefinition).
///
/// `path` and `matcher` are mutually exclusive; omitting both means the
/// empty path.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "P: Deserialize<'de>"))]
#[serde(deny_unknown_fields)]
pub struct RouteDefinitionConfig<P> {
    /// Path pattern.
    #[serde(default)]
    pub path: Option<String>,

    /// Custom matcher, resolved through the registry.
    #[serde(default)]
    pub matcher: Option<TypedConfig>,

    /// `prefix` (default) or `full`.
    #[serde(default, alias = "pathMatch")]
    pub path_match: MatchStrategy,

    /// Redirect target.
    #[serde(default, alias = "redirectTo")]
    pub redirect_to: Option<String>,

    /// Nested routes.
    #[serde(default)]
    pub children: Vec<RouteDefinitionConfig<P>>,

    /// Feature lists merged into `children`.
    #[serde(default, alias = "featureRoutes")]
    pub feature_routes: Vec<Vec<RouteDefinitionConfig<P>>>,

    /// Opaque caller data.
    #[serde(default)]
    pub payload: Option<P>,
}

/// Reference to a registered matcher type with its configuration.
///
/// Maps to xDS `TypedExtensionConfig`:
/// - `type_url` identifies the registered type
/// - `config` carries the type-specific configuration payload
#[derive(Debug, Clone, Deserialize)]
pub struct TypedConfig {
    /// Must match a `type_url` registered in the [`Registry`](crate::Registry).
    pub type_url: String,

    /// Deserialized as the `Config` associated type of the registered
    /// [`IntoSegmentMatcher`](crate::IntoSegmentMatcher).
    #[serde(default = "default_config")]
    pub config: serde_json::Value,
}

fn default_config() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

/// Configuration for [`RegexSegmentMatcher`](crate::RegexSegmentMatcher).
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegexSegmentMatcherConfig {
    /// The regex tested against the first remaining segment.
    pub pattern: String,

    /// Bind the whole segment under this name.
    #[serde(default)]
    pub param: Option<String>,

    /// Only match when exactly one segment remains.
    #[serde(default)]
    pub exact: bool,
}

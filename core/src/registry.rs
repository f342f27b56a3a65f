//! Type registry for config-driven route trees.
//!
//! The registry turns [`RouteConfig`] (JSON/YAML) into a composed
//! [`RouteTree`] without route-specific compile code. Custom matchers are
//! referenced by type URL and constructed by registered factories.
//!
//! # Architecture (axum `BoxedIntoRoute` pattern)
//!
//! Each matcher type registers itself via [`IntoSegmentMatcher`]. At
//! registration time the concrete type `T` is monomorphized into a closure and
//! erased behind `Box<dyn Fn>`: early type erasure at registration, late
//! invocation at load time.
//!
//! # Example
//!
//! ```
//! use routeweave::{register_core_matchers, RegistryBuilder, RouteConfig};
//!
//! let registry = register_core_matchers(RegistryBuilder::new()).build();
//!
//! let config: RouteConfig<String> = serde_json::from_str(r#"{
//!     "routes": [
//!         { "path": "", "redirect_to": "/items", "path_match": "full" },
//!         { "path": "items", "payload": "ItemList" },
//!         { "path": "items",
//!           "children": [{
//!             "matcher": {
//!               "type_url": "routeweave.core.v1.RegexSegmentMatcher",
//!               "config": { "pattern": "^\\d+$", "param": "id", "exact": true }
//!             },
//!             "payload": "ItemDetail"
//!           }] }
//!     ]
//! }"#).unwrap();
//!
//! let tree = registry.load_routes(config).unwrap();
//! let matched = tree.resolve("/items/7").unwrap();
//! assert_eq!(matched.payload().map(String::as_str), Some("ItemDetail"));
//! assert_eq!(matched.param("id"), Some("7"));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::{
    config::{RegexSegmentMatcherConfig, RouteConfig, RouteDefinitionConfig, TypedConfig},
    Composer, RegexSegmentMatcher, RouteDefinition, RouteError, RouteMatch, RouteTree,
    SegmentMatcher,
};

// ═══════════════════════════════════════════════════════════════════════════════
// Traits
// ═══════════════════════════════════════════════════════════════════════════════

/// Trait for [`SegmentMatcher`] types that can be constructed from configuration.
///
/// Each matcher type knows its own config shape via the associated `Config`
/// type. The registry calls [`from_config`](Self::from_config) at load time.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use routeweave::{IntoSegmentMatcher, MatcherOutcome, RouteError, SegmentMatcher, UrlSegment};
///
/// #[derive(Debug)]
/// struct MinSegments(usize);
///
/// impl SegmentMatcher for MinSegments {
///     fn match_segments(&self, segments: &[UrlSegment]) -> Option<MatcherOutcome> {
///         (segments.len() >= self.0).then(|| MatcherOutcome::consumed(self.0))
///     }
/// }
///
/// #[derive(serde::Deserialize)]
/// struct MinSegmentsConfig {
///     min: usize,
/// }
///
/// impl IntoSegmentMatcher for MinSegments {
///     type Config = MinSegmentsConfig;
///     fn from_config(config: Self::Config) -> Result<Arc<dyn SegmentMatcher>, RouteError> {
///         Ok(Arc::new(MinSegments(config.min)))
///     }
/// }
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be built from configuration",
    label = "missing `IntoSegmentMatcher` implementation",
    note = "implement `IntoSegmentMatcher` with a `Config: DeserializeOwned` type to register it by type URL"
)]
pub trait IntoSegmentMatcher: Send + Sync + 'static {
    /// The configuration type deserialized from JSON/YAML.
    type Config: DeserializeOwned + Send + Sync;

    /// Construct a matcher from deserialized configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidConfig`] if the config is semantically
    /// invalid, or [`RouteError::InvalidRegex`] for a bad regex.
    fn from_config(config: Self::Config) -> Result<Arc<dyn SegmentMatcher>, RouteError>;
}

impl IntoSegmentMatcher for RegexSegmentMatcher {
    type Config = RegexSegmentMatcherConfig;

    fn from_config(config: Self::Config) -> Result<Arc<dyn SegmentMatcher>, RouteError> {
        let mut matcher = RegexSegmentMatcher::new(&config.pattern)?;
        if let Some(param) = config.param {
            if param.is_empty() {
                return Err(RouteError::InvalidConfig {
                    reason: "RegexSegmentMatcher `param` must not be empty".to_owned(),
                });
            }
            matcher = matcher.bind(param);
        }
        if config.exact {
            matcher = matcher.exact();
        }
        Ok(Arc::new(matcher))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Type-erased factories
// ═══════════════════════════════════════════════════════════════════════════════

/// Type-erased matcher factory closure.
type BoxedMatcherFactory =
    Box<dyn Fn(&serde_json::Value) -> Result<Arc<dyn SegmentMatcher>, RouteError> + Send + Sync>;

// ═══════════════════════════════════════════════════════════════════════════════
// Builder
// ═══════════════════════════════════════════════════════════════════════════════

/// Builder for constructing a [`Registry`].
///
/// Register matcher types with their type URLs, then call
/// [`build()`](Self::build) to produce an immutable `Registry`. No runtime
/// registration is possible afterwards.
pub struct RegistryBuilder {
    matcher_factories: HashMap<String, BoxedMatcherFactory>,
}

impl RegistryBuilder {
    /// Create a new empty registry builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            matcher_factories: HashMap::new(),
        }
    }

    /// Register a matcher type with a type URL.
    ///
    /// Registering the same URL twice keeps the later factory.
    #[must_use]
    pub fn matcher<T: IntoSegmentMatcher>(mut self, type_url: &str) -> Self {
        self.matcher_factories.insert(
            type_url.to_owned(),
            Box::new(|value: &serde_json::Value| {
                let config: T::Config = serde_json::from_value(value.clone()).map_err(|e| {
                    RouteError::InvalidConfig {
                        reason: e.to_string(),
                    }
                })?;
                T::from_config(config)
            }),
        );
        self
    }

    /// Freeze the registry.
    #[must_use]
    pub fn build(self) -> Registry {
        tracing::debug!(matchers = self.matcher_factories.len(), "registry built");
        Registry {
            matcher_factories: self.matcher_factories,
        }
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Register the core built-in matchers (`RegexSegmentMatcher`).
///
/// Call this in extension `register()` functions to avoid duplicating core
/// registrations.
#[must_use]
pub fn register_core_matchers(builder: RegistryBuilder) -> RegistryBuilder {
    builder.matcher::<RegexSegmentMatcher>("routeweave.core.v1.RegexSegmentMatcher")
}

// ═══════════════════════════════════════════════════════════════════════════════
// Registry
// ═══════════════════════════════════════════════════════════════════════════════

/// Immutable registry of matcher factories.
///
/// Constructed via [`RegistryBuilder`]. Use [`load_routes()`](Self::load_routes)
/// to compile config into a [`RouteTree`].
pub struct Registry {
    matcher_factories: HashMap<String, BoxedMatcherFactory>,
}

impl Registry {
    /// Load and compose a route tree from configuration.
    ///
    /// # Errors
    ///
    /// - [`RouteError::InvalidConfig`] — `path` and `matcher` both set, or a
    ///   matcher config failed to deserialize
    /// - [`RouteError::UnknownTypeUrl`] — matcher `type_url` not registered
    /// - anything [`Composer::compose`] reports
    pub fn load_routes<P>(&self, config: RouteConfig<P>) -> Result<RouteTree<P>, RouteError> {
        let mut composer = Composer::new(self.load_definitions(config.routes)?);
        for list in config.feature_routes {
            composer = composer.merge(self.load_definitions(list)?);
        }
        composer.compose()
    }

    /// Convert config entries into definitions without composing them.
    ///
    /// # Errors
    ///
    /// See [`load_routes()`](Self::load_routes), minus composition errors.
    pub fn load_definitions<P>(
        &self,
        configs: Vec<RouteDefinitionConfig<P>>,
    ) -> Result<Vec<RouteDefinition<P>>, RouteError> {
        configs
            .into_iter()
            .map(|c| self.load_definition(c))
            .collect()
    }

    /// Returns the number of registered matcher types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.matcher_factories.len()
    }

    /// Returns `true` if no types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matcher_factories.is_empty()
    }

    /// Returns `true` if the given matcher type URL is registered.
    #[must_use]
    pub fn contains_matcher(&self, type_url: &str) -> bool {
        self.matcher_factories.contains_key(type_url)
    }

    /// Returns all registered matcher type URLs (sorted).
    #[must_use]
    pub fn matcher_type_urls(&self) -> Vec<&str> {
        let mut urls: Vec<&str> = self.matcher_factories.keys().map(String::as_str).collect();
        urls.sort_unstable();
        urls
    }

    fn load_definition<P>(
        &self,
        config: RouteDefinitionConfig<P>,
    ) -> Result<RouteDefinition<P>, RouteError> {
        let route_match = match (config.path, config.matcher) {
            (Some(path), Some(matcher)) => {
                return Err(RouteError::InvalidConfig {
                    reason: format!(
                        "route \"{path}\" sets both `path` and `matcher` ({})",
                        matcher.type_url
                    ),
                })
            }
            (None, Some(matcher)) => RouteMatch::Matcher(self.load_matcher(&matcher)?),
            (Some(path), None) => RouteMatch::Path(path),
            (None, None) => RouteMatch::default(),
        };

        let children = self.load_definitions(config.children)?;
        let feature_routes = config
            .feature_routes
            .into_iter()
            .map(|list| self.load_definitions(list))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RouteDefinition {
            route_match,
            strategy: config.path_match,
            redirect_to: config.redirect_to,
            children,
            feature_routes,
            payload: config.payload,
        })
    }

    fn load_matcher(&self, config: &TypedConfig) -> Result<Arc<dyn SegmentMatcher>, RouteError> {
        let factory = self.matcher_factories.get(&config.type_url).ok_or_else(|| {
            RouteError::UnknownTypeUrl {
                type_url: config.type_url.clone(),
                available: self
                    .matcher_type_urls()
                    .into_iter()
                    .map(str::to_owned)
                    .collect(),
            }
        })?;
        factory(&config.config)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("matchers", &self.matcher_type_urls())
            .finish()
    }
}

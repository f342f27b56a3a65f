//! routeweave-test: Test domain for conformance testing
//!
//! Provides small, predictable [`SegmentMatcher`] implementations used by the
//! YAML conformance fixtures. This is also the reference extension showing
//! how to plug custom matchers into the registry.
//!
//! # Example
//!
//! ```
//! use routeweave_test::prelude::*;
//!
//! let numeric = NumericMatcher::new("id");
//! let outcome = numeric.match_segments(&[UrlSegment::new("123")]).unwrap();
//! assert_eq!(outcome.consumed, 1);
//! assert_eq!(outcome.params["id"].path(), "123");
//!
//! assert!(numeric.match_segments(&[UrlSegment::new("abc")]).is_none());
//! ```

use routeweave::prelude::*;

#[cfg(feature = "fixtures")]
pub mod fixture;

/// Matches exactly one remaining segment made of ASCII digits and binds it.
#[derive(Debug, Clone)]
pub struct NumericMatcher {
    param: String,
}

impl NumericMatcher {
    /// Create a matcher binding the segment to `param`.
    pub fn new(param: impl Into<String>) -> Self {
        Self {
            param: param.into(),
        }
    }
}

impl SegmentMatcher for NumericMatcher {
    fn match_segments(&self, segments: &[UrlSegment]) -> Option<MatcherOutcome> {
        match segments {
            [only] if !only.path().is_empty() && only.path().bytes().all(|b| b.is_ascii_digit()) => {
                Some(MatcherOutcome::consumed(1).with_param(self.param.clone(), only.clone()))
            }
            _ => None,
        }
    }
}

/// Matches a leading `@handle` segment, binding the handle without the `@`.
///
/// Consumes one segment and leaves the rest for children.
#[derive(Debug, Clone)]
pub struct HandleMatcher {
    param: String,
}

impl HandleMatcher {
    /// Create a matcher binding the handle to `param`.
    pub fn new(param: impl Into<String>) -> Self {
        Self {
            param: param.into(),
        }
    }
}

impl SegmentMatcher for HandleMatcher {
    fn match_segments(&self, segments: &[UrlSegment]) -> Option<MatcherOutcome> {
        let first = segments.first()?;
        let handle = first.path().strip_prefix('@').filter(|h| !h.is_empty())?;
        Some(MatcherOutcome::consumed(1).with_param(self.param.clone(), first.with_path(handle)))
    }
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{HandleMatcher, NumericMatcher};
    pub use routeweave::prelude::*;
}

// ═══════════════════════════════════════════════════════════════════════════════
// Registry support (feature = "registry")
// ═══════════════════════════════════════════════════════════════════════════════

/// Configuration shared by [`NumericMatcher`] and [`HandleMatcher`].
#[cfg(feature = "registry")]
#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParamMatcherConfig {
    /// Parameter name to bind.
    pub param: String,
}

#[cfg(feature = "registry")]
fn checked_param(config: ParamMatcherConfig) -> Result<String, RouteError> {
    if config.param.is_empty() {
        return Err(RouteError::InvalidConfig {
            reason: "`param` must not be empty".to_owned(),
        });
    }
    Ok(config.param)
}

#[cfg(feature = "registry")]
impl routeweave::IntoSegmentMatcher for NumericMatcher {
    type Config = ParamMatcherConfig;

    fn from_config(
        config: Self::Config,
    ) -> Result<std::sync::Arc<dyn SegmentMatcher>, RouteError> {
        Ok(std::sync::Arc::new(NumericMatcher::new(checked_param(config)?)))
    }
}

#[cfg(feature = "registry")]
impl routeweave::IntoSegmentMatcher for HandleMatcher {
    type Config = ParamMatcherConfig;

    fn from_config(
        config: Self::Config,
    ) -> Result<std::sync::Arc<dyn SegmentMatcher>, RouteError> {
        Ok(std::sync::Arc::new(HandleMatcher::new(checked_param(config)?)))
    }
}

/// Register all routeweave-test types with the given builder.
///
/// Registers the core matchers plus:
/// - `routeweave.test.v1.NumericMatcher` → [`NumericMatcher`]
/// - `routeweave.test.v1.HandleMatcher` → [`HandleMatcher`]
#[cfg(feature = "registry")]
#[must_use]
pub fn register(builder: routeweave::RegistryBuilder) -> routeweave::RegistryBuilder {
    routeweave::register_core_matchers(builder)
        .matcher::<NumericMatcher>("routeweave.test.v1.NumericMatcher")
        .matcher::<HandleMatcher>("routeweave.test.v1.HandleMatcher")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments(url: &str) -> Vec<UrlSegment> {
        Url::parse(url).segments().to_vec()
    }

    #[test]
    fn test_numeric_single_segment() {
        let m = NumericMatcher::new("id");
        let outcome = m.match_segments(&segments("123")).unwrap();
        assert_eq!(outcome.consumed, 1);
        assert_eq!(outcome.params["id"].path(), "123");
    }

    #[test]
    fn test_numeric_rejects() {
        let m = NumericMatcher::new("id");
        assert!(m.match_segments(&segments("abc")).is_none());
        assert!(m.match_segments(&segments("12a")).is_none());
        assert!(m.match_segments(&segments("123/456")).is_none());
        assert!(m.match_segments(&[]).is_none());
        assert!(m.match_segments(&[UrlSegment::new("")]).is_none());
    }

    #[test]
    fn test_handle_strips_at() {
        let m = HandleMatcher::new("user");
        let outcome = m.match_segments(&segments("@bob;tab=posts/extra")).unwrap();
        assert_eq!(outcome.consumed, 1);
        assert_eq!(outcome.params["user"].path(), "bob");
        assert_eq!(outcome.params["user"].parameter("tab"), Some("posts"));
    }

    #[test]
    fn test_handle_rejects() {
        let m = HandleMatcher::new("user");
        assert!(m.match_segments(&segments("bob")).is_none());
        assert!(m.match_segments(&segments("@")).is_none());
        assert!(m.match_segments(&[]).is_none());
    }

    #[test]
    fn test_numeric_route() {
        let tree = RouteTree::new(vec![
            RouteDefinition::matcher(NumericMatcher::new("id")).payload("Numeric"),
            RouteDefinition::path("**").payload("Other"),
        ])
        .unwrap();
        assert_eq!(tree.resolve("123").unwrap().payload(), Some(&"Numeric"));
        assert_eq!(tree.resolve("abc").unwrap().payload(), Some(&"Other"));
        assert_eq!(tree.resolve("123/456").unwrap().payload(), Some(&"Other"));
    }
}

#[cfg(all(test, feature = "registry"))]
mod registry_tests {
    use super::*;
    use routeweave::{RegistryBuilder, RouteConfig};

    #[test]
    fn register_adds_test_matchers() {
        let registry = register(RegistryBuilder::new()).build();
        assert!(registry.contains_matcher("routeweave.core.v1.RegexSegmentMatcher"));
        assert!(registry.contains_matcher("routeweave.test.v1.NumericMatcher"));
        assert!(registry.contains_matcher("routeweave.test.v1.HandleMatcher"));
    }

    #[test]
    fn load_routes_with_test_matchers() {
        let registry = register(RegistryBuilder::new()).build();
        let config: RouteConfig<String> = serde_json::from_value(serde_json::json!({
            "routes": [
                {
                    "matcher": {
                        "type_url": "routeweave.test.v1.HandleMatcher",
                        "config": { "param": "user" }
                    },
                    "children": [
                        { "payload": "Profile" },
                        {
                            "matcher": {
                                "type_url": "routeweave.test.v1.NumericMatcher",
                                "config": { "param": "post" }
                            },
                            "payload": "Post"
                        }
                    ]
                }
            ]
        }))
        .unwrap();
        let tree = registry.load_routes(config).unwrap();

        let m = tree.resolve("@ann/42").unwrap();
        assert_eq!(m.payload().map(String::as_str), Some("Post"));
        assert_eq!(m.param("user"), Some("ann"));
        assert_eq!(m.param("post"), Some("42"));

        let m = tree.resolve("@ann").unwrap();
        assert_eq!(m.payload().map(String::as_str), Some("Profile"));
    }

    #[test]
    fn empty_param_is_rejected() {
        let registry = register(RegistryBuilder::new()).build();
        let config: RouteConfig<String> = serde_json::from_value(serde_json::json!({
            "routes": [{
                "matcher": { "type_url": "routeweave.test.v1.NumericMatcher", "config": { "param": "" } },
                "payload": "X"
            }]
        }))
        .unwrap();
        assert!(matches!(
            registry.load_routes(config),
            Err(RouteError::InvalidConfig { .. })
        ));
    }
}

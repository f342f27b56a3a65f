//! Conformance test fixture runner
//!
//! Loads YAML fixtures in the registry config format and runs them through
//! the production loading path: YAML → `RouteConfig<String>` →
//! `Registry::load_routes()` → `RouteTree::resolve()`.
//!
//! ```yaml
//! name: literal routes
//! description: exact literal paths
//! config:
//!   routes:
//!     - { path: heroes, payload: HeroList }
//! cases:
//!   - name: exact literal
//!     url: /heroes
//!     expect: { payload: HeroList, consumed: [1] }
//!   - name: unknown path
//!     url: /villains
//!     expect: { error: NoRouteMatched }
//! ```
//!
//! A fixture whose configuration must be rejected sets `expect_error` to the
//! expected [`RouteError::kind`] and has no cases.

use std::collections::BTreeMap;

use routeweave::{Registry, RouteConfig, RouteError, RouteTree};
use serde::Deserialize;

/// A complete test fixture.
#[derive(Debug, Deserialize)]
pub struct Fixture {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Raw config, deserialized as `RouteConfig<String>` at run time.
    pub config: serde_json::Value,
    #[serde(default)]
    pub cases: Vec<TestCase>,
    /// Error kind expected while parsing or loading the config.
    #[serde(default)]
    pub expect_error: Option<String>,
}

/// One URL to resolve.
#[derive(Debug, Deserialize)]
pub struct TestCase {
    pub name: String,
    pub url: String,
    pub expect: Expectation,
}

/// What resolving a case's URL must produce. Omitted fields are not checked.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Expectation {
    #[serde(default)]
    pub payload: Option<String>,
    #[serde(default)]
    pub params: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub consumed: Option<Vec<usize>>,
    /// Final URL after redirects, serialized.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub redirects: Option<Vec<String>>,
    /// Error kind; mutually exclusive with the success fields.
    #[serde(default)]
    pub error: Option<String>,
}

/// Result of running a single test case.
#[derive(Debug)]
pub struct CaseResult {
    pub case_name: String,
    pub passed: bool,
    /// Mismatch descriptions, empty when the case passed.
    pub failures: Vec<String>,
}

impl Fixture {
    /// Parse a fixture from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Parse multiple fixtures from a YAML file with `---` separators.
    pub fn from_yaml_multi(yaml: &str) -> Result<Vec<Self>, serde_yaml::Error> {
        let mut fixtures = Vec::new();
        for doc in serde_yaml::Deserializer::from_str(yaml) {
            fixtures.push(Self::deserialize(doc)?);
        }
        Ok(fixtures)
    }

    /// Parse and load this fixture's config.
    ///
    /// # Errors
    ///
    /// [`RouteError::InvalidConfig`] for a config that does not deserialize,
    /// otherwise whatever [`Registry::load_routes`] reports.
    pub fn load(&self, registry: &Registry) -> Result<RouteTree<String>, RouteError> {
        let config: RouteConfig<String> =
            serde_json::from_value(self.config.clone()).map_err(|e| RouteError::InvalidConfig {
                reason: e.to_string(),
            })?;
        registry.load_routes(config)
    }

    /// Run all test cases and return results.
    ///
    /// For an `expect_error` fixture, a single synthetic case reports whether
    /// loading failed with the expected kind.
    pub fn run(&self, registry: &Registry) -> Vec<CaseResult> {
        let loaded = self.load(registry);

        if let Some(expected) = &self.expect_error {
            let failures = match &loaded {
                Err(err) if err.kind() == expected.as_str() => Vec::new(),
                Err(err) => vec![format!("expected {expected} error, got {}: {err}", err.kind())],
                Ok(_) => vec![format!("expected {expected} error, config loaded")],
            };
            return vec![CaseResult {
                case_name: "load".to_owned(),
                passed: failures.is_empty(),
                failures,
            }];
        }

        let tree = match loaded {
            Ok(tree) => tree,
            Err(err) => {
                return vec![CaseResult {
                    case_name: "load".to_owned(),
                    passed: false,
                    failures: vec![format!("config failed to load: {err}")],
                }]
            }
        };

        self.cases.iter().map(|case| case.run(&tree)).collect()
    }

    /// Run all test cases and panic on first failure.
    pub fn run_and_assert(&self, registry: &Registry) {
        for result in self.run(registry) {
            assert!(
                result.passed,
                "Fixture '{}' case '{}' failed:\n  {}",
                self.name,
                result.case_name,
                result.failures.join("\n  ")
            );
        }
    }
}

impl TestCase {
    /// Resolve this case's URL against `tree` and compare with the expectation.
    pub fn run(&self, tree: &RouteTree<String>) -> CaseResult {
        let expect = &self.expect;
        let mut failures = Vec::new();

        match (tree.resolve(&self.url), &expect.error) {
            (Err(err), Some(kind)) => {
                if err.kind() != kind.as_str() {
                    failures.push(format!("expected {kind} error, got {}: {err}", err.kind()));
                }
            }
            (Err(err), None) => failures.push(format!("unexpected error: {err}")),
            (Ok(m), Some(kind)) => failures.push(format!(
                "expected {kind} error, matched {} ({:?})",
                m.route().full_path(),
                m.payload()
            )),
            (Ok(m), None) => {
                if let Some(payload) = &expect.payload {
                    if m.payload() != Some(payload) {
                        failures.push(format!("payload: expected {payload:?}, got {:?}", m.payload()));
                    }
                }
                if let Some(params) = &expect.params {
                    if m.params() != params {
                        failures.push(format!("params: expected {params:?}, got {:?}", m.params()));
                    }
                }
                if let Some(consumed) = &expect.consumed {
                    if &m.consumed() != consumed {
                        failures.push(format!(
                            "consumed: expected {consumed:?}, got {:?}",
                            m.consumed()
                        ));
                    }
                }
                if let Some(url) = &expect.url {
                    let actual = m.url().to_string();
                    if &actual != url {
                        failures.push(format!("url: expected {url:?}, got {actual:?}"));
                    }
                }
                if let Some(redirects) = &expect.redirects {
                    if m.redirects() != redirects.as_slice() {
                        failures.push(format!(
                            "redirects: expected {redirects:?}, got {:?}",
                            m.redirects()
                        ));
                    }
                }
            }
        }

        CaseResult {
            case_name: self.name.clone(),
            passed: failures.is_empty(),
            failures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Registry {
        crate::register(routeweave::RegistryBuilder::new()).build()
    }

    #[test]
    fn test_passing_fixture() {
        let fixture = Fixture::from_yaml(
            r"
name: smoke
config:
  routes:
    - { path: 'hero/:id', payload: Hero }
cases:
  - name: param
    url: /hero/7
    expect: { payload: Hero, params: { id: '7' }, consumed: [2] }
  - name: miss
    url: /villain
    expect: { error: NoRouteMatched }
",
        )
        .unwrap();
        let results = fixture.run(&registry());
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.passed), "{results:?}");
    }

    #[test]
    fn test_failing_case_reports_mismatch() {
        let fixture = Fixture::from_yaml(
            r"
name: wrong
config:
  routes:
    - { path: a, payload: A }
cases:
  - name: wrong payload
    url: /a
    expect: { payload: B }
",
        )
        .unwrap();
        let results = fixture.run(&registry());
        assert!(!results[0].passed);
        assert!(results[0].failures[0].starts_with("payload"));
    }

    #[test]
    fn test_expect_error_fixture() {
        let fixture = Fixture::from_yaml(
            r"
name: two wildcards
config:
  routes:
    - { path: '**', payload: A }
    - { path: '**', payload: B }
expect_error: AmbiguousWildcard
",
        )
        .unwrap();
        let results = fixture.run(&registry());
        assert!(results[0].passed, "{results:?}");
    }

    #[test]
    fn test_parse_error_is_invalid_config() {
        let fixture = Fixture::from_yaml(
            r"
name: typo
config:
  routes:
    - { pth: a, payload: A }
expect_error: InvalidConfig
",
        )
        .unwrap();
        assert!(fixture.run(&registry())[0].passed);
    }
}

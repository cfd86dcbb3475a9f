//! Route table fixture runner
//!
//! Loads YAML fixtures holding a route table config and runs dispatch cases
//! against the built [`Router`].

use serde::Deserialize;
use std::collections::HashMap;
use waypath::prelude::*;
use waypath::{RouteConfig, RouteTableConfig};

/// A complete route table fixture
#[derive(Debug, Deserialize)]
pub struct RouteFixture {
    pub name: String,
    pub description: String,
    /// Routes in priority order; actions are plain strings.
    pub routes: Vec<RouteConfig<String>>,
    pub cases: Vec<DispatchCase>,
}

/// Dispatch test case
#[derive(Debug, Deserialize)]
pub struct DispatchCase {
    pub name: String,
    pub method: Method,
    pub path: String,
    /// Every dispatched action, in order. Empty means nothing matched.
    pub expect: Vec<ExpectedAction>,
}

/// One expected element of `dispatch`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExpectedAction {
    pub action: String,
    #[serde(default)]
    pub params: HashMap<String, String>,
}

/// Result of running a single dispatch case
#[derive(Debug)]
pub struct DispatchResult {
    pub case_name: String,
    pub passed: bool,
    pub expected: Vec<ExpectedAction>,
    pub actual: Vec<ExpectedAction>,
}

impl RouteFixture {
    /// Parse a fixture from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Parse multiple fixtures from a YAML file with `---` separators
    pub fn from_yaml_multi(yaml: &str) -> Result<Vec<Self>, serde_yaml::Error> {
        let mut fixtures = Vec::new();
        for doc in serde_yaml::Deserializer::from_str(yaml) {
            fixtures.push(Self::deserialize(doc)?);
        }
        Ok(fixtures)
    }

    /// Build the router from this fixture's routes
    pub fn build(&self) -> Result<Router<String>, PatternError> {
        RouteTableConfig {
            routes: self.routes.clone(),
        }
        .build()
    }

    /// Run all dispatch cases and return results
    pub fn run(&self, router: &Router<String>) -> Vec<DispatchResult> {
        self.cases
            .iter()
            .map(|case| {
                let actual: Vec<ExpectedAction> = router
                    .dispatch(case.method, &case.path)
                    .map(|m| ExpectedAction {
                        action: m.handler.clone(),
                        params: m.params,
                    })
                    .collect();
                DispatchResult {
                    case_name: case.name.clone(),
                    passed: actual == case.expect,
                    expected: case.expect.clone(),
                    actual,
                }
            })
            .collect()
    }

    /// Build, run all dispatch cases, and panic on first failure
    pub fn run_and_assert(&self) {
        let router = self.build().unwrap_or_else(|err| {
            panic!(
                "Fixture '{}': route table failed to build: {err}",
                self.name
            )
        });
        for result in self.run(&router) {
            assert!(
                result.passed,
                "Fixture '{}' case '{}' failed: expected {:?}, got {:?}",
                self.name, result.case_name, result.expected, result.actual
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_a_mounted_table() {
        let yaml = r#"
name: mount
description: nested table under a prefix
routes:
  - pattern: /api
    target:
      type: mount
      routes:
        - pattern: /users/:id
          methods: [GET]
          target: { type: action, action: show }
cases:
  - name: nested hit
    method: GET
    path: /api/users/5
    expect: [{ action: show, params: { id: "5" } }]
  - name: wrong method
    method: POST
    path: /api/users/5
    expect: []
"#;
        RouteFixture::from_yaml(yaml).unwrap().run_and_assert();
    }
}

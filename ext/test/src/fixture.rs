//! Pattern fixture runner
//!
//! Loads YAML fixtures and runs them against [`Eval`].

use serde::Deserialize;
use std::collections::HashMap;
use waypath::prelude::*;

/// A complete pattern fixture
#[derive(Debug, Deserialize)]
pub struct Fixture {
    pub name: String,
    pub description: String,
    /// Compiled together; a pattern's tag is its position in this list.
    pub patterns: Vec<String>,
    /// When set, building must fail with this [`PatternError::kind`].
    #[serde(default)]
    pub expect_error: Option<String>,
    #[serde(default)]
    pub cases: Vec<TestCase>,
}

/// Test case
#[derive(Debug, Deserialize)]
pub struct TestCase {
    pub name: String,
    pub input: String,
    /// Every match, in priority order. Empty means no match.
    pub expect: Vec<ExpectedMatch>,
}

/// One expected element of `match_all`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExpectedMatch {
    pub route: usize,
    #[serde(default)]
    pub params: HashMap<String, String>,
}

impl From<MatchResult<usize>> for ExpectedMatch {
    fn from(result: MatchResult<usize>) -> Self {
        Self {
            route: result.end,
            params: result.params,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Runner
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of running a single test case
#[derive(Debug)]
pub struct CaseResult {
    pub case_name: String,
    pub passed: bool,
    pub expected: Vec<ExpectedMatch>,
    pub actual: Vec<ExpectedMatch>,
}

impl Fixture {
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

    /// Compile the fixture's patterns, tagged by position
    pub fn build(&self) -> Result<Eval<usize>, PatternError> {
        Eval::multi(
            self.patterns
                .iter()
                .enumerate()
                .map(|(index, pattern)| (pattern.as_str(), index)),
        )
    }

    /// Run all test cases and return results
    pub fn run(&self, eval: &Eval<usize>) -> Vec<CaseResult> {
        self.cases
            .iter()
            .map(|case| {
                let actual: Vec<ExpectedMatch> = eval
                    .match_all(&case.input)
                    .map(ExpectedMatch::from)
                    .collect();
                CaseResult {
                    case_name: case.name.clone(),
                    passed: actual == case.expect,
                    expected: case.expect.clone(),
                    actual,
                }
            })
            .collect()
    }

    /// Build, run all test cases, and panic on first failure
    pub fn run_and_assert(&self) {
        let built = self.build();

        if let Some(kind) = &self.expect_error {
            match built {
                Ok(_) => panic!(
                    "Fixture '{}': expected a {kind} error, but {:?} compiled",
                    self.name, self.patterns
                ),
                Err(err) => assert_eq!(
                    err.kind(),
                    kind,
                    "Fixture '{}': expected a {kind} error, got: {err}",
                    self.name
                ),
            }
            return;
        }

        let eval = built.unwrap_or_else(|err| {
            panic!("Fixture '{}': patterns failed to compile: {err}", self.name)
        });
        for result in self.run(&eval) {
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
    fn parses_multi_document_yaml() {
        let yaml = r#"
name: one
description: first
patterns: [""]
cases:
  - name: empty
    input: ""
    expect: [{ route: 0 }]
---
name: two
description: second
patterns: ["(a"]
expect_error: syntax
"#;
        let fixtures = Fixture::from_yaml_multi(yaml).unwrap();
        assert_eq!(fixtures.len(), 2);
        assert!(fixtures[1].cases.is_empty());
        for fixture in fixtures {
            fixture.run_and_assert();
        }
    }

    #[test]
    #[should_panic(expected = "failed")]
    fn wrong_expectation_panics() {
        let yaml = r#"
name: wrong
description: expects a match that does not happen
patterns: ["/a"]
cases:
  - name: miss
    input: /b
    expect: [{ route: 0 }]
"#;
        Fixture::from_yaml(yaml).unwrap().run_and_assert();
    }
}

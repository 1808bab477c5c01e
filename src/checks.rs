//! The `field_checks` evaluator kind: cheap structural assertions against a
//! record, no model call. Each check emits one boolean score.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::judge::extract::{resolve_path, value_to_text};
use crate::judge::invoke::ModelClient;
use crate::registry::Evaluator;
use crate::rules::config::{AutomationRule, EvaluatorCode, RuleKind};
use crate::rules::validate::Violation;
use crate::types::{FieldScore, Outcome, ScoreValue, TraceRecord};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChecksCode {
    pub checks: Vec<Check>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Check {
    pub name: String,
    pub path: String,
    #[serde(with = "serde_norway::with::singleton_map")]
    pub expect: Expectation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expectation {
    /// The path resolves (or, with `exists: false`, does not).
    Exists(bool),
    /// The resolved value's text form equals this string.
    Equals(String),
    /// The resolved value's text form contains this substring.
    Contains(String),
}

impl Expectation {
    pub fn matches(&self, value: Option<&Value>) -> bool {
        match self {
            Expectation::Exists(want) => value.is_some() == *want,
            Expectation::Equals(expected) => {
                value.map(value_to_text).as_deref() == Some(expected.as_str())
            }
            Expectation::Contains(needle) => value
                .map(value_to_text)
                .is_some_and(|text| text.contains(needle.as_str())),
        }
    }
}

pub fn validate_code(rule: &str, code: &FieldChecksCode, out: &mut Vec<Violation>) {
    if code.checks.is_empty() {
        out.push(Violation::new(rule, "checks must not be empty"));
    }
    let mut seen = std::collections::BTreeSet::new();
    for check in &code.checks {
        if check.name.trim().is_empty() {
            out.push(Violation::new(rule, "check names must not be blank"));
        } else if !seen.insert(check.name.as_str()) {
            out.push(Violation::new(
                rule,
                &format!("check '{}' is declared more than once", check.name),
            ));
        }
        if check.path.trim().is_empty() {
            out.push(Violation::new(
                rule,
                &format!("check '{}' has a blank path", check.name),
            ));
        }
    }
}

pub struct ChecksEvaluator;

impl Evaluator for ChecksEvaluator {
    fn kind(&self) -> RuleKind {
        RuleKind::FieldChecks
    }

    fn validate(&self, rule: &AutomationRule, out: &mut Vec<Violation>) {
        match &rule.code {
            EvaluatorCode::FieldChecks(code) => validate_code(&rule.name, code, out),
            other => out.push(Violation::new(
                &rule.name,
                &format!("payload kind {} does not match field_checks", other.kind()),
            )),
        }
    }

    fn evaluate(
        &self,
        rule: &AutomationRule,
        record: &TraceRecord,
        _client: &dyn ModelClient,
    ) -> Outcome {
        let EvaluatorCode::FieldChecks(code) = &rule.code else {
            return Outcome::Failed {
                reason: "rule payload is not field_checks".to_string(),
            };
        };

        let scores = code
            .checks
            .iter()
            .map(|check| {
                let value = resolve_path(&record.data, &check.path);
                FieldScore::value(&check.name, ScoreValue::Bool(check.expect.matches(value)))
            })
            .collect();
        Outcome::Scored { scores }
    }
}

//! Rule validation primitives.
//!
//! Validation never stops at the first problem: every violated invariant is
//! collected so a rule author sees the full list at once. Rules are mutable
//! configuration, so validation runs on every load, not only on creation.

use crate::rules::config::AutomationRule;

/// One violated invariant, attributed to a rule by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub rule: String,
    pub message: String,
}

impl Violation {
    pub fn new(rule: &str, message: &str) -> Self {
        Self {
            rule: rule.to_string(),
            message: message.to_string(),
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rule '{}': {}", self.rule, self.message)
    }
}

/// Every violation found across a rule set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

/// Envelope checks shared by every evaluator kind.
pub fn validate_envelope(rule: &AutomationRule, out: &mut Vec<Violation>) {
    if rule.name.trim().is_empty() {
        out.push(Violation::new(&rule.name, "rule name must not be blank"));
    }
    if !rule.sampling_rate.is_finite() {
        out.push(Violation::new(
            &rule.name,
            "sampling_rate must be a finite number",
        ));
    } else if !(0.0..=1.0).contains(&rule.sampling_rate) {
        out.push(Violation::new(
            &rule.name,
            &format!("sampling_rate {} is outside [0.0, 1.0]", rule.sampling_rate),
        ));
    }
}

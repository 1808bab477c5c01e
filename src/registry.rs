//! Polymorphic dispatch across evaluator kinds.
//!
//! Every kind shares one base contract (identity, sampling, audit) and owns
//! its payload shape and parsing policy. Dispatch is an explicit kind-to-
//! evaluator map so new kinds register without touching existing ones.

use std::collections::BTreeMap;

use crate::checks::ChecksEvaluator;
use crate::judge::invoke::ModelClient;
use crate::judge::sample::Sampler;
use crate::judge::JudgeEvaluator;
use crate::rules::config::{AutomationRule, RuleKind};
use crate::rules::validate::{validate_envelope, ValidationError, Violation};
use crate::types::{Outcome, RuleReport, TraceRecord};

/// The base contract every evaluator kind implements.
pub trait Evaluator {
    fn kind(&self) -> RuleKind;

    /// Collect kind-specific violations for one rule.
    fn validate(&self, rule: &AutomationRule, out: &mut Vec<Violation>);

    /// Evaluate one rule against one record. Each call is an independent
    /// unit of work: no state is shared across records or rules.
    fn evaluate(
        &self,
        rule: &AutomationRule,
        record: &TraceRecord,
        client: &dyn ModelClient,
    ) -> Outcome;
}

pub struct Registry {
    evaluators: BTreeMap<RuleKind, Box<dyn Evaluator>>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            evaluators: BTreeMap::new(),
        }
    }

    /// Registry with both built-in kinds.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(JudgeEvaluator));
        registry.register(Box::new(ChecksEvaluator));
        registry
    }

    /// Register an evaluator, replacing any previous one for its kind.
    pub fn register(&mut self, evaluator: Box<dyn Evaluator>) {
        self.evaluators.insert(evaluator.kind(), evaluator);
    }

    /// Validate a rule set: envelope checks, duplicate names, and the
    /// kind-specific checks of each registered evaluator. Returns every
    /// violation, not just the first.
    pub fn validate(&self, rules: &[AutomationRule]) -> Result<(), ValidationError> {
        let mut violations = Vec::new();
        let mut seen_names = std::collections::BTreeSet::new();

        for rule in rules {
            if !rule.name.trim().is_empty() && !seen_names.insert(rule.name.as_str()) {
                violations.push(Violation::new(&rule.name, "rule name is used more than once"));
            }
            validate_envelope(rule, &mut violations);
            match self.evaluators.get(&rule.code.kind()) {
                Some(evaluator) => evaluator.validate(rule, &mut violations),
                None => violations.push(Violation::new(
                    &rule.name,
                    &format!("no evaluator registered for kind {}", rule.code.kind()),
                )),
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { violations })
        }
    }

    /// Sampling decision for one (rule, record) pair.
    pub fn sample(&self, rule: &AutomationRule, sampler: &mut Sampler) -> bool {
        sampler.fire(rule.sampling_rate)
    }

    /// Kind dispatch for one already-sampled evaluation.
    pub fn evaluate(
        &self,
        rule: &AutomationRule,
        record: &TraceRecord,
        client: &dyn ModelClient,
    ) -> Outcome {
        match self.evaluators.get(&rule.code.kind()) {
            Some(evaluator) => evaluator.evaluate(rule, record, client),
            None => Outcome::Failed {
                reason: format!("no evaluator registered for kind {}", rule.code.kind()),
            },
        }
    }

    /// Run every rule against one record. One rule's failure never blocks
    /// its siblings. `bypass_sampling` treats every rule as rate 1.0.
    pub fn evaluate_all(
        &self,
        rules: &[AutomationRule],
        record: &TraceRecord,
        client: &dyn ModelClient,
        sampler: &mut Sampler,
        bypass_sampling: bool,
    ) -> Vec<RuleReport> {
        rules
            .iter()
            .map(|rule| {
                let outcome = if bypass_sampling || self.sample(rule, sampler) {
                    self.evaluate(rule, record, client)
                } else {
                    Outcome::Skipped
                };
                RuleReport {
                    rule: rule.name.clone(),
                    outcome,
                }
            })
            .collect()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

//! The `llm_as_judge` pipeline: extract variables from the record, render
//! the message templates, ask the model, parse the reply against the
//! declared output schema.

pub mod config;
pub mod extract;
pub mod invoke;
pub mod prompt;
pub mod response;
pub mod sample;

pub use config::{FieldType, LlmAsJudgeCode, Message, ModelParameters, OutputField, Role};
pub use extract::{extract, resolve_path, Resolved};
pub use invoke::{
    load_model_config, CommandClient, FakeClient, ModelClient, ModelConfig, ModelRequest,
};
pub use prompt::{placeholders, render, render_content, RenderedMessage};
pub use response::parse_scores;
pub use sample::Sampler;

use crate::registry::Evaluator;
use crate::rules::config::{AutomationRule, EvaluatorCode, RuleKind};
use crate::rules::validate::Violation;
use crate::types::{Outcome, TraceRecord};

pub struct JudgeEvaluator;

impl Evaluator for JudgeEvaluator {
    fn kind(&self) -> RuleKind {
        RuleKind::LlmAsJudge
    }

    fn validate(&self, rule: &AutomationRule, out: &mut Vec<Violation>) {
        match &rule.code {
            EvaluatorCode::LlmAsJudge(code) => config::validate_code(&rule.name, code, out),
            other => out.push(Violation::new(
                &rule.name,
                &format!("payload kind {} does not match llm_as_judge", other.kind()),
            )),
        }
    }

    fn evaluate(
        &self,
        rule: &AutomationRule,
        record: &TraceRecord,
        client: &dyn ModelClient,
    ) -> Outcome {
        let EvaluatorCode::LlmAsJudge(code) = &rule.code else {
            return Outcome::Failed {
                reason: "rule payload is not llm_as_judge".to_string(),
            };
        };

        // All of this state is local to the one evaluation.
        let values = extract::extract(&code.variables, &record.data);
        let messages = prompt::render(&code.messages, &values);
        let request = ModelRequest {
            model: code.model.name.clone(),
            temperature: code.model.temperature,
            messages,
        };

        match client.complete(&request) {
            Ok(raw) => Outcome::Scored {
                scores: response::parse_scores(&raw, &code.schema),
            },
            Err(reason) => Outcome::Failed {
                reason: format!("model invocation failed: {reason}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::config::test_support::llm_rule;
    use crate::types::{FieldFailure, ScoreValue};
    use serde_json::json;
    use std::cell::RefCell;

    fn record(data: serde_json::Value) -> TraceRecord {
        TraceRecord::from_value(data)
    }

    /// Client that captures the request it was handed.
    struct CapturingClient {
        seen: RefCell<Option<ModelRequest>>,
        response: String,
    }

    impl CapturingClient {
        fn new(response: &str) -> Self {
            Self {
                seen: RefCell::new(None),
                response: response.to_string(),
            }
        }
    }

    impl ModelClient for CapturingClient {
        fn complete(&self, request: &ModelRequest) -> Result<String, String> {
            *self.seen.borrow_mut() = Some(request.clone());
            Ok(self.response.clone())
        }
    }

    #[test]
    fn test_pipeline_renders_extracted_variables_into_request() {
        let rule = llm_rule("answer-correctness", 1.0);
        let client = CapturingClient::new("correctness: true");
        let outcome = JudgeEvaluator.evaluate(
            &rule,
            &record(json!({"input": {"question": "2+2?"}})),
            &client,
        );

        let seen = client.seen.borrow();
        let request = seen.as_ref().unwrap();
        assert_eq!(request.model, "gpt-4o-mini");
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].content, "Answer is correct for: 2+2?");

        assert_eq!(
            outcome,
            Outcome::Scored {
                scores: vec![crate::types::FieldScore::value(
                    "correctness",
                    ScoreValue::Bool(true)
                )]
            }
        );
    }

    #[test]
    fn test_pipeline_missing_variable_renders_empty_not_failure() {
        let rule = llm_rule("answer-correctness", 1.0);
        let client = CapturingClient::new("correctness: false");
        let outcome = JudgeEvaluator.evaluate(&rule, &record(json!({"input": {}})), &client);

        let seen = client.seen.borrow();
        assert_eq!(
            seen.as_ref().unwrap().messages[0].content,
            "Answer is correct for: "
        );
        assert_eq!(outcome.status(), "scored");
    }

    #[test]
    fn test_pipeline_uncoercible_reply_fails_per_field() {
        let rule = llm_rule("answer-correctness", 1.0);
        let client = FakeClient::with_response("correctness: not sure");
        let outcome = JudgeEvaluator.evaluate(
            &rule,
            &record(json!({"input": {"question": "2+2?"}})),
            &client,
        );

        let Outcome::Scored { scores } = outcome else {
            panic!("expected scored outcome");
        };
        assert_eq!(scores.len(), 1);
        assert!(matches!(
            scores[0].failure,
            Some(FieldFailure::Coercion { .. })
        ));
    }

    #[test]
    fn test_pipeline_model_failure_is_attributed() {
        let rule = llm_rule("answer-correctness", 1.0);
        let client = FakeClient::with_failure("connection refused");
        let outcome = JudgeEvaluator.evaluate(&rule, &record(json!({})), &client);

        assert_eq!(
            outcome,
            Outcome::Failed {
                reason: "model invocation failed: connection refused".to_string()
            }
        );
    }

    #[test]
    fn test_validate_dispatches_to_code_checks() {
        let mut rule = llm_rule("r", 1.0);
        if let EvaluatorCode::LlmAsJudge(code) = &mut rule.code {
            code.messages[0].content = "{{unbound}}".into();
        }
        let mut out = Vec::new();
        JudgeEvaluator.validate(&rule, &mut out);
        assert!(out.iter().any(|v| v.message.contains("unbound")));
    }
}

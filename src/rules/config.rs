//! Automation rule definitions and rule-file loading.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::checks::FieldChecksCode;
use crate::judge::config::LlmAsJudgeCode;
use crate::rules::views::PublicRule;

/// A validated-on-load rule set, the unit attached to a trace stream.
#[derive(Debug, Clone)]
pub struct RulesFile {
    pub version: u32,
    pub rules: Vec<AutomationRule>,
}

/// Canonical internal form of one automation rule. Serialization happens
/// only through the explicit view projections in `rules::views`.
#[derive(Debug, Clone)]
pub struct AutomationRule {
    /// Opaque; assigned by the persistence collaborator, absent on write.
    pub id: Option<String>,
    pub project_id: Option<String>,
    pub project_name: Option<String>,
    pub name: String,
    /// Probability in [0, 1] that a given record is evaluated.
    pub sampling_rate: f64,
    pub code: EvaluatorCode,
    pub audit: Audit,
}

/// Server-maintained audit trail; never supplied by the write view.
#[derive(Debug, Clone, Default)]
pub struct Audit {
    pub created_at: Option<DateTime<Utc>>,
    pub created_by: Option<String>,
    pub last_updated_at: Option<DateTime<Utc>>,
    pub last_updated_by: Option<String>,
}

/// Kind tag plus kind-specific payload. Adjacent tagging (`type` + `code`)
/// makes a cross-kind payload unrepresentable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "code", rename_all = "snake_case")]
pub enum EvaluatorCode {
    LlmAsJudge(LlmAsJudgeCode),
    FieldChecks(FieldChecksCode),
}

impl EvaluatorCode {
    pub fn kind(&self) -> RuleKind {
        match self {
            EvaluatorCode::LlmAsJudge(_) => RuleKind::LlmAsJudge,
            EvaluatorCode::FieldChecks(_) => RuleKind::FieldChecks,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    LlmAsJudge,
    FieldChecks,
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            RuleKind::LlmAsJudge => "llm_as_judge",
            RuleKind::FieldChecks => "field_checks",
        })
    }
}

pub(crate) fn default_sampling_rate() -> f64 {
    1.0
}

/// On-disk rule file: a version header plus rules in the public view.
#[derive(Debug, Deserialize)]
struct RawRulesFile {
    version: u32,
    #[serde(default)]
    rules: Vec<PublicRule>,
}

/// Load rules from a YAML file.
pub fn load_rules(path: &Path) -> Result<RulesFile, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read rules file {}: {e}", path.display()))?;
    parse_rules(&content)
        .map_err(|e| format!("Failed to parse rules file {}: {e}", path.display()))
}

/// Load the embedded starter rules.
pub fn load_embedded_rules() -> Result<RulesFile, String> {
    let content = crate::embedded_rules::get("rules.yaml")
        .ok_or_else(|| "Embedded rules.yaml is missing".to_string())?;
    parse_rules(content).map_err(|e| format!("Failed to parse embedded rules: {e}"))
}

fn parse_rules(content: &str) -> Result<RulesFile, String> {
    let raw: RawRulesFile = serde_norway::from_str(content).map_err(|e| e.to_string())?;
    Ok(RulesFile {
        version: raw.version,
        rules: raw.rules.into_iter().map(PublicRule::into_rule).collect(),
    })
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::judge::config::{FieldType, Role};

    const SAMPLE: &str = r#"
version: 1
rules:
  - name: answer-correctness
    sampling_rate: 0.25
    type: llm_as_judge
    code:
      model:
        name: gpt-4o-mini
        temperature: 0.7
      messages:
        - role: system
          content: Grade strictly.
        - role: user
          content: "Is this correct? {{q}}"
      variables:
        q: input.question
      schema:
        - name: correctness
          type: boolean
          description: True when correct.
        - name: confidence
          type: double
          description: Confidence 0..1.
  - name: trace-shape
    type: field_checks
    code:
      checks:
        - name: has_output
          path: output
          expect:
            exists: true
"#;

    #[test]
    fn test_parse_rules_yaml() {
        let file = parse_rules(SAMPLE).unwrap();
        assert_eq!(file.version, 1);
        assert_eq!(file.rules.len(), 2);

        let judge = &file.rules[0];
        assert_eq!(judge.name, "answer-correctness");
        assert_eq!(judge.sampling_rate, 0.25);
        assert_eq!(judge.code.kind(), RuleKind::LlmAsJudge);
        let EvaluatorCode::LlmAsJudge(code) = &judge.code else {
            panic!("expected llm_as_judge payload");
        };
        assert_eq!(code.model.temperature, 0.7);
        assert_eq!(code.messages[1].role, Role::User);
        assert_eq!(code.schema[1].field_type, FieldType::Double);

        let checks = &file.rules[1];
        assert_eq!(checks.code.kind(), RuleKind::FieldChecks);
        // sampling_rate defaults to 1.0 when omitted
        assert_eq!(checks.sampling_rate, 1.0);
    }

    #[test]
    fn test_parse_rules_rejects_unknown_kind() {
        let yaml = r#"
version: 1
rules:
  - name: custom
    type: python_metric
    code: {}
"#;
        let err = parse_rules(yaml).unwrap_err();
        assert!(err.contains("python_metric") || err.contains("unknown variant"));
    }

    #[test]
    fn test_parse_rules_rejects_cross_kind_payload() {
        // A field_checks tag with an llm_as_judge payload cannot deserialize.
        let yaml = r#"
version: 1
rules:
  - name: mismatched
    type: field_checks
    code:
      model:
        name: gpt-4o-mini
      messages: []
      schema: []
"#;
        assert!(parse_rules(yaml).is_err());
    }

    #[test]
    fn test_parse_rules_ignores_unknown_fields() {
        let yaml = r#"
version: 1
rules:
  - name: tolerant
    sampling_rate: 1.0
    some_future_field: whatever
    type: field_checks
    code:
      checks:
        - name: has_input
          path: input
          expect:
            exists: true
"#;
        let file = parse_rules(yaml).unwrap();
        assert_eq!(file.rules.len(), 1);
    }

    #[test]
    fn test_parse_empty_rules_list() {
        let file = parse_rules("version: 1\nrules: []\n").unwrap();
        assert!(file.rules.is_empty());
    }

    #[test]
    fn test_load_rules_missing_file() {
        let err = load_rules(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert!(err.contains("Failed to read rules file"));
    }

    #[test]
    fn test_load_embedded_rules_parses() {
        let file = load_embedded_rules().expect("embedded rules must parse");
        assert_eq!(file.version, 1);
        assert!(!file.rules.is_empty());
        assert!(file
            .rules
            .iter()
            .any(|r| r.code.kind() == RuleKind::LlmAsJudge));
        assert!(file
            .rules
            .iter()
            .any(|r| r.code.kind() == RuleKind::FieldChecks));
    }

    #[test]
    fn test_rule_kind_display() {
        assert_eq!(RuleKind::LlmAsJudge.to_string(), "llm_as_judge");
        assert_eq!(RuleKind::FieldChecks.to_string(), "field_checks");
    }

    #[test]
    fn test_audit_fields_accepted_on_read() {
        let yaml = r#"
version: 1
rules:
  - id: rule-7
    project_id: proj-1
    project_name: checkout
    name: audited
    sampling_rate: 0.5
    type: field_checks
    code:
      checks:
        - name: has_input
          path: input
          expect:
            exists: true
    created_at: "2025-11-02T09:30:00Z"
    created_by: ana
    last_updated_at: "2025-12-01T10:00:00Z"
    last_updated_by: kim
"#;
        let file = parse_rules(yaml).unwrap();
        let rule = &file.rules[0];
        assert_eq!(rule.id.as_deref(), Some("rule-7"));
        assert_eq!(rule.project_name.as_deref(), Some("checkout"));
        assert_eq!(rule.audit.created_by.as_deref(), Some("ana"));
        assert!(rule.audit.last_updated_at.is_some());
    }
}

//! Configuration payload for the `llm_as_judge` evaluator kind.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::rules::validate::Violation;

use super::prompt::placeholders;

/// Kind-specific configuration: which model to ask, what to ask it, which
/// record fields feed the prompt, and what shape the reply must take.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmAsJudgeCode {
    pub model: ModelParameters,
    pub messages: Vec<Message>,
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
    pub schema: Vec<OutputField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    pub name: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

fn default_temperature() -> f64 {
    0.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        })
    }
}

/// One declared output field the model's reply is parsed into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Boolean,
    Integer,
    Double,
    Categorical,
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            FieldType::Boolean => "boolean",
            FieldType::Integer => "integer",
            FieldType::Double => "double",
            FieldType::Categorical => "categorical",
        })
    }
}

/// Collect every violation in this payload. Temperature stays permissive
/// (finite-only); callers rely on provider-specific ranges.
pub fn validate_code(rule: &str, code: &LlmAsJudgeCode, out: &mut Vec<Violation>) {
    if code.model.name.trim().is_empty() {
        out.push(Violation::new(rule, "model name must not be blank"));
    }
    if !code.model.temperature.is_finite() {
        out.push(Violation::new(rule, "model temperature must be a finite number"));
    }

    if code.messages.is_empty() {
        out.push(Violation::new(rule, "messages must not be empty"));
    }
    for (i, message) in code.messages.iter().enumerate() {
        if message.content.trim().is_empty() {
            out.push(Violation::new(
                rule,
                &format!("message {i} ({}) has blank content", message.role),
            ));
        }
    }
    if !code.messages.iter().any(|m| m.role == Role::User) {
        out.push(Violation::new(rule, "messages must contain at least one user entry"));
    }

    for (name, path) in &code.variables {
        if name.trim().is_empty() {
            out.push(Violation::new(rule, "variable names must not be blank"));
        }
        if path.trim().is_empty() {
            out.push(Violation::new(
                rule,
                &format!("variable '{name}' has a blank extraction path"),
            ));
        }
    }

    // Placeholder closure: every {{x}} in any message must be bound.
    for message in &code.messages {
        for placeholder in placeholders(&message.content) {
            if !code.variables.contains_key(&placeholder) {
                out.push(Violation::new(
                    rule,
                    &format!("placeholder '{{{{{placeholder}}}}}' has no variable binding"),
                ));
            }
        }
    }

    if code.schema.is_empty() {
        out.push(Violation::new(rule, "schema must not be empty"));
    }
    let mut seen = std::collections::BTreeSet::new();
    for field in &code.schema {
        if field.name.trim().is_empty() {
            out.push(Violation::new(rule, "schema field names must not be blank"));
        } else if !seen.insert(field.name.as_str()) {
            out.push(Violation::new(
                rule,
                &format!("schema field '{}' is declared more than once", field.name),
            ));
        }
        if field.description.trim().is_empty() {
            out.push(Violation::new(
                rule,
                &format!("schema field '{}' has a blank description", field.name),
            ));
        }
    }
}

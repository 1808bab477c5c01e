use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One trace/span record from the ingestion pipeline.
///
/// The payload is arbitrary nested JSON; only the extractors look inside it.
/// The conventional top-level `id` key is lifted out for log attribution.
#[derive(Debug, Clone)]
pub struct TraceRecord {
    pub id: Option<String>,
    pub data: Value,
}

impl TraceRecord {
    pub fn from_value(data: Value) -> Self {
        let id = match data.get("id") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        Self { id, data }
    }

    pub fn parse(input: &str) -> Result<Self, String> {
        let data: Value = serde_json::from_str(input)
            .map_err(|e| format!("Failed to parse trace record: {e}"))?;
        Ok(Self::from_value(data))
    }
}

/// A typed score produced for one declared output-schema field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScoreValue {
    Bool(bool),
    Integer(i64),
    Double(f64),
    Category(String),
}

impl std::fmt::Display for ScoreValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoreValue::Bool(b) => write!(f, "{b}"),
            ScoreValue::Integer(i) => write!(f, "{i}"),
            ScoreValue::Double(d) => write!(f, "{d}"),
            ScoreValue::Category(s) => f.write_str(s),
        }
    }
}

/// Why a declared field produced no score.
///
/// `Missing` (the response never addressed the field) is deliberately
/// distinct from `Coercion` (the field was present but its value did not fit
/// the declared type).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldFailure {
    Missing,
    Coercion { reason: String },
}

impl std::fmt::Display for FieldFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldFailure::Missing => f.write_str("field missing from response"),
            FieldFailure::Coercion { reason } => f.write_str(reason),
        }
    }
}

/// Per-field outcome: exactly one of `value` or `failure` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldScore {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<ScoreValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FieldFailure>,
}

impl FieldScore {
    pub fn value(name: &str, value: ScoreValue) -> Self {
        Self {
            name: name.to_string(),
            value: Some(value),
            failure: None,
        }
    }

    pub fn missing(name: &str) -> Self {
        Self {
            name: name.to_string(),
            value: None,
            failure: Some(FieldFailure::Missing),
        }
    }

    pub fn coercion(name: &str, reason: String) -> Self {
        Self {
            name: name.to_string(),
            value: None,
            failure: Some(FieldFailure::Coercion { reason }),
        }
    }
}

/// The result of evaluating one rule against one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// The sampling gate decided this record is not evaluated.
    Skipped,
    /// One entry per declared schema field, value or failure.
    Scored { scores: Vec<FieldScore> },
    /// The evaluation could not produce a score set at all
    /// (model invocation failure, unregistered kind).
    Failed { reason: String },
}

impl Outcome {
    pub fn status(&self) -> &'static str {
        match self {
            Outcome::Skipped => "skipped",
            Outcome::Scored { .. } => "scored",
            Outcome::Failed { .. } => "failed",
        }
    }
}

/// One rule's outcome inside an evaluation report.
#[derive(Debug, Clone, Serialize)]
pub struct RuleReport {
    pub rule: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// Top-level output for one record, written to stdout in evaluate mode.
#[derive(Debug, Clone, Serialize)]
pub struct EvalReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
    pub results: Vec<RuleReport>,
}

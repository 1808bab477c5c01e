//! Parse the model's raw reply against the rule's declared output schema.
//!
//! The input is adversarial by nature: every path must be total, and every
//! failure is attributed to a single field, never to the whole response.

use serde_json::{Map, Value};

use crate::types::{FieldScore, ScoreValue};

use super::config::{FieldType, OutputField};

/// Produce exactly one entry per declared schema field, for any input text.
///
/// Extraction precedence: a JSON object (markdown fences tolerated), then a
/// line-oriented `name: value` scan. A field absent from the reply yields a
/// `Missing` failure; a present-but-untypable value yields a `Coercion`
/// failure. Extra fields in the reply are ignored.
pub fn parse_scores(raw: &str, schema: &[OutputField]) -> Vec<FieldScore> {
    let fields = extract_fields(raw);

    schema
        .iter()
        .map(|declared| match find_field(&fields, &declared.name) {
            Some(value) => match coerce(value, declared.field_type) {
                Ok(score) => FieldScore::value(&declared.name, score),
                Err(reason) => FieldScore::coercion(&declared.name, reason),
            },
            None => FieldScore::missing(&declared.name),
        })
        .collect()
}

/// Pull a field-addressable map out of the raw reply.
fn extract_fields(raw: &str) -> Map<String, Value> {
    let stripped = strip_code_fences(raw);

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(stripped) {
        return map;
    }

    // Fallback: one `name: value` line per field.
    let mut map = Map::new();
    for line in stripped.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().trim_matches('"').trim_matches('*').trim();
        if key.is_empty() || key.contains(char::is_whitespace) {
            continue;
        }
        // First occurrence wins, as with the leading line of a chatty reply.
        if !map.contains_key(key) {
            let value = value.trim().trim_matches('"').to_string();
            map.insert(key.to_string(), Value::String(value));
        }
    }
    map
}

/// Drop a surrounding markdown code fence, if any.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Skip the info string ("json", "yaml", ...) on the opening fence line.
    let body = match rest.split_once('\n') {
        Some((_, body)) => body,
        None => return trimmed,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Exact name match first, then ASCII-case-insensitive.
fn find_field<'a>(fields: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    if let Some(value) = fields.get(name) {
        return Some(value);
    }
    fields
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value)
}

fn coerce(value: &Value, field_type: FieldType) -> Result<ScoreValue, String> {
    match field_type {
        FieldType::Boolean => coerce_boolean(value),
        FieldType::Integer => coerce_integer(value),
        FieldType::Double => coerce_double(value),
        FieldType::Categorical => coerce_categorical(value),
    }
}

fn coerce_boolean(value: &Value) -> Result<ScoreValue, String> {
    match value {
        Value::Bool(b) => Ok(ScoreValue::Bool(*b)),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" => Ok(ScoreValue::Bool(true)),
            "false" | "no" => Ok(ScoreValue::Bool(false)),
            other => Err(format!("'{other}' is not a boolean")),
        },
        other => Err(format!("{} is not a boolean", type_name(other))),
    }
}

fn coerce_integer(value: &Value) -> Result<ScoreValue, String> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(ScoreValue::Integer(i));
            }
            Err(format!("'{n}' is not an integer"))
        }
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(ScoreValue::Integer)
            .map_err(|_| format!("'{}' is not an integer", s.trim())),
        other => Err(format!("{} is not an integer", type_name(other))),
    }
}

fn coerce_double(value: &Value) -> Result<ScoreValue, String> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .map(ScoreValue::Double)
            .ok_or_else(|| format!("'{n}' is not a number")),
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(d) if d.is_finite() => Ok(ScoreValue::Double(d)),
            _ => Err(format!("'{}' is not a number", s.trim())),
        },
        other => Err(format!("{} is not a number", type_name(other))),
    }
}

fn coerce_categorical(value: &Value) -> Result<ScoreValue, String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Err("empty category value".to_string())
            } else {
                Ok(ScoreValue::Category(trimmed.to_string()))
            }
        }
        Value::Number(n) => Ok(ScoreValue::Category(n.to_string())),
        Value::Bool(b) => Ok(ScoreValue::Category(b.to_string())),
        other => Err(format!("{} is not a category", type_name(other))),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

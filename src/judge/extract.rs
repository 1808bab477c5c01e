//! Variable extraction from trace records.
//!
//! Path language: dotted segments, each a map key; a segment that parses as
//! an unsigned integer indexes arrays (`input.messages.0.content`). No
//! wildcards or query syntax.

use serde_json::Value;
use std::collections::BTreeMap;

/// One resolved variable. A path that misses yields `Unresolved`, never an
/// error -- the rule author owns prompts that degrade gracefully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Text(String),
    Unresolved,
}

impl Resolved {
    /// Text form used for substitution. Unresolved renders as empty.
    pub fn as_str(&self) -> &str {
        match self {
            Resolved::Text(s) => s,
            Resolved::Unresolved => "",
        }
    }
}

/// Resolve every declared variable against one record.
///
/// Pure and deterministic: the same record and bindings always produce the
/// same mapping.
pub fn extract(
    variables: &BTreeMap<String, String>,
    record: &Value,
) -> BTreeMap<String, Resolved> {
    variables
        .iter()
        .map(|(name, path)| {
            let resolved = match resolve_path(record, path) {
                Some(value) => Resolved::Text(value_to_text(value)),
                None => Resolved::Unresolved,
            };
            (name.clone(), resolved)
        })
        .collect()
}

/// Walk a dotted path through nested JSON.
pub fn resolve_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return None;
    }
    let mut current = root;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => {
                let index: usize = segment.parse().ok()?;
                items.get(index)?
            }
            _ => return None,
        };
    }
    Some(current)
}

/// Canonical text form: scalars render bare, structures as compact JSON.
pub(crate) fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Object(_) | Value::Array(_) => {
            serde_json::to_string(value).unwrap_or_default()
        }
    }
}

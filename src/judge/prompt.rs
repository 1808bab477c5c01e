//! Prompt rendering: substitute `{{name}}` placeholders into the rule's
//! message templates.

use serde::Serialize;
use std::collections::BTreeMap;

use super::config::{Message, Role};
use super::extract::Resolved;

/// A message with all placeholders substituted, ready for the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedMessage {
    pub role: Role,
    pub content: String,
}

/// Render every message, preserving order and roles.
///
/// Substitution is a single left-to-right pass: a substituted value is never
/// re-scanned for placeholders, so a record cannot inject new templates.
/// Unresolved (or unbound) variables render as the empty string.
pub fn render(
    messages: &[Message],
    values: &BTreeMap<String, Resolved>,
) -> Vec<RenderedMessage> {
    messages
        .iter()
        .map(|message| RenderedMessage {
            role: message.role,
            content: render_content(&message.content, values),
        })
        .collect()
}

/// Substitute placeholders in one template string.
pub fn render_content(template: &str, values: &BTreeMap<String, Resolved>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        let after_open = &rest[open + 2..];
        match after_open.find("}}") {
            Some(close) => {
                let name = after_open[..close].trim();
                if name.is_empty() {
                    // `{{}}` is not a placeholder; keep it literally.
                    out.push_str(&rest[..open + 2]);
                    rest = after_open;
                } else {
                    out.push_str(&rest[..open]);
                    if let Some(resolved) = values.get(name) {
                        out.push_str(resolved.as_str());
                    }
                    rest = &after_open[close + 2..];
                }
            }
            // Unterminated `{{` -- the remainder is literal text.
            None => break,
        }
    }
    out.push_str(rest);
    out
}

/// Placeholder names referenced by a template, in order of appearance.
/// Shares its scan with `render_content` so validation matches rendering.
pub fn placeholders(template: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        let after_open = &rest[open + 2..];
        match after_open.find("}}") {
            Some(close) => {
                let name = after_open[..close].trim();
                if name.is_empty() {
                    rest = after_open;
                } else {
                    names.push(name.to_string());
                    rest = &after_open[close + 2..];
                }
            }
            None => break,
        }
    }
    names
}

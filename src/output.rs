use comfy_table::{
    modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Attribute, Cell, Color,
    ContentArrangement, Table,
};

use crate::rules::config::{AutomationRule, EvaluatorCode};

/// Map an outcome status to its display color.
fn status_color(status: &str) -> Color {
    match status {
        "scored" => Color::Green,
        "skipped" => Color::Yellow,
        _ => Color::Red,
    }
}

/// Create a colored Cell for an outcome status.
fn status_cell(status: &str) -> Cell {
    Cell::new(status).fg(status_color(status))
}

fn base_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn header_cell(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}

/// One-line summary of a rule's payload for the rules table.
fn code_summary(rule: &AutomationRule) -> String {
    match &rule.code {
        EvaluatorCode::LlmAsJudge(code) => format!(
            "{} | {} msg | {} var | {} field",
            code.model.name,
            code.messages.len(),
            code.variables.len(),
            code.schema.len()
        ),
        EvaluatorCode::FieldChecks(code) => format!("{} checks", code.checks.len()),
    }
}

/// Compact rules listing.
pub fn rules_table(rules: &[&AutomationRule]) -> Table {
    let mut table = base_table();
    table.set_header(vec![
        header_cell("name"),
        header_cell("type"),
        header_cell("sampling"),
        header_cell("config"),
    ]);
    for rule in rules {
        table.add_row(vec![
            Cell::new(&rule.name),
            Cell::new(rule.code.kind()),
            Cell::new(format!("{:.2}", rule.sampling_rate)),
            Cell::new(code_summary(rule)),
        ]);
    }
    table
}

/// Verbose rules listing: one row per declared output field or check.
pub fn rules_table_verbose(rules: &[&AutomationRule]) -> Table {
    let mut table = base_table();
    table.set_header(vec![
        header_cell("rule"),
        header_cell("field"),
        header_cell("type"),
        header_cell("detail"),
    ]);
    for rule in rules {
        match &rule.code {
            EvaluatorCode::LlmAsJudge(code) => {
                for field in &code.schema {
                    table.add_row(vec![
                        Cell::new(&rule.name),
                        Cell::new(&field.name),
                        Cell::new(field.field_type),
                        Cell::new(&field.description),
                    ]);
                }
            }
            EvaluatorCode::FieldChecks(code) => {
                for check in &code.checks {
                    let detail = match &check.expect {
                        crate::checks::Expectation::Exists(want) => {
                            format!("{} exists: {want}", check.path)
                        }
                        crate::checks::Expectation::Equals(v) => {
                            format!("{} == {v:?}", check.path)
                        }
                        crate::checks::Expectation::Contains(v) => {
                            format!("{} contains {v:?}", check.path)
                        }
                    };
                    table.add_row(vec![
                        Cell::new(&rule.name),
                        Cell::new(&check.name),
                        Cell::new("boolean"),
                        Cell::new(detail),
                    ]);
                }
            }
        }
    }
    table
}

/// Batch-check results: one row per (record, rule) pair.
pub fn check_table(rows: &[(String, String, String, String)]) -> Table {
    let mut table = base_table();
    table.set_header(vec![
        header_cell("record"),
        header_cell("rule"),
        header_cell("status"),
        header_cell("detail"),
    ]);
    for (record, rule, status, detail) in rows {
        table.add_row(vec![
            Cell::new(record),
            Cell::new(rule),
            status_cell(status),
            Cell::new(detail),
        ]);
    }
    table
}

use chrono::Utc;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use crate::rules::config::AutomationRule;
use crate::types::{Outcome, TraceRecord};

#[derive(Debug, Serialize)]
pub struct LogEntry {
    pub ts: String,
    pub rule: String,
    pub kind: String,
    pub record_id: Option<String>,
    pub status: String,
    pub fields_scored: usize,
    pub fields_failed: usize,
    pub reason: Option<String>,
}

/// Default log directory.
fn default_log_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".config").join("dragnet").join("logs")
}

/// Default log file path.
fn log_file_path() -> PathBuf {
    default_log_dir().join("dragnet.jsonl")
}

/// Write a log entry. Errors are printed to stderr but do not fail the process.
pub fn log_outcome(entry: &LogEntry) {
    log_outcome_to(entry, &log_file_path());
}

/// Write a log entry to a specific path (for testing).
pub fn log_outcome_to(entry: &LogEntry, path: &PathBuf) {
    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            eprintln!("dragnet: failed to create log directory: {e}");
            return;
        }
    }

    let json = match serde_json::to_string(entry) {
        Ok(j) => j,
        Err(e) => {
            eprintln!("dragnet: failed to serialize log entry: {e}");
            return;
        }
    };

    let mut file = match OpenOptions::new().create(true).append(true).open(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("dragnet: failed to open log file: {e}");
            return;
        }
    };

    if let Err(e) = writeln!(file, "{json}") {
        eprintln!("dragnet: failed to write log entry: {e}");
    }
}

/// Create a log entry from one rule's outcome on one record.
pub fn make_entry(rule: &AutomationRule, record: &TraceRecord, outcome: &Outcome) -> LogEntry {
    let (fields_scored, fields_failed, reason) = match outcome {
        Outcome::Skipped => (0, 0, None),
        Outcome::Scored { scores } => {
            let failed = scores.iter().filter(|s| s.failure.is_some()).count();
            (scores.len() - failed, failed, None)
        }
        Outcome::Failed { reason } => (0, 0, Some(truncate(reason))),
    };

    LogEntry {
        ts: Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        rule: rule.name.clone(),
        kind: rule.code.kind().to_string(),
        record_id: record.id.clone(),
        status: outcome.status().to_string(),
        fields_scored,
        fields_failed,
        reason,
    }
}

fn truncate(reason: &str) -> String {
    if reason.len() > 1024 {
        let mut cut = 1024;
        while !reason.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}...", &reason[..cut])
    } else {
        reason.to_string()
    }
}

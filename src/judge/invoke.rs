//! Model invocation boundary.
//!
//! The core never talks to a provider directly: a `ModelClient` receives the
//! rendered role-tagged messages plus model parameters and returns raw text.
//! The default client shells out to a configurable external command with a
//! timeout; provider failures surface as per-evaluation errors and are not
//! retried here.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::prompt::RenderedMessage;

/// Everything the provider needs for one completion.
#[derive(Debug, Clone, Serialize)]
pub struct ModelRequest {
    pub model: String,
    pub temperature: f64,
    pub messages: Vec<RenderedMessage>,
}

pub trait ModelClient {
    /// Return the model's raw text reply, or a provider-level failure.
    fn complete(&self, request: &ModelRequest) -> Result<String, String>;
}

// ── Client config ───────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_command")]
    pub command: String,
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

fn default_command() -> String {
    "claude -p".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_config_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
    PathBuf::from(home)
        .join(".config")
        .join("dragnet")
        .join("model.yaml")
}

pub fn load_model_config() -> ModelConfig {
    let path = default_config_path();
    load_model_config_from_path(&path)
}

fn load_model_config_from_path(path: &Path) -> ModelConfig {
    if !path.exists() {
        return default_model_config();
    }
    match std::fs::read_to_string(path) {
        Ok(content) => serde_norway::from_str(&content).unwrap_or_else(|e| {
            eprintln!("dragnet: failed to parse model config: {e}");
            default_model_config()
        }),
        Err(e) => {
            eprintln!("dragnet: failed to read model config: {e}");
            default_model_config()
        }
    }
}

pub(crate) fn default_model_config() -> ModelConfig {
    ModelConfig {
        command: default_command(),
        timeout: default_timeout(),
    }
}

// ── Subprocess-backed client ────────────────────────────────────

/// Invokes an external command with the JSON request as its final argument
/// and reads the reply from stdout.
pub struct CommandClient {
    command: String,
    timeout: u64,
}

impl CommandClient {
    pub fn new(command: &str, timeout: u64) -> Self {
        Self {
            command: command.to_string(),
            timeout,
        }
    }

    pub fn from_config(config: &ModelConfig) -> Self {
        Self::new(&config.command, config.timeout)
    }
}

impl ModelClient for CommandClient {
    fn complete(&self, request: &ModelRequest) -> Result<String, String> {
        let parts: Vec<String> = self.command.split_whitespace().map(String::from).collect();
        if parts.is_empty() {
            eprintln!("dragnet: model command is empty");
            return Err("model command is empty".to_string());
        }

        let payload = serde_json::to_string(request)
            .map_err(|e| format!("failed to serialize model request: {e}"))?;

        let timeout = std::time::Duration::from_secs(self.timeout);
        let (tx, rx) = std::sync::mpsc::channel();

        std::thread::spawn(move || {
            let result = std::process::Command::new(&parts[0])
                .args(&parts[1..])
                .arg(&payload)
                .stdout(std::process::Stdio::piped())
                .stderr(std::process::Stdio::piped())
                .output();
            let _ = tx.send(result);
        });

        match rx.recv_timeout(timeout) {
            Ok(Ok(output)) => {
                if !output.status.success() {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    return Err(format!(
                        "model command exited with {}: {}",
                        output.status,
                        stderr.trim()
                    ));
                }
                Ok(String::from_utf8_lossy(&output.stdout).to_string())
            }
            Ok(Err(e)) => Err(format!("model command error: {e}")),
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {
                Err(format!("model invocation timed out after {}s", self.timeout))
            }
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => {
                Err("model invocation thread error".to_string())
            }
        }
    }
}

// ── Fixed-response client ───────────────────────────────────────

/// Offline client returning a canned reply; used by tests and dry runs.
#[derive(Debug, Default)]
pub struct FakeClient {
    response: Option<String>,
    failure: Option<String>,
}

impl FakeClient {
    pub fn with_response(response: &str) -> Self {
        Self {
            response: Some(response.to_string()),
            failure: None,
        }
    }

    pub fn with_failure(reason: &str) -> Self {
        Self {
            response: None,
            failure: Some(reason.to_string()),
        }
    }
}

impl ModelClient for FakeClient {
    fn complete(&self, _request: &ModelRequest) -> Result<String, String> {
        if let Some(reason) = &self.failure {
            return Err(reason.clone());
        }
        Ok(self.response.clone().unwrap_or_default())
    }
}

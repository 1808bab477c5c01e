//! Shared test harness for dragnet integration tests.
//!
//! Every invocation gets an isolated HOME so the rules path, model config,
//! and JSONL log never touch the developer's real config. Model replies are
//! stubbed with a small executable script so no test invokes a real model.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Captures exit code, stdout, and stderr from a dragnet invocation.
pub struct RunResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl RunResult {
    /// Parse evaluate-mode stdout as a JSON report.
    pub fn report(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout).unwrap_or_else(|e| {
            panic!(
                "Failed to parse stdout as JSON: {e}\nstdout: {}\nstderr: {}",
                self.stdout, self.stderr
            )
        })
    }

    /// Status of one rule inside the report.
    pub fn status_of(&self, rule: &str) -> String {
        let report = self.report();
        let results = report["results"].as_array().unwrap_or_else(|| {
            panic!("Missing results array in: {}", self.stdout);
        });
        results
            .iter()
            .find(|r| r["rule"] == rule)
            .unwrap_or_else(|| panic!("No result for rule '{rule}' in: {}", self.stdout))["status"]
            .as_str()
            .unwrap()
            .to_string()
    }

    pub fn assert_status(&self, rule: &str, expected: &str) {
        let actual = self.status_of(rule);
        assert_eq!(
            actual, expected,
            "Expected rule '{rule}' status '{expected}' but got '{actual}'\nstdout: {}\nstderr: {}",
            self.stdout, self.stderr
        );
    }
}

/// Path to the compiled dragnet binary.
pub fn dragnet_bin() -> PathBuf {
    assert_cmd::cargo::cargo_bin("dragnet")
}

/// An isolated test environment with its own HOME. Temp directories are
/// cleaned up on drop.
pub struct TestEnv {
    home_dir: tempfile::TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        let home_dir = tempfile::TempDir::new().expect("Failed to create temp HOME dir");
        let config_dir = home_dir.path().join(".config").join("dragnet");
        std::fs::create_dir_all(&config_dir).unwrap();
        // Default to a model command that cannot exist, so a test that
        // forgets to stub the model fails fast instead of calling out.
        std::fs::write(
            config_dir.join("model.yaml"),
            "command: /definitely-not-a-real-model-command-12345\ntimeout: 1\n",
        )
        .unwrap();
        Self { home_dir }
    }

    pub fn home_path(&self) -> &Path {
        self.home_dir.path()
    }

    pub fn config_dir(&self) -> PathBuf {
        self.home_path().join(".config").join("dragnet")
    }

    /// Write a rules file into the environment and return its path.
    pub fn write_rules(&self, yaml: &str) -> PathBuf {
        let path = self.home_path().join("test-rules.yaml");
        std::fs::write(&path, yaml).unwrap();
        path
    }

    /// Point the model config at a stub script that prints `reply`.
    #[cfg(unix)]
    pub fn stub_model(&self, reply: &str) {
        use std::os::unix::fs::PermissionsExt;

        let script_path = self.home_path().join("model-stub.sh");
        let script = format!("#!/bin/sh\ncat <<'DRAGNET_EOF'\n{reply}\nDRAGNET_EOF\n");
        std::fs::write(&script_path, script).unwrap();
        let mut perms = std::fs::metadata(&script_path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&script_path, perms).unwrap();

        std::fs::write(
            self.config_dir().join("model.yaml"),
            format!("command: {}\ntimeout: 10\n", script_path.display()),
        )
        .unwrap();
    }

    /// Run dragnet in evaluate mode with a record piped to stdin.
    pub fn run_evaluate(&self, record_json: &str, extra_args: &[&str]) -> RunResult {
        let mut child = Command::new(dragnet_bin())
            .args(extra_args)
            .env("HOME", self.home_path())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("Failed to spawn dragnet");

        // The child may reject its config and exit before reading stdin; a
        // broken pipe here is expected, so don't let it panic the test.
        let _ = child
            .stdin
            .take()
            .unwrap()
            .write_all(record_json.as_bytes());

        let output = child.wait_with_output().unwrap();
        RunResult {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }

    /// Run a dragnet subcommand (rules, check, validate, init).
    pub fn run_subcommand(&self, args: &[&str]) -> RunResult {
        let child = Command::new(dragnet_bin())
            .args(args)
            .env("HOME", self.home_path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("Failed to spawn dragnet");

        let output = child.wait_with_output().unwrap();
        RunResult {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }
}

/// A single-rule llm_as_judge config with the given sampling rate.
pub fn judge_rules_yaml(sampling_rate: f64) -> String {
    format!(
        r#"
version: 1
rules:
  - name: answer-correctness
    sampling_rate: {sampling_rate}
    type: llm_as_judge
    code:
      model:
        name: gpt-4o-mini
        temperature: 0.0
      messages:
        - role: user
          content: "Answer is correct for: {{{{q}}}}"
      variables:
        q: input.question
      schema:
        - name: correctness
          type: boolean
          description: True when the answer is correct.
"#
    )
}

/// A field_checks-only config; evaluates without any model.
pub fn checks_rules_yaml() -> &'static str {
    r#"
version: 1
rules:
  - name: trace-shape
    sampling_rate: 1.0
    type: field_checks
    code:
      checks:
        - name: has_input
          path: input
          expect:
            exists: true
        - name: status_ok
          path: metadata.status
          expect:
            equals: ok
"#
}

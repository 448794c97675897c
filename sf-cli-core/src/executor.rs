//! Runs the Salesforce `sf` CLI and parses its `--json` output.
//!
//! Every invocation is spawned directly (no shell), with `--json` appended so
//! the output can be decoded into a [`serde_json::Value`]. Failures are mapped
//! onto [`ExecutorError`] so callers can tell a missing binary apart from a
//! failed command.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, error, info};

use crate::contract::CommandRunner;

/// Alias meaning "whatever org `sf` has configured as its default".
pub const DEFAULT_ORG_ALIAS: &str = "default";

/// Program spawned when no path is configured. On Windows the Salesforce CLI
/// installs a `sf.cmd` shim, and process lookup only appends `.exe`.
pub const DEFAULT_PROGRAM: &str = if cfg!(windows) { "sf.cmd" } else { "sf" };

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("The '{program}' command was not found. Please ensure Salesforce CLI is installed and in your PATH.")]
    NotInstalled { program: String },
    #[error("{message}")]
    CommandFailed { message: String },
    #[error("Error parsing JSON output from Salesforce CLI: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("Failed to run Salesforce CLI: {0}")]
    Io(std::io::Error),
    #[error("Unexpected Salesforce CLI response: {0}")]
    UnexpectedResponse(String),
}

/// One `sf` invocation, without the trailing `--json`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SfCommand {
    args: Vec<String>,
}

impl SfCommand {
    /// Starts a command from its space separated topic, e.g. `"data query"`.
    pub fn new(topic: &str) -> Self {
        Self {
            args: topic.split_whitespace().map(str::to_owned).collect(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Appends `--target-org <alias>` unless the alias is [`DEFAULT_ORG_ALIAS`].
    pub fn target_org(self, alias: &str) -> Self {
        if alias.is_empty() || alias == DEFAULT_ORG_ALIAS {
            self
        } else {
            self.arg("--target-org").arg(alias)
        }
    }

    pub fn as_args(&self) -> &[String] {
        &self.args
    }
}

impl std::fmt::Display for SfCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.args.join(" "))
    }
}

/// Executes [`SfCommand`]s against a real `sf` binary.
#[derive(Debug, Clone)]
pub struct SfExecutor {
    program: PathBuf,
}

impl Default for SfExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl SfExecutor {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

#[async_trait]
impl CommandRunner for SfExecutor {
    async fn run(&self, command: SfCommand) -> Result<Value, ExecutorError> {
        let program = self.program.display().to_string();
        info!(program = %program, command = %command, "Running Salesforce CLI command");

        let output = Command::new(&self.program)
            .args(command.as_args())
            .arg("--json")
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    error!(program = %program, "Salesforce CLI binary not found");
                    ExecutorError::NotInstalled {
                        program: program.clone(),
                    }
                } else {
                    error!(error = ?e, program = %program, "Failed to launch Salesforce CLI");
                    ExecutorError::Io(e)
                }
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            let message = failure_message(&stdout, &stderr);
            error!(
                command = %command,
                status = ?output.status,
                message = %message,
                "Salesforce CLI command exited with non-zero code"
            );
            return Err(ExecutorError::CommandFailed { message });
        }

        let value: Value = serde_json::from_str(&stdout).map_err(|e| {
            error!(error = ?e, command = %command, "Salesforce CLI returned non-JSON output");
            ExecutorError::InvalidJson(e)
        })?;
        debug!(command = %command, "Salesforce CLI command succeeded");
        Ok(value)
    }
}

/// Picks the most useful error message out of a failed invocation.
///
/// `sf --json` reports errors as JSON on stdout, older versions on stderr.
pub fn failure_message(stdout: &str, stderr: &str) -> String {
    for stream in [stderr, stdout] {
        if let Ok(json) = serde_json::from_str::<Value>(stream.trim()) {
            if let Some(message) = json.get("message").and_then(Value::as_str) {
                return message.to_owned();
            }
        }
    }
    let stderr = stderr.trim();
    if stderr.is_empty() {
        "Salesforce CLI command failed.".to_owned()
    } else {
        format!("Salesforce CLI command failed with error: {stderr}")
    }
}

/// Returns `value["result"]`, or an [`ExecutorError::UnexpectedResponse`].
pub fn result_of(value: &Value) -> Result<&Value, ExecutorError> {
    value
        .get("result")
        .ok_or_else(|| ExecutorError::UnexpectedResponse("missing 'result' field".to_owned()))
}

/// Returns the `result.records` array of a `data query` response (empty when absent).
pub fn query_records(value: &Value) -> Vec<Value> {
    value
        .get("result")
        .and_then(|r| r.get("records"))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

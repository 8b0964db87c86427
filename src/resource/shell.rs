//! Shell tasks: check and apply via shell commands.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Result, StewardError};

use super::Reconcile;
use super::status::{Severity, Status};

/// A task whose check and apply steps are shell commands.
///
/// The check command's exit status decides whether the task needs to run:
/// non-zero means the apply command would change something.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShellTask {
    /// Task name, taken from the block label.
    #[serde(skip)]
    pub name: String,
    /// Command probing current state.
    #[serde(default)]
    pub check: String,
    /// Command converging state when the check fails.
    #[serde(default)]
    pub apply: String,
}

/// Runs a script under `sh -c`, capturing its output.
async fn run(script: &str) -> std::io::Result<std::process::Output> {
    tokio::process::Command::new("sh")
        .arg("-c")
        .arg(script)
        .output()
        .await
}

#[async_trait]
impl Reconcile for ShellTask {
    fn name(&self) -> &str {
        &self.name
    }

    async fn check(&self) -> Result<Status> {
        let output = run(&self.check).await?;
        let stdout = String::from_utf8_lossy(&output.stdout);

        let mut status = Status::new(stdout.trim());
        if !output.status.success() {
            debug!("Task {} check exited {}", self.name, output.status);
            status.will_change = true;
            status.severity = Severity::WillChange;
        }

        Ok(status)
    }

    async fn apply(&self) -> Result<()> {
        let output = run(&self.apply).await?;
        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        let message = if stderr.is_empty() {
            output.status.to_string()
        } else {
            format!("{}: {stderr}", output.status)
        };

        Err(StewardError::TaskFailed {
            name: self.name.clone(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_check_success_means_no_change() {
        let task = ShellTask {
            name: String::from("noop"),
            check: String::from("echo converged"),
            apply: String::from("true"),
        };
        let status = task.check().await.unwrap();
        assert_eq!(status.label, "converged");
        assert!(!status.will_change);
        assert_eq!(status.severity, Severity::Ok);
    }

    #[tokio::test]
    async fn test_check_failure_means_change_needed() {
        let task = ShellTask {
            name: String::from("drifted"),
            check: String::from("false"),
            apply: String::from("true"),
        };
        let status = task.check().await.unwrap();
        assert!(status.will_change);
        assert_eq!(status.severity, Severity::WillChange);
    }

    #[tokio::test]
    async fn test_apply_success() {
        let task = ShellTask {
            name: String::from("touchy"),
            check: String::from("false"),
            apply: String::from("true"),
        };
        assert!(task.apply().await.is_ok());
    }

    #[tokio::test]
    async fn test_apply_failure_carries_stderr() {
        let task = ShellTask {
            name: String::from("broken"),
            check: String::from("false"),
            apply: String::from("echo boom >&2; exit 3"),
        };
        let err = task.apply().await.unwrap_err();
        let rendered = err.to_string();
        assert!(rendered.contains("broken"));
        assert!(rendered.contains("boom"));
    }
}

//! Model invocation: hand a prompt to a local model runtime and collect its answer.
//!
//! [`ModelInvoker`] is the seam between the pipeline and whatever produces
//! text. The default implementation, [`CommandInvoker`], starts one external
//! process per call (by default `ollama run mistral <prompt>`), waits for it
//! to exit and returns its standard output untouched.
//!
//! ## Contract
//!
//! - exit status 0 → captured stdout, verbatim
//! - non-zero exit or signal → [`AnalystError::InvocationFailed`] carrying the
//!   captured stderr
//! - the process cannot be started → [`AnalystError::ModelCommandUnavailable`]
//!
//! There is no timeout and no retry: a call runs until the process exits.

use crate::config::AnalysisConfig;
use crate::error::AnalystError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::process::Stdio;
use std::time::Instant;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Something that turns a prompt into model output.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    /// Run the model on `prompt` and return its full output.
    async fn invoke(&self, prompt: &str) -> Result<String, AnalystError>;

    /// Short human-readable description used in logs.
    fn describe(&self) -> String {
        "model".to_string()
    }
}

/// How the prompt reaches the model process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PromptDelivery {
    /// Final positional argument: `<program> <subcommand> <model> <prompt>`. (default)
    #[default]
    Argument,
    /// Written to the child's stdin: `<program> <subcommand> <model>`.
    ///
    /// Linux caps a single argument at 128 KiB, so very large reports need this.
    Stdin,
}

/// Runs a model through a command-line executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvoker {
    program: String,
    subcommand: String,
    model: String,
    delivery: PromptDelivery,
}

impl CommandInvoker {
    pub fn new(
        program: impl Into<String>,
        subcommand: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            program: program.into(),
            subcommand: subcommand.into(),
            model: model.into(),
            delivery: PromptDelivery::default(),
        }
    }

    pub fn with_delivery(mut self, delivery: PromptDelivery) -> Self {
        self.delivery = delivery;
        self
    }

    /// Build the invoker described by the command fields of `config`.
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(&config.command, &config.subcommand, &config.model)
            .with_delivery(config.prompt_delivery)
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_command(&self, prompt: &str) -> Command {
        let mut command = Command::new(&self.program);
        command.arg(&self.subcommand).arg(&self.model);

        match self.delivery {
            PromptDelivery::Argument => {
                command.arg(prompt).stdin(Stdio::null());
            }
            PromptDelivery::Stdin => {
                command.stdin(Stdio::piped());
            }
        }

        command.stdout(Stdio::piped()).stderr(Stdio::piped());
        command
    }
}

impl Default for CommandInvoker {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

#[async_trait]
impl ModelInvoker for CommandInvoker {
    async fn invoke(&self, prompt: &str) -> Result<String, AnalystError> {
        let start = Instant::now();
        info!(
            "Running {} ({} prompt chars, prompt via {:?})",
            self.describe(),
            prompt.chars().count(),
            self.delivery
        );

        let mut child = self.build_command(prompt).spawn().map_err(|e| {
            AnalystError::ModelCommandUnavailable {
                command: self.program.clone(),
                detail: e.to_string(),
            }
        })?;

        // Feed stdin while draining stdout/stderr, otherwise a chatty child can
        // block on a full pipe while we block on a full stdin.
        let waited = match child.stdin.take() {
            Some(mut stdin) => {
                let write = async move {
                    let written = stdin.write_all(prompt.as_bytes()).await;
                    drop(stdin);
                    written
                };
                let (written, output) = tokio::join!(write, child.wait_with_output());
                if let Err(e) = written {
                    // The child may exit without reading its input.
                    warn!("{}: could not write the full prompt to stdin: {}", self.program, e);
                }
                output
            }
            None => child.wait_with_output().await,
        };

        let output = waited.map_err(|e| {
            AnalystError::Unexpected(format!("Failed to wait for '{}': {}", self.program, e))
        })?;

        let elapsed = start.elapsed();
        if output.status.success() {
            debug!(
                "{} finished in {:?} ({} bytes of output)",
                self.describe(),
                elapsed,
                output.stdout.len()
            );
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            warn!(
                "{} failed after {:?} with {}",
                self.describe(),
                elapsed,
                output.status
            );
            Err(AnalystError::InvocationFailed {
                command: self.program.clone(),
                status: output.status.code(),
                stderr,
            })
        }
    }

    fn describe(&self) -> String {
        format!("{} {} {}", self.program, self.subcommand, self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_run_mistral_through_ollama() {
        let invoker = CommandInvoker::default();
        assert_eq!(invoker.describe(), "ollama run mistral");
        assert_eq!(invoker.delivery, PromptDelivery::Argument);
    }

    #[test]
    fn argument_delivery_passes_prompt_last() {
        let invoker = CommandInvoker::new("ollama", "run", "mistral");
        let command = invoker.build_command("hello");
        let args: Vec<_> = command.as_std().get_args().collect();
        assert_eq!(args, ["run", "mistral", "hello"]);
    }

    #[test]
    fn stdin_delivery_keeps_prompt_out_of_argv() {
        let invoker =
            CommandInvoker::new("ollama", "run", "mistral").with_delivery(PromptDelivery::Stdin);
        let command = invoker.build_command("hello");
        let args: Vec<_> = command.as_std().get_args().collect();
        assert_eq!(args, ["run", "mistral"]);
    }

    #[tokio::test]
    async fn missing_program_is_unavailable() {
        let invoker = CommandInvoker::new("edgequake-no-such-model-runtime", "run", "mistral");
        let err = invoker.invoke("hi").await.unwrap_err();
        assert!(
            matches!(err, AnalystError::ModelCommandUnavailable { ref command, .. } if command == "edgequake-no-such-model-runtime"),
            "got {err:?}"
        );
    }

    // The `sh -c <script>` trick: subcommand = "-c", model = script, and the
    // prompt lands in `$0`.

    #[cfg(unix)]
    #[tokio::test]
    async fn success_returns_stdout_verbatim() {
        let invoker = CommandInvoker::new("sh", "-c", "printf 'Summary: ...\\n\\n  trailing  '");
        let out = invoker.invoke("ignored").await.unwrap();
        assert_eq!(out, "Summary: ...\n\n  trailing  ");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn prompt_arrives_as_single_argument() {
        let invoker = CommandInvoker::new("sh", "-c", "printf '%s' \"$0\"");
        let prompt = "Report:\nRevenue: $10,000 'quoted' \"double\"";
        assert_eq!(invoker.invoke(prompt).await.unwrap(), prompt);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failure_embeds_stderr_and_status() {
        let invoker = CommandInvoker::new(
            "sh",
            "-c",
            "echo partial; echo 'pull model manifest: file does not exist' >&2; exit 3",
        );
        match invoker.invoke("x").await.unwrap_err() {
            AnalystError::InvocationFailed { status, stderr, command } => {
                assert_eq!(status, Some(3));
                assert_eq!(command, "sh");
                assert!(stderr.contains("pull model manifest"), "got: {stderr}");
            }
            other => panic!("expected InvocationFailed, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn killed_process_has_no_status() {
        let invoker = CommandInvoker::new("sh", "-c", "kill -9 $$");
        match invoker.invoke("x").await.unwrap_err() {
            AnalystError::InvocationFailed { status, .. } => assert_eq!(status, None),
            other => panic!("expected InvocationFailed, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stdin_delivery_round_trips_large_prompt() {
        let invoker = CommandInvoker::new("sh", "-c", "cat").with_delivery(PromptDelivery::Stdin);
        let prompt = "Revenue by region\n".repeat(64 * 1024);
        let out = invoker.invoke(&prompt).await.unwrap();
        assert_eq!(out.len(), prompt.len());
        assert_eq!(out, prompt);
    }
}

//! Configuration for report analysis.
//!
//! All behaviour is controlled through [`AnalysisConfig`], built via its
//! [`AnalysisConfigBuilder`]. Callers set only what they care about and rely
//! on the documented defaults for the rest.

use crate::error::AnalystError;
use crate::pipeline::invoke::{ModelInvoker, PromptDelivery};
use crate::progress::ProgressCallback;
use crate::prompts::REPORT_PLACEHOLDER;
use std::fmt;
use std::sync::Arc;

/// Configuration for one or more analysis runs.
///
/// Built via [`AnalysisConfig::builder()`] or using
/// [`AnalysisConfig::default()`].
///
/// # Example
/// ```rust
/// use edgequake_analyst::AnalysisConfig;
///
/// let config = AnalysisConfig::builder()
///     .model("llama3.1")
///     .build()
///     .unwrap();
/// assert_eq!(config.command, "ollama");
/// ```
#[derive(Clone)]
pub struct AnalysisConfig {
    /// Model runtime executable. Default: `ollama`.
    pub command: String,

    /// Sub-command selecting "run" semantics. Default: `run`.
    pub subcommand: String,

    /// Model identifier passed after the sub-command. Default: `mistral`.
    pub model: String,

    /// How the prompt is handed to the process. Default: [`PromptDelivery::Argument`].
    pub prompt_delivery: PromptDelivery,

    /// Custom prompt template containing `{report}`. If None, uses
    /// [`crate::prompts::DEFAULT_PROMPT_TEMPLATE`].
    pub prompt_template: Option<String>,

    /// Prompt length (in characters) above which a warning is logged. Default: 32 000.
    ///
    /// The prompt is never truncated; local models with small context
    /// windows may silently ignore the tail of very long reports.
    pub prompt_warn_chars: usize,

    /// Pre-constructed invoker. Takes precedence over `command`/`subcommand`/`model`.
    pub invoker: Option<Arc<dyn ModelInvoker>>,

    /// Receives phase events (extraction, invocation).
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            command: "ollama".to_string(),
            subcommand: "run".to_string(),
            model: "mistral".to_string(),
            prompt_delivery: PromptDelivery::default(),
            prompt_template: None,
            prompt_warn_chars: 32_000,
            invoker: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for AnalysisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisConfig")
            .field("command", &self.command)
            .field("subcommand", &self.subcommand)
            .field("model", &self.model)
            .field("prompt_delivery", &self.prompt_delivery)
            .field("prompt_template", &self.prompt_template.as_ref().map(|t| t.len()))
            .field("prompt_warn_chars", &self.prompt_warn_chars)
            .field("invoker", &self.invoker.as_ref().map(|i| i.describe()))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn AnalysisProgressCallback>"),
            )
            .finish()
    }
}

impl AnalysisConfig {
    /// Create a new builder for `AnalysisConfig`.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`AnalysisConfig`].
#[derive(Debug)]
pub struct AnalysisConfigBuilder {
    config: AnalysisConfig,
}

impl AnalysisConfigBuilder {
    pub fn command(mut self, command: impl Into<String>) -> Self {
        self.config.command = command.into();
        self
    }

    pub fn subcommand(mut self, subcommand: impl Into<String>) -> Self {
        self.config.subcommand = subcommand.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn prompt_delivery(mut self, delivery: PromptDelivery) -> Self {
        self.config.prompt_delivery = delivery;
        self
    }

    pub fn prompt_template(mut self, template: impl Into<String>) -> Self {
        self.config.prompt_template = Some(template.into());
        self
    }

    pub fn prompt_warn_chars(mut self, chars: usize) -> Self {
        self.config.prompt_warn_chars = chars;
        self
    }

    pub fn invoker(mut self, invoker: Arc<dyn ModelInvoker>) -> Self {
        self.config.invoker = Some(invoker);
        self
    }

    pub fn progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.config.progress_callback = Some(callback);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AnalysisConfig, AnalystError> {
        let c = &self.config;
        if c.invoker.is_none() {
            if c.command.trim().is_empty() {
                return Err(AnalystError::InvalidConfig(
                    "Model command must not be empty".into(),
                ));
            }
            if c.model.trim().is_empty() {
                return Err(AnalystError::InvalidConfig(
                    "Model name must not be empty".into(),
                ));
            }
        }
        if let Some(ref template) = c.prompt_template {
            if !template.contains(REPORT_PLACEHOLDER) {
                return Err(AnalystError::InvalidConfig(format!(
                    "Prompt template must contain the {REPORT_PLACEHOLDER} placeholder"
                )));
            }
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_ollama_mistral() {
        let c = AnalysisConfig::default();
        assert_eq!(c.command, "ollama");
        assert_eq!(c.subcommand, "run");
        assert_eq!(c.model, "mistral");
        assert_eq!(c.prompt_delivery, PromptDelivery::Argument);
        assert!(c.prompt_template.is_none());
        assert!(c.invoker.is_none());
    }

    #[test]
    fn builder_sets_fields() {
        let c = AnalysisConfig::builder()
            .command("/usr/local/bin/ollama")
            .model("llama3.1:8b")
            .prompt_delivery(PromptDelivery::Stdin)
            .prompt_warn_chars(1_000)
            .build()
            .unwrap();
        assert_eq!(c.command, "/usr/local/bin/ollama");
        assert_eq!(c.model, "llama3.1:8b");
        assert_eq!(c.prompt_delivery, PromptDelivery::Stdin);
        assert_eq!(c.prompt_warn_chars, 1_000);
    }

    #[test]
    fn empty_model_rejected() {
        let err = AnalysisConfig::builder().model("  ").build().unwrap_err();
        assert!(err.to_string().contains("Model name"));
    }

    #[test]
    fn empty_command_rejected() {
        assert!(AnalysisConfig::builder().command("").build().is_err());
    }

    #[test]
    fn template_requires_placeholder() {
        assert!(AnalysisConfig::builder()
            .prompt_template("Summarise this")
            .build()
            .is_err());
        assert!(AnalysisConfig::builder()
            .prompt_template("Summarise this:\n{report}")
            .build()
            .is_ok());
    }

    #[test]
    fn debug_does_not_dump_template() {
        let c = AnalysisConfig::builder()
            .prompt_template("secret instructions {report}")
            .build()
            .unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("secret instructions"));
        assert!(dbg.contains("mistral"));
    }
}

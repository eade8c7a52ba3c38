//! Error types for the edgequake-analyst library.
//!
//! Every failure a report analysis can hit is a variant of [`AnalystError`],
//! and every variant's `Display` output is written for the end user: the CLI
//! prints it verbatim, and so can any other presentation layer.
//!
//! "The document contained no text" is deliberately *not* an error. It is
//! reported as [`crate::output::AnalysisOutcome::NoTextExtracted`] so callers
//! can warn instead of fail.

use crate::pipeline::input::DocumentFormat;
use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the edgequake-analyst library.
#[derive(Debug, Error)]
pub enum AnalystError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Report file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file's format tag is not one the extractor understands.
    ///
    /// Raised before any byte of the document is parsed.
    #[error("Unsupported file format for '{filename}'.\nUpload a PDF (.pdf) or a spreadsheet (.xlsx, .xlsm, .xlsb, .xls, .ods).")]
    UnsupportedFormat { filename: String },

    // ── Extraction errors ─────────────────────────────────────────────────
    /// The content could not be parsed as its declared format.
    #[error("Failed to read file '{filename}' as {format}: {detail}")]
    DocumentRead {
        filename: String,
        format: DocumentFormat,
        detail: String,
    },

    // ── Model errors ──────────────────────────────────────────────────────
    /// The model process ran but exited unsuccessfully.
    ///
    /// `status` is `None` when the process was terminated by a signal.
    #[error("Error calling model via '{command}' ({}): {stderr}", exit_description(.status))]
    InvocationFailed {
        command: String,
        status: Option<i32>,
        stderr: String,
    },

    /// The model command could not be started at all.
    #[error(
        "Could not start model command '{command}': {detail}\n\n\
Make sure the model runtime is installed and on your PATH, e.g.:\n\
  • Install Ollama from https://ollama.com/\n\
  • Pull the model:  ollama pull mistral\n\
  • Or point --command at another executable.\n"
    )]
    ModelCommandUnavailable { command: String, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Any other failure during extraction or invocation.
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

fn exit_description(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exit status {code}"),
        None => "terminated by signal".to_string(),
    }
}

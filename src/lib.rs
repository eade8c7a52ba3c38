//! # edgequake-analyst
//!
//! Summarise a commercial report (PDF or spreadsheet) with a locally running
//! language model and get sales, portfolio and resource-allocation
//! recommendations back.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF / XLSX
//!  │
//!  ├─ 1. Input    read the upload, infer its format from the filename
//!  ├─ 2. Extract  page text (lopdf) or first-sheet rows (calamine)
//!  ├─ 3. Prompt   fixed commercial-analyst template + the extracted text
//!  └─ 4. Invoke   `ollama run mistral <prompt>`, stdout returned verbatim
//! ```
//!
//! A document with no extractable text stops after step 2 with
//! [`AnalysisOutcome::NoTextExtracted`]; the model is never called.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_analyst::{analyze_file, AnalysisConfig, AnalysisOutcome};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AnalysisConfig::default(); // ollama run mistral
//!     match analyze_file("q3-report.pdf", &config).await? {
//!         AnalysisOutcome::Completed(output) => println!("{}", output.result),
//!         AnalysisOutcome::NoTextExtracted(_) => eprintln!("No text was extracted from the file."),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `analyst` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! edgequake-analyst = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod analyze;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use analyze::{
    analyze, analyze_file, analyze_sync, analyze_to_file, extract_document, extract_file,
    prompt_for, write_output,
};
pub use config::{AnalysisConfig, AnalysisConfigBuilder};
pub use error::AnalystError;
pub use output::{AnalysisOutcome, AnalysisOutput, AnalysisStats, DocumentInfo, Extraction};
pub use pipeline::extract::extract;
pub use pipeline::input::{read_document, DocumentFormat, UploadedDocument};
pub use pipeline::invoke::{CommandInvoker, ModelInvoker, PromptDelivery};
pub use progress::{AnalysisProgressCallback, NoopProgressCallback, ProgressCallback};
pub use prompts::{build_prompt, render_prompt, DEFAULT_PROMPT_TEMPLATE};

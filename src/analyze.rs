//! Analysis entry points: extract → prompt → invoke.
//!
//! Every call is an independent run. Nothing is cached between runs, so
//! analysing the same file twice repeats both the extraction and the model
//! call.

use crate::config::AnalysisConfig;
use crate::error::AnalystError;
use crate::output::{AnalysisOutcome, AnalysisOutput, AnalysisStats, DocumentInfo, Extraction};
use crate::pipeline::input::{self, UploadedDocument};
use crate::pipeline::invoke::{CommandInvoker, ModelInvoker};
use crate::pipeline::extract;
use crate::prompts::{build_prompt, render_prompt};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Analyse an uploaded document.
///
/// This is the primary entry point for the library.
///
/// # Returns
/// - `Ok(AnalysisOutcome::Completed(_))` with the model's output verbatim
/// - `Ok(AnalysisOutcome::NoTextExtracted(_))` when the document held no
///   text; the model is not invoked
///
/// # Errors
/// - [`AnalystError::DocumentRead`] — content unreadable as its format
/// - [`AnalystError::InvocationFailed`] — the model process exited non-zero
/// - [`AnalystError::ModelCommandUnavailable`] — the model process could not start
/// - [`AnalystError::Unexpected`] — anything else
pub async fn analyze(
    document: UploadedDocument,
    config: &AnalysisConfig,
) -> Result<AnalysisOutcome, AnalystError> {
    let total_start = Instant::now();
    info!("Starting analysis: {} ({})", document.filename, document.format);

    // ── Step 1: Extract text ─────────────────────────────────────────────
    if let Some(ref cb) = config.progress_callback {
        cb.on_extraction_start(&document.filename);
    }

    let filename = document.filename.clone();
    let size_bytes = document.bytes.len();
    let extraction_start = Instant::now();
    let extraction = extract_document(document).await?;
    let extraction_duration_ms = extraction_start.elapsed().as_millis() as u64;
    let info = DocumentInfo::new(&filename, size_bytes, &extraction);

    if let Some(ref cb) = config.progress_callback {
        cb.on_extraction_complete(info.extracted_chars);
    }

    // ── Step 2: Stop early when there is nothing to analyse ──────────────
    if extraction.is_empty() {
        warn!("No text was extracted from {}", filename);
        return Ok(AnalysisOutcome::NoTextExtracted(info));
    }

    // ── Step 3: Build prompt ─────────────────────────────────────────────
    let prompt = prompt_for(&extraction.text, config);
    let prompt_chars = prompt.chars().count();
    if prompt_chars > config.prompt_warn_chars {
        warn!(
            "Prompt is {} chars (warning threshold {}); the model may not see the whole report",
            prompt_chars, config.prompt_warn_chars
        );
    }
    debug!("Prompt built: {} chars", prompt_chars);

    // ── Step 4: Invoke model ─────────────────────────────────────────────
    let invoker = resolve_invoker(config);
    if let Some(ref cb) = config.progress_callback {
        cb.on_invocation_start(prompt_chars);
    }

    let invocation_start = Instant::now();
    let result = invoker.invoke(&prompt).await;
    let invocation_duration_ms = invocation_start.elapsed().as_millis() as u64;

    if let Some(ref cb) = config.progress_callback {
        cb.on_invocation_complete(result.is_ok());
    }
    let result = result?;

    let stats = AnalysisStats {
        prompt_chars,
        extraction_duration_ms,
        invocation_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Analysis complete: {} → {} bytes of output in {}ms",
        filename,
        result.len(),
        stats.total_duration_ms
    );

    Ok(AnalysisOutcome::Completed(AnalysisOutput {
        result,
        document: info,
        stats,
    }))
}

/// Read a local file and analyse it, inferring the format from its name.
pub async fn analyze_file(
    path: impl AsRef<Path>,
    config: &AnalysisConfig,
) -> Result<AnalysisOutcome, AnalystError> {
    let document = input::read_document(path.as_ref(), None).await?;
    analyze(document, config).await
}

/// Synchronous wrapper around [`analyze_file`].
///
/// Creates a temporary tokio runtime internally.
pub fn analyze_sync(
    path: impl AsRef<Path>,
    config: &AnalysisConfig,
) -> Result<AnalysisOutcome, AnalystError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| AnalystError::Unexpected(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(analyze_file(path, config))
}

/// Analyse a file and write the model output to `output_path`.
///
/// Nothing is written when no text was extracted.
pub async fn analyze_to_file(
    path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &AnalysisConfig,
) -> Result<AnalysisOutcome, AnalystError> {
    let outcome = analyze_file(path, config).await?;
    if let Some(output) = outcome.output() {
        write_output(output_path.as_ref(), &output.result).await?;
    }
    Ok(outcome)
}

/// Extract the text of a document without invoking a model.
///
/// Runs on the blocking thread pool.
pub async fn extract_document(document: UploadedDocument) -> Result<Extraction, AnalystError> {
    tokio::task::spawn_blocking(move || extract::extract(&document))
        .await
        .map_err(|e| AnalystError::Unexpected(format!("Extraction task panicked: {}", e)))?
}

/// Read a local file and extract its text. Does not need a model runtime.
pub async fn extract_file(path: impl AsRef<Path>) -> Result<Extraction, AnalystError> {
    let document = input::read_document(path.as_ref(), None).await?;
    extract_document(document).await
}

/// The prompt that [`analyze`] would send for `text` under `config`.
pub fn prompt_for(text: &str, config: &AnalysisConfig) -> String {
    match config.prompt_template {
        Some(ref template) => render_prompt(template, text),
        None => build_prompt(text),
    }
}

/// Write `contents` to `path` atomically.
///
/// The data goes to a temp file in the destination directory which is then
/// renamed over `path`, so readers never see a partial file.
pub async fn write_output(path: &Path, contents: &str) -> Result<(), AnalystError> {
    let path = path.to_path_buf();
    let contents = contents.to_string();

    tokio::task::spawn_blocking(move || {
        let write_err = |source: std::io::Error| AnalystError::OutputWriteFailed {
            path: path.clone(),
            source,
        };

        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => std::env::current_dir().map_err(write_err)?,
        };
        std::fs::create_dir_all(&parent).map_err(write_err)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&parent).map_err(write_err)?;
        tmp.write_all(contents.as_bytes()).map_err(write_err)?;
        tmp.persist(&path).map_err(|e| write_err(e.error))?;
        debug!("Wrote {} bytes to {}", contents.len(), path.display());
        Ok(())
    })
    .await
    .map_err(|e| AnalystError::Unexpected(format!("Write task panicked: {}", e)))?
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// A caller-supplied invoker wins; otherwise run the configured command.
fn resolve_invoker(config: &AnalysisConfig) -> Arc<dyn ModelInvoker> {
    match config.invoker {
        Some(ref invoker) => Arc::clone(invoker),
        None => Arc::new(CommandInvoker::from_config(config)),
    }
}

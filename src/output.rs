//! Result types produced by the analysis pipeline.

use crate::pipeline::input::DocumentFormat;
use serde::{Deserialize, Serialize};

/// Text recovered from a document.
///
/// `text` is either the concatenation of every recoverable page/row in
/// document order, or empty when nothing was recoverable. It is never a
/// partially built string from a failed parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    pub text: String,
    pub format: DocumentFormat,
    /// Pages (PDF) or data rows (spreadsheet) visited.
    pub units: usize,
    /// How many of those units contributed text.
    pub units_with_text: usize,
}

impl Extraction {
    /// `true` when no text could be extracted.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Describes the document that was analysed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub filename: String,
    pub format: DocumentFormat,
    pub size_bytes: usize,
    pub units: usize,
    pub units_with_text: usize,
    /// Characters of extracted text.
    pub extracted_chars: usize,
}

impl DocumentInfo {
    pub(crate) fn new(filename: &str, size_bytes: usize, extraction: &Extraction) -> Self {
        Self {
            filename: filename.to_string(),
            format: extraction.format,
            size_bytes,
            units: extraction.units,
            units_with_text: extraction.units_with_text,
            extracted_chars: extraction.text.chars().count(),
        }
    }
}

/// Timing for one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisStats {
    pub prompt_chars: usize,
    pub extraction_duration_ms: u64,
    pub invocation_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// A completed analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutput {
    /// The model's standard output, exactly as captured.
    pub result: String,
    pub document: DocumentInfo,
    pub stats: AnalysisStats,
}

/// How an analysis run ended when no error occurred.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    /// The model produced a summary.
    Completed(AnalysisOutput),
    /// Extraction succeeded but found no text; the model was not invoked.
    NoTextExtracted(DocumentInfo),
}

impl AnalysisOutcome {
    /// The model output, if the run got that far.
    pub fn output(&self) -> Option<&AnalysisOutput> {
        match self {
            AnalysisOutcome::Completed(output) => Some(output),
            AnalysisOutcome::NoTextExtracted(_) => None,
        }
    }

    pub fn document(&self) -> &DocumentInfo {
        match self {
            AnalysisOutcome::Completed(output) => &output.document,
            AnalysisOutcome::NoTextExtracted(info) => info,
        }
    }
}

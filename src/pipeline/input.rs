//! Input resolution: turn a user-supplied file into an [`UploadedDocument`].
//!
//! The format tag comes from the filename's extension unless the caller
//! declares it. Unknown extensions are rejected here, before any byte of the
//! content is parsed.

use crate::error::AnalystError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// The closed set of document formats the extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    /// Paginated PDF document.
    Pdf,
    /// Workbook (xlsx, xlsm, xlsb, xls or ods). Only the first sheet is read.
    Spreadsheet,
}

impl DocumentFormat {
    /// Infer the format from a filename's final extension (case-insensitive).
    pub fn from_filename(filename: &str) -> Result<Self, AnalystError> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("pdf") => Ok(DocumentFormat::Pdf),
            Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods") => Ok(DocumentFormat::Spreadsheet),
            _ => Err(AnalystError::UnsupportedFormat {
                filename: filename.to_string(),
            }),
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFormat::Pdf => f.write_str("PDF"),
            DocumentFormat::Spreadsheet => f.write_str("spreadsheet"),
        }
    }
}

impl FromStr for DocumentFormat {
    type Err = AnalystError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(DocumentFormat::Pdf),
            "spreadsheet" | "excel" | "xlsx" | "xls" | "ods" => Ok(DocumentFormat::Spreadsheet),
            other => Err(AnalystError::UnsupportedFormat {
                filename: other.to_string(),
            }),
        }
    }
}

/// A document handed to the pipeline: raw bytes plus a format tag.
///
/// Owned by a single analysis run and dropped once its text is extracted.
#[derive(Clone)]
pub struct UploadedDocument {
    /// Original filename; used for format inference and messages only.
    pub filename: String,
    pub format: DocumentFormat,
    pub bytes: Vec<u8>,
}

impl UploadedDocument {
    /// Build an upload, inferring the format from `filename`.
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Result<Self, AnalystError> {
        let filename = filename.into();
        let format = DocumentFormat::from_filename(&filename)?;
        Ok(Self {
            filename,
            format,
            bytes,
        })
    }

    /// Build an upload with an explicitly declared format.
    pub fn with_format(filename: impl Into<String>, format: DocumentFormat, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            format,
            bytes,
        }
    }
}

impl fmt::Debug for UploadedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedDocument")
            .field("filename", &self.filename)
            .field("format", &self.format)
            .field("bytes", &format_args!("<{} bytes>", self.bytes.len()))
            .finish()
    }
}

/// Read a local file into an [`UploadedDocument`].
///
/// The format is inferred from the filename unless `declared` is given. An
/// unsupported extension fails before the file is read.
pub async fn read_document(
    path: &Path,
    declared: Option<DocumentFormat>,
) -> Result<UploadedDocument, AnalystError> {
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let format = match declared {
        Some(format) => format,
        None => DocumentFormat::from_filename(&filename)?,
    };

    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => AnalystError::FileNotFound {
            path: path.to_path_buf(),
        },
        std::io::ErrorKind::PermissionDenied => AnalystError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => AnalystError::Unexpected(format!("Failed to read '{}': {}", path.display(), e)),
    })?;

    debug!(
        "Read {} ({}, {} bytes)",
        path.display(),
        format,
        bytes.len()
    );

    Ok(UploadedDocument::with_format(filename, format, bytes))
}

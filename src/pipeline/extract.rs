//! Text extraction: recover plain text from a PDF or a spreadsheet.
//!
//! [`extract`] is synchronous and pure: the same bytes always give the same
//! [`Extraction`]. Parsing is CPU-bound, so the async pipeline calls it from
//! `tokio::task::spawn_blocking`.
//!
//! ## PDF
//!
//! Pages are read from the text layer in page order. Pages with no text
//! (scans, blank pages) or with a text layer that cannot be decoded are
//! skipped. The remaining page texts are joined with a newline and only the
//! joined result is trimmed, so indentation at a page start survives.
//!
//! The `%PDF` marker must appear within the first 1024 bytes; some producers
//! write a few bytes of junk before it.
//!
//! ## Spreadsheet
//!
//! Only the first sheet is read. No row is treated as a header: every row
//! with at least one non-empty cell becomes exactly one line, so the line
//! count equals the number of data rows. Columns are right-aligned to a
//! shared width and separated by two spaces. Row numbers are not printed.

use crate::error::AnalystError;
use crate::output::Extraction;
use crate::pipeline::input::{DocumentFormat, UploadedDocument};
use calamine::{open_workbook_auto_from_rs, Data, ExcelDateTime, Range, Reader};
use chrono::{NaiveDateTime, NaiveTime, TimeDelta};
use std::io::Cursor;
use tracing::{debug, warn};

/// Gap between spreadsheet columns.
const COLUMN_GAP: &str = "  ";

/// How far into the file the `%PDF` marker may appear.
const PDF_HEADER_WINDOW: usize = 1024;

/// Extract all recoverable text from `document`.
///
/// An empty [`Extraction::text`] is a valid result meaning "nothing found".
///
/// # Errors
/// [`AnalystError::DocumentRead`] when the bytes cannot be parsed as the
/// declared format.
pub fn extract(document: &UploadedDocument) -> Result<Extraction, AnalystError> {
    let extraction = match document.format {
        DocumentFormat::Pdf => extract_pdf(document)?,
        DocumentFormat::Spreadsheet => extract_spreadsheet(document)?,
    };

    debug!(
        "Extracted {} chars from {} ({}/{} units with text)",
        extraction.text.len(),
        document.filename,
        extraction.units_with_text,
        extraction.units
    );

    Ok(extraction)
}

fn read_error(document: &UploadedDocument, detail: impl Into<String>) -> AnalystError {
    AnalystError::DocumentRead {
        filename: document.filename.clone(),
        format: document.format,
        detail: detail.into(),
    }
}

// ── PDF ──────────────────────────────────────────────────────────────────

fn extract_pdf(document: &UploadedDocument) -> Result<Extraction, AnalystError> {
    let header = &document.bytes[..document.bytes.len().min(PDF_HEADER_WINDOW)];
    if !header.windows(4).any(|w| w == b"%PDF") {
        let magic: Vec<u8> = document.bytes.iter().take(4).copied().collect();
        return Err(read_error(
            document,
            format!("not a PDF (first bytes: {magic:?})"),
        ));
    }

    let pdf = lopdf::Document::load_mem(&document.bytes)
        .map_err(|e| read_error(document, e.to_string()))?;

    let pages = pdf.get_pages();
    let mut page_texts = Vec::with_capacity(pages.len());

    // BTreeMap iteration is ascending page number.
    for &page_num in pages.keys() {
        match pdf.extract_text(&[page_num]) {
            Ok(text) => {
                // lopdf ends every text object with a newline; drop only that,
                // indentation and inner spacing stay as on the page.
                let text = text.trim_end_matches(['\r', '\n']);
                if text.trim().is_empty() {
                    debug!("Page {}: no text layer", page_num);
                } else {
                    page_texts.push(text.to_string());
                }
            }
            Err(e) => {
                warn!("Page {}: text could not be decoded, skipping: {}", page_num, e);
            }
        }
    }

    Ok(Extraction {
        text: page_texts.join("\n").trim().to_string(),
        format: DocumentFormat::Pdf,
        units: pages.len(),
        units_with_text: page_texts.len(),
    })
}

// ── Spreadsheet ──────────────────────────────────────────────────────────

fn extract_spreadsheet(document: &UploadedDocument) -> Result<Extraction, AnalystError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(document.bytes.as_slice()))
        .map_err(|e| read_error(document, e.to_string()))?;

    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range.map_err(|e| read_error(document, e.to_string()))?,
        None => {
            debug!("{}: workbook has no sheets", document.filename);
            Range::empty()
        }
    };

    let rows: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect::<Vec<_>>())
        .filter(|cells| cells.iter().any(|c| !c.is_empty()))
        .collect();

    let text = render_rows(&rows);

    Ok(Extraction {
        text,
        format: DocumentFormat::Spreadsheet,
        units: rows.len(),
        units_with_text: rows.len(),
    })
}

/// Display value of a cell, flattened onto one line.
fn cell_text(cell: &Data) -> String {
    let text = match cell {
        Data::Empty => return String::new(),
        Data::Float(v) => format_float(*v),
        Data::Bool(true) => "True".to_string(),
        Data::Bool(false) => "False".to_string(),
        Data::DateTime(dt) => format_excel_datetime(dt),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        other => other.to_string(),
    };
    text.replace(['\r', '\n'], " ").trim().to_string()
}

/// Whole numbers print without a fraction; others are rounded to six
/// decimals with trailing zeros dropped (`0.1 + 0.2` prints `0.3`).
fn format_float(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        return format!("{v}");
    }
    let fixed = format!("{v:.6}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        // Too small for six decimals: keep the exact value.
        "0" | "-0" => format!("{v}"),
        _ => trimmed.to_string(),
    }
}

/// Dates print as `YYYY-MM-DD`, adding `HH:MM:SS` only when there is a time
/// part; durations print as `H:MM:SS`. Out-of-range serials fall back to the
/// raw number.
fn format_excel_datetime(dt: &ExcelDateTime) -> String {
    if dt.is_duration() {
        return match dt.as_duration() {
            Some(d) => format_duration(d),
            None => format_float(dt.as_f64()),
        };
    }
    match dt.as_datetime() {
        Some(value) => format_naive_datetime(value),
        None => format_float(dt.as_f64()),
    }
}

fn format_naive_datetime(value: NaiveDateTime) -> String {
    if value.time() == NaiveTime::MIN {
        value.format("%Y-%m-%d").to_string()
    } else {
        value.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

fn format_duration(d: TimeDelta) -> String {
    let total = d.num_seconds();
    let sign = if total < 0 { "-" } else { "" };
    let total = total.abs();
    format!(
        "{sign}{}:{:02}:{:02}",
        total / 3600,
        (total / 60) % 60,
        total % 60
    )
}

/// Lay rows out as an aligned text table, one row per line.
pub(crate) fn render_rows(rows: &[Vec<String>]) -> String {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0usize; columns];
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    rows.iter()
        .map(|row| {
            let line = widths
                .iter()
                .enumerate()
                .map(|(i, &width)| {
                    let cell = row.get(i).map(String::as_str).unwrap_or("");
                    format!("{cell:>width$}")
                })
                .collect::<Vec<_>>()
                .join(COLUMN_GAP);
            line.trim_end().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

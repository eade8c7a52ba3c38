//! Fixture builders shared by the integration tests.
//!
//! Documents are generated in memory so the tests need no files on disk and
//! no model runtime.

#![allow(dead_code)]

use edgequake_analyst::{AnalystError, ModelInvoker};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use rust_xlsxwriter::Workbook;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, Once};

static TRACING: Once = Once::new();

/// Route library logs to the test harness (`RUST_LOG=edgequake_analyst=debug`
/// with `--nocapture` to see them).
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Build a PDF with one page per entry. `None` produces a page with no text.
pub fn make_pdf(pages: &[Option<&str>]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page in pages {
        let operations = match page {
            Some(text) => {
                let mut ops = vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                ];
                for (i, line) in text.lines().enumerate() {
                    if i > 0 {
                        ops.push(Operation::new("ET", vec![]));
                        ops.push(Operation::new("BT", vec![]));
                        ops.push(Operation::new("Tf", vec!["F1".into(), 12.into()]));
                        ops.push(Operation::new(
                            "Td",
                            vec![72.into(), (720 - 14 * i as i64).into()],
                        ));
                    }
                    ops.push(Operation::new("Tj", vec![Object::string_literal(line)]));
                }
                ops.push(Operation::new("ET", vec![]));
                ops
            }
            None => vec![],
        };
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode page content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("serialise PDF");
    buf
}

/// Build an .xlsx workbook whose first sheet holds `rows`.
///
/// Cells that parse as `f64` are written as numbers, the rest as strings,
/// empty strings are left blank.
pub fn make_xlsx(rows: &[&[&str]]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (r, row) in rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            if cell.is_empty() {
                continue;
            }
            match cell.parse::<f64>() {
                Ok(n) => sheet.write_number(r as u32, c as u16, n),
                Err(_) => sheet.write_string(r as u32, c as u16, *cell),
            }
            .expect("write cell");
        }
    }
    workbook.save_to_buffer().expect("serialise workbook")
}

/// In-process model that records prompts and returns a canned answer.
pub struct MockInvoker {
    reply: Result<String, String>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockInvoker {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(stderr: &str) -> Self {
        Self {
            reply: Err(stderr.to_string()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait::async_trait]
impl ModelInvoker for MockInvoker {
    async fn invoke(&self, prompt: &str) -> Result<String, AnalystError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.reply {
            Ok(out) => Ok(out.clone()),
            Err(stderr) => Err(AnalystError::InvocationFailed {
                command: "mock".into(),
                status: Some(1),
                stderr: stderr.clone(),
            }),
        }
    }

    fn describe(&self) -> String {
        "mock model".into()
    }
}

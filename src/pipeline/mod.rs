//! Pipeline stages for report analysis.
//!
//! Each submodule implements exactly one step, so each can be tested alone.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ prompt ──▶ invoke
//! (file)    (text)      (template)  (model process)
//! ```
//!
//! 1. [`input`]   — read the file and decide its format from the filename
//! 2. [`extract`] — recover plain text from the PDF or the first sheet;
//!    CPU-bound, run inside `spawn_blocking`
//! 3. [`crate::prompts`] — embed the text in the analyst instructions
//! 4. [`invoke`]  — run the local model and capture its output; the only
//!    stage that waits on another process

pub mod extract;
pub mod input;
pub mod invoke;

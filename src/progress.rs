//! Progress-callback trait for analysis events.
//!
//! Inject an [`Arc<dyn AnalysisProgressCallback>`] via
//! [`crate::config::AnalysisConfigBuilder::progress_callback`] to be told when
//! each pipeline phase starts and ends. The CLI drives its spinner from these
//! events; other hosts can forward them to a web socket, a log, or a UI.
//!
//! # Example
//!
//! ```rust
//! use edgequake_analyst::{AnalysisConfig, AnalysisProgressCallback};
//! use std::sync::Arc;
//!
//! struct Announce;
//!
//! impl AnalysisProgressCallback for Announce {
//!     fn on_invocation_start(&self, prompt_chars: usize) {
//!         eprintln!("asking the model ({prompt_chars} chars)…");
//!     }
//! }
//!
//! let config = AnalysisConfig::builder()
//!     .progress_callback(Arc::new(Announce) as Arc<dyn AnalysisProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the pipeline as a document moves through it.
///
/// All methods default to no-ops so callers only override what they need.
/// Implementations must be `Send + Sync`; extraction runs on the blocking
/// thread pool and the events may arrive from different threads.
pub trait AnalysisProgressCallback: Send + Sync {
    /// Called before the document's text is extracted.
    fn on_extraction_start(&self, filename: &str) {
        let _ = filename;
    }

    /// Called after extraction succeeded.
    ///
    /// `chars` is zero when the document contained no text; in that case no
    /// invocation events follow.
    fn on_extraction_complete(&self, chars: usize) {
        let _ = chars;
    }

    /// Called just before the model process is started.
    fn on_invocation_start(&self, prompt_chars: usize) {
        let _ = prompt_chars;
    }

    /// Called once the model process has finished, successfully or not.
    fn on_invocation_complete(&self, success: bool) {
        let _ = success;
    }
}

/// A callback that ignores every event.
pub struct NoopProgressCallback;

impl AnalysisProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::AnalysisConfig`].
pub type ProgressCallback = Arc<dyn AnalysisProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingCallback {
        events: Mutex<Vec<String>>,
    }

    impl AnalysisProgressCallback for RecordingCallback {
        fn on_extraction_start(&self, filename: &str) {
            self.events.lock().unwrap().push(format!("extract:{filename}"));
        }

        fn on_extraction_complete(&self, chars: usize) {
            self.events.lock().unwrap().push(format!("extracted:{chars}"));
        }

        fn on_invocation_start(&self, prompt_chars: usize) {
            self.events.lock().unwrap().push(format!("invoke:{prompt_chars}"));
        }

        fn on_invocation_complete(&self, success: bool) {
            self.events.lock().unwrap().push(format!("done:{success}"));
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_extraction_start("a.pdf");
        cb.on_extraction_complete(10);
        cb.on_invocation_start(200);
        cb.on_invocation_complete(false);
    }

    #[test]
    fn recording_callback_receives_events() {
        let cb = RecordingCallback::default();
        cb.on_extraction_start("q3.xlsx");
        cb.on_extraction_complete(42);
        cb.on_invocation_start(300);
        cb.on_invocation_complete(true);

        let events = cb.events.lock().unwrap();
        assert_eq!(
            *events,
            vec!["extract:q3.xlsx", "extracted:42", "invoke:300", "done:true"]
        );
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_extraction_start("x.pdf");
        cb.on_invocation_complete(true);
    }
}

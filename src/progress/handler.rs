//! Progress handler trait and events

use std::time::Duration;

/// Events emitted while a docstring is being generated
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    Started { code_chars: usize },

    PhaseStarted { phase: String },

    PhaseComplete { phase: String, duration: Duration },

    /// The draft model failed and a placeholder was used instead
    DraftDegraded { reason: String },

    Completed { approved: bool, total_time: Duration },

    Failed { error: String, kind: &'static str },
}

pub trait ProgressHandler: Send + Sync {
    fn on_progress(&self, event: &ProgressEvent);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpHandler;

impl ProgressHandler for NoOpHandler {
    fn on_progress(&self, _event: &ProgressEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingHandler {
        count: Arc<AtomicUsize>,
    }

    impl ProgressHandler for CountingHandler {
        fn on_progress(&self, _event: &ProgressEvent) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_handler_receives_events() {
        let count = Arc::new(AtomicUsize::new(0));
        let handler = CountingHandler {
            count: count.clone(),
        };

        handler.on_progress(&ProgressEvent::Started { code_chars: 12 });
        handler.on_progress(&ProgressEvent::PhaseStarted {
            phase: "AnalyzePhase".to_string(),
        });
        handler.on_progress(&ProgressEvent::Completed {
            approved: true,
            total_time: Duration::from_secs(2),
        });

        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_noop_handler() {
        NoOpHandler.on_progress(&ProgressEvent::Failed {
            error: "boom".to_string(),
            kind: "service",
        });
    }
}

//! Logging-based progress handler

use super::{ProgressEvent, ProgressHandler};
use tracing::{debug, error, info, warn};

#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl ProgressHandler for LoggingHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Started { code_chars } => {
                info!(code_chars, "Starting docstring generation");
            }
            ProgressEvent::PhaseStarted { phase } => {
                debug!(phase = %phase, "Starting phase");
            }
            ProgressEvent::PhaseComplete { phase, duration } => {
                info!(
                    phase = %phase,
                    duration_ms = duration.as_millis() as u64,
                    "Phase complete"
                );
            }
            ProgressEvent::DraftDegraded { reason } => {
                warn!(reason = %reason, "Continuing without a model draft");
            }
            ProgressEvent::Completed {
                approved,
                total_time,
            } => {
                info!(
                    approved,
                    total_time_ms = total_time.as_millis() as u64,
                    "Docstring generation complete"
                );
            }
            ProgressEvent::Failed { error, kind } => {
                error!(kind = *kind, error = %error, "Docstring generation failed");
            }
        }
    }
}

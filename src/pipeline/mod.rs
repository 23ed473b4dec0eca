//! The docstring generation pipeline
//!
//! A run moves one [`DocContext`] through five phases in a fixed order:
//! analyze, sample examples, draft, refine, quality check. Analysis and draft
//! problems are absorbed into the context; corpus, refinement and quality
//! failures end the run with a [`PipelineError`].

pub mod context;
pub mod error;
pub mod orchestrator;
pub mod phase_trait;
pub mod phases;
pub mod result;

pub use context::{DocContext, PipelineState};
pub use error::PipelineError;
pub use orchestrator::PipelineOrchestrator;
pub use phase_trait::WorkflowPhase;
pub use result::{PipelineResult, QualityVerdict};

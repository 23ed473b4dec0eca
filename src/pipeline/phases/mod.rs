// Phases of a docstring generation run, in execution order.

#[path = "01_analyze.rs"]
pub mod analyze;
#[path = "02_sample.rs"]
pub mod sample;
#[path = "03_draft.rs"]
pub mod draft;
#[path = "04_refine.rs"]
pub mod refine;
#[path = "05_quality.rs"]
pub mod quality;

pub use analyze::AnalyzePhase;
pub use draft::{draft_placeholder, draft_prompt, is_draft_placeholder, DraftPhase};
pub use quality::QualityPhase;
pub use refine::RefinePhase;
pub use sample::SamplePhase;

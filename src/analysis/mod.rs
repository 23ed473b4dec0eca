//! Static structure of a Python snippet
//!
//! [`analyze`] reports the functions, classes and imports a snippet defines,
//! or an error record when the snippet does not parse.

mod python;
mod types;

pub use python::analyze;
pub use types::{AnalysisError, ClassInfo, CodeStructure, FunctionInfo, StructuralSummary};

//! Reference code/docstring pairs shown to the refinement agent

mod error;
pub mod prepare;
mod store;

pub use error::CorpusError;
pub use prepare::{prepare_corpus, PrepareReport};
pub use store::{Corpus, ExampleCorpus, ExamplePair, FileCorpus, InMemoryCorpus, MAX_CORPUS_ENTRIES};

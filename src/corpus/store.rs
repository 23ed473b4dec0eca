use super::error::CorpusError;
use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Entries beyond this are ignored when loading
pub const MAX_CORPUS_ENTRIES: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExamplePair {
    pub code: String,
    pub docstring: String,
}

impl ExamplePair {
    pub fn new(code: impl Into<String>, docstring: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            docstring: docstring.into(),
        }
    }
}

/// Immutable set of reference pairs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    entries: Vec<ExamplePair>,
}

impl Corpus {
    pub fn new(mut entries: Vec<ExamplePair>) -> Self {
        entries.truncate(MAX_CORPUS_ENTRIES);
        Self { entries }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let entries: Vec<ExamplePair> = serde_json::from_str(json)?;
        Ok(Self::new(entries))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ExamplePair] {
        &self.entries
    }

    /// `min(k, len)` distinct entries chosen uniformly at random
    pub fn sample(&self, k: usize) -> Vec<ExamplePair> {
        self.sample_with_rng(k, &mut rand::thread_rng())
    }

    pub fn sample_with_rng<R: Rng + ?Sized>(&self, k: usize, rng: &mut R) -> Vec<ExamplePair> {
        self.entries.choose_multiple(rng, k).cloned().collect()
    }
}

/// Source of the example corpus used by the pipeline
#[async_trait]
pub trait ExampleCorpus: Send + Sync {
    async fn snapshot(&self) -> Result<Arc<Corpus>, CorpusError>;

    fn describe(&self) -> String;
}

/// Corpus read from a JSON file on first use and kept for the process lifetime.
///
/// A failed read is not remembered, so creating the file later is picked up
/// by the next request.
pub struct FileCorpus {
    path: PathBuf,
    cached: OnceCell<Arc<Corpus>>,
}

impl FileCorpus {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cached: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    async fn load(&self) -> Result<Arc<Corpus>, CorpusError> {
        debug!("Loading example corpus from {}", self.path.display());
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| CorpusError::from_io(self.path.clone(), e))?;
        let corpus = Corpus::from_json(&content).map_err(|source| CorpusError::Malformed {
            path: self.path.clone(),
            source,
        })?;
        info!(
            "Loaded {} example pairs from {}",
            corpus.len(),
            self.path.display()
        );
        Ok(Arc::new(corpus))
    }
}

#[async_trait]
impl ExampleCorpus for FileCorpus {
    async fn snapshot(&self) -> Result<Arc<Corpus>, CorpusError> {
        let corpus = self.cached.get_or_try_init(|| self.load()).await?;
        Ok(Arc::clone(corpus))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

pub struct InMemoryCorpus {
    corpus: Arc<Corpus>,
}

impl InMemoryCorpus {
    pub fn new(entries: Vec<ExamplePair>) -> Self {
        Self {
            corpus: Arc::new(Corpus::new(entries)),
        }
    }
}

#[async_trait]
impl ExampleCorpus for InMemoryCorpus {
    async fn snapshot(&self) -> Result<Arc<Corpus>, CorpusError> {
        Ok(Arc::clone(&self.corpus))
    }

    fn describe(&self) -> String {
        format!("in-memory ({} pairs)", self.corpus.len())
    }
}

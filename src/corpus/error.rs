use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error(
        "Example corpus not found at {}. Run `docsmith prepare-corpus --input <dump> --output {}` to create it.",
        .path.display(),
        .path.display()
    )]
    Missing { path: PathBuf },

    #[error("Example corpus at {} is not a JSON array of code/docstring pairs: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to read example corpus at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CorpusError {
    pub fn from_io(path: PathBuf, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            CorpusError::Missing { path }
        } else {
            CorpusError::Io { path, source }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_message_points_to_prepare_corpus() {
        let err = CorpusError::Missing {
            path: PathBuf::from("processed_code_doc_pairs.json"),
        };
        let msg = err.to_string();
        assert!(msg.contains("processed_code_doc_pairs.json"));
        assert!(msg.contains("docsmith prepare-corpus"));
    }

    #[test]
    fn test_not_found_maps_to_missing() {
        let err = CorpusError::from_io(
            PathBuf::from("x.json"),
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, CorpusError::Missing { .. }));

        let err = CorpusError::from_io(
            PathBuf::from("x.json"),
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope"),
        );
        assert!(matches!(err, CorpusError::Io { .. }));
    }
}

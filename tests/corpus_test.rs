//! Corpus preparation and loading

use docsmith::corpus::{prepare_corpus, ExampleCorpus, FileCorpus, MAX_CORPUS_ENTRIES};
use docsmith::CorpusError;
use serde_json::json;
use std::collections::HashSet;
use tempfile::TempDir;

fn write_jsonl(dir: &TempDir, records: &[serde_json::Value]) -> std::path::PathBuf {
    let path = dir.path().join("dump.jsonl");
    let lines: Vec<String> = records.iter().map(|r| r.to_string()).collect();
    std::fs::write(&path, lines.join("\n")).unwrap();
    path
}

#[tokio::test]
async fn test_prepared_corpus_is_loadable() {
    let dir = TempDir::new().unwrap();
    let input = write_jsonl(
        &dir,
        &[
            json!({"instruction": "Return the square of x.", "output": "Sure:\n```python\ndef square(x):\n    return x * x\n```"}),
            json!({"instruction": "Greet someone.", "output": "```\ndef greet(name):\n    print('hi', name)\n```"}),
            json!({"instruction": "Broken.", "output": "```python\ndef (:\n```"}),
        ],
    );
    let output = dir.path().join("pairs.json");

    let report = prepare_corpus(&input, &output, None).unwrap();
    assert_eq!(report.records_read, 3);
    assert_eq!(report.kept, 2);
    assert_eq!(report.skipped_invalid_code, 1);

    let corpus = FileCorpus::new(&output).snapshot().await.unwrap();
    assert_eq!(corpus.len(), 2);
    assert_eq!(corpus.entries()[0].code, "def square(x):\n    return x * x");
    assert_eq!(corpus.entries()[0].docstring, "Return the square of x.");
}

#[tokio::test]
async fn test_large_corpus_is_capped() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("big.json");
    let pairs: Vec<serde_json::Value> = (0..1200)
        .map(|i| json!({"code": format!("v{} = {}", i, i), "docstring": format!("Set v{}.", i)}))
        .collect();
    std::fs::write(&path, serde_json::to_string(&pairs).unwrap()).unwrap();

    let corpus = FileCorpus::new(&path).snapshot().await.unwrap();
    assert_eq!(corpus.len(), MAX_CORPUS_ENTRIES);

    let sample = corpus.sample(3);
    let distinct: HashSet<_> = sample.iter().collect();
    assert_eq!(distinct.len(), 3);
}

#[tokio::test]
async fn test_missing_corpus_message_points_at_preparation() {
    let dir = TempDir::new().unwrap();
    let err = FileCorpus::new(dir.path().join("nope.json"))
        .snapshot()
        .await
        .unwrap_err();
    assert!(matches!(err, CorpusError::Missing { .. }));
    assert!(err.to_string().contains("prepare-corpus"));
}

#[test]
fn test_unreadable_dump_is_an_error() {
    let dir = TempDir::new().unwrap();
    let result = prepare_corpus(
        &dir.path().join("absent.jsonl"),
        &dir.path().join("out.json"),
        None,
    );
    assert!(result.is_err());
    assert!(!dir.path().join("out.json").exists());
}

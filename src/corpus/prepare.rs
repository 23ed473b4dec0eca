//! Turning a raw dataset dump into the example corpus file
//!
//! Records may already be `{code, docstring}` pairs, or the instruction-tuning
//! shape `{instruction, output}` where the code sits in the first fenced block
//! of `output`. Only code that parses as Python 3 is kept. Records whose
//! docstring or instruction is blank are dropped rather than stored with an
//! empty docstring.

use super::store::{ExamplePair, MAX_CORPUS_ENTRIES};
use crate::analysis;
use anyhow::{Context, Result};
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PrepareReport {
    pub records_read: usize,
    pub kept: usize,
    pub skipped_incomplete: usize,
    pub skipped_invalid_code: usize,
    pub skipped_duplicate: usize,
}

fn code_block_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?s)```(?:python)?(.*?)```").expect("valid regex"))
}

/// Contents of the first ``` fence (optionally tagged `python`), trimmed
pub fn extract_first_code_block(text: &str) -> Option<String> {
    code_block_pattern()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

pub fn is_valid_python(code: &str) -> bool {
    !analysis::analyze(code).is_error()
}

fn field<'a>(record: &'a Value, key: &str) -> Option<&'a str> {
    record
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

/// Raw `(code, docstring)` candidate of one record, before validation
fn candidate(record: &Value) -> Option<(String, String)> {
    if let Some(code) = field(record, "code") {
        let doc = field(record, "docstring").or_else(|| field(record, "description"))?;
        return Some((code.to_string(), doc.to_string()));
    }

    let output = field(record, "output")?;
    let doc = field(record, "instruction")?;
    let code = extract_first_code_block(output)?;
    Some((code, doc.to_string()))
}

/// JSON array, or one JSON object per line
pub fn parse_records(content: &str) -> Result<Vec<Value>> {
    if let Ok(Value::Array(records)) = serde_json::from_str::<Value>(content) {
        return Ok(records);
    }

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("Invalid JSON record on line {}", i + 1))
        })
        .collect()
}

/// Clean, validate and deduplicate, stopping at `limit` pairs
pub fn clean_records(records: &[Value], limit: usize) -> (Vec<ExamplePair>, PrepareReport) {
    let mut report = PrepareReport::default();
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut pairs = Vec::new();

    for record in records {
        if pairs.len() >= limit {
            break;
        }
        report.records_read += 1;

        let Some((code, doc)) = candidate(record) else {
            report.skipped_incomplete += 1;
            continue;
        };
        let code = code.trim().to_string();
        let doc = doc.trim().to_string();
        if code.is_empty() {
            report.skipped_incomplete += 1;
            continue;
        }
        if !is_valid_python(&code) {
            report.skipped_invalid_code += 1;
            continue;
        }
        if !seen.insert((code.clone(), doc.clone())) {
            report.skipped_duplicate += 1;
            continue;
        }
        pairs.push(ExamplePair::new(code, doc));
    }

    report.kept = pairs.len();
    (pairs, report)
}

/// Read `input`, clean it and write the corpus as pretty JSON to `output`
pub fn prepare_corpus(input: &Path, output: &Path, limit: Option<usize>) -> Result<PrepareReport> {
    let limit = limit.unwrap_or(MAX_CORPUS_ENTRIES).min(MAX_CORPUS_ENTRIES);
    info!("Preparing corpus from {}", input.display());

    let content = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read dataset dump {}", input.display()))?;
    let records = parse_records(&content)?;
    debug!("{} raw records", records.len());

    let (pairs, report) = clean_records(&records, limit);

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(&pairs)?;
    std::fs::write(output, json)
        .with_context(|| format!("Failed to write corpus to {}", output.display()))?;

    info!("Saved {} cleaned examples to {}", report.kept, output.display());
    Ok(report)
}

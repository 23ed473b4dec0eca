//! Output formatting for multiple formats
//!
//! Pipeline results, structural summaries, corpus reports and health checks
//! can be rendered as JSON, YAML or human-readable text.
//!
//! ```ignore
//! use docsmith::cli::output::{OutputFormat, OutputFormatter};
//!
//! let formatter = OutputFormatter::new(OutputFormat::Json);
//! println!("{}", formatter.format_result(&result)?);
//! ```

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::analysis::CodeStructure;
use crate::config::DocsmithConfig;
use crate::corpus::PrepareReport;
use crate::pipeline::PipelineResult;

const RULE: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format
    Yaml,
    /// Human-readable formatted text
    Human,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_result(&self, result: &PipelineResult) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(result, "pipeline result"),
            OutputFormat::Yaml => to_yaml(result, "pipeline result"),
            OutputFormat::Human => Ok(self.format_result_human(result)),
        }
    }

    pub fn format_structure(&self, structure: &CodeStructure) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(structure, "code structure"),
            OutputFormat::Yaml => to_yaml(structure, "code structure"),
            OutputFormat::Human => Ok(self.format_structure_human(structure)),
        }
    }

    pub fn format_report(&self, report: &PrepareReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(report, "corpus report"),
            OutputFormat::Yaml => to_yaml(report, "corpus report"),
            OutputFormat::Human => Ok(self.format_report_human(report)),
        }
    }

    pub fn format_config(&self, config: &DocsmithConfig) -> Result<String> {
        let config_map = config.to_display_map();
        match self.format {
            OutputFormat::Json => to_json(&config_map, "config"),
            OutputFormat::Yaml => to_yaml(&config_map, "config"),
            OutputFormat::Human => Ok(config.to_string()),
        }
    }

    /// Checks are keyed by component name and printed in name order
    pub fn format_health(&self, health_results: &BTreeMap<String, HealthStatus>) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(health_results, "health status"),
            OutputFormat::Yaml => to_yaml(health_results, "health status"),
            OutputFormat::Human => Ok(self.format_health_human(health_results)),
        }
    }

    fn format_result_human(&self, result: &PipelineResult) -> String {
        let mut output = String::new();

        match result {
            PipelineResult::Doc { doc, .. } => {
                output.push_str("\u{2713} Docstring\n");
                output.push_str(RULE);
                output.push_str("\n\n");
                output.push_str(doc.trim_end());
                output.push_str("\n\n");
            }
            PipelineResult::Suggestions { suggestions, .. } => {
                output.push_str("\u{26A0} Reviewer Suggestions\n");
                output.push_str(RULE);
                output.push_str("\n\n");
                output.push_str(suggestions.trim_end());
                output.push_str("\n\n");
            }
        }

        output.push_str(&self.format_structure_human(result.code_structure()));
        output
    }

    fn format_structure_human(&self, structure: &CodeStructure) -> String {
        let mut output = String::from("Code Structure:\n");

        let summary = match structure {
            CodeStructure::Summary(summary) => summary,
            CodeStructure::Error(err) => {
                output.push_str(&format!("\u{2514}\u{2500} Error: {}\n", err.error));
                return output;
            }
        };

        if summary.functions.is_empty() {
            output.push_str("\u{251C}\u{2500} Functions: (none)\n");
        } else {
            output.push_str("\u{251C}\u{2500} Functions:\n");
            for function in &summary.functions {
                let returns = function
                    .returns
                    .as_deref()
                    .map(|r| format!(" -> {}", r))
                    .unwrap_or_default();
                output.push_str(&format!(
                    "\u{2502}  \u{2500} {}({}){}\n",
                    function.name,
                    function.args.join(", "),
                    returns
                ));
            }
        }

        if summary.classes.is_empty() {
            output.push_str("\u{251C}\u{2500} Classes: (none)\n");
        } else {
            output.push_str("\u{251C}\u{2500} Classes:\n");
            for class in &summary.classes {
                output.push_str(&format!(
                    "\u{2502}  \u{2500} {} [{}]\n",
                    class.name,
                    class.methods.join(", ")
                ));
            }
        }

        if summary.imports.is_empty() {
            output.push_str("\u{2514}\u{2500} Imports: (none)\n");
        } else {
            output.push_str(&format!(
                "\u{2514}\u{2500} Imports: {}\n",
                summary.imports.join(", ")
            ));
        }

        output
    }

    fn format_report_human(&self, report: &PrepareReport) -> String {
        let mut output = String::new();
        output.push_str("Corpus Preparation\n");
        output.push_str(RULE);
        output.push_str("\n\n");
        output.push_str(&format!("Records read:       {}\n", report.records_read));
        output.push_str(&format!("Pairs kept:         {}\n", report.kept));
        output.push_str(&format!("Incomplete:         {}\n", report.skipped_incomplete));
        output.push_str(&format!("Unparseable code:   {}\n", report.skipped_invalid_code));
        output.push_str(&format!("Duplicates:         {}\n", report.skipped_duplicate));
        output
    }

    fn format_health_human(&self, health_results: &BTreeMap<String, HealthStatus>) -> String {
        let mut output = String::new();

        output.push_str("Docsmith Health Status\n");
        output.push_str(RULE);
        output.push_str("\n\n");

        for (component, status) in health_results {
            let status_symbol = if status.available {
                "\u{2713}"
            } else {
                "\u{2717}"
            };

            output.push_str(&format!("{} {}\n", status_symbol, component));
            output.push_str(&format!(
                "  Status: {}\n",
                if status.available {
                    "Available"
                } else {
                    "Unavailable"
                }
            ));
            output.push_str(&format!("  Message: {}\n", status.message));

            if let Some(ref details) = status.details {
                output.push_str(&format!("  Details: {}\n", details));
            }
            output.push('\n');
        }

        output
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T, what: &str) -> Result<String> {
    serde_json::to_string_pretty(value).with_context(|| format!("Failed to serialize {} to JSON", what))
}

fn to_yaml<T: Serialize + ?Sized>(value: &T, what: &str) -> Result<String> {
    serde_yaml::to_string(value).with_context(|| format!("Failed to serialize {} to YAML", what))
}

/// Health status of one component
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct HealthStatus {
    pub available: bool,
    pub message: String,
    pub details: Option<String>,
}

impl HealthStatus {
    pub fn available(message: impl Into<String>) -> Self {
        Self {
            available: true,
            message: message.into(),
            details: None,
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            available: false,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;

    fn approved() -> PipelineResult {
        PipelineResult::Doc {
            doc: "Add two numbers.".to_string(),
            code_structure: analyze("import math\ndef add(a, b) -> int:\n    return a + b\n"),
        }
    }

    #[test]
    fn test_json_result() {
        let formatter = OutputFormatter::new(OutputFormat::Json);
        let output = formatter.format_result(&approved()).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["doc"], "Add two numbers.");
        assert_eq!(parsed["code_structure"]["functions"][0]["name"], "add");
        assert_eq!(parsed["code_structure"]["imports"][0], "math");
    }

    #[test]
    fn test_yaml_result() {
        let formatter = OutputFormatter::new(OutputFormat::Yaml);
        let output = formatter.format_result(&approved()).unwrap();

        assert!(output.contains("doc: Add two numbers."));
        let parsed: PipelineResult = serde_yaml::from_str(&output).unwrap();
        assert_eq!(parsed, approved());
    }

    #[test]
    fn test_human_result() {
        let formatter = OutputFormatter::new(OutputFormat::Human);
        let output = formatter.format_result(&approved()).unwrap();

        assert!(output.contains("Docstring"));
        assert!(output.contains("Add two numbers."));
        assert!(output.contains("add(a, b) -> int"));
        assert!(output.contains("Classes: (none)"));
        assert!(output.contains("Imports: math"));
    }

    #[test]
    fn test_human_suggestions_and_error_structure() {
        let result = PipelineResult::Suggestions {
            suggestions: "Mention the return value.".to_string(),
            code_structure: analyze("def broken(:"),
        };
        let output = OutputFormatter::new(OutputFormat::Human)
            .format_result(&result)
            .unwrap();

        assert!(output.contains("Reviewer Suggestions"));
        assert!(output.contains("Mention the return value."));
        assert!(output.contains("Error: Syntax error in code"));
    }

    #[test]
    fn test_report_formats() {
        let report = PrepareReport {
            records_read: 10,
            kept: 7,
            skipped_incomplete: 1,
            skipped_invalid_code: 1,
            skipped_duplicate: 1,
        };
        let human = OutputFormatter::new(OutputFormat::Human)
            .format_report(&report)
            .unwrap();
        assert!(human.contains("Pairs kept:         7"));

        let json = OutputFormatter::new(OutputFormat::Json)
            .format_report(&report)
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["kept"], 7);
    }

    #[test]
    fn test_config_formats() {
        let config = DocsmithConfig {
            example_count: 2,
            ..Default::default()
        };
        let json = OutputFormatter::new(OutputFormat::Json)
            .format_config(&config)
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["example_count"], "2");

        let human = OutputFormatter::new(OutputFormat::Human)
            .format_config(&config)
            .unwrap();
        assert!(human.contains("Examples per request: 2"));
    }

    #[test]
    fn test_health_status_creation() {
        let status = HealthStatus::available("Ollama is running");
        assert!(status.available);
        assert_eq!(status.message, "Ollama is running");

        let status = HealthStatus::unavailable("Cannot connect")
            .with_details("Connection refused on localhost:11434");
        assert!(!status.available);
        assert!(status.details.is_some());
    }

    #[test]
    fn test_health_format_human() {
        let mut health_results = BTreeMap::new();
        health_results.insert(
            "corpus".to_string(),
            HealthStatus::available("processed_code_doc_pairs.json"),
        );
        health_results.insert(
            "draft_model".to_string(),
            HealthStatus::unavailable("Not cached"),
        );

        let output = OutputFormatter::new(OutputFormat::Human)
            .format_health(&health_results)
            .unwrap();

        assert!(output.contains("Docsmith Health Status"));
        assert!(output.contains("\u{2713} corpus"));
        assert!(output.contains("\u{2717} draft_model"));
        assert!(output.contains("Unavailable"));
    }
}

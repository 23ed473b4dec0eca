use clap::{Parser, Subcommand, ValueEnum};
use genai::adapter::AdapterKind;
use std::path::PathBuf;

/// Docstring generation for Python snippets
#[derive(Parser, Debug)]
#[command(
    name = "docsmith",
    about = "Generate docstrings for Python snippets",
    version,
    author,
    long_about = "docsmith analyzes a Python snippet, drafts a docstring with a local \
                  sequence model, refines it with a chat model guided by reference \
                  examples, and has a second agent review the result. It supports \
                  multiple AI backends (Ollama, OpenAI, Claude, Gemini, Grok, Groq) \
                  and an embedded fallback model."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Generate a docstring for a snippet",
        long_about = "Runs the full pipeline on one snippet and prints the approved \
                      docstring, or the reviewer's suggestions.\n\n\
                      Examples:\n  \
                      docsmith generate 'def add(a, b): return a + b'\n  \
                      docsmith generate \"$(cat util.py)\" --format json\n  \
                      docsmith generate 'x = 1' --provider ollama --model qwen2.5-coder:7b"
    )]
    Generate(GenerateArgs),

    #[command(
        about = "Print the structural summary of a snippet",
        long_about = "Parses the snippet and prints its functions, classes and imports. \
                      No model is contacted.\n\n\
                      Examples:\n  \
                      docsmith analyze 'import os\\ndef f(a): pass'"
    )]
    Analyze(AnalyzeArgs),

    #[command(
        about = "Build the example corpus from a raw dataset dump",
        long_about = "Cleans a JSON or JSON Lines dataset dump into the persisted \
                      corpus file of (code, docstring) pairs.\n\n\
                      Examples:\n  \
                      docsmith prepare-corpus --input dump.jsonl\n  \
                      docsmith prepare-corpus --input dump.json --output pairs.json --limit 500"
    )]
    PrepareCorpus(PrepareCorpusArgs),

    #[command(
        about = "Answer one request read from stdin",
        long_about = "Reads a request like {\"code\": \"...\"} on stdin and writes \
                      {\"status\": ..., \"body\": ...} to stdout.\n\n\
                      Examples:\n  \
                      echo '{\"code\": \"x = 1\"}' | docsmith serve-request"
    )]
    ServeRequest(ServeRequestArgs),

    #[command(
        about = "Check backend, corpus and draft model availability",
        long_about = "Reports whether the chat provider is usable, whether Ollama answers, \
                      whether the corpus file exists and whether the draft model is cached.\n\n\
                      Examples:\n  \
                      docsmith health\n  \
                      docsmith health --format json"
    )]
    Health(HealthArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct GenerateArgs {
    #[arg(value_name = "SNIPPET", help = "Python source to document")]
    pub snippet: String,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[arg(
        short = 'p',
        long,
        value_parser = parse_adapter_kind,
        help = "Chat provider (by default DOCSMITH_PROVIDER, falling back to Ollama or the embedded model)"
    )]
    pub provider: Option<AdapterKind>,

    #[arg(
        short = 'm',
        long,
        value_name = "MODEL",
        help = "Chat model name (provider-specific, e.g. 'gpt-4o-mini')"
    )]
    pub model: Option<String>,

    #[arg(long, value_name = "SECONDS", help = "Timeout of each model call in seconds")]
    pub timeout: Option<u64>,

    #[arg(long, value_name = "FILE", help = "Corpus file of reference pairs")]
    pub corpus: Option<PathBuf>,

    #[arg(long, help = "Skip the local draft model")]
    pub no_draft: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct AnalyzeArgs {
    #[arg(value_name = "SNIPPET", help = "Python source to analyze")]
    pub snippet: String,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "json",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct PrepareCorpusArgs {
    #[arg(short = 'i', long, value_name = "FILE", help = "Raw dataset dump (JSON or JSON Lines)")]
    pub input: PathBuf,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        default_value = "processed_code_doc_pairs.json",
        help = "Where to write the corpus"
    )]
    pub output: PathBuf,

    #[arg(long, value_name = "N", help = "Keep at most N pairs (capped at 1000)")]
    pub limit: Option<usize>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Report format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct ServeRequestArgs {
    #[arg(long, value_name = "FILE", help = "Corpus file of reference pairs")]
    pub corpus: Option<PathBuf>,

    #[arg(long, help = "Skip the local draft model")]
    pub no_draft: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct HealthArgs {
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

fn parse_adapter_kind(s: &str) -> Result<AdapterKind, String> {
    crate::config::parse_provider(s).map_err(|e| e.to_string())
}

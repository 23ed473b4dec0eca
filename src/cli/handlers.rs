//! Command handlers
//!
//! Each handler returns the process exit code. Results go to stdout, logs and
//! hints to stderr.

use super::commands::{
    AnalyzeArgs, GenerateArgs, HealthArgs, PrepareCorpusArgs, ServeRequestArgs,
};
use super::output::{HealthStatus, OutputFormat, OutputFormatter};
use crate::analysis;
use crate::api::{handle_generate_doc, GenerateDocRequest};
use crate::config::{default_model, DocsmithConfig};
use crate::corpus::{prepare_corpus, FileCorpus};
use crate::llm::embedded::{ChatModel, HostResources};
use crate::llm::{
    is_ollama_available, ollama_base_url, provider_has_credentials, GenAIClient, LLMClient,
    LazyLLMClient, Seq2SeqGenerator,
};
use crate::pipeline::{PipelineError, PipelineOrchestrator};
use crate::progress::LoggingHandler;
use genai::adapter::AdapterKind;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::{debug, error, info, warn};

/// Command-line values that override the environment configuration
#[derive(Debug, Default, Clone)]
struct ConfigOverrides {
    provider: Option<AdapterKind>,
    model: Option<String>,
    timeout: Option<u64>,
    corpus: Option<PathBuf>,
    no_draft: bool,
}

impl From<&GenerateArgs> for ConfigOverrides {
    fn from(args: &GenerateArgs) -> Self {
        Self {
            provider: args.provider,
            model: args.model.clone(),
            timeout: args.timeout,
            corpus: args.corpus.clone(),
            no_draft: args.no_draft,
        }
    }
}

impl From<&ServeRequestArgs> for ConfigOverrides {
    fn from(args: &ServeRequestArgs) -> Self {
        Self {
            corpus: args.corpus.clone(),
            no_draft: args.no_draft,
            ..Default::default()
        }
    }
}

fn resolve_config(overrides: &ConfigOverrides) -> DocsmithConfig {
    let default_config = DocsmithConfig::default();

    // A provider switch without --model or DOCSMITH_MODEL gets that provider's default
    let model = match (&overrides.model, overrides.provider) {
        (Some(model), _) => model.clone(),
        (None, Some(provider)) if std::env::var("DOCSMITH_MODEL").is_err() => {
            default_model(provider).to_string()
        }
        _ => default_config.model.clone(),
    };

    let config = DocsmithConfig {
        provider: overrides.provider.unwrap_or(default_config.provider),
        model,
        request_timeout_secs: overrides
            .timeout
            .unwrap_or(default_config.request_timeout_secs),
        corpus_path: overrides
            .corpus
            .clone()
            .unwrap_or_else(|| default_config.corpus_path.clone()),
        draft_enabled: default_config.draft_enabled && !overrides.no_draft,
        ..default_config
    };

    if overrides.provider.is_some() {
        debug!("Provider explicitly set to: {:?}", config.provider);
    }
    if overrides.model.is_some() {
        debug!("Model overridden to: {}", config.model);
    }
    if overrides.no_draft {
        debug!("Draft model disabled");
    }
    config
}

fn build_orchestrator(config: DocsmithConfig, explicit_provider: bool) -> PipelineOrchestrator {
    let client: Arc<dyn LLMClient> = if explicit_provider {
        debug!("Using explicitly specified provider: {:?}", config.provider);
        Arc::new(GenAIClient::new(
            config.provider,
            config.model.clone(),
            config.request_timeout(),
        ))
    } else {
        info!("Using lazy LLM client initialization - backend will be selected on first use");
        Arc::new(LazyLLMClient::new(config.clone()))
    };

    let generator = Arc::new(Seq2SeqGenerator::new(config.draft_model.clone()));
    let corpus = Arc::new(FileCorpus::new(config.corpus_path.clone()));

    PipelineOrchestrator::new(client, generator, corpus, config)
        .with_progress_handler(Arc::new(LoggingHandler))
}

fn print_pipeline_hints(err: &PipelineError, config: &DocsmithConfig) {
    eprintln!("\nPossible solutions:");
    if err.is_setup_error() {
        eprintln!(
            "  - Build the corpus: docsmith prepare-corpus --input <dump> --output {}",
            config.corpus_path.display()
        );
        eprintln!("  - Or point DOCSMITH_CORPUS_PATH / --corpus at an existing corpus file");
        return;
    }
    match config.provider.default_key_env_name() {
        Some(env_var) => eprintln!("  - Check that {} is set and valid", env_var),
        None => eprintln!("  - Ensure Ollama is running: ollama serve"),
    }
    eprintln!("  - Raise the timeout: --timeout <SECONDS> or DOCSMITH_REQUEST_TIMEOUT");
    eprintln!("  - Run 'docsmith health' to check backend availability");
}

pub async fn handle_generate(args: &GenerateArgs) -> i32 {
    info!("Starting docstring generation");

    let overrides = ConfigOverrides::from(args);
    let config = resolve_config(&overrides);
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        eprintln!("\nPlease check your environment variables and command-line arguments.");
        return 1;
    }

    let orchestrator = build_orchestrator(config.clone(), args.provider.is_some());
    let result = match orchestrator.run(&args.snippet).await {
        Ok(result) => result,
        Err(e) => {
            error!("Docstring generation failed: {}", e);
            print_pipeline_hints(&e, &config);
            return 1;
        }
    };

    let formatter = OutputFormatter::new(args.format.into());
    match formatter.format_result(&result) {
        Ok(output) => {
            println!("{}", output);
            0
        }
        Err(e) => {
            error!("Failed to format output: {}", e);
            1
        }
    }
}

pub fn handle_analyze(args: &AnalyzeArgs) -> i32 {
    let structure = analysis::analyze(&args.snippet);
    if structure.is_error() {
        warn!("Snippet does not parse; printing the error record");
    }

    let formatter = OutputFormatter::new(args.format.into());
    match formatter.format_structure(&structure) {
        Ok(output) => {
            println!("{}", output);
            0
        }
        Err(e) => {
            error!("Failed to format output: {}", e);
            1
        }
    }
}

pub fn handle_prepare_corpus(args: &PrepareCorpusArgs) -> i32 {
    let report = match prepare_corpus(&args.input, &args.output, args.limit) {
        Ok(report) => report,
        Err(e) => {
            error!("Corpus preparation failed: {:#}", e);
            return 1;
        }
    };

    if report.kept == 0 {
        warn!("No usable pairs found in {}", args.input.display());
    }

    let formatter = OutputFormatter::new(args.format.into());
    match formatter.format_report(&report) {
        Ok(output) => {
            println!("{}", output);
            0
        }
        Err(e) => {
            error!("Failed to format report: {}", e);
            1
        }
    }
}

pub async fn handle_serve_request(args: &ServeRequestArgs) -> i32 {
    let mut body = String::new();
    if let Err(e) = tokio::io::stdin().read_to_string(&mut body).await {
        error!("Failed to read request from stdin: {}", e);
        return 1;
    }
    let request = GenerateDocRequest::from_json(&body);

    let config = resolve_config(&ConfigOverrides::from(args));
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return 1;
    }

    let orchestrator = build_orchestrator(config, false);
    let response = handle_generate_doc(&orchestrator, &request).await;
    info!(status = response.status, "Request answered");

    match serde_json::to_string(&response) {
        Ok(json) => {
            println!("{}", json);
            if response.is_success() {
                0
            } else {
                1
            }
        }
        Err(e) => {
            error!("Failed to serialize response: {}", e);
            1
        }
    }
}

fn check_chat_provider(config: &DocsmithConfig) -> HealthStatus {
    let provider = config.provider;
    if provider == AdapterKind::Ollama {
        return HealthStatus::available("Ollama needs no API key")
            .with_details(format!("Model: {}", config.model));
    }
    match provider.default_key_env_name() {
        Some(env_var) if !provider_has_credentials(provider) => {
            warn!("{:?} API key is not configured", provider);
            HealthStatus::unavailable(format!("{:?} API key not configured", provider))
                .with_details(format!("Set {} environment variable", env_var))
        }
        _ => {
            info!("{:?} API key is configured", provider);
            HealthStatus::available(format!("{:?} API key is configured", provider))
                .with_details(format!("Model: {}", config.model))
        }
    }
}

async fn check_ollama() -> HealthStatus {
    let host = ollama_base_url();
    if is_ollama_available().await {
        info!("Ollama is available at {}", host);
        HealthStatus::available(format!("Connected to {}", host))
    } else {
        warn!("Ollama is not available at {}", host);
        HealthStatus::unavailable(format!("Cannot connect to {}", host))
            .with_details("Ensure Ollama is running: ollama serve")
    }
}

fn check_embedded_model() -> HealthStatus {
    let host = HostResources::probe();
    match ChatModel::select(&host) {
        Some(model) => HealthStatus::available(format!("{} fits this host", model.display_name))
            .with_details(format!(
                "{:.1}GB RAM available, accelerator: {}",
                host.available_ram_gb(),
                host.accelerator()
            )),
        None => HealthStatus::unavailable("Not enough RAM for any embedded model").with_details(
            format!("{:.1}GB RAM available", host.available_ram_gb()),
        ),
    }
}

fn check_corpus(config: &DocsmithConfig) -> HealthStatus {
    let corpus = FileCorpus::new(config.corpus_path.clone());
    if corpus.exists() {
        HealthStatus::available(format!("Found {}", corpus.path().display()))
    } else {
        HealthStatus::unavailable(format!("Missing {}", corpus.path().display()))
            .with_details("Run: docsmith prepare-corpus --input <dump>")
    }
}

fn check_draft_model(config: &DocsmithConfig) -> HealthStatus {
    if !config.draft_enabled {
        return HealthStatus::available("Draft generation disabled");
    }
    let generator = Seq2SeqGenerator::new(config.draft_model.clone());
    if generator.is_cached() {
        HealthStatus::available(format!("{} is cached", generator.repo_id()))
    } else {
        HealthStatus::unavailable(format!("{} is not cached", generator.repo_id()))
            .with_details("It is downloaded on the first generate request")
    }
}

pub async fn handle_health(args: &HealthArgs) -> i32 {
    info!("Checking component health");

    let config = DocsmithConfig::default();
    let mut health_results = BTreeMap::new();

    health_results.insert("chat_provider".to_string(), check_chat_provider(&config));
    health_results.insert("ollama".to_string(), check_ollama().await);
    health_results.insert("embedded_model".to_string(), check_embedded_model());
    health_results.insert("corpus".to_string(), check_corpus(&config));
    health_results.insert("draft_model".to_string(), check_draft_model(&config));

    let format: OutputFormat = args.format.into();
    let output = match OutputFormatter::new(format).format_health(&health_results) {
        Ok(out) => out,
        Err(e) => {
            error!("Failed to format health output: {}", e);
            return 1;
        }
    };
    println!("{}", output);

    // Requests can be served when some chat backend works and the corpus exists
    let chat_ready = ["chat_provider", "ollama", "embedded_model"]
        .iter()
        .any(|name| health_results.get(*name).is_some_and(|s| s.available));
    let corpus_ready = health_results
        .get("corpus")
        .is_some_and(|status| status.available);

    if chat_ready && corpus_ready {
        0
    } else {
        1
    }
}

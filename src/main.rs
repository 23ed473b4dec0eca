use docsmith::cli::commands::{CliArgs, Commands};
use docsmith::cli::handlers::{
    handle_analyze, handle_generate, handle_health, handle_prepare_corpus, handle_serve_request,
};
use docsmith::util::logging::{init_logging, parse_level, LoggingConfig};
use docsmith::VERSION;

use clap::Parser;
use std::env;
use tracing::{debug, Level};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("docsmith v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Generate(generate_args) => handle_generate(generate_args).await,
        Commands::Analyze(analyze_args) => handle_analyze(analyze_args),
        Commands::PrepareCorpus(prepare_args) => handle_prepare_corpus(prepare_args),
        Commands::ServeRequest(serve_args) => handle_serve_request(serve_args).await,
        Commands::Health(health_args) => handle_health(health_args).await,
    };

    std::process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs) {
    let level = if let Some(level_str) = &args.log_level {
        parse_level(level_str)
    } else if args.verbose {
        Level::DEBUG
    } else if args.quiet {
        Level::ERROR
    } else {
        let level_str = env::var("DOCSMITH_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        parse_level(&level_str)
    };

    let use_json = env::var("DOCSMITH_LOG_JSON")
        .ok()
        .and_then(|v| v.parse::<bool>().ok())
        .unwrap_or(false);

    init_logging(LoggingConfig {
        level,
        use_json,
        ..Default::default()
    });
}

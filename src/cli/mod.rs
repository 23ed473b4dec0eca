pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{
    AnalyzeArgs, CliArgs, Commands, GenerateArgs, HealthArgs, PrepareCorpusArgs, ServeRequestArgs,
};
pub use output::{HealthStatus, OutputFormat, OutputFormatter};

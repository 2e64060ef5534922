use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use scour_agent::{run_research, Settings};

/// Log level for tracing output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// Most verbose: all tracing output
    Trace,
    /// Verbose: LLM requests/responses, tool execution details
    Debug,
    /// Standard: high-level flow, search progress
    Info,
    /// Quiet: only warnings and errors
    Warn,
    /// Minimal: only errors
    Error,
}

impl LogLevel {
    fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Parser)]
#[command(name = "scour")]
#[command(author, version, about = "Scour: a web research assistant", long_about = None)]
pub struct Cli {
    /// Research question to answer
    pub query: String,

    /// Model to use (overrides settings)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Base URL for the LLM API (overrides settings)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Maximum search results per query (1-20)
    #[arg(long)]
    pub max_results: Option<u32>,

    /// Session identifier for log correlation
    #[arg(long)]
    pub session_id: Option<String>,

    /// Log level (trace, debug, info, warn, error); defaults to the
    /// LOG_LEVEL setting
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Enable debug logging (shorthand for --log-level debug)
    #[arg(short, long)]
    pub debug: bool,
}

/// Resolve the log filter: --debug beats --log-level beats the
/// LOG_LEVEL setting.
fn resolve_log_filter(debug: bool, flag: Option<LogLevel>, settings_level: &str) -> String {
    if debug {
        "debug".to_string()
    } else if let Some(level) = flag {
        level.as_filter().to_string()
    } else {
        settings_level.to_string()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load().context("Failed to load settings")?;

    let filter = resolve_log_filter(cli.debug, cli.log_level, &settings.log_level);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();
    if let Some(model) = cli.model {
        settings.llm_model = model;
    }
    if let Some(base_url) = cli.base_url {
        settings.llm_base_url = base_url;
    }

    let answer = run_research(&settings, &cli.query, cli.session_id, cli.max_results)
        .await
        .context("Research failed")?;

    println!("{}", answer);

    Ok(())
}

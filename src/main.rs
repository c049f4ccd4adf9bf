//! plexcode - Main Entry Point
//!
//! Loads configuration from the environment and starts the interactive
//! project assistant shell.

use std::process;

use anyhow::Context as _;
use tracing_subscriber::EnvFilter;

use plexcode::cli::config::{API_KEY_VAR, LOG_VAR};
use plexcode::cli::{CliConfig, Shell};
use plexcode::error::ConfigError;
use plexcode::llm::PerplexityClient;
use plexcode::tools::Workspace;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // A missing .env file is the normal case
    dotenv::dotenv().ok();
    init_logging();

    let config = match CliConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            if let ConfigError::MissingApiKey(_) = e {
                eprintln!("Please set the {} environment variable:", API_KEY_VAR);
                eprintln!("    export {}='your-api-key-here'", API_KEY_VAR);
            }
            process::exit(1);
        }
    };

    if let Err(e) = run_application(config).await {
        eprintln!("\nError: plexcode encountered an error: {:#}", e);
        process::exit(1);
    }
}

/// Log to stderr so diagnostics never mix with command output
fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run_application(config: CliConfig) -> anyhow::Result<()> {
    let client = PerplexityClient::new(&config.api).context("initializing Perplexity client")?;
    let workspace = Workspace::from_process_cwd().context("reading current directory")?;
    tracing::info!(model = client.model(), cwd = %workspace.pwd(), "starting shell");

    let mut shell = Shell::new(config, workspace, client);
    shell.run().await?;
    Ok(())
}

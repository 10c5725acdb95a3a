//! Travel Cost Predictor CLI
//!
//! Estimates the cost of a trip from a destination, a number of nights
//! and a number of travelers, either by loading the model locally or by
//! asking a running travel-server.

mod client;
mod commands;
mod config;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commands::{catalog, model, predict, Backend};
use predictor_lib::{
    catalog::DEFAULT_PREVIEW_ROWS,
    predictor::{DEFAULT_CURRENCY, DEFAULT_MODEL_FILENAME},
    Session, SessionConfig, DEFAULT_NIGHTS, DEFAULT_TRAVELERS,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Travel Cost Predictor CLI
#[derive(Parser)]
#[command(name = "tcp")]
#[command(author, version, about = "CLI for the Travel Cost Predictor", long_about = None)]
pub struct Cli {
    /// Model artifact file (local mode)
    #[arg(long, env = "TCP_MODEL")]
    pub model: Option<PathBuf>,

    /// CSV dataset with a Destination column (local mode)
    #[arg(long, env = "TCP_DATASET")]
    pub dataset: Option<PathBuf>,

    /// Expected SHA-256 of the model artifact
    #[arg(long, env = "TCP_MODEL_SHA256")]
    pub model_sha256: Option<String>,

    /// Use a running travel-server instead of loading files locally
    #[arg(long, env = "TCP_API_URL")]
    pub api_url: Option<String>,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Predict the cost of a trip
    Predict {
        /// Destination, one of the catalog entries
        #[arg(long, short)]
        destination: String,

        /// Number of nights (1-30)
        #[arg(long, short, default_value_t = DEFAULT_NIGHTS, value_parser = clap::value_parser!(u32).range(1..=30))]
        nights: u32,

        /// Number of travelers (1-10)
        #[arg(long, short, default_value_t = DEFAULT_TRAVELERS, value_parser = clap::value_parser!(u32).range(1..=10))]
        travelers: u32,
    },

    /// List selectable destinations
    Destinations,

    /// Dataset commands
    #[command(subcommand)]
    Dataset(DatasetCommands),

    /// Show the loaded model artifact
    Model,
}

#[derive(Subcommand)]
pub enum DatasetCommands {
    /// Show the first rows of the dataset
    Preview {
        /// Number of rows to show
        #[arg(long, default_value_t = DEFAULT_PREVIEW_ROWS)]
        rows: usize,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

/// Build the backend from flags, falling back to the config file
fn build_backend(cli: &Cli, file_config: config::Config) -> Result<Backend> {
    if let Some(api_url) = cli.api_url.clone().or(file_config.api_url) {
        return Ok(Backend::Remote(client::ApiClient::new(&api_url)?));
    }

    let model_path = cli
        .model
        .clone()
        .or(file_config.model_path)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_FILENAME));

    let session_config = SessionConfig {
        model_path,
        dataset_path: cli.dataset.clone().or(file_config.dataset_path),
        model_sha256: cli.model_sha256.clone(),
    };

    let session = Session::load(&session_config).context("Failed to load prediction inputs")?;
    let currency = file_config
        .currency
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

    Ok(Backend::Local { session, currency })
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let file_config = config::Config::load()?;
    let backend = build_backend(&cli, file_config)?;

    match cli.command {
        Commands::Predict {
            destination,
            nights,
            travelers,
        } => {
            let request = client::PredictRequest {
                destination,
                nights,
                travelers,
            };
            return predict::predict(&backend, request, cli.format).await;
        }
        Commands::Destinations => {
            catalog::list_destinations(&backend, cli.format).await?;
        }
        Commands::Dataset(DatasetCommands::Preview { rows }) => {
            catalog::preview_dataset(&backend, rows, cli.format).await?;
        }
        Commands::Model => {
            model::show_model(&backend, cli.format).await?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

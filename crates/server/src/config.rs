//! Server configuration

use anyhow::{Context, Result};
use predictor_lib::predictor::{DEFAULT_CURRENCY, DEFAULT_MODEL_FILENAME};
use predictor_lib::SessionConfig;
use serde::Deserialize;
use std::path::PathBuf;

/// Server configuration, read from `TRAVEL_*` environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Name reported in structured logs
    #[serde(default = "default_instance")]
    pub instance: String,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory searched for the default model file
    #[serde(default = "default_model_dir")]
    pub model_dir: PathBuf,

    /// Explicit model file, overrides `model_dir`
    #[serde(default)]
    pub model_path: Option<PathBuf>,

    /// Expected SHA-256 of the model file
    #[serde(default)]
    pub model_sha256: Option<String>,

    /// CSV dataset providing the destination list
    #[serde(default)]
    pub dataset_path: Option<PathBuf>,

    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_instance() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "local".to_string())
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_model_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            instance: default_instance(),
            host: default_host(),
            port: default_port(),
            model_dir: default_model_dir(),
            model_path: None,
            model_sha256: None,
            dataset_path: None,
            currency: default_currency(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from the environment
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("TRAVEL").try_parsing(true))
            .build()
            .context("Failed to read configuration")?;

        config
            .try_deserialize()
            .context("Invalid configuration")
    }

    /// Model file to load
    pub fn model_path(&self) -> PathBuf {
        self.model_path
            .clone()
            .unwrap_or_else(|| self.model_dir.join(DEFAULT_MODEL_FILENAME))
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            model_path: self.model_path(),
            dataset_path: self.dataset_path.clone(),
            model_sha256: self.model_sha256.clone(),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

//! Startup loading and the per-request prediction path
//!
//! A [`Session`] owns everything read from disk at startup. It is built once
//! and handed to the request handlers, which only borrow it.

use crate::catalog::{Dataset, DestinationCatalog};
use crate::error::Result;
use crate::models::TravelQuery;
use crate::predictor::{self, ModelArtifact, PredictionResult};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Inputs needed to build a [`Session`]
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub model_path: PathBuf,
    /// Dataset to derive destinations from; the builtin catalog is used when absent
    pub dataset_path: Option<PathBuf>,
    pub model_sha256: Option<String>,
}

impl SessionConfig {
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            dataset_path: None,
            model_sha256: None,
        }
    }

    pub fn with_dataset(mut self, dataset_path: impl Into<PathBuf>) -> Self {
        self.dataset_path = Some(dataset_path.into());
        self
    }

    pub fn with_checksum(mut self, sha256: impl Into<String>) -> Self {
        self.model_sha256 = Some(sha256.into());
        self
    }
}

/// Catalog, optional dataset and resolved model
#[derive(Debug)]
pub struct Session {
    catalog: DestinationCatalog,
    dataset: Option<Dataset>,
    artifact: ModelArtifact,
}

impl Session {
    /// Load the catalog, then the artifact. Any error here is fatal.
    pub fn load(config: &SessionConfig) -> Result<Self> {
        log_environment(&config.model_path);

        let (catalog, dataset) = match &config.dataset_path {
            Some(path) => {
                let dataset = Dataset::load(path)?;
                (dataset.destinations()?, Some(dataset))
            }
            None => (DestinationCatalog::builtin(), None),
        };

        let artifact =
            predictor::resolve_verified(&config.model_path, config.model_sha256.as_deref())?;

        info!(
            destinations = catalog.len(),
            dataset = dataset.is_some(),
            model_kind = artifact.kind(),
            "Session loaded"
        );

        Ok(Self {
            catalog,
            dataset,
            artifact,
        })
    }

    /// Assemble a session from parts already in memory
    pub fn from_parts(
        catalog: DestinationCatalog,
        dataset: Option<Dataset>,
        artifact: ModelArtifact,
    ) -> Self {
        Self {
            catalog,
            dataset,
            artifact,
        }
    }

    pub fn catalog(&self) -> &DestinationCatalog {
        &self.catalog
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    /// Validate raw input into a [`TravelQuery`] against this session's catalog
    pub fn query(&self, destination: &str, nights: u32, travelers: u32) -> Result<TravelQuery> {
        TravelQuery::new(&self.catalog, destination, nights, travelers)
    }

    pub fn predict(&self, query: &TravelQuery) -> Result<PredictionResult> {
        predictor::predict(&self.artifact, query)
    }
}

/// Log where the process is running and what sits next to the model
fn log_environment(model_path: &Path) {
    let cwd = std::env::current_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    debug!(working_dir = %cwd, model_path = %model_path.display(), "Looking for model");

    let dir = match model_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if let Ok(entries) = std::fs::read_dir(dir) {
        let files: Vec<String> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        debug!(dir = %dir.display(), files = ?files, "Files next to model");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PredictorError;
    use std::fs;
    use tempfile::TempDir;

    fn setup(model: &str, dataset: Option<&str>) -> (TempDir, SessionConfig) {
        let dir = TempDir::new().unwrap();
        let model_path = dir.path().join("model.json");
        fs::write(&model_path, model).unwrap();

        let mut config = SessionConfig::new(&model_path);
        if let Some(csv) = dataset {
            let dataset_path = dir.path().join("travel.csv");
            fs::write(&dataset_path, csv).unwrap();
            config = config.with_dataset(dataset_path);
        }
        (dir, config)
    }

    #[test]
    fn test_builtin_catalog_without_dataset() {
        let (_dir, config) = setup(r#"{"kind": "constant", "values": [100.0]}"#, None);
        let session = Session::load(&config).unwrap();
        assert_eq!(session.catalog().len(), 9);
        assert!(session.dataset().is_none());
    }

    #[test]
    fn test_catalog_from_dataset() {
        let (_dir, config) = setup(
            r#"{"kind": "constant", "values": [100.0]}"#,
            Some("Destination,Nights\nTokyo,2\nBali,3\nBali,4\n"),
        );
        let session = Session::load(&config).unwrap();
        assert_eq!(session.catalog().as_slice(), &["Bali".to_string(), "Tokyo".to_string()]);

        // Destinations outside the dataset are no longer selectable
        assert!(session.query("London", 3, 1).is_err());
        assert!(session.query("Tokyo", 3, 1).is_ok());
    }

    #[test]
    fn test_dataset_failure_is_fatal() {
        let (_dir, config) = setup(
            r#"{"kind": "constant", "values": [100.0]}"#,
            Some("City\nTokyo\n"),
        );
        let err = Session::load(&config).unwrap_err();
        assert!(err.is_fatal());
        assert!(matches!(err, PredictorError::MissingColumn { .. }));
    }

    #[test]
    fn test_missing_model_is_fatal() {
        let (dir, _) = setup("{}", None);
        let config = SessionConfig::new(dir.path().join("missing.json"));
        let err = Session::load(&config).unwrap_err();
        assert!(matches!(err, PredictorError::MissingFile { .. }));
    }

    #[test]
    fn test_prediction_error_is_not_fatal() {
        let (_dir, config) = setup(
            r#"{"kind": "linear", "intercept": [1.0], "nights": [1.0], "travelers": [1.0], "destinations": {}}"#,
            None,
        );
        let session = Session::load(&config).unwrap();
        let query = session.query("Bali", 2, 2).unwrap();

        let err = session.predict(&query).unwrap_err();
        assert!(!err.is_fatal());

        // The session keeps serving after a failure
        assert!(session.predict(&query).is_err());
        assert!(session.query("Tokyo", 1, 1).is_ok());
    }
}

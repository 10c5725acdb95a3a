//! Resolution of the serialized model artifact
//!
//! The artifact file is JSON and holds either a single entry (an object with
//! a `kind` tag) or a mapping from labels to entries, as produced when a
//! model is saved together with its preprocessing objects. For a mapping,
//! the first entry in file order that can predict is selected.

use super::inference::{OnnxPredictor, OnnxSpec};
use super::linear::{CategoryEncoder, ConstantModel, LinearModel, StandardScaler};
use super::Predictor;
use crate::error::{PredictorError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File name looked up in the model directory when no path is given
pub const DEFAULT_MODEL_FILENAME: &str = "travel_cost_predictor.json";

/// Key that marks a JSON object as a single entry when its value is a string
const KIND_KEY: &str = "kind";

/// One decoded object from the artifact file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArtifactEntry {
    Linear(LinearModel),
    Constant(ConstantModel),
    Onnx(OnnxSpec),
    Scaler(StandardScaler),
    Encoder(CategoryEncoder),
}

impl ArtifactEntry {
    /// Returns true if this entry exposes the predict capability
    pub fn has_predict(&self) -> bool {
        matches!(
            self,
            ArtifactEntry::Linear(_) | ArtifactEntry::Constant(_) | ArtifactEntry::Onnx(_)
        )
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ArtifactEntry::Linear(_) => "linear",
            ArtifactEntry::Constant(_) => "constant",
            ArtifactEntry::Onnx(_) => "onnx",
            ArtifactEntry::Scaler(_) => "scaler",
            ArtifactEntry::Encoder(_) => "encoder",
        }
    }
}

/// A resolved artifact, ready to be shared by every request
pub struct ModelArtifact {
    predictor: Option<Box<dyn Predictor>>,
    kind: &'static str,
    label: Option<String>,
    fingerprint: String,
    path: PathBuf,
}

impl std::fmt::Debug for ModelArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelArtifact")
            .field("kind", &self.kind)
            .field("label", &self.label)
            .field("fingerprint", &self.fingerprint)
            .field("path", &self.path)
            .finish()
    }
}

impl ModelArtifact {
    /// Wrap an in-memory predictor, bypassing the file format
    pub fn from_predictor(predictor: Box<dyn Predictor>) -> Self {
        let kind = predictor.kind();
        Self {
            predictor: Some(predictor),
            kind,
            label: None,
            fingerprint: String::new(),
            path: PathBuf::new(),
        }
    }

    /// The predict capability, if the resolved object has one
    pub fn predictor(&self) -> Option<&dyn Predictor> {
        self.predictor.as_deref()
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Mapping key the entry was selected under, if the artifact was nested
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Hex SHA-256 of the artifact file
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Load the artifact at `path`
pub fn resolve(path: impl AsRef<Path>) -> Result<ModelArtifact> {
    resolve_verified(path, None)
}

/// Load the artifact at `path`, rejecting it if its SHA-256 differs from `expected_sha256`
pub fn resolve_verified(path: impl AsRef<Path>, expected_sha256: Option<&str>) -> Result<ModelArtifact> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(PredictorError::MissingFile {
            path: path.to_path_buf(),
        });
    }

    let bytes = std::fs::read(path).map_err(|e| PredictorError::from_io(path, e))?;
    let fingerprint = compute_checksum(&bytes);

    if let Some(expected) = expected_sha256 {
        if !expected.eq_ignore_ascii_case(&fingerprint) {
            return Err(PredictorError::unusable(
                path,
                format!("checksum mismatch: expected {}, got {}", expected, fingerprint),
            ));
        }
        debug!(checksum = %fingerprint, "Artifact checksum validated");
    }

    let value: Value = serde_json::from_slice(&bytes)
        .map_err(|e| PredictorError::unusable(path, format!("not valid JSON: {}", e)))?;

    let (label, entry) = select_entry(path, value)?;
    let kind = entry.kind();
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let predictor = materialize(path, base_dir, entry)?;

    info!(
        path = %path.display(),
        kind = kind,
        label = label.as_deref().unwrap_or("-"),
        fingerprint = %fingerprint,
        "Model artifact resolved"
    );

    Ok(ModelArtifact {
        predictor,
        kind,
        label,
        fingerprint,
        path: path.to_path_buf(),
    })
}

/// Pick the entry to use from the decoded JSON document
fn select_entry(path: &Path, value: Value) -> Result<(Option<String>, ArtifactEntry)> {
    let Value::Object(map) = value else {
        return Err(PredictorError::unusable(
            path,
            "expected a JSON object at the top level",
        ));
    };

    if map.get(KIND_KEY).is_some_and(Value::is_string) {
        let entry = serde_json::from_value(Value::Object(map))
            .map_err(|e| PredictorError::unusable(path, format!("invalid model entry: {}", e)))?;
        return Ok((None, entry));
    }

    for (label, candidate) in map {
        match serde_json::from_value::<ArtifactEntry>(candidate) {
            Ok(entry) if entry.has_predict() => {
                debug!(label = %label, kind = entry.kind(), "Selected model from mapping");
                return Ok((Some(label), entry));
            }
            Ok(entry) => {
                debug!(label = %label, kind = entry.kind(), "Skipping entry without predict capability");
            }
            Err(e) => {
                debug!(label = %label, error = %e, "Skipping undecodable entry");
            }
        }
    }

    Err(PredictorError::unusable(
        path,
        "no entry in the mapping exposes a predict capability",
    ))
}

fn materialize(
    path: &Path,
    base_dir: &Path,
    entry: ArtifactEntry,
) -> Result<Option<Box<dyn Predictor>>> {
    let predictor: Box<dyn Predictor> = match entry {
        ArtifactEntry::Linear(model) => Box::new(model),
        ArtifactEntry::Constant(model) => Box::new(model),
        ArtifactEntry::Onnx(spec) => {
            let onnx_path = base_dir.join(&spec.path);
            let bytes =
                std::fs::read(&onnx_path).map_err(|e| PredictorError::from_io(&onnx_path, e))?;
            let model = OnnxPredictor::new(&bytes, spec.destinations)
                .map_err(|e| PredictorError::unusable(path, format!("{:#}", e)))?;
            Box::new(model)
        }
        ArtifactEntry::Scaler(_) | ArtifactEntry::Encoder(_) => return Ok(None),
    };
    Ok(Some(predictor))
}

/// Compute SHA256 checksum of data
pub fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DestinationCatalog;
    use crate::models::TravelQuery;
    use crate::predictor::{predict, PredictionResult};
    use std::fs;
    use tempfile::TempDir;

    fn write_artifact(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join(DEFAULT_MODEL_FILENAME);
        fs::write(&path, content).unwrap();
        path
    }

    fn bali_query() -> TravelQuery {
        TravelQuery::new(&DestinationCatalog::builtin(), "Bali", 5, 2).unwrap()
    }

    #[test]
    fn test_missing_path() {
        let dir = TempDir::new().unwrap();
        let err = resolve(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, PredictorError::MissingFile { .. }));
    }

    #[test]
    fn test_direct_entry() {
        let dir = TempDir::new().unwrap();
        let path = write_artifact(&dir, r#"{"kind": "constant", "values": [1000.0, 400.0]}"#);

        let artifact = resolve(&path).unwrap();
        assert_eq!(artifact.kind(), "constant");
        assert!(artifact.label().is_none());
        assert_eq!(artifact.fingerprint().len(), 64);

        let result = predict(&artifact, &bali_query()).unwrap();
        assert_eq!(
            result,
            PredictionResult::Breakdown {
                accommodation: 1000.0,
                transport: 400.0
            }
        );
    }

    #[test]
    fn test_mapping_skips_scaler() {
        let dir = TempDir::new().unwrap();
        let path = write_artifact(
            &dir,
            r#"{
                "scaler": {"kind": "scaler", "mean": [0.0, 0.0], "scale": [1.0, 1.0]},
                "model": {"kind": "constant", "values": [750.0]}
            }"#,
        );

        let artifact = resolve(&path).unwrap();
        assert_eq!(artifact.label(), Some("model"));
        assert_eq!(artifact.kind(), "constant");
    }

    #[test]
    fn test_mapping_selects_first_in_file_order() {
        let dir = TempDir::new().unwrap();
        let path = write_artifact(
            &dir,
            r#"{
                "zeta": {"kind": "constant", "values": [1.0]},
                "alpha": {"kind": "constant", "values": [2.0]}
            }"#,
        );

        let artifact = resolve(&path).unwrap();
        assert_eq!(artifact.label(), Some("zeta"));
    }

    #[test]
    fn test_mapping_skips_undecodable_entries() {
        let dir = TempDir::new().unwrap();
        let path = write_artifact(
            &dir,
            r#"{
                "notes": "trained on 2024 data",
                "columns": ["Destination", "Nights", "NumTravelers"],
                "regressor": {"kind": "constant", "values": [5.0]}
            }"#,
        );

        assert_eq!(resolve(&path).unwrap().label(), Some("regressor"));
    }

    #[test]
    fn test_mapping_label_named_kind() {
        let dir = TempDir::new().unwrap();
        let path = write_artifact(
            &dir,
            r#"{
                "kind": {"kind": "constant", "values": [42.0]}
            }"#,
        );

        let artifact = resolve(&path).unwrap();
        assert_eq!(artifact.label(), Some("kind"));
        assert_eq!(artifact.kind(), "constant");
    }

    #[test]
    fn test_mapping_without_predictor() {
        let dir = TempDir::new().unwrap();
        let path = write_artifact(
            &dir,
            r#"{
                "scaler": {"kind": "scaler", "mean": [0.0], "scale": [1.0]},
                "encoder": {"kind": "encoder", "categories": ["Bali"]}
            }"#,
        );

        let err = resolve(&path).unwrap_err();
        assert!(matches!(err, PredictorError::UnusableArtifactShape { .. }));
    }

    #[test]
    fn test_direct_non_predictor_fails_at_predict_time() {
        let dir = TempDir::new().unwrap();
        let path = write_artifact(&dir, r#"{"kind": "scaler", "mean": [0.0], "scale": [1.0]}"#);

        let artifact = resolve(&path).unwrap();
        assert!(artifact.predictor().is_none());

        let err = predict(&artifact, &bali_query()).unwrap_err();
        assert!(matches!(err, PredictorError::Prediction(_)));
    }

    #[test]
    fn test_invalid_json() {
        let dir = TempDir::new().unwrap();
        let path = write_artifact(&dir, "\u{80}\u{04}\u{95} pickle bytes");
        let err = resolve(&path).unwrap_err();
        assert!(matches!(err, PredictorError::UnusableArtifactShape { .. }));
    }

    #[test]
    fn test_top_level_array_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_artifact(&dir, "[1, 2, 3]");
        let err = resolve(&path).unwrap_err();
        assert!(matches!(err, PredictorError::UnusableArtifactShape { .. }));
    }

    #[test]
    fn test_checksum_verification() {
        let dir = TempDir::new().unwrap();
        let content = r#"{"kind": "constant", "values": [1.0]}"#;
        let path = write_artifact(&dir, content);
        let checksum = compute_checksum(content.as_bytes());

        assert!(resolve_verified(&path, Some(&checksum)).is_ok());
        assert!(resolve_verified(&path, Some(&checksum.to_uppercase())).is_ok());

        let err = resolve_verified(&path, Some("deadbeef")).unwrap_err();
        assert!(matches!(err, PredictorError::UnusableArtifactShape { .. }));
    }

    #[test]
    fn test_onnx_entry_missing_model_file() {
        let dir = TempDir::new().unwrap();
        let path = write_artifact(
            &dir,
            r#"{"kind": "onnx", "path": "cost.onnx", "destinations": ["Bali"]}"#,
        );

        let err = resolve(&path).unwrap_err();
        match err {
            PredictorError::MissingFile { path } => assert!(path.ends_with("cost.onnx")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_linear_artifact_end_to_end() {
        let dir = TempDir::new().unwrap();
        let path = write_artifact(
            &dir,
            r#"{
                "encoder": {"kind": "encoder", "categories": ["Bali", "Tokyo"]},
                "model": {
                    "kind": "linear",
                    "intercept": [0.0, 100.0],
                    "nights": [180.0, 0.0],
                    "travelers": [50.0, 150.0],
                    "destinations": {"Bali": [0.0, 0.0], "Tokyo": [500.0, 900.0]}
                }
            }"#,
        );

        let artifact = resolve(&path).unwrap();
        let result = predict(&artifact, &bali_query()).unwrap();
        assert_eq!(
            result,
            PredictionResult::Breakdown {
                accommodation: 1000.0,
                transport: 400.0
            }
        );
    }
}

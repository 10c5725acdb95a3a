//! Error taxonomy for the predictor library

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading inputs or producing a prediction
#[derive(Debug, Error)]
pub enum PredictorError {
    /// A required input file does not exist
    #[error("cannot find `{}`", path.display())]
    MissingFile { path: PathBuf },

    /// The dataset lacks a column the catalog is derived from
    #[error("column `{column}` not found in {}", path.display())]
    MissingColumn { column: String, path: PathBuf },

    /// The artifact could not be turned into something that predicts
    #[error("unusable model artifact {}: {reason}", path.display())]
    UnusableArtifactShape { path: PathBuf, reason: String },

    /// The predict capability failed for a single query
    #[error("error making prediction: {0}")]
    Prediction(String),

    /// The query violates the catalog or its numeric bounds
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// The dataset exists but is not readable as CSV
    #[error("failed to parse dataset {}: {source}", path.display())]
    Dataset {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PredictorError {
    /// Returns true if the error should halt the process at startup.
    ///
    /// Prediction and query errors only affect the request that raised them.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            PredictorError::Prediction(_) | PredictorError::InvalidQuery(_)
        )
    }

    pub(crate) fn prediction(message: impl Into<String>) -> Self {
        PredictorError::Prediction(message.into())
    }

    pub(crate) fn unusable(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        PredictorError::UnusableArtifactShape {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Map an I/O failure on `path`, keeping "not found" as [`PredictorError::MissingFile`]
    pub(crate) fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            PredictorError::MissingFile { path }
        } else {
            PredictorError::Io { path, source }
        }
    }
}

pub type Result<T, E = PredictorError> = std::result::Result<T, E>;

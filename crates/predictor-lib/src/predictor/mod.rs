//! Model loading and cost prediction

mod artifact;
mod inference;
mod linear;
mod output;

pub use artifact::{
    compute_checksum, resolve, resolve_verified, ArtifactEntry, ModelArtifact, DEFAULT_MODEL_FILENAME,
};
pub use inference::{OnnxPredictor, OnnxSpec};
pub use linear::{CategoryEncoder, ConstantModel, LinearModel, StandardScaler};
pub use output::{format_currency, interpret_rows, PredictionResult, DEFAULT_CURRENCY};

use crate::error::{PredictorError, Result};
use crate::models::{FeatureFrame, TravelQuery};
use std::time::Instant;
use tracing::debug;

/// Trait for objects exposing the predict capability
pub trait Predictor: Send + Sync {
    /// Produce one output row per input row
    fn predict(&self, frame: &FeatureFrame) -> anyhow::Result<Vec<Vec<f64>>>;

    /// Short name of the model kind, for logs and metrics
    fn kind(&self) -> &'static str;
}

/// Run `query` through `artifact` and interpret the first output row
pub fn predict(artifact: &ModelArtifact, query: &TravelQuery) -> Result<PredictionResult> {
    let start = Instant::now();
    let frame = query.to_frame();

    let predictor = artifact.predictor().ok_or_else(|| {
        PredictorError::prediction(format!(
            "object of kind `{}` has no predict capability",
            artifact.kind()
        ))
    })?;

    let rows = predictor
        .predict(&frame)
        .map_err(|e| PredictorError::prediction(format!("{:#}", e)))?;
    let result = interpret_rows(rows)?;

    debug!(
        destination = %query.destination(),
        nights = query.nights(),
        travelers = query.travelers(),
        elapsed_us = start.elapsed().as_micros() as u64,
        "Prediction completed"
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DestinationCatalog;

    /// Predictor returning a fixed row, regardless of input
    struct StubPredictor(Vec<f64>);

    impl Predictor for StubPredictor {
        fn predict(&self, frame: &FeatureFrame) -> anyhow::Result<Vec<Vec<f64>>> {
            Ok(frame.rows.iter().map(|_| self.0.clone()).collect())
        }

        fn kind(&self) -> &'static str {
            "stub"
        }
    }

    struct FailingPredictor;

    impl Predictor for FailingPredictor {
        fn predict(&self, _frame: &FeatureFrame) -> anyhow::Result<Vec<Vec<f64>>> {
            anyhow::bail!("shape mismatch: expected 4 features, got 3")
        }

        fn kind(&self) -> &'static str {
            "failing"
        }
    }

    fn bali_query() -> TravelQuery {
        TravelQuery::new(&DestinationCatalog::builtin(), "Bali", 5, 2).unwrap()
    }

    #[test]
    fn test_pair_result_in_accommodation_transport_order() {
        let artifact = ModelArtifact::from_predictor(Box::new(StubPredictor(vec![1000.0, 400.0])));
        let result = predict(&artifact, &bali_query()).unwrap();

        assert_eq!(
            result,
            PredictionResult::Breakdown {
                accommodation: 1000.0,
                transport: 400.0
            }
        );
        let lines = result.display_lines("RM");
        assert_eq!(lines[0], ("Accommodation", "RM 1,000.00".to_string()));
        assert_eq!(lines[1], ("Transport", "RM 400.00".to_string()));
    }

    #[test]
    fn test_scalar_result() {
        let artifact = ModelArtifact::from_predictor(Box::new(StubPredictor(vec![2345.5])));
        let result = predict(&artifact, &bali_query()).unwrap();
        assert_eq!(result, PredictionResult::Total { amount: 2345.5 });
    }

    #[test]
    fn test_underlying_failure_wrapped() {
        let artifact = ModelArtifact::from_predictor(Box::new(FailingPredictor));
        let err = predict(&artifact, &bali_query()).unwrap_err();
        match err {
            PredictorError::Prediction(message) => assert!(message.contains("shape mismatch")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_artifact_reusable_across_calls() {
        let artifact = ModelArtifact::from_predictor(Box::new(StubPredictor(vec![10.0])));
        let query = bali_query();
        let first = predict(&artifact, &query).unwrap();
        let second = predict(&artifact, &query).unwrap();
        assert_eq!(first, second);
    }
}

//! ONNX inference using tract
//!
//! Runs regression models exported to ONNX. The input is a single f32 row:
//! the one-hot encoded destination followed by nights and travelers.

use super::Predictor;
use crate::models::{FeatureFrame, FeatureRecord};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Instant;
use tract_onnx::prelude::*;
use tracing::{debug, warn};

/// Maximum inference latency before warning
const MAX_INFERENCE_MS: u128 = 50;

type TractModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Artifact entry pointing at an ONNX file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnnxSpec {
    /// Model file, relative to the artifact file
    pub path: PathBuf,
    /// One-hot column order used during training
    pub destinations: Vec<String>,
}

/// ONNX-based predictor using tract for lightweight inference
pub struct OnnxPredictor {
    model: TractModel,
    destinations: Vec<String>,
}

impl OnnxPredictor {
    /// Create a new predictor from model bytes
    pub fn new(model_bytes: &[u8], destinations: Vec<String>) -> Result<Self> {
        let model = Self::load_model(model_bytes, destinations.len() + 2)?;
        Ok(Self {
            model,
            destinations,
        })
    }

    /// Load and optimize an ONNX model from bytes
    fn load_model(model_bytes: &[u8], num_features: usize) -> Result<TractModel> {
        let model = tract_onnx::onnx()
            .model_for_read(&mut std::io::Cursor::new(model_bytes))
            .context("Failed to parse ONNX model")?
            .with_input_fact(0, f32::fact([1, num_features]).into())
            .context("Failed to set input shape")?
            .into_optimized()
            .context("Failed to optimize model")?
            .into_runnable()
            .context("Failed to create runnable model")?;
        Ok(model)
    }

    fn num_features(&self) -> usize {
        self.destinations.len() + 2
    }

    /// Convert a feature record to tensor input
    fn record_to_tensor(&self, record: &FeatureRecord) -> Result<Tensor> {
        let slot = self
            .destinations
            .iter()
            .position(|d| d == &record.destination)
            .with_context(|| format!("unknown category `{}`", record.destination))?;

        let mut data = vec![0.0f32; self.num_features()];
        data[slot] = 1.0;
        data[self.destinations.len()] = record.nights as f32;
        data[self.destinations.len() + 1] = record.num_travelers as f32;

        let array = tract_ndarray::Array2::from_shape_vec((1, self.num_features()), data)
            .context("Failed to shape input tensor")?;
        Ok(array.into())
    }
}

impl Predictor for OnnxPredictor {
    fn predict(&self, frame: &FeatureFrame) -> Result<Vec<Vec<f64>>> {
        let mut rows = Vec::with_capacity(frame.len());

        for record in &frame.rows {
            let start = Instant::now();
            let input = self.record_to_tensor(record)?;

            let result = self.model.run(tvec!(input.into()))?;
            let output = result.first().context("No output from model")?;
            let values: Vec<f64> = output
                .to_array_view::<f32>()?
                .iter()
                .map(|v| *v as f64)
                .collect();

            let elapsed = start.elapsed();
            if elapsed.as_millis() > MAX_INFERENCE_MS {
                warn!(elapsed_ms = elapsed.as_millis() as u64, "Inference exceeded {}ms target", MAX_INFERENCE_MS);
            } else {
                debug!(elapsed_us = elapsed.as_micros() as u64, "Inference completed");
            }

            rows.push(values);
        }

        Ok(rows)
    }

    fn kind(&self) -> &'static str {
        "onnx"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_bytes_rejected() {
        let result = OnnxPredictor::new(b"definitely not a protobuf", vec!["Bali".to_string()]);
        assert!(result.is_err());
    }

    #[test]
    fn test_spec_deserializes() {
        let spec: OnnxSpec =
            serde_json::from_str(r#"{"path": "cost.onnx", "destinations": ["Bali", "Tokyo"]}"#)
                .unwrap();
        assert_eq!(spec.path, PathBuf::from("cost.onnx"));
        assert_eq!(spec.destinations.len(), 2);
    }
}

//! Closed-form model kinds decoded straight from the artifact file
//!
//! `LinearModel` and `ConstantModel` implement the predict capability.
//! `StandardScaler` and `CategoryEncoder` are preprocessing objects that
//! are sometimes saved next to the model and never predict.

use super::Predictor;
use crate::models::{FeatureFrame, FeatureRecord};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Linear regression over nights, travelers and a per-destination offset
///
/// Every coefficient vector holds one entry per output, so a model with
/// two-element vectors yields (accommodation, transport) rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModel {
    pub intercept: Vec<f64>,
    pub nights: Vec<f64>,
    pub travelers: Vec<f64>,
    /// Coefficients of the nights × travelers interaction term
    #[serde(default)]
    pub nights_travelers: Vec<f64>,
    pub destinations: BTreeMap<String, Vec<f64>>,
}

impl LinearModel {
    fn outputs(&self) -> usize {
        self.intercept.len()
    }

    fn check_width(&self, name: &str, coefficients: &[f64]) -> Result<()> {
        if coefficients.len() != self.outputs() {
            bail!(
                "shape mismatch: `{}` has {} coefficients, intercept has {}",
                name,
                coefficients.len(),
                self.outputs()
            );
        }
        Ok(())
    }

    fn predict_row(&self, record: &FeatureRecord) -> Result<Vec<f64>> {
        let offsets = self
            .destinations
            .get(&record.destination)
            .ok_or_else(|| anyhow::anyhow!("unknown category `{}`", record.destination))?;
        self.check_width("destinations", offsets)?;

        let nights = record.nights as f64;
        let travelers = record.num_travelers as f64;

        Ok((0..self.outputs())
            .map(|k| {
                let interaction = self.nights_travelers.get(k).copied().unwrap_or(0.0);
                self.intercept[k]
                    + self.nights[k] * nights
                    + self.travelers[k] * travelers
                    + interaction * nights * travelers
                    + offsets[k]
            })
            .collect())
    }
}

impl Predictor for LinearModel {
    fn predict(&self, frame: &FeatureFrame) -> Result<Vec<Vec<f64>>> {
        if self.outputs() == 0 {
            bail!("model has no outputs");
        }
        self.check_width("nights", &self.nights)?;
        self.check_width("travelers", &self.travelers)?;
        if !self.nights_travelers.is_empty() {
            self.check_width("nights_travelers", &self.nights_travelers)?;
        }

        frame.rows.iter().map(|r| self.predict_row(r)).collect()
    }

    fn kind(&self) -> &'static str {
        "linear"
    }
}

/// Baseline regressor returning the same values for any input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstantModel {
    pub values: Vec<f64>,
}

impl Predictor for ConstantModel {
    fn predict(&self, frame: &FeatureFrame) -> Result<Vec<Vec<f64>>> {
        Ok(frame.rows.iter().map(|_| self.values.clone()).collect())
    }

    fn kind(&self) -> &'static str {
        "constant"
    }
}

/// Feature standardization parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

/// Category vocabulary of a one-hot encoder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryEncoder {
    pub categories: Vec<String>,
}

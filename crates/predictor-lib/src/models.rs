//! Core data models for the travel cost predictor

use crate::catalog::DestinationCatalog;
use crate::error::{PredictorError, Result};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Allowed number of nights per trip
pub const NIGHTS_RANGE: RangeInclusive<u32> = 1..=30;

/// Allowed number of travelers per trip
pub const TRAVELERS_RANGE: RangeInclusive<u32> = 1..=10;

/// Default nights offered by input surfaces
pub const DEFAULT_NIGHTS: u32 = 3;

/// Default travelers offered by input surfaces
pub const DEFAULT_TRAVELERS: u32 = 1;

/// Column names of the feature frame, in the order the model was trained on
pub const FEATURE_COLUMNS: [&str; 3] = ["Destination", "Nights", "NumTravelers"];

/// A validated prediction request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TravelQuery {
    destination: String,
    nights: u32,
    travelers: u32,
}

impl TravelQuery {
    /// Build a query, checking the destination against `catalog` and the bounds
    pub fn new(
        catalog: &DestinationCatalog,
        destination: impl Into<String>,
        nights: u32,
        travelers: u32,
    ) -> Result<Self> {
        let destination = destination.into();
        if !catalog.contains(&destination) {
            return Err(PredictorError::InvalidQuery(format!(
                "unknown destination `{}`",
                destination
            )));
        }
        if !NIGHTS_RANGE.contains(&nights) {
            return Err(PredictorError::InvalidQuery(format!(
                "nights must be between {} and {}, got {}",
                NIGHTS_RANGE.start(),
                NIGHTS_RANGE.end(),
                nights
            )));
        }
        if !TRAVELERS_RANGE.contains(&travelers) {
            return Err(PredictorError::InvalidQuery(format!(
                "travelers must be between {} and {}, got {}",
                TRAVELERS_RANGE.start(),
                TRAVELERS_RANGE.end(),
                travelers
            )));
        }
        Ok(Self {
            destination,
            nights,
            travelers,
        })
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn nights(&self) -> u32 {
        self.nights
    }

    pub fn travelers(&self) -> u32 {
        self.travelers
    }

    /// Single-row frame handed to the model's predict capability
    pub fn to_frame(&self) -> FeatureFrame {
        FeatureFrame {
            rows: vec![FeatureRecord {
                destination: self.destination.clone(),
                nights: self.nights,
                num_travelers: self.travelers,
            }],
        }
    }
}

/// One row of model input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    #[serde(rename = "Destination")]
    pub destination: String,
    #[serde(rename = "Nights")]
    pub nights: u32,
    #[serde(rename = "NumTravelers")]
    pub num_travelers: u32,
}

/// Tabular model input, columns as in [`FEATURE_COLUMNS`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureFrame {
    pub rows: Vec<FeatureRecord>,
}

impl FeatureFrame {
    pub fn columns(&self) -> &'static [&'static str] {
        &FEATURE_COLUMNS
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

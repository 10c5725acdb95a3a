//! Library for travel cost prediction
//!
//! This crate provides the core functionality for:
//! - Destination catalogs, hard-coded or derived from a CSV dataset
//! - Resolving a serialized model artifact
//! - Turning a travel query into a cost estimate
//! - Health checks and observability

pub mod catalog;
pub mod error;
pub mod health;
pub mod models;
pub mod observability;
pub mod predictor;
pub mod session;

pub use catalog::{Dataset, DatasetPreview, DestinationCatalog};
pub use error::PredictorError;
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use observability::{PredictorMetrics, StructuredLogger};
pub use predictor::{format_currency, ModelArtifact, PredictionResult, Predictor};
pub use session::{Session, SessionConfig};

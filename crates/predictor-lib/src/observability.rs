//! Observability infrastructure for the predictor
//!
//! Provides:
//! - Prometheus metrics (prediction count, errors, latency, model info)
//! - Structured logging with tracing

use crate::models::TravelQuery;
use crate::predictor::PredictionResult;
use prometheus::{
    register_gauge_vec, register_histogram, register_int_counter, register_int_gauge, GaugeVec,
    Histogram, IntCounter, IntGauge,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Histogram buckets for prediction latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<PredictorMetricsInner> = OnceLock::new();

struct PredictorMetricsInner {
    predictions: IntCounter,
    prediction_errors: IntCounter,
    prediction_latency_seconds: Histogram,
    model_info: GaugeVec,
    catalog_size: IntGauge,
}

impl PredictorMetricsInner {
    fn new() -> Self {
        Self {
            predictions: register_int_counter!(
                "travel_predictor_predictions_total",
                "Total number of cost predictions served"
            )
            .expect("Failed to register predictions_total"),

            prediction_errors: register_int_counter!(
                "travel_predictor_prediction_errors_total",
                "Total number of failed predictions"
            )
            .expect("Failed to register prediction_errors_total"),

            prediction_latency_seconds: register_histogram!(
                "travel_predictor_prediction_latency_seconds",
                "Time spent in the model's predict capability",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register prediction_latency_seconds"),

            model_info: register_gauge_vec!(
                "travel_predictor_model_info",
                "Information about the loaded model artifact",
                &["kind", "fingerprint"]
            )
            .expect("Failed to register model_info"),

            catalog_size: register_int_gauge!(
                "travel_predictor_catalog_size",
                "Number of selectable destinations"
            )
            .expect("Failed to register catalog_size"),
        }
    }
}

/// Handle to the process-wide predictor metrics
///
/// Clones share the same underlying metrics.
#[derive(Clone)]
pub struct PredictorMetrics {
    _private: (),
}

impl Default for PredictorMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl PredictorMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(PredictorMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &PredictorMetricsInner {
        GLOBAL_METRICS.get_or_init(PredictorMetricsInner::new)
    }

    pub fn observe_prediction_latency(&self, duration_secs: f64) {
        self.inner().prediction_latency_seconds.observe(duration_secs);
    }

    pub fn inc_predictions(&self) {
        self.inner().predictions.inc();
    }

    pub fn inc_prediction_errors(&self) {
        self.inner().prediction_errors.inc();
    }

    pub fn set_model_info(&self, kind: &str, fingerprint: &str) {
        self.inner().model_info.reset();
        self.inner()
            .model_info
            .with_label_values(&[kind, fingerprint])
            .set(1.0);
    }

    pub fn set_catalog_size(&self, size: usize) {
        self.inner().catalog_size.set(size as i64);
    }

    pub fn predictions(&self) -> u64 {
        self.inner().predictions.get()
    }

    pub fn prediction_errors(&self) -> u64 {
        self.inner().prediction_errors.get()
    }
}

/// Structured logger for predictor events
#[derive(Clone)]
pub struct StructuredLogger {
    instance: String,
}

impl StructuredLogger {
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
        }
    }

    pub fn log_prediction(&self, query: &TravelQuery, result: &PredictionResult, model_kind: &str) {
        match *result {
            PredictionResult::Total { amount } => info!(
                event = "prediction_generated",
                instance = %self.instance,
                destination = %query.destination(),
                nights = query.nights(),
                travelers = query.travelers(),
                total = amount,
                model_kind = %model_kind,
                "Generated cost prediction"
            ),
            PredictionResult::Breakdown {
                accommodation,
                transport,
            } => info!(
                event = "prediction_generated",
                instance = %self.instance,
                destination = %query.destination(),
                nights = query.nights(),
                travelers = query.travelers(),
                accommodation = accommodation,
                transport = transport,
                model_kind = %model_kind,
                "Generated cost prediction"
            ),
        }
    }

    pub fn log_prediction_failure(&self, query: &TravelQuery, error: &str) {
        warn!(
            event = "prediction_failed",
            instance = %self.instance,
            destination = %query.destination(),
            nights = query.nights(),
            travelers = query.travelers(),
            error = %error,
            "Prediction failed"
        );
    }

    pub fn log_startup(&self, version: &str, model_kind: &str, fingerprint: &str) {
        info!(
            event = "service_started",
            instance = %self.instance,
            service_version = %version,
            model_kind = %model_kind,
            model_fingerprint = %fingerprint,
            "Travel cost predictor started"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "service_shutdown",
            instance = %self.instance,
            reason = %reason,
            "Travel cost predictor shutting down"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predictor_metrics() {
        let metrics = PredictorMetrics::new();
        let before = metrics.predictions();

        metrics.observe_prediction_latency(0.0001);
        metrics.inc_predictions();
        metrics.set_model_info("linear", "abc123");
        metrics.set_catalog_size(9);

        assert!(metrics.predictions() > before);
    }

    #[test]
    fn test_structured_logger_creation() {
        let logger = StructuredLogger::new("test-instance");
        assert_eq!(logger.instance, "test-instance");
    }
}

//! HTTP API for predictions, health checks and Prometheus metrics

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use predictor_lib::{
    catalog::DEFAULT_PREVIEW_ROWS,
    health::{components, ComponentStatus, HealthRegistry},
    observability::{PredictorMetrics, StructuredLogger},
    DatasetPreview, PredictionResult, PredictorError, Session,
};
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Shared application state
pub struct AppState {
    pub session: Session,
    pub health_registry: HealthRegistry,
    pub metrics: PredictorMetrics,
    pub logger: StructuredLogger,
    pub currency: String,
}

impl AppState {
    pub fn new(
        session: Session,
        health_registry: HealthRegistry,
        metrics: PredictorMetrics,
        logger: StructuredLogger,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            session,
            health_registry,
            metrics,
            logger,
            currency: currency.into(),
        }
    }
}

/// Request body for `POST /api/v1/predict`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    pub destination: String,
    pub nights: u32,
    pub travelers: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormattedAmount {
    pub label: String,
    pub value: String,
}

/// Response body for `POST /api/v1/predict`
#[derive(Debug, Clone, Serialize)]
pub struct PredictResponse {
    #[serde(flatten)]
    pub result: PredictionResult,
    pub total: f64,
    pub currency: String,
    pub formatted: Vec<FormattedAmount>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationsResponse {
    pub destinations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfoResponse {
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub fingerprint: String,
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct PreviewParams {
    pub rows: Option<usize>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Error surfaced to HTTP clients
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(format!("invalid query: {}", rejection.body_text()))
    }
}

impl From<PredictorError> for ApiError {
    fn from(err: PredictorError) -> Self {
        let status = match &err {
            PredictorError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            PredictorError::Prediction(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

/// Register the health components and set them from what the session loaded
pub async fn init_health(registry: &HealthRegistry, session: &Session) {
    registry.register(components::CATALOG).await;
    registry.register(components::MODEL).await;

    if session.catalog().is_empty() {
        registry
            .set_unhealthy(components::CATALOG, "No destinations to choose from")
            .await;
    }

    let artifact = session.artifact();
    if artifact.predictor().is_none() {
        registry
            .set_unhealthy(
                components::MODEL,
                format!("Model of kind `{}` cannot predict", artifact.kind()),
            )
            .await;
    }
}

async fn destinations(State(state): State<Arc<AppState>>) -> Json<DestinationsResponse> {
    Json(DestinationsResponse {
        destinations: state.session.catalog().as_slice().to_vec(),
    })
}

async fn predict(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let Json(request) = payload?;
    let query = state
        .session
        .query(&request.destination, request.nights, request.travelers)?;

    let start = Instant::now();
    let outcome = state.session.predict(&query);
    state
        .metrics
        .observe_prediction_latency(start.elapsed().as_secs_f64());

    match outcome {
        Ok(result) => {
            state.metrics.inc_predictions();
            state.health_registry.set_healthy(components::MODEL).await;
            state
                .logger
                .log_prediction(&query, &result, state.session.artifact().kind());

            Ok(Json(PredictResponse {
                total: result.total(),
                currency: state.currency.clone(),
                formatted: result
                    .display_lines(&state.currency)
                    .into_iter()
                    .map(|(label, value)| FormattedAmount {
                        label: label.to_string(),
                        value,
                    })
                    .collect(),
                result,
            }))
        }
        Err(err) => {
            state.metrics.inc_prediction_errors();
            if state.session.artifact().predictor().is_some() {
                state
                    .health_registry
                    .set_degraded(components::MODEL, err.to_string())
                    .await;
            }
            state.logger.log_prediction_failure(&query, &err.to_string());
            Err(err.into())
        }
    }
}

async fn dataset_preview(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PreviewParams>,
) -> Result<Json<DatasetPreview>, ApiError> {
    let dataset = state
        .session
        .dataset()
        .ok_or_else(|| ApiError::not_found("no dataset configured"))?;
    Ok(Json(
        dataset.preview(params.rows.unwrap_or(DEFAULT_PREVIEW_ROWS)),
    ))
}

async fn model_info(State(state): State<Arc<AppState>>) -> Json<ModelInfoResponse> {
    let artifact = state.session.artifact();
    Json(ModelInfoResponse {
        kind: artifact.kind().to_string(),
        label: artifact.label().map(str::to_string),
        fingerprint: artifact.fingerprint().to_string(),
        path: artifact.path().display().to_string(),
    })
}

/// Health check response - returns 200 if healthy, 503 if unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy => StatusCode::OK,
        ComponentStatus::Degraded => StatusCode::OK, // Still serving
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

/// Readiness check response - returns 200 if ready, 503 if not ready
async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!(error = %e, "Failed to encode metrics");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
        .into_response()
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/destinations", get(destinations))
        .route("/api/v1/predict", post(predict))
        .route("/api/v1/dataset/preview", get(dataset_preview))
        .route("/api/v1/model", get(model_info))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Start the API server, returning when `shutdown` resolves
pub async fn serve(
    addr: &str,
    state: Arc<AppState>,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let app = create_router(state);

    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}

//! Cost prediction command

use anyhow::Result;
use predictor_lib::{PredictionResult, PredictorError};
use serde::Serialize;
use std::process::ExitCode;

use super::Backend;
use crate::client::PredictRequest;
use crate::output::{print_error, print_prediction, OutputFormat};

#[derive(Serialize)]
struct PredictionOutput<'a> {
    destination: &'a str,
    nights: u32,
    travelers: u32,
    #[serde(flatten)]
    result: PredictionResult,
    total: f64,
    currency: &'a str,
}

/// Predict the cost of a trip.
///
/// A rejected query or failed prediction is reported and turned into a
/// failing exit code; only transport and I/O problems are returned as errors.
pub async fn predict(
    backend: &Backend,
    request: PredictRequest,
    format: OutputFormat,
) -> Result<ExitCode> {
    let outcome = match backend {
        Backend::Local { session, currency } => {
            local_predict(session, &request).map(|result| (result, currency.clone()))
        }
        Backend::Remote(client) => client
            .predict(&request)
            .await?
            .map(|remote| (remote.result, remote.currency)),
    };

    let (result, currency) = match outcome {
        Ok(prediction) => prediction,
        Err(message) => {
            print_error(&message);
            return Ok(ExitCode::FAILURE);
        }
    };

    match format {
        OutputFormat::Json => {
            let output = PredictionOutput {
                destination: &request.destination,
                nights: request.nights,
                travelers: request.travelers,
                result,
                total: result.total(),
                currency: &currency,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Table => print_prediction(&result, &currency),
    }

    Ok(ExitCode::SUCCESS)
}

fn local_predict(
    session: &predictor_lib::Session,
    request: &PredictRequest,
) -> std::result::Result<PredictionResult, String> {
    let query = session
        .query(&request.destination, request.nights, request.travelers)
        .map_err(|e| e.to_string())?;

    session.predict(&query).map_err(|e: PredictorError| {
        tracing::debug!(error = %e, "Local prediction failed");
        e.to_string()
    })
}

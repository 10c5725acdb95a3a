//! API client for talking to a running travel-server

use anyhow::{Context, Result};
use predictor_lib::{DatasetPreview, PredictionResult};
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use url::Url;

/// API client for the prediction service
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid API URL")?;

        Ok(Self { client, base_url })
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("API error ({}): {}", status, body);
        }

        response.json().await.context("Failed to parse response")
    }

    /// Request a prediction.
    ///
    /// The outer error is a transport or server failure; the inner one is a
    /// rejected query or failed prediction reported by the service.
    pub async fn predict(
        &self,
        request: &PredictRequest,
    ) -> Result<std::result::Result<RemotePrediction, String>> {
        let url = self
            .base_url
            .join("api/v1/predict")
            .context("Invalid path")?;

        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNPROCESSABLE_ENTITY {
            let body: ErrorBody = response.json().await.context("Failed to parse error")?;
            return Ok(Err(body.error));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("API error ({}): {}", status, body);
        }

        let body: PredictBody = response.json().await.context("Failed to parse response")?;
        body.into_prediction().map(Ok)
    }

    pub async fn destinations(&self) -> Result<Vec<String>> {
        let body: DestinationsBody = self.get("api/v1/destinations").await?;
        Ok(body.destinations)
    }

    pub async fn dataset_preview(&self, rows: usize) -> Result<DatasetPreview> {
        self.get(&format!("api/v1/dataset/preview?rows={}", rows))
            .await
    }

    pub async fn model_info(&self) -> Result<ModelInfo> {
        self.get("api/v1/model").await
    }
}

// API request and response types

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    pub destination: String,
    pub nights: u32,
    pub travelers: u32,
}

/// Prediction as returned by the service
#[derive(Debug, Clone)]
pub struct RemotePrediction {
    pub result: PredictionResult,
    pub currency: String,
}

#[derive(Debug, Clone, Deserialize)]
struct PredictBody {
    kind: String,
    total: f64,
    accommodation: Option<f64>,
    transport: Option<f64>,
    currency: String,
}

impl PredictBody {
    fn into_prediction(self) -> Result<RemotePrediction> {
        let result = match (self.kind.as_str(), self.accommodation, self.transport) {
            ("breakdown", Some(accommodation), Some(transport)) => PredictionResult::Breakdown {
                accommodation,
                transport,
            },
            ("total", _, _) => PredictionResult::Total { amount: self.total },
            (kind, _, _) => anyhow::bail!("Unexpected prediction kind `{}`", kind),
        };
        Ok(RemotePrediction {
            result,
            currency: self.currency,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Clone, Deserialize)]
struct DestinationsBody {
    destinations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub kind: String,
    #[serde(default)]
    pub label: Option<String>,
    pub fingerprint: String,
    pub path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> PredictRequest {
        PredictRequest {
            destination: "Bali".to_string(),
            nights: 5,
            travelers: 2,
        }
    }

    #[tokio::test]
    async fn test_predict_breakdown() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/predict")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"kind":"breakdown","accommodation":1000.0,"transport":400.0,"total":1400.0,"currency":"RM","formatted":[]}"#,
            )
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let prediction = client.predict(&request()).await.unwrap().unwrap();

        mock.assert_async().await;
        assert_eq!(
            prediction.result,
            PredictionResult::Breakdown {
                accommodation: 1000.0,
                transport: 400.0
            }
        );
        assert_eq!(prediction.currency, "RM");
    }

    #[tokio::test]
    async fn test_predict_failure_is_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/v1/predict")
            .with_status(422)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":"error making prediction: unknown category `Bali`"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let outcome = client.predict(&request()).await.unwrap();
        assert!(outcome.unwrap_err().contains("unknown category"));
    }

    #[tokio::test]
    async fn test_server_error_propagates() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v1/destinations")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let err = client.destinations().await.unwrap_err();
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_destinations() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v1/destinations")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"destinations":["Bali","Tokyo"]}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        assert_eq!(client.destinations().await.unwrap(), vec!["Bali", "Tokyo"]);
    }

    #[test]
    fn test_invalid_url() {
        assert!(ApiClient::new("not a url").is_err());
    }
}

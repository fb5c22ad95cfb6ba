//! `DataSource` backed by the PathoShield HTTP API.
//!
//! One request per call, no retries. Every response body is checked by
//! `ResponseValidator` before it is decoded.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use pathoshield_config::ConsoleConfig;
use pathoshield_contracts::{
    endpoint::Endpoint,
    error::{AmrError, AmrResult},
    health::HealthStatus,
    prediction::{PredictionRequest, PredictionResult},
    prescription::{Prescription, PrescriptionDraft},
    surveillance::{OrganismShare, RegionRecord, TrendPoint},
};
use pathoshield_core::traits::DataSource;
use pathoshield_verify::ResponseValidator;

/// Correlation header attached to every request.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

pub struct HttpDataSource {
    client: reqwest::Client,
    base_url: String,
    validator: ResponseValidator,
}

impl HttpDataSource {
    pub fn new(
        base_url: impl Into<String>,
        request_timeout: Duration,
        connect_timeout: Duration,
    ) -> AmrResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| AmrError::ConfigError {
                reason: format!("failed to build HTTP client: {}", e),
            })?;

        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        Ok(Self {
            client,
            base_url,
            validator: ResponseValidator::new()?,
        })
    }

    pub fn from_config(config: &ConsoleConfig) -> AmrResult<Self> {
        Self::new(
            config.base_url(),
            config.api.request_timeout(),
            config.api.connect_timeout(),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    /// Send `request` and return the raw body of a 2xx response.
    async fn send(&self, endpoint: Endpoint, request: reqwest::RequestBuilder) -> AmrResult<String> {
        let request_id = Uuid::new_v4();
        debug!(%endpoint, %request_id, "sending request");
        let response = request
            .header(REQUEST_ID_HEADER, request_id.to_string())
            .send()
            .await
            .map_err(|e| {
                warn!(%endpoint, %request_id, error = %e, "request failed before a response");
                AmrError::Network {
                    reason: e.to_string(),
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| AmrError::Network {
            reason: e.to_string(),
        })?;

        if !status.is_success() {
            let detail = error_detail(status.as_u16(), &body);
            warn!(%endpoint, %request_id, status = status.as_u16(), detail = %detail, "backend returned an error");
            return Err(AmrError::Http {
                status: status.as_u16(),
                detail,
            });
        }

        Ok(body)
    }

    /// Send `request` and return the JSON body of a 2xx response.
    async fn exchange(&self, endpoint: Endpoint, request: reqwest::RequestBuilder) -> AmrResult<Value> {
        let body = self.send(endpoint, request).await?;
        serde_json::from_str(&body).map_err(|e| AmrError::MalformedPayload {
            endpoint: endpoint.to_string(),
            reason: format!("body is not JSON: {}", e),
        })
    }

    async fn get(&self, endpoint: Endpoint) -> AmrResult<Value> {
        self.exchange(endpoint, self.client.get(self.url(endpoint))).await
    }

    /// Collections answer `Ok` for any 2xx response. A body that is not JSON
    /// counts as an absent collection.
    async fn collection<T: serde::de::DeserializeOwned>(&self, endpoint: Endpoint) -> AmrResult<Vec<T>> {
        let raw = self.send(endpoint, self.client.get(self.url(endpoint))).await?;
        let items: Vec<T> = match serde_json::from_str::<Value>(&raw) {
            Ok(body) => self.validator.decode_collection(endpoint, body),
            Err(e) => {
                warn!(%endpoint, error = %e, "collection body is not JSON; using empty list");
                Vec::new()
            }
        };
        info!(%endpoint, count = items.len(), "collection received");
        Ok(items)
    }
}

/// The message shown for a non-2xx response: the `detail` field when the
/// body carries one, otherwise a generic status line.
pub fn error_detail(status: u16, body: &str) -> String {
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("detail").cloned());
    match detail {
        Some(Value::String(s)) if !s.is_empty() => s,
        Some(Value::Null) | None => format!("HTTP error! status: {status}"),
        Some(other) => other.to_string(),
    }
}

#[async_trait]
impl DataSource for HttpDataSource {
    fn label(&self) -> &str {
        "live"
    }

    async fn health(&self) -> AmrResult<HealthStatus> {
        let body = self.get(Endpoint::Health).await?;
        self.validator.decode_object(Endpoint::Health, body)
    }

    async fn run_prediction(&self, request: &PredictionRequest) -> AmrResult<PredictionResult> {
        let endpoint = Endpoint::RunPrediction;
        let file = Part::bytes(request.sample.bytes.clone()).file_name(request.sample.file_name.clone());
        let form = request
            .form_fields()
            .into_iter()
            .fold(Form::new().part("file", file), |form, (name, value)| form.text(name, value));

        let body = self
            .exchange(endpoint, self.client.post(self.url(endpoint)).multipart(form))
            .await?;
        let result: PredictionResult = self.validator.decode_object(endpoint, body)?;

        info!(
            patient_id = %result.patient_id,
            species = %result.bacterial_species,
            "prediction received"
        );
        Ok(result)
    }

    async fn create_prescription(&self, draft: &PrescriptionDraft) -> AmrResult<Prescription> {
        let endpoint = Endpoint::CreatePrescription;
        let body = self
            .exchange(endpoint, self.client.post(self.url(endpoint)).json(draft))
            .await?;
        let prescription: Prescription = self.validator.decode_object(endpoint, body)?;
        info!(prescription_id = %prescription.prescription_id, "prescription received");
        Ok(prescription)
    }

    async fn regions(&self) -> AmrResult<Vec<RegionRecord>> {
        self.collection(Endpoint::Regions).await
    }

    async fn trends(&self) -> AmrResult<Vec<TrendPoint>> {
        self.collection(Endpoint::Trends).await
    }

    async fn organism_distribution(&self) -> AmrResult<Vec<OrganismShare>> {
        self.collection(Endpoint::Organisms).await
    }
}

//! HTTP client for the FHIR pseudonymizer `$de-identify` operation.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::{debug, error};

use super::error::TransformError;
use super::retry::RetryPolicy;
use super::traits::TransformClient;
use crate::config::{BasicAuth, TransformConfig};

const DE_IDENTIFY_PATH: &str = "/$de-identify";
const FHIR_JSON: &str = "application/fhir+json";

/// Transform client backed by the FHIR pseudonymizer service
pub struct PseudonymizerClient {
    http: Client,
    endpoint: String,
    auth: Option<BasicAuth>,
    retry: RetryPolicy,
}

impl PseudonymizerClient {
    /// Build a client from configuration
    pub fn new(config: &TransformConfig) -> Result<Self, TransformError> {
        Self::with_retry(config, RetryPolicy::from(&config.retry))
    }

    /// Build a client with an explicit retry policy
    pub fn with_retry(config: &TransformConfig, retry: RetryPolicy) -> Result<Self, TransformError> {
        let mut builder = Client::builder();
        if let Some(timeout) = retry.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| TransformError::Client(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: format!("{}{}", config.url.trim_end_matches('/'), DE_IDENTIFY_PATH),
            auth: config.auth.as_ref().and_then(|auth| auth.basic.clone()),
            retry,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post_once(&self, body: &Value) -> Result<Vec<u8>, TransformError> {
        let mut request = self
            .http
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, FHIR_JSON)
            .body(body.to_string());
        if let Some(auth) = &self.auth {
            request = request.basic_auth(&auth.username, Some(&auth.password));
        }

        let response = request.send().await.map_err(|e| {
            error!(error = %e, "Failed to send request to the FHIR pseudonymizer");
            TransformError::from(e)
        })?;

        let status = response.status();
        let bytes = response.bytes().await?;

        if status.is_success() {
            debug!(status = status.as_u16(), "FHIR pseudonymizer response");
            Ok(bytes.to_vec())
        } else {
            let body = String::from_utf8_lossy(&bytes).into_owned();
            error!(status = status.as_u16(), body = %body, "FHIR pseudonymizer request returned no success");
            Err(TransformError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}

/// FHIR `Parameters` resource wrapping the payload and its domain prefix
pub fn de_identify_parameters(
    payload: &[u8],
    domain_prefix: &str,
) -> Result<Value, TransformError> {
    let resource: Value = serde_json::from_slice(payload).map_err(|e| {
        error!(error = %e, "Failed to parse FHIR JSON payload");
        TransformError::InvalidPayload(e)
    })?;

    Ok(json!({
        "resourceType": "Parameters",
        "parameter": [
            {
                "name": "settings",
                "part": [
                    { "name": "domain-prefix", "valueString": domain_prefix }
                ]
            },
            {
                "name": "resource",
                "resource": resource
            }
        ]
    }))
}

#[async_trait]
impl TransformClient for PseudonymizerClient {
    async fn send(&self, payload: &[u8], routing_label: &str) -> Result<Vec<u8>, TransformError> {
        let body = de_identify_parameters(payload, routing_label)?;
        let body = &body;
        self.retry.run(move || self.post_once(body)).await
    }
}

use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::Serialize;
use tracing::{debug, warn};

use crate::client::{HttpClient, JsonResponse, RequestError};
use crate::config::ClientConfig;
use crate::health::{HealthCheck, HealthReport};
use crate::result::ValidationResult;

pub const HEALTH_PATH: &str = "/api/health";
pub const VALIDATE_PATH: &str = "/api/validate";

/// Timeout for the unauthenticated health check.
pub const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidateRequest<'a> {
    api_key: &'a str,
    client_secret: &'a str,
}

/// Client for a Vince API-key validation service.
///
/// `POST /api/validate` authenticates with `Authorization: Bearer <client id>`
/// and sends the application's client secret in the body. `GET /api/health`
/// needs no credentials.
#[derive(Debug, Clone)]
pub struct VinceClient {
    http: HttpClient,
    config: ClientConfig,
}

impl VinceClient {
    pub fn new(config: ClientConfig) -> Result<Self, RequestError> {
        Ok(Self {
            http: HttpClient::new(&config)?,
            config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// `true` iff `GET /api/health` answers exactly `200 OK`.
    pub async fn test_connection(&self) -> bool {
        match self.is_healthy().await {
            Ok(healthy) => healthy,
            Err(e) => {
                debug!(error = %e, "health check failed");
                false
            }
        }
    }

    /// Validate `api_key`. Request failures are folded into the result.
    pub async fn validate_key(&self, api_key: &str) -> ValidationResult {
        let url = self.config.endpoint(VALIDATE_PATH);
        let payload = ValidateRequest {
            api_key,
            client_secret: self.config.client_secret(),
        };

        match self.http.execute(Method::POST, &url, Some(&payload)).await {
            Ok(JsonResponse { status, body }) => {
                let result = if status.is_success() {
                    ValidationResult::from_response(body)
                } else {
                    let reason = status.canonical_reason().unwrap_or("Unknown");
                    ValidationResult::from_error_response(status.as_u16(), reason, body)
                };
                let result = result.with_parsed_metadata();
                debug!(valid = result.is_valid(), "key validation finished");
                result
            }
            Err(e) => {
                warn!(code = %e.code(), error = %e, "key validation request failed");
                ValidationResult::request_error(&e)
            }
        }
    }

    /// Fetch and decode the health report.
    ///
    /// An error status still yields `Ok` when its body is a health report,
    /// since the service describes its own failure there.
    pub async fn health_report(&self) -> Result<HealthReport, RequestError> {
        let url = self.config.endpoint(HEALTH_PATH);
        let resp = self.http.get_public(&url, HEALTH_TIMEOUT).await?;
        let status = resp.status();
        let body = resp.bytes().await.map_err(RequestError::transport)?;

        match serde_json::from_slice::<HealthReport>(&body) {
            Ok(report) => Ok(report),
            Err(_) if !status.is_success() => Err(RequestError::from_status(status)),
            Err(e) => Err(RequestError::InvalidJson(e.to_string())),
        }
    }
}

impl HealthCheck for VinceClient {
    async fn is_healthy(&self) -> Result<bool, RequestError> {
        let url = self.config.endpoint(HEALTH_PATH);
        let status = self.http.status(&url, HEALTH_TIMEOUT).await?;
        Ok(status == StatusCode::OK)
    }
}

/// Check reachability using configuration from the environment.
///
/// Missing configuration is reported as `false`, like any other failure.
pub async fn test_connection() -> bool {
    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            debug!(error = %e, "health check skipped");
            return false;
        }
    };
    match VinceClient::new(config) {
        Ok(client) => client.test_connection().await,
        Err(e) => {
            debug!(error = %e, "health check skipped");
            false
        }
    }
}

/// Validate `api_key` using configuration from the environment.
///
/// Unlike [`test_connection`], missing configuration is surfaced as a
/// `CONFIGURATION_ERROR` result.
pub async fn validate_key(api_key: &str) -> ValidationResult {
    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            warn!(error = %e, "cannot validate key");
            return ValidationResult::configuration_error(&e);
        }
    };
    match VinceClient::new(config) {
        Ok(client) => client.validate_key(api_key).await,
        Err(e) => ValidationResult::request_error(&e),
    }
}

use serde::Deserialize;

use crate::client::RequestError;

/// Reachability check for the Vince service.
pub trait HealthCheck: Send + Sync {
    /// Returns `Ok(true)` if the service answered `200 OK`, `Ok(false)` if it
    /// answered with any other status, or `Err` on connection failure.
    fn is_healthy(&self) -> impl std::future::Future<Output = Result<bool, RequestError>> + Send;
}

/// Body of `GET /api/health`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub environment: Option<String>,
    #[serde(default)]
    pub database: Option<DatabaseStatus>,
    #[serde(default)]
    pub configuration: Option<ConfigurationStatus>,
    /// Only present when the service reports itself unhealthy.
    #[serde(default)]
    pub error: Option<String>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DatabaseStatus {
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub connected: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationStatus {
    #[serde(default)]
    pub jwt_configured: bool,
    #[serde(default)]
    pub admin_configured: bool,
    #[serde(default)]
    pub service_key_configured: bool,
}

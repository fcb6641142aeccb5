use reqwest::header::HeaderValue;
use url::Url;

pub const CLIENT_ID_VAR: &str = "VINCE_CLIENT_ID";
pub const CLIENT_SECRET_VAR: &str = "VINCE_CLIENT_SECRET";
pub const BASE_URL_VAR: &str = "VINCE_BASE_URL";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Required environment variable {0} is not set")]
    MissingVar(&'static str),
    #[error("{var} is not a valid http(s) URL: {reason}")]
    InvalidBaseUrl { var: &'static str, reason: String },
    #[error("{0} contains characters that cannot be sent in an HTTP header")]
    InvalidHeaderValue(&'static str),
}

/// Connection credentials for a Vince service instance.
///
/// Built once by the caller (usually via [`ClientConfig::from_env`]) and
/// handed to [`crate::VinceClient`]. The base URL never ends in `/`.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    client_id: String,
    client_secret: String,
    base_url: String,
}

impl ClientConfig {
    /// Build a configuration from explicit values.
    ///
    /// Values are checked in the order client id, client secret, base URL;
    /// the first empty one is reported by its environment variable name.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let client_id = required(CLIENT_ID_VAR, Some(client_id.into()))?;
        let client_secret = required(CLIENT_SECRET_VAR, Some(client_secret.into()))?;
        let base_url = required(BASE_URL_VAR, Some(base_url.into()))?;
        Self::checked(client_id, client_secret, base_url)
    }

    /// Read `VINCE_CLIENT_ID`, `VINCE_CLIENT_SECRET` and `VINCE_BASE_URL`
    /// from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`ClientConfig::from_env`] but against an arbitrary lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let client_id = required(CLIENT_ID_VAR, lookup(CLIENT_ID_VAR))?;
        let client_secret = required(CLIENT_SECRET_VAR, lookup(CLIENT_SECRET_VAR))?;
        let base_url = required(BASE_URL_VAR, lookup(BASE_URL_VAR))?;
        Self::checked(client_id, client_secret, base_url)
    }

    fn checked(
        client_id: String,
        client_secret: String,
        base_url: String,
    ) -> Result<Self, ConfigError> {
        if HeaderValue::from_str(&format!("Bearer {client_id}")).is_err() {
            return Err(ConfigError::InvalidHeaderValue(CLIENT_ID_VAR));
        }

        let base_url = base_url.trim_end_matches('/').to_string();
        let parsed = Url::parse(&base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            var: BASE_URL_VAR,
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBaseUrl {
                var: BASE_URL_VAR,
                reason: format!("unsupported scheme `{}`", parsed.scheme()),
            });
        }

        Ok(Self {
            client_id,
            client_secret,
            base_url,
        })
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    /// Base URL with trailing slashes stripped.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base_url}{path}`; `path` is expected to start with `/`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn required(var: &'static str, value: Option<String>) -> Result<String, ConfigError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ConfigError::MissingVar(var)),
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("client_id", &"<redacted>")
            .field("client_secret", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn from_lookup_reads_all_three_vars() {
        let config = ClientConfig::from_lookup(lookup(&[
            (CLIENT_ID_VAR, "svc-key"),
            (CLIENT_SECRET_VAR, "app-secret"),
            (BASE_URL_VAR, "http://localhost:3000"),
        ]))
        .unwrap();
        assert_eq!(config.client_id(), "svc-key");
        assert_eq!(config.client_secret(), "app-secret");
        assert_eq!(config.base_url(), "http://localhost:3000");
    }

    #[test]
    fn trailing_slashes_are_stripped() {
        let config = ClientConfig::new("id", "secret", "http://localhost:3000///").unwrap();
        assert_eq!(config.base_url(), "http://localhost:3000");
        assert_eq!(
            config.endpoint("/api/validate"),
            "http://localhost:3000/api/validate"
        );
    }

    #[test]
    fn base_path_prefix_is_kept() {
        let config = ClientConfig::new("id", "secret", "https://example.com/vince/").unwrap();
        assert_eq!(
            config.endpoint("/api/health"),
            "https://example.com/vince/api/health"
        );
    }

    #[test]
    fn first_missing_var_is_reported() {
        let err = ClientConfig::from_lookup(lookup(&[])).unwrap_err();
        assert_eq!(err, ConfigError::MissingVar(CLIENT_ID_VAR));
        assert_eq!(
            err.to_string(),
            "Required environment variable VINCE_CLIENT_ID is not set"
        );

        let err = ClientConfig::from_lookup(lookup(&[
            (CLIENT_ID_VAR, "id"),
            (BASE_URL_VAR, "http://localhost"),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::MissingVar(CLIENT_SECRET_VAR));
    }

    #[test]
    fn empty_value_counts_as_missing() {
        let err = ClientConfig::from_lookup(lookup(&[
            (CLIENT_ID_VAR, "id"),
            (CLIENT_SECRET_VAR, "secret"),
            (BASE_URL_VAR, ""),
        ]))
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Required environment variable VINCE_BASE_URL is not set"
        );
    }

    #[test]
    fn rejects_non_http_base_url() {
        let err = ClientConfig::new("id", "secret", "ftp://example.com").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }), "{err}");

        let err = ClientConfig::new("id", "secret", "not a url").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }), "{err}");
    }

    #[test]
    fn rejects_client_id_with_control_characters() {
        let err = ClientConfig::new("bad\nid", "secret", "http://localhost").unwrap_err();
        assert_eq!(err, ConfigError::InvalidHeaderValue(CLIENT_ID_VAR));
    }

    #[test]
    fn debug_redacts_credentials() {
        let config = ClientConfig::new("svc-key", "app-secret", "http://localhost:3000").unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("svc-key"), "{debug}");
        assert!(!debug.contains("app-secret"), "{debug}");
        assert!(debug.contains("http://localhost:3000"), "{debug}");
    }
}

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::config::ClientConfig;
use crate::result::ErrorCode;

pub const CLIENT_USER_AGENT: &str = concat!("vince-rust-client/", env!("CARGO_PKG_VERSION"));

/// Timeout for authenticated calls.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Request-level failure, already shaped for a [`crate::ValidationResult`].
///
/// `Display` yields the normalized `error` message and [`RequestError::code`]
/// the matching code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("HTTP {status}: {reason}")]
    Http { status: u16, reason: String },
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Invalid JSON response: {0}")]
    InvalidJson(String),
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl RequestError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Http { status, .. } => ErrorCode::Http(*status),
            Self::Connection(_) => ErrorCode::ConnectionError,
            Self::InvalidJson(_) => ErrorCode::JsonDecodeError,
            Self::Unexpected(_) => ErrorCode::UnexpectedError,
        }
    }

    pub(crate) fn from_status(status: StatusCode) -> Self {
        Self::Http {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        }
    }

    pub(crate) fn transport(err: reqwest::Error) -> Self {
        if err.is_builder() {
            Self::Unexpected(describe(&err))
        } else {
            Self::Connection(describe(&err))
        }
    }
}

/// Render an error together with its source chain, e.g.
/// `error sending request: client error (Connect): Connection refused`.
fn describe(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !out.contains(&text) {
            out.push_str(": ");
            out.push_str(&text);
        }
        source = cause.source();
    }
    out
}

/// Parsed JSON body together with the status it arrived with.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// HTTP executor for the Vince service.
///
/// Wraps [`reqwest::Client`] with the bearer credential. Every request
/// resolves to a parsed JSON value or a [`RequestError`]; nothing panics and
/// nothing is retried.
#[derive(Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    authorization: HeaderValue,
}

impl HttpClient {
    /// Create an executor that authenticates as `config.client_id()`.
    pub fn new(config: &ClientConfig) -> Result<Self, RequestError> {
        let mut authorization = HeaderValue::from_str(&format!("Bearer {}", config.client_id()))
            .map_err(|e| RequestError::Unexpected(e.to_string()))?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));

        let inner = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| RequestError::Unexpected(describe(&e)))?;

        Ok(Self {
            inner,
            authorization,
        })
    }

    /// Authenticated GET without a body.
    pub async fn get(&self, url: &str) -> Result<Value, RequestError> {
        self.send::<Value>(Method::GET, url, None).await
    }

    /// Authenticated POST with a JSON body.
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<Value, RequestError> {
        self.send(Method::POST, url, Some(body)).await
    }

    /// Send an authenticated request and parse the JSON response.
    ///
    /// Error statuses whose body is JSON are returned as `Ok` so the
    /// service's own `error`/`code` reach the caller verbatim.
    pub async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        payload: Option<&B>,
    ) -> Result<Value, RequestError> {
        let resp = self.execute(method, url, payload).await?;
        Ok(resp.body)
    }

    /// Like [`HttpClient::send`], keeping the response status.
    pub async fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        payload: Option<&B>,
    ) -> Result<JsonResponse, RequestError> {
        let url = parse_url(url)?;
        let mut req = self
            .inner
            .request(method.clone(), url.clone())
            .timeout(REQUEST_TIMEOUT)
            .header(AUTHORIZATION, self.authorization.clone())
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(payload) = payload {
            let body =
                serde_json::to_vec(payload).map_err(|e| RequestError::Unexpected(e.to_string()))?;
            req = req.body(body);
        }

        let resp = req.send().await.map_err(RequestError::transport)?;
        let status = resp.status();
        let body = resp.bytes().await.map_err(RequestError::transport)?;
        debug!(%method, %url, status = status.as_u16(), bytes = body.len(), "vince response");

        let body = if status.is_success() {
            decode_success(&body)?
        } else {
            decode_error(status, &body)?
        };
        Ok(JsonResponse { status, body })
    }

    /// Unauthenticated GET returning only the status code.
    pub async fn status(&self, url: &str, timeout: Duration) -> Result<StatusCode, RequestError> {
        let resp = self.get_public(url, timeout).await?;
        Ok(resp.status())
    }

    /// Unauthenticated GET returning the raw response.
    pub(crate) async fn get_public(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<reqwest::Response, RequestError> {
        let url = parse_url(url)?;
        let resp = self
            .inner
            .get(url.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(RequestError::transport)?;
        debug!(%url, status = resp.status().as_u16(), "vince public response");
        Ok(resp)
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("user_agent", &CLIENT_USER_AGENT)
            .finish()
    }
}

fn parse_url(url: &str) -> Result<Url, RequestError> {
    Url::parse(url).map_err(|e| RequestError::Unexpected(format!("invalid URL `{url}`: {e}")))
}

fn decode_success(body: &[u8]) -> Result<Value, RequestError> {
    let text = std::str::from_utf8(body)
        .map_err(|e| RequestError::Unexpected(format!("response body is not UTF-8: {e}")))?;
    serde_json::from_str(text).map_err(|e| RequestError::InvalidJson(e.to_string()))
}

fn decode_error(status: StatusCode, body: &[u8]) -> Result<Value, RequestError> {
    std::str::from_utf8(body)
        .ok()
        .and_then(|text| serde_json::from_str(text).ok())
        .ok_or_else(|| RequestError::from_status(status))
}

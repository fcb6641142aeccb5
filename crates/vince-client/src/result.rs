use std::borrow::Cow;
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::client::RequestError;
use crate::config::ConfigError;

const MISSING_ERROR_MESSAGE: &str = "Unexpected error: response did not include an error message";

/// Error code carried by an invalid [`ValidationResult`].
///
/// Client-side failures use the first five variants. The service reports
/// its own codes, which are passed through; unknown ones land in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigurationError,
    Http(u16),
    ConnectionError,
    JsonDecodeError,
    UnexpectedError,
    Unauthorized,
    InvalidApiKey,
    InvalidServiceKey,
    ApplicationNotFound,
    KeyNotFound,
    ValidationError,
    InternalError,
    Other(String),
}

impl ErrorCode {
    pub fn as_str(&self) -> Cow<'_, str> {
        let s = match self {
            Self::ConfigurationError => "CONFIGURATION_ERROR",
            Self::Http(status) => return Cow::Owned(format!("HTTP_{status}")),
            Self::ConnectionError => "CONNECTION_ERROR",
            Self::JsonDecodeError => "JSON_DECODE_ERROR",
            Self::UnexpectedError => "UNEXPECTED_ERROR",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::InvalidApiKey => "INVALID_API_KEY",
            Self::InvalidServiceKey => "INVALID_SERVICE_KEY",
            Self::ApplicationNotFound => "APPLICATION_NOT_FOUND",
            Self::KeyNotFound => "KEY_NOT_FOUND",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
            Self::Other(code) => code.as_str(),
        };
        Cow::Borrowed(s)
    }
}

impl From<&str> for ErrorCode {
    fn from(code: &str) -> Self {
        match code {
            "CONFIGURATION_ERROR" => Self::ConfigurationError,
            "CONNECTION_ERROR" => Self::ConnectionError,
            "JSON_DECODE_ERROR" => Self::JsonDecodeError,
            "UNEXPECTED_ERROR" => Self::UnexpectedError,
            "UNAUTHORIZED" => Self::Unauthorized,
            "INVALID_API_KEY" => Self::InvalidApiKey,
            "INVALID_SERVICE_KEY" => Self::InvalidServiceKey,
            "APPLICATION_NOT_FOUND" => Self::ApplicationNotFound,
            "KEY_NOT_FOUND" => Self::KeyNotFound,
            "VALIDATION_ERROR" => Self::ValidationError,
            "INTERNAL_ERROR" => Self::InternalError,
            other => match other.strip_prefix("HTTP_").and_then(|s| s.parse().ok()) {
                Some(status) => Self::Http(status),
                None => Self::Other(other.to_string()),
            },
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_str())
    }
}

impl<'de> Deserialize<'de> for ErrorCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Ok(Self::from(code.as_str()))
    }
}

/// The `data` object of a successful validation.
///
/// Fields the service left out stay `None`. A field of an unexpected type
/// is kept in `extra` under its own name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,
    /// Structured when the service sent a JSON-encoded string, otherwise
    /// whatever the service sent (usually a plain string or `null`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl KeyData {
    fn from_map(mut map: Map<String, Value>) -> Self {
        Self {
            application_name: take_string(&mut map, "applicationName"),
            key_id: take_string(&mut map, "keyId"),
            metadata: map.remove("metadata"),
            extra: map,
        }
    }
}

/// Payload of a successful validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidKey {
    /// `None` when the body had no `data` object.
    pub data: Option<KeyData>,
    /// Top-level fields besides `valid` and `data`, passed through untouched.
    pub extra: Map<String, Value>,
}

/// Payload of a failed validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationFailure {
    pub error: String,
    pub code: ErrorCode,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Outcome of a key validation call.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    Valid(ValidKey),
    Invalid(ValidationFailure),
}

impl ValidationResult {
    pub fn failure(error: impl Into<String>, code: ErrorCode) -> Self {
        Self::Invalid(ValidationFailure {
            error: error.into(),
            code,
            extra: Map::new(),
        })
    }

    pub fn configuration_error(err: &ConfigError) -> Self {
        Self::failure(err.to_string(), ErrorCode::ConfigurationError)
    }

    pub fn request_error(err: &RequestError) -> Self {
        Self::failure(err.to_string(), err.code())
    }

    /// Normalize a JSON body returned with a success status.
    ///
    /// Only a boolean `valid: true` makes the result valid. Anything else is
    /// treated as a failure whose `error` and `code` come from the body.
    pub fn from_response(body: Value) -> Self {
        Self::normalize(body, None)
    }

    /// Normalize a JSON body returned with an error status.
    ///
    /// A missing `error` or `code` falls back to the `HTTP_<status>` pair.
    pub fn from_error_response(status: u16, reason: &str, body: Value) -> Self {
        let fallback = RequestError::Http {
            status,
            reason: reason.to_string(),
        };
        Self::normalize(body, Some(&fallback))
    }

    fn normalize(body: Value, fallback: Option<&RequestError>) -> Self {
        let mut map = match body {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        if map.get("valid") == Some(&Value::Bool(true)) {
            map.remove("valid");
            let data = match map.remove("data") {
                Some(Value::Object(data)) => Some(KeyData::from_map(data)),
                Some(other) => {
                    map.insert("data".to_string(), other);
                    None
                }
                None => None,
            };
            return Self::Valid(ValidKey { data, extra: map });
        }

        map.remove("valid");
        let error = match take_text(&mut map, "error") {
            Some(error) => error,
            None => fallback.map_or_else(|| MISSING_ERROR_MESSAGE.to_string(), ToString::to_string),
        };
        let code = match take_text(&mut map, "code") {
            Some(code) => ErrorCode::from(code.as_str()),
            None => fallback.map_or(ErrorCode::UnexpectedError, RequestError::code),
        };
        Self::Invalid(ValidationFailure {
            error,
            code,
            extra: map,
        })
    }

    /// Replace a JSON-encoded metadata string with its parsed value.
    pub fn with_parsed_metadata(mut self) -> Self {
        if let Some(data) = self.data_mut() {
            data.metadata = data.metadata.take().map(parse_metadata);
        }
        self
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    pub fn data(&self) -> Option<&KeyData> {
        match self {
            Self::Valid(key) => key.data.as_ref(),
            Self::Invalid(_) => None,
        }
    }

    fn data_mut(&mut self) -> Option<&mut KeyData> {
        match self {
            Self::Valid(key) => key.data.as_mut(),
            Self::Invalid(_) => None,
        }
    }

    pub fn failure_details(&self) -> Option<&ValidationFailure> {
        match self {
            Self::Valid(_) => None,
            Self::Invalid(failure) => Some(failure),
        }
    }

    pub fn code(&self) -> Option<&ErrorCode> {
        self.failure_details().map(|f| &f.code)
    }
}

impl Serialize for ValidationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Valid(key) => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("valid", &true)?;
                if let Some(data) = &key.data {
                    map.serialize_entry("data", data)?;
                }
                for (name, value) in &key.extra {
                    map.serialize_entry(name, value)?;
                }
                map.end()
            }
            Self::Invalid(failure) => {
                let mut map = serializer.serialize_map(Some(3 + failure.extra.len()))?;
                map.serialize_entry("valid", &false)?;
                map.serialize_entry("error", &failure.error)?;
                map.serialize_entry("code", &failure.code)?;
                for (name, value) in &failure.extra {
                    map.serialize_entry(name, value)?;
                }
                map.end()
            }
        }
    }
}

/// Parse `metadata` as JSON when it is a non-empty string; otherwise, or
/// when parsing fails, return it unchanged.
pub fn parse_metadata(metadata: Value) -> Value {
    match metadata {
        Value::String(raw) if !raw.is_empty() => {
            serde_json::from_str(&raw).unwrap_or(Value::String(raw))
        }
        other => other,
    }
}

/// Remove `key` if it holds a string. Any other value stays in `map`.
fn take_string(map: &mut Map<String, Value>, key: &str) -> Option<String> {
    match map.remove(key)? {
        Value::String(s) => Some(s),
        other => {
            map.insert(key.to_string(), other);
            None
        }
    }
}

/// Remove `key`, rendering a non-string value as JSON text.
fn take_text(map: &mut Map<String, Value>, key: &str) -> Option<String> {
    match map.remove(key)? {
        Value::String(s) => Some(s),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

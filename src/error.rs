// src/error.rs
use serde_json::Value;
use thiserror::Error;

/// A caller-fixable problem with filter input, raised at construction time.
///
/// Never produced by the network path: anything that fails validation is
/// rejected before a request is built.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("invalid {field}: {constraint}")]
pub struct ValidationError {
    pub field: String,
    pub constraint: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, constraint: impl Into<String>) -> Self {
        ValidationError {
            field: field.into(),
            constraint: constraint.into(),
        }
    }
}

/// The service answered successfully but the payload does not match the
/// expected GeoJSON or count schema.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("JSON processing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("feature {index} is missing required field '{field}'")]
    MissingField { index: usize, field: &'static str },

    #[error("feature {index} has an invalid '{field}': {reason}")]
    InvalidField {
        index: usize,
        field: &'static str,
        reason: String,
    },

    #[error("count response has no integer 'count' field")]
    MissingCount,

    #[error("Unexpected response: {0}")]
    UnexpectedShape(String),
}

#[derive(Error, Debug)]
pub enum QuakeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Catalog service error (HTTP {status}): {message}")]
    ServiceError { status: u16, message: String },

    #[error("Malformed response: {0}")]
    Parse(#[from] ParseError),

    #[error("HTTP request failed: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("URL parsing failed: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Internal consistency failure: {0}")]
    InternalConsistency(String),
}

const MESSAGE_SNIPPET_LEN: usize = 200;

impl QuakeError {
    /// Builds a `ServiceError` from an HTTP status code and the raw response body.
    ///
    /// The FDSN event service answers errors in plain text, but GeoJSON error
    /// documents (`metadata.error`) and generic `{"error": ...}` bodies are
    /// recognised as well.
    pub(crate) fn from_response(status: u16, body: &str) -> Self {
        let message = match serde_json::from_str::<Value>(body) {
            Ok(json) => message_from_json(&json),
            Err(_) => None,
        }
        .or_else(|| {
            body.lines()
                .map(str::trim)
                .find(|line| !line.is_empty())
                .map(|line| line.chars().take(MESSAGE_SNIPPET_LEN).collect())
        })
        .unwrap_or_else(|| format!("HTTP Error {} with empty body", status));

        QuakeError::ServiceError { status, message }
    }
}

fn message_from_json(json: &Value) -> Option<String> {
    let candidates = [
        json.pointer("/metadata/error"),
        json.get("error"),
        json.get("message"),
    ];
    candidates.into_iter().flatten().find_map(|v| match v {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string),
        _ => None,
    })
}

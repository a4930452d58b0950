//! Error types for the feature API client.
//!
//! # Design
//! `NotFound` and `Validation` get dedicated variants because callers act on
//! them differently: edit flows navigate back to the list on 404, forms show
//! 4xx messages inline. Everything else that carries a status lands in
//! `Server` with the raw body for debugging.

use serde_json::Value;
use thiserror::Error;

/// Errors returned by `FeatureClient` parse methods and by transports.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// The server rejected the request with a 4xx other than 404.
    #[error("validation failed ({status}): {message}")]
    Validation { status: u16, message: String },

    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// 5xx, or any status the operation does not expect.
    #[error("HTTP {status}: {body}")]
    Server { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// HTTP status carried by the error, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Validation { status, .. } | ApiError::Server { status, .. } => Some(*status),
            ApiError::NotFound => Some(404),
            _ => None,
        }
    }

    /// Classify a non-success response.
    pub(crate) fn from_status(status: u16, body: &str) -> Self {
        match status {
            404 => ApiError::NotFound,
            400..=499 => ApiError::Validation {
                status,
                message: server_message(body),
            },
            _ => ApiError::Server {
                status,
                body: body.to_string(),
            },
        }
    }
}

/// Pull a human-readable message out of an error body.
///
/// Tries `error`, then `detail`, then `field: message` pairs in the shape
/// `{"title": ["too short"]}`, and falls back to the raw text.
fn server_message(body: &str) -> String {
    let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) else {
        return body.trim().to_string();
    };

    for key in ["error", "detail"] {
        if let Some(Value::String(message)) = map.get(key) {
            return message.clone();
        }
    }

    let fields: Vec<String> = map
        .iter()
        .filter_map(|(field, value)| {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Array(items) => items
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join(" "),
                _ => return None,
            };
            (!text.is_empty()).then(|| format!("{field}: {text}"))
        })
        .collect();

    if fields.is_empty() {
        body.trim().to_string()
    } else {
        fields.join("; ")
    }
}

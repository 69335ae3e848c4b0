//! Client Response Error type

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

const DEFAULT_MESSAGE: &str = "Something went wrong.";

/// ClientResponseError normalizes a non-success HTTP response returned by
/// the Teaming backend.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
pub struct ClientResponseError {
    /// The URL of the request that failed.
    pub url: String,

    /// HTTP status code.
    pub status: u16,

    /// The response body, parsed as JSON when possible.
    #[serde(default)]
    pub response: serde_json::Value,

    /// The error message.
    #[serde(default)]
    pub message: String,
}

impl Default for ClientResponseError {
    fn default() -> Self {
        Self {
            url: String::new(),
            status: 0,
            response: serde_json::Value::Null,
            message: DEFAULT_MESSAGE.to_string(),
        }
    }
}

impl ClientResponseError {
    /// Creates a new ClientResponseError from a raw response body.
    ///
    /// JSON bodies are kept as-is and their `message` field (if any) becomes
    /// the error message. Plain text bodies are kept as a JSON string.
    pub fn new(url: &str, status: u16, body: &str) -> Self {
        let response = if body.trim().is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_str(body)
                .unwrap_or_else(|_| serde_json::Value::String(body.to_string()))
        };

        let message = response
            .get("message")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .unwrap_or_else(|| DEFAULT_MESSAGE.to_string());

        Self {
            url: url.to_string(),
            status,
            response,
            message,
        }
    }

    /// Converts the error to a JSON-serializable format.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "url": self.url,
            "status": self.status,
            "response": self.response,
            "message": self.message
        })
    }
}

impl fmt::Display for ClientResponseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {} for {}: {}", self.status, self.url, self.message)
    }
}

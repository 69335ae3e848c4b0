//! Send options

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Options for sending HTTP requests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOptions {
    /// HTTP method (GET, POST, PUT, PATCH, DELETE).
    #[serde(default = "default_method")]
    pub method: String,

    /// Custom headers to send with the request.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// The JSON body of the request.
    #[serde(default)]
    pub body: Option<serde_json::Value>,

    /// Query parameters that will be appended to the request URL.
    #[serde(default)]
    pub query: BTreeMap<String, String>,
}

fn default_method() -> String {
    "GET".to_string()
}

impl SendOptions {
    fn with_method(method: &str) -> Self {
        Self {
            method: method.to_string(),
            ..Default::default()
        }
    }

    /// Creates new SendOptions with GET method.
    pub fn get() -> Self {
        Self::with_method("GET")
    }

    /// Creates new SendOptions with POST method.
    pub fn post() -> Self {
        Self::with_method("POST")
    }

    /// Creates new SendOptions with PATCH method.
    pub fn patch() -> Self {
        Self::with_method("PATCH")
    }

    /// Creates new SendOptions with PUT method.
    pub fn put() -> Self {
        Self::with_method("PUT")
    }

    /// Creates new SendOptions with DELETE method.
    pub fn delete() -> Self {
        Self::with_method("DELETE")
    }

    /// Sets the body of the request.
    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Sets a query parameter.
    pub fn with_query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.insert(key.to_string(), value.to_string());
        self
    }

    /// Sets a header.
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    /// Whether a header was set explicitly (case-insensitive).
    pub fn has_header(&self, key: &str) -> bool {
        self.headers.keys().any(|k| k.eq_ignore_ascii_case(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders() {
        let opts = SendOptions::delete()
            .with_body(serde_json::json!({ "ids": [1, 2] }))
            .with_query("page", 2)
            .with_header("X-Trace", "abc");

        assert_eq!(opts.method, "DELETE");
        assert_eq!(opts.body.unwrap()["ids"][1], 2);
        assert_eq!(opts.query["page"], "2");
        assert!(SendOptions::get().with_header("Content-Type", "text/plain").has_header("content-type"));
    }

    #[test]
    fn test_default_method_from_json() {
        let opts: SendOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts.method, "GET");
    }
}

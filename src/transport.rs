//! Raw HTTP execution
//!
//! Sends one request and hands back the status and body. No token refresh
//! and no retry happen at this level; see [`crate::Client`] for that.

use crate::client_response_error::ClientResponseError;
use crate::error::{Error, Result};
use crate::tools::options::SendOptions;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use std::str::FromStr;
use std::time::Duration;

/// Status, final URL and body of a completed request.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub url: String,
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The backend rejected (or required) the bearer credential.
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    /// Turns a non-success response into an error.
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ClientResponseError::new(&self.url, self.status, &self.body).into())
        }
    }

    /// Parses the body as JSON. An empty body parses as `null`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        if self.body.trim().is_empty() {
            return serde_json::from_value(serde_json::Value::Null).map_err(Error::from);
        }
        serde_json::from_str(&self.body).map_err(Error::from)
    }

    /// Returns the body as text. A JSON string body is unquoted.
    pub fn text(self) -> String {
        match serde_json::from_str::<serde_json::Value>(&self.body) {
            Ok(serde_json::Value::String(s)) => s,
            _ => self.body,
        }
    }
}

/// HTTP transport bound to the backend base URL.
#[derive(Debug, Clone)]
pub struct Transport {
    /// The backend base URL address, without trailing slash.
    base_url: String,

    http: reqwest::Client,
}

impl Transport {
    /// Creates a transport for `base_url`. `timeout` of `None` keeps the
    /// reqwest default.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        url::Url::parse(base_url)?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: builder.build()?,
        })
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds a full URL by safely concatenating the provided path.
    pub fn build_url(&self, path: &str) -> String {
        let mut url = self.base_url.clone();

        if !path.is_empty() {
            url.push('/');
            url.push_str(path.strip_prefix('/').unwrap_or(path));
        }

        url
    }

    /// Sends one request, attaching `bearer` as the authorization credential
    /// when given.
    pub async fn execute(
        &self,
        path: &str,
        options: &SendOptions,
        bearer: Option<&str>,
    ) -> Result<RawResponse> {
        let url = self.build_url(path);
        let method = reqwest::Method::from_str(&options.method.to_ascii_uppercase())
            .map_err(|_| Error::Validation(format!("invalid HTTP method: {}", options.method)))?;

        tracing::debug!("{} {}", method, url);

        let mut headers = HeaderMap::new();
        if !options.has_header("content-type") {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        if !options.has_header("accept") {
            headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        }
        for (key, value) in &options.headers {
            if let (Ok(name), Ok(val)) = (HeaderName::from_str(key), HeaderValue::from_str(value)) {
                headers.insert(name, val);
            }
        }

        let mut request = self.http.request(method, &url).headers(headers);

        if let Some(token) = bearer.filter(|t| !t.is_empty()) {
            if !options.has_header("authorization") {
                request = request.bearer_auth(token);
            }
        }
        if !options.query.is_empty() {
            request = request.query(&options.query);
        }
        if let Some(body) = &options.body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let url = response.url().to_string();
        let body = response.text().await?;

        tracing::debug!("{} -> {}", url, status);

        Ok(RawResponse { url, status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url() {
        let transport = Transport::new("http://localhost:8080/", None).unwrap();
        assert_eq!(transport.base_url(), "http://localhost:8080");
        assert_eq!(transport.build_url("/users/me"), "http://localhost:8080/users/me");
        assert_eq!(transport.build_url("users/me"), "http://localhost:8080/users/me");
        assert_eq!(transport.build_url(""), "http://localhost:8080");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(Transport::new("not a url", None), Err(Error::Config(_))));
    }

    #[test]
    fn test_raw_response_helpers() {
        let ok = RawResponse { url: "u".into(), status: 204, body: String::new() };
        assert!(ok.is_success());
        ok.json::<()>().unwrap();

        let text = RawResponse { url: "u".into(), status: 200, body: "\"saved\"".into() };
        assert_eq!(text.text(), "saved");
        let plain = RawResponse { url: "u".into(), status: 200, body: "saved".into() };
        assert_eq!(plain.text(), "saved");

        let denied = RawResponse { url: "u".into(), status: 401, body: String::new() };
        assert!(denied.is_unauthorized());
        match denied.error_for_status() {
            Err(Error::Http(err)) => assert_eq!(err.status, 401),
            other => panic!("unexpected: {:?}", other),
        }
    }
}

//! Crate error type

use crate::client_response_error::ClientResponseError;
use thiserror::Error;

/// Errors returned by the admin client.
///
/// Malformed tokens never show up here: the JWT codec reports them as
/// `None` and callers treat them as expired.
#[derive(Debug, Error)]
pub enum Error {
    /// Non-success HTTP status other than an unresolved authorization failure.
    #[error(transparent)]
    Http(#[from] ClientResponseError),

    /// The session could not be recovered; all local credentials were cleared.
    #[error("Your session has expired. Please sign in again.")]
    SessionExpired,

    /// Client-side validation rejected the input before any network call.
    #[error("{0}")]
    Validation(String),

    /// The request could not be sent or its body could not be read.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// HTTP status code carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Http(err) => Some(err.status),
            Error::SessionExpired => Some(401),
            Error::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::Config(format!("invalid URL: {}", err))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status() {
        let http = Error::Http(ClientResponseError::new("http://x", 503, ""));
        assert_eq!(http.status(), Some(503));
        assert_eq!(Error::SessionExpired.status(), Some(401));
        assert_eq!(Error::Validation("code is required".into()).status(), None);
    }

    #[test]
    fn test_session_expired_message() {
        assert_eq!(
            Error::SessionExpired.to_string(),
            "Your session has expired. Please sign in again."
        );
    }
}

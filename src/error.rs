//! Error types for the DevInbox client.

use reqwest::StatusCode;
use thiserror::Error;

/// Error type for all DevInbox client operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Connection, DNS, TLS or timeout failure from the HTTP stack.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The API answered with a non-success status.
    #[error("unexpected status {status}: {body}")]
    Api {
        /// Response status.
        status: StatusCode,
        /// Raw response body.
        body: String,
    },
    /// The response body did not match the expected shape.
    #[error("failed to decode response: {source}")]
    Decode {
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
        /// Body that failed to decode.
        body: String,
    },
    /// An argument was rejected before any request was made.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    /// No API key was configured.
    #[error("missing api key (set DEVINBOX_API_KEY or call ClientBuilder::api_key)")]
    MissingApiKey,
    /// The API key cannot be sent as an HTTP header value.
    #[error("api key contains characters not allowed in an HTTP header")]
    InvalidApiKey,
    /// The HTTP client could not be built from the configuration, e.g. an
    /// unusable proxy URL.
    #[error("invalid client configuration: {0}")]
    Config(#[source] reqwest::Error),
    /// The configured base URL is not a usable http(s) URL.
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),
    /// SMTP transport construction failed.
    #[cfg(feature = "smtp")]
    #[error("smtp error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

impl Error {
    /// HTTP status of an [`Error::Api`] or of a status-bearing transport error.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Transport(err) => err.status(),
            _ => None,
        }
    }

    /// True when the API answered `404 Not Found`.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}

//! Error types for the order API client.
//!
//! # Design
//! Every failure a caller can see is an `ApiError` whose `Display` output is
//! a single human-readable message. The variant records only where the
//! failure came from; status codes and raw bodies are not carried past the
//! response interceptor.

use thiserror::Error;

/// Message used when neither the server nor the transport supplied one.
pub const FALLBACK_MESSAGE: &str = "request failed";

/// Coarse origin of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Timeout,
    Network,
    Server,
    Unknown,
    Decode,
    Encode,
}

/// Errors returned by `RemoteClient` operations and `OrderApiClient` parse methods.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The call did not complete within the configured timeout.
    #[error("{0}")]
    Timeout(String),

    /// No response reached the client.
    #[error("{0}")]
    Network(String),

    /// Non-2xx response carrying a `detail` string.
    #[error("{0}")]
    Server(String),

    /// Non-2xx response without a usable `detail`.
    #[error("{0}")]
    Unknown(String),

    /// A 2xx payload did not match the expected shape.
    #[error("{0}")]
    Decode(String),

    /// The request payload could not be serialized.
    #[error("{0}")]
    Encode(String),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Timeout(_) => ErrorKind::Timeout,
            ApiError::Network(_) => ErrorKind::Network,
            ApiError::Server(_) => ErrorKind::Server,
            ApiError::Unknown(_) => ErrorKind::Unknown,
            ApiError::Decode(_) => ErrorKind::Decode,
            ApiError::Encode(_) => ErrorKind::Encode,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::Timeout(m)
            | ApiError::Network(m)
            | ApiError::Server(m)
            | ApiError::Unknown(m)
            | ApiError::Decode(m)
            | ApiError::Encode(m) => m,
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.kind() == ErrorKind::Timeout
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Encode(format!("serialization failed: {err}"))
    }
}

/// Errors raised while building a `ClientConfig` or a transport.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid base URL `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

//! Error types for the 4leads API client.
//!
//! # Design
//! Only failures to complete an exchange are errors. A 4xx or 5xx reply is a
//! normal `Response` and callers inspect `status_code` themselves. There is
//! no `NotFound` or `HttpError` variant.

use thiserror::Error;

/// Boxed error produced by a `Transport` implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by `ApiClient` and `RequestBuilder`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The API key or host was rejected at construction time.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The exchange could not be completed (DNS, connect, TLS, timeout).
    #[error("transport failed: {0}")]
    Transport(#[source] BoxError),

    /// The request payload could not be encoded as JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A non-empty response body was not valid JSON, or did not match the
    /// shape requested through `Response::decode`.
    #[error("could not parse response (HTTP {status}): {message}")]
    ResponseParse { status: u16, message: String },
}

impl ApiError {
    pub fn transport<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        ApiError::Transport(err.into())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Serialization(err.to_string())
    }
}

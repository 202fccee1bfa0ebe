//! HTTP capability consumed by [`Api`](crate::Api).
//!
//! The transport only moves bytes: it sends an [`HttpRequest`] and returns the
//! raw status and body. Authentication, decoding and error mapping happen in
//! the `Api` layer.

pub mod http;
pub mod request;

use std::time::Duration;

pub use reqwest::Method;
use url::Url;

pub use self::http::{ReqwestTransport, ReqwestTransportBuilder};
pub use self::request::{ApiRequest, AuthMode, BodyEncoding};

/// Errors raised by an [`HttpTransport`].
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request did not complete within its timeout.
    #[error("Request timed out")]
    Timeout,

    /// The connection could not be established.
    #[error("Connection failed: {0}")]
    Connect(String),

    /// Any other network failure.
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else if e.is_connect() {
            TransportError::Connect(e.to_string())
        } else {
            TransportError::Other(e.to_string())
        }
    }
}

/// A fully built outgoing request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
    /// Caller-supplied timeout the transport must honour.
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    /// Look up a header by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Raw response from the provider.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Create a response.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Check for a 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for sending HTTP requests.
///
/// Implemented by [`ReqwestTransport`]; tests and embedders may supply their
/// own.
#[async_trait::async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send a request and return the raw response.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

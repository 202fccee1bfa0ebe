//! Error types for apikr.
//!
//! Every failure below the [`Api`](crate::Api) boundary is converted into one
//! [`Error`] variant before it reaches the caller. Provider-reported failures
//! keep the provider's own message text so callers can show it verbatim.

use std::fmt;

use crate::transport::TransportError;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Classification of a provider-reported failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The provider rejected the request input (e.g. an unparsable address).
    BadRequest,
    /// The provider returned no usable result.
    NullResponse,
    /// The credential was rejected.
    Unauthorized,
    /// Domain-specific rejection (e.g. unknown subscribed customer).
    BusinessError,
    /// Unrecognized failure shape.
    Unknown,
}

impl ErrorKind {
    /// Map an HTTP-like status code onto a kind.
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => ErrorKind::BadRequest,
            401 | 403 => ErrorKind::Unauthorized,
            204 | 404 => ErrorKind::NullResponse,
            _ => ErrorKind::Unknown,
        }
    }

    /// Stable identifier, used in log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "bad_request",
            ErrorKind::NullResponse => "null_response",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::BusinessError => "business_error",
            ErrorKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure reported by a provider, either in the HTTP status or the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderFailure {
    /// Classified kind.
    pub kind: ErrorKind,
    /// Provider error code, if the body carried one.
    pub code: Option<String>,
    /// Provider message text, passed through unchanged.
    pub message: String,
    /// HTTP status of the response.
    pub status: u16,
}

impl ProviderFailure {
    /// Create a failure.
    pub fn new(
        kind: ErrorKind,
        code: Option<String>,
        message: impl Into<String>,
        status: u16,
    ) -> Self {
        Self {
            kind,
            code,
            message: message.into(),
            status,
        }
    }
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Errors that can occur when calling a provider.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing or invalid configuration. Raised at construction, never retried.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed value object input. Never reaches the transport.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Network or timeout failure from the HTTP capability.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Empty or unparsable response body.
    #[error("Null or empty response: {0}")]
    Decode(String),

    /// Credential rejected, after the single token refresh where one applies.
    #[error("{0}")]
    Auth(ProviderFailure),

    /// Provider-reported failure. Displays the provider's message verbatim.
    #[error("{0}")]
    Provider(ProviderFailure),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    /// Create a decode error.
    pub fn decode(msg: impl Into<String>) -> Self {
        Error::Decode(msg.into())
    }

    /// Create a provider error with no provider code.
    pub fn provider(kind: ErrorKind, message: impl Into<String>, status: u16) -> Self {
        Error::Provider(ProviderFailure::new(kind, None, message, status))
    }

    /// Convert a classified failure into the matching variant.
    pub fn from_failure(failure: ProviderFailure) -> Self {
        match failure.kind {
            ErrorKind::Unauthorized => Error::Auth(failure),
            _ => Error::Provider(failure),
        }
    }

    /// Kind of the provider failure, if this is one.
    pub fn kind(&self) -> Option<ErrorKind> {
        self.failure().map(|f| f.kind)
    }

    /// Provider error code, if the provider supplied one.
    pub fn provider_code(&self) -> Option<&str> {
        self.failure().and_then(|f| f.code.as_deref())
    }

    /// HTTP status of the failing response, if any.
    pub fn status(&self) -> Option<u16> {
        self.failure().map(|f| f.status)
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Auth(_))
    }

    /// Check if the provider returned no usable result.
    pub fn is_null_response(&self) -> bool {
        self.kind() == Some(ErrorKind::NullResponse)
    }

    fn failure(&self) -> Option<&ProviderFailure> {
        match self {
            Error::Auth(f) | Error::Provider(f) => Some(f),
            _ => None,
        }
    }
}

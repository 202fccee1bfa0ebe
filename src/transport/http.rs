//! Default [`HttpTransport`] backed by reqwest.

use std::time::Duration;

use reqwest::{Client, ClientBuilder};
use tracing::{debug, warn};

use super::{HttpRequest, HttpResponse, HttpTransport, TransportError};
use crate::config::{CONNECT_TIMEOUT, Configuration, DEFAULT_TIMEOUT};

/// Default user agent for the library.
pub const USER_AGENT: &str = concat!("apikr/", env!("CARGO_PKG_VERSION"));

/// reqwest-backed transport.
///
/// Provides a standard configuration (User-Agent, timeouts) for all providers.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    inner: Client,
}

impl ReqwestTransport {
    /// Create a transport with default settings.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a transport using the timeout from `config`.
    pub fn from_config(config: &Configuration) -> Self {
        Self::builder().request_timeout(config.timeout()).build()
    }

    /// Create a new builder.
    pub fn builder() -> ReqwestTransportBuilder {
        ReqwestTransportBuilder::default()
    }

    /// Wrap an existing reqwest client.
    pub fn with_client(client: Client) -> Self {
        Self { inner: client }
    }

    /// Get the inner reqwest client.
    pub fn inner(&self) -> &Client {
        &self.inner
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        debug!(method = %request.method, url = %request.url, "Sending HTTP request");

        let mut builder = self.inner.request(request.method, request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(|e| {
            warn!(error = %e, "HTTP request failed");
            TransportError::from(e)
        })?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(TransportError::from)?;

        debug!(status, bytes = body.len(), "Received HTTP response");
        Ok(HttpResponse::new(status, body.to_vec()))
    }
}

/// Builder for [`ReqwestTransport`].
pub struct ReqwestTransportBuilder {
    builder: ClientBuilder,
}

impl Default for ReqwestTransportBuilder {
    fn default() -> Self {
        Self {
            builder: Client::builder()
                .user_agent(USER_AGENT)
                .connect_timeout(CONNECT_TIMEOUT)
                .timeout(DEFAULT_TIMEOUT),
        }
    }
}

impl ReqwestTransportBuilder {
    /// Set a custom user agent.
    pub fn user_agent(mut self, ua: &str) -> Self {
        self.builder = self.builder.user_agent(ua);
        self
    }

    /// Set connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.builder = self.builder.connect_timeout(timeout);
        self
    }

    /// Set request timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.builder = self.builder.timeout(timeout);
        self
    }

    /// Build the transport.
    pub fn build(self) -> ReqwestTransport {
        let inner = match self.builder.build() {
            Ok(c) => c,
            Err(e) => {
                warn!("Failed to build HTTP client with custom config: {}; using defaults", e);
                Client::default()
            }
        };
        ReqwestTransport { inner }
    }
}

//! Authenticated transport.
//!
//! [`Api`] turns an [`ApiRequest`] into an HTTP call, attaches credentials,
//! decodes the body and classifies the outcome. The only state it keeps
//! between calls is the cached bearer token.

use std::sync::Arc;

use serde_json::Value;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::auth::{BearerToken, Clock, SystemClock, TokenCache};
use crate::config::{Configuration, TokenEndpoint};
use crate::error::{Error, ErrorKind, ProviderFailure, Result};
use crate::mapper::{self, ErrorShape, Outcome};
use crate::result::ApiResult;
use crate::transport::{
    ApiRequest, AuthMode, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport,
};

/// Provider API client.
///
/// Thread-safe: share it across tasks with `Arc`. Token creation is
/// serialized per instance.
///
/// # Examples
///
/// ```rust,no_run
/// use apikr::{Api, ApiRequest, AuthMode, Configuration, Provider};
///
/// # async fn example() -> apikr::Result<()> {
/// let config = Configuration::new(
///     Provider::Iamport,
///     [("impKey", "imp_apikey"), ("impSecret", "secret")],
/// )?;
/// let api = Api::new(config);
///
/// let result = api
///     .request(ApiRequest::get("/subscribe/customers/apikr4028").auth(AuthMode::Bearer))
///     .await?;
/// println!("{:?}", result.search("response.customer_uid")?);
/// # Ok(())
/// # }
/// ```
pub struct Api {
    config: Configuration,
    transport: Arc<dyn HttpTransport>,
    shape: ErrorShape,
    tokens: TokenCache,
    clock: Arc<dyn Clock>,
}

impl Api {
    /// Create a client using the default reqwest transport.
    pub fn new(config: Configuration) -> Self {
        Self::builder(config).build()
    }

    /// Create a builder for configuring the client.
    pub fn builder(config: Configuration) -> ApiBuilder {
        ApiBuilder::new(config)
    }

    /// The configuration this client was built with.
    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    /// How responses are classified.
    pub fn error_shape(&self) -> ErrorShape {
        self.shape
    }

    /// Send a request and return the decoded result.
    ///
    /// Bearer requests create a token on demand. If the provider rejects the
    /// token, it is renewed once and the request is resent once.
    pub async fn request(&self, request: ApiRequest) -> Result<ApiResult> {
        let span = info_span!(
            "api_request",
            provider = %self.config.provider(),
            method = %request.method(),
            path = request.path(),
            auth = request.auth_mode().as_str(),
        );
        async {
            match request.auth_mode() {
                AuthMode::Bearer => self.request_with_bearer(&request).await,
                _ => {
                    let (status, body, outcome) = self.execute(&request, None).await?;
                    finish(status, body, outcome)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Get the cached bearer token, creating one if none is valid.
    pub async fn access_token(&self) -> Result<String> {
        self.tokens
            .get_or_refresh(|| self.clock.now(), || self.fetch_token())
            .await
    }

    /// Create a new bearer token and cache it, regardless of the cached one.
    pub async fn create_token(&self) -> Result<String> {
        self.tokens.refresh_with(|| self.fetch_token()).await
    }

    /// Drop the cached bearer token so the next bearer call creates a new one.
    pub async fn invalidate_token(&self) {
        self.tokens.invalidate().await;
    }

    /// Snapshot of the cached bearer token.
    pub async fn cached_token(&self) -> Option<BearerToken> {
        self.tokens.snapshot().await
    }

    async fn request_with_bearer(&self, request: &ApiRequest) -> Result<ApiResult> {
        let token = self.access_token().await?;
        let (status, body, outcome) = self.execute(request, Some(&token)).await?;
        if !needs_reauth(status, &outcome) {
            return finish(status, body, outcome);
        }

        warn!(status, "Bearer token rejected - refreshing token and retrying");
        self.tokens.invalidate_if(&token).await;
        let token = self.access_token().await?;

        let (status, body, outcome) = self.execute(request, Some(&token)).await?;
        if needs_reauth(status, &outcome) {
            return Err(rejected(status, outcome));
        }
        finish(status, body, outcome)
    }

    async fn fetch_token(&self) -> Result<BearerToken> {
        let endpoint = self.token_endpoint()?;
        let request = ApiRequest::post(endpoint.path)
            .auth(AuthMode::Credentials)
            .json();

        let (status, body, outcome) = self.execute(&request, None).await?;
        let result = finish(status, body, outcome)?;

        let access_token = result
            .search_str(endpoint.token_path)?
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                Error::decode(format!("Token response missing '{}'", endpoint.token_path))
            })?
            .to_string();

        let expires_at = match result.search_i64(endpoint.expiry_path)? {
            Some(expired_at) => {
                // Measure the lifetime on the provider's clock, apply it to ours
                let issued = match endpoint.issued_path {
                    Some(path) => result.search_i64(path)?,
                    None => None,
                };
                let now = self.clock.now();
                Some(match issued {
                    Some(issued) => now + (expired_at - issued),
                    None => expired_at,
                })
            }
            None => None,
        };

        info!(provider = %self.config.provider(), ?expires_at, "Bearer token created");
        Ok(BearerToken::new(access_token, expires_at))
    }

    fn token_endpoint(&self) -> Result<TokenEndpoint> {
        self.config.provider().token_endpoint().ok_or_else(|| {
            Error::config(format!(
                "{} does not support bearer authentication",
                self.config.provider()
            ))
        })
    }

    /// Send one attempt and classify it.
    async fn execute(
        &self,
        request: &ApiRequest,
        token: Option<&str>,
    ) -> Result<(u16, Value, Outcome)> {
        let http = self.prepare(request, token)?;
        debug!(method = %http.method, url = %http.url, "Dispatching request");

        let response = self.transport.send(http).await?;
        let (status, body) = decode(response)?;
        let outcome = mapper::classify(self.shape, status, &body);
        Ok((status, body, outcome))
    }

    fn prepare(&self, request: &ApiRequest, token: Option<&str>) -> Result<HttpRequest> {
        let provider = self.config.provider();
        let mut headers = Vec::new();

        match request.auth_mode() {
            AuthMode::None => {}
            AuthMode::StaticKey => {
                let (header, option) = provider.static_key().ok_or_else(|| {
                    Error::config(format!("{} does not use a static API key", provider))
                })?;
                headers.push((header.to_string(), self.config.get(option)?.to_string()));
            }
            AuthMode::Bearer => {
                let token = token.ok_or_else(|| {
                    Error::config("Bearer request prepared without a token".to_string())
                })?;
                headers.push(("Authorization".to_string(), format!("Bearer {}", token)));
            }
            AuthMode::Credentials => {
                let params = provider.credential_params();
                if params.is_empty() {
                    return Err(Error::config(format!(
                        "{} does not use credential authentication",
                        provider
                    )));
                }
                let mut request = request.clone();
                for (param, option) in params {
                    request = request.param(*param, self.config.get(option)?);
                }
                return request.to_http(self.config.base_url(), headers, self.config.timeout());
            }
        }

        request.to_http(self.config.base_url(), headers, self.config.timeout())
    }
}

impl std::fmt::Debug for Api {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Api")
            .field("config", &self.config)
            .field("shape", &self.shape)
            .finish()
    }
}

/// Builder for [`Api`].
pub struct ApiBuilder {
    config: Configuration,
    transport: Option<Arc<dyn HttpTransport>>,
    clock: Option<Arc<dyn Clock>>,
}

impl ApiBuilder {
    /// Create a new builder.
    pub fn new(config: Configuration) -> Self {
        Self {
            config,
            transport: None,
            clock: None,
        }
    }

    /// Use a custom HTTP transport.
    pub fn transport(mut self, transport: impl HttpTransport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Use a shared HTTP transport.
    pub fn shared_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Use a custom time source for token expiry.
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Build the client.
    pub fn build(self) -> Api {
        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(ReqwestTransport::from_config(&self.config)));
        let shape = self.config.provider().error_shape();

        debug!(provider = %self.config.provider(), ?shape, "Api initialized");
        Api {
            config: self.config,
            transport,
            shape,
            tokens: TokenCache::new(),
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
        }
    }
}

/// Decode a response body.
///
/// An empty or unparsable body is an error on 2xx, except for 204 No Content
/// which decodes to null. On other statuses the raw text is kept for the
/// mapper.
fn decode(response: HttpResponse) -> Result<(u16, Value)> {
    let status = response.status;

    if response.body.iter().all(u8::is_ascii_whitespace) {
        if response.is_success() && status != 204 {
            return Err(Error::decode(format!("Empty response body (HTTP {})", status)));
        }
        return Ok((status, Value::Null));
    }

    match serde_json::from_slice::<Value>(&response.body) {
        Ok(value) => Ok((status, value)),
        Err(e) if response.is_success() => Err(Error::decode(format!(
            "Unparsable response body (HTTP {}): {}",
            status, e
        ))),
        Err(_) => {
            let text = String::from_utf8_lossy(&response.body);
            Ok((status, Value::String(text.into_owned())))
        }
    }
}

/// The status decides whether a bearer token was rejected.
fn needs_reauth(status: u16, outcome: &Outcome) -> bool {
    status == 401
        || matches!(outcome, Outcome::Failure(f) if f.kind == ErrorKind::Unauthorized)
}

/// A bearer token rejected again after renewal.
fn rejected(status: u16, outcome: Outcome) -> Error {
    let failure = match outcome {
        Outcome::Failure(f) => ProviderFailure {
            kind: ErrorKind::Unauthorized,
            ..f
        },
        Outcome::Success => {
            ProviderFailure::new(ErrorKind::Unauthorized, None, "Unauthorized", status)
        }
    };
    warn!(status, code = ?failure.code, "Authentication rejected after token renewal");
    Error::Auth(failure)
}

fn finish(status: u16, body: Value, outcome: Outcome) -> Result<ApiResult> {
    match outcome {
        Outcome::Success => Ok(ApiResult::new(body)),
        Outcome::Failure(failure) => {
            warn!(
                status,
                kind = %failure.kind,
                code = ?failure.code,
                "Provider reported failure"
            );
            Err(Error::from_failure(failure))
        }
    }
}

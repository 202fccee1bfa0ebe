//! Request descriptors.

use std::time::Duration;

use serde_json::{Map, Value};
use url::Url;
use url::form_urlencoded;

use super::{HttpRequest, Method};
use crate::error::{Error, Result};

/// How a request is authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// No credential attached.
    None,
    /// The provider's static API key on every call.
    StaticKey,
    /// A cached bearer token, created on demand.
    Bearer,
    /// The provider's key/secret pair, used to create bearer tokens.
    Credentials,
}

impl AuthMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMode::None => "none",
            AuthMode::StaticKey => "static_key",
            AuthMode::Bearer => "bearer",
            AuthMode::Credentials => "credentials",
        }
    }
}

/// Body encoding for POST/PUT requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyEncoding {
    /// `application/x-www-form-urlencoded`.
    #[default]
    Form,
    /// `application/json`.
    Json,
}

/// Describes one provider call. Built per call and consumed by
/// [`Api::request`](crate::Api::request).
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    params: Map<String, Value>,
    auth: AuthMode,
    encoding: BodyEncoding,
    timeout: Option<Duration>,
}

impl ApiRequest {
    /// Create a request for `method` and `path`.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            params: Map::new(),
            auth: AuthMode::None,
            encoding: BodyEncoding::default(),
            timeout: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Add a parameter that always goes to the query string.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Add a parameter. GET/DELETE send it in the query string, POST/PUT in
    /// the body.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Merge a map of parameters. Later values override earlier ones.
    pub fn params(mut self, params: Map<String, Value>) -> Self {
        self.params.extend(params);
        self
    }

    /// Set the authentication mode.
    pub fn auth(mut self, auth: AuthMode) -> Self {
        self.auth = auth;
        self
    }

    /// Encode the body as JSON instead of a form.
    pub fn json(mut self) -> Self {
        self.encoding = BodyEncoding::Json;
        self
    }

    /// Override the transport timeout for this call.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn auth_mode(&self) -> AuthMode {
        self.auth
    }

    pub fn param_value(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    fn sends_body(&self) -> bool {
        self.method == Method::POST || self.method == Method::PUT || self.method == Method::PATCH
    }

    /// Build the outgoing request against `base`, with `headers` attached.
    ///
    /// Identical inputs always produce identical requests.
    pub fn to_http(
        &self,
        base: &Url,
        headers: Vec<(String, String)>,
        default_timeout: Duration,
    ) -> Result<HttpRequest> {
        let mut url = join_url(base, &self.path)?;
        let mut headers = headers;
        let mut body = None;

        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in &self.query {
                pairs.append_pair(k, v);
            }
            if !self.sends_body() {
                for (k, v) in &self.params {
                    if let Some(v) = scalar_text(v) {
                        pairs.append_pair(k, &v);
                    }
                }
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }

        if self.sends_body() {
            match self.encoding {
                BodyEncoding::Form => {
                    let mut form = form_urlencoded::Serializer::new(String::new());
                    for (k, v) in &self.params {
                        if let Some(v) = scalar_text(v) {
                            form.append_pair(k, &v);
                        }
                    }
                    body = Some(form.finish().into_bytes());
                    headers.push((
                        "Content-Type".to_string(),
                        "application/x-www-form-urlencoded".to_string(),
                    ));
                }
                BodyEncoding::Json => {
                    let bytes = serde_json::to_vec(&self.params)
                        .map_err(|e| Error::validation(format!("Unencodable parameters: {}", e)))?;
                    body = Some(bytes);
                    headers.push(("Content-Type".to_string(), "application/json".to_string()));
                }
            }
        }

        headers.push(("Accept".to_string(), "application/json".to_string()));

        Ok(HttpRequest {
            method: self.method.clone(),
            url,
            headers,
            body,
            timeout: Some(self.timeout.unwrap_or(default_timeout)),
        })
    }
}

/// Append `path` to `base`, keeping any path prefix on the base.
fn join_url(base: &Url, path: &str) -> Result<Url> {
    let base = base.as_str().trim_end_matches('/');
    let path = path.trim_start_matches('/');
    Url::parse(&format!("{}/{}", base, path))
        .map_err(|e| Error::validation(format!("Invalid request path '{}': {}", path, e)))
}

/// Form/query text for a parameter. Nested values are sent as JSON text;
/// null is omitted.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

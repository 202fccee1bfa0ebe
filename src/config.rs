//! Provider configuration.
//!
//! A [`Configuration`] is validated once at construction and is immutable
//! afterwards: a missing credential fails here, never at call time.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};
use crate::mapper::ErrorShape;

/// TMap application key.
pub const OPTION_API_KEY: &str = "apiKey";

/// Iamport REST API key.
pub const OPTION_IMP_KEY: &str = "impKey";

/// Iamport REST API secret.
pub const OPTION_IMP_SECRET: &str = "impSecret";

/// Override for the provider base URL.
pub const OPTION_BASE_URL: &str = "baseUrl";

/// Request timeout in whole seconds.
pub const OPTION_TIMEOUT: &str = "timeout";

/// TMap API version sent with every call.
pub const OPTION_VERSION: &str = "version";

/// Default TMap base URL.
pub const TMAP_BASE_URL: &str = "https://apis.skplanetx.com";

/// Default Iamport base URL.
pub const IAMPORT_BASE_URL: &str = "https://api.iamport.kr";

/// Default TMap API version.
pub const DEFAULT_TMAP_VERSION: &str = "1";

/// Default timeout for requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connect timeout for HTTP requests.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Options whose values must never appear in logs or `Debug` output.
const SECRET_OPTIONS: &[&str] = &[OPTION_API_KEY, OPTION_IMP_KEY, OPTION_IMP_SECRET];

/// Where a provider issues bearer tokens and how to read them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenEndpoint {
    /// Path of the token-creation call.
    pub path: &'static str,
    /// Result path of the access token.
    pub token_path: &'static str,
    /// Result path of the absolute expiry (unix seconds).
    pub expiry_path: &'static str,
    /// Result path of the provider's own clock, used to correct skew.
    pub issued_path: Option<&'static str>,
}

/// A remote API supported by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    /// SK Planet TMap (routing and geocoding).
    TMap,
    /// Iamport payment gateway.
    Iamport,
}

impl Provider {
    /// Provider identifier.
    pub fn name(&self) -> &'static str {
        match self {
            Provider::TMap => "tmap",
            Provider::Iamport => "iamport",
        }
    }

    /// Options that must be present and non-empty.
    pub fn required_keys(&self) -> &'static [&'static str] {
        match self {
            Provider::TMap => &[OPTION_API_KEY],
            Provider::Iamport => &[OPTION_IMP_KEY, OPTION_IMP_SECRET],
        }
    }

    /// Base URL used when `baseUrl` is not configured.
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::TMap => TMAP_BASE_URL,
            Provider::Iamport => IAMPORT_BASE_URL,
        }
    }

    /// How this provider signals errors.
    pub fn error_shape(&self) -> ErrorShape {
        match self {
            Provider::TMap => ErrorShape::StatusAndNestedField,
            Provider::Iamport => ErrorShape::TopLevelCodeMessage,
        }
    }

    /// Header carrying the static API key, and the option it is read from.
    pub fn static_key(&self) -> Option<(&'static str, &'static str)> {
        match self {
            Provider::TMap => Some(("appKey", OPTION_API_KEY)),
            Provider::Iamport => None,
        }
    }

    /// Parameters sent on token creation, and the options they are read from.
    pub fn credential_params(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Provider::TMap => &[],
            Provider::Iamport => &[("imp_key", OPTION_IMP_KEY), ("imp_secret", OPTION_IMP_SECRET)],
        }
    }

    /// Token-creation endpoint, for providers using bearer auth.
    pub fn token_endpoint(&self) -> Option<TokenEndpoint> {
        match self {
            Provider::TMap => None,
            Provider::Iamport => Some(TokenEndpoint {
                path: "/users/getToken",
                token_path: "response.access_token",
                expiry_path: "response.expired_at",
                issued_path: Some("response.now"),
            }),
        }
    }

    fn env_prefix(&self) -> &'static str {
        match self {
            Provider::TMap => "TMAP",
            Provider::Iamport => "IAMPORT",
        }
    }

    fn known_keys(&self) -> &'static [&'static str] {
        match self {
            Provider::TMap => &[OPTION_API_KEY, OPTION_BASE_URL, OPTION_TIMEOUT, OPTION_VERSION],
            Provider::Iamport => &[
                OPTION_IMP_KEY,
                OPTION_IMP_SECRET,
                OPTION_BASE_URL,
                OPTION_TIMEOUT,
            ],
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Immutable option set for one provider.
#[derive(Clone)]
pub struct Configuration {
    provider: Provider,
    options: BTreeMap<String, String>,
    base_url: Url,
    timeout: Duration,
}

impl Configuration {
    /// Validate `options` for `provider`.
    ///
    /// Fails with [`Error::Config`] naming the first required key that is
    /// missing or empty, or the first optional key that does not parse.
    pub fn new<I, K, V>(provider: Provider, options: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let options: BTreeMap<String, String> = options
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        for key in provider.required_keys() {
            match options.get(*key) {
                Some(value) if !value.trim().is_empty() => {}
                _ => {
                    return Err(Error::config(format!(
                        "Missing required option '{}' for {}",
                        key, provider
                    )));
                }
            }
        }

        let base_url = parse_base_url(
            options
                .get(OPTION_BASE_URL)
                .map(String::as_str)
                .unwrap_or(provider.default_base_url()),
        )?;

        let timeout = match options.get(OPTION_TIMEOUT) {
            Some(raw) => parse_timeout(raw)?,
            None => DEFAULT_TIMEOUT,
        };

        Ok(Self {
            provider,
            options,
            base_url,
            timeout,
        })
    }

    /// Build a configuration from environment variables.
    ///
    /// Keys map to `<PROVIDER>_<KEY>`, e.g. `TMAP_API_KEY` or
    /// `IAMPORT_IMP_SECRET`.
    pub fn from_env(provider: Provider) -> Result<Self> {
        Self::from_lookup(provider, |name| std::env::var(name).ok())
    }

    /// Build a configuration by looking up each known key through `lookup`.
    pub fn from_lookup<F>(provider: Provider, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let options = provider.known_keys().iter().filter_map(|key| {
            let var = env_var_name(provider, key);
            lookup(&var).map(|value| (key.to_string(), value))
        });
        Self::new(provider, options)
    }

    /// The provider this configuration belongs to.
    pub fn provider(&self) -> Provider {
        self.provider
    }

    /// Get an option, failing with a configuration error naming the key.
    pub fn get(&self, key: &str) -> Result<&str> {
        self.get_opt(key).ok_or_else(|| {
            Error::config(format!(
                "Missing option '{}' for {}",
                key, self.provider
            ))
        })
    }

    /// Get an option if present and non-empty.
    pub fn get_opt(&self, key: &str) -> Option<&str> {
        self.options
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Provider base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// TMap API version.
    pub fn version(&self) -> &str {
        self.get_opt(OPTION_VERSION).unwrap_or(DEFAULT_TMAP_VERSION)
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redacted: BTreeMap<&str, &str> = self
            .options
            .iter()
            .map(|(k, v)| {
                let shown = if SECRET_OPTIONS.contains(&k.as_str()) {
                    "***"
                } else {
                    v.as_str()
                };
                (k.as_str(), shown)
            })
            .collect();
        f.debug_struct("Configuration")
            .field("provider", &self.provider)
            .field("options", &redacted)
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| {
        Error::config(format!("Invalid option '{}': '{}' ({})", OPTION_BASE_URL, raw, e))
    })?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(Error::config(format!(
            "Invalid option '{}': '{}' is not an http(s) base URL",
            OPTION_BASE_URL, raw
        )));
    }
    Ok(url)
}

fn parse_timeout(raw: &str) -> Result<Duration> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(Error::config(format!(
            "Invalid option '{}': '{}' (expected a positive number of seconds)",
            OPTION_TIMEOUT, raw
        ))),
    }
}

/// `apiKey` -> `TMAP_API_KEY`.
fn env_var_name(provider: Provider, key: &str) -> String {
    let mut name = String::from(provider.env_prefix());
    name.push('_');
    for ch in key.chars() {
        if ch.is_ascii_uppercase() {
            name.push('_');
        }
        name.push(ch.to_ascii_uppercase());
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;

    #[test]
    fn test_tmap_requires_api_key() {
        let err = Configuration::new(Provider::TMap, Vec::<(String, String)>::new()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("apiKey"));
    }

    #[test]
    fn test_iamport_names_missing_secret() {
        let err = Configuration::new(Provider::Iamport, [(OPTION_IMP_KEY, "imp_apikey")])
            .unwrap_err();
        assert!(err.to_string().contains("impSecret"));
    }

    #[test]
    fn test_blank_required_key_rejected() {
        let err = Configuration::new(Provider::TMap, [(OPTION_API_KEY, "   ")]).unwrap_err();
        assert!(err.to_string().contains("apiKey"));
    }

    #[test]
    fn test_defaults() {
        let config = Configuration::new(Provider::TMap, [(OPTION_API_KEY, "key")]).unwrap();
        assert_eq!(config.base_url().as_str(), "https://apis.skplanetx.com/");
        assert_eq!(config.timeout(), DEFAULT_TIMEOUT);
        assert_eq!(config.version(), "1");
        assert_eq!(config.get(OPTION_API_KEY).unwrap(), "key");
    }

    #[test]
    fn test_get_missing_names_key() {
        let config = Configuration::new(Provider::TMap, [(OPTION_API_KEY, "key")]).unwrap();
        let err = config.get(OPTION_IMP_SECRET).unwrap_err();
        assert!(err.to_string().contains("impSecret"));
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let err = Configuration::new(
            Provider::TMap,
            [(OPTION_API_KEY, "key"), (OPTION_BASE_URL, "not a url")],
        )
        .unwrap_err();
        assert!(err.to_string().contains("baseUrl"));

        assert!(
            Configuration::new(
                Provider::TMap,
                [(OPTION_API_KEY, "key"), (OPTION_BASE_URL, "mailto:x@example.com")],
            )
            .is_err()
        );
    }

    #[test]
    fn test_invalid_timeout_rejected() {
        for raw in ["0", "-1", "soon"] {
            let result = Configuration::new(
                Provider::Iamport,
                [
                    (OPTION_IMP_KEY, "key"),
                    (OPTION_IMP_SECRET, "secret"),
                    (OPTION_TIMEOUT, raw),
                ],
            );
            assert!(result.is_err(), "timeout {raw:?} should be rejected");
        }
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = Configuration::new(
            Provider::Iamport,
            [(OPTION_IMP_KEY, "imp_apikey"), (OPTION_IMP_SECRET, "s3cr3t")],
        )
        .unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("s3cr3t"));
        assert!(!debug.contains("imp_apikey"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn test_env_var_name() {
        assert_eq!(env_var_name(Provider::TMap, OPTION_API_KEY), "TMAP_API_KEY");
        assert_eq!(env_var_name(Provider::Iamport, OPTION_IMP_SECRET), "IAMPORT_IMP_SECRET");
        assert_eq!(env_var_name(Provider::Iamport, OPTION_BASE_URL), "IAMPORT_BASE_URL");
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("IAMPORT_IMP_KEY", "imp_apikey"),
            ("IAMPORT_IMP_SECRET", "secret"),
            ("IAMPORT_TIMEOUT", "5"),
        ]
        .into_iter()
        .collect();
        let config = Configuration::from_lookup(Provider::Iamport, |name| {
            vars.get(name).map(|v| v.to_string())
        })
        .unwrap();
        assert_eq!(config.get(OPTION_IMP_KEY).unwrap(), "imp_apikey");
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_from_lookup_missing() {
        let err = Configuration::from_lookup(Provider::TMap, |_| None).unwrap_err();
        assert!(err.to_string().contains("apiKey"));
    }

    proptest! {
        #[test]
        fn prop_construction_iff_required_present(
            key in proptest::option::of("[ a-zA-Z0-9_-]{0,12}"),
            secret in proptest::option::of("[ a-zA-Z0-9_-]{0,12}"),
        ) {
            let mut options = Vec::new();
            if let Some(k) = &key {
                options.push((OPTION_IMP_KEY.to_string(), k.clone()));
            }
            if let Some(s) = &secret {
                options.push((OPTION_IMP_SECRET.to_string(), s.clone()));
            }
            let filled = |v: &Option<String>| v.as_ref().is_some_and(|s| !s.trim().is_empty());
            let expected = filled(&key) && filled(&secret);
            let result = Configuration::new(Provider::Iamport, options);
            prop_assert_eq!(result.is_ok(), expected);
        }
    }
}

//! HTTP transport seam.
//!
//! Everything above this module works on [`PreparedRequest`] and
//! [`RawResponse`] values; only [`HttpTransport`] touches `reqwest`. Tests
//! and embedders can plug in their own [`Transport`].

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, ClientBuilder, Proxy};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use crate::user_agent;

/// HTTP methods used by the DSM APIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
}

impl HttpMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully built outgoing request.
#[derive(Clone)]
pub struct PreparedRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl PreparedRequest {
    #[must_use]
    pub fn new(method: HttpMethod, url: Url) -> Self {
        Self {
            method,
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// Returns the first header value with the given name (case-insensitive).
    #[must_use]
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

// Login URLs carry the password in the query string and every authenticated
// request carries the session cookie, so neither is printed.
impl fmt::Debug for PreparedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreparedRequest")
            .field("method", &self.method)
            .field("url", &redact_url(&self.url))
            .field(
                "headers",
                &self.headers.iter().map(|(k, _)| k).collect::<Vec<_>>(),
            )
            .field("body_len", &self.body.as_ref().map(Vec::len))
            .finish()
    }
}

/// A completed response with the body fully buffered as raw bytes.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RawResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Errors raised while moving bytes over the wire.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection, TLS, or protocol failure.
    #[error("network error calling {endpoint}: {source}")]
    Network {
        /// Endpoint without its query string.
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// Request did not finish within the configured timeout.
    #[error("timeout calling {endpoint}")]
    Timeout {
        /// Endpoint without its query string.
        endpoint: String,
    },

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client construction failed: {reason}")]
    ClientBuild {
        /// Human-readable cause.
        reason: String,
    },
}

impl TransportError {
    /// Classifies a `reqwest` error, keeping timeouts distinct.
    pub fn from_reqwest(url: &Url, source: reqwest::Error) -> Self {
        let endpoint = redact_url(url);
        if source.is_timeout() {
            Self::Timeout { endpoint }
        } else {
            Self::Network { endpoint, source }
        }
    }
}

/// Sends prepared requests.
///
/// Implementations own timeouts, TLS policy, and cancellation. One call is one
/// network attempt.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: PreparedRequest) -> Result<RawResponse, TransportError>;
}

/// Timeouts and identification for [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: CONNECT_TIMEOUT_SECS,
            read_timeout_secs: READ_TIMEOUT_SECS,
            user_agent: user_agent::default_user_agent(),
        }
    }
}

/// `reqwest`-backed [`Transport`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Builds a transport.
    ///
    /// `allow_self_signed` disables certificate validation; NAS boxes commonly
    /// serve self-signed certificates.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::ClientBuild`] when the client cannot be built.
    pub fn new(config: &ClientConfig, allow_self_signed: bool) -> Result<Self, TransportError> {
        let client = match try_build_client(config, allow_self_signed, false) {
            Ok(client) => client,
            Err(BuildClientFailure::Panic) => {
                // Some sandboxed macOS environments panic when querying system
                // proxy settings; retry with env-only proxy lookup.
                warn!("HTTP client hit system proxy panic; using env-proxy fallback builder");
                match try_build_client(config, allow_self_signed, true) {
                    Ok(client) => client,
                    Err(BuildClientFailure::Panic) => {
                        return Err(TransportError::ClientBuild {
                            reason: "client construction panicked".to_string(),
                        });
                    }
                    Err(BuildClientFailure::Build(error)) => {
                        return Err(TransportError::ClientBuild {
                            reason: error.to_string(),
                        });
                    }
                }
            }
            Err(BuildClientFailure::Build(error)) => {
                return Err(TransportError::ClientBuild {
                    reason: error.to_string(),
                });
            }
        };
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: PreparedRequest) -> Result<RawResponse, TransportError> {
        let PreparedRequest {
            method,
            url,
            headers,
            body,
        } = request;
        debug!(%method, endpoint = %redact_url(&url), "sending request");

        let mut builder = match method {
            HttpMethod::Get => self.client.get(url.clone()),
            HttpMethod::Post => self.client.post(url.clone()),
            HttpMethod::Put => self.client.put(url.clone()),
        };
        for (name, value) in headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(&url, e))?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::from_reqwest(&url, e))?
            .to_vec();
        debug!(status, bytes = body.len(), "response received");

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

enum BuildClientFailure {
    Panic,
    Build(reqwest::Error),
}

fn try_build_client(
    config: &ClientConfig,
    allow_self_signed: bool,
    disable_system_proxy_lookup: bool,
) -> Result<Client, BuildClientFailure> {
    let config = config.clone();
    catch_unwind(AssertUnwindSafe(move || {
        let mut builder = base_builder(&config, allow_self_signed);
        if disable_system_proxy_lookup {
            builder = apply_env_proxy_fallback(builder.no_proxy());
        }
        builder.build().map_err(BuildClientFailure::Build)
    }))
    .map_err(|_| BuildClientFailure::Panic)?
}

fn base_builder(config: &ClientConfig, allow_self_signed: bool) -> ClientBuilder {
    Client::builder()
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .timeout(Duration::from_secs(config.read_timeout_secs))
        .user_agent(config.user_agent.clone())
        .danger_accept_invalid_certs(allow_self_signed)
        .gzip(true)
}

fn apply_env_proxy_fallback(mut builder: ClientBuilder) -> ClientBuilder {
    if let Some(proxy) = env_proxy_for_scheme("https")
        && let Ok(resolved) = Proxy::https(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    if let Some(proxy) = env_proxy_for_scheme("http")
        && let Ok(resolved) = Proxy::http(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    builder
}

fn env_proxy_for_scheme(scheme: &str) -> Option<String> {
    let names: &[&str] = match scheme {
        "https" => &["HTTPS_PROXY", "https_proxy", "ALL_PROXY", "all_proxy"],
        "http" => &["HTTP_PROXY", "http_proxy", "ALL_PROXY", "all_proxy"],
        _ => return None,
    };
    names.iter().find_map(|name| {
        std::env::var(name)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

/// Joins an endpoint path onto a NAS base URL.
///
/// Trailing slashes on the base are ignored, so `http://nas:5000/` and
/// `http://nas:5000` behave the same. Returns `None` when the result is not a
/// valid absolute URL.
#[must_use]
pub fn endpoint_url(base_url: &str, path: &str) -> Option<Url> {
    let base = base_url.trim().trim_end_matches('/');
    if base.is_empty() {
        return None;
    }
    Url::parse(&format!("{base}{path}"))
        .ok()
        .filter(|url| url.has_host())
}

/// Renders a URL without its query string or fragment.
#[must_use]
pub fn redact_url(url: &Url) -> String {
    let mut stripped = url.clone();
    stripped.set_query(None);
    stripped.set_fragment(None);
    stripped.to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_url_drops_query() {
        let url = Url::parse("https://nas:5001/webapi/auth.cgi?account=me&passwd=secret").unwrap();
        let redacted = redact_url(&url);
        assert_eq!(redacted, "https://nas:5001/webapi/auth.cgi");
        assert!(!redacted.contains("secret"));
    }

    #[test]
    fn test_endpoint_url_ignores_trailing_slash() {
        let with = endpoint_url("http://nas:5000/", "/webapi/auth.cgi").unwrap();
        let without = endpoint_url("http://nas:5000", "/webapi/auth.cgi").unwrap();
        assert_eq!(with, without);
        assert_eq!(with.as_str(), "http://nas:5000/webapi/auth.cgi");
    }

    #[test]
    fn test_endpoint_url_rejects_garbage() {
        assert!(endpoint_url("", "/x").is_none());
        assert!(endpoint_url("nas-without-scheme", "/x").is_none());
    }

    #[test]
    fn test_prepared_request_debug_hides_secrets() {
        let url = Url::parse("http://nas/webapi/auth.cgi?passwd=hunter2").unwrap();
        let request = PreparedRequest::new(HttpMethod::Get, url).header("Cookie", "id=sid-123");
        let rendered = format!("{request:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("sid-123"));
        assert!(rendered.contains("Cookie"));
    }

    #[test]
    fn test_header_value_is_case_insensitive() {
        let url = Url::parse("http://nas/").unwrap();
        let request = PreparedRequest::new(HttpMethod::Post, url).header("Accept", "*/*");
        assert_eq!(request.header_value("accept"), Some("*/*"));
        assert_eq!(request.header_value("content-type"), None);
    }

    #[test]
    fn test_default_client_config_uses_constants() {
        let config = ClientConfig::default();
        assert_eq!(config.connect_timeout_secs, CONNECT_TIMEOUT_SECS);
        assert_eq!(config.read_timeout_secs, READ_TIMEOUT_SECS);
        assert!(config.user_agent.starts_with("syno-drive/"));
    }

    #[test]
    fn test_http_transport_builds_with_self_signed_allowed() {
        assert!(HttpTransport::new(&ClientConfig::default(), true).is_ok());
    }
}

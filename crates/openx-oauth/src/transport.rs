//! Blocking HTTP transport shared by the orchestrator, bridge and gateway.
//!
//! Automatic redirects are disabled on the underlying client; the transport
//! follows them itself according to [`RedirectPolicy`], so a 302 answering the
//! SSO login POST is honored.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, LOCATION};
use reqwest::{Method, StatusCode};
use url::Url;

use crate::error::{OAuthError, Result, Stage};
use crate::query::encode_form;
use crate::redirect::RedirectPolicy;
use crate::session::SessionCookie;

/// Default limit on followed redirects.
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Outbound proxy settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
    pub scheme: String,
}

impl ProxyConfig {
    /// An `http` proxy at `host:port`.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            scheme: "http".to_string(),
        }
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    pub fn url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }
}

/// Configuration for the HTTP transport. Fixed once the transport is built.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Proxy applied to every request.
    pub proxy: Option<ProxyConfig>,
    /// Accept any certificate chain and any hostname.
    ///
    /// This disables TLS authentication of the server for the lifetime of
    /// the transport. Only meant for environments with self-signed
    /// certificates.
    pub insecure_tls: bool,
    /// Per-request timeout; `None` keeps the HTTP client's default.
    pub timeout: Option<Duration>,
    /// Maximum number of redirects followed per request.
    pub max_redirects: usize,
    /// Custom user agent.
    pub user_agent: Option<String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            proxy: None,
            insecure_tls: false,
            timeout: None,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            user_agent: None,
        }
    }
}

impl TransportConfig {
    pub fn with_proxy(mut self, proxy: ProxyConfig) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Opt in to accepting invalid certificates and hostnames.
    pub fn with_insecure_tls(mut self, insecure: bool) -> Self {
        self.insecure_tls = insecure;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }
}

/// Request body variants the OpenX endpoints accept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// `application/x-www-form-urlencoded` pairs.
    Form(Vec<(String, String)>),
    /// Raw `application/json` payload.
    Json(String),
}

/// A request ready to be sent.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
    pub cookie: Option<SessionCookie>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
            cookie: None,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn form(mut self, pairs: Vec<(String, String)>) -> Self {
        self.body = Some(RequestBody::Form(pairs));
        self
    }

    pub fn json(mut self, payload: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Json(payload.into()));
        self
    }

    pub fn cookie(mut self, cookie: SessionCookie) -> Self {
        self.cookie = Some(cookie);
        self
    }
}

/// A fully-read response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    /// URL of the final request after redirects.
    pub url: Url,
    pub body: String,
}

impl HttpResponse {
    /// The OpenX endpoints signal success with exactly 200.
    pub fn is_ok(&self) -> bool {
        self.status == StatusCode::OK
    }
}

/// Blocking HTTP transport.
#[derive(Debug, Clone)]
pub struct Transport {
    client: Arc<reqwest::blocking::Client>,
    policy: RedirectPolicy,
    max_redirects: usize,
}

impl Transport {
    /// Build the transport. Proxy and TLS settings are fixed from here on.
    pub fn new(config: &TransportConfig) -> Result<Self> {
        let user_agent = config
            .user_agent
            .clone()
            .unwrap_or_else(|| format!("openx-oauth/{}", env!("CARGO_PKG_VERSION")));

        let mut builder = reqwest::blocking::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(user_agent);

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        // Only the configured proxy is used; environment proxies are ignored.
        builder = match &config.proxy {
            Some(proxy) => builder.proxy(reqwest::Proxy::all(proxy.url()).map_err(|e| {
                OAuthError::config(format!("invalid proxy '{}': {}", proxy.url(), e))
            })?),
            None => builder.no_proxy(),
        };

        if config.insecure_tls {
            tracing::warn!(
                "TLS certificate and hostname verification disabled for this transport"
            );
            builder = builder
                .danger_accept_invalid_certs(true)
                .danger_accept_invalid_hostnames(true);
        }

        let client = builder
            .build()
            .map_err(|e| OAuthError::config(format!("failed to build HTTP client: {}", e)))?;

        tracing::debug!(
            proxy = ?config.proxy.as_ref().map(|p| p.url()),
            insecure_tls = config.insecure_tls,
            max_redirects = config.max_redirects,
            "created HTTP transport"
        );

        Ok(Self {
            client: Arc::new(client),
            policy: RedirectPolicy,
            max_redirects: config.max_redirects,
        })
    }

    /// Send `request`, following redirects the policy allows.
    ///
    /// Network failures become [`OAuthError::Transport`] tagged with `stage`.
    /// Any status, including errors, is returned as a response.
    pub fn send(&self, stage: Stage, request: HttpRequest) -> Result<HttpResponse> {
        let mut url = Url::parse(&request.url)
            .map_err(|e| OAuthError::config(format!("invalid URL '{}': {}", request.url, e)))?;
        let origin_host = url.host_str().map(str::to_string);
        let mut method = request.method.clone();
        let mut body = request.body.clone();

        for _ in 0..=self.max_redirects {
            let same_host = url.host_str().map(str::to_string) == origin_host;
            let mut builder = self.client.request(method.clone(), url.clone());

            for (name, value) in &request.headers {
                // Credentials do not travel to another host.
                if !same_host && name.eq_ignore_ascii_case(AUTHORIZATION.as_str()) {
                    continue;
                }
                builder = builder.header(name.as_str(), value.as_str());
            }

            if let Some(cookie) = request.cookie.as_ref().filter(|c| c.matches(&url)) {
                builder = builder.header(COOKIE, cookie.header_value());
            }

            builder = match &body {
                Some(RequestBody::Form(pairs)) => builder
                    .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(encode_form(pairs)),
                Some(RequestBody::Json(payload)) => builder
                    .header(CONTENT_TYPE, "application/json")
                    .body(payload.clone()),
                None => builder,
            };

            tracing::debug!(%stage, %method, %url, "sending request");

            let response = builder
                .send()
                .map_err(|e| OAuthError::transport(stage, e))?;
            let status = response.status();
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);

            if self
                .policy
                .is_redirected(&method, status, location.is_some())
            {
                if let Some(location) = location {
                    let next = url.join(&location).map_err(|e| {
                        OAuthError::config(format!("invalid redirect location '{}': {}", location, e))
                    })?;
                    let next_method = self.policy.redirect_method(&method, status);
                    if next_method != method {
                        body = None;
                    }
                    tracing::debug!(%stage, %status, from = %url, to = %next, "following redirect");
                    url = next;
                    method = next_method;
                    continue;
                }
            }

            let text = response
                .text()
                .map_err(|e| OAuthError::transport(stage, e))?;
            tracing::debug!(%stage, %status, bytes = text.len(), "received response");

            return Ok(HttpResponse {
                status,
                url,
                body: text,
            });
        }

        Err(OAuthError::TooManyRedirects {
            stage,
            limit: self.max_redirects,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proxy_url() {
        let proxy = ProxyConfig::new("proxy.local", 3128);
        assert_eq!(proxy.url(), "http://proxy.local:3128");
        let proxy = proxy.with_scheme("https");
        assert_eq!(proxy.url(), "https://proxy.local:3128");
    }

    #[test]
    fn test_config_defaults() {
        let config = TransportConfig::default();
        assert!(!config.insecure_tls);
        assert!(config.proxy.is_none());
        assert_eq!(config.max_redirects, DEFAULT_MAX_REDIRECTS);
    }

    #[test]
    fn test_build_with_proxy_and_insecure_tls() {
        let config = TransportConfig::default()
            .with_proxy(ProxyConfig::new("127.0.0.1", 3128))
            .with_insecure_tls(true)
            .with_timeout(Duration::from_secs(5));
        assert!(Transport::new(&config).is_ok());
    }

    #[test]
    fn test_invalid_url_is_config_error() {
        let transport = Transport::new(&TransportConfig::default()).unwrap();
        let err = transport
            .send(Stage::ApiCall, HttpRequest::new(Method::GET, "no scheme here"))
            .unwrap_err();
        assert!(matches!(err, OAuthError::Configuration(_)));
    }

    #[test]
    fn test_request_builder() {
        let request = HttpRequest::new(Method::POST, "http://example.com/login")
            .header("X-Test", "1")
            .form(vec![("email".to_string(), "a@b.c".to_string())]);
        assert_eq!(request.headers.len(), 1);
        assert!(matches!(request.body, Some(RequestBody::Form(_))));
        assert!(request.cookie.is_none());
    }
}

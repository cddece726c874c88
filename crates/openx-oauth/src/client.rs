//! The assembled OpenX client: orchestrator plus SSO bridge.

use std::time::Duration;

use crate::api::{ApiPath, OpenXApi, check_http_url};
use crate::error::{OAuthError, Result};
use crate::gateway::ApiGateway;
use crate::params::OUT_OF_BAND;
use crate::service::OAuthService;
use crate::session::SessionCookie;
use crate::sso::{LoginCredentials, SsoBridge};
use crate::token::Token;
use crate::transport::{ProxyConfig, Transport, TransportConfig};

/// An OpenX API client that authenticates through the SSO login endpoint.
///
/// ```no_run
/// use openx_oauth::OpenXClient;
///
/// let mut client = OpenXClient::builder()
///     .api_key("key")
///     .api_secret("secret")
///     .login_url("https://sso.openx.com/login/process")
///     .credentials("user@example.com", "password")
///     .domain("https://api.example.com")
///     .request_token_url("https://sso.openx.com/api/index/initiate")
///     .access_token_url("https://sso.openx.com/api/index/token")
///     .authorize_url("https://sso.openx.com/login/process")
///     .build()?;
///
/// client.authenticate()?;
/// let accounts = client.gateway()?.get_objects("account")?;
/// # Ok::<(), openx_oauth::OAuthError>(())
/// ```
#[derive(Debug)]
pub struct OpenXClient {
    service: OAuthService,
    bridge: SsoBridge,
}

impl OpenXClient {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Run the login sequence; see [`SsoBridge::authenticate`].
    pub fn authenticate(&mut self) -> Result<()> {
        self.bridge.authenticate(&self.service)
    }

    /// Whether a validated session is held.
    pub fn is_authenticated(&self) -> bool {
        self.bridge.state().is_validated()
    }

    pub fn access_token(&self) -> Option<&Token> {
        self.bridge.state().access_token()
    }

    pub fn session_cookie(&mut self) -> Result<&SessionCookie> {
        self.bridge.session_cookie()
    }

    /// Gateway for API calls. Fails with `NotAuthenticated` before login.
    pub fn gateway(&mut self) -> Result<ApiGateway> {
        self.bridge.gateway()
    }

    pub fn service(&self) -> &OAuthService {
        &self.service
    }

    pub fn bridge(&self) -> &SsoBridge {
        &self.bridge
    }
}

/// Builder for [`OpenXClient`].
#[derive(Debug, Default)]
pub struct ClientBuilder {
    api_key: Option<String>,
    api_secret: Option<String>,
    login_url: Option<String>,
    email: Option<String>,
    password: Option<String>,
    domain: Option<String>,
    path: Option<String>,
    request_token_url: Option<String>,
    access_token_url: Option<String>,
    authorize_url: Option<String>,
    callback: Option<String>,
    scope: Option<String>,
    proxy: Option<ProxyConfig>,
    insecure_tls: bool,
    timeout: Option<Duration>,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn api_secret(mut self, secret: impl Into<String>) -> Self {
        self.api_secret = Some(secret.into());
        self
    }

    /// SSO login endpoint that authorizes request tokens.
    pub fn login_url(mut self, url: impl Into<String>) -> Self {
        self.login_url = Some(url.into());
        self
    }

    pub fn credentials(mut self, email: impl Into<String>, password: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self.password = Some(password.into());
        self
    }

    /// API origin, e.g. `https://api.example.com`.
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// API path prefix; `/ox/4.0/` when unset.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn request_token_url(mut self, url: impl Into<String>) -> Self {
        self.request_token_url = Some(url.into());
        self
    }

    pub fn access_token_url(mut self, url: impl Into<String>) -> Self {
        self.access_token_url = Some(url.into());
        self
    }

    pub fn authorize_url(mut self, url: impl Into<String>) -> Self {
        self.authorize_url = Some(url.into());
        self
    }

    pub fn callback(mut self, callback: impl Into<String>) -> Self {
        self.callback = Some(callback.into());
        self
    }

    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn proxy(mut self, proxy: ProxyConfig) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Disable TLS certificate and hostname checks for every request.
    pub fn insecure_tls(mut self, insecure: bool) -> Self {
        self.insecure_tls = insecure;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Validate and assemble. No network traffic happens here.
    pub fn build(self) -> Result<OpenXClient> {
        let login_url = required(self.login_url, "login URL")?;
        check_http_url("login URL", &login_url)?;

        let email = required(self.email, "login email")?;
        let password = required(self.password, "login password")?;

        let domain = required(self.domain, "API domain")?;
        check_http_url("API domain", &domain)?;
        let domain = domain.trim_end_matches('/').to_string();

        let path = match self.path {
            Some(path) => path.parse::<ApiPath>()?,
            None => ApiPath::default(),
        };

        let api = OpenXApi::new(
            required(self.request_token_url, "request token URL")?,
            required(self.access_token_url, "access token URL")?,
            self.authorize_url.unwrap_or_default(),
        );

        let mut transport_config = TransportConfig::default().with_insecure_tls(self.insecure_tls);
        if let Some(proxy) = self.proxy {
            transport_config = transport_config.with_proxy(proxy);
        }
        if let Some(timeout) = self.timeout {
            transport_config = transport_config.with_timeout(timeout);
        }
        let transport = Transport::new(&transport_config)?;

        let mut service = OAuthService::builder()
            .provider(api)
            .api_key(self.api_key.unwrap_or_default())
            .api_secret(self.api_secret.unwrap_or_default())
            .callback(self.callback.unwrap_or_else(|| OUT_OF_BAND.to_string()))
            .transport(transport.clone());
        if let Some(scope) = self.scope {
            service = service.scope(scope);
        }
        let service = service.build()?;

        let bridge = SsoBridge::new(
            transport,
            login_url,
            LoginCredentials::new(email, password),
            domain,
            path,
        );

        tracing::debug!(domain = %bridge.domain(), path = %bridge.path(), "built OpenX client");
        Ok(OpenXClient { service, bridge })
    }
}

fn required(value: Option<String>, name: &str) -> Result<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| OAuthError::config(format!("missing {}", name)))
}

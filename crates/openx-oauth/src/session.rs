//! Session cookie and the per-bridge session state.

use url::Url;

use crate::token::Token;

/// Name of the cookie the OpenX API authenticates with.
pub const SESSION_COOKIE_NAME: &str = "openx3_access_token";

/// Cookie binding one access token to one API domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie {
    value: String,
    domain: String,
    path: String,
}

impl SessionCookie {
    /// Cookie for `token_value`, scoped to `domain` with its scheme stripped.
    pub fn new(domain: &str, token_value: impl Into<String>) -> Self {
        let stripped = domain
            .trim_start_matches("http://")
            .trim_start_matches("https://")
            .trim_end_matches('/');
        Self {
            value: token_value.into(),
            domain: stripped.to_string(),
            path: "/".to_string(),
        }
    }

    pub fn name(&self) -> &str {
        SESSION_COOKIE_NAME
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// `name=value`, as sent in a `Cookie` header.
    pub fn header_value(&self) -> String {
        format!("{}={}", SESSION_COOKIE_NAME, self.value)
    }

    /// Whether the cookie applies to a request for `url`.
    ///
    /// Cookie domains carry no port, so only the host part is compared.
    pub fn matches(&self, url: &Url) -> bool {
        let cookie_host = self.host();
        let host_matches = url
            .host_str()
            .is_some_and(|host| host.eq_ignore_ascii_case(&cookie_host));
        host_matches && url.path().starts_with(&self.path)
    }

    /// Domain without port, in the form `Url::host_str` reports it
    /// (IPv6 literals keep their brackets).
    fn host(&self) -> String {
        Url::parse(&format!("http://{}", self.domain))
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| self.domain.clone())
    }
}

/// Where one bridge is in the login sequence.
#[derive(Debug, Clone, Default)]
pub enum SessionState {
    /// Nothing obtained yet, or the last attempt failed.
    #[default]
    Uninitialized,
    /// Holding an unauthorized request token.
    RequestToken(Token),
    /// Holding an access token; the cookie is created on first use.
    Authorized {
        access_token: Token,
        cookie: Option<SessionCookie>,
        validated: bool,
    },
}

impl SessionState {
    pub fn access_token(&self) -> Option<&Token> {
        match self {
            SessionState::Authorized { access_token, .. } => Some(access_token),
            _ => None,
        }
    }

    pub fn cookie(&self) -> Option<&SessionCookie> {
        match self {
            SessionState::Authorized { cookie, .. } => cookie.as_ref(),
            _ => None,
        }
    }

    pub fn is_validated(&self) -> bool {
        matches!(
            self,
            SessionState::Authorized {
                validated: true,
                ..
            }
        )
    }

    /// The cached cookie, created for `domain` on first call.
    ///
    /// `None` unless an access token is held.
    pub(crate) fn cookie_or_create(&mut self, domain: &str) -> Option<&SessionCookie> {
        match self {
            SessionState::Authorized {
                access_token,
                cookie,
                ..
            } => Some(cookie.get_or_insert_with(|| {
                tracing::debug!(domain, "creating session cookie");
                SessionCookie::new(domain, access_token.value())
            })),
            _ => None,
        }
    }
}

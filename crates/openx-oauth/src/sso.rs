//! SSO session bridge.
//!
//! The OpenX SSO server authorizes a request token when the user's email and
//! password are posted together with it; the response carries the verifier.
//! The resulting access token is then presented to the API as the
//! `openx3_access_token` cookie.
//!
//! The sequence is strictly ordered and never retried:
//!
//! 1. login with the unauthorized request token
//! 2. parse the verifier out of the login response
//! 3. exchange request token + verifier for an access token
//! 4. create the session cookie
//! 5. validate the session (legacy API path only)

use std::fmt;

use reqwest::{Method, StatusCode};

use crate::api::ApiPath;
use crate::error::{OAuthError, Result, Stage};
use crate::gateway::ApiGateway;
use crate::params::{TOKEN, VERIFIER};
use crate::query::split_query_string;
use crate::service::OAuthService;
use crate::session::{SessionCookie, SessionState};
use crate::token::{Token, Verifier};
use crate::transport::{HttpRequest, Transport};

/// SSO user credentials.
#[derive(Clone)]
pub struct LoginCredentials {
    email: String,
    password: String,
}

impl LoginCredentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Drives the SSO login and owns the resulting session state.
///
/// One bridge holds one session. For a fresh session, build a new bridge.
#[derive(Debug)]
pub struct SsoBridge {
    transport: Transport,
    login_url: String,
    credentials: LoginCredentials,
    domain: String,
    path: ApiPath,
    state: SessionState,
}

impl SsoBridge {
    /// `domain` is the API origin (`scheme://host[:port]`), without a path.
    pub fn new(
        transport: Transport,
        login_url: impl Into<String>,
        credentials: LoginCredentials,
        domain: impl Into<String>,
        path: ApiPath,
    ) -> Self {
        Self {
            transport,
            login_url: login_url.into(),
            credentials,
            domain: domain.into().trim_end_matches('/').to_string(),
            path,
            state: SessionState::Uninitialized,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn path(&self) -> ApiPath {
        self.path
    }

    /// Run the whole login sequence.
    ///
    /// On any failure the bridge is left without a session; the error's
    /// [`stage`](OAuthError::stage) names the failing step.
    pub fn authenticate(&mut self, service: &OAuthService) -> Result<()> {
        self.state = SessionState::Uninitialized;
        let result = self.run_sequence(service);
        if let Err(e) = &result {
            tracing::warn!(stage = ?e.stage(), error = %e, "SSO login sequence aborted");
            self.state = SessionState::Uninitialized;
        }
        result
    }

    fn run_sequence(&mut self, service: &OAuthService) -> Result<()> {
        tracing::info!("starting OAuth process");
        let request_token = service.get_request_token()?;
        self.state = SessionState::RequestToken(request_token.clone());

        let body = self.login(&request_token)?;
        let verifier = extract_verifier(&body)?;

        let access_token = service.get_access_token(&request_token, &verifier)?;
        self.establish_session(access_token)?;

        if let Some(status) = self.validation_status()? {
            if status != StatusCode::OK {
                return Err(OAuthError::SessionRejected {
                    status: status.as_u16(),
                });
            }
        }
        self.mark_validated();

        tracing::info!(domain = %self.domain, path = %self.path, "session established");
        Ok(())
    }

    /// Post the credentials and the unauthorized request token to the login
    /// endpoint; returns the response body.
    pub fn login(&self, request_token: &Token) -> Result<String> {
        tracing::info!(email = %self.credentials.email, "logging in to SSO");

        let request = HttpRequest::new(Method::POST, &self.login_url).form(vec![
            ("email".to_string(), self.credentials.email.clone()),
            ("password".to_string(), self.credentials.password.clone()),
            (TOKEN.to_string(), request_token.value().to_string()),
        ]);
        let response = self.transport.send(Stage::Login, request)?;

        if !response.is_ok() {
            return Err(OAuthError::LoginFailed {
                stage: Stage::Login,
                status: Some(response.status.as_u16()),
                reason: format!("login endpoint returned {}", response.status),
            });
        }
        if response.body.trim().is_empty() {
            return Err(OAuthError::LoginFailed {
                stage: Stage::Login,
                status: Some(response.status.as_u16()),
                reason: "login endpoint returned an empty body".to_string(),
            });
        }

        tracing::debug!(body = %response.body, "SSO login response");
        Ok(response.body)
    }

    /// Create (or reuse) the session cookie for `access_token`.
    pub fn establish_session(&mut self, access_token: Token) -> Result<&SessionCookie> {
        let already_bound = self
            .state
            .access_token()
            .is_some_and(|t| t.value() == access_token.value());
        if !already_bound {
            self.state = SessionState::Authorized {
                access_token,
                cookie: None,
                validated: false,
            };
        }
        self.session_cookie()
    }

    /// Check the session against the API.
    ///
    /// Only the legacy path needs a `PUT session/validate`; every other path
    /// is valid without a network call. `false` means the API answered with
    /// something other than 200.
    pub fn validate_session(&mut self) -> Result<bool> {
        let valid = match self.validation_status()? {
            Some(status) => status == StatusCode::OK,
            None => true,
        };
        if valid {
            self.mark_validated();
        }
        Ok(valid)
    }

    /// Status of the validation call, `None` when no call is needed.
    fn validation_status(&mut self) -> Result<Option<StatusCode>> {
        let cookie = self.session_cookie()?.clone();
        if !self.path.requires_validation() {
            return Ok(None);
        }

        let url = format!("{}{}session/validate", self.domain, self.path);
        tracing::info!(%url, "validating session");
        let response = self
            .transport
            .send(Stage::Validation, HttpRequest::new(Method::PUT, url).cookie(cookie))?;

        if !response.is_ok() {
            tracing::warn!(status = %response.status, "API could not verify the access token");
        }
        Ok(Some(response.status))
    }

    /// The cached cookie, created on first use. Requires an access token.
    pub fn session_cookie(&mut self) -> Result<&SessionCookie> {
        self.state
            .cookie_or_create(&self.domain)
            .ok_or(OAuthError::NotAuthenticated)
    }

    fn mark_validated(&mut self) {
        if let SessionState::Authorized { validated, .. } = &mut self.state {
            *validated = true;
        }
    }

    /// Gateway for authenticated API calls with this session's cookie.
    pub fn gateway(&mut self) -> Result<ApiGateway> {
        let cookie = self.session_cookie()?.clone();
        Ok(ApiGateway::new(
            self.transport.clone(),
            self.domain.clone(),
            self.path,
            cookie,
        ))
    }
}

/// Pull the verifier out of a login response body.
pub fn extract_verifier(body: &str) -> Result<Verifier> {
    let params = split_query_string(body);

    if let Some(token) = params.get(TOKEN) {
        tracing::debug!(%token, "token returned from login");
    }

    params
        .get(VERIFIER)
        .filter(|v| !v.is_empty())
        .map(|v| Verifier::new(v.clone()))
        .ok_or_else(|| OAuthError::LoginFailed {
            stage: Stage::Verifier,
            status: None,
            reason: format!("no {} in login response: '{}'", VERIFIER, body.trim()),
        })
}

//! Endpoint descriptors: the OAuth server and the API path prefix.

use std::fmt;
use std::str::FromStr;

use reqwest::Method;
use url::Url;

use crate::error::{OAuthError, Result};
use crate::query::percent_encode;
use crate::token::Token;

/// Placeholder for the request token in an authorize URL template.
const TOKEN_PLACEHOLDER: &str = "%s";

/// Token endpoints and verbs of the OAuth server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenXApi {
    request_token_url: String,
    access_token_url: String,
    authorize_url: String,
    request_token_verb: Method,
    access_token_verb: Method,
}

impl OpenXApi {
    /// Both token endpoints default to POST.
    pub fn new(
        request_token_url: impl Into<String>,
        access_token_url: impl Into<String>,
        authorize_url: impl Into<String>,
    ) -> Self {
        Self {
            request_token_url: request_token_url.into(),
            access_token_url: access_token_url.into(),
            authorize_url: authorize_url.into(),
            request_token_verb: Method::POST,
            access_token_verb: Method::POST,
        }
    }

    pub fn with_request_token_verb(mut self, verb: Method) -> Self {
        self.request_token_verb = verb;
        self
    }

    pub fn with_access_token_verb(mut self, verb: Method) -> Self {
        self.access_token_verb = verb;
        self
    }

    pub fn request_token_endpoint(&self) -> &str {
        &self.request_token_url
    }

    pub fn access_token_endpoint(&self) -> &str {
        &self.access_token_url
    }

    pub fn authorize_url(&self) -> &str {
        &self.authorize_url
    }

    pub fn request_token_verb(&self) -> &Method {
        &self.request_token_verb
    }

    pub fn access_token_verb(&self) -> &Method {
        &self.access_token_verb
    }

    /// Where a user authorizes `request_token`.
    ///
    /// A `%s` in the template is replaced by the token; otherwise the token
    /// is appended as the `oauth_token` query parameter.
    pub fn authorization_url(&self, request_token: &Token) -> String {
        let token = percent_encode(request_token.value());
        if self.authorize_url.contains(TOKEN_PLACEHOLDER) {
            self.authorize_url.replacen(TOKEN_PLACEHOLDER, &token, 1)
        } else {
            let separator = if self.authorize_url.contains('?') { '&' } else { '?' };
            format!("{}{}oauth_token={}", self.authorize_url, separator, token)
        }
    }

    /// Check that both token endpoints are absolute http(s) URLs.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("request token URL", &self.request_token_url),
            ("access token URL", &self.access_token_url),
        ] {
            check_http_url(name, value)?;
        }
        Ok(())
    }
}

/// API path prefix. Only the two published versions are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiPath {
    /// Legacy `/ox/3.0/a/`; sessions need an explicit validation call.
    V1,
    /// `/ox/4.0/`.
    #[default]
    V2,
}

impl ApiPath {
    pub const V1_PATH: &'static str = "/ox/3.0/a/";
    pub const V2_PATH: &'static str = "/ox/4.0/";

    pub fn as_str(&self) -> &'static str {
        match self {
            ApiPath::V1 => Self::V1_PATH,
            ApiPath::V2 => Self::V2_PATH,
        }
    }

    /// Whether a new session must be confirmed with `PUT session/validate`.
    pub fn requires_validation(&self) -> bool {
        matches!(self, ApiPath::V1)
    }
}

impl FromStr for ApiPath {
    type Err = OAuthError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            Self::V1_PATH => Ok(ApiPath::V1),
            Self::V2_PATH => Ok(ApiPath::V2),
            other => Err(OAuthError::config(format!(
                "unsupported API path '{}'; expected '{}' or '{}'",
                other,
                Self::V1_PATH,
                Self::V2_PATH
            ))),
        }
    }
}

impl fmt::Display for ApiPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub(crate) fn check_http_url(name: &str, value: &str) -> Result<Url> {
    let url = Url::parse(value)
        .map_err(|e| OAuthError::config(format!("invalid {} '{}': {}", name, value, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(OAuthError::config(format!(
            "{} must use http or https, got '{}'",
            name, other
        ))),
    }
}

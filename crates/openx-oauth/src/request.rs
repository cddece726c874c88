//! A request under construction for OAuth signing.

use std::fmt;

use reqwest::Method;

use crate::error::Result;
use crate::params::OAuthParameters;
use crate::transport::HttpRequest;

/// Verb, URL, protocol parameters, body parameters and headers of one call.
///
/// Built fresh for every signing operation: nonce and timestamp must differ
/// between requests.
#[derive(Debug, Clone)]
pub struct SignedRequest {
    verb: Method,
    url: String,
    oauth_params: OAuthParameters,
    body_params: Vec<(String, String)>,
    headers: Vec<(String, String)>,
}

impl SignedRequest {
    pub fn new(verb: Method, url: impl Into<String>) -> Self {
        Self {
            verb,
            url: url.into(),
            oauth_params: OAuthParameters::new(),
            body_params: Vec::new(),
            headers: Vec::new(),
        }
    }

    pub fn verb(&self) -> &Method {
        &self.verb
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Add a protocol parameter; non-protocol names are rejected.
    pub fn add_oauth_parameter(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        self.oauth_params.add_parameter(name, value)
    }

    pub fn remove_oauth_parameter(&mut self, name: &str) -> Option<String> {
        self.oauth_params.remove_parameter(name)
    }

    pub fn oauth_parameters(&self) -> &OAuthParameters {
        &self.oauth_params
    }

    /// Add a form body parameter.
    pub fn add_body_parameter(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.body_params.push((name.into(), value.into()));
    }

    pub fn body_parameters(&self) -> &[(String, String)] {
        &self.body_params
    }

    /// Set a header, replacing any existing value (names are case-insensitive).
    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(&name))
        {
            Some(entry) => entry.1 = value,
            None => self.headers.push((name, value)),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Protocol plus body parameters, as fed to the signature base string.
    pub(crate) fn signing_parameters(&self) -> Vec<(String, String)> {
        self.oauth_params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .chain(self.body_params.iter().cloned())
            .collect()
    }

    /// Convert into a transport request; body parameters become a form body.
    pub fn into_http(self) -> HttpRequest {
        let mut request = HttpRequest::new(self.verb, self.url);
        request.headers = self.headers;
        if !self.body_params.is_empty() {
            request = request.form(self.body_params);
        }
        request
    }
}

impl fmt::Display for SignedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@SignedRequest({}, {})", self.verb, self.url)
    }
}

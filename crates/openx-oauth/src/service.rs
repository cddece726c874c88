//! OAuth 1.0a token-exchange orchestrator.
//!
//! Drives the request-token and access-token legs of the three-legged
//! handshake and signs arbitrary requests with a held token.

use std::fmt;

use crate::api::{OpenXApi, check_http_url};
use crate::error::{OAuthError, Result, Stage};
use crate::params::{
    CALLBACK, CONSUMER_KEY, NONCE, OUT_OF_BAND, SCOPE, SIGNATURE, SIGNATURE_METHOD, TIMESTAMP,
    TOKEN, VERIFIER, VERSION,
};
use crate::request::SignedRequest;
use crate::signature::{HmacSha1Signature, SignatureService, SystemTimestamp, TimestampService};
use crate::token::{Token, TokenKind, Verifier, extract_token};
use crate::transport::{Transport, TransportConfig};

/// Protocol version sent on every request.
pub const OAUTH_VERSION: &str = "1.0";

/// Consumer credentials and callback. Immutable once built.
#[derive(Clone)]
pub struct OAuthConfig {
    api_key: String,
    api_secret: String,
    callback: String,
}

impl OAuthConfig {
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn api_secret(&self) -> &str {
        &self.api_secret
    }

    pub fn callback(&self) -> &str {
        &self.callback
    }
}

impl fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("callback", &self.callback)
            .finish()
    }
}

/// The token-exchange orchestrator.
#[derive(Debug)]
pub struct OAuthService {
    api: OpenXApi,
    config: OAuthConfig,
    scope: Option<String>,
    signer: Box<dyn SignatureService>,
    timestamps: Box<dyn TimestampService>,
    transport: Transport,
}

impl OAuthService {
    /// Create a new service builder.
    pub fn builder() -> ServiceBuilder {
        ServiceBuilder::new()
    }

    pub fn api(&self) -> &OpenXApi {
        &self.api
    }

    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    pub fn version(&self) -> &'static str {
        OAUTH_VERSION
    }

    /// Obtain an unauthorized request token.
    pub fn get_request_token(&self) -> Result<Token> {
        let mut request = SignedRequest::new(
            self.api.request_token_verb().clone(),
            self.api.request_token_endpoint(),
        );
        request.add_oauth_parameter(CALLBACK, self.config.callback.clone())?;
        self.add_oauth_params(&mut request, &Token::empty())?;
        self.add_oauth_header(&mut request)?;
        request.add_body_parameter(CALLBACK, self.config.callback.clone());

        tracing::debug!(%request, "requesting request token");
        let response = self
            .transport
            .send(Stage::RequestToken, request.into_http())?;
        let token = extract_token(TokenKind::Request, response.status.as_u16(), &response.body)?;

        tracing::info!(token = %token.value(), "obtained request token");
        Ok(token)
    }

    /// Redeem `request_token` plus `verifier` for an access token.
    pub fn get_access_token(&self, request_token: &Token, verifier: &Verifier) -> Result<Token> {
        let mut request = SignedRequest::new(
            self.api.access_token_verb().clone(),
            self.api.access_token_endpoint(),
        );
        request.add_oauth_parameter(TOKEN, request_token.value())?;
        request.add_oauth_parameter(VERIFIER, verifier.value())?;
        self.add_oauth_params(&mut request, request_token)?;
        self.add_oauth_header(&mut request)?;

        tracing::debug!(%request, "requesting access token");
        let response = self
            .transport
            .send(Stage::AccessToken, request.into_http())?;
        let token = extract_token(TokenKind::Access, response.status.as_u16(), &response.body)?;

        tracing::info!("obtained access token");
        Ok(token)
    }

    /// Sign an outgoing request with `token` and attach the header.
    pub fn sign_request(&self, token: &Token, request: &mut SignedRequest) -> Result<()> {
        request.add_oauth_parameter(TOKEN, token.value())?;
        self.add_oauth_params(request, token)?;
        self.add_oauth_header(request)
    }

    /// URL a user would visit to authorize `request_token` interactively.
    pub fn authorization_url(&self, request_token: &Token) -> String {
        self.api.authorization_url(request_token)
    }

    /// Add timestamp, nonce, consumer key, method, version, scope and signature.
    ///
    /// The callback takes part in the signature and is removed afterwards.
    fn add_oauth_params(&self, request: &mut SignedRequest, token: &Token) -> Result<()> {
        request.add_oauth_parameter(TIMESTAMP, self.timestamps.timestamp_secs().to_string())?;
        // The API rejects negative nonces.
        let nonce = self.timestamps.nonce().unsigned_abs();
        request.add_oauth_parameter(NONCE, nonce.to_string())?;
        request.add_oauth_parameter(CONSUMER_KEY, self.config.api_key.clone())?;
        request.add_oauth_parameter(SIGNATURE_METHOD, self.signer.signature_method())?;
        request.add_oauth_parameter(VERSION, OAUTH_VERSION)?;
        if let Some(scope) = &self.scope {
            request.add_oauth_parameter(SCOPE, scope.clone())?;
        }

        // The base string never includes a signature.
        request.remove_oauth_parameter(SIGNATURE);
        let signature = self.signer.sign(
            request.verb().as_str(),
            request.url(),
            &request.signing_parameters(),
            &self.config.api_secret,
            token.secret(),
        )?;
        request.add_oauth_parameter(SIGNATURE, signature)?;

        request.remove_oauth_parameter(CALLBACK);
        Ok(())
    }

    fn add_oauth_header(&self, request: &mut SignedRequest) -> Result<()> {
        let header = request.oauth_parameters().extract_header()?;
        request.add_header("Authorization", header);
        Ok(())
    }
}

/// Builder for [`OAuthService`]. All validation happens in [`build`](Self::build).
#[derive(Debug)]
pub struct ServiceBuilder {
    api: Option<OpenXApi>,
    api_key: Option<String>,
    api_secret: Option<String>,
    callback: String,
    scope: Option<String>,
    signer: Option<Box<dyn SignatureService>>,
    timestamps: Option<Box<dyn TimestampService>>,
    transport: Option<Transport>,
}

impl ServiceBuilder {
    /// The callback defaults to out-of-band.
    pub fn new() -> Self {
        Self {
            api: None,
            api_key: None,
            api_secret: None,
            callback: OUT_OF_BAND.to_string(),
            scope: None,
            signer: None,
            timestamps: None,
            transport: None,
        }
    }

    pub fn provider(mut self, api: OpenXApi) -> Self {
        self.api = Some(api);
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn api_secret(mut self, secret: impl Into<String>) -> Self {
        self.api_secret = Some(secret.into());
        self
    }

    /// A valid URL, or `oob` for out-of-band.
    pub fn callback(mut self, callback: impl Into<String>) -> Self {
        self.callback = callback.into();
        self
    }

    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn signature_service(mut self, signer: impl SignatureService + 'static) -> Self {
        self.signer = Some(Box::new(signer));
        self
    }

    pub fn timestamp_service(mut self, timestamps: impl TimestampService + 'static) -> Self {
        self.timestamps = Some(Box::new(timestamps));
        self
    }

    /// Share an existing transport instead of building a default one.
    pub fn transport(mut self, transport: Transport) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Validate everything and build the service.
    pub fn build(self) -> Result<OAuthService> {
        let api = self.api.ok_or_else(|| {
            OAuthError::config("You must specify a valid api through the provider() method")
        })?;
        api.validate()?;

        let api_key = non_empty(self.api_key, "You must provide an api key")?;
        let api_secret = non_empty(self.api_secret, "You must provide an api secret")?;

        if self.callback != OUT_OF_BAND {
            check_http_url("callback", &self.callback).map_err(|_| {
                OAuthError::config(format!(
                    "Callback must be a valid URL or '{}', got '{}'",
                    OUT_OF_BAND, self.callback
                ))
            })?;
        }

        if self.scope.as_deref().is_some_and(|s| s.trim().is_empty()) {
            return Err(OAuthError::config("Invalid OAuth scope"));
        }

        let transport = match self.transport {
            Some(transport) => transport,
            None => Transport::new(&TransportConfig::default())?,
        };

        Ok(OAuthService {
            api,
            config: OAuthConfig {
                api_key,
                api_secret,
                callback: self.callback,
            },
            scope: self.scope,
            signer: self.signer.unwrap_or_else(|| Box::new(HmacSha1Signature)),
            timestamps: self.timestamps.unwrap_or_else(|| Box::new(SystemTimestamp)),
            transport,
        })
    }
}

impl Default for ServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn non_empty(value: Option<String>, msg: &str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(OAuthError::config(msg)),
    }
}

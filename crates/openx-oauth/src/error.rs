//! Error types for the OAuth handshake and session bridge.

use std::fmt;

use crate::token::TokenKind;

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, OAuthError>;

/// The step of the login sequence (or the API call) an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Obtaining the unauthorized request token.
    RequestToken,
    /// Posting credentials to the SSO login endpoint.
    Login,
    /// Parsing the verifier out of the login response.
    Verifier,
    /// Redeeming the request token for an access token.
    AccessToken,
    /// Validating the session cookie against the API.
    Validation,
    /// An authenticated API call.
    ApiCall,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::RequestToken => "request token",
            Stage::Login => "login",
            Stage::Verifier => "verifier parsing",
            Stage::AccessToken => "access token",
            Stage::Validation => "session validation",
            Stage::ApiCall => "api call",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while authenticating or calling the API.
#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    /// Invalid credentials, endpoints or options, detected at build time.
    #[error("Config error: {0}")]
    Configuration(String),

    /// A non-protocol parameter was added to a signed request.
    #[error("Invalid OAuth parameter: {0}")]
    Validation(String),

    /// Header formatting was attempted on an empty parameter set.
    #[error("Cannot build an OAuth header without parameters")]
    MissingParameters,

    /// The SSO login endpoint rejected the credentials or answered garbage.
    #[error("Login failed during {stage}: {reason}")]
    LoginFailed {
        stage: Stage,
        status: Option<u16>,
        reason: String,
    },

    /// A token endpoint response could not be turned into a token.
    #[error("Could not extract {kind} token (status {status}): {reason}")]
    TokenExtraction {
        kind: TokenKind,
        status: u16,
        reason: String,
    },

    /// The API refused the session cookie on validation.
    #[error("API rejected the access token on session validation (status {status})")]
    SessionRejected { status: u16 },

    /// An authenticated API call came back with a non-200 status.
    #[error("API call failed with status {status}")]
    ApiCall { status: u16, body: String },

    /// Network-level failure from the HTTP client.
    #[error("Network error during {stage}: {source}")]
    Transport {
        stage: Stage,
        #[source]
        source: reqwest::Error,
    },

    /// A redirect chain exceeded the hop limit.
    #[error("Too many redirects during {stage} (limit {limit})")]
    TooManyRedirects { stage: Stage, limit: usize },

    /// The gateway was requested before a session existed.
    #[error("No authenticated session; run the login sequence first")]
    NotAuthenticated,

    /// An API body could not be decoded.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl OAuthError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        OAuthError::Configuration(msg.into())
    }

    pub(crate) fn transport(stage: Stage, source: reqwest::Error) -> Self {
        OAuthError::Transport { stage, source }
    }

    /// The step that failed, if the error came from a network exchange.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            OAuthError::LoginFailed { stage, .. }
            | OAuthError::Transport { stage, .. }
            | OAuthError::TooManyRedirects { stage, .. } => Some(*stage),
            OAuthError::TokenExtraction { kind, .. } => Some(match kind {
                TokenKind::Request => Stage::RequestToken,
                TokenKind::Access => Stage::AccessToken,
            }),
            OAuthError::SessionRejected { .. } => Some(Stage::Validation),
            OAuthError::ApiCall { .. } => Some(Stage::ApiCall),
            _ => None,
        }
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            OAuthError::LoginFailed { status, .. } => *status,
            OAuthError::TokenExtraction { status, .. }
            | OAuthError::SessionRejected { status }
            | OAuthError::ApiCall { status, .. } => Some(*status),
            OAuthError::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

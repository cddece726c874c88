//! OAuth 1.0a tokens, verifiers and token-response extraction.

use std::fmt;

use crate::error::{OAuthError, Result};
use crate::query::split_query_string;

/// Which leg of the handshake produced a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Unauthorized request token.
    Request,
    /// Authorized access token.
    Access,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Request => f.write_str("request"),
            TokenKind::Access => f.write_str("access"),
        }
    }
}

/// A token/secret pair issued by the OAuth server.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    value: String,
    secret: String,
    raw_response: String,
}

impl Token {
    /// Build a token from its parts.
    pub fn new(value: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            secret: secret.into(),
            raw_response: String::new(),
        }
    }

    /// The sentinel used before any token exists.
    pub fn empty() -> Self {
        Self::new("", "")
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// The response body the token was extracted from (empty if built locally).
    pub fn raw_response(&self) -> &str {
        &self.raw_response
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty() && self.secret.is_empty()
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("value", &self.value)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// One-time code returned by the SSO login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verifier(String);

impl Verifier {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

/// Extract a token from a token endpoint response.
///
/// The body must be form-encoded and carry a non-empty `oauth_token`;
/// `oauth_token_secret` must be present but may be empty.
pub fn extract_token(kind: TokenKind, status: u16, body: &str) -> Result<Token> {
    let fail = |reason: String| OAuthError::TokenExtraction {
        kind,
        status,
        reason,
    };

    if !(200..300).contains(&status) {
        return Err(fail(format!("token endpoint answered: '{}'", body.trim())));
    }

    let params = split_query_string(body);
    let value = params
        .get("oauth_token")
        .filter(|v| !v.is_empty())
        .ok_or_else(|| fail(format!("no oauth_token in response: '{}'", body.trim())))?;
    let secret = params
        .get("oauth_token_secret")
        .ok_or_else(|| fail(format!("no oauth_token_secret in response: '{}'", body.trim())))?;

    Ok(Token {
        value: value.clone(),
        secret: secret.clone(),
        raw_response: body.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_token() {
        let token = extract_token(
            TokenKind::Request,
            200,
            "oauth_token=R1&oauth_token_secret=S1&oauth_callback_confirmed=true",
        )
        .unwrap();
        assert_eq!(token.value(), "R1");
        assert_eq!(token.secret(), "S1");
        assert!(token.raw_response().contains("oauth_callback_confirmed"));
    }

    #[test]
    fn test_extract_token_allows_empty_secret() {
        let token = extract_token(TokenKind::Access, 200, "oauth_token=A1&oauth_token_secret=")
            .unwrap();
        assert_eq!(token.value(), "A1");
        assert_eq!(token.secret(), "");
    }

    #[test]
    fn test_extract_token_rejects_error_status() {
        let err = extract_token(
            TokenKind::Request,
            401,
            "oauth_token=R1&oauth_token_secret=S1",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            OAuthError::TokenExtraction {
                kind: TokenKind::Request,
                status: 401,
                ..
            }
        ));
    }

    #[test]
    fn test_extract_token_rejects_garbage() {
        let err = extract_token(TokenKind::Access, 200, "<html>oops</html>").unwrap_err();
        assert!(matches!(err, OAuthError::TokenExtraction { .. }));

        let err = extract_token(TokenKind::Access, 200, "oauth_token=A1").unwrap_err();
        assert!(err.to_string().contains("oauth_token_secret"));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let token = Token::new("A1", "very-secret");
        let debug = format!("{:?}", token);
        assert!(debug.contains("A1"));
        assert!(!debug.contains("very-secret"));
    }

    #[test]
    fn test_empty_sentinel() {
        assert!(Token::empty().is_empty());
        assert!(!Token::new("x", "").is_empty());
    }
}

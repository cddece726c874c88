//! OAuth protocol parameter container and `Authorization` header rendering.

use crate::error::{OAuthError, Result};
use crate::query::percent_encode;

/// Prefix every protocol parameter name carries.
pub const OAUTH_PREFIX: &str = "oauth_";
/// Optional scope parameter, the only unprefixed name besides the realm.
pub const SCOPE: &str = "scope";
/// Realm parameter name. The server ignores it but it is still allowed.
pub const REALM: &str = "realm";

pub const CALLBACK: &str = "oauth_callback";
pub const CONSUMER_KEY: &str = "oauth_consumer_key";
pub const NONCE: &str = "oauth_nonce";
pub const SIGNATURE: &str = "oauth_signature";
pub const SIGNATURE_METHOD: &str = "oauth_signature_method";
pub const TIMESTAMP: &str = "oauth_timestamp";
pub const TOKEN: &str = "oauth_token";
pub const VERIFIER: &str = "oauth_verifier";
pub const VERSION: &str = "oauth_version";

/// Out-of-band callback value.
pub const OUT_OF_BAND: &str = "oob";

const HEADER_PREAMBLE: &str = "OAuth ";
const PARAM_SEPARATOR: &str = ", ";

/// Insertion-ordered set of OAuth parameters for a single request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OAuthParameters {
    entries: Vec<(String, String)>,
}

impl OAuthParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a protocol parameter.
    ///
    /// Names must start with `oauth_` or be `scope` / `realm`.
    pub fn add_parameter(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        check_name(name)?;
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| k == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name.to_string(), value)),
        }
        Ok(())
    }

    /// Remove a parameter, returning its value if it was present.
    pub fn remove_parameter(&mut self, name: &str) -> Option<String> {
        let idx = self.entries.iter().position(|(k, _)| k == name)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Render the set as an `Authorization` header value.
    ///
    /// `OAuth k1="v1", k2="v2"` in insertion order, values percent-encoded.
    pub fn extract_header(&self) -> Result<String> {
        if self.entries.is_empty() {
            return Err(OAuthError::MissingParameters);
        }

        let fields = self
            .entries
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", k, percent_encode(v)))
            .collect::<Vec<_>>()
            .join(PARAM_SEPARATOR);

        Ok(format!("{}{}", HEADER_PREAMBLE, fields))
    }
}

fn check_name(name: &str) -> Result<()> {
    if name.starts_with(OAUTH_PREFIX) || name == SCOPE || name == REALM {
        Ok(())
    } else {
        Err(OAuthError::Validation(format!(
            "OAuth parameters must either be '{}' or start with '{}', got '{}'",
            SCOPE, OAUTH_PREFIX, name
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_protocol_names() {
        let mut params = OAuthParameters::new();
        for name in ["email", "password", "oauth", "Oauth_token", "scopes", "", "x_oauth_y"] {
            let err = params.add_parameter(name, "v").unwrap_err();
            assert!(matches!(err, OAuthError::Validation(_)), "{name} accepted");
        }
        assert!(params.is_empty());
    }

    #[test]
    fn test_accepts_protocol_names() {
        let mut params = OAuthParameters::new();
        params.add_parameter(TOKEN, "t").unwrap();
        params.add_parameter(SCOPE, "s").unwrap();
        params.add_parameter(REALM, "r").unwrap();
        params.add_parameter("oauth_custom", "c").unwrap();
        assert_eq!(params.len(), 4);
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut params = OAuthParameters::new();
        params.add_parameter(TIMESTAMP, "1").unwrap();
        params.add_parameter(NONCE, "2").unwrap();
        params.add_parameter(TIMESTAMP, "3").unwrap();
        let keys: Vec<_> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![TIMESTAMP, NONCE]);
        assert_eq!(params.get(TIMESTAMP), Some("3"));
    }

    #[test]
    fn test_remove_parameter() {
        let mut params = OAuthParameters::new();
        params.add_parameter(CALLBACK, OUT_OF_BAND).unwrap();
        assert_eq!(params.remove_parameter(CALLBACK).as_deref(), Some("oob"));
        assert_eq!(params.remove_parameter(CALLBACK), None);
    }

    #[test]
    fn test_header_empty_fails() {
        let err = OAuthParameters::new().extract_header().unwrap_err();
        assert!(matches!(err, OAuthError::MissingParameters));
    }

    #[test]
    fn test_header_format() {
        let mut params = OAuthParameters::new();
        params.add_parameter(CONSUMER_KEY, "key").unwrap();
        params.add_parameter(SIGNATURE, "a+b/c=").unwrap();
        assert_eq!(
            params.extract_header().unwrap(),
            "OAuth oauth_consumer_key=\"key\", oauth_signature=\"a%2Bb%2Fc%3D\""
        );
    }

    #[test]
    fn test_header_idempotent() {
        let mut params = OAuthParameters::new();
        params.add_parameter(NONCE, "42").unwrap();
        params.add_parameter(VERSION, "1.0").unwrap();
        let first = params.extract_header().unwrap();
        let second = params.extract_header().unwrap();
        assert_eq!(first, second);
    }
}

//! Request signing and the timestamp/nonce source.
//!
//! The orchestrator only depends on the [`SignatureService`] and
//! [`TimestampService`] traits; [`HmacSha1Signature`] and [`SystemTimestamp`]
//! are the implementations used against the OpenX servers.

use base64::{Engine, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use rand::Rng;
use sha1::Sha1;
use url::Url;

use crate::error::{OAuthError, Result};
use crate::query::percent_encode;

type HmacSha1 = Hmac<Sha1>;

/// Computes the `oauth_signature` for a request.
pub trait SignatureService: Send + Sync + std::fmt::Debug {
    /// Value sent as `oauth_signature_method`.
    fn signature_method(&self) -> &'static str;

    /// Sign `verb url` with the given protocol and body parameters.
    ///
    /// `params` must not contain `oauth_signature`. Query parameters of `url`
    /// are part of the signed set.
    fn sign(
        &self,
        verb: &str,
        url: &str,
        params: &[(String, String)],
        consumer_secret: &str,
        token_secret: &str,
    ) -> Result<String>;
}

/// HMAC-SHA1 over the RFC 5849 signature base string.
#[derive(Debug, Clone, Copy, Default)]
pub struct HmacSha1Signature;

impl HmacSha1Signature {
    /// Build the signature base string: `VERB&url&params`.
    pub fn base_string(verb: &str, url: &str, params: &[(String, String)]) -> Result<String> {
        let parsed = Url::parse(url)
            .map_err(|e| OAuthError::config(format!("invalid request URL '{}': {}", url, e)))?;

        let mut encoded: Vec<(String, String)> = parsed
            .query_pairs()
            .map(|(k, v)| (percent_encode(&k).into_owned(), percent_encode(&v).into_owned()))
            .chain(
                params
                    .iter()
                    .map(|(k, v)| (percent_encode(k).into_owned(), percent_encode(v).into_owned())),
            )
            .collect();
        encoded.sort();

        let param_string = encoded
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");

        Ok(format!(
            "{}&{}&{}",
            verb.to_uppercase(),
            percent_encode(&normalized_url(&parsed)),
            percent_encode(&param_string)
        ))
    }
}

impl SignatureService for HmacSha1Signature {
    fn signature_method(&self) -> &'static str {
        "HMAC-SHA1"
    }

    fn sign(
        &self,
        verb: &str,
        url: &str,
        params: &[(String, String)],
        consumer_secret: &str,
        token_secret: &str,
    ) -> Result<String> {
        let base_string = Self::base_string(verb, url, params)?;
        let key = format!(
            "{}&{}",
            percent_encode(consumer_secret),
            percent_encode(token_secret)
        );

        let mut mac = HmacSha1::new_from_slice(key.as_bytes())
            .map_err(|e| OAuthError::config(format!("invalid signing key: {}", e)))?;
        mac.update(base_string.as_bytes());

        Ok(STANDARD.encode(mac.finalize().into_bytes()))
    }
}

/// `scheme://host[:non-default-port]/path`, no query or fragment.
fn normalized_url(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default().to_lowercase();
    match url.port() {
        Some(port) => format!("{}://{}:{}{}", url.scheme(), host, port, url.path()),
        None => format!("{}://{}{}", url.scheme(), host, url.path()),
    }
}

/// Source of `oauth_timestamp` and `oauth_nonce` values.
pub trait TimestampService: Send + Sync + std::fmt::Debug {
    /// Seconds since the Unix epoch.
    fn timestamp_secs(&self) -> u64;

    /// A numeric nonce. May be negative; callers normalize it.
    fn nonce(&self) -> i64;
}

/// System clock plus a random offset for the nonce.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimestamp;

impl TimestampService for SystemTimestamp {
    fn timestamp_secs(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }

    fn nonce(&self) -> i64 {
        let offset: i32 = rand::rng().random();
        (self.timestamp_secs() as i64).wrapping_add(offset as i64)
    }
}

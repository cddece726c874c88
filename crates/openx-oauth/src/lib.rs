//! OAuth 1.0a client for the OpenX API, bridged with the SSO cookie session.
//!
//! OpenX authorizes request tokens through its SSO login form instead of an
//! interactive browser step. This crate runs the three-legged handshake,
//! posts the user's credentials to the login endpoint to obtain the
//! verifier, and turns the resulting access token into the
//! `openx3_access_token` session cookie the API expects.
//!
//! # Components
//!
//! - [`service`]: token-exchange orchestrator ([`OAuthService`])
//! - [`signature`]: HMAC-SHA1 signing, timestamps and nonces
//! - [`params`], [`request`]: protocol parameters and signed requests
//! - [`sso`]: login sequence and session state ([`SsoBridge`])
//! - [`gateway`]: authenticated API calls ([`ApiGateway`])
//! - [`transport`], [`redirect`]: blocking HTTP with manual redirect handling
//! - [`client`]: everything assembled ([`OpenXClient`])

pub mod api;
pub mod client;
pub mod error;
pub mod gateway;
pub mod params;
pub mod query;
pub mod redirect;
pub mod request;
pub mod service;
pub mod session;
pub mod signature;
pub mod sso;
pub mod token;
pub mod transport;

pub use api::{ApiPath, OpenXApi};
pub use client::{ClientBuilder, OpenXClient};
pub use error::{OAuthError, Result, Stage};
pub use gateway::ApiGateway;
pub use params::OAuthParameters;
pub use request::SignedRequest;
pub use service::{OAuthConfig, OAuthService, ServiceBuilder};
pub use session::{SESSION_COOKIE_NAME, SessionCookie, SessionState};
pub use signature::{HmacSha1Signature, SignatureService, SystemTimestamp, TimestampService};
pub use sso::{LoginCredentials, SsoBridge};
pub use token::{Token, TokenKind, Verifier};
pub use transport::{ProxyConfig, Transport, TransportConfig};

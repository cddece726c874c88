//! Redirect decisions for the SSO and API transports.
//!
//! Standard clients refuse to follow a 302 answering a POST; the SSO login
//! relies on exactly that redirect, so the transport asks this policy instead.

use reqwest::{Method, StatusCode};

/// Stateless per-response redirect decision.
#[derive(Debug, Clone, Copy, Default)]
pub struct RedirectPolicy;

impl RedirectPolicy {
    /// Whether a response with `status` to a `method` request is followed.
    pub fn is_redirected(&self, method: &Method, status: StatusCode, has_location: bool) -> bool {
        let get_or_head = *method == Method::GET || *method == Method::HEAD;
        match status {
            StatusCode::FOUND => has_location && (*method == Method::POST || get_or_head),
            StatusCode::MOVED_PERMANENTLY | StatusCode::TEMPORARY_REDIRECT => get_or_head,
            StatusCode::SEE_OTHER => true,
            _ => false,
        }
    }

    /// Method for the follow-up request.
    ///
    /// 307 keeps the method, HEAD stays HEAD, everything else becomes GET.
    pub fn redirect_method(&self, method: &Method, status: StatusCode) -> Method {
        if status == StatusCode::TEMPORARY_REDIRECT || *method == Method::HEAD {
            method.clone()
        } else {
            Method::GET
        }
    }
}

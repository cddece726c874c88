//! Authenticated API calls carrying the session cookie.

use reqwest::Method;
use serde::de::DeserializeOwned;

use crate::api::ApiPath;
use crate::error::{OAuthError, Result, Stage};
use crate::session::SessionCookie;
use crate::transport::{HttpRequest, HttpResponse, Transport};

/// Issues GET/PUT/POST requests against `{domain}{path}`.
///
/// Obtained from an authenticated bridge or client. Every call sends the
/// session cookie; any status other than 200 is an [`OAuthError::ApiCall`].
#[derive(Debug, Clone)]
pub struct ApiGateway {
    transport: Transport,
    domain: String,
    path: ApiPath,
    cookie: SessionCookie,
}

impl ApiGateway {
    pub fn new(
        transport: Transport,
        domain: impl Into<String>,
        path: ApiPath,
        cookie: SessionCookie,
    ) -> Self {
        Self {
            transport,
            domain: domain.into().trim_end_matches('/').to_string(),
            path,
            cookie,
        }
    }

    pub fn cookie(&self) -> &SessionCookie {
        &self.cookie
    }

    /// Base URL every entity path is appended to.
    pub fn base_url(&self) -> String {
        format!("{}{}", self.domain, self.path)
    }

    /// `GET {base}{entity}`
    pub fn get_objects(&self, entity: &str) -> Result<String> {
        self.get(&self.entity_url(entity, None, ""))
    }

    /// `GET {base}{entity}?{query}`
    pub fn get_objects_with_query(&self, entity: &str, query: &str) -> Result<String> {
        self.get(&self.entity_url(entity, None, query))
    }

    /// `GET {base}{entity}/{id}`
    pub fn get_object(&self, entity: &str, id: &str) -> Result<String> {
        self.get(&self.entity_url(entity, Some(id), ""))
    }

    /// `GET {base}{entity}/{id}?{query}`
    pub fn get_object_with_query(&self, entity: &str, id: &str, query: &str) -> Result<String> {
        self.get(&self.entity_url(entity, Some(id), query))
    }

    /// GET `{base}{relative}` and decode the JSON body.
    pub fn get_json<T: DeserializeOwned>(&self, relative: &str) -> Result<T> {
        let body = self.get(&format!("{}{}", self.base_url(), relative))?;
        Ok(serde_json::from_str(&body)?)
    }

    /// PUT a JSON payload to `{base}{relative}`.
    pub fn put(&self, relative: &str, json: &str) -> Result<String> {
        let url = format!("{}{}", self.base_url(), relative);
        self.call(HttpRequest::new(Method::PUT, url).json(json))
    }

    /// POST a JSON payload to `{domain}{path}`.
    ///
    /// `path` is independent of the configured API path; report endpoints
    /// live under their own prefix.
    pub fn post_payload(&self, path: &str, payload: &str) -> Result<String> {
        let url = format!("{}{}", self.domain, path);
        self.call(HttpRequest::new(Method::POST, url).json(payload))
    }

    fn entity_url(&self, entity: &str, id: Option<&str>, query: &str) -> String {
        let mut url = format!("{}{}", self.base_url(), entity);
        if let Some(id) = id {
            url.push('/');
            url.push_str(id);
        }
        let query = query.trim_start_matches('?');
        if !query.is_empty() {
            url.push('?');
            url.push_str(query);
        }
        url
    }

    fn get(&self, url: &str) -> Result<String> {
        self.call(HttpRequest::new(Method::GET, url))
    }

    fn call(&self, request: HttpRequest) -> Result<String> {
        let method = request.method.clone();
        let response = self
            .transport
            .send(Stage::ApiCall, request.cookie(self.cookie.clone()))?;
        check_response(&method, response)
    }
}

fn check_response(method: &Method, response: HttpResponse) -> Result<String> {
    if response.is_ok() {
        return Ok(response.body);
    }
    tracing::warn!(
        %method,
        url = %response.url,
        status = %response.status,
        "API call failed"
    );
    Err(OAuthError::ApiCall {
        status: response.status.as_u16(),
        body: response.body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransportConfig;

    fn gateway(path: ApiPath) -> ApiGateway {
        ApiGateway::new(
            Transport::new(&TransportConfig::default()).unwrap(),
            "http://api.example.com/",
            path,
            SessionCookie::new("http://api.example.com", "A1"),
        )
    }

    #[test]
    fn test_entity_urls() {
        let gw = gateway(ApiPath::V2);
        assert_eq!(gw.base_url(), "http://api.example.com/ox/4.0/");
        assert_eq!(
            gw.entity_url("account", None, ""),
            "http://api.example.com/ox/4.0/account"
        );
        assert_eq!(
            gw.entity_url("account", Some("42"), ""),
            "http://api.example.com/ox/4.0/account/42"
        );
        assert_eq!(
            gw.entity_url("account", None, "limit=5"),
            "http://api.example.com/ox/4.0/account?limit=5"
        );
    }

    #[test]
    fn test_entity_url_with_id_keeps_query() {
        let gw = gateway(ApiPath::V1);
        assert_eq!(
            gw.entity_url("account", Some("42"), "?overload=medium"),
            "http://api.example.com/ox/3.0/a/account/42?overload=medium"
        );
    }
}

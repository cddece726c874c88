//! End-to-end login sequence against a mock SSO server and API.
//!
//! The client is blocking, so it is built, driven and dropped on a blocking
//! thread while the mock server runs on the test runtime.

use openx_oauth::{
    ApiPath, ClientBuilder, LoginCredentials, OAuthError, OpenXClient, SsoBridge, Stage, Token,
    TokenKind, Transport, TransportConfig,
};
use wiremock::matchers::{body_string_contains, header, header_exists, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn client_builder(base: &str) -> ClientBuilder {
    OpenXClient::builder()
        .api_key("consumer-key")
        .api_secret("consumer-secret")
        .login_url(format!("{}/login/process", base))
        .credentials("user@example.com", "hunter2")
        .domain(base)
        .request_token_url(format!("{}/api/index/initiate", base))
        .access_token_url(format!("{}/api/index/token", base))
        .authorize_url(format!("{}/login/process", base))
}

fn authorization_contains(needle: &'static str) -> impl Fn(&Request) -> bool + Send + Sync {
    move |req: &Request| {
        req.headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains(needle))
    }
}

async fn mount_request_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/index/initiate"))
        .and(authorization_contains("oauth_consumer_key=\"consumer-key\""))
        .and(body_string_contains("oauth_callback=oob"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("oauth_token=R1&oauth_token_secret=S1&oauth_callback_confirmed=true"),
        )
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/login/process"))
        .and(body_string_contains("email=user%40example.com"))
        .and(body_string_contains("password=hunter2"))
        .and(body_string_contains("oauth_token=R1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("oob?oauth_token=R1&oauth_verifier=V1"))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_access_token(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/api/index/token"))
        .and(authorization_contains("oauth_verifier=\"V1\""))
        .and(authorization_contains("oauth_token=\"R1\""))
        .respond_with(ResponseTemplate::new(200).set_body_string("oauth_token=A1&oauth_token_secret=S2"))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_legacy_path_login_and_validation() {
    let server = MockServer::start().await;
    mount_request_token(&server).await;
    mount_login(&server).await;
    mount_access_token(&server, 1).await;
    Mock::given(method("PUT"))
        .and(path("/ox/3.0/a/session/validate"))
        .and(header("cookie", "openx3_access_token=A1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let base = server.uri();
    tokio::task::spawn_blocking(move || {
        let mut client = client_builder(&base).path("/ox/3.0/a/").build().unwrap();
        client.authenticate().unwrap();

        assert!(client.is_authenticated());
        let token = client.access_token().unwrap();
        assert_eq!(token.value(), "A1");
        assert_eq!(token.secret(), "S2");

        let cookie = client.session_cookie().unwrap();
        assert_eq!(cookie.name(), "openx3_access_token");
        assert_eq!(cookie.value(), "A1");
        assert_eq!(cookie.path(), "/");
        assert!(!cookie.domain().starts_with("http"));
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_current_path_skips_validation() {
    let server = MockServer::start().await;
    mount_request_token(&server).await;
    mount_login(&server).await;
    mount_access_token(&server, 1).await;
    Mock::given(method("PUT"))
        .and(path("/ox/4.0/session/validate"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let base = server.uri();
    tokio::task::spawn_blocking(move || {
        let mut client = client_builder(&base).build().unwrap();
        assert_eq!(client.bridge().path(), ApiPath::V2);
        client.authenticate().unwrap();
        assert!(client.is_authenticated());
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_session_reports_validation_stage() {
    let server = MockServer::start().await;
    mount_request_token(&server).await;
    mount_login(&server).await;
    mount_access_token(&server, 1).await;
    Mock::given(method("PUT"))
        .and(path("/ox/3.0/a/session/validate"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let base = server.uri();
    tokio::task::spawn_blocking(move || {
        let mut client = client_builder(&base).path("/ox/3.0/a/").build().unwrap();
        let err = client.authenticate().unwrap_err();

        assert!(matches!(err, OAuthError::SessionRejected { status: 403 }));
        assert_eq!(err.stage(), Some(Stage::Validation));
        assert!(!client.is_authenticated());
        assert!(client.access_token().is_none());
        assert!(matches!(client.gateway(), Err(OAuthError::NotAuthenticated)));
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_failure_stops_sequence() {
    let server = MockServer::start().await;
    mount_request_token(&server).await;
    Mock::given(method("POST"))
        .and(path("/login/process"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;
    mount_access_token(&server, 0).await;

    let base = server.uri();
    tokio::task::spawn_blocking(move || {
        let mut client = client_builder(&base).build().unwrap();
        let err = client.authenticate().unwrap_err();

        match &err {
            OAuthError::LoginFailed { stage, status, .. } => {
                assert_eq!(*stage, Stage::Login);
                assert_eq!(*status, Some(500));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(matches!(
            client.session_cookie(),
            Err(OAuthError::NotAuthenticated)
        ));
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_verifier_stops_sequence() {
    let server = MockServer::start().await;
    mount_request_token(&server).await;
    Mock::given(method("POST"))
        .and(path("/login/process"))
        .respond_with(ResponseTemplate::new(200).set_body_string("oob?oauth_token=R1"))
        .mount(&server)
        .await;
    mount_access_token(&server, 0).await;

    let base = server.uri();
    tokio::task::spawn_blocking(move || {
        let mut client = client_builder(&base).build().unwrap();
        let err = client.authenticate().unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Verifier));
        assert_eq!(err.status(), None);
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_request_token_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/index/initiate"))
        .respond_with(ResponseTemplate::new(401).set_body_string("oauth_problem=signature_invalid"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/login/process"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let base = server.uri();
    tokio::task::spawn_blocking(move || {
        let mut client = client_builder(&base).build().unwrap();
        let err = client.authenticate().unwrap_err();
        assert!(matches!(
            err,
            OAuthError::TokenExtraction {
                kind: TokenKind::Request,
                status: 401,
                ..
            }
        ));
        assert_eq!(err.stage(), Some(Stage::RequestToken));
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_redirect_is_followed() {
    let server = MockServer::start().await;
    mount_request_token(&server).await;
    Mock::given(method("POST"))
        .and(path("/login/process"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/login/done"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/login/done"))
        .respond_with(ResponseTemplate::new(200).set_body_string("oob?oauth_token=R1&oauth_verifier=V1"))
        .expect(1)
        .mount(&server)
        .await;
    mount_access_token(&server, 1).await;

    let base = server.uri();
    tokio::task::spawn_blocking(move || {
        let mut client = client_builder(&base).build().unwrap();
        client.authenticate().unwrap();
        assert_eq!(client.access_token().unwrap().value(), "A1");
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_signed_requests_carry_oauth_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/index/initiate"))
        .and(header_exists("authorization"))
        .and(authorization_contains("oauth_signature_method=\"HMAC-SHA1\""))
        .and(authorization_contains("oauth_version=\"1.0\""))
        .and(authorization_contains("oauth_signature=\""))
        .respond_with(ResponseTemplate::new(200).set_body_string("oauth_token=R1&oauth_token_secret="))
        .expect(1)
        .mount(&server)
        .await;

    let base = server.uri();
    tokio::task::spawn_blocking(move || {
        let client = client_builder(&base).build().unwrap();
        let token = client.service().get_request_token().unwrap();
        assert_eq!(token.value(), "R1");
        assert_eq!(token.secret(), "");
    })
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_legacy_validation_403_returns_false() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/ox/3.0/a/session/validate"))
        .and(header("cookie", "openx3_access_token=A1"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let base = server.uri();
    tokio::task::spawn_blocking(move || {
        let mut bridge = SsoBridge::new(
            Transport::new(&TransportConfig::default()).unwrap(),
            format!("{}/login/process", base),
            LoginCredentials::new("user@example.com", "hunter2"),
            base.as_str(),
            ApiPath::V1,
        );
        bridge.establish_session(Token::new("A1", "S2")).unwrap();

        assert!(!bridge.validate_session().unwrap());
        assert!(!bridge.state().is_validated());
        // The session itself is kept; only validation failed.
        assert_eq!(bridge.state().access_token().unwrap().value(), "A1");
    })
    .await
    .unwrap();
}

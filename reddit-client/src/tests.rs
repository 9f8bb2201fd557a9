use crate::{auth, RedditClient, RedditCredentials, RedditEndpoints};
use serde_json::json;
use subwatch_core::{CoreError, RedditApiError, Session};
use wiremock::matchers::{basic_auth, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_test_credentials() -> RedditCredentials {
    RedditCredentials::new("test_user", "hunter2", "test_client_id", "test_client_secret")
}

fn create_test_client(server: &MockServer) -> RedditClient {
    RedditClient::with_endpoints(
        create_test_credentials(),
        RedditEndpoints::with_base(&server.uri()),
    )
    .unwrap()
}

fn listing(children: serde_json::Value) -> serde_json::Value {
    json!({
        "kind": "Listing",
        "data": {
            "after": null,
            "before": null,
            "children": children,
        }
    })
}

#[test]
fn test_endpoints_with_base() {
    let endpoints = RedditEndpoints::with_base("http://127.0.0.1:8080/");
    assert_eq!(endpoints.api_base, "http://127.0.0.1:8080");
    assert_eq!(
        endpoints.token_url,
        "http://127.0.0.1:8080/api/v1/access_token"
    );

    let defaults = RedditEndpoints::default();
    assert_eq!(defaults.api_base, "https://oauth.reddit.com");
    assert_eq!(
        defaults.token_url,
        "https://www.reddit.com/api/v1/access_token"
    );
}

#[test]
fn test_credentials_hide_secrets() {
    let credentials = create_test_credentials();
    let debug = format!("{:?}", credentials);
    assert!(debug.contains("test_user"));
    assert!(!debug.contains("hunter2"));
    assert!(!debug.contains("test_client_secret"));
}

#[test]
fn test_error_field_extraction() {
    assert_eq!(
        auth::error_field(br#"{"error": "invalid_grant"}"#),
        Some("invalid_grant".to_string())
    );
    assert_eq!(
        auth::error_field(br#"{"message": "Unauthorized", "error": 401}"#),
        Some("401".to_string())
    );
    assert_eq!(auth::error_field(br#"{"error": null}"#), None);
    assert_eq!(auth::error_field(b"<html>"), None);
}

#[tokio::test]
async fn test_password_grant_creates_session() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .and(basic_auth("test_client_id", "test_client_secret"))
        .and(body_string_contains("grant_type=password"))
        .and(body_string_contains("username=test_user"))
        .and(body_string_contains("password=hunter2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "token-abc",
            "token_type": "bearer",
            "expires_in": 86400,
            "scope": "*"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_test_client(&server);
    let session = client.authenticate().await.unwrap();

    assert_eq!(session.token_type, "bearer");
    assert_eq!(session.access_token(), "token-abc");
    assert_eq!(session.authorization_header(), "bearer token-abc");
    assert!(session.expires_at.is_some());
    assert!(!session.is_expired());
    assert_eq!(session.scope, vec!["*".to_string()]);
}

#[tokio::test]
async fn test_error_field_in_token_body_fails_authentication() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": "invalid_grant"
        })))
        .mount(&server)
        .await;

    let client = create_test_client(&server);
    let result = client.authenticate().await;

    match result {
        Err(CoreError::RedditApi(RedditApiError::AuthenticationFailed { reason })) => {
            assert_eq!(reason, "invalid_grant");
        }
        other => panic!("expected authentication failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_rejected_client_credentials_fail_authentication() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": "Unauthorized",
            "error": 401
        })))
        .mount(&server)
        .await;

    let client = create_test_client(&server);
    let result = client.authenticate().await;
    assert!(matches!(
        result,
        Err(CoreError::RedditApi(
            RedditApiError::AuthenticationFailed { .. }
        ))
    ));
}

#[tokio::test]
async fn test_token_redirect_is_not_followed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("location", "/elsewhere/access_token"),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/elsewhere/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "leaked",
            "token_type": "bearer",
            "expires_in": 86400,
            "scope": "*"
        })))
        .expect(0)
        .mount(&server)
        .await;

    let client = create_test_client(&server);
    let result = client.authenticate().await;
    assert!(matches!(
        result,
        Err(CoreError::RedditApi(
            RedditApiError::AuthenticationFailed { .. }
        ))
    ));
}

#[tokio::test]
async fn test_fetch_new_sends_session_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/r/hardwareswap/new"))
        .and(header("authorization", "bearer token-abc"))
        .and(header("accept", "application/json"))
        .and(header("user-agent", crate::USER_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(json!([
            {
                "kind": "t3",
                "data": {
                    "title": "[H] RTX 3080 [W] PayPal",
                    "created_utc": 1700000000.0,
                    "permalink": "/r/hardwareswap/comments/a1/"
                }
            },
            { "kind": "t3" }
        ]))))
        .expect(1)
        .mount(&server)
        .await;

    let client = create_test_client(&server);
    let session = Session::new("bearer", "token-abc");
    let posts = client.fetch_new(&session, "hardwareswap").await.unwrap();

    // Children come back untouched, malformed ones included
    assert_eq!(posts.len(), 2);
    assert_eq!(
        posts[0].to_post().unwrap().title,
        "[H] RTX 3080 [W] PayPal"
    );
    assert!(posts[1].to_post().is_err());
}

#[tokio::test]
async fn test_error_field_in_listing_yields_no_posts() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/r/hardwareswap/new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": "quarantined",
            "message": "this community is quarantined"
        })))
        .mount(&server)
        .await;

    let client = create_test_client(&server);
    let session = Session::new("bearer", "token-abc");
    let posts = client.fetch_new(&session, "hardwareswap").await.unwrap();
    assert!(posts.is_empty());
}

#[tokio::test]
async fn test_listing_without_children_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/r/hardwareswap/new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "kind": "Listing",
            "data": {}
        })))
        .mount(&server)
        .await;

    let client = create_test_client(&server);
    let session = Session::new("bearer", "token-abc");
    assert!(client
        .fetch_new(&session, "hardwareswap")
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_listing_without_data_is_invalid() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/r/hardwareswap/new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "kind": "Listing" })))
        .mount(&server)
        .await;

    let client = create_test_client(&server);
    let session = Session::new("bearer", "token-abc");
    let result = client.fetch_new(&session, "hardwareswap").await;
    assert!(matches!(
        result,
        Err(CoreError::RedditApi(RedditApiError::InvalidResponse { .. }))
    ));
}

#[tokio::test]
async fn test_fetch_status_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/r/expired/new"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/r/busy/new"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "17"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/r/down/new"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/r/missing/new"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = create_test_client(&server);
    let session = Session::new("bearer", "stale");

    assert!(matches!(
        client.fetch_new(&session, "expired").await,
        Err(CoreError::RedditApi(RedditApiError::InvalidToken))
    ));
    assert!(matches!(
        client.fetch_new(&session, "busy").await,
        Err(CoreError::RedditApi(RedditApiError::RateLimitExceeded {
            retry_after: 17
        }))
    ));
    assert!(matches!(
        client.fetch_new(&session, "down").await,
        Err(CoreError::RedditApi(RedditApiError::ServerError {
            status_code: 503
        }))
    ));
    assert!(matches!(
        client.fetch_new(&session, "missing").await,
        Err(CoreError::RedditApi(RedditApiError::SubredditNotFound { .. }))
    ));
}

#[test]
fn test_credentials_from_env_reports_missing_variable() {
    // Only the username is checked for absence; other tests never set these.
    std::env::remove_var(auth::ENV_REDDIT_USERNAME);
    let result = RedditCredentials::from_env();
    assert!(matches!(
        result,
        Err(subwatch_core::ConfigError::MissingEnvironmentVariable { ref var_name })
            if var_name == auth::ENV_REDDIT_USERNAME
    ));
}

#[test]
fn test_client_creation() {
    let client = RedditClient::new(create_test_credentials()).unwrap();
    assert_eq!(client.authenticator.username(), "test_user");
}

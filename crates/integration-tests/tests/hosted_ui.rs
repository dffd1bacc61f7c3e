//! Authorization-code exchange and profile lookup against a mock identity provider.

use std::sync::Arc;

use auth_adapters::{parse_callback, AuthError, AuthSession, HostedUiClient, HostedUiConfig};
use domains::{ItemCatalog, TokenProvider};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use storage_adapters::HttpItemCatalog;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> HostedUiClient {
    HostedUiClient::new(HostedUiConfig {
        domain: server.uri(),
        client_id: "client-1".into(),
        region: "eu-west-1".into(),
        user_pool_id: "eu-west-1_Pool".into(),
        redirect_uri: "http://localhost:3000".into(),
        scopes: vec!["openid".into(), "email".into()],
    })
}

async fn mount_token_endpoint(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=the-code"))
        .and(body_string_contains("client_id=client-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-1",
            "id_token": "id-1",
            "refresh_token": "refresh-1",
            "expires_in": 3600,
            "token_type": "Bearer"
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn code_flow_signs_the_user_in() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;
    Mock::given(method("GET"))
        .and(path("/oauth2/userInfo"))
        .and(header("authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sub": "abc-123",
            "email": "sam@example.com",
            "cognito:username": "sam"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let code = parse_callback("http://localhost:3000/?code=the-code").unwrap().unwrap();
    let tokens = client.exchange_code(&code).await.unwrap();
    assert_eq!(tokens.expires_in, Some(3600));

    let user = client.user_info(&tokens.access_token).await.unwrap().to_user();
    assert_eq!(user.id, "abc-123");
    assert_eq!(user.name, "sam@example.com");

    let session = AuthSession::new();
    session.sign_in(tokens, user).await;
    assert!(session.is_authenticated().await);
    let bearer = session.bearer_token().await.unwrap();
    assert_eq!(bearer.expose_secret(), "id-1");
}

#[tokio::test]
async fn session_token_reaches_the_catalog() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;
    Mock::given(method("POST"))
        .and(path("/items/x/claim"))
        .and(header("authorization", "Bearer id-1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let tokens = client(&server).exchange_code("the-code").await.unwrap();
    let session = Arc::new(AuthSession::new());
    session.sign_in(tokens, integration_tests::user("u1")).await;

    let catalog = HttpItemCatalog::new(Some(&server.uri())).with_token_provider(session.clone());
    catalog.claim("x").await.unwrap();

    session.sign_out().await;
    assert!(session.bearer_token().await.is_none());
}

#[tokio::test]
async fn rejected_code_surfaces_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(400).set_body_string(r#"{"error":"invalid_grant"}"#))
        .mount(&server)
        .await;

    let err = client(&server).exchange_code("stale").await.unwrap_err();
    assert_eq!(
        err,
        AuthError::TokenExchange {
            status: 400,
            body: r#"{"error":"invalid_grant"}"#.to_string()
        }
    );
}

#[tokio::test]
async fn expired_token_fails_user_info() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/oauth2/userInfo"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client(&server)
        .user_info(&SecretString::from("expired"))
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::UserInfo(401));
}

mod common;

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use kindroid_interaction::{AuthMode, KindroidClient};
use serde_json::{Value, json};

use common::{AI_ID, RequestLog, spawn_stub, token_for, token_with};

async fn subscription_ok(
    State(log): State<Arc<RequestLog>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    log.record("/check-user-subscription", &headers, body);
    Json(json!({ "uid": "sub-user", "status": "active" }))
}

async fn subscription_denied(
    State(log): State<Arc<RequestLog>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> StatusCode {
    log.record("/check-user-subscription", &headers, body);
    StatusCode::UNAUTHORIZED
}

async fn stub(denied: bool) -> (String, Arc<RequestLog>) {
    let log = Arc::new(RequestLog::default());
    let state = log.clone();
    let base = spawn_stub(move |_| {
        let router = if denied {
            Router::new().route("/check-user-subscription", post(subscription_denied))
        } else {
            Router::new().route("/check-user-subscription", post(subscription_ok))
        };
        router.with_state(state)
    })
    .await;
    (base, log)
}

#[tokio::test]
async fn test_token_claim_sets_token_identity() {
    let (base, log) = stub(false).await;
    let mut client = KindroidClient::new(token_for("abc123"), AI_ID).with_base_url(base);

    let identity = client.setup_user_and_permissions().await.unwrap().clone();

    assert_eq!(identity.user_id, "abc123");
    assert_eq!(identity.mode, AuthMode::Token);
    assert!(client.is_token_authenticated());
    assert_eq!(client.user_id(), Some("abc123"));
    assert_eq!(log.total(), 0, "token path must not call the API");
}

#[tokio::test]
async fn test_token_without_claim_falls_back_to_subscription() {
    let (base, log) = stub(false).await;
    let token = token_with(json!({ "sub": "firebase-subject" }));
    let mut client = KindroidClient::new(token.clone(), AI_ID).with_base_url(base);

    client.setup_user_and_permissions().await.unwrap();

    assert_eq!(client.user_id(), Some("sub-user"));
    assert!(!client.is_token_authenticated());
    assert_eq!(log.count("/check-user-subscription"), 1);
    assert_eq!(
        log.all()[0].authorization,
        Some(format!("Bearer {}", token))
    );
}

#[tokio::test]
async fn test_unparseable_key_falls_back_to_subscription() {
    let (base, log) = stub(false).await;
    let mut client = KindroidClient::new("kn_opaque_api_key", AI_ID).with_base_url(base);

    let identity = client.setup_user_and_permissions().await.unwrap();

    assert_eq!(identity.user_id, "sub-user");
    assert_eq!(identity.mode, AuthMode::Subscription);
    assert_eq!(log.total(), 1);
}

#[tokio::test]
async fn test_configured_user_id_is_last_resort() {
    let (base, _log) = stub(true).await;
    let mut client = KindroidClient::new("kn_opaque_api_key", AI_ID)
        .with_base_url(base)
        .with_fallback_user_id("env-user");

    client.setup_user_and_permissions().await.unwrap();

    assert_eq!(client.user_id(), Some("env-user"));
    assert!(!client.is_token_authenticated());
}

#[tokio::test]
async fn test_resolution_fails_when_every_source_fails() {
    let (base, _log) = stub(true).await;
    let mut client = KindroidClient::new("kn_opaque_api_key", AI_ID).with_base_url(base);

    let err = client.setup_user_and_permissions().await.unwrap_err();

    assert!(err.is_identity());
    assert!(err.to_string().contains("401"));
    assert!(client.identity().is_none());
}

#[tokio::test]
async fn test_identity_is_resolved_once() {
    let (base, log) = stub(false).await;
    let mut client = KindroidClient::new("kn_opaque_api_key", AI_ID)
        .with_base_url(base)
        .with_fallback_user_id("env-user");

    client.setup_user_and_permissions().await.unwrap();
    let again = client.setup_user_and_permissions().await.unwrap().clone();

    assert_eq!(again.user_id, "sub-user");
    assert_eq!(again.mode, AuthMode::Subscription);
    assert_eq!(log.count("/check-user-subscription"), 1);
}

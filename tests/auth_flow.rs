use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use userauth_api::{
    config::Config,
    db::{AccountStore, MemoryAccountStore},
    models::account::{NewAccount, UserRole},
    router,
    services::password::hash_password,
    AppState,
};

fn test_config() -> Config {
    Config {
        database_url: "postgres://unused".into(),
        jwt_secret: "integration-secret".into(),
        access_token_ttl_seconds: 900,
        refresh_token_ttl_seconds: 86400,
        bcrypt_cost: 4,
        host: "127.0.0.1".into(),
        port: 0,
    }
}

fn app() -> (Router, Arc<MemoryAccountStore>) {
    let store = Arc::new(MemoryAccountStore::new());
    let state = AppState::new(&test_config(), store.clone()).unwrap();
    (router(state), store)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header("token", token);
    }
    builder.body(Body::empty()).unwrap()
}

async fn signup(app: &Router, email: &str) -> Value {
    let (status, body) = send(
        app,
        post_json(
            "/users/signup",
            json!({
                "first_name": "Ada",
                "last_name": "Lovelace",
                "email": email,
                "password": "hunter22"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

async fn login(app: &Router, email: &str, password: &str) -> (StatusCode, Value) {
    send(app, post_json("/users/login", json!({ "email": email, "password": password }))).await
}

async fn seed_admin(store: &MemoryAccountStore, email: &str) {
    store
        .insert(&NewAccount {
            id: Uuid::new_v4(),
            email: email.into(),
            password_hash: hash_password("admin-pass", 4).unwrap(),
            first_name: "Grace".into(),
            last_name: "Hopper".into(),
            phone: None,
            role: UserRole::Admin,
            created_at: Utc::now(),
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn signup_token_reaches_own_profile() {
    let (app, _) = app();
    let body = signup(&app, "a@x.com").await;
    let token = body["access_token"].as_str().unwrap();
    let account_id = body["user"]["account_id"].as_str().unwrap();

    let (status, profile) = send(&app, get(&format!("/users/{account_id}"), Some(token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["email"], "a@x.com");
    assert_eq!(profile["role"], "USER");
    assert!(profile.get("password_hash").is_none());
    assert!(profile.get("refresh_token").is_none());

    let (status, me) = send(&app, get("/users/me", Some(token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["account_id"], account_id);
}

#[tokio::test]
async fn own_id_matches_in_any_case() {
    let (app, _) = app();
    let body = signup(&app, "a@x.com").await;
    let token = body["access_token"].as_str().unwrap();
    let shouted = body["user"]["account_id"].as_str().unwrap().to_uppercase();

    let (status, profile) = send(&app, get(&format!("/users/{shouted}"), Some(token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["email"], "a@x.com");
}

#[tokio::test]
async fn protected_routes_require_token_header() {
    let (app, _) = app();

    let (status, body) = send(&app, get("/users/me", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "missing token");

    let (status, body) = send(&app, get("/users/me", Some("garbage"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid token");
}

#[tokio::test]
async fn refresh_token_cannot_authenticate_requests() {
    let (app, _) = app();
    let body = signup(&app, "a@x.com").await;
    let refresh = body["refresh_token"].as_str().unwrap();

    let (status, body) = send(&app, get("/users/me", Some(refresh))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "wrong token kind");
}

#[tokio::test]
async fn users_cannot_reach_other_accounts_or_listing() {
    let (app, _) = app();
    let first = signup(&app, "a@x.com").await;
    let second = signup(&app, "b@x.com").await;
    let token = first["access_token"].as_str().unwrap();
    let other_id = second["user"]["account_id"].as_str().unwrap();

    let (status, body) = send(&app, get(&format!("/users/{other_id}"), Some(token))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "not permitted");

    let (status, _) = send(&app, get("/users", Some(token))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_lists_and_reads_any_account() {
    let (app, store) = app();
    seed_admin(&store, "admin@x.com").await;
    let user = signup(&app, "a@x.com").await;
    signup(&app, "b@x.com").await;

    let (status, body) = login(&app, "admin@x.com", "admin-pass").await;
    assert_eq!(status, StatusCode::OK);
    let token = body["access_token"].as_str().unwrap();

    let (status, page) = send(&app, get("/users?page=1&per_page=2", Some(token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total_count"], 3);
    assert_eq!(page["per_page"], 2);
    assert_eq!(page["user_items"].as_array().unwrap().len(), 2);

    let user_id = user["user"]["account_id"].as_str().unwrap();
    let (status, profile) = send(&app, get(&format!("/users/{user_id}"), Some(token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["email"], "a@x.com");

    let (status, _) = send(&app, get(&format!("/users/{}", Uuid::new_v4()), Some(token))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn login_failures_look_the_same() {
    let (app, _) = app();
    signup(&app, "a@x.com").await;

    let (unknown_status, unknown) = login(&app, "nobody@x.com", "hunter22").await;
    let (wrong_status, wrong) = login(&app, "a@x.com", "not-the-password").await;
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown, wrong);
}

#[tokio::test]
async fn only_latest_refresh_token_rotates() {
    let (app, _) = app();
    signup(&app, "a@x.com").await;
    let (_, first) = login(&app, "a@x.com", "hunter22").await;
    let (_, second) = login(&app, "a@x.com", "hunter22").await;

    let (status, body) = send(
        &app,
        post_json("/users/refresh", json!({ "refresh_token": first["refresh_token"] })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "token is no longer current");

    let (status, rotated) = send(
        &app,
        post_json("/users/refresh", json!({ "refresh_token": second["refresh_token"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = rotated["access_token"].as_str().unwrap();
    let (status, _) = send(&app, get("/users/me", Some(token))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn duplicate_signup_conflicts() {
    let (app, _) = app();
    signup(&app, "a@x.com").await;

    let (status, _) = send(
        &app,
        post_json(
            "/users/signup",
            json!({
                "first_name": "Ada",
                "last_name": "Again",
                "email": "a@x.com",
                "password": "hunter22"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn health_reports_store() {
    let (app, _) = app();
    let (status, body) = send(&app, get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn malformed_bodies_get_json_errors() {
    let (app, _) = app();

    let broken = Request::builder()
        .method("POST")
        .uri("/users/login")
        .header("content-type", "application/json")
        .body(Body::from("{\"email\": "))
        .unwrap();
    let (status, body) = send(&app, broken).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string(), "{body}");

    let (status, body) = send(&app, post_json("/users/signup", json!({ "email": "a@x.com" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string(), "{body}");

    let (status, body) = send(&app, post_json("/users/refresh", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string(), "{body}");
}

#[tokio::test]
async fn metrics_count_logins() {
    let (app, _) = app();
    signup(&app, "a@x.com").await;
    let (status, _) = login(&app, "a@x.com", "hunter22").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = login(&app, "a@x.com", "nope-nope").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let response = app.clone().oneshot(get("/metrics", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("auth_logins_total"), "{text}");
    assert!(text.contains(r#"status="success""#), "{text}");
    assert!(text.contains(r#"status="invalid_credentials""#), "{text}");
    assert!(text.contains("auth_tokens_issued_total"), "{text}");
}

//! HTTP-level tests for signup, signin, the token gate and role policy.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use portfolio_api::{
    auth::{claims::Role, extractors::TOKEN_HEADER},
    build_app,
    config::{AdminSeed, AppConfig, JwtConfig},
    AppState,
};
use serde_json::{json, Value};
use tower::ServiceExt; // For `oneshot` method

fn test_config(allow_admin_signup: bool, admin_seed: Option<AdminSeed>) -> AppConfig {
    AppConfig {
        database_url: None,
        jwt: JwtConfig {
            secret: "test-secret".into(),
            issuer: "test-issuer".into(),
            audience: "test-aud".into(),
            ttl_minutes: 60,
        },
        allow_admin_signup,
        admin_seed,
    }
}

fn test_app() -> (Router, AppState) {
    let state = AppState::in_memory(test_config(false, None));
    (build_app(state.clone()), state)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().uri(uri).method(method);
    if let Some(t) = token {
        builder = builder.header(TOKEN_HEADER, t);
    }
    let request = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&b).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn signup(app: &Router, username: &str, email: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({ "username": username, "email": email, "password": password })),
    )
    .await
}

async fn signin(app: &Router, identifier: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        "/api/auth/signin",
        None,
        Some(json!({ "identifier": identifier, "password": password })),
    )
    .await
}

#[tokio::test]
async fn alice_journey() {
    let (app, _) = test_app();

    let (status, body) = signup(&app, "alice", "a@x.com", "secret1").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User registered successfully");
    let signup_token = body["token"].as_str().unwrap().to_string();
    assert!(!signup_token.is_empty());

    let (status, body) = signin(&app, "alice", "wrong").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid Credentials");

    let (status, body) = signin(&app, "a@x.com", "secret1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logged in successfully");
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) = send(&app, "GET", "/api/auth/protected", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "You have accessed a protected route!");
    assert_eq!(body["user"]["role"], "user");

    let (status, body) = send(&app, "GET", "/api/auth/admin-only", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Access denied. Admin role required.");

    let (status, body) = send(&app, "GET", "/api/auth/admin-only", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "No token, authorization denied");
}

#[tokio::test]
async fn duplicate_email_or_username_creates_nothing() {
    let (app, state) = test_app();
    let (status, _) = signup(&app, "alice", "a@x.com", "secret1").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = signup(&app, "alice2", "A@X.com", "secret1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User with this email already exists");

    let (status, body) = signup(&app, "alice", "other@x.com", "secret1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User with this username already exists");

    assert!(state.users.find_by_username("alice2").await.unwrap().is_none());
    assert!(state.users.find_by_email("other@x.com").await.unwrap().is_none());
}

#[tokio::test]
async fn unknown_identifier_looks_like_wrong_password() {
    let (app, _) = test_app();
    signup(&app, "alice", "a@x.com", "secret1").await;

    let wrong = signin(&app, "alice", "nope-nope").await;
    let unknown = signin(&app, "mallory", "secret1").await;
    assert_eq!(wrong, unknown);
    assert_eq!(wrong.0, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn legacy_signin_field_is_accepted() {
    let (app, _) = test_app();
    signup(&app, "alice", "a@x.com", "secret1").await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/signin",
        None,
        Some(json!({ "emailOrUsername": "alice", "password": "secret1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn signup_validation_errors_are_client_errors() {
    let (app, state) = test_app();

    let (status, _) = signup(&app, "al", "a@x.com", "secret1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = signup(&app, "alice", "not-an-email", "secret1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = signup(&app, "alice", "a@x.com", "short").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(state.users.find_by_username("alice").await.unwrap().is_none());
}

#[tokio::test]
async fn admin_role_cannot_be_self_assigned_by_default() {
    let (app, state) = test_app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({
            "username": "eve",
            "email": "eve@x.com",
            "password": "secret1",
            "role": "admin"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Role cannot be self-assigned");
    assert!(state.users.find_by_username("eve").await.unwrap().is_none());
}

#[tokio::test]
async fn admin_signup_allowed_when_configured() {
    let state = AppState::in_memory(test_config(true, None));
    let app = build_app(state.clone());
    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({
            "username": "boss",
            "email": "boss@x.com",
            "password": "secret1",
            "role": "admin"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let token = body["token"].as_str().unwrap();
    assert_eq!(state.keys.verify(token).unwrap().role, Role::Admin);

    let (status, body) = send(&app, "GET", "/api/auth/admin-only", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Welcome, Admin! This is an admin-only route.");
}

#[tokio::test]
async fn seeded_admin_passes_role_gate() {
    let seed = AdminSeed {
        username: "root".into(),
        email: "root@example.com".into(),
        password: "hunter22".into(),
    };
    let state = AppState::from_config(test_config(false, Some(seed)))
        .await
        .unwrap();
    let app = build_app(state);

    let (status, body) = signin(&app, "root", "hunter22").await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap();

    let (status, body) = send(&app, "GET", "/api/auth/admin-only", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["role"], "admin");
}

#[tokio::test]
async fn invalid_tokens_get_uniform_401() {
    let (app, state) = test_app();
    let (_, body) = signup(&app, "alice", "a@x.com", "secret1").await;
    let token = body["token"].as_str().unwrap().to_string();

    // Signed with a different secret.
    let other = AppState::in_memory(AppConfig {
        jwt: JwtConfig {
            secret: "another-secret".into(),
            ..test_config(false, None).jwt
        },
        ..test_config(false, None)
    });
    let claims = state.keys.verify(&token).unwrap();
    let foreign = other.keys.sign(claims.sub, Role::Admin).unwrap();

    // Issued two hours ago, so already expired.
    let stale = state
        .keys
        .sign_at(
            claims.sub,
            Role::User,
            time::OffsetDateTime::now_utc() - time::Duration::hours(2),
        )
        .unwrap();

    let mut tampered = token.clone();
    let last = tampered.pop().unwrap();
    tampered.push(if last == 'A' { 'B' } else { 'A' });

    for bad in [foreign.as_str(), stale.as_str(), tampered.as_str(), "garbage"] {
        let (status, body) = send(&app, "GET", "/api/auth/protected", Some(bad), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Token is not valid");

        let (status, _) = send(&app, "GET", "/api/auth/admin-only", Some(bad), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn me_returns_public_profile() {
    let (app, _) = test_app();
    let (_, body) = signup(&app, "alice", "a@x.com", "secret1").await;
    let token = body["token"].as_str().unwrap();

    let (status, body) = send(&app, "GET", "/api/auth/me", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
    assert_eq!(body["email"], "a@x.com");
    assert_eq!(body["role"], "user");
    assert!(body.get("password_hash").is_none());
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn signout_and_health() {
    let (app, _) = test_app();
    let (status, body) = send(&app, "GET", "/api/auth/signout", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        "User signed out successfully (token should be removed from client)"
    );

    let (status, _) = send(&app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn email_signin_is_not_shadowed_by_username() {
    let (app, _) = test_app();

    let (status, body) = signup(&app, "b@x.com", "a@x.com", "secretA").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Username must not contain '@'");

    let (status, _) = signup(&app, "bob", "b@x.com", "secretB").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = signin(&app, "b@x.com", "secretB").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logged in successfully");
}

#[tokio::test]
async fn malformed_signup_body_gets_json_400() {
    let (app, _) = test_app();

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({ "username": "alice", "email": "a@x.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid request body");

    let request = Request::builder()
        .uri("/api/auth/signin")
        .method("POST")
        .body(Body::from("identifier=alice"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["message"], "Expected a JSON request body");
}

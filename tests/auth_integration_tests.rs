use axum::{
    body::Body,
    extract::FromRequestParts,
    http::{Method, Request, StatusCode, Uri, header, request::Parts},
};
use chrono::{Duration, Utc};
use serde_json::{Value, json};
use std::sync::Arc;
use studio_cms::{
    AppState, create_router,
    auth::{AUTH_COOKIE, AuthAdmin, hash_password, issue_token},
    background::RemoveBgClient,
    config::{AppConfig, Env},
    error::AppError,
    models::{Admin, ROLE_ADMIN, ROLE_SUPERADMIN},
    repository::InMemoryRepository,
    storage::MockStorageService,
};
use tower::util::ServiceExt;
use uuid::Uuid;

// --- Helper Functions ---

const TEST_JWT_SECRET: &str = "test-secret-value-1234567890";
const TEST_ADMIN_ID: Uuid = Uuid::from_u128(1);
const TEST_PASSWORD: &str = "correct horse battery staple";

fn test_admin(is_active: bool) -> Admin {
    Admin {
        id: TEST_ADMIN_ID,
        username: "AdminN0lder".to_string(),
        password_hash: hash_password(TEST_PASSWORD).unwrap(),
        role: ROLE_SUPERADMIN.to_string(),
        is_active,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

async fn create_app_state(env: Env, admins: Vec<Admin>) -> AppState {
    let repo = InMemoryRepository::new();
    for admin in admins {
        repo.put_admin(admin).await;
    }

    let config = AppConfig {
        env,
        jwt_secret: TEST_JWT_SECRET.to_string(),
        ..AppConfig::default()
    };

    AppState {
        repo: Arc::new(repo),
        storage: Arc::new(MockStorageService::new()),
        background: Arc::new(RemoveBgClient::new(None, "http://127.0.0.1:9/unused")),
        config,
    }
}

fn token_for(admin: &Admin, ttl: Duration) -> String {
    issue_token(admin, TEST_JWT_SECRET, ttl).unwrap().0
}

fn get_request_parts(method: Method, uri: Uri) -> Parts {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let (parts, _) = request.into_parts();
    parts
}

async fn extract(state: &AppState, header_name: header::HeaderName, value: &str) -> Result<AuthAdmin, AppError> {
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts
        .headers
        .insert(header_name, header::HeaderValue::from_str(value).unwrap());
    AuthAdmin::from_request_parts(&mut parts, state).await
}

async fn send(state: AppState, request: Request<Body>) -> (StatusCode, header::HeaderMap, Value) {
    let response = create_router(state).oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, serde_json::from_slice(&bytes).unwrap())
}

fn login_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// --- Extractor ---

#[tokio::test]
async fn test_auth_success_with_bearer_token() {
    let admin = test_admin(true);
    let state = create_app_state(Env::Production, vec![admin.clone()]).await;
    let token = token_for(&admin, Duration::hours(1));

    let auth = extract(&state, header::AUTHORIZATION, &format!("Bearer {token}"))
        .await
        .unwrap();

    assert_eq!(auth.id, TEST_ADMIN_ID);
    assert_eq!(auth.username, "AdminN0lder");
    assert_eq!(auth.role, ROLE_SUPERADMIN);
}

#[tokio::test]
async fn test_auth_success_with_session_cookie() {
    let admin = test_admin(true);
    let state = create_app_state(Env::Local, vec![admin.clone()]).await;
    let token = token_for(&admin, Duration::hours(1));

    let auth = extract(&state, header::COOKIE, &format!("{AUTH_COOKIE}={token}"))
        .await
        .unwrap();

    assert_eq!(auth.id, TEST_ADMIN_ID);
}

#[tokio::test]
async fn test_auth_failure_with_missing_token() {
    let state = create_app_state(Env::Production, vec![test_admin(true)]).await;
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());

    let result = AuthAdmin::from_request_parts(&mut parts, &state).await;

    assert_eq!(result.unwrap_err(), AppError::Unauthorized("Unauthorized".to_string()));
}

#[tokio::test]
async fn test_auth_failure_with_expired_or_foreign_token() {
    let admin = test_admin(true);
    let state = create_app_state(Env::Production, vec![admin.clone()]).await;

    let expired = token_for(&admin, Duration::hours(-2));
    let result = extract(&state, header::AUTHORIZATION, &format!("Bearer {expired}")).await;
    assert_eq!(result.unwrap_err(), AppError::Unauthorized("Invalid token".to_string()));

    let (foreign, _) = issue_token(&admin, "some-other-secret", Duration::hours(1)).unwrap();
    let result = extract(&state, header::AUTHORIZATION, &format!("Bearer {foreign}")).await;
    assert_eq!(result.unwrap_err(), AppError::Unauthorized("Invalid token".to_string()));
}

#[tokio::test]
async fn test_auth_failure_for_deactivated_admin() {
    let active = test_admin(true);
    let token = token_for(&active, Duration::hours(1));
    // The account was deactivated after the token was issued.
    let state = create_app_state(Env::Production, vec![test_admin(false)]).await;

    let result = extract(&state, header::AUTHORIZATION, &format!("Bearer {token}")).await;

    assert_eq!(result.unwrap_err(), AppError::Unauthorized("Invalid token".to_string()));
}

#[tokio::test]
async fn test_role_comes_from_the_stored_row() {
    let admin = test_admin(true);
    let token = token_for(&admin, Duration::hours(1));
    let demoted = Admin {
        role: ROLE_ADMIN.to_string(),
        ..admin
    };
    let state = create_app_state(Env::Production, vec![demoted]).await;

    let auth = extract(&state, header::AUTHORIZATION, &format!("Bearer {token}"))
        .await
        .unwrap();

    assert_eq!(auth.role, ROLE_ADMIN);
}

// --- Login / logout / me ---

#[tokio::test]
async fn test_login_sets_cookie_and_returns_profile() {
    let state = create_app_state(Env::Production, vec![test_admin(true)]).await;

    let (status, headers, body) = send(
        state,
        login_request(json!({"username": "AdminN0lder", "password": TEST_PASSWORD})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["admin"]["username"], "AdminN0lder");
    assert!(body["data"]["admin"].get("password_hash").is_none());

    let cookie = headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
    let token = body["data"]["token"].as_str().unwrap();
    assert!(cookie.starts_with(&format!("{AUTH_COOKIE}={token};")));
    assert!(cookie.contains("Max-Age=86400"));
    assert!(cookie.contains("Secure"));
}

#[tokio::test]
async fn test_login_remember_me_extends_the_session() {
    let state = create_app_state(Env::Local, vec![test_admin(true)]).await;

    let (status, headers, _) = send(
        state,
        login_request(json!({
            "username": "AdminN0lder",
            "password": TEST_PASSWORD,
            "remember_me": true
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let cookie = headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cookie.contains(&format!("Max-Age={}", 7 * 24 * 3600)));
    assert!(!cookie.contains("Secure"));
}

#[tokio::test]
async fn test_login_rejects_bad_credentials_uniformly() {
    let state = create_app_state(Env::Local, vec![test_admin(true)]).await;

    let (status, _, wrong_password) = send(
        state.clone(),
        login_request(json!({"username": "AdminN0lder", "password": "nope"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, unknown_user) = send(
        state,
        login_request(json!({"username": "ghost", "password": "nope"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password["message"], unknown_user["message"]);
}

#[tokio::test]
async fn test_login_inactive_admin_is_forbidden() {
    let state = create_app_state(Env::Local, vec![test_admin(false)]).await;

    let (status, _, body) = send(
        state,
        login_request(json!({"username": "AdminN0lder", "password": TEST_PASSWORD})),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Admin account is inactive");
}

#[tokio::test]
async fn test_login_requires_both_fields() {
    let state = create_app_state(Env::Local, vec![test_admin(true)]).await;

    let (status, _, body) = send(state, login_request(json!({"username": "AdminN0lder"}))).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let state = create_app_state(Env::Local, vec![]).await;

    let (status, headers, body) = send(
        state,
        Request::builder()
            .method("POST")
            .uri("/auth/logout")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], Value::Null);
    let cookie = headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cookie.starts_with(&format!("{AUTH_COOKIE}=;")));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_me_with_and_without_session() {
    let admin = test_admin(true);
    let state = create_app_state(Env::Local, vec![admin.clone()]).await;
    let token = token_for(&admin, Duration::hours(1));

    let (status, _, body) = send(
        state.clone(),
        Request::builder()
            .uri("/auth/me")
            .header(header::COOKIE, format!("{AUTH_COOKIE}={token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], TEST_ADMIN_ID.to_string());

    let (status, _, body) = send(
        state,
        Request::builder().uri("/auth/me").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Unauthorized");
}

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::{Duration, Utc};
use serde_json::Value;
use std::sync::Arc;
use studio_cms::{
    AppConfig, AppState, create_router,
    auth::issue_token,
    background::{BackgroundRemover, ImageBytes, RemoveBgClient},
    models::{Admin, ROLE_ADMIN},
    repository::InMemoryRepository,
    storage::MockStorageService,
};
use tower::util::ServiceExt;
use uuid::Uuid;

const BOUNDARY: &str = "studio-test-boundary";

/// Pretends to cut out the background by returning a PNG.
struct PngRemover;

#[async_trait]
impl BackgroundRemover for PngRemover {
    async fn remove_background(&self, _image: ImageBytes) -> ImageBytes {
        ImageBytes {
            bytes: b"transparent-png".to_vec(),
            content_type: "image/png".to_string(),
        }
    }
}

struct TestContext {
    router: axum::Router,
    storage: MockStorageService,
    token: String,
}

async fn context(storage: MockStorageService, remover: Arc<dyn BackgroundRemover>) -> TestContext {
    let repo = InMemoryRepository::new();
    let admin = Admin {
        id: Uuid::new_v4(),
        username: "uploader".to_string(),
        role: ROLE_ADMIN.to_string(),
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        ..Admin::default()
    };
    repo.put_admin(admin.clone()).await;

    let config = AppConfig {
        max_upload_bytes: 64,
        ..AppConfig::default()
    };
    let (token, _) = issue_token(&admin, &config.jwt_secret, Duration::hours(1)).unwrap();

    let state = AppState {
        repo: Arc::new(repo),
        storage: Arc::new(storage.clone()),
        config,
        background: remover,
    };

    TestContext {
        router: create_router(state),
        storage,
        token,
    }
}

fn no_removal() -> Arc<dyn BackgroundRemover> {
    Arc::new(RemoveBgClient::new(None, "http://127.0.0.1:9/unused"))
}

fn multipart(field: &str, content_type: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"upload.bin\"\r\nContent-Type: {content_type}\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

async fn upload(ctx: &TestContext, query: &str, body: Vec<u8>) -> (StatusCode, Value) {
    let response = ctx
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/admin/uploads{query}"))
                .header(header::AUTHORIZATION, format!("Bearer {}", ctx.token))
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_upload_success() {
    let ctx = context(MockStorageService::new(), no_removal()).await;

    let (status, body) = upload(&ctx, "?folder=films", multipart("file", "image/jpeg", b"jpeg")).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    let path = body["data"]["path"].as_str().unwrap();
    assert!(path.starts_with("films/"));
    assert!(path.ends_with(".jpg"));
    assert_eq!(body["data"]["url"], format!("/uploads/{path}"));
    assert_eq!(body["data"]["size"], 4);
    assert_eq!(ctx.storage.stored(path).as_deref(), Some(&b"jpeg"[..]));
}

#[tokio::test]
async fn test_upload_defaults_to_misc_folder() {
    let ctx = context(MockStorageService::new(), no_removal()).await;

    let (status, body) = upload(&ctx, "", multipart("file", "image/webp", b"webp")).await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(body["data"]["path"].as_str().unwrap().starts_with("misc/"));
}

#[tokio::test]
async fn test_upload_rejects_unsupported_type() {
    let ctx = context(MockStorageService::new(), no_removal()).await;

    let (status, body) = upload(&ctx, "", multipart("file", "application/pdf", b"%PDF")).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
    assert!(ctx.storage.stored_keys().is_empty());
}

#[tokio::test]
async fn test_upload_rejects_oversized_and_empty_files() {
    let ctx = context(MockStorageService::new(), no_removal()).await;

    let (status, _) = upload(&ctx, "", multipart("file", "image/png", &[0u8; 65])).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = upload(&ctx, "", multipart("file", "image/png", b"")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    assert!(ctx.storage.stored_keys().is_empty());
}

#[tokio::test]
async fn test_upload_requires_file_field() {
    let ctx = context(MockStorageService::new(), no_removal()).await;

    let (status, body) = upload(&ctx, "", multipart("poster", "image/png", b"png")).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "A 'file' field is required");
}

#[tokio::test]
async fn test_upload_rejects_path_like_folder() {
    let ctx = context(MockStorageService::new(), no_removal()).await;

    let (status, _) = upload(&ctx, "?folder=..%2Fetc", multipart("file", "image/png", b"png")).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_upload_with_background_removal_stores_png() {
    let ctx = context(MockStorageService::new(), Arc::new(PngRemover)).await;

    let (status, body) = upload(
        &ctx,
        "?folder=hero&remove_background=true",
        multipart("file", "image/jpeg", b"jpeg"),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let path = body["data"]["path"].as_str().unwrap();
    assert!(path.ends_with(".png"));
    assert_eq!(body["data"]["content_type"], "image/png");
    assert_eq!(ctx.storage.stored(path).as_deref(), Some(&b"transparent-png"[..]));
}

#[tokio::test]
async fn test_upload_storage_failure() {
    let ctx = context(MockStorageService::new_failing(), no_removal()).await;

    let (status, body) = upload(&ctx, "", multipart("file", "image/png", b"png")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Internal server error");
}

#[tokio::test]
async fn test_upload_requires_session() {
    let ctx = context(MockStorageService::new(), no_removal()).await;

    let response = ctx
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/admin/uploads")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(multipart("file", "image/png", b"png")))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

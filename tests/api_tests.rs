use reqwest::StatusCode;
use serde_json::{Value, json};
use std::sync::Arc;
use studio_cms::{
    AppConfig, AppState, InMemoryRepository, MockStorageService, RemoveBgClient, create_router,
    models::FilmFilter,
    repository::{Repository, RepositoryState},
    seed::seed_admin,
    storage::StorageState,
};
use tokio::net::TcpListener;

const USERNAME: &str = "AdminN0lder";
const PASSWORD: &str = "correct-horse-battery";

pub struct TestApp {
    pub address: String,
    pub repo: Arc<InMemoryRepository>,
}

async fn spawn_app() -> TestApp {
    let repo = Arc::new(InMemoryRepository::new());
    seed_admin(&*repo, USERNAME, PASSWORD, "superadmin")
        .await
        .expect("Failed to seed admin");

    let config = AppConfig::default();
    let background = Arc::new(RemoveBgClient::new(None, &config.remove_bg_endpoint));
    let state = AppState {
        repo: repo.clone() as RepositoryState,
        storage: Arc::new(MockStorageService::new()) as StorageState,
        config,
        background,
    };
    let router = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp { address, repo }
}

async fn login(app: &TestApp, client: &reqwest::Client) -> String {
    let response = client
        .post(format!("{}/auth/login", app.address))
        .json(&json!({ "username": USERNAME, "password": PASSWORD }))
        .send()
        .await
        .expect("login request failed");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    body["data"]["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("req fail");
    assert!(response.status().is_success());
    assert!(response.headers().contains_key("x-request-id"));

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert!(body["message"].is_string());
    assert!(body.get("data").is_some());
}

#[tokio::test]
async fn test_film_lifecycle_through_public_and_admin_listings() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let token = login(&app, &client).await;

    // Create
    let response = client
        .post(format!("{}/admin/films", app.address))
        .bearer_auth(&token)
        .json(&json!({ "film_title": "Inception", "status": "now_showing", "duration": 148 }))
        .send()
        .await
        .expect("post fail");
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["slug"], "inception");
    assert_eq!(body["data"]["genres"], json!([]));
    let id = body["data"]["id"].as_str().unwrap().to_string();

    // Public list filtered by status
    let list: Value = client
        .get(format!("{}/films?status=now_showing", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let items = list["data"]["items"].as_array().unwrap();
    assert!(items.iter().any(|f| f["id"] == id.as_str()));

    // Soft delete
    let response = client
        .delete(format!("{}/admin/films/{}", app.address, id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let list: Value = client
        .get(format!("{}/films?status=now_showing", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let items = list["data"]["items"].as_array().unwrap();
    assert!(items.iter().all(|f| f["id"] != id.as_str()));

    let response = client
        .get(format!("{}/films/{}", app.address, id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Audit listing still shows it
    let list: Value = client
        .get(format!(
            "{}/admin/films?status=all&include_deleted=true",
            app.address
        ))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let deleted = list["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .find(|f| f["id"] == id.as_str())
        .expect("deleted film missing from audit listing");
    assert!(!deleted["deleted_at"].is_null());
}

#[tokio::test]
async fn test_admin_routes_require_a_session() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/admin/films", app.address))
        .json(&json!({ "film_title": "Inception" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(body["data"].is_null());

    let page = app.repo.list_films(&FilmFilter::default()).await.unwrap();
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn test_pagination_metadata() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let token = login(&app, &client).await;

    for title in ["Alpha", "Bravo", "Charlie", "Delta", "Echo"] {
        let response = client
            .post(format!("{}/admin/films", app.address))
            .bearer_auth(&token)
            .json(&json!({ "film_title": title }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let list: Value = client
        .get(format!("{}/films?page=2&limit=2", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(list["data"]["items"].as_array().unwrap().len(), 2);
    assert_eq!(
        list["data"]["pagination"],
        json!({ "page": 2, "limit": 2, "total_count": 5, "total_pages": 3 })
    );
}

#[tokio::test]
async fn test_promo_shows_current_month_items_with_banner() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let token = login(&app, &client).await;

    let create = |payload: Value| {
        client
            .post(format!("{}/admin/contents", app.address))
            .bearer_auth(&token)
            .json(&payload)
            .send()
    };

    let response = create(json!({
        "title": "Official Trailer",
        "platform": "youtube",
        "url": "https://youtube.com/watch?v=trailer",
        "banner": "/uploads/contents/trailer.jpg",
        "is_published": true
    }))
    .await
    .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // No banner
    create(json!({
        "title": "Podcast Episode 1",
        "platform": "podcast",
        "url": "https://example.com/ep1",
        "is_published": true
    }))
    .await
    .unwrap();

    // Unpublished
    create(json!({
        "title": "Set Photos",
        "platform": "instagram",
        "url": "https://instagram.com/p/1",
        "banner": "/uploads/contents/set.jpg"
    }))
    .await
    .unwrap();

    let promo: Value = client
        .get(format!("{}/contents/promo", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let items = promo["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "Official Trailer");
}

#[tokio::test]
async fn test_malformed_json_is_a_validation_envelope() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();
    let token = login(&app, &client).await;

    let response = client
        .post(format!("{}/admin/genres", app.address))
        .bearer_auth(&token)
        .header("content-type", "application/json")
        .body("{\"name\": ")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(!body["message"].as_str().unwrap().is_empty());
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/no-such-page", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

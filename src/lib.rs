use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Cross-cutting building blocks.
pub mod config;
pub mod error;
pub mod extract;
pub mod pagination;
pub mod response;
pub mod slug;
pub mod validation;

// Core application services and components.
pub mod access;
pub mod auth;
pub mod background;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod seed;
pub mod storage;

// Module for routing segregation (Public, Authenticated, Admin).
pub mod routes;
use auth::AuthAdmin;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

pub use background::{BackgroundState, RemoveBgClient};
pub use config::AppConfig;
pub use repository::{InMemoryRepository, PostgresRepository, RepositoryState};
pub use storage::{LocalDiskStorage, MockStorageService, StorageState};

/// ApiDoc
///
/// OpenAPI document aggregated from the `#[utoipa::path]` handlers and the
/// `ToSchema` models. Served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::auth::login, handlers::auth::logout, handlers::auth::me,
        handlers::films::list_public_films, handlers::films::get_public_film,
        handlers::films::list_films, handlers::films::get_film, handlers::films::create_film,
        handlers::films::update_film, handlers::films::delete_film, handlers::films::restore_film,
        handlers::genres::list_public_genres, handlers::genres::list_genres,
        handlers::genres::create_genre, handlers::genres::update_genre,
        handlers::genres::delete_genre,
        handlers::categories::list_public_categories, handlers::categories::list_categories,
        handlers::categories::create_category, handlers::categories::update_category,
        handlers::categories::delete_category,
        handlers::articles::list_public_articles, handlers::articles::get_public_article,
        handlers::articles::list_articles, handlers::articles::get_article,
        handlers::articles::create_article, handlers::articles::update_article,
        handlers::articles::delete_article, handlers::articles::publish_article,
        handlers::articles::unpublish_article,
        handlers::contents::list_public_contents, handlers::contents::promo_contents,
        handlers::contents::list_contents, handlers::contents::get_content,
        handlers::contents::create_content, handlers::contents::update_content,
        handlers::contents::delete_content, handlers::contents::publish_content,
        handlers::contents::unpublish_content,
        handlers::projects::list_public_projects, handlers::projects::list_projects,
        handlers::projects::get_project, handlers::projects::create_project,
        handlers::projects::update_project, handlers::projects::delete_project,
        handlers::hero_images::list_public_hero_images, handlers::hero_images::list_hero_images,
        handlers::hero_images::create_hero_image, handlers::hero_images::update_hero_image,
        handlers::hero_images::delete_hero_image,
        handlers::organization::list_public_divisions, handlers::organization::active_cabinet,
        handlers::organization::list_divisions, handlers::organization::create_division,
        handlers::organization::update_division, handlers::organization::delete_division,
        handlers::organization::list_cabinets, handlers::organization::get_cabinet,
        handlers::organization::create_cabinet, handlers::organization::update_cabinet,
        handlers::organization::delete_cabinet, handlers::organization::add_cabinet_member,
        handlers::organization::update_cabinet_member,
        handlers::organization::delete_cabinet_member,
        handlers::stats::get_stats,
        handlers::uploads::upload_file,
    ),
    components(
        schemas(
            models::AdminProfile, models::LoginRequest, models::LoginResponse,
            models::Film, models::FilmDetail, models::FilmStatus, models::Genre,
            models::CreateFilmRequest, models::UpdateFilmRequest, models::GenreRequest,
            models::Article, models::ArticleDetail, models::ArticleStatus, models::ArticleImage,
            models::ArticleCategory, models::ArticleImageInput, models::CreateArticleRequest,
            models::UpdateArticleRequest, models::CategoryRequest,
            models::Content, models::Platform, models::CreateContentRequest,
            models::UpdateContentRequest,
            models::Project, models::ProjectRequest,
            models::HeroImage, models::HeroImageRequest,
            models::Division, models::Cabinet, models::CabinetStatus, models::CabinetMember,
            models::CabinetDetail, models::DivisionRequest, models::CabinetRequest,
            models::CabinetMemberRequest,
            models::DashboardStats, models::UploadResponse,
            pagination::Pagination,
        )
    ),
    tags(
        (name = "studio-cms", description = "Film studio site and admin CMS API")
    )
)]
pub struct ApiDoc;

/// AppState
///
/// The single shared state of the application. Every service sits behind a trait
/// object so tests can swap in the in-memory repository and mock storage.
#[derive(Clone)]
pub struct AppState {
    /// Persistence: Postgres in production, in-memory in tests.
    pub repo: RepositoryState,
    /// Where uploaded files are written.
    pub storage: StorageState,
    pub config: AppConfig,
    /// Optional background removal for uploaded images.
    pub background: BackgroundState,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for StorageState {
    fn from_ref(app_state: &AppState) -> StorageState {
        app_state.storage.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

impl FromRef<AppState> for BackgroundState {
    fn from_ref(app_state: &AppState) -> BackgroundState {
        app_state.background.clone()
    }
}

/// auth_middleware
///
/// Rejects the request before routing when `AuthAdmin` cannot be extracted
/// (missing, invalid or expired token, or an inactive account).
async fn auth_middleware(_admin: AuthAdmin, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the routers, the session middleware, static upload serving and the
/// observability layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let uploads = ServeDir::new(&state.config.upload_dir);
    let upload_prefix = state.config.upload_url_prefix.clone();

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .nest(
            "/admin",
            admin::admin_routes(state.config.max_upload_bytes).route_layer(
                middleware::from_fn_with_state(state.clone(), auth_middleware),
            ),
        )
        // Uploaded files are served as-is from disk.
        .nest_service(&upload_prefix, uploads)
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// Span for one request, tagged with its `x-request-id`.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}

use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints open to anonymous clients. List handlers here force the published
/// filters themselves (published articles and contents, non-deleted films), so
/// drafts never leak whatever query string is sent.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for the load balancer.
        .route("/health", get(handlers::health))
        // --- Session gateway ---
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        // --- Films ---
        // GET /films?status=all|now_showing|...&search=&genre_id=&page=&limit=
        .route("/films", get(handlers::films::list_public_films))
        .route("/films/{id}", get(handlers::films::get_public_film))
        .route("/genres", get(handlers::genres::list_public_genres))
        // --- Articles ---
        .route("/articles", get(handlers::articles::list_public_articles))
        // Articles are addressed by slug on the public site.
        .route("/articles/{slug}", get(handlers::articles::get_public_article))
        .route(
            "/article-categories",
            get(handlers::categories::list_public_categories),
        )
        // --- Promotional content ---
        .route("/contents", get(handlers::contents::list_public_contents))
        // GET /contents/promo
        // Banners for the current calendar month only.
        .route("/contents/promo", get(handlers::contents::promo_contents))
        .route("/hero-images", get(handlers::hero_images::list_public_hero_images))
        .route("/projects", get(handlers::projects::list_public_projects))
        // --- Organization ---
        .route("/divisions", get(handlers::organization::list_public_divisions))
        .route("/cabinets/active", get(handlers::organization::active_cabinet))
}

use crate::{AppState, handlers};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post, put},
};

use handlers::{
    articles, categories, contents, films, genres, hero_images, organization, projects, stats,
    uploads,
};

/// Multipart framing on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

fn upload_body_limit(max_upload_bytes: usize) -> usize {
    max_upload_bytes.saturating_add(MULTIPART_OVERHEAD)
}

/// Admin Router Module
///
/// The dashboard API, nested under `/admin` and wrapped in the auth middleware.
/// Mutations of owned resources are authorized per row inside the handlers
/// (creator or superadmin); reference data (genres, categories, divisions) is open
/// to every admin.
pub fn admin_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        // GET /admin/stats
        .route("/stats", get(stats::get_stats))
        // --- Films ---
        // GET supports `status=all&include_deleted=true` to audit soft-deleted films.
        .route("/films", get(films::list_films).post(films::create_film))
        .route(
            "/films/{id}",
            get(films::get_film)
                .put(films::update_film)
                .delete(films::delete_film),
        )
        .route("/films/{id}/restore", post(films::restore_film))
        // --- Genres ---
        .route("/genres", get(genres::list_genres).post(genres::create_genre))
        .route(
            "/genres/{id}",
            put(genres::update_genre).delete(genres::delete_genre),
        )
        // --- Article categories ---
        .route(
            "/article-categories",
            get(categories::list_categories).post(categories::create_category),
        )
        .route(
            "/article-categories/{id}",
            put(categories::update_category).delete(categories::delete_category),
        )
        // --- Articles ---
        .route(
            "/articles",
            get(articles::list_articles).post(articles::create_article),
        )
        .route(
            "/articles/{id}",
            get(articles::get_article)
                .put(articles::update_article)
                .delete(articles::delete_article),
        )
        // POST publishes, DELETE unpublishes.
        .route(
            "/articles/{id}/publish",
            post(articles::publish_article).delete(articles::unpublish_article),
        )
        // --- Contents ---
        .route(
            "/contents",
            get(contents::list_contents).post(contents::create_content),
        )
        .route(
            "/contents/{id}",
            get(contents::get_content)
                .put(contents::update_content)
                .delete(contents::delete_content),
        )
        .route(
            "/contents/{id}/publish",
            post(contents::publish_content).delete(contents::unpublish_content),
        )
        // --- Projects ---
        .route(
            "/projects",
            get(projects::list_projects).post(projects::create_project),
        )
        .route(
            "/projects/{id}",
            get(projects::get_project)
                .put(projects::update_project)
                .delete(projects::delete_project),
        )
        // --- Hero images ---
        .route(
            "/hero-images",
            get(hero_images::list_hero_images).post(hero_images::create_hero_image),
        )
        .route(
            "/hero-images/{id}",
            put(hero_images::update_hero_image).delete(hero_images::delete_hero_image),
        )
        // --- Organization ---
        .route(
            "/divisions",
            get(organization::list_divisions).post(organization::create_division),
        )
        .route(
            "/divisions/{id}",
            put(organization::update_division).delete(organization::delete_division),
        )
        .route(
            "/cabinets",
            get(organization::list_cabinets).post(organization::create_cabinet),
        )
        .route(
            "/cabinets/{id}",
            get(organization::get_cabinet)
                .put(organization::update_cabinet)
                .delete(organization::delete_cabinet),
        )
        .route(
            "/cabinets/{id}/members",
            post(organization::add_cabinet_member),
        )
        .route(
            "/cabinet-members/{id}",
            put(organization::update_cabinet_member).delete(organization::delete_cabinet_member),
        )
        // POST /admin/uploads?folder=&remove_background=
        // The body limit leaves room for multipart framing; the handler enforces the
        // exact file size.
        .route(
            "/uploads",
            post(uploads::upload_file)
                .layer(DefaultBodyLimit::max(upload_body_limit(max_upload_bytes))),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_body_limit_adds_framing_without_overflow() {
        assert_eq!(upload_body_limit(5 * 1024 * 1024), 5 * 1024 * 1024 + MULTIPART_OVERHEAD);
        assert_eq!(upload_body_limit(usize::MAX), usize::MAX);
        assert_eq!(upload_body_limit(usize::MAX - 1), usize::MAX);
    }

    #[test]
    fn admin_routes_build_with_huge_upload_limit() {
        let _router: Router<AppState> = admin_routes(usize::MAX);
    }
}

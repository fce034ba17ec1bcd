use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Authenticated Router Module
///
/// Session-bound routes outside the dashboard API. The router is wrapped in the
/// auth middleware in `create_router`, and every handler also takes `AuthAdmin`.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /auth/me
        // The caller's profile; used by the dashboard to restore a session.
        .route("/auth/me", get(handlers::auth::me))
}

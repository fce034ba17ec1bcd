//! Route handlers, one per resource-action pair.
//!
//! Every admin handler follows the same pipeline: the `AuthAdmin` extractor
//! authenticates, `access::ensure_owned` authorizes, `validation` checks the payload,
//! the repository queries or mutates, and the result is wrapped in `ApiResponse`.

use axum::extract::State;

use crate::{AppState, access::ResourceKind, error::AppError, response::ApiResponse};

pub mod articles;
pub mod auth;
pub mod categories;
pub mod contents;
pub mod films;
pub mod genres;
pub mod hero_images;
pub mod organization;
pub mod projects;
pub mod stats;
pub mod uploads;

/// Outcome of `delete_resource`: `false` means the row vanished in between.
pub(crate) async fn delete_or_not_found(
    state: &AppState,
    kind: ResourceKind,
    id: uuid::Uuid,
) -> Result<ApiResponse<()>, AppError> {
    if state.repo.delete_resource(kind, id).await? {
        Ok(ApiResponse::message(format!("{} deleted", kind.label())))
    } else {
        Err(AppError::not_found(kind.label()))
    }
}

/// health
///
/// [Public Route] Liveness probe. Does not touch the database.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up"))
)]
pub async fn health(State(_state): State<AppState>) -> ApiResponse<()> {
    ApiResponse::message("OK")
}

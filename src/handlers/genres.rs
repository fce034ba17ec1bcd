use axum::extract::{Path, State};
use uuid::Uuid;

use crate::{
    AppState,
    access::ResourceKind,
    auth::AuthAdmin,
    error::{ApiResult, AppError},
    extract::AppJson,
    models::{Genre, GenreRequest},
    response::ApiResponse,
    validation::{derive_slug, required},
};

use super::delete_or_not_found;

async fn name_and_slug(
    state: &AppState,
    payload: GenreRequest,
    exclude: Option<Uuid>,
) -> Result<(String, String), AppError> {
    let name = required(payload.name, "name")?;
    let slug = derive_slug(&name)?;
    if state.repo.genre_slug_taken(&slug, exclude).await? {
        return Err(AppError::Conflict(format!("Genre '{name}' already exists")));
    }
    Ok((name, slug))
}

/// list_public_genres
///
/// [Public Route] All genres, alphabetical.
#[utoipa::path(
    get,
    path = "/genres",
    responses((status = 200, description = "Genres", body = [Genre]))
)]
pub async fn list_public_genres(State(state): State<AppState>) -> ApiResult<Vec<Genre>> {
    Ok(ApiResponse::ok(state.repo.list_genres().await?, "Genres retrieved"))
}

#[utoipa::path(
    get,
    path = "/admin/genres",
    responses((status = 200, description = "Genres", body = [Genre]))
)]
pub async fn list_genres(_admin: AuthAdmin, State(state): State<AppState>) -> ApiResult<Vec<Genre>> {
    Ok(ApiResponse::ok(state.repo.list_genres().await?, "Genres retrieved"))
}

/// create_genre
///
/// [Admin Route] Genres are reference data: any admin may manage them.
#[utoipa::path(
    post,
    path = "/admin/genres",
    request_body = GenreRequest,
    responses(
        (status = 201, description = "Created", body = Genre),
        (status = 409, description = "Duplicate name")
    )
)]
pub async fn create_genre(
    _admin: AuthAdmin,
    State(state): State<AppState>,
    AppJson(payload): AppJson<GenreRequest>,
) -> ApiResult<Genre> {
    let (name, slug) = name_and_slug(&state, payload, None).await?;
    let genre = state.repo.create_genre(name, slug).await?;
    Ok(ApiResponse::created(genre, "Genre created"))
}

#[utoipa::path(
    put,
    path = "/admin/genres/{id}",
    params(("id" = Uuid, Path, description = "Genre ID")),
    request_body = GenreRequest,
    responses((status = 200, description = "Updated", body = Genre))
)]
pub async fn update_genre(
    _admin: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<GenreRequest>,
) -> ApiResult<Genre> {
    if state.repo.get_genre(id).await?.is_none() {
        return Err(AppError::not_found("Genre"));
    }
    let (name, slug) = name_and_slug(&state, payload, Some(id)).await?;
    let genre = state
        .repo
        .update_genre(id, name, slug)
        .await?
        .ok_or_else(|| AppError::not_found("Genre"))?;
    Ok(ApiResponse::ok(genre, "Genre updated"))
}

/// delete_genre
///
/// [Admin Route] Refused with `409` while any film still references the genre.
#[utoipa::path(
    delete,
    path = "/admin/genres/{id}",
    params(("id" = Uuid, Path, description = "Genre ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 409, description = "Genre in use")
    )
)]
pub async fn delete_genre(
    _admin: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    if state.repo.get_genre(id).await?.is_none() {
        return Err(AppError::not_found("Genre"));
    }
    if state.repo.genre_usage(id).await? > 0 {
        return Err(AppError::Conflict(
            "Genre is in use by one or more films".to_string(),
        ));
    }
    delete_or_not_found(&state, ResourceKind::Genre, id).await
}

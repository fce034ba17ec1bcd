use axum::extract::{Path, State};
use uuid::Uuid;

use crate::{
    AppState,
    access::{ResourceKind, can_manage, ensure_active, ensure_owned},
    auth::AuthAdmin,
    error::{ApiResult, AppError},
    extract::{AppJson, AppQuery},
    models::{
        CreateFilmRequest, Film, FilmChanges, FilmDetail, FilmFilter, FilmQuery, FilmStatus,
        NewFilm, UpdateFilmRequest,
    },
    pagination::{Page, PageParams, Paginated},
    response::ApiResponse,
    validation::{derive_slug, not_blank, optional, positive, required, status_filter},
};

use super::delete_or_not_found;

async fn film_detail(state: &AppState, film: Film) -> Result<FilmDetail, AppError> {
    let genres = state.repo.film_genres(film.id).await?;
    Ok(FilmDetail { film, genres })
}

async fn list(state: &AppState, filter: FilmFilter) -> ApiResult<Paginated<FilmDetail>> {
    let params = filter.page;
    let page = state.repo.list_films(&filter).await?;

    let mut items = Vec::with_capacity(page.items.len());
    for film in page.items {
        items.push(film_detail(state, film).await?);
    }

    Ok(ApiResponse::ok(
        Paginated::from_page(Page { items, total: page.total }, params),
        "Films retrieved",
    ))
}

fn filter_from(query: FilmQuery, allow_deleted: bool) -> Result<FilmFilter, AppError> {
    Ok(FilmFilter {
        status: status_filter::<FilmStatus>(query.status.as_deref())?,
        search: query.search,
        genre_id: query.genre_id,
        include_deleted: allow_deleted && query.include_deleted.unwrap_or(false),
        page: PageParams::new(query.page, query.limit),
    })
}

/// Deduplicates the submitted genre ids and checks that each one exists.
async fn checked_genres(state: &AppState, genre_ids: Vec<Uuid>) -> Result<Vec<Uuid>, AppError> {
    let mut unique = Vec::with_capacity(genre_ids.len());
    for id in genre_ids {
        if unique.contains(&id) {
            continue;
        }
        if state.repo.get_genre(id).await?.is_none() {
            return Err(AppError::Validation(format!("Unknown genre {id}")));
        }
        unique.push(id);
    }
    Ok(unique)
}

async fn ensure_slug_free(state: &AppState, slug: &str, exclude: Option<Uuid>) -> Result<(), AppError> {
    if state.repo.film_slug_taken(slug, exclude).await? {
        return Err(AppError::Conflict(format!(
            "A film with slug '{slug}' already exists"
        )));
    }
    Ok(())
}

// --- Public ---

/// list_public_films
///
/// [Public Route] Paginated film listing. Soft-deleted films never appear here.
#[utoipa::path(
    get,
    path = "/films",
    params(FilmQuery),
    responses((status = 200, description = "Films with their genres", body = [FilmDetail]))
)]
pub async fn list_public_films(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<FilmQuery>,
) -> ApiResult<Paginated<FilmDetail>> {
    list(&state, filter_from(query, false)?).await
}

/// get_public_film
#[utoipa::path(
    get,
    path = "/films/{id}",
    params(("id" = Uuid, Path, description = "Film ID")),
    responses(
        (status = 200, description = "Found", body = FilmDetail),
        (status = 404, description = "Missing or deleted")
    )
)]
pub async fn get_public_film(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<FilmDetail> {
    let film = ensure_active(state.repo.get_film(id).await?)?;
    Ok(ApiResponse::ok(film_detail(&state, film).await?, "Film retrieved"))
}

// --- Admin ---

/// list_films
///
/// [Admin Route] Same filters as the public listing, plus `include_deleted=true` to
/// show soft-deleted rows (with their `deleted_at`).
#[utoipa::path(
    get,
    path = "/admin/films",
    params(FilmQuery),
    responses((status = 200, description = "Films", body = [FilmDetail]))
)]
pub async fn list_films(
    _admin: AuthAdmin,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<FilmQuery>,
) -> ApiResult<Paginated<FilmDetail>> {
    list(&state, filter_from(query, true)?).await
}

/// get_film
#[utoipa::path(
    get,
    path = "/admin/films/{id}",
    params(("id" = Uuid, Path, description = "Film ID")),
    responses((status = 200, description = "Found", body = FilmDetail))
)]
pub async fn get_film(
    _admin: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<FilmDetail> {
    let film = ensure_active(state.repo.get_film(id).await?)?;
    Ok(ApiResponse::ok(film_detail(&state, film).await?, "Film retrieved"))
}

/// create_film
///
/// [Admin Route] The slug is derived from `film_title`; a collision with a
/// non-deleted film is a `409` and nothing is written.
#[utoipa::path(
    post,
    path = "/admin/films",
    request_body = CreateFilmRequest,
    responses(
        (status = 201, description = "Created", body = FilmDetail),
        (status = 409, description = "Slug already used"),
        (status = 422, description = "Invalid payload")
    )
)]
pub async fn create_film(
    AuthAdmin { id: admin_id, .. }: AuthAdmin,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateFilmRequest>,
) -> ApiResult<FilmDetail> {
    let film_title = required(payload.film_title, "film_title")?;
    let slug = derive_slug(&film_title)?;
    let duration = positive(payload.duration, "duration")?;
    let genre_ids = checked_genres(&state, payload.genre_ids).await?;
    ensure_slug_free(&state, &slug, None).await?;

    let film = state
        .repo
        .create_film(
            NewFilm {
                slug,
                film_title,
                duration,
                director: optional(payload.director),
                release_date: payload.release_date,
                status: payload.status.unwrap_or_default(),
                poster_url: optional(payload.poster_url),
                trailer_url: optional(payload.trailer_url),
                synopsis: optional(payload.synopsis),
            },
            admin_id,
        )
        .await?;
    state.repo.set_film_genres(film.id, &genre_ids).await?;

    tracing::info!(film_id = %film.id, slug = %film.slug, "film created");
    Ok(ApiResponse::created(film_detail(&state, film).await?, "Film created"))
}

/// update_film
///
/// [Admin Route] Partial update. A new title re-derives the slug; `genre_ids`
/// replaces the genre set when present.
#[utoipa::path(
    put,
    path = "/admin/films/{id}",
    params(("id" = Uuid, Path, description = "Film ID")),
    request_body = UpdateFilmRequest,
    responses(
        (status = 200, description = "Updated", body = FilmDetail),
        (status = 403, description = "Not the owner"),
        (status = 409, description = "Slug already used")
    )
)]
pub async fn update_film(
    admin: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateFilmRequest>,
) -> ApiResult<FilmDetail> {
    let existing = ensure_owned(state.repo.get_film(id).await?, &admin)?;

    let film_title = not_blank(payload.film_title, "film_title")?;
    let slug = match &film_title {
        Some(title) => Some(derive_slug(title)?).filter(|slug| *slug != existing.slug),
        None => None,
    };
    if let Some(slug) = &slug {
        ensure_slug_free(&state, slug, Some(id)).await?;
    }
    let duration = positive(payload.duration, "duration")?;
    let genre_ids = match payload.genre_ids {
        Some(ids) => Some(checked_genres(&state, ids).await?),
        None => None,
    };

    let film = state
        .repo
        .update_film(
            id,
            FilmChanges {
                slug,
                film_title,
                duration,
                director: optional(payload.director),
                release_date: payload.release_date,
                status: payload.status,
                poster_url: optional(payload.poster_url),
                trailer_url: optional(payload.trailer_url),
                synopsis: optional(payload.synopsis),
            },
        )
        .await?
        .ok_or_else(|| AppError::not_found("Film"))?;

    if let Some(ids) = genre_ids {
        state.repo.set_film_genres(id, &ids).await?;
    }

    Ok(ApiResponse::ok(film_detail(&state, film).await?, "Film updated"))
}

/// delete_film
///
/// [Admin Route] Soft delete: the row stays, stamped with `deleted_at`.
#[utoipa::path(
    delete,
    path = "/admin/films/{id}",
    params(("id" = Uuid, Path, description = "Film ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Missing or already deleted")
    )
)]
pub async fn delete_film(
    admin: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    ensure_owned(state.repo.get_film(id).await?, &admin)?;
    delete_or_not_found(&state, ResourceKind::Film, id).await
}

/// restore_film
///
/// [Admin Route] Clears `deleted_at`. Fails with `409` when a live film has taken
/// the slug in the meantime.
#[utoipa::path(
    post,
    path = "/admin/films/{id}/restore",
    params(("id" = Uuid, Path, description = "Film ID")),
    responses(
        (status = 200, description = "Restored", body = FilmDetail),
        (status = 409, description = "Not deleted, or slug taken")
    )
)]
pub async fn restore_film(
    admin: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<FilmDetail> {
    let film = state
        .repo
        .get_film(id)
        .await?
        .ok_or_else(|| AppError::not_found("Film"))?;

    if !can_manage(film.admin_id, &admin) {
        return Err(AppError::Forbidden("Film belongs to another admin".to_string()));
    }
    if film.deleted_at.is_none() {
        return Err(AppError::Conflict("Film is not deleted".to_string()));
    }
    ensure_slug_free(&state, &film.slug, Some(id)).await?;

    let film = state
        .repo
        .restore_film(id)
        .await?
        .ok_or_else(|| AppError::not_found("Film"))?;
    Ok(ApiResponse::ok(film_detail(&state, film).await?, "Film restored"))
}

use axum::extract::{Path, State};
use chrono::{DateTime, Datelike, Months, NaiveTime, Utc};
use uuid::Uuid;

use crate::{
    AppState,
    access::{ResourceKind, ensure_active, ensure_owned},
    auth::AuthAdmin,
    error::{ApiResult, AppError},
    extract::{AppJson, AppQuery},
    models::{
        Content, ContentChanges, ContentFilter, ContentQuery, CreateContentRequest, NewContent,
        UpdateContentRequest,
    },
    pagination::{PageParams, Paginated},
    response::ApiResponse,
    validation::{not_blank, optional, required},
};

use super::delete_or_not_found;

/// promo_window
///
/// The calendar month containing `now`, as the half-open UTC range
/// `[first_of_month, first_of_next_month)`.
pub fn promo_window(now: DateTime<Utc>) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let first = now.date_naive().with_day(1)?;
    let next = first.checked_add_months(Months::new(1))?;
    Some((
        first.and_time(NaiveTime::MIN).and_utc(),
        next.and_time(NaiveTime::MIN).and_utc(),
    ))
}

async fn list(state: &AppState, filter: ContentFilter) -> ApiResult<Paginated<Content>> {
    let params = filter.page;
    let page = state.repo.list_contents(&filter).await?;
    Ok(ApiResponse::ok(
        Paginated::from_page(page, params),
        "Contents retrieved",
    ))
}

// --- Public ---

/// list_public_contents
///
/// [Public Route] Published contents only; `published` is ignored.
#[utoipa::path(
    get,
    path = "/contents",
    params(ContentQuery),
    responses((status = 200, description = "Published contents", body = [Content]))
)]
pub async fn list_public_contents(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ContentQuery>,
) -> ApiResult<Paginated<Content>> {
    let filter = ContentFilter {
        search: query.search,
        platform: query.platform,
        published: Some(true),
        page: PageParams::new(query.page, query.limit),
    };
    list(&state, filter).await
}

/// promo_contents
///
/// [Public Route] What the promo modal shows: published contents that carry a banner
/// and were published during the current calendar month (UTC).
#[utoipa::path(
    get,
    path = "/contents/promo",
    responses((status = 200, description = "This month's promos", body = [Content]))
)]
pub async fn promo_contents(State(state): State<AppState>) -> ApiResult<Vec<Content>> {
    let (from, until) = promo_window(Utc::now())
        .ok_or_else(|| AppError::Internal("could not compute the promo window".to_string()))?;
    let contents = state.repo.promo_contents(from, until).await?;
    Ok(ApiResponse::ok(contents, "Promo contents retrieved"))
}

// --- Admin ---

#[utoipa::path(
    get,
    path = "/admin/contents",
    params(ContentQuery),
    responses((status = 200, description = "Contents", body = [Content]))
)]
pub async fn list_contents(
    _admin: AuthAdmin,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ContentQuery>,
) -> ApiResult<Paginated<Content>> {
    let filter = ContentFilter {
        search: query.search,
        platform: query.platform,
        published: query.published,
        page: PageParams::new(query.page, query.limit),
    };
    list(&state, filter).await
}

#[utoipa::path(
    get,
    path = "/admin/contents/{id}",
    params(("id" = Uuid, Path, description = "Content ID")),
    responses((status = 200, description = "Found", body = Content))
)]
pub async fn get_content(
    _admin: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Content> {
    let content = ensure_active(state.repo.get_content(id).await?)?;
    Ok(ApiResponse::ok(content, "Content retrieved"))
}

/// create_content
///
/// [Admin Route] A published item without `published_at` is stamped now; an
/// unpublished item keeps whatever date was scheduled.
#[utoipa::path(
    post,
    path = "/admin/contents",
    request_body = CreateContentRequest,
    responses(
        (status = 201, description = "Created", body = Content),
        (status = 422, description = "Invalid payload")
    )
)]
pub async fn create_content(
    AuthAdmin { id: admin_id, .. }: AuthAdmin,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateContentRequest>,
) -> ApiResult<Content> {
    let title = required(payload.title, "title")?;
    let url = required(payload.url, "url")?;
    let platform = payload
        .platform
        .ok_or_else(|| AppError::Validation("platform is required".to_string()))?;
    let published_at = match (payload.is_published, payload.published_at) {
        (true, None) => Some(Utc::now()),
        (_, scheduled) => scheduled,
    };

    let content = state
        .repo
        .create_content(
            NewContent {
                title,
                platform,
                url,
                banner: optional(payload.banner),
                is_published: payload.is_published,
                published_at,
            },
            admin_id,
        )
        .await?;
    Ok(ApiResponse::created(content, "Content created"))
}

#[utoipa::path(
    put,
    path = "/admin/contents/{id}",
    params(("id" = Uuid, Path, description = "Content ID")),
    request_body = UpdateContentRequest,
    responses(
        (status = 200, description = "Updated", body = Content),
        (status = 403, description = "Not the owner")
    )
)]
pub async fn update_content(
    admin: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateContentRequest>,
) -> ApiResult<Content> {
    ensure_owned(state.repo.get_content(id).await?, &admin)?;

    let changes = ContentChanges {
        title: not_blank(payload.title, "title")?,
        platform: payload.platform,
        url: not_blank(payload.url, "url")?,
        banner: optional(payload.banner),
        published_at: payload.published_at,
    };
    let content = state
        .repo
        .update_content(id, changes)
        .await?
        .ok_or_else(|| AppError::not_found("Content"))?;
    Ok(ApiResponse::ok(content, "Content updated"))
}

#[utoipa::path(
    delete,
    path = "/admin/contents/{id}",
    params(("id" = Uuid, Path, description = "Content ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 403, description = "Not the owner")
    )
)]
pub async fn delete_content(
    admin: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    ensure_owned(state.repo.get_content(id).await?, &admin)?;
    delete_or_not_found(&state, ResourceKind::Content, id).await
}

async fn set_published(
    admin: &AuthAdmin,
    state: &AppState,
    id: Uuid,
    published: bool,
) -> Result<Content, AppError> {
    ensure_owned(state.repo.get_content(id).await?, admin)?;
    state
        .repo
        .set_content_published(id, published, Utc::now())
        .await?
        .ok_or_else(|| AppError::not_found("Content"))
}

/// publish_content
///
/// [Admin Route] Keeps an explicitly scheduled `published_at`, otherwise stamps now.
#[utoipa::path(
    post,
    path = "/admin/contents/{id}/publish",
    params(("id" = Uuid, Path, description = "Content ID")),
    responses((status = 200, description = "Published", body = Content))
)]
pub async fn publish_content(
    admin: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Content> {
    let content = set_published(&admin, &state, id, true).await?;
    Ok(ApiResponse::ok(content, "Content published"))
}

#[utoipa::path(
    delete,
    path = "/admin/contents/{id}/publish",
    params(("id" = Uuid, Path, description = "Content ID")),
    responses((status = 200, description = "Unpublished", body = Content))
)]
pub async fn unpublish_content(
    admin: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Content> {
    let content = set_published(&admin, &state, id, false).await?;
    Ok(ApiResponse::ok(content, "Content unpublished"))
}

#[cfg(test)]
mod tests {
    use super::promo_window;
    use chrono::{TimeZone, Utc};

    #[test]
    fn window_covers_the_calendar_month() {
        let now = Utc.with_ymd_and_hms(2025, 3, 17, 14, 30, 0).unwrap();
        let (from, until) = promo_window(now).unwrap();
        assert_eq!(from, Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap());
        assert_eq!(until, Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn december_rolls_into_next_year() {
        let now = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap();
        let (from, until) = promo_window(now).unwrap();
        assert_eq!(from, Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap());
        assert_eq!(until, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
    }
}

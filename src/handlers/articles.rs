use axum::extract::{Path, State};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    AppState,
    access::{ResourceKind, ensure_active, ensure_owned},
    auth::AuthAdmin,
    error::{ApiResult, AppError},
    extract::{AppJson, AppQuery},
    models::{
        Article, ArticleChanges, ArticleDetail, ArticleFilter, ArticleImageInput, ArticleQuery,
        ArticleStatus, CreateArticleRequest, NewArticle, NewArticleImage, UpdateArticleRequest,
    },
    pagination::{Page, PageParams, Paginated},
    response::ApiResponse,
    validation::{derive_slug, not_blank, optional, required, status_filter},
};

use super::delete_or_not_found;

async fn article_detail(state: &AppState, article: Article) -> Result<ArticleDetail, AppError> {
    let category = state.repo.get_category(article.category_id).await?;
    let images = state.repo.article_images(article.id).await?;
    Ok(ArticleDetail {
        article,
        category,
        images,
    })
}

async fn list(state: &AppState, filter: ArticleFilter) -> ApiResult<Paginated<ArticleDetail>> {
    let params = filter.page;
    let page = state.repo.list_articles(&filter).await?;

    let mut items = Vec::with_capacity(page.items.len());
    for article in page.items {
        items.push(article_detail(state, article).await?);
    }

    Ok(ApiResponse::ok(
        Paginated::from_page(Page { items, total: page.total }, params),
        "Articles retrieved",
    ))
}

async fn ensure_category(state: &AppState, category_id: Uuid) -> Result<Uuid, AppError> {
    match state.repo.get_category(category_id).await? {
        Some(category) => Ok(category.id),
        None => Err(AppError::Validation(format!("Unknown category {category_id}"))),
    }
}

async fn ensure_slug_free(state: &AppState, slug: &str, exclude: Option<Uuid>) -> Result<(), AppError> {
    if state.repo.article_slug_taken(slug, exclude).await? {
        return Err(AppError::Conflict(format!(
            "An article with slug '{slug}' already exists"
        )));
    }
    Ok(())
}

/// Gallery positions follow the order of the submitted list, starting at 0.
fn gallery(images: Vec<ArticleImageInput>) -> Result<Vec<NewArticleImage>, AppError> {
    images
        .into_iter()
        .enumerate()
        .map(|(position, image)| {
            Ok(NewArticleImage {
                image_url: required(image.image_url, "images.image_url")?,
                caption: optional(image.caption),
                position: position as i32,
            })
        })
        .collect()
}

// --- Public ---

/// list_public_articles
///
/// [Public Route] Published, non-deleted articles only. A `status` parameter is ignored.
#[utoipa::path(
    get,
    path = "/articles",
    params(ArticleQuery),
    responses((status = 200, description = "Published articles", body = [ArticleDetail]))
)]
pub async fn list_public_articles(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ArticleQuery>,
) -> ApiResult<Paginated<ArticleDetail>> {
    let filter = ArticleFilter {
        search: query.search,
        status: Some(ArticleStatus::Published),
        category_id: query.category_id,
        page: PageParams::new(query.page, query.limit),
    };
    list(&state, filter).await
}

/// get_public_article
///
/// [Public Route] A published article by slug. Drafts and archived articles are `404`.
#[utoipa::path(
    get,
    path = "/articles/{slug}",
    params(("slug" = String, Path, description = "Article slug")),
    responses(
        (status = 200, description = "Found", body = ArticleDetail),
        (status = 404, description = "Missing or unpublished")
    )
)]
pub async fn get_public_article(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<ArticleDetail> {
    let article = state
        .repo
        .get_article_by_slug(&slug)
        .await?
        .filter(|a| a.status == ArticleStatus::Published)
        .ok_or_else(|| AppError::not_found("Article"))?;
    Ok(ApiResponse::ok(article_detail(&state, article).await?, "Article retrieved"))
}

// --- Admin ---

#[utoipa::path(
    get,
    path = "/admin/articles",
    params(ArticleQuery),
    responses((status = 200, description = "Articles", body = [ArticleDetail]))
)]
pub async fn list_articles(
    _admin: AuthAdmin,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ArticleQuery>,
) -> ApiResult<Paginated<ArticleDetail>> {
    let filter = ArticleFilter {
        status: status_filter::<ArticleStatus>(query.status.as_deref())?,
        search: query.search,
        category_id: query.category_id,
        page: PageParams::new(query.page, query.limit),
    };
    list(&state, filter).await
}

#[utoipa::path(
    get,
    path = "/admin/articles/{id}",
    params(("id" = Uuid, Path, description = "Article ID")),
    responses((status = 200, description = "Found", body = ArticleDetail))
)]
pub async fn get_article(
    _admin: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<ArticleDetail> {
    let article = ensure_active(state.repo.get_article(id).await?)?;
    Ok(ApiResponse::ok(article_detail(&state, article).await?, "Article retrieved"))
}

/// create_article
///
/// [Admin Route] Creating directly as `published` stamps `published_at` now.
#[utoipa::path(
    post,
    path = "/admin/articles",
    request_body = CreateArticleRequest,
    responses(
        (status = 201, description = "Created", body = ArticleDetail),
        (status = 409, description = "Slug already used"),
        (status = 422, description = "Invalid payload")
    )
)]
pub async fn create_article(
    AuthAdmin { id: admin_id, .. }: AuthAdmin,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateArticleRequest>,
) -> ApiResult<ArticleDetail> {
    let title = required(payload.title, "title")?;
    let body = required(payload.body, "body")?;
    let category_id = payload
        .category_id
        .ok_or_else(|| AppError::Validation("category_id is required".to_string()))?;
    let category_id = ensure_category(&state, category_id).await?;
    let slug = derive_slug(&title)?;
    let images = gallery(payload.images)?;
    ensure_slug_free(&state, &slug, None).await?;

    let status = payload.status.unwrap_or_default();
    let published_at = (status == ArticleStatus::Published).then(Utc::now);

    let article = state
        .repo
        .create_article(
            NewArticle {
                title,
                slug,
                excerpt: optional(payload.excerpt),
                body,
                cover_image_url: optional(payload.cover_image_url),
                status,
                category_id,
                published_at,
            },
            admin_id,
        )
        .await?;
    if !images.is_empty() {
        state.repo.replace_article_images(article.id, images).await?;
    }

    tracing::info!(article_id = %article.id, slug = %article.slug, "article created");
    Ok(ApiResponse::created(article_detail(&state, article).await?, "Article created"))
}

/// update_article
///
/// [Admin Route] Partial update. A new title re-derives the slug; a supplied
/// `images` list replaces the gallery.
#[utoipa::path(
    put,
    path = "/admin/articles/{id}",
    params(("id" = Uuid, Path, description = "Article ID")),
    request_body = UpdateArticleRequest,
    responses(
        (status = 200, description = "Updated", body = ArticleDetail),
        (status = 403, description = "Not the owner"),
        (status = 409, description = "Slug already used")
    )
)]
pub async fn update_article(
    admin: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateArticleRequest>,
) -> ApiResult<ArticleDetail> {
    let existing = ensure_owned(state.repo.get_article(id).await?, &admin)?;

    let title = not_blank(payload.title, "title")?;
    let body = not_blank(payload.body, "body")?;
    let slug = match &title {
        Some(title) => Some(derive_slug(title)?).filter(|slug| *slug != existing.slug),
        None => None,
    };
    if let Some(slug) = &slug {
        ensure_slug_free(&state, slug, Some(id)).await?;
    }
    let category_id = match payload.category_id {
        Some(category_id) => Some(ensure_category(&state, category_id).await?),
        None => None,
    };
    let images = payload.images.map(gallery).transpose()?;

    // First publication through an update stamps the time, like `publish` does.
    let published_at = (payload.status == Some(ArticleStatus::Published)
        && existing.status != ArticleStatus::Published)
        .then(Utc::now);

    let article = state
        .repo
        .update_article(
            id,
            ArticleChanges {
                title,
                slug,
                excerpt: optional(payload.excerpt),
                body,
                cover_image_url: optional(payload.cover_image_url),
                status: payload.status,
                category_id,
                published_at,
            },
        )
        .await?
        .ok_or_else(|| AppError::not_found("Article"))?;

    if let Some(images) = images {
        state.repo.replace_article_images(id, images).await?;
    }

    Ok(ApiResponse::ok(article_detail(&state, article).await?, "Article updated"))
}

/// delete_article
///
/// [Admin Route] Soft delete.
#[utoipa::path(
    delete,
    path = "/admin/articles/{id}",
    params(("id" = Uuid, Path, description = "Article ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 403, description = "Not the owner")
    )
)]
pub async fn delete_article(
    admin: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    ensure_owned(state.repo.get_article(id).await?, &admin)?;
    delete_or_not_found(&state, ResourceKind::Article, id).await
}

/// publish_article
///
/// [Admin Route] `status = published`, `published_at = now`.
#[utoipa::path(
    post,
    path = "/admin/articles/{id}/publish",
    params(("id" = Uuid, Path, description = "Article ID")),
    responses((status = 200, description = "Published", body = ArticleDetail))
)]
pub async fn publish_article(
    admin: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<ArticleDetail> {
    ensure_owned(state.repo.get_article(id).await?, &admin)?;
    let article = state
        .repo
        .publish_article(id, Utc::now())
        .await?
        .ok_or_else(|| AppError::not_found("Article"))?;
    Ok(ApiResponse::ok(article_detail(&state, article).await?, "Article published"))
}

/// unpublish_article
///
/// [Admin Route] Back to `draft`; `published_at` is left as it was.
#[utoipa::path(
    delete,
    path = "/admin/articles/{id}/publish",
    params(("id" = Uuid, Path, description = "Article ID")),
    responses((status = 200, description = "Unpublished", body = ArticleDetail))
)]
pub async fn unpublish_article(
    admin: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<ArticleDetail> {
    ensure_owned(state.repo.get_article(id).await?, &admin)?;
    let article = state
        .repo
        .unpublish_article(id)
        .await?
        .ok_or_else(|| AppError::not_found("Article"))?;
    Ok(ApiResponse::ok(article_detail(&state, article).await?, "Article unpublished"))
}

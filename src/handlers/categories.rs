use axum::extract::{Path, State};
use uuid::Uuid;

use crate::{
    AppState,
    access::ResourceKind,
    auth::AuthAdmin,
    error::{ApiResult, AppError},
    extract::AppJson,
    models::{ArticleCategory, CategoryRequest},
    response::ApiResponse,
    validation::{derive_slug, required},
};

use super::delete_or_not_found;

async fn name_and_slug(
    state: &AppState,
    payload: CategoryRequest,
    exclude: Option<Uuid>,
) -> Result<(String, String), AppError> {
    let name = required(payload.name, "name")?;
    let slug = derive_slug(&name)?;
    if state.repo.category_slug_taken(&slug, exclude).await? {
        return Err(AppError::Conflict(format!("Category '{name}' already exists")));
    }
    Ok((name, slug))
}

/// list_public_categories
#[utoipa::path(
    get,
    path = "/article-categories",
    responses((status = 200, description = "Categories", body = [ArticleCategory]))
)]
pub async fn list_public_categories(
    State(state): State<AppState>,
) -> ApiResult<Vec<ArticleCategory>> {
    Ok(ApiResponse::ok(
        state.repo.list_categories().await?,
        "Categories retrieved",
    ))
}

#[utoipa::path(
    get,
    path = "/admin/article-categories",
    responses((status = 200, description = "Categories", body = [ArticleCategory]))
)]
pub async fn list_categories(
    _admin: AuthAdmin,
    State(state): State<AppState>,
) -> ApiResult<Vec<ArticleCategory>> {
    Ok(ApiResponse::ok(
        state.repo.list_categories().await?,
        "Categories retrieved",
    ))
}

#[utoipa::path(
    post,
    path = "/admin/article-categories",
    request_body = CategoryRequest,
    responses(
        (status = 201, description = "Created", body = ArticleCategory),
        (status = 409, description = "Duplicate name")
    )
)]
pub async fn create_category(
    _admin: AuthAdmin,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CategoryRequest>,
) -> ApiResult<ArticleCategory> {
    let (name, slug) = name_and_slug(&state, payload, None).await?;
    let category = state.repo.create_category(name, slug).await?;
    Ok(ApiResponse::created(category, "Category created"))
}

#[utoipa::path(
    put,
    path = "/admin/article-categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    request_body = CategoryRequest,
    responses((status = 200, description = "Updated", body = ArticleCategory))
)]
pub async fn update_category(
    _admin: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<CategoryRequest>,
) -> ApiResult<ArticleCategory> {
    if state.repo.get_category(id).await?.is_none() {
        return Err(AppError::not_found("Article category"));
    }
    let (name, slug) = name_and_slug(&state, payload, Some(id)).await?;
    let category = state
        .repo
        .update_category(id, name, slug)
        .await?
        .ok_or_else(|| AppError::not_found("Article category"))?;
    Ok(ApiResponse::ok(category, "Category updated"))
}

/// delete_category
///
/// [Admin Route] Refused with `409` while articles still point at the category.
/// Soft-deleted articles count: they keep their category reference.
#[utoipa::path(
    delete,
    path = "/admin/article-categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 409, description = "Category in use")
    )
)]
pub async fn delete_category(
    _admin: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    if state.repo.get_category(id).await?.is_none() {
        return Err(AppError::not_found("Article category"));
    }
    if state.repo.category_usage(id).await? > 0 {
        return Err(AppError::Conflict(
            "Category is in use by one or more articles".to_string(),
        ));
    }
    delete_or_not_found(&state, ResourceKind::ArticleCategory, id).await
}

use axum::extract::{Path, State};
use uuid::Uuid;

use crate::{
    AppState,
    access::{ResourceKind, ensure_owned},
    auth::AuthAdmin,
    error::{ApiResult, AppError},
    extract::AppJson,
    models::{HERO_UPLOAD_FOLDER, HeroImage, HeroImageChanges, HeroImageRequest, NewHeroImage},
    response::ApiResponse,
    storage::sanitize_key,
    validation::{hero_slot, not_blank, optional, positive, required},
};

use super::delete_or_not_found;

/// Storage key of an uploaded hero file, read back from its public URL.
/// URLs outside `<prefix>/hero/` have no key and their files are never removed.
pub fn hero_file_key(image_url: &str, url_prefix: &str) -> Option<String> {
    let key = image_url
        .strip_prefix(url_prefix.trim_end_matches('/'))?
        .strip_prefix('/')?;
    let name = key.strip_prefix(HERO_UPLOAD_FOLDER)?.strip_prefix('/')?;
    if name.is_empty() || sanitize_key(key) != key {
        return None;
    }
    Some(key.to_string())
}

/// The stored path always follows `image_url`; a client-sent path must agree with it.
fn checked_path(
    image_url: &str,
    claimed: Option<String>,
    url_prefix: &str,
) -> Result<Option<String>, AppError> {
    let key = hero_file_key(image_url, url_prefix);
    match optional(claimed) {
        Some(path) if key.as_deref() != Some(path.as_str()) => Err(AppError::Validation(
            "image_path must be the upload key of image_url".to_string(),
        )),
        _ => Ok(key),
    }
}

/// list_public_hero_images
///
/// [Public Route] Carousel images ordered by slot.
#[utoipa::path(
    get,
    path = "/hero-images",
    responses((status = 200, description = "Hero images", body = [HeroImage]))
)]
pub async fn list_public_hero_images(State(state): State<AppState>) -> ApiResult<Vec<HeroImage>> {
    Ok(ApiResponse::ok(
        state.repo.list_hero_images().await?,
        "Hero images retrieved",
    ))
}

#[utoipa::path(
    get,
    path = "/admin/hero-images",
    responses((status = 200, description = "Hero images", body = [HeroImage]))
)]
pub async fn list_hero_images(
    _admin: AuthAdmin,
    State(state): State<AppState>,
) -> ApiResult<Vec<HeroImage>> {
    Ok(ApiResponse::ok(
        state.repo.list_hero_images().await?,
        "Hero images retrieved",
    ))
}

/// create_hero_image
///
/// [Admin Route] `order` must be a slot in `1..=13`. Slots may be shared.
#[utoipa::path(
    post,
    path = "/admin/hero-images",
    request_body = HeroImageRequest,
    responses(
        (status = 201, description = "Created", body = HeroImage),
        (status = 422, description = "Missing image or slot out of range")
    )
)]
pub async fn create_hero_image(
    AuthAdmin { id: admin_id, .. }: AuthAdmin,
    State(state): State<AppState>,
    AppJson(payload): AppJson<HeroImageRequest>,
) -> ApiResult<HeroImage> {
    let image_url = required(payload.image_url, "image_url")?;
    let image_path = checked_path(&image_url, payload.image_path, &state.config.upload_url_prefix)?;
    let order = payload
        .order
        .ok_or_else(|| AppError::Validation("order is required".to_string()))
        .and_then(hero_slot)?;

    let hero = state
        .repo
        .create_hero_image(
            NewHeroImage {
                image_url,
                image_path,
                order,
                height: positive(payload.height, "height")?,
            },
            admin_id,
        )
        .await?;
    Ok(ApiResponse::created(hero, "Hero image created"))
}

#[utoipa::path(
    put,
    path = "/admin/hero-images/{id}",
    params(("id" = Uuid, Path, description = "Hero image ID")),
    request_body = HeroImageRequest,
    responses(
        (status = 200, description = "Updated", body = HeroImage),
        (status = 403, description = "Not the owner")
    )
)]
pub async fn update_hero_image(
    admin: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<HeroImageRequest>,
) -> ApiResult<HeroImage> {
    let current = ensure_owned(state.repo.get_hero_image(id).await?, &admin)?;

    let image_url = not_blank(payload.image_url, "image_url")?;
    let prefix = &state.config.upload_url_prefix;
    let image_path = match image_url.as_deref() {
        Some(url) => Some(checked_path(url, payload.image_path, prefix)?),
        None => {
            checked_path(&current.image_url, payload.image_path, prefix)?;
            None
        }
    };
    let changes = HeroImageChanges {
        image_url,
        image_path,
        order: payload.order.map(hero_slot).transpose()?,
        height: positive(payload.height, "height")?,
    };
    let hero = state
        .repo
        .update_hero_image(id, changes)
        .await?
        .ok_or_else(|| AppError::not_found("Hero image"))?;
    Ok(ApiResponse::ok(hero, "Hero image updated"))
}

/// delete_hero_image
///
/// [Admin Route] Hard delete. The uploaded file behind `image_path` is removed on a
/// best-effort basis once no other hero image points at it; a storage failure is
/// logged and does not fail the request.
#[utoipa::path(
    delete,
    path = "/admin/hero-images/{id}",
    params(("id" = Uuid, Path, description = "Hero image ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 403, description = "Not the owner")
    )
)]
pub async fn delete_hero_image(
    admin: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    let hero = ensure_owned(state.repo.get_hero_image(id).await?, &admin)?;
    let response = delete_or_not_found(&state, ResourceKind::HeroImage, id).await?;

    let Some(path) = hero.image_path.as_deref() else {
        return Ok(response);
    };
    let still_used = state
        .repo
        .list_hero_images()
        .await?
        .iter()
        .any(|other| other.image_path.as_deref() == Some(path));
    if still_used {
        tracing::debug!(hero_id = %id, path, "hero image file still referenced");
    } else if let Err(e) = state.storage.remove(path).await {
        tracing::warn!(hero_id = %id, path, error = %e, "could not remove hero image file");
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hero_file_key_reads_uploads_under_hero_folder() {
        assert_eq!(
            hero_file_key("/uploads/hero/a.jpg", "/uploads").as_deref(),
            Some("hero/a.jpg")
        );
        assert_eq!(
            hero_file_key("/uploads/hero/a.jpg", "/uploads/").as_deref(),
            Some("hero/a.jpg")
        );
        assert_eq!(hero_file_key("/uploads/films/a.jpg", "/uploads"), None);
        assert_eq!(hero_file_key("/uploads/heroes/a.jpg", "/uploads"), None);
        assert_eq!(hero_file_key("/uploads/hero/", "/uploads"), None);
        assert_eq!(hero_file_key("/uploads/hero/../films/a.jpg", "/uploads"), None);
        assert_eq!(hero_file_key("/uploads/hero//a.jpg", "/uploads"), None);
        assert_eq!(hero_file_key("https://cdn.example.com/hero/a.jpg", "/uploads"), None);
    }
}

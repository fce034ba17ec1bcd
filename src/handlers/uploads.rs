use axum::extract::{Multipart, State};
use uuid::Uuid;

use crate::{
    AppState,
    auth::AuthAdmin,
    background::ImageBytes,
    error::{ApiResult, AppError},
    extract::AppQuery,
    models::{UploadQuery, UploadResponse},
    response::ApiResponse,
};

const DEFAULT_FOLDER: &str = "misc";

/// Accepted image types and the extension each is stored under.
const ALLOWED_IMAGE_TYPES: &[(&str, &str)] = &[
    ("image/gif", "gif"),
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/webp", "webp"),
];

/// Maps an allowed MIME type to a safe file extension. The client's file name is
/// never used.
pub fn mime_to_safe_extension(content_type: &str) -> Option<&'static str> {
    ALLOWED_IMAGE_TYPES
        .iter()
        .find(|(mime, _)| *mime == content_type)
        .map(|(_, ext)| *ext)
}

/// Folder names are a single segment of lowercase letters, digits, `-` or `_`.
pub fn upload_folder(folder: Option<&str>) -> Result<String, AppError> {
    let folder = folder.map(str::trim).filter(|f| !f.is_empty());
    let Some(folder) = folder else {
        return Ok(DEFAULT_FOLDER.to_string());
    };
    let valid = folder
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
    if valid {
        Ok(folder.to_string())
    } else {
        Err(AppError::Validation(format!("Invalid upload folder '{folder}'")))
    }
}

/// upload_file
///
/// [Admin Route] Accepts a multipart body with a single `file` field holding a
/// JPEG, PNG, WebP or GIF image. The file is stored as `<folder>/<uuid>.<ext>` and
/// served under the public uploads prefix. With `remove_background=true` the image
/// is first sent to the background-removal service; if that is unavailable the
/// original is stored.
#[utoipa::path(
    post,
    path = "/admin/uploads",
    params(UploadQuery),
    responses(
        (status = 201, description = "Stored", body = UploadResponse),
        (status = 422, description = "Missing file, unsupported type or too large")
    )
)]
pub async fn upload_file(
    AuthAdmin { id: admin_id, .. }: AuthAdmin,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<UploadQuery>,
    mut multipart: Multipart,
) -> ApiResult<UploadResponse> {
    let folder = upload_folder(query.folder.as_deref())?;
    let max_bytes = state.config.max_upload_bytes;

    let mut image = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        if mime_to_safe_extension(&content_type).is_none() {
            return Err(AppError::Validation(format!(
                "Unsupported file type '{content_type}'; expected JPEG, PNG, WebP or GIF"
            )));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;
        if bytes.is_empty() {
            return Err(AppError::Validation("Uploaded file is empty".to_string()));
        }
        if bytes.len() > max_bytes {
            return Err(AppError::Validation(format!(
                "File exceeds the {max_bytes} byte limit"
            )));
        }

        image = Some(ImageBytes {
            bytes: bytes.to_vec(),
            content_type,
        });
        break;
    }

    let mut image =
        image.ok_or_else(|| AppError::Validation("A 'file' field is required".to_string()))?;
    if query.remove_background {
        image = state.background.remove_background(image).await;
    }

    let extension = mime_to_safe_extension(&image.content_type).ok_or_else(|| {
        AppError::Internal(format!("no extension for processed type {}", image.content_type))
    })?;
    let key = format!("{folder}/{}.{extension}", Uuid::new_v4());
    let url = state.storage.store(&key, &image.bytes).await?;

    tracing::info!(admin_id = %admin_id, key = %key, size = image.bytes.len(), "file uploaded");

    Ok(ApiResponse::created(
        UploadResponse {
            url,
            path: key,
            size: image.bytes.len(),
            content_type: image.content_type,
        },
        "File uploaded",
    ))
}

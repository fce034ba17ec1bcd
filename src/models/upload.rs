use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};

/// UploadQuery
///
/// `folder` groups files on disk (`hero`, `films`, ...); it defaults to `misc`.
#[derive(Debug, Clone, Deserialize, IntoParams, Default)]
pub struct UploadQuery {
    pub folder: Option<String>,
    #[serde(default)]
    pub remove_background: bool,
}

/// UploadResponse
///
/// `path` is the storage key to keep alongside the URL (e.g. a hero image's
/// `image_path`) so the file can be removed later.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, PartialEq)]
#[ts(export)]
pub struct UploadResponse {
    pub url: String,
    pub path: String,
    pub content_type: String,
    pub size: usize,
}

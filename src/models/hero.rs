use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::ops::RangeInclusive;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

/// Carousel slots a hero image may occupy. Slots are not unique: when several
/// images share one, the client renders the last.
pub const HERO_SLOTS: RangeInclusive<i32> = 1..=13;

/// Upload folder whose files a hero image owns and removes on delete.
pub const HERO_UPLOAD_FOLDER: &str = "hero";

/// HeroImage
///
/// A hero carousel image. `order` maps to the `display_order` column.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct HeroImage {
    pub id: Uuid,
    pub image_url: String,
    /// Storage key of the uploaded file, when the image was uploaded here.
    pub image_path: Option<String>,
    #[sqlx(rename = "display_order")]
    pub order: i32,
    pub height: Option<i32>,
    pub admin_id: Uuid,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// HeroImageRequest
///
/// `image_url` and `order` are required on create; on update every field is optional.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct HeroImageRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Optional; when sent it must equal the upload key read from `image_url`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<i32>,
}

#[derive(Debug, Clone, Default)]
pub struct NewHeroImage {
    pub image_url: String,
    pub image_path: Option<String>,
    pub order: i32,
    pub height: Option<i32>,
}

#[derive(Debug, Clone, Default)]
pub struct HeroImageChanges {
    pub image_url: Option<String>,
    /// `Some(None)` clears the stored path.
    pub image_path: Option<Option<String>>,
    pub order: Option<i32>,
    pub height: Option<i32>,
}

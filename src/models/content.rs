use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::pagination::PageParams;

text_enum! {
    /// Platform
    ///
    /// Where a promotional content item lives.
    Platform, "platform" {
        Youtube => "youtube",
        Instagram => "instagram",
        Podcast => "podcast",
    }
}

/// Content
///
/// A promotional item (video, post, episode). The public promo modal shows items
/// that have a banner, are published, and were published in the current month.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Content {
    pub id: Uuid,
    pub title: String,
    #[sqlx(try_from = "String")]
    pub platform: Platform,
    pub url: String,
    pub banner: Option<String>,
    pub is_published: bool,
    #[ts(type = "string | null")]
    pub published_at: Option<DateTime<Utc>>,
    pub admin_id: Uuid,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// CreateContentRequest
///
/// A `published_at` in the payload schedules the item for that month's promo window.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateContentRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub platform: Option<Platform>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub banner: Option<String>,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    #[ts(type = "string | null")]
    pub published_at: Option<DateTime<Utc>>,
}

/// UpdateContentRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateContentRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(type = "string | null")]
    pub published_at: Option<DateTime<Utc>>,
}

/// ContentQuery
///
/// `published` is ignored on the public listing.
#[derive(Debug, Clone, Deserialize, IntoParams, Default)]
pub struct ContentQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub platform: Option<Platform>,
    pub published: Option<bool>,
}

// --- Repository inputs ---

#[derive(Debug, Clone, Default)]
pub struct NewContent {
    pub title: String,
    pub platform: Platform,
    pub url: String,
    pub banner: Option<String>,
    pub is_published: bool,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct ContentChanges {
    pub title: Option<String>,
    pub platform: Option<Platform>,
    pub url: Option<String>,
    pub banner: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct ContentFilter {
    pub search: Option<String>,
    pub platform: Option<Platform>,
    pub published: Option<bool>,
    pub page: PageParams,
}

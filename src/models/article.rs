use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::pagination::PageParams;

text_enum! {
    /// ArticleStatus
    ///
    /// `publish` moves an article to `Published` and stamps `published_at`;
    /// `unpublish` moves it back to `Draft` and keeps the timestamp.
    ArticleStatus, "article status" {
        Draft => "draft",
        Published => "published",
        Archived => "archived",
    }
}

/// ArticleCategory
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct ArticleCategory {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// Article
///
/// A blog article. Soft-deleted through `deleted_at`; the slug is unique among
/// non-deleted articles.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub body: String,
    pub cover_image_url: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: ArticleStatus,
    pub category_id: Uuid,
    pub admin_id: Uuid,
    #[ts(type = "string | null")]
    pub published_at: Option<DateTime<Utc>>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
    #[ts(type = "string | null")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// ArticleImage
///
/// Gallery image attached to an article, ordered by `position`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct ArticleImage {
    pub id: Uuid,
    pub article_id: Uuid,
    pub image_url: String,
    pub caption: Option<String>,
    pub position: i32,
}

/// ArticleDetail
///
/// An article with its category and ordered images eagerly loaded.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ArticleDetail {
    #[serde(flatten)]
    pub article: Article,
    pub category: Option<ArticleCategory>,
    pub images: Vec<ArticleImage>,
}

// --- Request payloads ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ArticleImageInput {
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
}

/// CreateArticleRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateArticleRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub cover_image_url: Option<String>,
    #[serde(default)]
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub status: Option<ArticleStatus>,
    #[serde(default)]
    pub images: Vec<ArticleImageInput>,
}

/// UpdateArticleRequest
///
/// Partial update. A supplied `images` list replaces the existing gallery.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateArticleRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ArticleStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<ArticleImageInput>>,
}

/// CategoryRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CategoryRequest {
    #[serde(default)]
    pub name: Option<String>,
}

/// ArticleQuery
///
/// `status` accepts `all` or a status value and is ignored on public listings,
/// which only ever show published articles.
#[derive(Debug, Clone, Deserialize, IntoParams, Default)]
pub struct ArticleQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub status: Option<String>,
    pub category_id: Option<Uuid>,
}

// --- Repository inputs ---

#[derive(Debug, Clone, Default)]
pub struct NewArticle {
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub body: String,
    pub cover_image_url: Option<String>,
    pub status: ArticleStatus,
    pub category_id: Uuid,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct ArticleChanges {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub body: Option<String>,
    pub cover_image_url: Option<String>,
    pub status: Option<ArticleStatus>,
    pub category_id: Option<Uuid>,
    /// Only ever set, never cleared.
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewArticleImage {
    pub image_url: String,
    pub caption: Option<String>,
    pub position: i32,
}

#[derive(Debug, Clone, Default)]
pub struct ArticleFilter {
    pub search: Option<String>,
    pub status: Option<ArticleStatus>,
    pub category_id: Option<Uuid>,
    pub page: PageParams,
}

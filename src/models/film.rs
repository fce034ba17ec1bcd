use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

text_enum! {
    /// FilmStatus
    ///
    /// Display state of a film. There is no enforced transition graph.
    FilmStatus, "film status" {
        ComingSoon => "coming_soon",
        NowShowing => "now_showing",
        Archived => "archived",
    }
}

/// Film
///
/// A row of the `films` table. Films are soft-deleted through `deleted_at`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Film {
    pub id: Uuid,
    pub slug: String,
    pub film_title: String,
    /// Runtime in minutes.
    pub duration: Option<i32>,
    pub director: Option<String>,
    pub release_date: Option<NaiveDate>,
    #[sqlx(try_from = "String")]
    pub status: FilmStatus,
    pub poster_url: Option<String>,
    pub trailer_url: Option<String>,
    pub synopsis: Option<String>,
    pub admin_id: Uuid,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
    #[ts(type = "string | null")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Genre
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Genre {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// FilmDetail
///
/// A film with its genres eagerly loaded.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct FilmDetail {
    #[serde(flatten)]
    pub film: Film,
    pub genres: Vec<Genre>,
}

// --- Request payloads ---

/// CreateFilmRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateFilmRequest {
    #[serde(default)]
    pub film_title: Option<String>,
    #[serde(default)]
    pub duration: Option<i32>,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: Option<FilmStatus>,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub trailer_url: Option<String>,
    #[serde(default)]
    pub synopsis: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<Uuid>,
}

/// UpdateFilmRequest
///
/// Partial update. Absent fields are left untouched; `genre_ids`, when present,
/// replaces the whole genre set.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateFilmRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub film_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<FilmStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trailer_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synopsis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre_ids: Option<Vec<Uuid>>,
}

/// GenreRequest
///
/// Create and rename payload for genres.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct GenreRequest {
    #[serde(default)]
    pub name: Option<String>,
}

/// FilmQuery
///
/// Query parameters for film listings. `status` accepts `all` or a status value.
/// `include_deleted` is honoured on the admin listing only.
#[derive(Debug, Clone, Deserialize, IntoParams, Default)]
pub struct FilmQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub status: Option<String>,
    pub genre_id: Option<Uuid>,
    pub include_deleted: Option<bool>,
}

// --- Repository inputs ---

/// Validated insert for the `films` table.
#[derive(Debug, Clone, Default)]
pub struct NewFilm {
    pub slug: String,
    pub film_title: String,
    pub duration: Option<i32>,
    pub director: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub status: FilmStatus,
    pub poster_url: Option<String>,
    pub trailer_url: Option<String>,
    pub synopsis: Option<String>,
}

/// Validated partial update for the `films` table.
#[derive(Debug, Clone, Default)]
pub struct FilmChanges {
    pub slug: Option<String>,
    pub film_title: Option<String>,
    pub duration: Option<i32>,
    pub director: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub status: Option<FilmStatus>,
    pub poster_url: Option<String>,
    pub trailer_url: Option<String>,
    pub synopsis: Option<String>,
}

/// Filter for film listings.
#[derive(Debug, Clone, Default)]
pub struct FilmFilter {
    pub search: Option<String>,
    pub status: Option<FilmStatus>,
    pub genre_id: Option<Uuid>,
    pub include_deleted: bool,
    pub page: crate::pagination::PageParams,
}

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

/// DashboardStats
///
/// Output schema for the admin dashboard counters (GET /admin/stats).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct DashboardStats {
    /// Films not soft-deleted.
    pub total_films: i64,
    pub now_showing_films: i64,
    /// Articles not soft-deleted.
    pub total_articles: i64,
    pub published_articles: i64,
    pub total_contents: i64,
    pub total_hero_images: i64,
    pub total_projects: i64,
    pub total_cabinet_members: i64,
}

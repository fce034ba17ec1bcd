use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

text_enum! {
    /// CabinetStatus
    ///
    /// At most one cabinet is expected to be `Active`; nothing enforces it.
    CabinetStatus, "cabinet status" {
        Active => "active",
        Archived => "archived",
    }
}

/// Division
///
/// An organizational unit of the studio (production, creative, PR...).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Division {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// Cabinet
///
/// One management period of the studio (e.g. "2024/2025").
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Cabinet {
    pub id: Uuid,
    pub name: String,
    pub period: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: CabinetStatus,
    pub admin_id: Uuid,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// CabinetMember
///
/// A roster entry. `division_name` is loaded through a join and is read-only.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct CabinetMember {
    pub id: Uuid,
    pub cabinet_id: Uuid,
    pub division_id: Option<Uuid>,
    pub name: String,
    pub position: String,
    pub photo_url: Option<String>,
    pub display_order: i32,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[sqlx(default)]
    pub division_name: Option<String>,
}

/// CabinetDetail
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CabinetDetail {
    #[serde(flatten)]
    pub cabinet: Cabinet,
    pub members: Vec<CabinetMember>,
}

// --- Request payloads ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct DivisionRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CabinetRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CabinetStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CabinetMemberRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub division_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i32>,
}

// --- Repository inputs ---

#[derive(Debug, Clone, Default)]
pub struct NewDivision {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NewCabinet {
    pub name: String,
    pub period: Option<String>,
    pub status: CabinetStatus,
}

#[derive(Debug, Clone, Default)]
pub struct CabinetChanges {
    pub name: Option<String>,
    pub period: Option<String>,
    pub status: Option<CabinetStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct NewCabinetMember {
    pub division_id: Option<Uuid>,
    pub name: String,
    pub position: String,
    pub photo_url: Option<String>,
    pub display_order: i32,
}

#[derive(Debug, Clone, Default)]
pub struct CabinetMemberChanges {
    pub division_id: Option<Uuid>,
    pub name: Option<String>,
    pub position: Option<String>,
    pub photo_url: Option<String>,
    pub display_order: Option<i32>,
}

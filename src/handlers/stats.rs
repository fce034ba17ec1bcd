use axum::extract::State;

use crate::{
    AppState, auth::AuthAdmin, error::ApiResult, models::DashboardStats, response::ApiResponse,
};

/// get_stats
///
/// [Admin Route] Dashboard counters. Soft-deleted films and articles are not counted.
#[utoipa::path(
    get,
    path = "/admin/stats",
    responses((status = 200, description = "Stats", body = DashboardStats))
)]
pub async fn get_stats(
    _admin: AuthAdmin,
    State(state): State<AppState>,
) -> ApiResult<DashboardStats> {
    Ok(ApiResponse::ok(state.repo.get_stats().await?, "Stats retrieved"))
}

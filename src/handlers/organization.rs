//! Divisions, cabinets and cabinet members.
//!
//! Divisions are reference data any admin may edit. Cabinets are owned by their
//! creator, and members inherit the ownership of their cabinet.

use axum::extract::{Path, State};
use uuid::Uuid;

use crate::{
    AppState,
    access::{ResourceKind, ensure_active, ensure_owned},
    auth::AuthAdmin,
    error::{ApiResult, AppError},
    extract::AppJson,
    models::{
        Cabinet, CabinetChanges, CabinetDetail, CabinetMember, CabinetMemberChanges,
        CabinetMemberRequest, CabinetRequest, Division, DivisionRequest, NewCabinet,
        NewCabinetMember, NewDivision,
    },
    response::ApiResponse,
    validation::{derive_slug, not_blank, optional, required},
};

use super::delete_or_not_found;

async fn cabinet_detail(state: &AppState, cabinet: Cabinet) -> Result<CabinetDetail, AppError> {
    let members = state.repo.cabinet_members(cabinet.id).await?;
    Ok(CabinetDetail { cabinet, members })
}

async fn ensure_division(state: &AppState, division_id: Option<Uuid>) -> Result<Option<Uuid>, AppError> {
    match division_id {
        None => Ok(None),
        Some(id) => match state.repo.get_division(id).await? {
            Some(division) => Ok(Some(division.id)),
            None => Err(AppError::Validation(format!("Unknown division {id}"))),
        },
    }
}

async fn division_input(
    state: &AppState,
    payload: DivisionRequest,
    exclude: Option<Uuid>,
) -> Result<NewDivision, AppError> {
    let name = required(payload.name, "name")?;
    let slug = derive_slug(&name)?;
    if state.repo.division_slug_taken(&slug, exclude).await? {
        return Err(AppError::Conflict(format!("Division '{name}' already exists")));
    }
    Ok(NewDivision {
        name,
        slug,
        description: optional(payload.description),
    })
}

// --- Public ---

/// list_public_divisions
#[utoipa::path(
    get,
    path = "/divisions",
    responses((status = 200, description = "Divisions", body = [Division]))
)]
pub async fn list_public_divisions(State(state): State<AppState>) -> ApiResult<Vec<Division>> {
    Ok(ApiResponse::ok(
        state.repo.list_divisions().await?,
        "Divisions retrieved",
    ))
}

/// active_cabinet
///
/// [Public Route] The current cabinet with its roster. When several cabinets are
/// marked active, the oldest one is served.
#[utoipa::path(
    get,
    path = "/cabinets/active",
    responses(
        (status = 200, description = "Active cabinet", body = CabinetDetail),
        (status = 404, description = "No active cabinet")
    )
)]
pub async fn active_cabinet(State(state): State<AppState>) -> ApiResult<CabinetDetail> {
    let cabinet = state
        .repo
        .first_active_cabinet()
        .await?
        .ok_or_else(|| AppError::NotFound("No active cabinet".to_string()))?;
    Ok(ApiResponse::ok(
        cabinet_detail(&state, cabinet).await?,
        "Active cabinet retrieved",
    ))
}

// --- Admin: divisions ---

#[utoipa::path(
    get,
    path = "/admin/divisions",
    responses((status = 200, description = "Divisions", body = [Division]))
)]
pub async fn list_divisions(
    _admin: AuthAdmin,
    State(state): State<AppState>,
) -> ApiResult<Vec<Division>> {
    Ok(ApiResponse::ok(
        state.repo.list_divisions().await?,
        "Divisions retrieved",
    ))
}

#[utoipa::path(
    post,
    path = "/admin/divisions",
    request_body = DivisionRequest,
    responses(
        (status = 201, description = "Created", body = Division),
        (status = 409, description = "Duplicate name")
    )
)]
pub async fn create_division(
    _admin: AuthAdmin,
    State(state): State<AppState>,
    AppJson(payload): AppJson<DivisionRequest>,
) -> ApiResult<Division> {
    let input = division_input(&state, payload, None).await?;
    let division = state.repo.create_division(input).await?;
    Ok(ApiResponse::created(division, "Division created"))
}

#[utoipa::path(
    put,
    path = "/admin/divisions/{id}",
    params(("id" = Uuid, Path, description = "Division ID")),
    request_body = DivisionRequest,
    responses((status = 200, description = "Updated", body = Division))
)]
pub async fn update_division(
    _admin: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<DivisionRequest>,
) -> ApiResult<Division> {
    if state.repo.get_division(id).await?.is_none() {
        return Err(AppError::not_found("Division"));
    }
    let input = division_input(&state, payload, Some(id)).await?;
    let division = state
        .repo
        .update_division(id, input)
        .await?
        .ok_or_else(|| AppError::not_found("Division"))?;
    Ok(ApiResponse::ok(division, "Division updated"))
}

/// delete_division
///
/// [Admin Route] Members of the division stay on their cabinet without a division.
#[utoipa::path(
    delete,
    path = "/admin/divisions/{id}",
    params(("id" = Uuid, Path, description = "Division ID")),
    responses((status = 200, description = "Deleted"))
)]
pub async fn delete_division(
    _admin: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    delete_or_not_found(&state, ResourceKind::Division, id).await
}

// --- Admin: cabinets ---

#[utoipa::path(
    get,
    path = "/admin/cabinets",
    responses((status = 200, description = "Cabinets", body = [Cabinet]))
)]
pub async fn list_cabinets(
    _admin: AuthAdmin,
    State(state): State<AppState>,
) -> ApiResult<Vec<Cabinet>> {
    Ok(ApiResponse::ok(
        state.repo.list_cabinets().await?,
        "Cabinets retrieved",
    ))
}

#[utoipa::path(
    get,
    path = "/admin/cabinets/{id}",
    params(("id" = Uuid, Path, description = "Cabinet ID")),
    responses((status = 200, description = "Found", body = CabinetDetail))
)]
pub async fn get_cabinet(
    _admin: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<CabinetDetail> {
    let cabinet = ensure_active(state.repo.get_cabinet(id).await?)?;
    Ok(ApiResponse::ok(
        cabinet_detail(&state, cabinet).await?,
        "Cabinet retrieved",
    ))
}

#[utoipa::path(
    post,
    path = "/admin/cabinets",
    request_body = CabinetRequest,
    responses((status = 201, description = "Created", body = CabinetDetail))
)]
pub async fn create_cabinet(
    AuthAdmin { id: admin_id, .. }: AuthAdmin,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CabinetRequest>,
) -> ApiResult<CabinetDetail> {
    let cabinet = state
        .repo
        .create_cabinet(
            NewCabinet {
                name: required(payload.name, "name")?,
                period: optional(payload.period),
                status: payload.status.unwrap_or_default(),
            },
            admin_id,
        )
        .await?;
    Ok(ApiResponse::created(
        cabinet_detail(&state, cabinet).await?,
        "Cabinet created",
    ))
}

#[utoipa::path(
    put,
    path = "/admin/cabinets/{id}",
    params(("id" = Uuid, Path, description = "Cabinet ID")),
    request_body = CabinetRequest,
    responses(
        (status = 200, description = "Updated", body = CabinetDetail),
        (status = 403, description = "Not the owner")
    )
)]
pub async fn update_cabinet(
    admin: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<CabinetRequest>,
) -> ApiResult<CabinetDetail> {
    ensure_owned(state.repo.get_cabinet(id).await?, &admin)?;

    let changes = CabinetChanges {
        name: not_blank(payload.name, "name")?,
        period: optional(payload.period),
        status: payload.status,
    };
    let cabinet = state
        .repo
        .update_cabinet(id, changes)
        .await?
        .ok_or_else(|| AppError::not_found("Cabinet"))?;
    Ok(ApiResponse::ok(
        cabinet_detail(&state, cabinet).await?,
        "Cabinet updated",
    ))
}

/// delete_cabinet
///
/// [Admin Route] Hard delete; the cabinet's members go with it.
#[utoipa::path(
    delete,
    path = "/admin/cabinets/{id}",
    params(("id" = Uuid, Path, description = "Cabinet ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 403, description = "Not the owner")
    )
)]
pub async fn delete_cabinet(
    admin: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    ensure_owned(state.repo.get_cabinet(id).await?, &admin)?;
    delete_or_not_found(&state, ResourceKind::Cabinet, id).await
}

// --- Admin: members ---

/// Loads a member and checks the caller may manage its cabinet.
async fn owned_member(
    state: &AppState,
    admin: &AuthAdmin,
    id: Uuid,
) -> Result<CabinetMember, AppError> {
    let member = state
        .repo
        .get_cabinet_member(id)
        .await?
        .ok_or_else(|| AppError::not_found("Cabinet member"))?;
    ensure_owned(state.repo.get_cabinet(member.cabinet_id).await?, admin)?;
    Ok(member)
}

#[utoipa::path(
    post,
    path = "/admin/cabinets/{id}/members",
    params(("id" = Uuid, Path, description = "Cabinet ID")),
    request_body = CabinetMemberRequest,
    responses(
        (status = 201, description = "Created", body = CabinetMember),
        (status = 403, description = "Not the cabinet owner")
    )
)]
pub async fn add_cabinet_member(
    admin: AuthAdmin,
    State(state): State<AppState>,
    Path(cabinet_id): Path<Uuid>,
    AppJson(payload): AppJson<CabinetMemberRequest>,
) -> ApiResult<CabinetMember> {
    ensure_owned(state.repo.get_cabinet(cabinet_id).await?, &admin)?;

    let member = NewCabinetMember {
        name: required(payload.name, "name")?,
        position: required(payload.position, "position")?,
        division_id: ensure_division(&state, payload.division_id).await?,
        photo_url: optional(payload.photo_url),
        display_order: payload.display_order.unwrap_or(0),
    };
    let member = state.repo.create_cabinet_member(cabinet_id, member).await?;
    Ok(ApiResponse::created(member, "Cabinet member added"))
}

#[utoipa::path(
    put,
    path = "/admin/cabinet-members/{id}",
    params(("id" = Uuid, Path, description = "Cabinet member ID")),
    request_body = CabinetMemberRequest,
    responses((status = 200, description = "Updated", body = CabinetMember))
)]
pub async fn update_cabinet_member(
    admin: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<CabinetMemberRequest>,
) -> ApiResult<CabinetMember> {
    owned_member(&state, &admin, id).await?;

    let changes = CabinetMemberChanges {
        name: not_blank(payload.name, "name")?,
        position: not_blank(payload.position, "position")?,
        division_id: ensure_division(&state, payload.division_id).await?,
        photo_url: optional(payload.photo_url),
        display_order: payload.display_order,
    };
    let member = state
        .repo
        .update_cabinet_member(id, changes)
        .await?
        .ok_or_else(|| AppError::not_found("Cabinet member"))?;
    Ok(ApiResponse::ok(member, "Cabinet member updated"))
}

#[utoipa::path(
    delete,
    path = "/admin/cabinet-members/{id}",
    params(("id" = Uuid, Path, description = "Cabinet member ID")),
    responses((status = 200, description = "Deleted"))
)]
pub async fn delete_cabinet_member(
    admin: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    owned_member(&state, &admin, id).await?;
    delete_or_not_found(&state, ResourceKind::CabinetMember, id).await
}

use axum::extract::{Path, State};
use uuid::Uuid;

use crate::{
    AppState,
    access::{ResourceKind, ensure_active, ensure_owned},
    auth::AuthAdmin,
    error::{ApiResult, AppError},
    extract::{AppJson, AppQuery},
    models::{NewProject, Project, ProjectChanges, ProjectQuery, ProjectRequest},
    pagination::{PageParams, Paginated},
    response::ApiResponse,
    validation::{not_blank, optional, required},
};

use super::delete_or_not_found;

async fn list(state: &AppState, query: ProjectQuery) -> ApiResult<Paginated<Project>> {
    let params = PageParams::new(query.page, query.limit);
    let page = state
        .repo
        .list_projects(query.search.as_deref(), params)
        .await?;
    Ok(ApiResponse::ok(
        Paginated::from_page(page, params),
        "Projects retrieved",
    ))
}

/// list_public_projects
///
/// [Public Route] Portfolio listing, newest production year first.
#[utoipa::path(
    get,
    path = "/projects",
    params(ProjectQuery),
    responses((status = 200, description = "Projects", body = [Project]))
)]
pub async fn list_public_projects(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ProjectQuery>,
) -> ApiResult<Paginated<Project>> {
    list(&state, query).await
}

#[utoipa::path(
    get,
    path = "/admin/projects",
    params(ProjectQuery),
    responses((status = 200, description = "Projects", body = [Project]))
)]
pub async fn list_projects(
    _admin: AuthAdmin,
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ProjectQuery>,
) -> ApiResult<Paginated<Project>> {
    list(&state, query).await
}

#[utoipa::path(
    get,
    path = "/admin/projects/{id}",
    params(("id" = Uuid, Path, description = "Project ID")),
    responses((status = 200, description = "Found", body = Project))
)]
pub async fn get_project(
    _admin: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Project> {
    let project = ensure_active(state.repo.get_project(id).await?)?;
    Ok(ApiResponse::ok(project, "Project retrieved"))
}

#[utoipa::path(
    post,
    path = "/admin/projects",
    request_body = ProjectRequest,
    responses(
        (status = 201, description = "Created", body = Project),
        (status = 422, description = "Missing title")
    )
)]
pub async fn create_project(
    AuthAdmin { id: admin_id, .. }: AuthAdmin,
    State(state): State<AppState>,
    AppJson(payload): AppJson<ProjectRequest>,
) -> ApiResult<Project> {
    let project = state
        .repo
        .create_project(
            NewProject {
                title: required(payload.title, "title")?,
                description: optional(payload.description),
                image_url: optional(payload.image_url),
                link_url: optional(payload.link_url),
                year: payload.year,
            },
            admin_id,
        )
        .await?;
    Ok(ApiResponse::created(project, "Project created"))
}

#[utoipa::path(
    put,
    path = "/admin/projects/{id}",
    params(("id" = Uuid, Path, description = "Project ID")),
    request_body = ProjectRequest,
    responses(
        (status = 200, description = "Updated", body = Project),
        (status = 403, description = "Not the owner")
    )
)]
pub async fn update_project(
    admin: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<ProjectRequest>,
) -> ApiResult<Project> {
    ensure_owned(state.repo.get_project(id).await?, &admin)?;

    let changes = ProjectChanges {
        title: not_blank(payload.title, "title")?,
        description: optional(payload.description),
        image_url: optional(payload.image_url),
        link_url: optional(payload.link_url),
        year: payload.year,
    };
    let project = state
        .repo
        .update_project(id, changes)
        .await?
        .ok_or_else(|| AppError::not_found("Project"))?;
    Ok(ApiResponse::ok(project, "Project updated"))
}

#[utoipa::path(
    delete,
    path = "/admin/projects/{id}",
    params(("id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 403, description = "Not the owner")
    )
)]
pub async fn delete_project(
    admin: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    ensure_owned(state.repo.get_project(id).await?, &admin)?;
    delete_or_not_found(&state, ResourceKind::Project, id).await
}

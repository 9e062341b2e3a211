use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::rest::{AppState, ErrorBody};

#[derive(Deserialize, ToSchema)]
pub struct CreateProjectRequest {
    /// Owning group
    pub group: String,
}

#[derive(Deserialize, ToSchema)]
pub struct ProjectNodeRequest {
    pub node: String,
}

/// List all projects
#[utoipa::path(
    get,
    path = "/v1/projects",
    responses(
        (status = 200, description = "Project names", body = Vec<String>)
    ),
    tag = "projects"
)]
pub async fn list_projects(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.api.list_projects()?))
}

/// Create a project owned by a group
#[utoipa::path(
    put,
    path = "/v1/project/{project}",
    params(("project" = String, Path, description = "Project name")),
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created"),
        (status = 404, description = "Group not found", body = ErrorBody),
        (status = 409, description = "Project already exists", body = ErrorBody)
    ),
    tag = "projects"
)]
pub async fn create_project(
    State(state): State<Arc<AppState>>,
    Path(project): Path<String>,
    Json(req): Json<CreateProjectRequest>,
) -> Result<StatusCode, ApiError> {
    state.api.create_project(&project, &req.group)?;
    Ok(StatusCode::CREATED)
}

/// Delete a project
#[utoipa::path(
    delete,
    path = "/v1/project/{project}",
    params(("project" = String, Path, description = "Project name")),
    responses(
        (status = 204, description = "Project deleted"),
        (status = 404, description = "Project not found", body = ErrorBody),
        (status = 409, description = "Project still has nodes, networks or a headnode", body = ErrorBody)
    ),
    tag = "projects"
)]
pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    Path(project): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.api.delete_project(&project)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Attach a free node to a project
#[utoipa::path(
    post,
    path = "/v1/project/{project}/connect_node",
    params(("project" = String, Path, description = "Project name")),
    request_body = ProjectNodeRequest,
    responses(
        (status = 204, description = "Node attached"),
        (status = 404, description = "Project or node not found", body = ErrorBody),
        (status = 409, description = "Node already attached", body = ErrorBody)
    ),
    tag = "projects"
)]
pub async fn project_connect_node(
    State(state): State<Arc<AppState>>,
    Path(project): Path<String>,
    Json(req): Json<ProjectNodeRequest>,
) -> Result<StatusCode, ApiError> {
    state.api.project_connect_node(&project, &req.node)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Return a node to the free pool
#[utoipa::path(
    post,
    path = "/v1/project/{project}/detach_node",
    params(("project" = String, Path, description = "Project name")),
    request_body = ProjectNodeRequest,
    responses(
        (status = 204, description = "Node detached"),
        (status = 404, description = "Node not in project", body = ErrorBody),
        (status = 409, description = "Node still has network-connected nics", body = ErrorBody)
    ),
    tag = "projects"
)]
pub async fn project_detach_node(
    State(state): State<Arc<AppState>>,
    Path(project): Path<String>,
    Json(req): Json<ProjectNodeRequest>,
) -> Result<StatusCode, ApiError> {
    state.api.project_detach_node(&project, &req.node)?;
    Ok(StatusCode::NO_CONTENT)
}

/// List the nodes of a project
#[utoipa::path(
    get,
    path = "/v1/project/{project}/nodes",
    params(("project" = String, Path, description = "Project name")),
    responses(
        (status = 200, description = "Node names", body = Vec<String>),
        (status = 404, description = "Project not found", body = ErrorBody)
    ),
    tag = "projects"
)]
pub async fn list_project_nodes(
    State(state): State<Arc<AppState>>,
    Path(project): Path<String>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.api.list_project_nodes(&project)?))
}

/// List the networks of a project
#[utoipa::path(
    get,
    path = "/v1/project/{project}/networks",
    params(("project" = String, Path, description = "Project name")),
    responses(
        (status = 200, description = "Network names", body = Vec<String>),
        (status = 404, description = "Project not found", body = ErrorBody)
    ),
    tag = "projects"
)]
pub async fn list_project_networks(
    State(state): State<Arc<AppState>>,
    Path(project): Path<String>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.api.list_project_networks(&project)?))
}

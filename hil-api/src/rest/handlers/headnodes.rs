use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

use super::{ConnectNetworkRequest, RegisterNicRequest};
use crate::api::HeadnodeDetails;
use crate::error::ApiError;
use crate::rest::{AppState, ErrorBody};

#[derive(Deserialize, ToSchema)]
pub struct CreateHeadnodeRequest {
    pub project: String,
}

/// Create the headnode of a project
#[utoipa::path(
    put,
    path = "/v1/headnode/{headnode}",
    params(("headnode" = String, Path, description = "Headnode name")),
    request_body = CreateHeadnodeRequest,
    responses(
        (status = 201, description = "Headnode created"),
        (status = 404, description = "Project not found", body = ErrorBody),
        (status = 409, description = "Headnode exists or project already has one", body = ErrorBody)
    ),
    tag = "headnodes"
)]
pub async fn create_headnode(
    State(state): State<Arc<AppState>>,
    Path(headnode): Path<String>,
    Json(req): Json<CreateHeadnodeRequest>,
) -> Result<StatusCode, ApiError> {
    state.api.create_headnode(&headnode, &req.project)?;
    Ok(StatusCode::CREATED)
}

/// Delete a headnode
#[utoipa::path(
    delete,
    path = "/v1/headnode/{headnode}",
    params(("headnode" = String, Path, description = "Headnode name")),
    responses(
        (status = 204, description = "Headnode deleted"),
        (status = 404, description = "Headnode not found", body = ErrorBody),
        (status = 409, description = "Headnode still has hnics", body = ErrorBody)
    ),
    tag = "headnodes"
)]
pub async fn delete_headnode(
    State(state): State<Arc<AppState>>,
    Path(headnode): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.api.delete_headnode(&headnode)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Show a headnode with its hnics
#[utoipa::path(
    get,
    path = "/v1/headnode/{headnode}",
    params(("headnode" = String, Path, description = "Headnode name")),
    responses(
        (status = 200, description = "Headnode details", body = HeadnodeDetails),
        (status = 404, description = "Headnode not found", body = ErrorBody)
    ),
    tag = "headnodes"
)]
pub async fn show_headnode(
    State(state): State<Arc<AppState>>,
    Path(headnode): Path<String>,
) -> Result<Json<HeadnodeDetails>, ApiError> {
    Ok(Json(state.api.show_headnode(&headnode)?))
}

/// Create an hnic on a headnode
#[utoipa::path(
    put,
    path = "/v1/headnode/{headnode}/hnic/{hnic}",
    params(
        ("headnode" = String, Path, description = "Headnode name"),
        ("hnic" = String, Path, description = "Hnic name")
    ),
    request_body = RegisterNicRequest,
    responses(
        (status = 201, description = "Hnic created"),
        (status = 400, description = "Invalid MAC address", body = ErrorBody),
        (status = 404, description = "Headnode not found", body = ErrorBody),
        (status = 409, description = "Hnic already exists", body = ErrorBody)
    ),
    tag = "headnodes"
)]
pub async fn create_hnic(
    State(state): State<Arc<AppState>>,
    Path((headnode, hnic)): Path<(String, String)>,
    Json(req): Json<RegisterNicRequest>,
) -> Result<StatusCode, ApiError> {
    state.api.create_hnic(&headnode, &hnic, &req.macaddr)?;
    Ok(StatusCode::CREATED)
}

/// Delete an hnic
#[utoipa::path(
    delete,
    path = "/v1/headnode/{headnode}/hnic/{hnic}",
    params(
        ("headnode" = String, Path, description = "Headnode name"),
        ("hnic" = String, Path, description = "Hnic name")
    ),
    responses(
        (status = 204, description = "Hnic deleted"),
        (status = 404, description = "Headnode or hnic not found", body = ErrorBody),
        (status = 409, description = "Hnic is on a network", body = ErrorBody)
    ),
    tag = "headnodes"
)]
pub async fn delete_hnic(
    State(state): State<Arc<AppState>>,
    Path((headnode, hnic)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    state.api.delete_hnic(&headnode, &hnic)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Put an hnic on a network of the headnode's project
#[utoipa::path(
    post,
    path = "/v1/headnode/{headnode}/hnic/{hnic}/connect_network",
    params(
        ("headnode" = String, Path, description = "Headnode name"),
        ("hnic" = String, Path, description = "Hnic name")
    ),
    request_body = ConnectNetworkRequest,
    responses(
        (status = 204, description = "Hnic connected"),
        (status = 404, description = "Headnode, hnic or network not found", body = ErrorBody),
        (status = 409, description = "Hnic already on a network", body = ErrorBody)
    ),
    tag = "headnodes"
)]
pub async fn hnic_connect_network(
    State(state): State<Arc<AppState>>,
    Path((headnode, hnic)): Path<(String, String)>,
    Json(req): Json<ConnectNetworkRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .api
        .connect_headnode_to_network(&headnode, &hnic, &req.network)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Take an hnic off its network
#[utoipa::path(
    post,
    path = "/v1/headnode/{headnode}/hnic/{hnic}/detach_network",
    params(
        ("headnode" = String, Path, description = "Headnode name"),
        ("hnic" = String, Path, description = "Hnic name")
    ),
    responses(
        (status = 204, description = "Hnic detached"),
        (status = 404, description = "Hnic not on a network", body = ErrorBody)
    ),
    tag = "headnodes"
)]
pub async fn hnic_detach_network(
    State(state): State<Arc<AppState>>,
    Path((headnode, hnic)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    state.api.detach_headnode_from_network(&headnode, &hnic)?;
    Ok(StatusCode::NO_CONTENT)
}

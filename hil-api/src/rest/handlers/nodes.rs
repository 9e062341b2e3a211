use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::api::NodeDetails;
use crate::error::ApiError;
use crate::rest::{AppState, ErrorBody};

#[derive(Deserialize, ToSchema)]
pub struct RegisterNicRequest {
    /// MAC address, `:` or `-` separated
    pub macaddr: String,
}

#[derive(Deserialize, ToSchema)]
pub struct ConnectNetworkRequest {
    pub network: String,
}

/// List nodes not attached to any project
#[utoipa::path(
    get,
    path = "/v1/nodes/free",
    responses(
        (status = 200, description = "Free node names", body = Vec<String>)
    ),
    tag = "nodes"
)]
pub async fn list_free_nodes(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.api.list_free_nodes()?))
}

/// Register a node
#[utoipa::path(
    put,
    path = "/v1/node/{node}",
    params(("node" = String, Path, description = "Node name")),
    responses(
        (status = 201, description = "Node registered"),
        (status = 409, description = "Node already exists", body = ErrorBody)
    ),
    tag = "nodes"
)]
pub async fn register_node(
    State(state): State<Arc<AppState>>,
    Path(node): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.api.register_node(&node)?;
    Ok(StatusCode::CREATED)
}

/// Delete a node
#[utoipa::path(
    delete,
    path = "/v1/node/{node}",
    params(("node" = String, Path, description = "Node name")),
    responses(
        (status = 204, description = "Node deleted"),
        (status = 404, description = "Node not found", body = ErrorBody),
        (status = 409, description = "Node is in a project or owns nics", body = ErrorBody)
    ),
    tag = "nodes"
)]
pub async fn delete_node(
    State(state): State<Arc<AppState>>,
    Path(node): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.api.delete_node(&node)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Show a node with its nics
#[utoipa::path(
    get,
    path = "/v1/node/{node}",
    params(("node" = String, Path, description = "Node name")),
    responses(
        (status = 200, description = "Node details", body = NodeDetails),
        (status = 404, description = "Node not found", body = ErrorBody)
    ),
    tag = "nodes"
)]
pub async fn show_node(
    State(state): State<Arc<AppState>>,
    Path(node): Path<String>,
) -> Result<Json<NodeDetails>, ApiError> {
    Ok(Json(state.api.show_node(&node)?))
}

/// Register a nic on a node
#[utoipa::path(
    put,
    path = "/v1/node/{node}/nic/{nic}",
    params(
        ("node" = String, Path, description = "Node name"),
        ("nic" = String, Path, description = "Nic name")
    ),
    request_body = RegisterNicRequest,
    responses(
        (status = 201, description = "Nic registered"),
        (status = 400, description = "Invalid MAC address", body = ErrorBody),
        (status = 404, description = "Node not found", body = ErrorBody),
        (status = 409, description = "Nic already exists", body = ErrorBody)
    ),
    tag = "nodes"
)]
pub async fn register_nic(
    State(state): State<Arc<AppState>>,
    Path((node, nic)): Path<(String, String)>,
    Json(req): Json<RegisterNicRequest>,
) -> Result<StatusCode, ApiError> {
    state.api.register_nic(&node, &nic, &req.macaddr)?;
    Ok(StatusCode::CREATED)
}

/// Delete a nic
#[utoipa::path(
    delete,
    path = "/v1/node/{node}/nic/{nic}",
    params(
        ("node" = String, Path, description = "Node name"),
        ("nic" = String, Path, description = "Nic name")
    ),
    responses(
        (status = 204, description = "Nic deleted"),
        (status = 404, description = "Node or nic not found", body = ErrorBody),
        (status = 409, description = "Nic is on a network or wired to a port", body = ErrorBody)
    ),
    tag = "nodes"
)]
pub async fn delete_nic(
    State(state): State<Arc<AppState>>,
    Path((node, nic)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    state.api.delete_nic(&node, &nic)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Put a nic on a network of the node's project
#[utoipa::path(
    post,
    path = "/v1/node/{node}/nic/{nic}/connect_network",
    params(
        ("node" = String, Path, description = "Node name"),
        ("nic" = String, Path, description = "Nic name")
    ),
    request_body = ConnectNetworkRequest,
    responses(
        (status = 204, description = "Nic connected"),
        (status = 404, description = "Node, nic or network not found", body = ErrorBody),
        (status = 409, description = "Nic already on a network", body = ErrorBody),
        (status = 502, description = "Switch failed to apply the VLAN", body = ErrorBody)
    ),
    tag = "nodes"
)]
pub async fn node_connect_network(
    State(state): State<Arc<AppState>>,
    Path((node, nic)): Path<(String, String)>,
    Json(req): Json<ConnectNetworkRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .api
        .connect_node_to_network(&node, &nic, &req.network)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Take a nic off its network
#[utoipa::path(
    post,
    path = "/v1/node/{node}/nic/{nic}/detach_network",
    params(
        ("node" = String, Path, description = "Node name"),
        ("nic" = String, Path, description = "Nic name")
    ),
    responses(
        (status = 204, description = "Nic detached"),
        (status = 404, description = "Nic not on a network", body = ErrorBody),
        (status = 502, description = "Switch failed to revert the port", body = ErrorBody)
    ),
    tag = "nodes"
)]
pub async fn node_detach_network(
    State(state): State<Arc<AppState>>,
    Path((node, nic)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    state.api.detach_node_from_network(&node, &nic).await?;
    Ok(StatusCode::NO_CONTENT)
}

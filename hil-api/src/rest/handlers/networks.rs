use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::api::NetworkDetails;
use crate::error::ApiError;
use crate::rest::{AppState, ErrorBody};

#[derive(Deserialize, ToSchema)]
pub struct CreateNetworkRequest {
    pub project: String,
}

/// Response to a network creation
#[derive(Serialize, ToSchema)]
pub struct NetworkCreated {
    /// Allocated VLAN tag
    pub vlan: u16,
}

/// Create a network, allocating a VLAN tag
#[utoipa::path(
    put,
    path = "/v1/network/{network}",
    params(("network" = String, Path, description = "Network name")),
    request_body = CreateNetworkRequest,
    responses(
        (status = 201, description = "Network created", body = NetworkCreated),
        (status = 404, description = "Project not found", body = ErrorBody),
        (status = 409, description = "Network already exists", body = ErrorBody),
        (status = 503, description = "VLAN pool exhausted", body = ErrorBody)
    ),
    tag = "networks"
)]
pub async fn create_network(
    State(state): State<Arc<AppState>>,
    Path(network): Path<String>,
    Json(req): Json<CreateNetworkRequest>,
) -> Result<(StatusCode, Json<NetworkCreated>), ApiError> {
    let vlan = state.api.create_network(&network, &req.project)?;
    Ok((StatusCode::CREATED, Json(NetworkCreated { vlan })))
}

/// Delete a network, releasing its VLAN tag
#[utoipa::path(
    delete,
    path = "/v1/network/{network}",
    params(("network" = String, Path, description = "Network name")),
    responses(
        (status = 204, description = "Network deleted"),
        (status = 404, description = "Network not found", body = ErrorBody),
        (status = 409, description = "Network still has connected interfaces", body = ErrorBody)
    ),
    tag = "networks"
)]
pub async fn delete_network(
    State(state): State<Arc<AppState>>,
    Path(network): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.api.delete_network(&network)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Show a network with its members
#[utoipa::path(
    get,
    path = "/v1/network/{network}",
    params(("network" = String, Path, description = "Network name")),
    responses(
        (status = 200, description = "Network details", body = NetworkDetails),
        (status = 404, description = "Network not found", body = ErrorBody)
    ),
    tag = "networks"
)]
pub async fn show_network(
    State(state): State<Arc<AppState>>,
    Path(network): Path<String>,
) -> Result<Json<NetworkDetails>, ApiError> {
    Ok(Json(state.api.show_network(&network)?))
}

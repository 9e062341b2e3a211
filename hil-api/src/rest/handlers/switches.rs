use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::api::{PortDetails, SwitchDetails};
use crate::error::ApiError;
use crate::rest::{AppState, ErrorBody};

#[derive(Deserialize, ToSchema)]
pub struct ConnectNicRequest {
    pub node: String,
    pub nic: String,
}

/// List all switches
#[utoipa::path(
    get,
    path = "/v1/switches",
    responses(
        (status = 200, description = "Switch names", body = Vec<String>)
    ),
    tag = "switches"
)]
pub async fn list_switches(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.api.list_switches()?))
}

/// Register a switch
///
/// The body carries the vendor under `type`; the remaining keys are the
/// vendor's parameters.
#[utoipa::path(
    put,
    path = "/v1/switch/{switch}",
    params(("switch" = String, Path, description = "Switch name")),
    request_body = Object,
    responses(
        (status = 201, description = "Switch registered"),
        (status = 400, description = "Unknown vendor or invalid parameters", body = ErrorBody),
        (status = 409, description = "Switch already exists", body = ErrorBody)
    ),
    tag = "switches"
)]
pub async fn register_switch(
    State(state): State<Arc<AppState>>,
    Path(switch): Path<String>,
    Json(body): Json<Value>,
) -> Result<StatusCode, ApiError> {
    let Value::Object(mut params) = body else {
        return Err(ApiError::InvalidArgument(
            "switch body must be a JSON object".to_string(),
        ));
    };
    let vendor = match params.remove("type") {
        Some(Value::String(vendor)) => vendor,
        Some(_) => {
            return Err(ApiError::InvalidArgument(
                "'type' must be a string".to_string(),
            ));
        }
        None => return Err(ApiError::InvalidArgument("missing 'type'".to_string())),
    };

    state
        .api
        .register_switch(&switch, &vendor, &Value::Object(params))?;
    Ok(StatusCode::CREATED)
}

/// Delete a switch
#[utoipa::path(
    delete,
    path = "/v1/switch/{switch}",
    params(("switch" = String, Path, description = "Switch name")),
    responses(
        (status = 204, description = "Switch deleted"),
        (status = 404, description = "Switch not found", body = ErrorBody),
        (status = 409, description = "Switch still has ports", body = ErrorBody)
    ),
    tag = "switches"
)]
pub async fn delete_switch(
    State(state): State<Arc<AppState>>,
    Path(switch): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.api.delete_switch(&switch)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Show a switch with its ports
#[utoipa::path(
    get,
    path = "/v1/switch/{switch}",
    params(("switch" = String, Path, description = "Switch name")),
    responses(
        (status = 200, description = "Switch details", body = SwitchDetails),
        (status = 404, description = "Switch not found", body = ErrorBody)
    ),
    tag = "switches"
)]
pub async fn show_switch(
    State(state): State<Arc<AppState>>,
    Path(switch): Path<String>,
) -> Result<Json<SwitchDetails>, ApiError> {
    Ok(Json(state.api.show_switch(&switch)?))
}

/// Register a port on a switch
#[utoipa::path(
    put,
    path = "/v1/switch/{switch}/port/{port}",
    params(
        ("switch" = String, Path, description = "Switch name"),
        ("port" = String, Path, description = "Port name, percent-encoded")
    ),
    responses(
        (status = 201, description = "Port registered"),
        (status = 404, description = "Switch not found", body = ErrorBody),
        (status = 409, description = "Port already exists", body = ErrorBody)
    ),
    tag = "switches"
)]
pub async fn register_port(
    State(state): State<Arc<AppState>>,
    Path((switch, port)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    state.api.register_port(&switch, &port)?;
    Ok(StatusCode::CREATED)
}

/// Delete a port
#[utoipa::path(
    delete,
    path = "/v1/switch/{switch}/port/{port}",
    params(
        ("switch" = String, Path, description = "Switch name"),
        ("port" = String, Path, description = "Port name, percent-encoded")
    ),
    responses(
        (status = 204, description = "Port deleted"),
        (status = 404, description = "Switch or port not found", body = ErrorBody),
        (status = 409, description = "Port is wired to a nic", body = ErrorBody)
    ),
    tag = "switches"
)]
pub async fn delete_port(
    State(state): State<Arc<AppState>>,
    Path((switch, port)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    state.api.delete_port(&switch, &port)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Show a port and the nic wired to it
#[utoipa::path(
    get,
    path = "/v1/switch/{switch}/port/{port}",
    params(
        ("switch" = String, Path, description = "Switch name"),
        ("port" = String, Path, description = "Port name, percent-encoded")
    ),
    responses(
        (status = 200, description = "Port details", body = PortDetails),
        (status = 404, description = "Switch or port not found", body = ErrorBody)
    ),
    tag = "switches"
)]
pub async fn show_port(
    State(state): State<Arc<AppState>>,
    Path((switch, port)): Path<(String, String)>,
) -> Result<Json<PortDetails>, ApiError> {
    Ok(Json(state.api.show_port(&switch, &port)?))
}

/// Record that a nic is cabled to a port
#[utoipa::path(
    post,
    path = "/v1/switch/{switch}/port/{port}/connect_nic",
    params(
        ("switch" = String, Path, description = "Switch name"),
        ("port" = String, Path, description = "Port name, percent-encoded")
    ),
    request_body = ConnectNicRequest,
    responses(
        (status = 204, description = "Port wired"),
        (status = 404, description = "Switch, port, node or nic not found", body = ErrorBody),
        (status = 409, description = "Port or nic already wired", body = ErrorBody)
    ),
    tag = "switches"
)]
pub async fn port_connect_nic(
    State(state): State<Arc<AppState>>,
    Path((switch, port)): Path<(String, String)>,
    Json(req): Json<ConnectNicRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .api
        .connect_port_to_nic(&switch, &port, &req.node, &req.nic)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Unwire a port and revert it on the switch
#[utoipa::path(
    post,
    path = "/v1/switch/{switch}/port/{port}/detach_nic",
    params(
        ("switch" = String, Path, description = "Switch name"),
        ("port" = String, Path, description = "Port name, percent-encoded")
    ),
    responses(
        (status = 204, description = "Port unwired"),
        (status = 404, description = "Port not wired", body = ErrorBody),
        (status = 502, description = "Switch failed to revert the port", body = ErrorBody)
    ),
    tag = "switches"
)]
pub async fn port_detach_nic(
    State(state): State<Arc<AppState>>,
    Path((switch, port)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    state.api.detach_port_from_nic(&switch, &port).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Reset a port on the switch
#[utoipa::path(
    post,
    path = "/v1/switch/{switch}/port/{port}/revert",
    params(
        ("switch" = String, Path, description = "Switch name"),
        ("port" = String, Path, description = "Port name, percent-encoded")
    ),
    responses(
        (status = 204, description = "Port reverted"),
        (status = 404, description = "Switch or port not found", body = ErrorBody),
        (status = 502, description = "Switch failed to revert the port", body = ErrorBody)
    ),
    tag = "switches"
)]
pub async fn port_revert(
    State(state): State<Arc<AppState>>,
    Path((switch, port)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    state.api.revert_port(&switch, &port).await?;
    Ok(StatusCode::NO_CONTENT)
}

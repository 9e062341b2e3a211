mod headnodes;
mod networks;
mod nodes;
mod projects;
mod switches;
mod users;

use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

pub use headnodes::*;
pub use networks::*;
pub use nodes::*;
pub use projects::*;
pub use switches::*;
pub use users::*;

/// Version information
#[derive(Serialize, ToSchema)]
pub struct VersionInfo {
    pub version: String,
}

/// Get service version
#[utoipa::path(
    get,
    path = "/v1/version",
    responses(
        (status = 200, description = "Service version", body = VersionInfo)
    ),
    tag = "system"
)]
pub async fn get_version() -> Json<VersionInfo> {
    Json(VersionInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

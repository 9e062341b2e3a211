use axum::{
    Json, Router,
    routing::{get, post, put},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use super::handlers;
use super::{AppState, ErrorBody};
use crate::api::{
    HeadnodeDetails, HnicDetails, NetworkDetails, NetworkMember, NicDetails, NodeDetails,
    PortDetails, PortRef, SwitchDetails,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HIL API Server",
        version = "0.1.0",
        description = "REST API for the Hardware Isolation Layer. Manages projects, nodes, networks, headnodes and switches, and programs switch ports so each project's nodes share only their own VLANs.",
        license(name = "MIT")
    ),
    tags(
        (name = "system", description = "System information"),
        (name = "users", description = "Users and groups"),
        (name = "projects", description = "Project management and node allocation"),
        (name = "nodes", description = "Node and nic registration and network attachment"),
        (name = "headnodes", description = "Project headnodes and their hnics"),
        (name = "networks", description = "Networks and VLAN allocation"),
        (name = "switches", description = "Switch and port administration")
    ),
    paths(
        handlers::get_version,
        // Users & groups
        handlers::create_user,
        handlers::delete_user,
        handlers::verify_user_password,
        handlers::create_group,
        handlers::delete_group,
        handlers::group_add_user,
        handlers::group_remove_user,
        handlers::list_group_users,
        // Projects
        handlers::list_projects,
        handlers::create_project,
        handlers::delete_project,
        handlers::project_connect_node,
        handlers::project_detach_node,
        handlers::list_project_nodes,
        handlers::list_project_networks,
        // Nodes
        handlers::list_free_nodes,
        handlers::register_node,
        handlers::delete_node,
        handlers::show_node,
        handlers::register_nic,
        handlers::delete_nic,
        handlers::node_connect_network,
        handlers::node_detach_network,
        // Headnodes
        handlers::create_headnode,
        handlers::delete_headnode,
        handlers::show_headnode,
        handlers::create_hnic,
        handlers::delete_hnic,
        handlers::hnic_connect_network,
        handlers::hnic_detach_network,
        // Networks
        handlers::create_network,
        handlers::delete_network,
        handlers::show_network,
        // Switches
        handlers::list_switches,
        handlers::register_switch,
        handlers::delete_switch,
        handlers::show_switch,
        handlers::register_port,
        handlers::delete_port,
        handlers::show_port,
        handlers::port_connect_nic,
        handlers::port_detach_nic,
        handlers::port_revert,
    ),
    components(schemas(
        ErrorBody,
        handlers::VersionInfo,
        handlers::CreateUserRequest,
        handlers::VerifyPasswordRequest,
        handlers::PasswordCheck,
        handlers::GroupMemberRequest,
        handlers::CreateProjectRequest,
        handlers::ProjectNodeRequest,
        handlers::RegisterNicRequest,
        handlers::ConnectNetworkRequest,
        handlers::CreateHeadnodeRequest,
        handlers::CreateNetworkRequest,
        handlers::NetworkCreated,
        handlers::ConnectNicRequest,
        NodeDetails,
        NicDetails,
        PortRef,
        NetworkDetails,
        NetworkMember,
        HeadnodeDetails,
        HnicDetails,
        SwitchDetails,
        PortDetails,
    ))
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Create the REST API router
pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/version", get(handlers::get_version))
        // Users & groups
        .route(
            "/user/{user}",
            put(handlers::create_user).delete(handlers::delete_user),
        )
        .route("/user/{user}/verify", post(handlers::verify_user_password))
        .route(
            "/group/{group}",
            put(handlers::create_group).delete(handlers::delete_group),
        )
        .route("/group/{group}/add_user", post(handlers::group_add_user))
        .route(
            "/group/{group}/remove_user",
            post(handlers::group_remove_user),
        )
        .route("/group/{group}/users", get(handlers::list_group_users))
        // Projects
        .route("/projects", get(handlers::list_projects))
        .route(
            "/project/{project}",
            put(handlers::create_project).delete(handlers::delete_project),
        )
        .route(
            "/project/{project}/connect_node",
            post(handlers::project_connect_node),
        )
        .route(
            "/project/{project}/detach_node",
            post(handlers::project_detach_node),
        )
        .route(
            "/project/{project}/nodes",
            get(handlers::list_project_nodes),
        )
        .route(
            "/project/{project}/networks",
            get(handlers::list_project_networks),
        )
        // Nodes
        .route("/nodes/free", get(handlers::list_free_nodes))
        .route(
            "/node/{node}",
            put(handlers::register_node)
                .delete(handlers::delete_node)
                .get(handlers::show_node),
        )
        .route(
            "/node/{node}/nic/{nic}",
            put(handlers::register_nic).delete(handlers::delete_nic),
        )
        .route(
            "/node/{node}/nic/{nic}/connect_network",
            post(handlers::node_connect_network),
        )
        .route(
            "/node/{node}/nic/{nic}/detach_network",
            post(handlers::node_detach_network),
        )
        // Headnodes
        .route(
            "/headnode/{headnode}",
            put(handlers::create_headnode)
                .delete(handlers::delete_headnode)
                .get(handlers::show_headnode),
        )
        .route(
            "/headnode/{headnode}/hnic/{hnic}",
            put(handlers::create_hnic).delete(handlers::delete_hnic),
        )
        .route(
            "/headnode/{headnode}/hnic/{hnic}/connect_network",
            post(handlers::hnic_connect_network),
        )
        .route(
            "/headnode/{headnode}/hnic/{hnic}/detach_network",
            post(handlers::hnic_detach_network),
        )
        // Networks
        .route(
            "/network/{network}",
            put(handlers::create_network)
                .delete(handlers::delete_network)
                .get(handlers::show_network),
        )
        // Switches
        .route("/switches", get(handlers::list_switches))
        .route(
            "/switch/{switch}",
            put(handlers::register_switch)
                .delete(handlers::delete_switch)
                .get(handlers::show_switch),
        )
        .route(
            "/switch/{switch}/port/{port}",
            put(handlers::register_port)
                .delete(handlers::delete_port)
                .get(handlers::show_port),
        )
        .route(
            "/switch/{switch}/port/{port}/connect_nic",
            post(handlers::port_connect_nic),
        )
        .route(
            "/switch/{switch}/port/{port}/detach_nic",
            post(handlers::port_detach_nic),
        )
        .route(
            "/switch/{switch}/port/{port}/revert",
            post(handlers::port_revert),
        );

    Router::new()
        .nest("/v1", api_routes)
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

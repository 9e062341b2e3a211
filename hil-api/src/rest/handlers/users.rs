use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::rest::{AppState, ErrorBody};

/// Request to create a user
#[derive(Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub password: String,
}

/// Request naming a user
#[derive(Deserialize, ToSchema)]
pub struct GroupMemberRequest {
    pub user: String,
}

/// Create a user
#[utoipa::path(
    put,
    path = "/v1/user/{user}",
    params(("user" = String, Path, description = "User name")),
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created"),
        (status = 409, description = "User already exists", body = ErrorBody)
    ),
    tag = "users"
)]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
    Json(req): Json<CreateUserRequest>,
) -> Result<StatusCode, ApiError> {
    state.api.create_user(&user, &req.password)?;
    Ok(StatusCode::CREATED)
}

/// Request carrying a candidate password
#[derive(Deserialize, ToSchema)]
pub struct VerifyPasswordRequest {
    pub password: String,
}

/// Outcome of a password check
#[derive(Serialize, ToSchema)]
pub struct PasswordCheck {
    pub valid: bool,
}

/// Check a user's password
#[utoipa::path(
    post,
    path = "/v1/user/{user}/verify",
    params(("user" = String, Path, description = "User name")),
    request_body = VerifyPasswordRequest,
    responses(
        (status = 200, description = "Whether the password matches", body = PasswordCheck),
        (status = 404, description = "User not found", body = ErrorBody)
    ),
    tag = "users"
)]
pub async fn verify_user_password(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
    Json(req): Json<VerifyPasswordRequest>,
) -> Result<Json<PasswordCheck>, ApiError> {
    let valid = state.api.verify_password(&user, &req.password)?;
    Ok(Json(PasswordCheck { valid }))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/v1/user/{user}",
    params(("user" = String, Path, description = "User name")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "User not found", body = ErrorBody)
    ),
    tag = "users"
)]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.api.delete_user(&user)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Create a group
#[utoipa::path(
    put,
    path = "/v1/group/{group}",
    params(("group" = String, Path, description = "Group name")),
    responses(
        (status = 201, description = "Group created"),
        (status = 409, description = "Group already exists", body = ErrorBody)
    ),
    tag = "users"
)]
pub async fn create_group(
    State(state): State<Arc<AppState>>,
    Path(group): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.api.create_group(&group)?;
    Ok(StatusCode::CREATED)
}

/// Delete a group
#[utoipa::path(
    delete,
    path = "/v1/group/{group}",
    params(("group" = String, Path, description = "Group name")),
    responses(
        (status = 204, description = "Group deleted"),
        (status = 404, description = "Group not found", body = ErrorBody),
        (status = 409, description = "Group still owns projects", body = ErrorBody)
    ),
    tag = "users"
)]
pub async fn delete_group(
    State(state): State<Arc<AppState>>,
    Path(group): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.api.delete_group(&group)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Add a user to a group
#[utoipa::path(
    post,
    path = "/v1/group/{group}/add_user",
    params(("group" = String, Path, description = "Group name")),
    request_body = GroupMemberRequest,
    responses(
        (status = 204, description = "User added"),
        (status = 404, description = "Group or user not found", body = ErrorBody),
        (status = 409, description = "Already a member", body = ErrorBody)
    ),
    tag = "users"
)]
pub async fn group_add_user(
    State(state): State<Arc<AppState>>,
    Path(group): Path<String>,
    Json(req): Json<GroupMemberRequest>,
) -> Result<StatusCode, ApiError> {
    state.api.group_add_user(&group, &req.user)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Remove a user from a group
#[utoipa::path(
    post,
    path = "/v1/group/{group}/remove_user",
    params(("group" = String, Path, description = "Group name")),
    request_body = GroupMemberRequest,
    responses(
        (status = 204, description = "User removed"),
        (status = 404, description = "Group, user or membership not found", body = ErrorBody)
    ),
    tag = "users"
)]
pub async fn group_remove_user(
    State(state): State<Arc<AppState>>,
    Path(group): Path<String>,
    Json(req): Json<GroupMemberRequest>,
) -> Result<StatusCode, ApiError> {
    state.api.group_remove_user(&group, &req.user)?;
    Ok(StatusCode::NO_CONTENT)
}

/// List the members of a group
#[utoipa::path(
    get,
    path = "/v1/group/{group}/users",
    params(("group" = String, Path, description = "Group name")),
    responses(
        (status = 200, description = "Member names", body = Vec<String>),
        (status = 404, description = "Group not found", body = ErrorBody)
    ),
    tag = "users"
)]
pub async fn list_group_users(
    State(state): State<Arc<AppState>>,
    Path(group): Path<String>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.api.list_group_users(&group)?))
}

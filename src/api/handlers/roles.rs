use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::docs::ErrorBody;
use crate::api::errors::ApiError;
use crate::api::middleware::AuthenticatedUser;
use crate::domain::role::Role;
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct RoleResponse {
    pub id: Uuid,
    pub name: String,
}

impl From<&Role> for RoleResponse {
    fn from(role: &Role) -> Self {
        Self {
            id: role.id,
            name: role.name.clone(),
        }
    }
}

/// List all roles
///
/// GET /api/roles
#[utoipa::path(
    get,
    path = "/api/roles",
    tag = "roles",
    responses(
        (status = 200, description = "All roles", body = [RoleResponse]),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorBody),
        (status = 403, description = "Admin role required", body = ErrorBody)
    )
)]
pub async fn list_roles(State(state): State<AppState>) -> Result<Json<Vec<RoleResponse>>, ApiError> {
    let roles = state.identity.list_roles().await?;
    Ok(Json(roles.iter().map(RoleResponse::from).collect()))
}

/// Request body for granting a role
#[derive(Debug, Deserialize, ToSchema)]
pub struct GrantRoleRequest {
    pub email: String,
}

/// Grant a role to a registered account
///
/// POST /api/roles/{name}/members
#[utoipa::path(
    post,
    path = "/api/roles/{name}/members",
    tag = "roles",
    params(("name" = String, Path, description = "Role name, case-insensitive")),
    request_body = GrantRoleRequest,
    responses(
        (status = 204, description = "Role granted"),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorBody),
        (status = 403, description = "Admin role required", body = ErrorBody),
        (status = 404, description = "Unknown role or account", body = ErrorBody)
    )
)]
pub async fn grant_role(
    State(state): State<AppState>,
    admin: AuthenticatedUser,
    Path(name): Path<String>,
    Json(req): Json<GrantRoleRequest>,
) -> Result<StatusCode, ApiError> {
    let user = state
        .identity
        .find_by_email(&req.email)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    state.identity.add_to_role(user.id, &name).await?;
    tracing::info!(granted_by = %admin.id, user_id = %user.id, role = %name, "role granted");

    Ok(StatusCode::NO_CONTENT)
}

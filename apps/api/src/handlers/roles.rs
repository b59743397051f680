use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;

use atrium_application::{CreateRoleInput, UpdateRoleInput};
use atrium_core::{ProjectId, UserIdentity};
use atrium_domain::{MembershipId, RoleRef};

use crate::dto::{
    CreateRoleRequest, MembershipResponse, ReassignRoleRequest, RoleResponse, UpdateRoleRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_roles_handler(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> ApiResult<Json<Vec<RoleResponse>>> {
    let project_id = ProjectId::from_str(project_id.as_str())?;
    let roles = state
        .role_service
        .list_roles(project_id)
        .await?
        .into_iter()
        .map(RoleResponse::from)
        .collect();

    Ok(Json(roles))
}

pub async fn create_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(project_id): Path<String>,
    Json(payload): Json<CreateRoleRequest>,
) -> ApiResult<(StatusCode, Json<RoleResponse>)> {
    let project_id = ProjectId::from_str(project_id.as_str())?;
    let role = state
        .role_service
        .create_role(&user, project_id, CreateRoleInput::try_from(payload)?)
        .await?;

    Ok((StatusCode::CREATED, Json(RoleResponse::from(role))))
}

pub async fn update_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((project_id, role_ref)): Path<(String, String)>,
    Json(payload): Json<UpdateRoleRequest>,
) -> ApiResult<Json<RoleResponse>> {
    let project_id = ProjectId::from_str(project_id.as_str())?;
    let role_ref = RoleRef::from_transport(role_ref.as_str())?;
    let input = UpdateRoleInput::try_from(payload)?;
    let role = state
        .role_service
        .update_role(&user, project_id, role_ref, input)
        .await?;

    Ok(Json(RoleResponse::from(role)))
}

pub async fn delete_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((project_id, role_ref)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let project_id = ProjectId::from_str(project_id.as_str())?;
    let role_ref = RoleRef::from_transport(role_ref.as_str())?;
    state
        .role_service
        .delete_role(&user, project_id, role_ref)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn reassign_role_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((project_id, membership_id)): Path<(String, String)>,
    Json(payload): Json<ReassignRoleRequest>,
) -> ApiResult<Json<MembershipResponse>> {
    let project_id = ProjectId::from_str(project_id.as_str())?;
    let membership_id = MembershipId::from_str(membership_id.as_str())?;
    let role = RoleRef::from_transport(payload.role.as_str())?;
    let membership = state
        .role_service
        .reassign_role(&user, project_id, membership_id, role)
        .await?;

    Ok(Json(MembershipResponse::from(membership)))
}

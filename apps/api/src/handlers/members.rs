use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;

use atrium_application::InviteMemberInput;
use atrium_core::{ProjectId, UserIdentity};
use atrium_domain::{MembershipId, RoleRef};

use crate::dto::{InviteMemberRequest, MembershipResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_members_handler(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> ApiResult<Json<Vec<MembershipResponse>>> {
    let project_id = ProjectId::from_str(project_id.as_str())?;
    let members = state
        .membership_service
        .list_members(project_id)
        .await?
        .into_iter()
        .map(MembershipResponse::from)
        .collect();

    Ok(Json(members))
}

pub async fn invite_member_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(project_id): Path<String>,
    Json(payload): Json<InviteMemberRequest>,
) -> ApiResult<(StatusCode, Json<MembershipResponse>)> {
    let project_id = ProjectId::from_str(project_id.as_str())?;
    let role = RoleRef::from_transport(payload.role.as_str())?;
    let membership = state
        .membership_service
        .invite(
            &user,
            project_id,
            InviteMemberInput {
                email: payload.email,
                role,
                display_name: payload.display_name,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(MembershipResponse::from(membership))))
}

pub async fn remove_member_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((project_id, membership_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let project_id = ProjectId::from_str(project_id.as_str())?;
    let membership_id = MembershipId::from_str(membership_id.as_str())?;
    state
        .membership_service
        .remove(&user, project_id, membership_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn leave_project_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(project_id): Path<String>,
) -> ApiResult<StatusCode> {
    let project_id = ProjectId::from_str(project_id.as_str())?;
    state.membership_service.leave(&user, project_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, State};

use atrium_core::{ProjectId, UserIdentity};
use atrium_domain::Capability;

use crate::dto::{AuthorizationResponse, EffectiveAccessResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn effective_access_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(project_id): Path<String>,
) -> ApiResult<Json<EffectiveAccessResponse>> {
    let project_id = ProjectId::from_str(project_id.as_str())?;
    let access = state
        .authorization_service
        .effective_access(project_id, &user)
        .await?;

    Ok(Json(EffectiveAccessResponse::new(project_id, &user, access)))
}

pub async fn authorize_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path((project_id, capability)): Path<(String, String)>,
) -> ApiResult<Json<AuthorizationResponse>> {
    let project_id = ProjectId::from_str(project_id.as_str())?;
    let capability = Capability::from_transport(capability.as_str())?;
    let allowed = state
        .authorization_service
        .authorize(project_id, &user, capability)
        .await?;

    Ok(Json(AuthorizationResponse::new(capability, allowed)))
}

use std::str::FromStr;

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;

use atrium_application::RegisterProjectInput;
use atrium_core::{ProjectId, UserIdentity};

use crate::dto::{ProjectResponse, RegisterProjectRequest};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn register_project_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Json(payload): Json<RegisterProjectRequest>,
) -> ApiResult<(StatusCode, Json<ProjectResponse>)> {
    let project = state
        .project_service
        .register_project(&user, RegisterProjectInput { name: payload.name })
        .await?;

    Ok((StatusCode::CREATED, Json(ProjectResponse::from(project))))
}

pub async fn get_project_handler(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> ApiResult<Json<ProjectResponse>> {
    let project_id = ProjectId::from_str(project_id.as_str())?;
    let project = state.project_service.find_project(project_id).await?;

    Ok(Json(ProjectResponse::from(project)))
}

pub async fn delete_project_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(project_id): Path<String>,
) -> ApiResult<StatusCode> {
    let project_id = ProjectId::from_str(project_id.as_str())?;
    state
        .project_service
        .delete_project(&user, project_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

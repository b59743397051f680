use axum::Json;
use axum::extract::State;

use crate::dto::{MembershipResponse, SignInRequest, SignInResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn record_sign_in_handler(
    State(state): State<AppState>,
    Json(payload): Json<SignInRequest>,
) -> ApiResult<Json<SignInResponse>> {
    let bound = state
        .membership_service
        .bind_on_sign_in(payload.email.as_str(), payload.user_id.as_str())
        .await?
        .into_iter()
        .map(MembershipResponse::from)
        .collect();

    Ok(Json(SignInResponse { bound }))
}

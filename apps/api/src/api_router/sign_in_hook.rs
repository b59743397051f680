use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::post;

use crate::state::AppState;
use crate::{handlers, middleware};

pub(super) fn build_sign_in_hook_routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/internal/sign-ins",
            post(handlers::sign_ins::record_sign_in_handler),
        )
        .route_layer(from_fn_with_state(
            app_state,
            middleware::require_sign_in_hook_auth,
        ))
}

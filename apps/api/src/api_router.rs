use axum::Router;
use axum::middleware::from_fn;
use axum::routing::{delete, get, post, put};
use atrium_core::AppError;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, middleware};

mod cors;
mod sign_in_hook;

#[cfg(test)]
mod tests;

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let protected_routes = Router::new()
        .route(
            "/api/projects",
            post(handlers::projects::register_project_handler),
        )
        .route(
            "/api/projects/{project_id}",
            get(handlers::projects::get_project_handler)
                .delete(handlers::projects::delete_project_handler),
        )
        .route(
            "/api/projects/{project_id}/access",
            get(handlers::access::effective_access_handler),
        )
        .route(
            "/api/projects/{project_id}/access/{capability}",
            get(handlers::access::authorize_handler),
        )
        .route(
            "/api/projects/{project_id}/roles",
            get(handlers::roles::list_roles_handler).post(handlers::roles::create_role_handler),
        )
        .route(
            "/api/projects/{project_id}/roles/{role_ref}",
            put(handlers::roles::update_role_handler).delete(handlers::roles::delete_role_handler),
        )
        .route(
            "/api/projects/{project_id}/members",
            get(handlers::members::list_members_handler)
                .post(handlers::members::invite_member_handler),
        )
        .route(
            "/api/projects/{project_id}/members/{membership_id}",
            delete(handlers::members::remove_member_handler),
        )
        .route(
            "/api/projects/{project_id}/members/{membership_id}/role",
            put(handlers::roles::reassign_role_handler),
        )
        .route(
            "/api/projects/{project_id}/leave",
            post(handlers::members::leave_project_handler),
        )
        .route_layer(from_fn(middleware::require_auth));

    let sign_in_hook_routes = sign_in_hook::build_sign_in_hook_routes(app_state.clone());
    let cors_layer = cors::build_cors_layer(frontend_url)?;

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(sign_in_hook_routes)
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(app_state))
}

use atrium_application::{AuthorizationService, MembershipService, ProjectService, RoleService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub project_service: ProjectService,
    pub authorization_service: AuthorizationService,
    pub role_service: RoleService,
    pub membership_service: MembershipService,
    pub sign_in_hook_token: String,
}

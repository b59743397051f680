mod common;
mod members;
mod projects;
mod roles;

pub use common::HealthResponse;
pub use members::{InviteMemberRequest, MembershipResponse, SignInRequest, SignInResponse};
pub use projects::{
    AuthorizationResponse, EffectiveAccessResponse, ProjectResponse, RegisterProjectRequest,
};
pub use roles::{CreateRoleRequest, ReassignRoleRequest, RoleResponse, UpdateRoleRequest};

//! Application services and ports for project access control.

#![forbid(unsafe_code)]

mod access_ports;
mod authorization_service;
mod membership_service;
mod project_service;
mod role_catalogue;
mod role_service;

#[cfg(test)]
mod test_support;

pub use access_ports::{
    CreateRoleInput, InviteMemberInput, MembershipRepository, ProjectRepository,
    RegisterProjectInput, RoleRepository, UpdateRoleInput,
};
pub use authorization_service::{AccessSource, AuthorizationService, EffectiveAccess};
pub use membership_service::MembershipService;
pub use project_service::ProjectService;
pub use role_catalogue::RoleCatalogue;
pub use role_service::RoleService;

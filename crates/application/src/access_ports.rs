mod inputs;
mod repositories;

pub use inputs::{CreateRoleInput, InviteMemberInput, RegisterProjectInput, UpdateRoleInput};
pub use repositories::{MembershipRepository, ProjectRepository, RoleRepository};

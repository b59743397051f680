//! Domain entities and invariants for project access control.

#![forbid(unsafe_code)]

mod capability;
mod email;
mod membership;
mod project;
mod role;

pub use capability::{Capability, CapabilityGroup, PermissionBundle};
pub use email::EmailAddress;
pub use membership::{Membership, MembershipId, MembershipState};
pub use project::Project;
pub use role::{BuiltInRole, Role, RoleId, RoleRef, built_in_roles, validate_custom_role_name};

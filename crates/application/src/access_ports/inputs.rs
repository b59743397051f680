use atrium_domain::{PermissionBundle, RoleRef};

/// Input payload for registering a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterProjectInput {
    /// Project display name.
    pub name: String,
}

/// Input payload for creating custom roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRoleInput {
    /// Role name, unique in project scope and distinct from built-in names.
    pub name: String,
    /// Optional description shown in management screens.
    pub description: Option<String>,
    /// Capabilities granted by the role.
    pub permissions: PermissionBundle,
}

/// Partial update for a custom role. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateRoleInput {
    /// New role name.
    pub name: Option<String>,
    /// New description; a blank value clears it.
    pub description: Option<String>,
    /// Replacement capability bundle.
    pub permissions: Option<PermissionBundle>,
}

/// Input payload for inviting a member by email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteMemberInput {
    /// Email the invitation is keyed by.
    pub email: String,
    /// Role granted once the invitation is accepted.
    pub role: RoleRef,
    /// Optional display name captured at invite time.
    pub display_name: Option<String>,
}

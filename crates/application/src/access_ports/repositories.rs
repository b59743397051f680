use async_trait::async_trait;

use atrium_core::{AppResult, ProjectId};
use atrium_domain::{EmailAddress, Membership, MembershipId, Project, Role, RoleId, RoleRef};

/// Repository port for project headers.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Persists a newly registered project.
    async fn save_project(&self, project: Project) -> AppResult<()>;

    /// Finds a project by id.
    async fn find_project(&self, project_id: ProjectId) -> AppResult<Option<Project>>;

    /// Deletes a project together with its memberships and custom roles.
    async fn delete_project(&self, project_id: ProjectId) -> AppResult<()>;
}

/// Repository port for project custom roles.
///
/// Built-in roles are never persisted and never pass through this port.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Lists every stored custom role of a project, including rows whose name
    /// collides with a built-in role.
    async fn list_custom_roles(&self, project_id: ProjectId) -> AppResult<Vec<Role>>;

    /// Finds one custom role.
    async fn find_custom_role(
        &self,
        project_id: ProjectId,
        role_id: RoleId,
    ) -> AppResult<Option<Role>>;

    /// Persists a new custom role. Fails with `Conflict` on a duplicate name.
    async fn create_custom_role(&self, project_id: ProjectId, role: Role) -> AppResult<()>;

    /// Replaces a stored custom role. Fails with `NotFound` if it is gone.
    async fn update_custom_role(&self, project_id: ProjectId, role: Role) -> AppResult<()>;

    /// Deletes a custom role. Memberships referencing it are left untouched.
    async fn delete_custom_role(&self, project_id: ProjectId, role_id: RoleId) -> AppResult<()>;
}

/// Repository port for project memberships keyed by `(project, email)`.
#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Lists memberships of a project.
    async fn list_memberships(&self, project_id: ProjectId) -> AppResult<Vec<Membership>>;

    /// Finds a membership by id.
    async fn find_membership(
        &self,
        project_id: ProjectId,
        membership_id: MembershipId,
    ) -> AppResult<Option<Membership>>;

    /// Finds the membership bound to a user id.
    async fn find_membership_by_user(
        &self,
        project_id: ProjectId,
        user_id: &str,
    ) -> AppResult<Option<Membership>>;

    /// Finds the membership keyed by an email.
    async fn find_membership_by_email(
        &self,
        project_id: ProjectId,
        email: &EmailAddress,
    ) -> AppResult<Option<Membership>>;

    /// Inserts a membership. Fails with `Conflict` if the email is taken.
    async fn insert_membership(&self, membership: Membership) -> AppResult<()>;

    /// Updates the role reference of a membership and returns the stored record.
    async fn update_membership_role(
        &self,
        project_id: ProjectId,
        membership_id: MembershipId,
        role: RoleRef,
    ) -> AppResult<Membership>;

    /// Deletes a membership.
    async fn delete_membership(
        &self,
        project_id: ProjectId,
        membership_id: MembershipId,
    ) -> AppResult<()>;

    /// Binds every unbound membership for the email, across all projects, and
    /// returns the records that changed.
    async fn bind_memberships_for_email(
        &self,
        email: &EmailAddress,
        user_id: &str,
    ) -> AppResult<Vec<Membership>>;

    /// Counts memberships that reference a role.
    async fn count_memberships_with_role(
        &self,
        project_id: ProjectId,
        role: RoleRef,
    ) -> AppResult<u64>;
}

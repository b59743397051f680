use atrium_core::NonEmptyString;
use atrium_domain::validate_custom_role_name;
use tracing::warn;

use crate::access_ports::{CreateRoleInput, UpdateRoleInput};

use super::*;

impl RoleService {
    /// Creates a custom role in the project.
    pub async fn create_role(
        &self,
        actor: &UserIdentity,
        project_id: ProjectId,
        input: CreateRoleInput,
    ) -> AppResult<Role> {
        self.require_role_manage_capability(actor, project_id)
            .await?;

        let name = validate_custom_role_name(input.name.as_str())?;
        let existing = self.role_repository.list_custom_roles(project_id).await?;
        ensure_custom_role_name_is_free(&existing, name.as_str(), None)?;

        let role = Role::new_custom(name, input.description, input.permissions, Utc::now());
        self.role_repository
            .create_custom_role(project_id, role.clone())
            .await?;

        info!(
            project_id = %project_id,
            role = %role.reference(),
            name = role.name(),
            actor = actor.subject(),
            "custom role created"
        );

        Ok(role)
    }

    /// Applies a partial update to a custom role.
    pub async fn update_role(
        &self,
        actor: &UserIdentity,
        project_id: ProjectId,
        role: RoleRef,
        input: UpdateRoleInput,
    ) -> AppResult<Role> {
        self.require_role_manage_capability(actor, project_id)
            .await?;

        let RoleRef::Custom(role_id) = role else {
            return Err(AppError::Validation(format!(
                "cannot modify default role '{role}'"
            )));
        };

        let mut stored = self
            .role_repository
            .find_custom_role(project_id, role_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "role '{role_id}' does not exist in project '{project_id}'"
                ))
            })?;

        let name: Option<NonEmptyString> = match input.name.as_deref() {
            Some(name) => {
                let name = validate_custom_role_name(name)?;
                let existing = self.role_repository.list_custom_roles(project_id).await?;
                ensure_custom_role_name_is_free(&existing, name.as_str(), Some(role))?;
                Some(name)
            }
            None => None,
        };

        stored.apply_update(name, input.description, input.permissions, Utc::now())?;
        self.role_repository
            .update_custom_role(project_id, stored.clone())
            .await?;

        info!(
            project_id = %project_id,
            role = %role,
            actor = actor.subject(),
            "custom role updated"
        );

        Ok(stored)
    }

    /// Deletes a custom role.
    ///
    /// Memberships still referencing the role keep the dangling reference and
    /// resolve to the Viewer bundle until they are reassigned.
    pub async fn delete_role(
        &self,
        actor: &UserIdentity,
        project_id: ProjectId,
        role: RoleRef,
    ) -> AppResult<()> {
        self.require_role_manage_capability(actor, project_id)
            .await?;

        let RoleRef::Custom(role_id) = role else {
            return Err(AppError::Validation(format!(
                "cannot delete default role '{role}'"
            )));
        };

        if self
            .role_repository
            .find_custom_role(project_id, role_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound(format!(
                "role '{role_id}' does not exist in project '{project_id}'"
            )));
        }

        self.role_repository
            .delete_custom_role(project_id, role_id)
            .await?;

        let orphaned = self
            .membership_repository
            .count_memberships_with_role(project_id, role)
            .await?;
        if orphaned > 0 {
            warn!(
                project_id = %project_id,
                role = %role,
                orphaned,
                "deleted role is still referenced; affected members resolve to Viewer"
            );
        }

        info!(
            project_id = %project_id,
            role = %role,
            actor = actor.subject(),
            "custom role deleted"
        );

        Ok(())
    }

    async fn require_role_manage_capability(
        &self,
        actor: &UserIdentity,
        project_id: ProjectId,
    ) -> AppResult<()> {
        self.authorization_service
            .require_capability(project_id, actor, Capability::ManageRoles)
            .await
    }
}

use std::sync::Arc;

use atrium_core::{AppError, AppResult, ProjectId, UserIdentity};
use atrium_domain::{Capability, Membership, MembershipId, Role, RoleRef};
use chrono::Utc;
use tracing::info;

use crate::access_ports::{MembershipRepository, RoleRepository};
use crate::{AuthorizationService, RoleCatalogue};

mod custom_roles;


/// Application service for custom role administration and role reassignment.
#[derive(Clone)]
pub struct RoleService {
    authorization_service: AuthorizationService,
    role_catalogue: RoleCatalogue,
    role_repository: Arc<dyn RoleRepository>,
    membership_repository: Arc<dyn MembershipRepository>,
}

impl RoleService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        role_catalogue: RoleCatalogue,
        role_repository: Arc<dyn RoleRepository>,
        membership_repository: Arc<dyn MembershipRepository>,
    ) -> Self {
        Self {
            authorization_service,
            role_catalogue,
            role_repository,
            membership_repository,
        }
    }

    /// Lists the merged role catalogue of a project.
    pub async fn list_roles(&self, project_id: ProjectId) -> AppResult<Vec<Role>> {
        self.authorization_service.find_project(project_id).await?;
        self.role_catalogue.list_roles(project_id).await
    }

    /// Points a membership at a different role.
    ///
    /// The Owner role is never assignable here, the owner's own membership is
    /// never reassigned, and reassigning to the current role is rejected.
    pub async fn reassign_role(
        &self,
        actor: &UserIdentity,
        project_id: ProjectId,
        membership_id: MembershipId,
        role: RoleRef,
    ) -> AppResult<Membership> {
        let project = self
            .authorization_service
            .require_project_capability(project_id, actor, Capability::ManageRoles)
            .await?;

        if role.is_owner() {
            return Err(AppError::Validation(
                "the Owner role cannot be assigned to a membership".to_owned(),
            ));
        }

        let mut membership = self
            .membership_repository
            .find_membership(project_id, membership_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "membership '{membership_id}' does not exist in project '{project_id}'"
                ))
            })?;

        if membership
            .user_id()
            .is_some_and(|user_id| project.is_owner(user_id))
        {
            return Err(AppError::Validation(
                "the project owner's role cannot be reassigned".to_owned(),
            ));
        }

        self.require_role_exists(project_id, role).await?;
        membership.reassign(role)?;

        let updated = self
            .membership_repository
            .update_membership_role(project_id, membership_id, membership.role())
            .await?;

        info!(
            project_id = %project_id,
            membership_id = %membership_id,
            role = %role,
            actor = actor.subject(),
            "membership role reassigned"
        );

        Ok(updated)
    }

    pub(crate) async fn require_role_exists(
        &self,
        project_id: ProjectId,
        role: RoleRef,
    ) -> AppResult<Role> {
        self.role_catalogue
            .find_role(project_id, role)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "role '{role}' does not exist in project '{project_id}'"
                ))
            })
    }
}

pub(crate) fn ensure_custom_role_name_is_free(
    roles: &[Role],
    name: &str,
    except: Option<RoleRef>,
) -> AppResult<()> {
    let taken = roles.iter().any(|role| {
        Some(role.reference()) != except && role.name().eq_ignore_ascii_case(name)
    });

    if taken {
        return Err(AppError::Conflict(format!("role '{name}' already exists")));
    }

    Ok(())
}

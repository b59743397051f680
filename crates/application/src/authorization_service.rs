use std::sync::Arc;

use atrium_core::{AppError, AppResult, ProjectId, UserIdentity};
use atrium_domain::{BuiltInRole, Capability, EmailAddress, Membership, PermissionBundle, Project, RoleRef};
use tracing::{debug, warn};

use crate::RoleCatalogue;
use crate::access_ports::{MembershipRepository, ProjectRepository};

#[cfg(test)]
mod tests;

/// Where an effective permission bundle came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessSource {
    /// The identity is the project owner.
    OwnerBypass,
    /// The identity's membership resolved to a role.
    Role(RoleRef),
    /// The membership's role no longer resolves; the Viewer bundle applies.
    DanglingRoleFallback(RoleRef),
    /// The identity has no membership in the project.
    NoMembership,
}

/// Effective permissions of one identity in one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveAccess {
    /// Resolved capability flags.
    pub permissions: PermissionBundle,
    /// Resolution path that produced the flags.
    pub source: AccessSource,
}

/// Application service resolving project-scoped capabilities.
#[derive(Clone)]
pub struct AuthorizationService {
    project_repository: Arc<dyn ProjectRepository>,
    membership_repository: Arc<dyn MembershipRepository>,
    role_catalogue: RoleCatalogue,
}

impl AuthorizationService {
    /// Creates a new authorization service from repository implementations.
    #[must_use]
    pub fn new(
        project_repository: Arc<dyn ProjectRepository>,
        membership_repository: Arc<dyn MembershipRepository>,
        role_catalogue: RoleCatalogue,
    ) -> Self {
        Self {
            project_repository,
            membership_repository,
            role_catalogue,
        }
    }

    /// Returns the effective permission bundle of an identity in a project.
    pub async fn resolve(
        &self,
        project_id: ProjectId,
        identity: &UserIdentity,
    ) -> AppResult<PermissionBundle> {
        Ok(self
            .effective_access(project_id, identity)
            .await?
            .permissions)
    }

    /// Returns whether the identity holds the capability in the project.
    pub async fn authorize(
        &self,
        project_id: ProjectId,
        identity: &UserIdentity,
        capability: Capability,
    ) -> AppResult<bool> {
        Ok(self
            .resolve(project_id, identity)
            .await?
            .allows(capability))
    }

    /// Ensures the identity holds the capability in the project.
    pub async fn require_capability(
        &self,
        project_id: ProjectId,
        identity: &UserIdentity,
        capability: Capability,
    ) -> AppResult<()> {
        self.require_project_capability(project_id, identity, capability)
            .await
            .map(|_| ())
    }

    /// Returns effective permissions together with their resolution path.
    pub async fn effective_access(
        &self,
        project_id: ProjectId,
        identity: &UserIdentity,
    ) -> AppResult<EffectiveAccess> {
        let project = self.find_project(project_id).await?;
        self.effective_access_in(&project, identity).await
    }

    /// Loads a project, failing with `NotFound` if it does not exist.
    pub async fn find_project(&self, project_id: ProjectId) -> AppResult<Project> {
        self.project_repository
            .find_project(project_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("project '{project_id}' does not exist")))
    }

    /// Finds the membership held by an identity: by bound user id first, then
    /// by an unbound membership matching the identity's email.
    pub async fn find_membership_for_identity(
        &self,
        project_id: ProjectId,
        identity: &UserIdentity,
    ) -> AppResult<Option<Membership>> {
        if let Some(membership) = self
            .membership_repository
            .find_membership_by_user(project_id, identity.subject())
            .await?
        {
            return Ok(Some(membership));
        }

        let Some(email) = identity
            .email()
            .and_then(|value| EmailAddress::new(value).ok())
        else {
            return Ok(None);
        };

        Ok(self
            .membership_repository
            .find_membership_by_email(project_id, &email)
            .await?
            .filter(|membership| membership.is_held_by(identity)))
    }

    pub(crate) async fn require_project_capability(
        &self,
        project_id: ProjectId,
        identity: &UserIdentity,
        capability: Capability,
    ) -> AppResult<Project> {
        let project = self.find_project(project_id).await?;
        let access = self.effective_access_in(&project, identity).await?;

        if !access.permissions.allows(capability) {
            return Err(AppError::Forbidden(format!(
                "subject '{}' is missing capability '{}' in project '{project_id}'",
                identity.subject(),
                capability.as_str()
            )));
        }

        Ok(project)
    }

    pub(crate) async fn effective_access_in(
        &self,
        project: &Project,
        identity: &UserIdentity,
    ) -> AppResult<EffectiveAccess> {
        let project_id = project.project_id();

        if project.is_owner(identity.subject()) {
            return Ok(EffectiveAccess {
                permissions: BuiltInRole::Owner.permissions(),
                source: AccessSource::OwnerBypass,
            });
        }

        let Some(membership) = self
            .find_membership_for_identity(project_id, identity)
            .await?
        else {
            debug!(
                project_id = %project_id,
                subject = identity.subject(),
                "no membership for subject"
            );
            return Ok(EffectiveAccess {
                permissions: PermissionBundle::default(),
                source: AccessSource::NoMembership,
            });
        };

        let role_ref = membership.role();
        match self.role_catalogue.find_role(project_id, role_ref).await? {
            Some(role) => Ok(EffectiveAccess {
                permissions: role.permissions(),
                source: AccessSource::Role(role_ref),
            }),
            None => {
                warn!(
                    project_id = %project_id,
                    membership_id = %membership.membership_id(),
                    role = %role_ref,
                    "membership references an unknown role, falling back to Viewer"
                );
                Ok(EffectiveAccess {
                    permissions: BuiltInRole::Viewer.permissions(),
                    source: AccessSource::DanglingRoleFallback(role_ref),
                })
            }
        }
    }
}

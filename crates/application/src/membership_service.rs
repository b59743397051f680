use std::sync::Arc;

use atrium_core::{AppError, AppResult, ProjectId, UserIdentity};
use atrium_domain::{Capability, EmailAddress, Membership, MembershipId};
use chrono::Utc;
use tracing::info;

use crate::access_ports::{InviteMemberInput, MembershipRepository};
use crate::{AuthorizationService, RoleCatalogue};


/// Application service for the membership lifecycle: invite, bind, remove, leave.
#[derive(Clone)]
pub struct MembershipService {
    authorization_service: AuthorizationService,
    role_catalogue: RoleCatalogue,
    repository: Arc<dyn MembershipRepository>,
}

impl MembershipService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        role_catalogue: RoleCatalogue,
        repository: Arc<dyn MembershipRepository>,
    ) -> Self {
        Self {
            authorization_service,
            role_catalogue,
            repository,
        }
    }

    /// Lists project memberships, oldest first.
    pub async fn list_members(&self, project_id: ProjectId) -> AppResult<Vec<Membership>> {
        self.authorization_service.find_project(project_id).await?;

        let mut memberships = self.repository.list_memberships(project_id).await?;
        memberships.sort_by(|left, right| {
            left.added_at()
                .cmp(&right.added_at())
                .then_with(|| left.email().cmp(right.email()))
        });

        Ok(memberships)
    }

    /// Invites an email into the project with a non-owner role.
    pub async fn invite(
        &self,
        actor: &UserIdentity,
        project_id: ProjectId,
        input: InviteMemberInput,
    ) -> AppResult<Membership> {
        self.authorization_service
            .require_capability(project_id, actor, Capability::ManageTeam)
            .await?;

        let email = EmailAddress::new(input.email)?;
        if input.role.is_owner() {
            return Err(AppError::Validation(format!(
                "cannot invite '{}' with the Owner role",
                email.as_str()
            )));
        }

        if self
            .role_catalogue
            .find_role(project_id, input.role)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound(format!(
                "role '{}' does not exist in project '{project_id}'",
                input.role
            )));
        }

        if self
            .repository
            .find_membership_by_email(project_id, &email)
            .await?
            .is_some()
        {
            return Err(AppError::Validation(format!(
                "'{}' is already a member of project '{project_id}'",
                email.as_str()
            )));
        }

        let membership =
            Membership::invite(project_id, email, input.role, input.display_name, Utc::now())?;
        self.repository.insert_membership(membership.clone()).await?;

        info!(
            project_id = %project_id,
            membership_id = %membership.membership_id(),
            role = %membership.role(),
            actor = actor.subject(),
            "member invited"
        );

        Ok(membership)
    }

    /// Binds invited memberships to an identity that just signed in.
    ///
    /// Idempotent: memberships already bound are never rebound, so repeating
    /// the call returns an empty list.
    pub async fn bind_on_sign_in(&self, email: &str, user_id: &str) -> AppResult<Vec<Membership>> {
        let email = EmailAddress::new(email)?;
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(AppError::Validation(
                "user id must not be blank".to_owned(),
            ));
        }

        let bound = self
            .repository
            .bind_memberships_for_email(&email, user_id)
            .await?;

        if !bound.is_empty() {
            info!(
                user_id,
                bound = bound.len(),
                "bound invited memberships on sign-in"
            );
        }

        Ok(bound)
    }

    /// Removes a membership.
    ///
    /// Allowed for the project owner, holders of `canManageTeam`, and the
    /// membership's own holder. The owner's membership is never removable.
    pub async fn remove(
        &self,
        actor: &UserIdentity,
        project_id: ProjectId,
        membership_id: MembershipId,
    ) -> AppResult<()> {
        let project = self.authorization_service.find_project(project_id).await?;
        let is_self_removal = self
            .authorization_service
            .find_membership_for_identity(project_id, actor)
            .await?
            .is_some_and(|own| own.membership_id() == membership_id);
        if !is_self_removal {
            let access = self
                .authorization_service
                .effective_access_in(&project, actor)
                .await?;
            if !access.permissions.allows(Capability::ManageTeam) {
                return Err(AppError::Forbidden(format!(
                    "subject '{}' is missing capability '{}' in project '{project_id}'",
                    actor.subject(),
                    Capability::ManageTeam.as_str()
                )));
            }
        }

        let membership = self
            .repository
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
                "the project owner cannot be removed from the project".to_owned(),
            ));
        }

        self.repository
            .delete_membership(project_id, membership_id)
            .await?;

        info!(
            project_id = %project_id,
            membership_id = %membership_id,
            actor = actor.subject(),
            self_removal = is_self_removal,
            "member removed"
        );

        Ok(())
    }

    /// Removes the actor's own membership.
    pub async fn leave(&self, actor: &UserIdentity, project_id: ProjectId) -> AppResult<()> {
        let project = self.authorization_service.find_project(project_id).await?;
        if project.is_owner(actor.subject()) {
            return Err(AppError::Validation(
                "the project owner cannot leave their own project".to_owned(),
            ));
        }

        let membership = self
            .authorization_service
            .find_membership_for_identity(project_id, actor)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "subject '{}' is not a member of project '{project_id}'",
                    actor.subject()
                ))
            })?;

        self.remove(actor, project_id, membership.membership_id())
            .await
    }
}

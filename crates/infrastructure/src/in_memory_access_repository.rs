use std::collections::HashMap;

use async_trait::async_trait;
use atrium_application::{MembershipRepository, ProjectRepository, RoleRepository};
use atrium_core::{AppError, AppResult, ProjectId};
use atrium_domain::{EmailAddress, Membership, MembershipId, Project, Role, RoleId, RoleRef};
use tokio::sync::RwLock;


/// In-memory project access repository implementation.
#[derive(Debug, Default)]
pub struct InMemoryAccessRepository {
    projects: RwLock<HashMap<ProjectId, Project>>,
    roles: RwLock<HashMap<(ProjectId, RoleId), Role>>,
    memberships: RwLock<HashMap<(ProjectId, MembershipId), Membership>>,
}

impl InMemoryAccessRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            projects: RwLock::new(HashMap::new()),
            roles: RwLock::new(HashMap::new()),
            memberships: RwLock::new(HashMap::new()),
        }
    }
}

fn role_key(project_id: ProjectId, role: &Role) -> AppResult<(ProjectId, RoleId)> {
    role.role_id()
        .map(|role_id| (project_id, role_id))
        .ok_or_else(|| {
            AppError::Validation(format!(
                "default role '{}' cannot be stored as a custom role",
                role.name()
            ))
        })
}

fn name_taken(
    roles: &HashMap<(ProjectId, RoleId), Role>,
    project_id: ProjectId,
    role: &Role,
) -> bool {
    roles.iter().any(|((stored_project_id, _), stored)| {
        *stored_project_id == project_id
            && stored.reference() != role.reference()
            && stored.name().eq_ignore_ascii_case(role.name())
    })
}

#[async_trait]
impl ProjectRepository for InMemoryAccessRepository {
    async fn save_project(&self, project: Project) -> AppResult<()> {
        let mut projects = self.projects.write().await;

        if projects.contains_key(&project.project_id()) {
            return Err(AppError::Conflict(format!(
                "project '{}' already exists",
                project.project_id()
            )));
        }

        projects.insert(project.project_id(), project);
        Ok(())
    }

    async fn find_project(&self, project_id: ProjectId) -> AppResult<Option<Project>> {
        Ok(self.projects.read().await.get(&project_id).cloned())
    }

    async fn delete_project(&self, project_id: ProjectId) -> AppResult<()> {
        let mut projects = self.projects.write().await;
        let mut roles = self.roles.write().await;
        let mut memberships = self.memberships.write().await;

        if projects.remove(&project_id).is_none() {
            return Err(AppError::NotFound(format!(
                "project '{project_id}' does not exist"
            )));
        }
        roles.retain(|(stored_project_id, _), _| *stored_project_id != project_id);
        memberships.retain(|(stored_project_id, _), _| *stored_project_id != project_id);

        Ok(())
    }
}

#[async_trait]
impl RoleRepository for InMemoryAccessRepository {
    async fn list_custom_roles(&self, project_id: ProjectId) -> AppResult<Vec<Role>> {
        let roles = self.roles.read().await;

        Ok(roles
            .iter()
            .filter_map(|((stored_project_id, _), role)| {
                (*stored_project_id == project_id).then_some(role.clone())
            })
            .collect())
    }

    async fn find_custom_role(
        &self,
        project_id: ProjectId,
        role_id: RoleId,
    ) -> AppResult<Option<Role>> {
        Ok(self.roles.read().await.get(&(project_id, role_id)).cloned())
    }

    async fn create_custom_role(&self, project_id: ProjectId, role: Role) -> AppResult<()> {
        let key = role_key(project_id, &role)?;
        let mut roles = self.roles.write().await;

        if roles.contains_key(&key) || name_taken(&roles, project_id, &role) {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists in project '{project_id}'",
                role.name()
            )));
        }

        roles.insert(key, role);
        Ok(())
    }

    async fn update_custom_role(&self, project_id: ProjectId, role: Role) -> AppResult<()> {
        let key = role_key(project_id, &role)?;
        let mut roles = self.roles.write().await;

        if !roles.contains_key(&key) {
            return Err(AppError::NotFound(format!(
                "role '{}' does not exist in project '{project_id}'",
                role.reference()
            )));
        }
        if name_taken(&roles, project_id, &role) {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists in project '{project_id}'",
                role.name()
            )));
        }

        roles.insert(key, role);
        Ok(())
    }

    async fn delete_custom_role(&self, project_id: ProjectId, role_id: RoleId) -> AppResult<()> {
        self.roles.write().await.remove(&(project_id, role_id));
        Ok(())
    }
}

#[async_trait]
impl MembershipRepository for InMemoryAccessRepository {
    async fn list_memberships(&self, project_id: ProjectId) -> AppResult<Vec<Membership>> {
        let memberships = self.memberships.read().await;

        Ok(memberships
            .iter()
            .filter_map(|((stored_project_id, _), membership)| {
                (*stored_project_id == project_id).then_some(membership.clone())
            })
            .collect())
    }

    async fn find_membership(
        &self,
        project_id: ProjectId,
        membership_id: MembershipId,
    ) -> AppResult<Option<Membership>> {
        Ok(self
            .memberships
            .read()
            .await
            .get(&(project_id, membership_id))
            .cloned())
    }

    async fn find_membership_by_user(
        &self,
        project_id: ProjectId,
        user_id: &str,
    ) -> AppResult<Option<Membership>> {
        Ok(self
            .memberships
            .read()
            .await
            .values()
            .find(|membership| {
                membership.project_id() == project_id && membership.is_bound_to(user_id)
            })
            .cloned())
    }

    async fn find_membership_by_email(
        &self,
        project_id: ProjectId,
        email: &EmailAddress,
    ) -> AppResult<Option<Membership>> {
        Ok(self
            .memberships
            .read()
            .await
            .values()
            .find(|membership| membership.project_id() == project_id && membership.email() == email)
            .cloned())
    }

    async fn insert_membership(&self, membership: Membership) -> AppResult<()> {
        let mut memberships = self.memberships.write().await;

        let email_taken = memberships.values().any(|stored| {
            stored.project_id() == membership.project_id() && stored.email() == membership.email()
        });
        if email_taken {
            return Err(AppError::Conflict(format!(
                "'{}' is already a member of project '{}'",
                membership.email(),
                membership.project_id()
            )));
        }

        memberships.insert(
            (membership.project_id(), membership.membership_id()),
            membership,
        );
        Ok(())
    }

    async fn update_membership_role(
        &self,
        project_id: ProjectId,
        membership_id: MembershipId,
        role: RoleRef,
    ) -> AppResult<Membership> {
        let mut memberships = self.memberships.write().await;
        let stored = memberships
            .get_mut(&(project_id, membership_id))
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "membership '{membership_id}' does not exist in project '{project_id}'"
                ))
            })?;

        *stored = Membership::from_parts(
            stored.membership_id(),
            stored.project_id(),
            stored.email().clone(),
            stored.user_id().map(str::to_owned),
            stored.display_name().map(str::to_owned),
            role,
            stored.added_at(),
        );

        Ok(stored.clone())
    }

    async fn delete_membership(
        &self,
        project_id: ProjectId,
        membership_id: MembershipId,
    ) -> AppResult<()> {
        self.memberships
            .write()
            .await
            .remove(&(project_id, membership_id));
        Ok(())
    }

    async fn bind_memberships_for_email(
        &self,
        email: &EmailAddress,
        user_id: &str,
    ) -> AppResult<Vec<Membership>> {
        let mut memberships = self.memberships.write().await;

        let mut bound: Vec<Membership> = memberships
            .values_mut()
            .filter(|membership| membership.email() == email)
            .filter_map(|membership| {
                membership
                    .bind_identity(user_id)
                    .then(|| membership.clone())
            })
            .collect();
        bound.sort_by_key(|membership| (membership.added_at(), membership.project_id()));

        Ok(bound)
    }

    async fn count_memberships_with_role(
        &self,
        project_id: ProjectId,
        role: RoleRef,
    ) -> AppResult<u64> {
        let count = self
            .memberships
            .read()
            .await
            .values()
            .filter(|membership| membership.project_id() == project_id && membership.role() == role)
            .count();

        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }
}

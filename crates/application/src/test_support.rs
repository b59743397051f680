use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use atrium_core::{AppError, AppResult, ProjectId, UserIdentity};
use atrium_domain::{EmailAddress, Membership, MembershipId, Project, Role, RoleId, RoleRef};
use chrono::Utc;

use crate::access_ports::{MembershipRepository, ProjectRepository, RoleRepository};
use crate::{AuthorizationService, MembershipService, ProjectService, RoleCatalogue, RoleService};

#[derive(Default)]
pub(crate) struct FakeAccessRepository {
    projects: Mutex<Vec<Project>>,
    roles: Mutex<Vec<(ProjectId, Role)>>,
    memberships: Mutex<Vec<Membership>>,
}

impl FakeAccessRepository {
    pub(crate) async fn seed_role(&self, project_id: ProjectId, role: Role) {
        self.roles.lock().await.push((project_id, role));
    }
}

#[async_trait]
impl ProjectRepository for FakeAccessRepository {
    async fn save_project(&self, project: Project) -> AppResult<()> {
        self.projects.lock().await.push(project);
        Ok(())
    }

    async fn find_project(&self, project_id: ProjectId) -> AppResult<Option<Project>> {
        Ok(self
            .projects
            .lock()
            .await
            .iter()
            .find(|project| project.project_id() == project_id)
            .cloned())
    }

    async fn delete_project(&self, project_id: ProjectId) -> AppResult<()> {
        let mut projects = self.projects.lock().await;
        let before = projects.len();
        projects.retain(|project| project.project_id() != project_id);
        if projects.len() == before {
            return Err(AppError::NotFound(format!(
                "project '{project_id}' does not exist"
            )));
        }

        self.roles
            .lock()
            .await
            .retain(|(stored_project_id, _)| *stored_project_id != project_id);
        self.memberships
            .lock()
            .await
            .retain(|membership| membership.project_id() != project_id);
        Ok(())
    }
}

#[async_trait]
impl RoleRepository for FakeAccessRepository {
    async fn list_custom_roles(&self, project_id: ProjectId) -> AppResult<Vec<Role>> {
        Ok(self
            .roles
            .lock()
            .await
            .iter()
            .filter(|(stored_project_id, _)| *stored_project_id == project_id)
            .map(|(_, role)| role.clone())
            .collect())
    }

    async fn find_custom_role(
        &self,
        project_id: ProjectId,
        role_id: RoleId,
    ) -> AppResult<Option<Role>> {
        Ok(self
            .roles
            .lock()
            .await
            .iter()
            .find(|(stored_project_id, role)| {
                *stored_project_id == project_id && role.role_id() == Some(role_id)
            })
            .map(|(_, role)| role.clone()))
    }

    async fn create_custom_role(&self, project_id: ProjectId, role: Role) -> AppResult<()> {
        self.roles.lock().await.push((project_id, role));
        Ok(())
    }

    async fn update_custom_role(&self, project_id: ProjectId, role: Role) -> AppResult<()> {
        let mut roles = self.roles.lock().await;
        let stored = roles
            .iter_mut()
            .find(|(stored_project_id, stored)| {
                *stored_project_id == project_id && stored.reference() == role.reference()
            })
            .ok_or_else(|| AppError::NotFound("role not found".to_owned()))?;
        stored.1 = role;
        Ok(())
    }

    async fn delete_custom_role(&self, project_id: ProjectId, role_id: RoleId) -> AppResult<()> {
        self.roles.lock().await.retain(|(stored_project_id, role)| {
            !(*stored_project_id == project_id && role.role_id() == Some(role_id))
        });
        Ok(())
    }
}

#[async_trait]
impl MembershipRepository for FakeAccessRepository {
    async fn list_memberships(&self, project_id: ProjectId) -> AppResult<Vec<Membership>> {
        Ok(self
            .memberships
            .lock()
            .await
            .iter()
            .filter(|membership| membership.project_id() == project_id)
            .cloned()
            .collect())
    }

    async fn find_membership(
        &self,
        project_id: ProjectId,
        membership_id: MembershipId,
    ) -> AppResult<Option<Membership>> {
        Ok(self
            .memberships
            .lock()
            .await
            .iter()
            .find(|membership| {
                membership.project_id() == project_id
                    && membership.membership_id() == membership_id
            })
            .cloned())
    }

    async fn find_membership_by_user(
        &self,
        project_id: ProjectId,
        user_id: &str,
    ) -> AppResult<Option<Membership>> {
        Ok(self
            .memberships
            .lock()
            .await
            .iter()
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
            .lock()
            .await
            .iter()
            .find(|membership| membership.project_id() == project_id && membership.email() == email)
            .cloned())
    }

    async fn insert_membership(&self, membership: Membership) -> AppResult<()> {
        let mut memberships = self.memberships.lock().await;
        if memberships.iter().any(|stored| {
            stored.project_id() == membership.project_id() && stored.email() == membership.email()
        }) {
            return Err(AppError::Conflict("membership already exists".to_owned()));
        }
        memberships.push(membership);
        Ok(())
    }

    async fn update_membership_role(
        &self,
        project_id: ProjectId,
        membership_id: MembershipId,
        role: RoleRef,
    ) -> AppResult<Membership> {
        let mut memberships = self.memberships.lock().await;
        let stored = memberships
            .iter_mut()
            .find(|membership| {
                membership.project_id() == project_id
                    && membership.membership_id() == membership_id
            })
            .ok_or_else(|| AppError::NotFound("membership not found".to_owned()))?;
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
        self.memberships.lock().await.retain(|membership| {
            !(membership.project_id() == project_id && membership.membership_id() == membership_id)
        });
        Ok(())
    }

    async fn bind_memberships_for_email(
        &self,
        email: &EmailAddress,
        user_id: &str,
    ) -> AppResult<Vec<Membership>> {
        let mut bound = Vec::new();
        for membership in self.memberships.lock().await.iter_mut() {
            if membership.email() == email && membership.bind_identity(user_id) {
                bound.push(membership.clone());
            }
        }
        Ok(bound)
    }

    async fn count_memberships_with_role(
        &self,
        project_id: ProjectId,
        role: RoleRef,
    ) -> AppResult<u64> {
        Ok(self
            .memberships
            .lock()
            .await
            .iter()
            .filter(|membership| membership.project_id() == project_id && membership.role() == role)
            .count() as u64)
    }
}

pub(crate) struct Fixture {
    pub(crate) repository: Arc<FakeAccessRepository>,
    pub(crate) authorization_service: AuthorizationService,
    pub(crate) role_service: RoleService,
    pub(crate) membership_service: MembershipService,
    pub(crate) project_service: ProjectService,
    pub(crate) project_id: ProjectId,
    pub(crate) owner: UserIdentity,
}

pub(crate) async fn fixture() -> Fixture {
    let repository = Arc::new(FakeAccessRepository::default());
    let role_catalogue = RoleCatalogue::new(repository.clone());
    let authorization_service =
        AuthorizationService::new(repository.clone(), repository.clone(), role_catalogue.clone());
    let role_service = RoleService::new(
        authorization_service.clone(),
        role_catalogue.clone(),
        repository.clone(),
        repository.clone(),
    );
    let membership_service = MembershipService::new(
        authorization_service.clone(),
        role_catalogue,
        repository.clone(),
    );
    let project_service = ProjectService::new(authorization_service.clone(), repository.clone());

    let owner = identity("u1", "owner@x.com");
    let project = project_service
        .register_project(
            &owner,
            crate::RegisterProjectInput {
                name: "P1".to_owned(),
            },
        )
        .await
        .unwrap_or_else(|_| unreachable!());

    Fixture {
        repository,
        authorization_service,
        role_service,
        membership_service,
        project_service,
        project_id: project.project_id(),
        owner,
    }
}

pub(crate) fn identity(subject: &str, email: &str) -> UserIdentity {
    UserIdentity::new(subject, subject, Some(email.to_owned()))
}

pub(crate) fn custom_role(name: &str, permissions: atrium_domain::PermissionBundle) -> Role {
    Role::new_custom(
        atrium_core::NonEmptyString::new(name).unwrap_or_else(|_| unreachable!()),
        None,
        permissions,
        Utc::now(),
    )
}

use std::sync::Arc;

use atrium_core::{AppResult, ProjectId, UserIdentity};
use atrium_domain::{Capability, Project};
use chrono::Utc;
use tracing::info;

use crate::AuthorizationService;
use crate::access_ports::{ProjectRepository, RegisterProjectInput};


/// Application service for project registration.
#[derive(Clone)]
pub struct ProjectService {
    authorization_service: AuthorizationService,
    repository: Arc<dyn ProjectRepository>,
}

impl ProjectService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        repository: Arc<dyn ProjectRepository>,
    ) -> Self {
        Self {
            authorization_service,
            repository,
        }
    }

    /// Registers a project owned by the acting identity.
    pub async fn register_project(
        &self,
        owner: &UserIdentity,
        input: RegisterProjectInput,
    ) -> AppResult<Project> {
        let project = Project::new(input.name, owner.subject(), Utc::now())?;
        self.repository.save_project(project.clone()).await?;

        info!(
            project_id = %project.project_id(),
            owner = owner.subject(),
            "project registered"
        );

        Ok(project)
    }

    /// Returns a project, failing with `NotFound` if it does not exist.
    pub async fn find_project(&self, project_id: ProjectId) -> AppResult<Project> {
        self.authorization_service.find_project(project_id).await
    }

    /// Deletes a project and everything scoped to it.
    ///
    /// Requires `canDeleteProject`, which only the owner holds among the
    /// built-in roles.
    pub async fn delete_project(
        &self,
        actor: &UserIdentity,
        project_id: ProjectId,
    ) -> AppResult<()> {
        self.authorization_service
            .require_capability(project_id, actor, Capability::DeleteProject)
            .await?;
        self.repository.delete_project(project_id).await?;

        info!(
            project_id = %project_id,
            actor = actor.subject(),
            "project deleted"
        );

        Ok(())
    }
}

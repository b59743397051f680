use std::sync::Arc;

use atrium_application::{
    AuthorizationService, MembershipRepository, MembershipService, ProjectRepository,
    ProjectService, RoleCatalogue, RoleRepository, RoleService,
};
use atrium_infrastructure::{InMemoryAccessRepository, PostgresAccessRepository};
use sqlx::PgPool;

use crate::state::AppState;

struct RepositorySet {
    project_repository: Arc<dyn ProjectRepository>,
    role_repository: Arc<dyn RoleRepository>,
    membership_repository: Arc<dyn MembershipRepository>,
}

impl RepositorySet {
    fn shared<T>(repository: T) -> Self
    where
        T: ProjectRepository + RoleRepository + MembershipRepository + 'static,
    {
        let repository = Arc::new(repository);

        Self {
            project_repository: repository.clone(),
            role_repository: repository.clone(),
            membership_repository: repository,
        }
    }
}

pub fn build_app_state(pool: PgPool, sign_in_hook_token: String) -> AppState {
    assemble(
        RepositorySet::shared(PostgresAccessRepository::new(pool)),
        sign_in_hook_token,
    )
}

pub fn build_in_memory_app_state(sign_in_hook_token: String) -> AppState {
    assemble(
        RepositorySet::shared(InMemoryAccessRepository::new()),
        sign_in_hook_token,
    )
}

fn assemble(repositories: RepositorySet, sign_in_hook_token: String) -> AppState {
    let role_catalogue = RoleCatalogue::new(repositories.role_repository.clone());
    let authorization_service = AuthorizationService::new(
        repositories.project_repository.clone(),
        repositories.membership_repository.clone(),
        role_catalogue.clone(),
    );

    AppState {
        project_service: ProjectService::new(
            authorization_service.clone(),
            repositories.project_repository,
        ),
        role_service: RoleService::new(
            authorization_service.clone(),
            role_catalogue.clone(),
            repositories.role_repository,
            repositories.membership_repository.clone(),
        ),
        membership_service: MembershipService::new(
            authorization_service.clone(),
            role_catalogue,
            repositories.membership_repository,
        ),
        authorization_service,
        sign_in_hook_token,
    }
}

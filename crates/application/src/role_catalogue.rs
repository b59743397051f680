use std::sync::Arc;

use atrium_core::{AppResult, ProjectId};
use atrium_domain::{Role, RoleRef, built_in_roles};
use tracing::warn;

use crate::access_ports::RoleRepository;

/// Merged read model over built-in and project custom roles.
#[derive(Clone)]
pub struct RoleCatalogue {
    repository: Arc<dyn RoleRepository>,
}

impl RoleCatalogue {
    /// Creates a catalogue over a custom role repository.
    #[must_use]
    pub fn new(repository: Arc<dyn RoleRepository>) -> Self {
        Self { repository }
    }

    /// Returns the constant built-in roles.
    #[must_use]
    pub fn built_in_roles(&self) -> &'static [Role] {
        built_in_roles()
    }

    /// Lists built-in roles followed by the project's custom roles.
    ///
    /// Custom roles whose name collides with a built-in role are omitted; the
    /// built-in wins. The stored row is left in place.
    pub async fn list_roles(&self, project_id: ProjectId) -> AppResult<Vec<Role>> {
        let mut custom_roles = self.repository.list_custom_roles(project_id).await?;
        custom_roles.retain(|role| {
            if role.shadows_built_in() {
                warn!(
                    project_id = %project_id,
                    role = %role.reference(),
                    name = role.name(),
                    "custom role shadowed by built-in role of the same name"
                );
                return false;
            }

            true
        });
        custom_roles.sort_by_key(|role| role.name().to_lowercase());

        let mut roles = built_in_roles().to_vec();
        roles.extend(custom_roles);
        Ok(roles)
    }

    /// Resolves a role reference against the merged catalogue.
    pub async fn find_role(&self, project_id: ProjectId, role: RoleRef) -> AppResult<Option<Role>> {
        if let RoleRef::BuiltIn(_) = role {
            return Ok(built_in_roles()
                .iter()
                .find(|candidate| candidate.reference() == role)
                .cloned());
        }

        Ok(self
            .list_roles(project_id)
            .await?
            .into_iter()
            .find(|candidate| candidate.reference() == role))
    }
}

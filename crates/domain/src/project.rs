use atrium_core::{AppError, AppResult, NonEmptyString, ProjectId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Project header as seen by access control.
///
/// The owner is an identity comparison, not a stored role: the owner may have
/// no membership record at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    project_id: ProjectId,
    name: NonEmptyString,
    owner_user_id: String,
    created_at: DateTime<Utc>,
}

impl Project {
    /// Creates a new project owned by the given identity.
    pub fn new(
        name: impl Into<String>,
        owner_user_id: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> AppResult<Self> {
        let name = NonEmptyString::new(name)
            .map_err(|_| AppError::Validation("project name must not be blank".to_owned()))?;
        let owner_user_id = owner_user_id.into();
        if owner_user_id.trim().is_empty() {
            return Err(AppError::Validation(
                "project owner user id must not be blank".to_owned(),
            ));
        }

        Ok(Self {
            project_id: ProjectId::new(),
            name,
            owner_user_id,
            created_at,
        })
    }

    /// Rebuilds a stored project.
    #[must_use]
    pub fn from_parts(
        project_id: ProjectId,
        name: NonEmptyString,
        owner_user_id: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            project_id,
            name,
            owner_user_id,
            created_at,
        }
    }

    /// Returns the project identifier.
    #[must_use]
    pub fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the project name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the owner's user id.
    #[must_use]
    pub fn owner_user_id(&self) -> &str {
        self.owner_user_id.as_str()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns whether the user id is the project owner.
    #[must_use]
    pub fn is_owner(&self, user_id: &str) -> bool {
        self.owner_user_id == user_id
    }
}

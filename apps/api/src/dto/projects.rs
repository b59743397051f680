use atrium_application::{AccessSource, EffectiveAccess};
use atrium_core::{ProjectId, UserIdentity};
use atrium_domain::{Capability, PermissionBundle, Project};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for project registration.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/register-project-request.ts"
)]
pub struct RegisterProjectRequest {
    pub name: String,
}

/// API representation of a project.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/project-response.ts"
)]
pub struct ProjectResponse {
    pub project_id: String,
    pub name: String,
    pub owner_user_id: String,
    pub created_at: String,
}

impl From<Project> for ProjectResponse {
    fn from(value: Project) -> Self {
        Self {
            project_id: value.project_id().to_string(),
            name: value.name().as_str().to_owned(),
            owner_user_id: value.owner_user_id().to_owned(),
            created_at: value.created_at().to_rfc3339(),
        }
    }
}

/// Effective permissions of the caller in one project.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/effective-access-response.ts"
)]
pub struct EffectiveAccessResponse {
    pub project_id: String,
    pub subject: String,
    /// One of `owner`, `role`, `fallback` or `none`.
    pub source: String,
    /// Role reference the permissions came from, when a membership exists.
    pub role: Option<String>,
    #[ts(type = "Record<string, boolean>")]
    pub permissions: PermissionBundle,
}

impl EffectiveAccessResponse {
    #[must_use]
    pub fn new(project_id: ProjectId, identity: &UserIdentity, access: EffectiveAccess) -> Self {
        let (source, role) = match access.source {
            AccessSource::OwnerBypass => ("owner", None),
            AccessSource::Role(role) => ("role", Some(role.to_string())),
            AccessSource::DanglingRoleFallback(role) => ("fallback", Some(role.to_string())),
            AccessSource::NoMembership => ("none", None),
        };

        Self {
            project_id: project_id.to_string(),
            subject: identity.subject().to_owned(),
            source: source.to_owned(),
            role,
            permissions: access.permissions,
        }
    }
}

/// Result of a single capability check.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/authorization-response.ts"
)]
pub struct AuthorizationResponse {
    pub capability: String,
    pub allowed: bool,
}

impl AuthorizationResponse {
    #[must_use]
    pub fn new(capability: Capability, allowed: bool) -> Self {
        Self {
            capability: capability.as_str().to_owned(),
            allowed,
        }
    }
}

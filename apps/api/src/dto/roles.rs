use std::collections::BTreeMap;

use atrium_application::{CreateRoleInput, UpdateRoleInput};
use atrium_core::AppError;
use atrium_domain::{PermissionBundle, Role};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for custom role creation.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-role-request.ts"
)]
pub struct CreateRoleRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Missing capabilities default to `false`; unknown ones are rejected.
    #[serde(default)]
    #[ts(type = "Record<string, boolean>")]
    pub permissions: BTreeMap<String, bool>,
}

impl TryFrom<CreateRoleRequest> for CreateRoleInput {
    type Error = AppError;

    fn try_from(value: CreateRoleRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: value.name,
            description: value.description,
            permissions: bundle_from_flags(&value.permissions)?,
        })
    }
}

/// Incoming payload for a partial custom role update.
#[derive(Debug, Default, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-role-request.ts"
)]
pub struct UpdateRoleRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    #[ts(type = "Record<string, boolean> | null")]
    pub permissions: Option<BTreeMap<String, bool>>,
}

impl TryFrom<UpdateRoleRequest> for UpdateRoleInput {
    type Error = AppError;

    fn try_from(value: UpdateRoleRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: value.name,
            description: value.description,
            permissions: value
                .permissions
                .as_ref()
                .map(bundle_from_flags)
                .transpose()?,
        })
    }
}

fn bundle_from_flags(flags: &BTreeMap<String, bool>) -> Result<PermissionBundle, AppError> {
    PermissionBundle::from_transport(
        flags
            .iter()
            .map(|(name, granted)| (name.as_str(), *granted)),
    )
}

/// Incoming payload for membership role reassignment.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/reassign-role-request.ts"
)]
pub struct ReassignRoleRequest {
    /// Built-in role name or custom role id.
    pub role: String,
}

/// API representation of a catalogue role.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-response.ts"
)]
pub struct RoleResponse {
    /// Value memberships use to reference this role.
    pub role_ref: String,
    pub role_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    #[ts(type = "Record<string, boolean>")]
    pub permissions: PermissionBundle,
    pub is_default: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl From<Role> for RoleResponse {
    fn from(value: Role) -> Self {
        Self {
            role_ref: value.reference().to_string(),
            role_id: value.role_id().map(|role_id| role_id.to_string()),
            name: value.name().to_owned(),
            description: value.description().map(str::to_owned),
            permissions: value.permissions(),
            is_default: value.is_default(),
            created_at: value.created_at().map(|timestamp| timestamp.to_rfc3339()),
            updated_at: value.updated_at().map(|timestamp| timestamp.to_rfc3339()),
        }
    }
}

use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::LazyLock;

use atrium_core::{AppError, AppResult, NonEmptyString};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Capability, PermissionBundle};

/// Process-wide roles every project shares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuiltInRole {
    /// Full control; held implicitly by the project owner.
    Owner,
    /// Can view, create and edit, but not delete or administer.
    Editor,
    /// Read-only access.
    Viewer,
}

impl BuiltInRole {
    /// Returns all built-in roles in catalogue order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[BuiltInRole] = &[BuiltInRole::Owner, BuiltInRole::Editor, BuiltInRole::Viewer];

        ALL
    }

    /// Returns the display and reference name of this role.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Owner => "Owner",
            Self::Editor => "Editor",
            Self::Viewer => "Viewer",
        }
    }

    /// Finds a built-in role by name, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::all()
            .iter()
            .copied()
            .find(|role| role.name().eq_ignore_ascii_case(name))
    }

    /// Returns the fixed permission bundle of this role.
    #[must_use]
    pub fn permissions(&self) -> PermissionBundle {
        match self {
            Self::Owner => PermissionBundle::full(),
            Self::Editor => PermissionBundle::from_capabilities([
                Capability::ViewContent,
                Capability::CreateContent,
                Capability::EditContent,
                Capability::ViewDocuments,
                Capability::CreateDocuments,
                Capability::EditDocuments,
                Capability::ViewNotes,
                Capability::CreateNotes,
                Capability::EditNotes,
                Capability::ViewContacts,
                Capability::CreateContacts,
                Capability::EditContacts,
                Capability::ViewEvents,
                Capability::CreateEvents,
                Capability::EditEvents,
                Capability::ViewAnalytics,
                Capability::ViewTimeTracking,
                Capability::ManageTimeEntries,
            ]),
            Self::Viewer => PermissionBundle::from_capabilities([
                Capability::ViewContent,
                Capability::ViewDocuments,
                Capability::ViewNotes,
                Capability::ViewContacts,
                Capability::ViewEvents,
                Capability::ViewAnalytics,
                Capability::ViewTimeTracking,
            ]),
        }
    }

    fn description(&self) -> &'static str {
        match self {
            Self::Owner => "Full access to the project, its team and its roles",
            Self::Editor => "Can view, create and edit project content",
            Self::Viewer => "Can view project content",
        }
    }
}

impl Display for BuiltInRole {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.name())
    }
}

static BUILT_IN_ROLES: LazyLock<Vec<Role>> = LazyLock::new(|| {
    BuiltInRole::all()
        .iter()
        .copied()
        .map(Role::from_built_in)
        .collect()
});

/// Returns the constant built-in role table.
#[must_use]
pub fn built_in_roles() -> &'static [Role] {
    BUILT_IN_ROLES.as_slice()
}

/// Stable identifier of a project custom role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoleId(Uuid);

impl RoleId {
    /// Creates a random role identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a role identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RoleId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RoleId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Reference from a membership to a role: a built-in name or a custom role id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum RoleRef {
    /// One of the built-in roles.
    BuiltIn(BuiltInRole),
    /// A project custom role.
    Custom(RoleId),
}

impl RoleRef {
    /// Returns whether this reference names the built-in owner role.
    #[must_use]
    pub fn is_owner(&self) -> bool {
        matches!(self, Self::BuiltIn(BuiltInRole::Owner))
    }

    /// Parses a transport value into a role reference.
    pub fn from_transport(value: &str) -> AppResult<Self> {
        Self::from_str(value)
    }
}

impl Display for RoleRef {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BuiltIn(role) => formatter.write_str(role.name()),
            Self::Custom(role_id) => write!(formatter, "{role_id}"),
        }
    }
}

impl FromStr for RoleRef {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if let Some(role) = BuiltInRole::from_name(value) {
            return Ok(Self::BuiltIn(role));
        }

        Uuid::parse_str(value.trim())
            .map(|uuid| Self::Custom(RoleId::from_uuid(uuid)))
            .map_err(|_| {
                AppError::Validation(format!(
                    "role reference '{value}' is neither a built-in role name nor a role id"
                ))
            })
    }
}

impl From<RoleRef> for String {
    fn from(value: RoleRef) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for RoleRef {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(value.as_str())
    }
}

/// Validates a name for a new or renamed custom role.
///
/// Names must be non-blank and must not collide with a built-in role name.
pub fn validate_custom_role_name(name: &str) -> AppResult<NonEmptyString> {
    let name = NonEmptyString::new(name)
        .map_err(|_| AppError::Validation("role name must not be blank".to_owned()))?;

    if let Some(role) = BuiltInRole::from_name(name.as_str()) {
        return Err(AppError::Validation(format!(
            "role name '{}' is reserved by the built-in '{}' role",
            name.as_str(),
            role.name()
        )));
    }

    Ok(name)
}

/// Role definition: a named permission bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    reference: RoleRef,
    name: String,
    description: Option<String>,
    permissions: PermissionBundle,
    is_default: bool,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl Role {
    fn from_built_in(role: BuiltInRole) -> Self {
        Self {
            reference: RoleRef::BuiltIn(role),
            name: role.name().to_owned(),
            description: Some(role.description().to_owned()),
            permissions: role.permissions(),
            is_default: true,
            created_at: None,
            updated_at: None,
        }
    }

    /// Creates a custom role stamped with the given creation time.
    #[must_use]
    pub fn new_custom(
        name: NonEmptyString,
        description: Option<String>,
        permissions: PermissionBundle,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self::custom_from_parts(
            RoleId::new(),
            name,
            description,
            permissions,
            created_at,
            created_at,
        )
    }

    /// Rebuilds a stored custom role.
    ///
    /// Stored names are not re-validated so that legacy rows colliding with a
    /// built-in name can still be loaded and filtered by the catalogue.
    #[must_use]
    pub fn custom_from_parts(
        role_id: RoleId,
        name: NonEmptyString,
        description: Option<String>,
        permissions: PermissionBundle,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            reference: RoleRef::Custom(role_id),
            name: name.into(),
            description: normalize_description(description),
            permissions,
            is_default: false,
            created_at: Some(created_at),
            updated_at: Some(updated_at),
        }
    }

    /// Returns the reference memberships use to point at this role.
    #[must_use]
    pub fn reference(&self) -> RoleRef {
        self.reference
    }

    /// Returns the custom role id, if this is a custom role.
    #[must_use]
    pub fn role_id(&self) -> Option<RoleId> {
        match self.reference {
            RoleRef::Custom(role_id) => Some(role_id),
            RoleRef::BuiltIn(_) => None,
        }
    }

    /// Returns the role name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the permission bundle.
    #[must_use]
    pub fn permissions(&self) -> PermissionBundle {
        self.permissions
    }

    /// Returns whether this is a built-in role.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.is_default
    }

    /// Returns the creation timestamp of a custom role.
    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    /// Returns the last update timestamp of a custom role.
    #[must_use]
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Returns whether this custom role's name collides with a built-in role.
    #[must_use]
    pub fn shadows_built_in(&self) -> bool {
        !self.is_default && BuiltInRole::from_name(self.name.as_str()).is_some()
    }

    /// Applies a partial update to a custom role.
    ///
    /// A blank description clears it.
    pub fn apply_update(
        &mut self,
        name: Option<NonEmptyString>,
        description: Option<String>,
        permissions: Option<PermissionBundle>,
        updated_at: DateTime<Utc>,
    ) -> AppResult<()> {
        if self.is_default {
            return Err(AppError::Validation(format!(
                "cannot modify default role '{}'",
                self.name.as_str()
            )));
        }

        if let Some(name) = name {
            self.name = name.into();
        }
        if let Some(description) = description {
            self.description = normalize_description(Some(description));
        }
        if let Some(permissions) = permissions {
            self.permissions = permissions;
        }
        self.updated_at = Some(updated_at);

        Ok(())
    }
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

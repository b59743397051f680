use std::fmt::{Display, Formatter};
use std::str::FromStr;

use atrium_core::{AppError, AppResult, ProjectId, UserIdentity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EmailAddress, RoleRef};

/// Stable identifier of a membership record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MembershipId(Uuid);

impl MembershipId {
    /// Creates a random membership identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a membership identifier from an existing UUID value.
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

impl Default for MembershipId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for MembershipId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl FromStr for MembershipId {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value.trim()).map(Self).map_err(|error| {
            AppError::Validation(format!("invalid membership id '{value}': {error}"))
        })
    }
}

/// Lifecycle state of a membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipState {
    /// Created by email, not yet bound to a registered identity.
    Invited,
    /// Bound to a registered identity.
    Active,
}

impl MembershipState {
    /// Returns a stable storage value for this state.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Invited => "invited",
            Self::Active => "active",
        }
    }
}

/// Record binding an email, and eventually an identity, to a role in one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    membership_id: MembershipId,
    project_id: ProjectId,
    email: EmailAddress,
    user_id: Option<String>,
    display_name: Option<String>,
    role: RoleRef,
    added_at: DateTime<Utc>,
}

impl Membership {
    /// Creates an invited membership.
    ///
    /// The owner role is never assignable to a membership.
    pub fn invite(
        project_id: ProjectId,
        email: EmailAddress,
        role: RoleRef,
        display_name: Option<String>,
        added_at: DateTime<Utc>,
    ) -> AppResult<Self> {
        if role.is_owner() {
            return Err(AppError::Validation(format!(
                "cannot invite '{}' with the Owner role",
                email.as_str()
            )));
        }

        Ok(Self {
            membership_id: MembershipId::new(),
            project_id,
            email,
            user_id: None,
            display_name: normalize_display_name(display_name),
            role,
            added_at,
        })
    }

    /// Rebuilds a stored membership.
    #[must_use]
    pub fn from_parts(
        membership_id: MembershipId,
        project_id: ProjectId,
        email: EmailAddress,
        user_id: Option<String>,
        display_name: Option<String>,
        role: RoleRef,
        added_at: DateTime<Utc>,
    ) -> Self {
        Self {
            membership_id,
            project_id,
            email,
            user_id,
            display_name,
            role,
            added_at,
        }
    }

    /// Returns the membership identifier.
    #[must_use]
    pub fn membership_id(&self) -> MembershipId {
        self.membership_id
    }

    /// Returns the owning project.
    #[must_use]
    pub fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the membership email.
    #[must_use]
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Returns the bound user id once the membership is active.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Returns the optional display name.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Returns the role reference.
    #[must_use]
    pub fn role(&self) -> RoleRef {
        self.role
    }

    /// Returns when the membership was created.
    #[must_use]
    pub fn added_at(&self) -> DateTime<Utc> {
        self.added_at
    }

    /// Returns whether the membership is bound to a registered identity.
    #[must_use]
    pub fn is_registered(&self) -> bool {
        self.user_id.is_some()
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub fn state(&self) -> MembershipState {
        if self.is_registered() {
            MembershipState::Active
        } else {
            MembershipState::Invited
        }
    }

    /// Returns whether the membership is bound to the given user id.
    #[must_use]
    pub fn is_bound_to(&self, user_id: &str) -> bool {
        self.user_id.as_deref() == Some(user_id)
    }

    /// Returns whether the identity is the holder of this membership.
    #[must_use]
    pub fn is_held_by(&self, identity: &UserIdentity) -> bool {
        if self.is_bound_to(identity.subject()) {
            return true;
        }

        !self.is_registered() && identity.email().is_some_and(|email| self.email.matches(email))
    }

    /// Binds the membership to a registered identity.
    ///
    /// Binding is monotonic: an already bound membership is left untouched and
    /// `false` is returned.
    pub fn bind_identity(&mut self, user_id: &str) -> bool {
        if self.is_registered() {
            return false;
        }

        self.user_id = Some(user_id.to_owned());
        true
    }

    /// Points the membership at a different role.
    pub fn reassign(&mut self, role: RoleRef) -> AppResult<()> {
        if role.is_owner() {
            return Err(AppError::Validation(
                "the Owner role cannot be assigned to a membership".to_owned(),
            ));
        }

        if self.role == role {
            return Err(AppError::Validation(format!(
                "membership '{}' already holds role '{role}'",
                self.membership_id
            )));
        }

        self.role = role;
        Ok(())
    }
}

fn normalize_display_name(display_name: Option<String>) -> Option<String> {
    display_name
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

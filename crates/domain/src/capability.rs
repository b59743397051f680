//! Permission schema: the fixed catalogue of project capabilities.
//!
//! Wire names are a versioned contract shared with every caller of the
//! authorization boundary. Renaming one is a breaking change.

use std::str::FromStr;

use atrium_core::AppError;
use serde::{Deserialize, Serialize};

/// Logical grouping of capabilities used by management screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityGroup {
    /// Project settings, team and role administration.
    Project,
    /// General project content.
    Content,
    /// Documents.
    Documents,
    /// Notes.
    Notes,
    /// CRM contacts.
    Contacts,
    /// Calendar events.
    Events,
    /// Analytics and time tracking.
    Special,
}

macro_rules! capability_schema {
    ($(
        $(#[doc = $doc:literal])*
        $variant:ident => $field:ident, $wire:literal, $group:ident;
    )+) => {
        /// One named capability in a [`PermissionBundle`].
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum Capability {
            $(
                $(#[doc = $doc])*
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl Capability {
            /// Returns all known capabilities in schema order.
            #[must_use]
            pub fn all() -> &'static [Self] {
                const ALL: &[Capability] = &[$(Capability::$variant),+];

                ALL
            }

            /// Returns the stable wire name for this capability.
            #[must_use]
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }

            /// Returns the group this capability belongs to.
            #[must_use]
            pub fn group(&self) -> CapabilityGroup {
                match self {
                    $(Self::$variant => CapabilityGroup::$group,)+
                }
            }
        }

        impl FromStr for Capability {
            type Err = AppError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($wire => Ok(Self::$variant),)+
                    _ => Err(AppError::Validation(format!(
                        "unknown capability '{value}'"
                    ))),
                }
            }
        }

        /// Fixed-shape record of capability flags.
        ///
        /// Every flag defaults to `false`. Missing keys in a serialized bundle
        /// deserialize as `false`.
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(default)]
        pub struct PermissionBundle {
            $(
                $(#[doc = $doc])*
                #[serde(rename = $wire)]
                pub $field: bool,
            )+
        }

        impl PermissionBundle {
            /// Returns whether the bundle grants the capability.
            #[must_use]
            pub fn allows(&self, capability: Capability) -> bool {
                match capability {
                    $(Capability::$variant => self.$field,)+
                }
            }

            /// Grants or revokes one capability.
            pub fn set(&mut self, capability: Capability, granted: bool) {
                match capability {
                    $(Capability::$variant => self.$field = granted,)+
                }
            }
        }
    };
}

capability_schema! {
    /// Allows editing project settings.
    EditProject => can_edit_project, "canEditProject", Project;
    /// Allows deleting the project.
    DeleteProject => can_delete_project, "canDeleteProject", Project;
    /// Allows inviting and removing members.
    ManageTeam => can_manage_team, "canManageTeam", Project;
    /// Allows managing custom roles and role assignments.
    ManageRoles => can_manage_roles, "canManageRoles", Project;
    /// Allows viewing general content.
    ViewContent => can_view_content, "canViewContent", Content;
    /// Allows creating general content.
    CreateContent => can_create_content, "canCreateContent", Content;
    /// Allows editing general content.
    EditContent => can_edit_content, "canEditContent", Content;
    /// Allows deleting general content.
    DeleteContent => can_delete_content, "canDeleteContent", Content;
    /// Allows viewing documents.
    ViewDocuments => can_view_documents, "canViewDocuments", Documents;
    /// Allows creating documents.
    CreateDocuments => can_create_documents, "canCreateDocuments", Documents;
    /// Allows editing documents.
    EditDocuments => can_edit_documents, "canEditDocuments", Documents;
    /// Allows deleting documents.
    DeleteDocuments => can_delete_documents, "canDeleteDocuments", Documents;
    /// Allows viewing notes.
    ViewNotes => can_view_notes, "canViewNotes", Notes;
    /// Allows creating notes.
    CreateNotes => can_create_notes, "canCreateNotes", Notes;
    /// Allows editing notes.
    EditNotes => can_edit_notes, "canEditNotes", Notes;
    /// Allows deleting notes.
    DeleteNotes => can_delete_notes, "canDeleteNotes", Notes;
    /// Allows viewing contacts.
    ViewContacts => can_view_contacts, "canViewContacts", Contacts;
    /// Allows creating contacts.
    CreateContacts => can_create_contacts, "canCreateContacts", Contacts;
    /// Allows editing contacts.
    EditContacts => can_edit_contacts, "canEditContacts", Contacts;
    /// Allows deleting contacts.
    DeleteContacts => can_delete_contacts, "canDeleteContacts", Contacts;
    /// Allows viewing calendar events.
    ViewEvents => can_view_events, "canViewEvents", Events;
    /// Allows creating calendar events.
    CreateEvents => can_create_events, "canCreateEvents", Events;
    /// Allows editing calendar events.
    EditEvents => can_edit_events, "canEditEvents", Events;
    /// Allows deleting calendar events.
    DeleteEvents => can_delete_events, "canDeleteEvents", Events;
    /// Allows viewing project analytics.
    ViewAnalytics => can_view_analytics, "canViewAnalytics", Special;
    /// Allows viewing time tracking reports.
    ViewTimeTracking => can_view_time_tracking, "canViewTimeTracking", Special;
    /// Allows creating and editing time entries.
    ManageTimeEntries => can_manage_time_entries, "canManageTimeEntries", Special;
}

impl Capability {
    /// Parses a transport value into a capability.
    pub fn from_transport(value: &str) -> Result<Self, AppError> {
        Self::from_str(value)
    }
}

impl PermissionBundle {
    /// Returns a bundle with every capability granted.
    #[must_use]
    pub fn full() -> Self {
        Self::from_capabilities(Capability::all().iter().copied())
    }

    /// Builds a bundle granting exactly the listed capabilities.
    #[must_use]
    pub fn from_capabilities(capabilities: impl IntoIterator<Item = Capability>) -> Self {
        let mut bundle = Self::default();
        for capability in capabilities {
            bundle.set(capability, true);
        }

        bundle
    }

    /// Builds a bundle from transport flags keyed by wire name.
    ///
    /// Unlike deserialization, unknown keys fail with `Validation` so that a
    /// misspelled capability is never dropped silently.
    pub fn from_transport<'a>(
        flags: impl IntoIterator<Item = (&'a str, bool)>,
    ) -> Result<Self, AppError> {
        let mut bundle = Self::default();
        for (name, granted) in flags {
            bundle.set(Capability::from_transport(name)?, granted);
        }

        Ok(bundle)
    }

    /// Returns granted capabilities in schema order.
    #[must_use]
    pub fn granted(&self) -> Vec<Capability> {
        Capability::all()
            .iter()
            .copied()
            .filter(|capability| self.allows(*capability))
            .collect()
    }

    /// Returns whether no capability is granted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        Capability::all()
            .iter()
            .all(|capability| !self.allows(*capability))
    }
}

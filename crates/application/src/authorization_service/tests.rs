use atrium_core::{AppError, ProjectId};
use atrium_domain::{BuiltInRole, Capability, EmailAddress, Membership, PermissionBundle, RoleRef};
use chrono::Utc;

use crate::{InviteMemberInput, MembershipRepository};
use crate::test_support::{custom_role, fixture, identity};

use super::AccessSource;

#[tokio::test]
async fn owner_resolves_to_full_permissions_without_membership() {
    let fixture = fixture().await;

    let access = fixture
        .authorization_service
        .effective_access(fixture.project_id, &fixture.owner)
        .await;

    assert!(matches!(
        access,
        Ok(ref value) if value.permissions == PermissionBundle::full()
            && value.source == AccessSource::OwnerBypass
    ));
}

#[tokio::test]
async fn owner_bypass_ignores_stored_membership() {
    let fixture = fixture().await;
    let invited = fixture
        .membership_service
        .invite(
            &fixture.owner,
            fixture.project_id,
            InviteMemberInput {
                email: "owner@x.com".to_owned(),
                role: RoleRef::BuiltIn(BuiltInRole::Viewer),
                display_name: None,
            },
        )
        .await;
    assert!(invited.is_ok());
    let bound = fixture
        .membership_service
        .bind_on_sign_in("owner@x.com", fixture.owner.subject())
        .await;
    assert_eq!(bound.map(|value| value.len()).unwrap_or_default(), 1);

    let bundle = fixture
        .authorization_service
        .resolve(fixture.project_id, &fixture.owner)
        .await;

    assert_eq!(bundle.ok(), Some(PermissionBundle::full()));
}

#[tokio::test]
async fn stranger_resolves_to_no_permissions() {
    let fixture = fixture().await;
    let stranger = identity("u9", "stranger@x.com");

    let access = fixture
        .authorization_service
        .effective_access(fixture.project_id, &stranger)
        .await;

    assert!(matches!(
        access,
        Ok(ref value) if value.permissions.is_empty() && value.source == AccessSource::NoMembership
    ));
}

#[tokio::test]
async fn invited_member_resolves_by_email_before_binding() {
    let fixture = fixture().await;
    let invited = fixture
        .membership_service
        .invite(
            &fixture.owner,
            fixture.project_id,
            InviteMemberInput {
                email: "a@x.com".to_owned(),
                role: RoleRef::BuiltIn(BuiltInRole::Editor),
                display_name: None,
            },
        )
        .await;
    assert!(invited.is_ok());

    let allowed = fixture
        .authorization_service
        .authorize(
            fixture.project_id,
            &identity("u2", "A@X.com"),
            Capability::CreateDocuments,
        )
        .await;

    assert!(matches!(allowed, Ok(true)));
}

#[tokio::test]
async fn invited_member_with_non_ascii_email_resolves_before_binding() {
    let fixture = fixture().await;
    let invited = fixture
        .membership_service
        .invite(
            &fixture.owner,
            fixture.project_id,
            InviteMemberInput {
                email: "Ärzte@x.com".to_owned(),
                role: RoleRef::BuiltIn(BuiltInRole::Editor),
                display_name: None,
            },
        )
        .await;
    assert!(invited.is_ok());

    let access = fixture
        .authorization_service
        .effective_access(fixture.project_id, &identity("u3", "Ärzte@x.com"))
        .await;

    assert!(matches!(
        access,
        Ok(ref value) if value.permissions.allows(Capability::CreateDocuments)
            && value.source == AccessSource::Role(RoleRef::BuiltIn(BuiltInRole::Editor))
    ));
}

#[tokio::test]
async fn dangling_role_reference_falls_back_to_viewer() {
    let fixture = fixture().await;
    let role = custom_role(
        "Reviewer",
        PermissionBundle::from_capabilities([Capability::ViewDocuments, Capability::EditDocuments]),
    );
    let role_ref = role.reference();
    fixture.repository.seed_role(fixture.project_id, role).await;

    let invited = fixture
        .membership_service
        .invite(
            &fixture.owner,
            fixture.project_id,
            InviteMemberInput {
                email: "a@x.com".to_owned(),
                role: role_ref,
                display_name: None,
            },
        )
        .await;
    assert!(invited.is_ok());
    let member = identity("u2", "a@x.com");
    let bound = fixture
        .membership_service
        .bind_on_sign_in("a@x.com", "u2")
        .await;
    assert!(bound.is_ok());

    let deleted = fixture
        .role_service
        .delete_role(&fixture.owner, fixture.project_id, role_ref)
        .await;
    assert!(deleted.is_ok());

    let access = fixture
        .authorization_service
        .effective_access(fixture.project_id, &member)
        .await;

    assert!(matches!(
        access,
        Ok(ref value) if value.permissions == BuiltInRole::Viewer.permissions()
            && value.source == AccessSource::DanglingRoleFallback(role_ref)
    ));
}

#[tokio::test]
async fn custom_role_shadowed_by_built_in_name_resolves_to_viewer() {
    let fixture = fixture().await;
    let legacy = custom_role("editor", PermissionBundle::full());
    let legacy_ref = legacy.reference();
    fixture.repository.seed_role(fixture.project_id, legacy).await;

    let membership = Membership::invite(
        fixture.project_id,
        EmailAddress::new("a@x.com").unwrap_or_else(|_| unreachable!()),
        legacy_ref,
        None,
        Utc::now(),
    )
    .unwrap_or_else(|_| unreachable!());
    let inserted = fixture.repository.insert_membership(membership).await;
    assert!(inserted.is_ok());

    let bundle = fixture
        .authorization_service
        .resolve(fixture.project_id, &identity("u2", "a@x.com"))
        .await;

    assert_eq!(bundle.ok(), Some(BuiltInRole::Viewer.permissions()));
}

#[tokio::test]
async fn require_capability_reports_forbidden() {
    let fixture = fixture().await;
    let stranger = identity("u9", "stranger@x.com");

    let result = fixture
        .authorization_service
        .require_capability(fixture.project_id, &stranger, Capability::ViewContent)
        .await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn unknown_project_is_not_found() {
    let fixture = fixture().await;

    let result = fixture
        .authorization_service
        .resolve(ProjectId::new(), &fixture.owner)
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

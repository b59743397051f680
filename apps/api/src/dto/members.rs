use atrium_domain::Membership;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for inviting a member.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/invite-member-request.ts"
)]
pub struct InviteMemberRequest {
    pub email: String,
    /// Built-in role name or custom role id.
    pub role: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// API representation of a project membership.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/membership-response.ts"
)]
pub struct MembershipResponse {
    pub membership_id: String,
    pub project_id: String,
    pub email: String,
    pub user_id: Option<String>,
    pub display_name: Option<String>,
    pub role: String,
    /// Either `invited` or `active`.
    pub state: String,
    pub is_registered: bool,
    pub added_at: String,
}

impl From<Membership> for MembershipResponse {
    fn from(value: Membership) -> Self {
        Self {
            membership_id: value.membership_id().to_string(),
            project_id: value.project_id().to_string(),
            email: value.email().as_str().to_owned(),
            user_id: value.user_id().map(str::to_owned),
            display_name: value.display_name().map(str::to_owned),
            role: value.role().to_string(),
            state: value.state().as_str().to_owned(),
            is_registered: value.is_registered(),
            added_at: value.added_at().to_rfc3339(),
        }
    }
}

/// Sign-in notification from the identity system.
#[derive(Debug, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/sign-in-request.ts"
)]
pub struct SignInRequest {
    pub email: String,
    pub user_id: String,
}

/// Memberships bound by a sign-in notification.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/sign-in-response.ts"
)]
pub struct SignInResponse {
    pub bound: Vec<MembershipResponse>,
}

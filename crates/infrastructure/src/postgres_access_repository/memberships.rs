use tracing::debug;

use super::*;

const MEMBERSHIP_COLUMNS: &str =
    "id, project_id, email, user_id, display_name, role, added_at";

impl PostgresAccessRepository {
    pub(super) async fn list_memberships_impl(
        &self,
        project_id: ProjectId,
    ) -> AppResult<Vec<Membership>> {
        let rows = sqlx::query_as::<_, MembershipRow>(&format!(
            r#"
            SELECT {MEMBERSHIP_COLUMNS}
            FROM project_memberships
            WHERE project_id = $1
            ORDER BY added_at, email
            "#
        ))
        .bind(project_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to list memberships for project '{project_id}': {error}"
            ))
        })?;

        rows.into_iter().map(membership_from_row).collect()
    }

    pub(super) async fn find_membership_impl(
        &self,
        project_id: ProjectId,
        membership_id: MembershipId,
    ) -> AppResult<Option<Membership>> {
        let row = sqlx::query_as::<_, MembershipRow>(&format!(
            r#"
            SELECT {MEMBERSHIP_COLUMNS}
            FROM project_memberships
            WHERE project_id = $1 AND id = $2
            "#
        ))
        .bind(project_id.as_uuid())
        .bind(membership_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to load membership '{membership_id}' for project '{project_id}': {error}"
            ))
        })?;

        row.map(membership_from_row).transpose()
    }

    pub(super) async fn find_membership_by_user_impl(
        &self,
        project_id: ProjectId,
        user_id: &str,
    ) -> AppResult<Option<Membership>> {
        let row = sqlx::query_as::<_, MembershipRow>(&format!(
            r#"
            SELECT {MEMBERSHIP_COLUMNS}
            FROM project_memberships
            WHERE project_id = $1 AND user_id = $2
            LIMIT 1
            "#
        ))
        .bind(project_id.as_uuid())
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to resolve membership for user '{user_id}' in project '{project_id}': {error}"
            ))
        })?;

        row.map(membership_from_row).transpose()
    }

    pub(super) async fn find_membership_by_email_impl(
        &self,
        project_id: ProjectId,
        email: &EmailAddress,
    ) -> AppResult<Option<Membership>> {
        let row = sqlx::query_as::<_, MembershipRow>(&format!(
            r#"
            SELECT {MEMBERSHIP_COLUMNS}
            FROM project_memberships
            WHERE project_id = $1 AND email = $2
            "#
        ))
        .bind(project_id.as_uuid())
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to resolve membership for '{email}' in project '{project_id}': {error}"
            ))
        })?;

        row.map(membership_from_row).transpose()
    }

    pub(super) async fn insert_membership_impl(&self, membership: Membership) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO project_memberships (
                id, project_id, email, user_id, display_name, role, added_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(membership.membership_id().as_uuid())
        .bind(membership.project_id().as_uuid())
        .bind(membership.email().as_str())
        .bind(membership.user_id())
        .bind(membership.display_name())
        .bind(membership.role().to_string())
        .bind(membership.added_at())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(error) => {
                if is_unique_violation(&error) {
                    return Err(AppError::Conflict(format!(
                        "'{}' is already a member of project '{}'",
                        membership.email(),
                        membership.project_id()
                    )));
                }

                Err(AppError::Internal(format!(
                    "failed to insert membership for '{}' in project '{}': {error}",
                    membership.email(),
                    membership.project_id()
                )))
            }
        }
    }

    pub(super) async fn update_membership_role_impl(
        &self,
        project_id: ProjectId,
        membership_id: MembershipId,
        role: RoleRef,
    ) -> AppResult<Membership> {
        let row = sqlx::query_as::<_, MembershipRow>(&format!(
            r#"
            UPDATE project_memberships
            SET role = $3
            WHERE project_id = $1 AND id = $2
            RETURNING {MEMBERSHIP_COLUMNS}
            "#
        ))
        .bind(project_id.as_uuid())
        .bind(membership_id.as_uuid())
        .bind(role.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to update role of membership '{membership_id}': {error}"
            ))
        })?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "membership '{membership_id}' does not exist in project '{project_id}'"
            ))
        })?;

        membership_from_row(row)
    }

    pub(super) async fn delete_membership_impl(
        &self,
        project_id: ProjectId,
        membership_id: MembershipId,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            DELETE FROM project_memberships
            WHERE project_id = $1 AND id = $2
            "#,
        )
        .bind(project_id.as_uuid())
        .bind(membership_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to delete membership '{membership_id}': {error}"
            ))
        })?;

        Ok(())
    }

    pub(super) async fn bind_memberships_for_email_impl(
        &self,
        email: &EmailAddress,
        user_id: &str,
    ) -> AppResult<Vec<Membership>> {
        let rows = sqlx::query_as::<_, MembershipRow>(&format!(
            r#"
            UPDATE project_memberships
            SET user_id = $2
            WHERE email = $1 AND user_id IS NULL
            RETURNING {MEMBERSHIP_COLUMNS}
            "#
        ))
        .bind(email.as_str())
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to bind memberships for '{email}': {error}"
            ))
        })?;

        debug!(user_id, bound = rows.len(), "bound memberships by email");

        let mut memberships = rows
            .into_iter()
            .map(membership_from_row)
            .collect::<AppResult<Vec<_>>>()?;
        memberships.sort_by_key(|membership| (membership.added_at(), membership.project_id()));

        Ok(memberships)
    }

    pub(super) async fn count_memberships_with_role_impl(
        &self,
        project_id: ProjectId,
        role: RoleRef,
    ) -> AppResult<u64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM project_memberships
            WHERE project_id = $1 AND role = $2
            "#,
        )
        .bind(project_id.as_uuid())
        .bind(role.to_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to count memberships with role '{role}': {error}"
            ))
        })?;

        Ok(u64::try_from(count).unwrap_or_default())
    }
}

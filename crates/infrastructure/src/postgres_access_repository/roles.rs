use super::*;

impl PostgresAccessRepository {
    pub(super) async fn list_custom_roles_impl(&self, project_id: ProjectId) -> AppResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, name, description, permissions, created_at, updated_at
            FROM project_roles
            WHERE project_id = $1
            ORDER BY lower(name)
            "#,
        )
        .bind(project_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to list roles for project '{project_id}': {error}"
            ))
        })?;

        rows.into_iter().map(role_from_row).collect()
    }

    pub(super) async fn find_custom_role_impl(
        &self,
        project_id: ProjectId,
        role_id: RoleId,
    ) -> AppResult<Option<Role>> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, name, description, permissions, created_at, updated_at
            FROM project_roles
            WHERE project_id = $1 AND id = $2
            "#,
        )
        .bind(project_id.as_uuid())
        .bind(role_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to load role '{role_id}' for project '{project_id}': {error}"
            ))
        })?;

        row.map(role_from_row).transpose()
    }

    pub(super) async fn create_custom_role_impl(
        &self,
        project_id: ProjectId,
        role: Role,
    ) -> AppResult<()> {
        let role_id = stored_role_id(&role)?;
        let permissions = permissions_json(&role)?;
        let created_at = role.created_at().unwrap_or_else(Utc::now);

        sqlx::query(
            r#"
            INSERT INTO project_roles (
                id, project_id, name, description, permissions, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(role_id.as_uuid())
        .bind(project_id.as_uuid())
        .bind(role.name())
        .bind(role.description())
        .bind(permissions)
        .bind(created_at)
        .bind(role.updated_at().unwrap_or(created_at))
        .execute(&self.pool)
        .await
        .map_err(|error| map_role_conflict(error, role.name(), "create"))?;

        Ok(())
    }

    pub(super) async fn update_custom_role_impl(
        &self,
        project_id: ProjectId,
        role: Role,
    ) -> AppResult<()> {
        let role_id = stored_role_id(&role)?;
        let permissions = permissions_json(&role)?;

        let result = sqlx::query(
            r#"
            UPDATE project_roles
            SET name = $3,
                description = $4,
                permissions = $5,
                updated_at = $6
            WHERE project_id = $1 AND id = $2
            "#,
        )
        .bind(project_id.as_uuid())
        .bind(role_id.as_uuid())
        .bind(role.name())
        .bind(role.description())
        .bind(permissions)
        .bind(role.updated_at().unwrap_or_else(Utc::now))
        .execute(&self.pool)
        .await
        .map_err(|error| map_role_conflict(error, role.name(), "update"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "role '{role_id}' does not exist in project '{project_id}'"
            )));
        }

        Ok(())
    }

    pub(super) async fn delete_custom_role_impl(
        &self,
        project_id: ProjectId,
        role_id: RoleId,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            DELETE FROM project_roles
            WHERE project_id = $1 AND id = $2
            "#,
        )
        .bind(project_id.as_uuid())
        .bind(role_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to delete role '{role_id}' for project '{project_id}': {error}"
            ))
        })?;

        Ok(())
    }
}

fn stored_role_id(role: &Role) -> AppResult<RoleId> {
    role.role_id().ok_or_else(|| {
        AppError::Validation(format!(
            "default role '{}' cannot be stored as a custom role",
            role.name()
        ))
    })
}

fn permissions_json(role: &Role) -> AppResult<serde_json::Value> {
    serde_json::to_value(role.permissions()).map_err(|error| {
        AppError::Internal(format!(
            "failed to serialize permissions for role '{}': {error}",
            role.name()
        ))
    })
}

fn map_role_conflict(error: sqlx::Error, role_name: &str, action: &str) -> AppError {
    if is_unique_violation(&error) {
        return AppError::Conflict(format!("role '{role_name}' already exists"));
    }

    AppError::Internal(format!("failed to {action} role '{role_name}': {error}"))
}

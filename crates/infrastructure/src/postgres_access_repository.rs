use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use atrium_application::{MembershipRepository, ProjectRepository, RoleRepository};
use atrium_core::{AppError, AppResult, NonEmptyString, ProjectId};
use atrium_domain::{
    EmailAddress, Membership, MembershipId, PermissionBundle, Project, Role, RoleId, RoleRef,
};

mod memberships;
mod roles;


/// PostgreSQL-backed repository for projects, custom roles and memberships.
#[derive(Clone)]
pub struct PostgresAccessRepository {
    pool: PgPool,
}

impl PostgresAccessRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ProjectRow {
    id: uuid::Uuid,
    name: String,
    owner_user_id: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct RoleRow {
    id: uuid::Uuid,
    name: String,
    description: Option<String>,
    permissions: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct MembershipRow {
    id: uuid::Uuid,
    project_id: uuid::Uuid,
    email: String,
    user_id: Option<String>,
    display_name: Option<String>,
    role: String,
    added_at: DateTime<Utc>,
}

fn project_from_row(row: ProjectRow) -> AppResult<Project> {
    let name = NonEmptyString::new(row.name).map_err(|error| {
        AppError::Internal(format!("persisted project '{}' is invalid: {error}", row.id))
    })?;

    Ok(Project::from_parts(
        ProjectId::from_uuid(row.id),
        name,
        row.owner_user_id,
        row.created_at,
    ))
}

fn role_from_row(row: RoleRow) -> AppResult<Role> {
    let name = NonEmptyString::new(row.name).map_err(|error| {
        AppError::Internal(format!("persisted role '{}' is invalid: {error}", row.id))
    })?;
    let permissions =
        serde_json::from_value::<PermissionBundle>(row.permissions).map_err(|error| {
            AppError::Internal(format!(
                "persisted permissions for role '{}' are invalid: {error}",
                row.id
            ))
        })?;

    Ok(Role::custom_from_parts(
        RoleId::from_uuid(row.id),
        name,
        row.description,
        permissions,
        row.created_at,
        row.updated_at,
    ))
}

fn membership_from_row(row: MembershipRow) -> AppResult<Membership> {
    let email = EmailAddress::new(row.email).map_err(|error| {
        AppError::Internal(format!(
            "persisted membership '{}' has an invalid email: {error}",
            row.id
        ))
    })?;
    let role = RoleRef::from_str(row.role.as_str()).map_err(|error| {
        AppError::Internal(format!(
            "persisted membership '{}' has an invalid role reference: {error}",
            row.id
        ))
    })?;

    Ok(Membership::from_parts(
        MembershipId::from_uuid(row.id),
        ProjectId::from_uuid(row.project_id),
        email,
        row.user_id,
        row.display_name,
        role,
        row.added_at,
    ))
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(
        error,
        sqlx::Error::Database(database_error) if database_error.code().as_deref() == Some("23505")
    )
}

#[async_trait]
impl ProjectRepository for PostgresAccessRepository {
    async fn save_project(&self, project: Project) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO projects (id, name, owner_user_id, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(project.project_id().as_uuid())
        .bind(project.name().as_str())
        .bind(project.owner_user_id())
        .bind(project.created_at())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(error) => {
                if is_unique_violation(&error) {
                    return Err(AppError::Conflict(format!(
                        "project '{}' already exists",
                        project.project_id()
                    )));
                }

                Err(AppError::Internal(format!(
                    "failed to save project '{}': {error}",
                    project.project_id()
                )))
            }
        }
    }

    async fn find_project(&self, project_id: ProjectId) -> AppResult<Option<Project>> {
        let row = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT id, name, owner_user_id, created_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(project_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to load project '{project_id}': {error}"))
        })?;

        row.map(project_from_row).transpose()
    }

    async fn delete_project(&self, project_id: ProjectId) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM projects
            WHERE id = $1
            "#,
        )
        .bind(project_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to delete project '{project_id}': {error}"))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "project '{project_id}' does not exist"
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl RoleRepository for PostgresAccessRepository {
    async fn list_custom_roles(&self, project_id: ProjectId) -> AppResult<Vec<Role>> {
        self.list_custom_roles_impl(project_id).await
    }

    async fn find_custom_role(
        &self,
        project_id: ProjectId,
        role_id: RoleId,
    ) -> AppResult<Option<Role>> {
        self.find_custom_role_impl(project_id, role_id).await
    }

    async fn create_custom_role(&self, project_id: ProjectId, role: Role) -> AppResult<()> {
        self.create_custom_role_impl(project_id, role).await
    }

    async fn update_custom_role(&self, project_id: ProjectId, role: Role) -> AppResult<()> {
        self.update_custom_role_impl(project_id, role).await
    }

    async fn delete_custom_role(&self, project_id: ProjectId, role_id: RoleId) -> AppResult<()> {
        self.delete_custom_role_impl(project_id, role_id).await
    }
}

#[async_trait]
impl MembershipRepository for PostgresAccessRepository {
    async fn list_memberships(&self, project_id: ProjectId) -> AppResult<Vec<Membership>> {
        self.list_memberships_impl(project_id).await
    }

    async fn find_membership(
        &self,
        project_id: ProjectId,
        membership_id: MembershipId,
    ) -> AppResult<Option<Membership>> {
        self.find_membership_impl(project_id, membership_id).await
    }

    async fn find_membership_by_user(
        &self,
        project_id: ProjectId,
        user_id: &str,
    ) -> AppResult<Option<Membership>> {
        self.find_membership_by_user_impl(project_id, user_id).await
    }

    async fn find_membership_by_email(
        &self,
        project_id: ProjectId,
        email: &EmailAddress,
    ) -> AppResult<Option<Membership>> {
        self.find_membership_by_email_impl(project_id, email).await
    }

    async fn insert_membership(&self, membership: Membership) -> AppResult<()> {
        self.insert_membership_impl(membership).await
    }

    async fn update_membership_role(
        &self,
        project_id: ProjectId,
        membership_id: MembershipId,
        role: RoleRef,
    ) -> AppResult<Membership> {
        self.update_membership_role_impl(project_id, membership_id, role)
            .await
    }

    async fn delete_membership(
        &self,
        project_id: ProjectId,
        membership_id: MembershipId,
    ) -> AppResult<()> {
        self.delete_membership_impl(project_id, membership_id).await
    }

    async fn bind_memberships_for_email(
        &self,
        email: &EmailAddress,
        user_id: &str,
    ) -> AppResult<Vec<Membership>> {
        self.bind_memberships_for_email_impl(email, user_id).await
    }

    async fn count_memberships_with_role(
        &self,
        project_id: ProjectId,
        role: RoleRef,
    ) -> AppResult<u64> {
        self.count_memberships_with_role_impl(project_id, role)
            .await
    }
}

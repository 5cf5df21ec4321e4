use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::map_insert_error;
use crate::domain::repositories::{RepositoryError, RoleRepository};
use crate::domain::role::Role;

/// PostgreSQL implementation of RoleRepository
pub struct PostgresRoleRepository {
    pool: PgPool,
}

impl PostgresRoleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct RoleRow {
    id: Uuid,
    name: String,
}

impl From<RoleRow> for Role {
    fn from(row: RoleRow) -> Self {
        Role {
            id: row.id,
            name: row.name,
        }
    }
}

#[async_trait]
impl RoleRepository for PostgresRoleRepository {
    async fn create(&self, role: &Role) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO roles (id, name, normalized_name)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(role.id)
        .bind(&role.name)
        .bind(role.normalized_name())
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, format!("role {}", role.name)))?;

        Ok(())
    }

    async fn find_by_normalized_name(
        &self,
        normalized_name: &str,
    ) -> Result<Option<Role>, RepositoryError> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, name
            FROM roles
            WHERE normalized_name = $1
            "#,
        )
        .bind(normalized_name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Role::from))
    }

    async fn list(&self) -> Result<Vec<Role>, RepositoryError> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT id, name
            FROM roles
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Role::from).collect())
    }

    async fn add_user_to_role(&self, user_id: Uuid, role_id: Uuid) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, role_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(role_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn roles_for_user(&self, user_id: Uuid) -> Result<Vec<Role>, RepositoryError> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT r.id, r.name
            FROM roles r
            JOIN user_roles ur ON ur.role_id = r.id
            WHERE ur.user_id = $1
            ORDER BY r.name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Role::from).collect())
    }
}

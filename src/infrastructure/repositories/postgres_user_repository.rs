use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::map_insert_error;
use crate::domain::repositories::{RepositoryError, UserRepository};
use crate::domain::user::value_objects::Email;
use crate::domain::user::ApplicationUser;

/// PostgreSQL implementation of UserRepository
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a new PostgresUserRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    email_confirmed: bool,
    password_hash: String,
    full_name: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for ApplicationUser {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::new(row.email)
            .map_err(|e| RepositoryError::Corrupt(format!("user {}: {}", row.id, e)))?;

        Ok(ApplicationUser {
            id: row.id,
            email,
            email_confirmed: row.email_confirmed,
            password_hash: row.password_hash,
            full_name: row.full_name,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: &ApplicationUser) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO users (
                id, email, normalized_email, email_confirmed,
                password_hash, full_name, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id)
        .bind(user.email.as_str())
        .bind(user.normalized_email())
        .bind(user.email_confirmed)
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, format!("email {}", user.email)))?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ApplicationUser>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, email_confirmed, password_hash, full_name, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ApplicationUser::try_from).transpose()
    }

    async fn find_by_normalized_email(
        &self,
        normalized_email: &str,
    ) -> Result<Option<ApplicationUser>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, email_confirmed, password_hash, full_name, created_at
            FROM users
            WHERE normalized_email = $1
            "#,
        )
        .bind(normalized_email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ApplicationUser::try_from).transpose()
    }

    async fn confirm_email(&self, user_id: Uuid) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET email_confirmed = TRUE
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("user {}", user_id)));
        }

        Ok(())
    }
}

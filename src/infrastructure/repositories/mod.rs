// Repository implementations (data access layer)
// Adapters that implement domain repository interfaces

pub mod postgres_role_repository;
pub mod postgres_user_repository;

pub use postgres_role_repository::PostgresRoleRepository;
pub use postgres_user_repository::PostgresUserRepository;

use crate::domain::repositories::RepositoryError;

/// Unique-constraint violations become `Duplicate`, everything else stays a database error
fn map_insert_error(error: sqlx::Error, what: String) -> RepositoryError {
    match &error {
        sqlx::Error::Database(db) if db.is_unique_violation() => RepositoryError::Duplicate(what),
        _ => RepositoryError::Database(error),
    }
}

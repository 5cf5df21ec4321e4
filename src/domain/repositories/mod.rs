// Repository ports for the identity subsystem
// Implementations live in the infrastructure layer

pub mod role_repository;
pub mod user_repository;

pub use role_repository::RoleRepository;
pub use user_repository::UserRepository;

use thiserror::Error;

/// Errors surfaced by repository implementations
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Duplicate record: {0}")]
    Duplicate(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

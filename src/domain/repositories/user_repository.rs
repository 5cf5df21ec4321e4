use async_trait::async_trait;
use uuid::Uuid;

use super::RepositoryError;
use crate::domain::user::ApplicationUser;

/// Repository trait for the user identity record
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user; fails with `Duplicate` when the normalized email is taken
    async fn create(&self, user: &ApplicationUser) -> Result<(), RepositoryError>;

    /// Find a user by ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ApplicationUser>, RepositoryError>;

    /// Find a user by upper-cased email address
    async fn find_by_normalized_email(
        &self,
        normalized_email: &str,
    ) -> Result<Option<ApplicationUser>, RepositoryError>;

    /// Mark the user's email as confirmed
    async fn confirm_email(&self, user_id: Uuid) -> Result<(), RepositoryError>;
}

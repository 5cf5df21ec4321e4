use async_trait::async_trait;
use uuid::Uuid;

use super::RepositoryError;
use crate::domain::role::Role;

/// Repository trait for roles and user-role membership
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Insert a role; fails with `Duplicate` when the normalized name exists
    async fn create(&self, role: &Role) -> Result<(), RepositoryError>;

    /// Find a role by upper-cased name
    async fn find_by_normalized_name(
        &self,
        normalized_name: &str,
    ) -> Result<Option<Role>, RepositoryError>;

    /// All roles, ordered by name
    async fn list(&self) -> Result<Vec<Role>, RepositoryError>;

    /// Grant a role to a user. Granting an already held role is a no-op.
    async fn add_user_to_role(&self, user_id: Uuid, role_id: Uuid) -> Result<(), RepositoryError>;

    /// Roles held by a user, ordered by name
    async fn roles_for_user(&self, user_id: Uuid) -> Result<Vec<Role>, RepositoryError>;
}

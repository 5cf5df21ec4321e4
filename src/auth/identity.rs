use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use super::password::PasswordHasher;
use super::password_policy::{PasswordPolicy, PasswordViolation};
use crate::domain::repositories::{RepositoryError, RoleRepository, UserRepository};
use crate::domain::role::{self, normalize_role_name, Role};
use crate::domain::user::value_objects::Email;
use crate::domain::user::ApplicationUser;

/// Failures of identity operations
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("{0}")]
    InvalidEmail(String),

    #[error("{}", join_violations(.0))]
    WeakPassword(Vec<PasswordViolation>),

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found: {0}")]
    UserNotFound(Uuid),

    #[error("Role not found: {0}")]
    RoleNotFound(String),

    #[error("Role already exists: {0}")]
    DuplicateRole(String),

    #[error("Password hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

fn join_violations(violations: &[PasswordViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// User and role management over the repository ports
///
/// Cheap to clone; all clones share the same repositories.
#[derive(Clone)]
pub struct IdentityService {
    users: Arc<dyn UserRepository>,
    roles: Arc<dyn RoleRepository>,
    policy: PasswordPolicy,
    hasher: PasswordHasher,
}

impl IdentityService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        roles: Arc<dyn RoleRepository>,
        policy: PasswordPolicy,
        hasher: PasswordHasher,
    ) -> Self {
        Self {
            users,
            roles,
            policy,
            hasher,
        }
    }

    /// Validates and stores a new user with a hashed password
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<ApplicationUser, IdentityError> {
        let email = Email::new(email).map_err(IdentityError::InvalidEmail)?;
        self.policy
            .validate(password)
            .map_err(IdentityError::WeakPassword)?;

        if self
            .users
            .find_by_normalized_email(&email.normalized())
            .await?
            .is_some()
        {
            return Err(IdentityError::DuplicateEmail);
        }

        let password_hash = self.hasher.hash(password)?;
        let user = ApplicationUser::new(email, password_hash, full_name.trim());

        // A concurrent registration can still win the unique index
        self.users.create(&user).await.map_err(|e| match e {
            RepositoryError::Duplicate(_) => IdentityError::DuplicateEmail,
            other => IdentityError::Repository(other),
        })?;

        // New accounts join the default role once it has been seeded
        if let Some(default_role) = self
            .roles
            .find_by_normalized_name(&normalize_role_name(role::USER))
            .await?
        {
            self.roles.add_user_to_role(user.id, default_role.id).await?;
        }

        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Looks up a user by email and checks the password
    ///
    /// Unknown emails and wrong passwords are indistinguishable to callers.
    pub async fn check_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ApplicationUser, IdentityError> {
        let email = Email::new(email).map_err(|_| IdentityError::InvalidCredentials)?;
        let user = self
            .users
            .find_by_normalized_email(&email.normalized())
            .await?
            .ok_or(IdentityError::InvalidCredentials)?;

        if !self.hasher.verify(password, &user.password_hash)? {
            tracing::debug!(user_id = %user.id, "password mismatch");
            return Err(IdentityError::InvalidCredentials);
        }

        Ok(user)
    }

    pub async fn find_by_id(&self, user_id: Uuid) -> Result<ApplicationUser, IdentityError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(IdentityError::UserNotFound(user_id))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<ApplicationUser>, IdentityError> {
        let email = Email::new(email).map_err(IdentityError::InvalidEmail)?;
        Ok(self.users.find_by_normalized_email(&email.normalized()).await?)
    }

    pub async fn confirm_email(&self, user_id: Uuid) -> Result<(), IdentityError> {
        self.users.confirm_email(user_id).await.map_err(|e| match e {
            RepositoryError::NotFound(_) => IdentityError::UserNotFound(user_id),
            other => IdentityError::Repository(other),
        })
    }

    /// Creates a role if no role with the same normalized name exists
    pub async fn create_role(&self, name: &str) -> Result<Role, IdentityError> {
        let role = Role::new(name.trim());
        if self
            .roles
            .find_by_normalized_name(&role.normalized_name())
            .await?
            .is_some()
        {
            return Err(IdentityError::DuplicateRole(role.name));
        }

        self.roles.create(&role).await.map_err(|e| match e {
            RepositoryError::Duplicate(_) => IdentityError::DuplicateRole(role.name.clone()),
            other => IdentityError::Repository(other),
        })?;
        Ok(role)
    }

    pub async fn role_exists(&self, name: &str) -> Result<bool, IdentityError> {
        Ok(self
            .roles
            .find_by_normalized_name(&normalize_role_name(name))
            .await?
            .is_some())
    }

    pub async fn list_roles(&self) -> Result<Vec<Role>, IdentityError> {
        Ok(self.roles.list().await?)
    }

    pub async fn add_to_role(&self, user_id: Uuid, role_name: &str) -> Result<(), IdentityError> {
        let user = self.find_by_id(user_id).await?;
        let role = self
            .roles
            .find_by_normalized_name(&normalize_role_name(role_name))
            .await?
            .ok_or_else(|| IdentityError::RoleNotFound(role_name.to_string()))?;

        self.roles.add_user_to_role(user.id, role.id).await?;
        Ok(())
    }

    /// Role names held by a user
    pub async fn role_names(&self, user_id: Uuid) -> Result<Vec<String>, IdentityError> {
        Ok(self
            .roles
            .roles_for_user(user_id)
            .await?
            .into_iter()
            .map(|role| role.name)
            .collect())
    }
}

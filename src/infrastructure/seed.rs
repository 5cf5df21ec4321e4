// Optional startup seeding; runs only when SEED_DATABASE=true

use crate::auth::{IdentityError, IdentityService};
use crate::domain::role;

/// Ensures the built-in roles exist. Safe to run on every start.
pub async fn seed_roles(identity: &IdentityService) -> Result<(), IdentityError> {
    for name in [role::ADMIN, role::USER] {
        if identity.role_exists(name).await? {
            continue;
        }
        identity.create_role(name).await?;
        tracing::info!(role = name, "seeded role");
    }
    Ok(())
}

/// Grants the Admin role to a registered account.
///
/// Returns `false` when no account with that email exists yet; the grant is
/// applied on a later start once the account has registered.
pub async fn grant_admin(identity: &IdentityService, email: &str) -> Result<bool, IdentityError> {
    let Some(user) = identity.find_by_email(email).await? else {
        tracing::warn!(email, "admin account not registered yet, skipping grant");
        return Ok(false);
    };

    identity.add_to_role(user.id, role::ADMIN).await?;
    tracing::info!(user_id = %user.id, "granted admin role");
    Ok(true)
}

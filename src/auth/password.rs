// Password hashing utilities
// Uses bcrypt; the work factor is configurable so tests can run at the minimum cost

use bcrypt::{hash, verify, BcryptError, DEFAULT_COST};

/// bcrypt hasher with a fixed work factor
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}

impl PasswordHasher {
    /// Creates a hasher with an explicit bcrypt cost (4..=31)
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }

    /// Hashes a password
    ///
    /// # Example
    /// ```
    /// use bookfinal_api::auth::password::PasswordHasher;
    ///
    /// let hasher = PasswordHasher::with_cost(4);
    /// let hash = hasher.hash("Secret!").expect("valid hash");
    /// assert!(hasher.verify("Secret!", &hash).unwrap());
    /// ```
    pub fn hash(&self, password: &str) -> Result<String, BcryptError> {
        hash(password, self.cost)
    }

    /// Verifies a password against a bcrypt hash
    ///
    /// A mismatch is `Ok(false)`; `Err` means the stored hash is malformed.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, BcryptError> {
        verify(password, hash)
    }
}

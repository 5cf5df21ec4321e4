// User identity record and its value objects

pub mod value_objects;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use value_objects::Email;

/// Identity record for an API user
///
/// Owned by the identity subsystem: created on registration, read on login
/// and on every authenticated lookup.
#[derive(Debug, Clone)]
pub struct ApplicationUser {
    pub id: Uuid,
    pub email: Email,
    pub email_confirmed: bool,
    pub password_hash: String,
    pub full_name: String,
    pub created_at: DateTime<Utc>,
}

impl ApplicationUser {
    /// Builds a new, unconfirmed user from an already hashed password
    pub fn new(email: Email, password_hash: String, full_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            email_confirmed: false,
            password_hash,
            full_name: full_name.into(),
            created_at: Utc::now(),
        }
    }

    /// Upper-cased email stored alongside the record for unique lookups
    pub fn normalized_email(&self) -> String {
        self.email.normalized()
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

/// Email value object representing a valid email address
///
/// # Invariants
/// - Must contain '@' character
/// - Must be at least 3 characters long
/// - Surrounding whitespace is trimmed
/// - Is immutable after construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    /// Creates a new Email value object
    ///
    /// # Example
    /// ```
    /// use bookfinal_api::domain::user::value_objects::Email;
    ///
    /// let email = Email::new(" reader@example.com ").expect("valid email");
    /// assert_eq!(email.as_str(), "reader@example.com");
    /// ```
    pub fn new(email: impl Into<String>) -> Result<Self, String> {
        let email = email.into();
        let trimmed = email.trim();
        if Self::is_valid(trimmed) {
            Ok(Email(trimmed.to_string()))
        } else {
            Err(format!("Invalid email: {}", email))
        }
    }

    fn is_valid(email: &str) -> bool {
        email.contains('@') && email.len() >= 3
    }

    /// Returns the email as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Upper-cased form used for case-insensitive lookups and uniqueness
    pub fn normalized(&self) -> String {
        self.0.to_uppercase()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

use std::collections::HashSet;
use std::fmt;

/// Password strength rules applied at registration
///
/// Character classes are ASCII-only: a non-ASCII letter counts as a
/// non-alphanumeric character, not as upper or lower case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub required_length: usize,
    pub required_unique_chars: usize,
    pub require_digit: bool,
    pub require_lowercase: bool,
    pub require_uppercase: bool,
    pub require_non_alphanumeric: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            required_length: 6,
            required_unique_chars: 1,
            require_digit: true,
            require_lowercase: true,
            require_uppercase: true,
            require_non_alphanumeric: true,
        }
    }
}

/// A single rule a candidate password broke
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordViolation {
    TooShort(usize),
    RequiresUniqueChars(usize),
    RequiresDigit,
    RequiresLower,
    RequiresUpper,
    RequiresNonAlphanumeric,
}

impl fmt::Display for PasswordViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort(n) => write!(f, "Passwords must be at least {} characters.", n),
            Self::RequiresUniqueChars(n) => {
                write!(f, "Passwords must use at least {} different characters.", n)
            }
            Self::RequiresDigit => f.write_str("Passwords must have at least one digit ('0'-'9')."),
            Self::RequiresLower => {
                f.write_str("Passwords must have at least one lowercase ('a'-'z').")
            }
            Self::RequiresUpper => {
                f.write_str("Passwords must have at least one uppercase ('A'-'Z').")
            }
            Self::RequiresNonAlphanumeric => {
                f.write_str("Passwords must have at least one non alphanumeric character.")
            }
        }
    }
}

impl PasswordPolicy {
    /// Policy used by the book API: digits optional, at least 6 characters,
    /// every other rule at its default
    pub fn relaxed() -> Self {
        Self {
            require_digit: false,
            required_length: 6,
            ..Self::default()
        }
    }

    /// Checks a password, reporting every violated rule in a stable order
    pub fn validate(&self, password: &str) -> Result<(), Vec<PasswordViolation>> {
        let mut violations = Vec::new();

        if password.chars().count() < self.required_length {
            violations.push(PasswordViolation::TooShort(self.required_length));
        }
        if self.require_non_alphanumeric && password.chars().all(|c| c.is_ascii_alphanumeric()) {
            violations.push(PasswordViolation::RequiresNonAlphanumeric);
        }
        if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            violations.push(PasswordViolation::RequiresDigit);
        }
        if self.require_lowercase && !password.chars().any(|c| c.is_ascii_lowercase()) {
            violations.push(PasswordViolation::RequiresLower);
        }
        if self.require_uppercase && !password.chars().any(|c| c.is_ascii_uppercase()) {
            violations.push(PasswordViolation::RequiresUpper);
        }
        if self.required_unique_chars >= 1
            && password.chars().collect::<HashSet<_>>().len() < self.required_unique_chars
        {
            violations.push(PasswordViolation::RequiresUniqueChars(
                self.required_unique_chars,
            ));
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relaxed_policy_does_not_require_digit() {
        assert!(PasswordPolicy::relaxed().validate("Books!").is_ok());
    }

    #[test]
    fn default_policy_requires_digit() {
        assert_eq!(
            PasswordPolicy::default().validate("Books!"),
            Err(vec![PasswordViolation::RequiresDigit])
        );
    }

    #[test]
    fn short_password_rejected() {
        let violations = PasswordPolicy::relaxed().validate("Bk!a").unwrap_err();
        assert_eq!(violations, vec![PasswordViolation::TooShort(6)]);
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        // 'é' is two bytes but one character
        let violations = PasswordPolicy::relaxed().validate("Aé!bc").unwrap_err();
        assert_eq!(violations, vec![PasswordViolation::TooShort(6)]);
    }

    #[test]
    fn all_class_violations_reported() {
        let violations = PasswordPolicy::relaxed().validate("123456").unwrap_err();
        assert_eq!(
            violations,
            vec![
                PasswordViolation::RequiresNonAlphanumeric,
                PasswordViolation::RequiresLower,
                PasswordViolation::RequiresUpper,
            ]
        );
    }

    #[test]
    fn non_ascii_letter_counts_as_non_alphanumeric() {
        assert!(PasswordPolicy::relaxed().validate("Abcdeé").is_ok());
    }

    #[test]
    fn unique_chars_enforced_when_configured() {
        let policy = PasswordPolicy {
            required_unique_chars: 4,
            ..PasswordPolicy::relaxed()
        };
        assert_eq!(
            policy.validate("Aa!Aa!Aa!"),
            Err(vec![PasswordViolation::RequiresUniqueChars(4)])
        );
    }

    #[test]
    fn violation_messages_are_readable() {
        assert_eq!(
            PasswordViolation::TooShort(6).to_string(),
            "Passwords must be at least 6 characters."
        );
    }
}

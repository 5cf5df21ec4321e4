// JWT token creation and verification
// Bearer tokens carry the user id, email and role names; signed with HS256

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::Error, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Signing key and lifetime for issued tokens
#[derive(Clone)]
pub struct JwtSettings {
    pub secret: String,
    pub expiry: Duration,
}

impl JwtSettings {
    pub fn new(secret: impl Into<String>, expiry: Duration) -> Self {
        Self {
            secret: secret.into(),
            expiry,
        }
    }
}

impl fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtSettings")
            .field("secret", &"<redacted>")
            .field("expiry", &self.expiry)
            .finish()
    }
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User ID (subject)
    pub sub: Uuid,
    pub email: String,
    #[serde(default)]
    pub roles: Vec<String>,
    /// Issued-at timestamp (seconds since epoch)
    pub iat: usize,
    /// Expiry timestamp (seconds since epoch)
    pub exp: usize,
}

/// Creates a signed token for a user
///
/// # Example
/// ```
/// use bookfinal_api::auth::jwt::{create_token, verify_token, JwtSettings};
/// use chrono::Duration;
/// use uuid::Uuid;
///
/// let settings = JwtSettings::new("your-secret-key", Duration::hours(8));
/// let user_id = Uuid::new_v4();
/// let token = create_token(user_id, "reader@example.com", &[], &settings).unwrap();
///
/// let claims = verify_token(&token, &settings).expect("valid token");
/// assert_eq!(claims.sub, user_id);
/// ```
pub fn create_token(
    user_id: Uuid,
    email: &str,
    roles: &[String],
    settings: &JwtSettings,
) -> Result<String, Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        roles: roles.to_vec(),
        iat: now.timestamp() as usize,
        exp: (now + settings.expiry).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(settings.secret.as_bytes()),
    )
}

/// Verifies the signature and expiry of a token and returns its claims
pub fn verify_token(token: &str, settings: &JwtSettings) -> Result<Claims, Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(settings.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> JwtSettings {
        JwtSettings::new("test-secret-key-for-unit-tests", Duration::hours(8))
    }

    #[test]
    fn create_and_verify_token() {
        let user_id = Uuid::new_v4();
        let roles = vec!["Admin".to_string()];
        let token = create_token(user_id, "admin@books.io", &roles, &settings()).unwrap();

        let claims = verify_token(&token, &settings()).expect("valid verification");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "admin@books.io");
        assert_eq!(claims.roles, roles);
    }

    #[test]
    fn wrong_secret_fails() {
        let token = create_token(Uuid::new_v4(), "a@b.io", &[], &settings()).unwrap();
        let other = JwtSettings::new("wrong-secret", Duration::hours(8));
        assert!(verify_token(&token, &other).is_err());
    }

    #[test]
    fn invalid_token_fails() {
        assert!(verify_token("invalid.token.string", &settings()).is_err());
    }

    #[test]
    fn expired_token_fails() {
        // Beyond the default 60 second leeway
        let expired = JwtSettings::new("test-secret-key-for-unit-tests", Duration::minutes(-5));
        let token = create_token(Uuid::new_v4(), "a@b.io", &[], &expired).unwrap();
        assert!(verify_token(&token, &settings()).is_err());
    }

    #[test]
    fn token_expiry_follows_settings() {
        let token = create_token(Uuid::new_v4(), "a@b.io", &[], &settings()).unwrap();
        let claims = verify_token(&token, &settings()).unwrap();

        let in_8_hours = (Utc::now() + Duration::hours(8)).timestamp();
        assert!(claims.exp as i64 > Utc::now().timestamp());
        assert!(claims.exp as i64 <= in_8_hours + 10);
        assert!(claims.iat <= claims.exp);
    }

    #[test]
    fn debug_output_hides_secret() {
        let rendered = format!("{:?}", settings());
        assert!(!rendered.contains("test-secret-key"));
    }
}

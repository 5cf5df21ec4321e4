use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::Mutex;

/// One-time passcodes keyed by an arbitrary subject (usually a normalized email)
#[async_trait]
pub trait OtpService: Send + Sync {
    /// Issues a fresh code for `key`, replacing any outstanding one
    async fn generate(&self, key: &str) -> String;

    /// Consumes the code for `key` if it matches and has not expired
    async fn validate(&self, key: &str, code: &str) -> bool;
}

struct IssuedCode {
    code: String,
    expires_at: DateTime<Utc>,
}

/// Process-local OTP store with 6-digit codes
pub struct InMemoryOtpService {
    codes: Mutex<HashMap<String, IssuedCode>>,
    ttl: Duration,
}

impl Default for InMemoryOtpService {
    fn default() -> Self {
        Self::new(Duration::minutes(5))
    }
}

impl InMemoryOtpService {
    pub fn new(ttl: Duration) -> Self {
        Self {
            codes: Mutex::new(HashMap::new()),
            ttl,
        }
    }
}

#[async_trait]
impl OtpService for InMemoryOtpService {
    async fn generate(&self, key: &str) -> String {
        let code = format!("{:06}", rand::thread_rng().gen_range(0..1_000_000));
        let now = Utc::now();

        let mut codes = self.codes.lock().await;
        codes.retain(|_, issued| issued.expires_at > now);
        codes.insert(
            key.to_string(),
            IssuedCode {
                code: code.clone(),
                expires_at: now + self.ttl,
            },
        );

        code
    }

    async fn validate(&self, key: &str, code: &str) -> bool {
        let mut codes = self.codes.lock().await;
        let valid = matches!(
            codes.get(key),
            Some(issued) if issued.code == code && issued.expires_at > Utc::now()
        );
        if valid {
            codes.remove(key);
        }
        valid
    }
}

/// Failure to hand a code to its delivery channel
#[derive(Debug, Error)]
pub enum OtpDeliveryError {
    #[error("no OTP delivery channel configured")]
    NotConfigured,

    #[error("OTP delivery failed: {0}")]
    Channel(String),
}

/// Delivers an issued code to the account holder
#[async_trait]
pub trait OtpSender: Send + Sync {
    async fn send(&self, recipient: &str, code: &str) -> Result<(), OtpDeliveryError>;
}

/// Development sender: writes the code to the log at debug level
pub struct LogOtpSender;

#[async_trait]
impl OtpSender for LogOtpSender {
    async fn send(&self, recipient: &str, code: &str) -> Result<(), OtpDeliveryError> {
        tracing::debug!(recipient, code, "email confirmation code");
        Ok(())
    }
}

/// Sender used when no delivery channel exists; never exposes the code
pub struct UnconfiguredOtpSender;

#[async_trait]
impl OtpSender for UnconfiguredOtpSender {
    async fn send(&self, _recipient: &str, _code: &str) -> Result<(), OtpDeliveryError> {
        Err(OtpDeliveryError::NotConfigured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn generated_code_is_six_digits() {
        let otp = InMemoryOtpService::default();
        let code = otp.generate("READER@BOOKS.IO").await;
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }

    #[tokio::test]
    async fn code_is_single_use() {
        let otp = InMemoryOtpService::default();
        let code = otp.generate("READER@BOOKS.IO").await;

        assert!(otp.validate("READER@BOOKS.IO", &code).await);
        assert!(!otp.validate("READER@BOOKS.IO", &code).await);
    }

    #[tokio::test]
    async fn code_is_bound_to_key() {
        let otp = InMemoryOtpService::default();
        let code = otp.generate("READER@BOOKS.IO").await;
        assert!(!otp.validate("OTHER@BOOKS.IO", &code).await);
    }

    #[tokio::test]
    async fn wrong_code_keeps_original_valid() {
        let otp = InMemoryOtpService::default();
        let code = otp.generate("READER@BOOKS.IO").await;
        let wrong = if code == "000000" { "000001" } else { "000000" };

        assert!(!otp.validate("READER@BOOKS.IO", wrong).await);
        assert!(otp.validate("READER@BOOKS.IO", &code).await);
    }

    #[tokio::test]
    async fn expired_code_rejected() {
        let otp = InMemoryOtpService::new(Duration::seconds(-1));
        let code = otp.generate("READER@BOOKS.IO").await;
        assert!(!otp.validate("READER@BOOKS.IO", &code).await);
    }

    #[tokio::test]
    async fn log_sender_accepts_code() {
        assert!(LogOtpSender.send("reader@books.io", "123456").await.is_ok());
    }

    #[tokio::test]
    async fn unconfigured_sender_reports_missing_channel() {
        let result = UnconfiguredOtpSender.send("reader@books.io", "123456").await;
        assert!(matches!(result, Err(OtpDeliveryError::NotConfigured)));
    }
}

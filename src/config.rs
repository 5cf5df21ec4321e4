//! Startup configuration.
//!
//! Values come from two places, read once at startup:
//!
//! - process environment variables (`main` seeds them from `.env` first)
//! - `appsettings.json`, overlaid by `appsettings.<Environment>.json`
//!
//! Environment variables always win over the settings files. Resolution is
//! written against a variable lookup closure so it can be exercised without
//! mutating the process environment.

use chrono::Duration;
use serde::Deserialize;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

use crate::auth::jwt::JwtSettings;
use crate::auth::password_policy::PasswordPolicy;

/// Name of the connection string, both as env var and settings entry
pub const CONNECTION_STRING_NAME: &str = "DefaultConnection";
pub const PORT_VAR: &str = "PORT";
pub const DEFAULT_PORT: u16 = 5000;
pub const HTTPS_PORT_VAR: &str = "HTTPS_PORT";
pub const ENVIRONMENT_VAR: &str = "APP_ENVIRONMENT";
pub const JWT_SECRET_VAR: &str = "JWT_SECRET";
pub const SEED_DATABASE_VAR: &str = "SEED_DATABASE";
/// Account granted the Admin role by seeding
pub const ADMIN_EMAIL_VAR: &str = "ADMIN_EMAIL";

const DEV_JWT_SECRET: &str = "dev-secret-key";
const DEFAULT_TOKEN_HOURS: i64 = 8;
/// One year
const MAX_TOKEN_HOURS: i64 = 24 * 365;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no connection string: set the DefaultConnection environment variable or ConnectionStrings.DefaultConnection in appsettings.json")]
    MissingConnectionString,

    #[error("invalid {var} value '{value}': expected a port number")]
    InvalidPort { var: &'static str, value: String },

    #[error("no JWT signing key: set JWT_SECRET or Jwt.Key outside Development")]
    MissingJwtSecret,

    #[error("invalid Jwt.ExpiryHours {0}: expected 1 to 8760 hours")]
    InvalidJwtExpiry(i64),

    #[error("failed to read {path}: {source}")]
    ReadSettings {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    ParseSettings {
        path: String,
        source: serde_json::Error,
    },
}

/// Runtime environment name (`Development`, `Staging`, `Production`, ...)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment(String);

impl Environment {
    pub const DEVELOPMENT: &'static str = "Development";
    pub const PRODUCTION: &'static str = "Production";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Reads the environment name, defaulting to Production
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        lookup(ENVIRONMENT_VAR)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(Self)
            .unwrap_or_else(|| Self::new(Self::PRODUCTION))
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn is_development(&self) -> bool {
        self.0.eq_ignore_ascii_case(Self::DEVELOPMENT)
    }
}

/// `Jwt` section of the settings files
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JwtSection {
    pub key: Option<String>,
    pub expiry_hours: Option<i64>,
}

/// Contents of the `appsettings*.json` files this service reads.
/// Unknown sections are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AppSettings {
    #[serde(default)]
    pub connection_strings: HashMap<String, String>,
    #[serde(default)]
    pub jwt: JwtSection,
}

impl AppSettings {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Loads `appsettings.json` then the environment-specific overlay from
    /// `dir`. Both files are optional; a present but malformed file is an error.
    pub fn load(dir: &Path, environment: &Environment) -> Result<Self, ConfigError> {
        let base = Self::load_file(&dir.join("appsettings.json"))?;
        let overlay = Self::load_file(&dir.join(format!("appsettings.{}.json", environment.name())))?;

        Ok(match (base, overlay) {
            (Some(base), Some(overlay)) => base.merge(overlay),
            (Some(settings), None) | (None, Some(settings)) => settings,
            (None, None) => Self::default(),
        })
    }

    fn load_file(path: &Path) -> Result<Option<Self>, ConfigError> {
        let shown = path.display().to_string();
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::ReadSettings {
                    path: shown,
                    source,
                })
            }
        };

        tracing::debug!(path = %shown, "loaded settings file");
        Self::from_json(&json)
            .map(Some)
            .map_err(|source| ConfigError::ParseSettings {
                path: shown,
                source,
            })
    }

    /// Values present in `overlay` replace those in `self`
    pub fn merge(mut self, overlay: Self) -> Self {
        self.connection_strings.extend(overlay.connection_strings);
        if overlay.jwt.key.is_some() {
            self.jwt.key = overlay.jwt.key;
        }
        if overlay.jwt.expiry_hours.is_some() {
            self.jwt.expiry_hours = overlay.jwt.expiry_hours;
        }
        self
    }

    pub fn connection_string(&self, name: &str) -> Option<&str> {
        self.connection_strings.get(name).map(String::as_str)
    }
}

/// Fully resolved startup configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub connection_string: String,
    pub port: u16,
    pub https_port: Option<u16>,
    pub jwt: JwtSettings,
    pub password_policy: PasswordPolicy,
    pub seed_on_startup: bool,
    pub admin_email: Option<String>,
}

impl AppConfig {
    /// Reads the settings files in the working directory and the process
    /// environment.
    pub fn load() -> Result<Self, ConfigError> {
        let lookup = |name: &str| std::env::var(name).ok();
        let environment = Environment::from_lookup(lookup);
        let settings = AppSettings::load(Path::new("."), &environment)?;

        Self::from_sources(lookup, &settings, environment)
    }

    pub fn from_sources(
        lookup: impl Fn(&str) -> Option<String>,
        settings: &AppSettings,
        environment: Environment,
    ) -> Result<Self, ConfigError> {
        let connection_string = resolve_connection_string(&lookup, settings)
            .ok_or(ConfigError::MissingConnectionString)?;
        let port = resolve_port(lookup(PORT_VAR).as_deref())?;
        let https_port = lookup(HTTPS_PORT_VAR)
            .map(|value| parse_port(HTTPS_PORT_VAR, &value))
            .transpose()?;
        let jwt = resolve_jwt(&lookup, settings, &environment)?;
        let seed_on_startup = lookup(SEED_DATABASE_VAR)
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        let admin_email = lookup(ADMIN_EMAIL_VAR)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        Ok(Self {
            environment,
            connection_string,
            port,
            https_port,
            jwt,
            password_policy: PasswordPolicy::relaxed(),
            seed_on_startup,
            admin_email,
        })
    }

    /// Listen on every interface at the resolved port
    pub fn bind_address(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

/// The environment variable is used verbatim when set; the settings entry otherwise
pub fn resolve_connection_string(
    lookup: impl Fn(&str) -> Option<String>,
    settings: &AppSettings,
) -> Option<String> {
    lookup(CONNECTION_STRING_NAME)
        .or_else(|| settings.connection_string(CONNECTION_STRING_NAME).map(str::to_string))
}

pub fn resolve_port(value: Option<&str>) -> Result<u16, ConfigError> {
    match value {
        Some(value) => parse_port(PORT_VAR, value),
        None => Ok(DEFAULT_PORT),
    }
}

fn parse_port(var: &'static str, value: &str) -> Result<u16, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidPort {
        var,
        value: value.to_string(),
    })
}

fn resolve_jwt(
    lookup: impl Fn(&str) -> Option<String>,
    settings: &AppSettings,
    environment: &Environment,
) -> Result<JwtSettings, ConfigError> {
    let secret = match lookup(JWT_SECRET_VAR).or_else(|| settings.jwt.key.clone()) {
        Some(secret) => secret,
        None if environment.is_development() => {
            tracing::warn!("{} not set, using development signing key", JWT_SECRET_VAR);
            DEV_JWT_SECRET.to_string()
        }
        None => return Err(ConfigError::MissingJwtSecret),
    };
    let hours = settings.jwt.expiry_hours.unwrap_or(DEFAULT_TOKEN_HOURS);
    if !(1..=MAX_TOKEN_HOURS).contains(&hours) {
        return Err(ConfigError::InvalidJwtExpiry(hours));
    }
    let expiry = Duration::try_hours(hours).ok_or(ConfigError::InvalidJwtExpiry(hours))?;

    Ok(JwtSettings::new(secret, expiry))
}

//! Shared fixtures for the integration tests
//!
//! In-memory repositories and a recording OTP sender let the full router
//! run without a database.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{body::Body, http::Response, Router};
use bookfinal_api::auth::jwt::{create_token, JwtSettings};
use bookfinal_api::auth::password::PasswordHasher;
use bookfinal_api::auth::password_policy::PasswordPolicy;
use bookfinal_api::auth::IdentityService;
use bookfinal_api::config::{AppConfig, AppSettings, Environment};
use bookfinal_api::domain::repositories::{RepositoryError, RoleRepository, UserRepository};
use bookfinal_api::domain::role::Role;
use bookfinal_api::domain::user::ApplicationUser;
use bookfinal_api::services::{
    InMemoryOtpService, OtpDeliveryError, OtpSender, UnconfiguredCloudinaryService,
};
use bookfinal_api::startup::build_router;
use bookfinal_api::state::AppState;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub const TEST_SECRET: &str = "integration-test-secret";

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<Uuid, ApplicationUser>>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &ApplicationUser) -> Result<(), RepositoryError> {
        let mut users = self.users.lock().unwrap();
        let normalized = user.normalized_email();
        if users.values().any(|u| u.normalized_email() == normalized) {
            return Err(RepositoryError::Duplicate(normalized));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ApplicationUser>, RepositoryError> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_normalized_email(
        &self,
        normalized_email: &str,
    ) -> Result<Option<ApplicationUser>, RepositoryError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.normalized_email() == normalized_email)
            .cloned())
    }

    async fn confirm_email(&self, user_id: Uuid) -> Result<(), RepositoryError> {
        match self.users.lock().unwrap().get_mut(&user_id) {
            Some(user) => {
                user.email_confirmed = true;
                Ok(())
            }
            None => Err(RepositoryError::NotFound(user_id.to_string())),
        }
    }
}

#[derive(Default)]
pub struct InMemoryRoleRepository {
    roles: Mutex<Vec<Role>>,
    memberships: Mutex<Vec<(Uuid, Uuid)>>,
}

#[async_trait]
impl RoleRepository for InMemoryRoleRepository {
    async fn create(&self, role: &Role) -> Result<(), RepositoryError> {
        let mut roles = self.roles.lock().unwrap();
        if roles.iter().any(|r| r.normalized_name() == role.normalized_name()) {
            return Err(RepositoryError::Duplicate(role.name.clone()));
        }
        roles.push(role.clone());
        Ok(())
    }

    async fn find_by_normalized_name(
        &self,
        normalized_name: &str,
    ) -> Result<Option<Role>, RepositoryError> {
        Ok(self
            .roles
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.normalized_name() == normalized_name)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<Role>, RepositoryError> {
        let mut roles = self.roles.lock().unwrap().clone();
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(roles)
    }

    async fn add_user_to_role(&self, user_id: Uuid, role_id: Uuid) -> Result<(), RepositoryError> {
        let mut memberships = self.memberships.lock().unwrap();
        if !memberships.contains(&(user_id, role_id)) {
            memberships.push((user_id, role_id));
        }
        Ok(())
    }

    async fn roles_for_user(&self, user_id: Uuid) -> Result<Vec<Role>, RepositoryError> {
        let memberships = self.memberships.lock().unwrap();
        let mut roles: Vec<Role> = self
            .roles
            .lock()
            .unwrap()
            .iter()
            .filter(|r| memberships.contains(&(user_id, r.id)))
            .cloned()
            .collect();
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(roles)
    }
}

/// Captures delivered codes so tests can read them back
#[derive(Default)]
pub struct RecordingOtpSender {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingOtpSender {
    /// Most recent code delivered to `recipient`
    pub fn last_code_for(&self, recipient: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(to, _)| to == recipient)
            .map(|(_, code)| code.clone())
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl OtpSender for RecordingOtpSender {
    async fn send(&self, recipient: &str, code: &str) -> Result<(), OtpDeliveryError> {
        self.sent
            .lock()
            .unwrap()
            .push((recipient.to_string(), code.to_string()));
        Ok(())
    }
}

pub fn identity_service() -> IdentityService {
    IdentityService::new(
        Arc::new(InMemoryUserRepository::default()),
        Arc::new(InMemoryRoleRepository::default()),
        PasswordPolicy::relaxed(),
        PasswordHasher::with_cost(4),
    )
}

pub fn test_config(environment: &str, https_port: Option<&str>) -> AppConfig {
    let https_port = https_port.map(str::to_string);
    let lookup = move |name: &str| match name {
        "DefaultConnection" => Some("postgres://unused".to_string()),
        "JWT_SECRET" => Some(TEST_SECRET.to_string()),
        "HTTPS_PORT" => https_port.clone(),
        _ => None,
    };

    AppConfig::from_sources(lookup, &AppSettings::default(), Environment::new(environment))
        .expect("test configuration")
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub outbox: Arc<RecordingOtpSender>,
}

impl TestApp {
    pub fn new(environment: &str, https_port: Option<&str>) -> Self {
        let config = test_config(environment, https_port);
        let outbox = Arc::new(RecordingOtpSender::default());
        let state = AppState::new(
            identity_service(),
            config.jwt.clone(),
            Arc::new(InMemoryOtpService::default()),
            outbox.clone(),
            Arc::new(UnconfiguredCloudinaryService),
        );
        let router = build_router(state.clone(), &config);

        Self {
            router,
            state,
            outbox,
        }
    }

    pub fn token_for(&self, user_id: Uuid, email: &str, roles: &[&str]) -> String {
        let roles: Vec<String> = roles.iter().map(|r| r.to_string()).collect();
        create_token(user_id, email, &roles, &self.state.jwt).unwrap()
    }

    pub fn jwt(&self) -> &JwtSettings {
        &self.state.jwt
    }
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

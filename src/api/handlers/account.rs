use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::docs::ErrorBody;
use crate::api::errors::ApiError;
use crate::api::middleware::AuthenticatedUser;
use crate::auth::jwt::create_token;
use crate::auth::IdentityError;
use crate::domain::user::ApplicationUser;
use crate::state::AppState;

/// Request body for user registration
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

/// Response from successful registration
#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub message: String,
}

/// Request body for user login
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response from successful login
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// Request body for email confirmation
#[derive(Debug, Deserialize, ToSchema)]
pub struct ConfirmEmailRequest {
    pub email: String,
    pub code: String,
}

/// Public view of an account; never exposes the password hash
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub email_confirmed: bool,
    pub roles: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&ApplicationUser> for UserResponse {
    fn from(user: &ApplicationUser) -> Self {
        Self {
            id: user.id,
            email: user.email.to_string(),
            full_name: user.full_name.clone(),
            email_confirmed: user.email_confirmed,
            roles: Vec::new(),
            created_at: user.created_at,
        }
    }
}

impl UserResponse {
    pub fn with_roles(mut self, roles: Vec<String>) -> Self {
        self.roles = roles;
        self
    }
}

/// Register a new user
///
/// POST /api/account/register
#[utoipa::path(
    post,
    path = "/api/account/register",
    tag = "account",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered; email confirmation pending", body = RegisterResponse),
        (status = 400, description = "Invalid email or password rejected by policy", body = ErrorBody),
        (status = 409, description = "Email already registered", body = ErrorBody)
    ),
    security(())
)]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let user = state
        .identity
        .register(&req.email, &req.password, &req.full_name)
        .await?;

    // Delivery failure leaves the account in place; the code can be reissued
    send_confirmation_code(&state, &user).await;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id: user.id,
            message: "User registered successfully".to_string(),
        }),
    ))
}

/// Login with email and password
///
/// POST /api/account/login
#[utoipa::path(
    post,
    path = "/api/account/login",
    tag = "account",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Bearer token issued", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorBody)
    ),
    security(())
)]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = state.identity.check_password(&req.email, &req.password).await?;
    let roles = state.identity.role_names(user.id).await?;

    let expires_at = Utc::now() + state.jwt.expiry;
    let token = create_token(user.id, user.email.as_str(), &roles, &state.jwt).map_err(|e| {
        tracing::error!(error = %e, "failed to sign token");
        ApiError::internal_server_error("Failed to create token")
    })?;

    tracing::info!(user_id = %user.id, "user logged in");
    Ok(Json(LoginResponse {
        token,
        user_id: user.id,
        expires_at,
    }))
}

/// Confirm an email address with the code issued at registration
///
/// POST /api/account/confirm-email
#[utoipa::path(
    post,
    path = "/api/account/confirm-email",
    tag = "account",
    request_body = ConfirmEmailRequest,
    responses(
        (status = 204, description = "Email confirmed"),
        (status = 400, description = "Unknown email or invalid code", body = ErrorBody)
    ),
    security(())
)]
pub async fn confirm_email(
    State(state): State<AppState>,
    Json(req): Json<ConfirmEmailRequest>,
) -> Result<StatusCode, ApiError> {
    let invalid = || ApiError::bad_request("Invalid confirmation code");

    let user = state
        .identity
        .find_by_email(&req.email)
        .await?
        .ok_or_else(invalid)?;

    if !state
        .otp
        .validate(&user.normalized_email(), req.code.trim())
        .await
    {
        return Err(invalid());
    }

    state.identity.confirm_email(user.id).await?;
    tracing::info!(user_id = %user.id, "email confirmed");

    Ok(StatusCode::NO_CONTENT)
}

/// Request body for reissuing a confirmation code
#[derive(Debug, Deserialize, ToSchema)]
pub struct ResendConfirmationRequest {
    pub email: String,
}

/// Issue a fresh email confirmation code
///
/// Always answers 202 so the endpoint does not reveal which emails are registered.
///
/// POST /api/account/resend-confirmation
#[utoipa::path(
    post,
    path = "/api/account/resend-confirmation",
    tag = "account",
    request_body = ResendConfirmationRequest,
    responses((status = 202, description = "Code sent when the account is awaiting confirmation")),
    security(())
)]
pub async fn resend_confirmation(
    State(state): State<AppState>,
    Json(req): Json<ResendConfirmationRequest>,
) -> Result<StatusCode, ApiError> {
    let user = match state.identity.find_by_email(&req.email).await {
        Ok(Some(user)) if !user.email_confirmed => user,
        Ok(_) | Err(IdentityError::InvalidEmail(_)) => return Ok(StatusCode::ACCEPTED),
        Err(e) => return Err(e.into()),
    };

    send_confirmation_code(&state, &user).await;
    Ok(StatusCode::ACCEPTED)
}

/// Issues a code for the account and hands it to the delivery channel
async fn send_confirmation_code(state: &AppState, user: &ApplicationUser) {
    let code = state.otp.generate(&user.normalized_email()).await;
    match state.otp_sender.send(user.email.as_str(), &code).await {
        Ok(()) => tracing::info!(user_id = %user.id, "email confirmation code sent"),
        Err(e) => tracing::warn!(user_id = %user.id, error = %e, "email confirmation code not delivered"),
    }
}

/// The authenticated user's account
///
/// GET /api/account/me
#[utoipa::path(
    get,
    path = "/api/account/me",
    tag = "account",
    responses(
        (status = 200, description = "Current account", body = UserResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorBody)
    )
)]
pub async fn me(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<UserResponse>, ApiError> {
    let account = state.identity.find_by_id(user.id).await?;
    let roles = state.identity.role_names(account.id).await?;

    Ok(Json(UserResponse::from(&account).with_roles(roles)))
}

//! Composition root: builds the services, the router and the listener.

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::api::docs;
use crate::api::handlers::{account, health, media, roles};
use crate::api::middleware::{
    authenticate, redirect_to_https, require_admin, require_authenticated, HttpsRedirect,
};
use crate::auth::password::PasswordHasher;
use crate::auth::{IdentityError, IdentityService};
use crate::config::{AppConfig, ConfigError};
use crate::infrastructure::repositories::{PostgresRoleRepository, PostgresUserRepository};
use crate::infrastructure::{database, seed};
use crate::services::{
    InMemoryOtpService, LogOtpSender, OtpSender, UnconfiguredCloudinaryService,
    UnconfiguredOtpSender,
};
use crate::state::AppState;

/// Any failure that prevents the server from starting or keeps it from serving
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("database unavailable: {0}")]
    Database(#[source] sqlx::Error),

    #[error("database migration failed: {0}")]
    Migrate(#[source] sqlx::migrate::MigrateError),

    #[error("database seeding failed: {0}")]
    Seed(#[source] IdentityError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Assembles routes and the request pipeline.
///
/// Every controller request passes, in order, through HTTPS redirection,
/// authentication and the route's authorization stage before its handler.
/// Documentation routes sit outside that pipeline and exist only in
/// Development.
pub fn build_router(state: AppState, config: &AppConfig) -> Router {
    let anonymous = Router::new()
        .route("/health", get(health::health_check))
        .route("/api/account/register", post(account::register))
        .route("/api/account/login", post(account::login))
        .route("/api/account/confirm-email", post(account::confirm_email))
        .route(
            "/api/account/resend-confirmation",
            post(account::resend_confirmation),
        );

    let authenticated = Router::new()
        .route("/api/account/me", get(account::me))
        .route("/api/media/images", post(media::upload_image))
        .route_layer(from_fn(require_authenticated));

    let admin = Router::new()
        .route("/api/roles", get(roles::list_roles))
        .route("/api/roles/:name/members", post(roles::grant_role))
        .route_layer(from_fn(require_admin));

    // The last layer added is the outermost
    let controllers = Router::new()
        .merge(anonymous)
        .merge(authenticated)
        .merge(admin)
        .layer(from_fn_with_state(state.jwt.clone(), authenticate))
        .layer(from_fn_with_state(
            HttpsRedirect::new(config.https_port),
            redirect_to_https,
        ));

    let mut app = Router::new();
    if config.environment.is_development() {
        app = app.merge(docs::swagger_ui());
    }

    app.merge(controllers)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// A bound, ready-to-serve application
pub struct Application {
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Connects persistence, wires services, optionally seeds, and binds the listener
    pub async fn build(config: AppConfig) -> Result<Self, BootstrapError> {
        tracing::info!(environment = config.environment.name(), "starting BookFinalAPI");

        let pool = database::connect(&config.connection_string)
            .await
            .map_err(BootstrapError::Database)?;
        database::migrate(&pool)
            .await
            .map_err(BootstrapError::Migrate)?;

        let identity = IdentityService::new(
            Arc::new(PostgresUserRepository::new(pool.clone())),
            Arc::new(PostgresRoleRepository::new(pool)),
            config.password_policy.clone(),
            PasswordHasher::default(),
        );
        let otp_sender: Arc<dyn OtpSender> = if config.environment.is_development() {
            Arc::new(LogOtpSender)
        } else {
            tracing::warn!("no OTP delivery channel configured, confirmation codes are not sent");
            Arc::new(UnconfiguredOtpSender)
        };
        let state = AppState::new(
            identity,
            config.jwt.clone(),
            Arc::new(InMemoryOtpService::default()),
            otp_sender,
            Arc::new(UnconfiguredCloudinaryService),
        );

        if config.seed_on_startup {
            seed::seed_roles(&state.identity)
                .await
                .map_err(BootstrapError::Seed)?;
            if let Some(email) = &config.admin_email {
                seed::grant_admin(&state.identity, email)
                    .await
                    .map_err(BootstrapError::Seed)?;
            }
        }

        if config.https_port.is_none() {
            tracing::warn!("HTTPS_PORT not set, HTTPS redirection disabled");
        }
        if config.environment.is_development() {
            tracing::info!(path = docs::SWAGGER_UI_PATH, "Swagger UI enabled");
        }

        let router = build_router(state, &config);

        let addr = config.bind_address();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| BootstrapError::Bind { addr, source })?;

        Ok(Self { listener, router })
    }

    /// Address actually bound, which differs from the configured one for port 0
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serves until Ctrl-C / SIGTERM
    pub async fn run(self) -> Result<(), BootstrapError> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(BootstrapError::Serve)
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}

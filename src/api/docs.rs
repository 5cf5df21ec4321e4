//! OpenAPI documentation.
//!
//! [`ApiDoc`] collects every controller route and advertises a global HTTP
//! Bearer (JWT) security requirement. The Swagger UI built by
//! [`swagger_ui`] is mounted only in the Development environment.

use serde::Serialize;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::handlers::{account, roles};
use crate::services::UploadedImage;

pub const SWAGGER_UI_PATH: &str = "/swagger";
pub const OPENAPI_JSON_PATH: &str = "/api-docs/v1/openapi.json";

/// Name under which the bearer scheme is registered
pub const BEARER_SCHEME: &str = "Bearer";

/// Error payload returned by every failing endpoint
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Enter 'Bearer' [space] and your valid JWT token."))
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(title = "BookFinalAPI", version = "v1"),
    modifiers(&SecurityAddon),
    security(("Bearer" = [])),
    paths(
        crate::api::handlers::health::health_check,
        crate::api::handlers::account::register,
        crate::api::handlers::account::login,
        crate::api::handlers::account::confirm_email,
        crate::api::handlers::account::resend_confirmation,
        crate::api::handlers::account::me,
        crate::api::handlers::media::upload_image,
        crate::api::handlers::roles::list_roles,
        crate::api::handlers::roles::grant_role,
    ),
    components(schemas(
        ErrorBody,
        account::RegisterRequest,
        account::RegisterResponse,
        account::LoginRequest,
        account::LoginResponse,
        account::ConfirmEmailRequest,
        account::ResendConfirmationRequest,
        account::UserResponse,
        roles::RoleResponse,
        roles::GrantRoleRequest,
        UploadedImage,
    )),
    tags(
        (name = "account", description = "Registration, login and the current account"),
        (name = "media", description = "Image uploads"),
        (name = "roles", description = "Role administration"),
        (name = "health", description = "Liveness probe")
    )
)]
pub struct ApiDoc;

/// Swagger UI plus the JSON document it renders
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new(SWAGGER_UI_PATH).url(OPENAPI_JSON_PATH, ApiDoc::openapi())
}

// Authentication and authorization pipeline stages
//
// `authenticate` runs on every API request and attaches the bearer token's
// principal when the token verifies. The `require_*` stages are route layers
// that reject requests lacking a principal (401) or a role (403) before the
// handler runs.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::auth::jwt::{verify_token, JwtSettings};
use crate::domain::role;

/// Principal established by a verified bearer token
///
/// Also usable as an extractor in handlers behind `require_authenticated`:
/// ```rust,ignore
/// async fn protected_handler(user: AuthenticatedUser) -> Result<String, ApiError> {
///     Ok(format!("Hello user {}", user.id))
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub email: String,
    pub roles: Vec<String>,
}

impl AuthenticatedUser {
    pub fn is_in_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r.eq_ignore_ascii_case(role))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

/// Extracts the token from `Authorization: Bearer <token>`; the scheme is case-insensitive
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("Bearer") && !token.is_empty()).then_some(token)
}

/// Authentication stage: never rejects, only attaches a principal
pub async fn authenticate(
    State(jwt): State<JwtSettings>,
    mut request: Request,
    next: Next,
) -> Response {
    let principal = bearer_token(request.headers()).and_then(|token| {
        verify_token(token, &jwt)
            .map_err(|e| {
                tracing::debug!(error = %e, "rejected bearer token");
            })
            .ok()
    });

    if let Some(claims) = principal {
        request.extensions_mut().insert(AuthenticatedUser {
            id: claims.sub,
            email: claims.email,
            roles: claims.roles,
        });
    }

    next.run(request).await
}

/// Authorization stage: any authenticated user
pub async fn require_authenticated(request: Request, next: Next) -> Result<Response, ApiError> {
    if request.extensions().get::<AuthenticatedUser>().is_none() {
        return Err(ApiError::unauthorized("Missing or invalid bearer token"));
    }
    Ok(next.run(request).await)
}

/// Authorization stage: authenticated users holding the Admin role
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    match request.extensions().get::<AuthenticatedUser>() {
        None => Err(ApiError::unauthorized("Missing or invalid bearer token")),
        Some(user) if !user.is_in_role(role::ADMIN) => {
            tracing::info!(user_id = %user.id, "admin route denied");
            Err(ApiError::forbidden("Admin role required"))
        }
        Some(_) => Ok(next.run(request).await),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::create_token;
    use axum::{
        body::Body,
        http::{HeaderValue, Request as HttpRequest, StatusCode},
        middleware::{from_fn, from_fn_with_state},
        routing::get,
        Router,
    };
    use chrono::Duration;
    use tower::util::ServiceExt;

    fn jwt() -> JwtSettings {
        JwtSettings::new("middleware-test-secret", Duration::hours(1))
    }

    async fn whoami(user: AuthenticatedUser) -> String {
        user.email
    }

    fn app() -> Router {
        let protected = Router::new()
            .route("/me", get(whoami))
            .route_layer(from_fn(require_authenticated));
        let admin = Router::new()
            .route("/admin", get(|| async { "admin area" }))
            .route_layer(from_fn(require_admin));

        Router::new()
            .route("/public", get(|| async { "public" }))
            .merge(protected)
            .merge(admin)
            .layer(from_fn_with_state(jwt(), authenticate))
    }

    fn token(roles: &[&str]) -> String {
        let roles: Vec<String> = roles.iter().map(|r| r.to_string()).collect();
        create_token(Uuid::new_v4(), "reader@books.io", &roles, &jwt()).unwrap()
    }

    async fn get_with(uri: &str, authorization: Option<String>) -> StatusCode {
        let mut request = HttpRequest::builder().uri(uri);
        if let Some(value) = authorization {
            request = request.header(AUTHORIZATION, value);
        }
        app()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[test]
    fn bearer_scheme_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }

    #[tokio::test]
    async fn public_route_ignores_bad_token() {
        let status = get_with("/public", Some("Bearer garbage".into())).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn protected_route_requires_token() {
        assert_eq!(get_with("/me", None).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn protected_route_rejects_invalid_token() {
        let status = get_with("/me", Some("Bearer not.a.jwt".into())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn protected_route_accepts_valid_token() {
        let status = get_with("/me", Some(format!("Bearer {}", token(&[])))).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn admin_route_forbids_non_admin() {
        let status = get_with("/admin", Some(format!("Bearer {}", token(&["User"])))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn admin_route_allows_admin() {
        let status = get_with("/admin", Some(format!("Bearer {}", token(&["Admin"])))).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn admin_route_requires_token() {
        assert_eq!(get_with("/admin", None).await, StatusCode::UNAUTHORIZED);
    }
}

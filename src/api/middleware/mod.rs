// Request pipeline stages, in the order requests pass through them:
// HTTPS redirection, authentication, authorization

pub mod auth;
pub mod https;

pub use auth::{authenticate, require_admin, require_authenticated, AuthenticatedUser};
pub use https::{redirect_to_https, HttpsRedirect};

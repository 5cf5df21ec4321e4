// Identity subsystem: password hashing and policy, bearer tokens, user/role management

pub mod identity;
pub mod jwt;
pub mod password;
pub mod password_policy;

pub use identity::{IdentityError, IdentityService};

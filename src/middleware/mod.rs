pub mod auth;
pub mod role;

pub use auth::require_auth;
pub use role::{require_roles, AllowedRoles};

mod auth;
mod error_handler;

pub use auth::{AuthError, AuthGate, AuthUser, auth_middleware, bearer_token};
pub use error_handler::log_errors;

// Core modules
pub mod api;
pub mod auth;
pub mod db;
pub mod types;

// Re-export key types and functions
pub use api::{AppState, create_router};
pub use auth::{
    AuthConfig, AuthError, Decision, DenialReason, PasswordHasher, Requirement, Role,
    SessionAuthenticator, SessionClaims, TokenCodec,
};
pub use db::{DatabaseConfig, UserStore, create_connection, ensure_schema};

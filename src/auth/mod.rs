//! Session authentication and authorization core.
//!
//! This module is the single source of truth for "who is this request, and
//! what may they touch". It is deliberately small and layered:
//!
//! - **password** — argon2id hashing and constant-time verification
//! - **token** — signed, time-bounded session tokens (HS256 JWTs)
//! - **session** — login, per-request identity resolution, explicit refresh
//! - **guard** — declarative role/department requirements over claims
//!
//! ## Security model
//!
//! - Tokens are self-contained and stateless; expiry is the only
//!   invalidation mechanism
//! - Signature verification always precedes claim inspection
//! - Login failures never reveal whether an account exists
//! - Claims are a snapshot at issuance; role/department changes apply on the
//!   next login or refresh

pub mod guard;
pub mod password;
pub mod session;
pub mod token;

pub use guard::{Decision, DenialReason, Requirement, Role};
pub use password::PasswordHasher;
pub use session::{
    AuthConfig, AuthError, Credential, CredentialStore, IssuedToken, SessionAuthenticator,
};
pub use token::{DecodeError, SessionClaims, TokenCodec};

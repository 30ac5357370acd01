//! Session authentication: login, per-request identity resolution, refresh.
//!
//! The authenticator is the single source of truth for "who is this request".
//! It owns the password hasher and the token codec, and consumes a narrow
//! read-only view of the credential store. `login` is the only operation
//! touching the store on the hot path; `authenticate` is pure token
//! verification with no database lookup, so a protected request costs one
//! signature check.

use crate::auth::guard::Role;
use crate::auth::password::{DEFAULT_TIME_COST, PasswordHasher};
use crate::auth::token::{DecodeError, SessionClaims, TokenCodec};
use crate::types::DepartmentSlug;
use anyhow::Result;
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Authentication configuration, built once at startup and immutable after.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HS256 signing secret shared by all issued tokens.
    pub signing_secret: String,
    /// Lifetime of issued tokens.
    pub token_ttl: Duration,
    /// Argon2 iteration count for password hashing.
    pub hash_time_cost: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            signing_secret: "change-me-in-env".to_string(),
            token_ttl: Duration::from_secs(60 * 60),
            hash_time_cost: DEFAULT_TIME_COST,
        }
    }
}

/// Read-only view of a stored account, as the auth core sees it.
///
/// Owned by the credential store; the core never writes it back.
#[derive(Debug, Clone)]
pub struct Credential {
    /// Record id string; becomes the `sub` claim of issued tokens.
    pub id: String,
    /// Login identifier (normalized email).
    pub identifier: String,
    /// Stored PHC hash. Accounts created without a password cannot log in.
    pub password_hash: Option<String>,
    pub role: Role,
    pub department: Option<DepartmentSlug>,
    pub active: bool,
}

/// Narrow read interface onto wherever credentials live.
///
/// The only suspension points in the auth core are these lookups; everything
/// else is synchronous and CPU-only.
pub trait CredentialStore {
    /// Look up a credential by login identifier (email).
    fn find_credential(
        &self,
        identifier: &str,
    ) -> impl Future<Output = Result<Option<Credential>>> + Send;

    /// Look up a credential by record id (the `sub` claim).
    fn find_credential_by_id(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<Credential>>> + Send;
}

/// Authentication errors.
///
/// "Unknown identifier", "wrong password", "account disabled" and "account
/// has no password" all surface as `InvalidCredentials` so callers cannot
/// enumerate accounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Login failed; deliberately does not say why.
    InvalidCredentials,
    /// The presented token's signature verifies but its window has passed.
    Expired,
    /// The presented token is malformed, tampered with, or otherwise
    /// untrusted.
    InvalidToken,
    /// Store or codec plumbing failure; not a caller mistake.
    Internal(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "invalid credentials"),
            Self::Expired => write!(f, "session has expired"),
            Self::InvalidToken => write!(f, "invalid token"),
            Self::Internal(msg) => write!(f, "internal auth error: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A freshly signed token together with the claims inside it.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: SessionClaims,
}

/// Orchestrates credential checks and token issuance/verification.
pub struct SessionAuthenticator<S> {
    store: S,
    hasher: PasswordHasher,
    codec: TokenCodec,
    token_ttl: Duration,
    /// Verified against when a login has no real hash to check, so every
    /// failed login costs one full argon2 verification.
    dummy_hash: String,
}

impl<S: CredentialStore> SessionAuthenticator<S> {
    pub fn new(config: &AuthConfig, store: S) -> Self {
        let hasher = PasswordHasher::with_time_cost(config.hash_time_cost);
        let dummy_hash = hasher
            .hash("session-authenticator-dummy")
            .unwrap_or_default();
        Self {
            store,
            hasher,
            codec: TokenCodec::new(&config.signing_secret),
            token_ttl: config.token_ttl,
            dummy_hash,
        }
    }

    /// The password hasher, shared so account-creation paths hash the same
    /// way login verifies.
    pub fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }

    /// Verify a credential pair and issue a session token.
    ///
    /// The claims snapshot the credential's current role and department;
    /// later changes to the account take effect on the next login or
    /// refresh, not mid-session.
    pub async fn login(&self, identifier: &str, password: &str) -> Result<IssuedToken, AuthError> {
        let identifier = normalize_identifier(identifier);

        let credential = self
            .store
            .find_credential(&identifier)
            .await
            .map_err(AuthError::from)?;

        // Pick the hash to verify. An unknown identifier, a disabled
        // account, and an account without a password all still go through a
        // full verification against the dummy hash: the failure must take as
        // long as a password mismatch does.
        let (stored_hash, eligible) = match &credential {
            Some(c) if !c.active => {
                debug!("login rejected: account disabled");
                (self.dummy_hash.clone(), false)
            }
            Some(c) => match c.password_hash.clone() {
                Some(hash) => (hash, true),
                None => {
                    debug!("login rejected: account has no password set");
                    (self.dummy_hash.clone(), false)
                }
            },
            None => {
                debug!("login rejected: unknown identifier");
                (self.dummy_hash.clone(), false)
            }
        };

        // Argon2 verification is deliberately slow; keep it off the async
        // worker threads.
        let hasher = self.hasher.clone();
        let password = password.to_string();
        let verified = tokio::task::spawn_blocking(move || hasher.verify(&password, &stored_hash))
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        if !verified || !eligible {
            if eligible {
                debug!("login rejected: password mismatch");
            }
            return Err(AuthError::InvalidCredentials);
        }

        let credential = credential.ok_or(AuthError::InvalidCredentials)?;
        debug!(subject = %credential.id, "login verified, issuing token");
        self.issue_for(&credential)
    }

    /// Resolve a bearer token to verified claims.
    ///
    /// Stateless by design: no store lookup happens here, so a credential
    /// disabled mid-session stays valid until its token expires.
    pub fn authenticate(&self, token: &str) -> Result<SessionClaims, AuthError> {
        self.codec.decode(token).map_err(|e| match e {
            DecodeError::Expired => AuthError::Expired,
            DecodeError::BadSignature | DecodeError::Malformed => AuthError::InvalidToken,
        })
    }

    /// Explicitly re-issue a token before it expires.
    ///
    /// Unlike `authenticate` this does consult the store: the account must
    /// still exist and be active, and the new claims re-snapshot its current
    /// role and department. A disabled account can ride out its current
    /// token but cannot extend it.
    pub async fn refresh(&self, token: &str) -> Result<IssuedToken, AuthError> {
        let claims = self.authenticate(token)?;

        let credential = self
            .store
            .find_credential_by_id(&claims.sub)
            .await
            .map_err(AuthError::from)?;

        match credential {
            Some(credential) if credential.active => {
                debug!(subject = %credential.id, "refreshing session");
                self.issue_for(&credential)
            }
            _ => {
                debug!("refresh rejected: account missing or disabled");
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    fn issue_for(&self, credential: &Credential) -> Result<IssuedToken, AuthError> {
        let claims = SessionClaims::issue(
            credential.id.clone(),
            credential.role,
            credential.department.clone(),
            self.token_ttl,
        );
        let token = self.codec.encode(&claims).map_err(AuthError::from)?;
        Ok(IssuedToken { token, claims })
    }
}

/// Login identifiers are compared case-insensitively and ignore surrounding
/// whitespace.
fn normalize_identifier(identifier: &str) -> String {
    identifier.trim().to_lowercase()
}

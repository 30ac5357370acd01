//! Signed session token codec.
//!
//! Tokens are compact JWTs signed with a process-local HS256 secret. They are
//! the only session state in the system: every claim a request needs is
//! embedded at issuance and verified on every decode. The codec is stateless
//! and deterministic given the same signing secret.

use crate::auth::guard::Role;
use crate::types::{DepartmentSlug, TokenId};
use anyhow::{Context, Result};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Identity and authorization facts embedded in a session token.
///
/// Role and department are a snapshot taken at issuance; they do not track
/// later changes to the account until the next login or refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: the user's record id string.
    pub sub: String,
    /// Role snapshot at issuance.
    pub role: Role,
    /// Department snapshot at issuance, if the user belongs to one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dept: Option<DepartmentSlug>,
    /// Unique id of this token.
    pub jti: TokenId,
    /// Issued-at, seconds since the Unix epoch.
    pub iat: u64,
    /// Expiry, seconds since the Unix epoch.
    pub exp: u64,
}

impl SessionClaims {
    /// Build claims for a fresh token: `iat = now`, `exp = now + ttl`,
    /// with a newly generated `jti`.
    pub fn issue(
        sub: impl Into<String>,
        role: Role,
        dept: Option<DepartmentSlug>,
        ttl: Duration,
    ) -> Self {
        let now = unix_now();
        Self {
            sub: sub.into(),
            role,
            dept,
            jti: TokenId::new(uuid::Uuid::new_v4().to_string()),
            iat: now,
            exp: now + ttl.as_secs(),
        }
    }

    /// Seconds until this token expires, saturating at zero.
    pub fn seconds_remaining(&self) -> u64 {
        self.exp.saturating_sub(unix_now())
    }
}

/// Current time as seconds since the Unix epoch.
pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Why a token failed to decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The signature does not verify against the current secret.
    BadSignature,
    /// The token is structurally invalid (not a JWT, bad base64, bad JSON,
    /// wrong algorithm, missing claims).
    Malformed,
    /// The signature verifies but `exp` is in the past.
    Expired,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadSignature => write!(f, "token signature verification failed"),
            Self::Malformed => write!(f, "token is malformed"),
            Self::Expired => write!(f, "token has expired"),
        }
    }
}

impl std::error::Error for DecodeError {}

/// Encoder/decoder for session tokens.
///
/// Holds only derived key material; construct once at startup from the
/// configured signing secret and share freely (no interior mutability).
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    /// Create a codec from the shared signing secret.
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry must be exact; the default 60s leeway would keep expired
        // tokens alive past their window.
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Serialize and sign the given claims.
    pub fn encode(&self, claims: &SessionClaims) -> Result<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .context("failed to sign session token")
    }

    /// Verify and deserialize a token.
    ///
    /// The signature is verified before any claim is trusted; expiry is
    /// checked only on a token whose signature already verified.
    pub fn decode(&self, token: &str) -> Result<SessionClaims, DecodeError> {
        decode::<SessionClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => DecodeError::Expired,
                ErrorKind::InvalidSignature => DecodeError::BadSignature,
                _ => DecodeError::Malformed,
            })
    }
}

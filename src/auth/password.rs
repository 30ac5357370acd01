//! Password hashing and verification.
//!
//! Argon2id with a fresh random salt per hash, serialized as PHC strings so
//! the parameters travel with the hash. Verification goes through the argon2
//! verifier, which does not leak the mismatch position through timing.

use anyhow::{Result, anyhow};
use argon2::password_hash::{
    PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString, rand_core::OsRng,
};
use argon2::{Algorithm, Argon2, Params, Version};

/// Default Argon2 iteration count; raise via configuration for stricter
/// deployments.
pub const DEFAULT_TIME_COST: u32 = 2;

const MEMORY_COST_KIB: u32 = 19 * 1024;
const PARALLELISM: u32 = 1;

/// One-way hasher for account passwords.
///
/// Pure over its inputs; hashing is CPU-bound and deliberately slow, so
/// callers on an async runtime should push it onto a blocking thread.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// Hasher with the default work factor.
    pub fn new() -> Self {
        Self::with_time_cost(DEFAULT_TIME_COST)
    }

    /// Hasher with a tuned iteration count (work factor).
    pub fn with_time_cost(time_cost: u32) -> Self {
        let params = Params::new(MEMORY_COST_KIB, time_cost.max(1), PARALLELISM, None)
            .unwrap_or_else(|_| Params::default());
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }

    /// Hash a plaintext password into a PHC string with a random salt.
    ///
    /// Two calls with the same input produce different strings.
    pub fn hash(&self, plaintext: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let phc = self
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| anyhow!("password hashing failed: {}", e))?;
        Ok(phc.to_string())
    }

    /// Verify a plaintext password against a stored PHC string.
    ///
    /// Malformed stored hashes verify as false rather than erroring; a
    /// corrupt credential record must behave like a wrong password.
    pub fn verify(&self, plaintext: &str, stored: &str) -> bool {
        match PasswordHash::new(stored) {
            Ok(parsed) => self
                .argon2
                .verify_password(plaintext.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        // Minimum work factor keeps the test suite fast.
        PasswordHasher::with_time_cost(1)
    }

    #[test]
    fn test_hash_then_verify() {
        let h = hasher();
        let phc = h.hash("correct horse battery staple").unwrap();
        assert!(h.verify("correct horse battery staple", &phc));
    }

    #[test]
    fn test_wrong_password_fails() {
        let h = hasher();
        let phc = h.hash("right").unwrap();
        assert!(!h.verify("wrong", &phc));
    }

    #[test]
    fn test_salting_makes_hashes_differ() {
        let h = hasher();
        let a = h.hash("same input").unwrap();
        let b = h.hash("same input").unwrap();
        assert_ne!(a, b);
        assert!(h.verify("same input", &a));
        assert!(h.verify("same input", &b));
    }

    #[test]
    fn test_phc_format() {
        let h = hasher();
        let phc = h.hash("whatever").unwrap();
        assert!(phc.starts_with("$argon2id$"));
    }

    #[test]
    fn test_malformed_hash_verifies_false() {
        let h = hasher();
        assert!(!h.verify("anything", ""));
        assert!(!h.verify("anything", "not-a-phc-string"));
        assert!(!h.verify("anything", "$argon2id$garbage"));
    }

    #[test]
    fn test_empty_password_round_trip() {
        let h = hasher();
        let phc = h.hash("").unwrap();
        assert!(h.verify("", &phc));
        assert!(!h.verify("nonempty", &phc));
    }

    #[test]
    fn test_unicode_password_round_trip() {
        let h = hasher();
        let phc = h.hash("sénha-çom-acentõs-🔒").unwrap();
        assert!(h.verify("sénha-çom-acentõs-🔒", &phc));
    }
}

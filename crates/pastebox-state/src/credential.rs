//! Deletion-secret hashing and verification.

use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use pastebox_core::{CredentialConfig, MIN_SECRET_CHARS};
use rand::RngCore;

use crate::error::{PasteError, PasteResult};

const SALT_LEN: usize = 16;

/// Turns deletion secrets into storable digests and checks them later.
pub trait CredentialGuard: Send + Sync {
    /// Hash `secret` with a fresh salt. Rejects missing or short secrets.
    fn hash(&self, secret: &str) -> PasteResult<String>;

    /// Check `secret` against a digest produced by [`hash`](Self::hash).
    ///
    /// A wrong secret yields `Ok(false)`; only an unusable digest is an error.
    fn verify(&self, secret: &str, digest: &str) -> PasteResult<bool>;
}

/// Reject secrets that are empty or shorter than [`MIN_SECRET_CHARS`].
pub fn check_secret(secret: &str) -> PasteResult<()> {
    if secret.is_empty() {
        return Err(PasteError::validation("Delete password is required"));
    }
    if secret.chars().count() < MIN_SECRET_CHARS {
        return Err(PasteError::validation(
            "Password must be at least 3 characters",
        ));
    }
    Ok(())
}

/// Argon2id guard. Digests are PHC strings, so cost and salt travel with them
/// and raising the cost later does not break existing pastes.
pub struct Argon2Guard {
    hasher: Argon2<'static>,
}

impl Argon2Guard {
    pub fn new(config: &CredentialConfig) -> PasteResult<Self> {
        let params = Params::new(config.memory_kib, config.iterations, config.lanes, None)
            .map_err(|e| PasteError::Integrity(format!("invalid argon2 parameters: {e}")))?;
        Ok(Self {
            hasher: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    fn fresh_salt() -> PasteResult<SaltString> {
        let mut bytes = [0u8; SALT_LEN];
        rand::rng().fill_bytes(&mut bytes);
        SaltString::encode_b64(&bytes)
            .map_err(|e| PasteError::Integrity(format!("salt encoding failed: {e}")))
    }
}

impl Default for Argon2Guard {
    fn default() -> Self {
        Self {
            hasher: Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::default()),
        }
    }
}

impl CredentialGuard for Argon2Guard {
    fn hash(&self, secret: &str) -> PasteResult<String> {
        check_secret(secret)?;
        let salt = Self::fresh_salt()?;
        let digest = self
            .hasher
            .hash_password(secret.as_bytes(), &salt)
            .map_err(|e| PasteError::Integrity(format!("hashing failed: {e}")))?;
        Ok(digest.to_string())
    }

    fn verify(&self, secret: &str, digest: &str) -> PasteResult<bool> {
        let parsed = PasswordHash::new(digest)
            .map_err(|e| PasteError::Integrity(format!("malformed digest: {e}")))?;
        // A PHC string may legally omit these, but verify would report a mismatch.
        if parsed.salt.is_none() || parsed.hash.is_none() {
            return Err(PasteError::Integrity(
                "malformed digest: missing salt or hash".to_string(),
            ));
        }
        match self.hasher.verify_password(secret.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(PasteError::Integrity(format!("digest verification failed: {e}"))),
        }
    }
}

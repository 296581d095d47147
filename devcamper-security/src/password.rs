//! Password hashing and reset tokens.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::error::SecurityError;

/// Hash a plaintext password with argon2 and a fresh salt.
///
/// Runs on the blocking pool so the hash does not stall the async runtime.
pub async fn hash_password(password: &str) -> Result<String, SecurityError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| SecurityError::Crypto(format!("Failed to hash password: {e}")))
    })
    .await
    .map_err(|e| SecurityError::Crypto(e.to_string()))?
}

/// Check a plaintext password against a stored argon2 hash.
/// A malformed stored hash never matches.
pub async fn verify_password(password: &str, hash: &str) -> bool {
    let password = password.to_string();
    let hash = hash.to_string();
    tokio::task::spawn_blocking(move || {
        let Ok(parsed) = PasswordHash::new(&hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
    .await
    .unwrap_or(false)
}

/// A password reset token: the raw value goes to the user, only the digest is stored.
#[derive(Debug, Clone)]
pub struct ResetToken {
    pub raw: String,
    pub digest: String,
}

impl ResetToken {
    /// 20 random bytes, hex encoded.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 20];
        rand::thread_rng().fill_bytes(&mut bytes);
        let raw = hex::encode(bytes);
        let digest = digest_reset_token(&raw);
        Self { raw, digest }
    }
}

/// SHA-256 of a raw reset token, hex encoded.
pub fn digest_reset_token(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_then_verify() {
        let hash = hash_password("123456").await.unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("123456", &hash).await);
        assert!(!verify_password("654321", &hash).await);
        assert!(!verify_password("123456", "not-a-hash").await);
    }

    #[test]
    fn reset_tokens_store_only_the_digest() {
        let token = ResetToken::generate();
        assert_eq!(token.raw.len(), 40);
        assert_ne!(token.raw, token.digest);
        assert_eq!(digest_reset_token(&token.raw), token.digest);
        assert_eq!(token.digest.len(), 64);
    }
}

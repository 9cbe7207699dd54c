use argon2::{Algorithm, Argon2, Params, Version};
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString};
use std::sync::Arc;
use thiserror::Error;

use crate::config::PasswordPolicy;

#[derive(Debug, Error)]
pub enum HashingError {
    #[error("entropy source failed: {0}")]
    Entropy(String),

    #[error("invalid hashing parameters: {0}")]
    Params(String),

    #[error("stored hash is malformed: {0}")]
    MalformedHash(String),

    #[error("hashing failed: {0}")]
    Hash(String),

    #[error("hashing task aborted")]
    Aborted,
}

/// One-way password hashing with a verify counterpart.
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    async fn hash(&self, plaintext: &str) -> Result<String, HashingError>;

    /// `Ok(false)` on mismatch; `Err` only when `hash` cannot be parsed.
    async fn verify(&self, plaintext: &str, hash: &str) -> Result<bool, HashingError>;

    /// Spend the same effort as `verify` against a decoy hash. Used when there is no stored
    /// hash to compare with so both paths cost the same.
    async fn verify_dummy(&self, plaintext: &str) -> Result<(), HashingError>;
}

/// Argon2id hasher. Work runs on the blocking pool.
#[derive(Clone)]
pub struct Argon2Hasher {
    params: Params,
    decoy: Arc<OnceCell<String>>,
}

impl Argon2Hasher {
    pub fn new(policy: PasswordPolicy) -> Result<Self, HashingError> {
        let params = Params::new(policy.memory_kib, policy.iterations, policy.parallelism, None)
            .map_err(|e| HashingError::Params(e.to_string()))?;

        Ok(Self {
            params,
            decoy: Arc::new(OnceCell::new()),
        })
    }

    fn argon2(params: Params) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    }

    fn hash_blocking(params: Params, plaintext: &str) -> Result<String, HashingError> {
        let mut salt_bytes = [0u8; 16];
        getrandom::getrandom(&mut salt_bytes).map_err(|e| HashingError::Entropy(e.to_string()))?;
        let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| HashingError::Hash(e.to_string()))?;

        let phc = Self::argon2(params)
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| HashingError::Hash(e.to_string()))?
            .to_string();
        Ok(phc)
    }

    fn verify_blocking(plaintext: &str, hash: &str) -> Result<bool, HashingError> {
        let parsed = PasswordHash::new(hash).map_err(|e| HashingError::MalformedHash(e.to_string()))?;

        // Cost parameters come from the PHC string, not from the current policy.
        match Argon2::default().verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(HashingError::MalformedHash(e.to_string())),
        }
    }

    async fn run_blocking<T, F>(f: F) -> Result<T, HashingError>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T, HashingError> + Send + 'static,
    {
        tokio::task::spawn_blocking(f).await.map_err(|_| HashingError::Aborted)?
    }
}

#[async_trait]
impl PasswordHasher for Argon2Hasher {
    async fn hash(&self, plaintext: &str) -> Result<String, HashingError> {
        let params = self.params.clone();
        let plaintext = plaintext.to_owned();
        Self::run_blocking(move || Self::hash_blocking(params, &plaintext)).await
    }

    async fn verify(&self, plaintext: &str, hash: &str) -> Result<bool, HashingError> {
        let plaintext = plaintext.to_owned();
        let hash = hash.to_owned();
        Self::run_blocking(move || Self::verify_blocking(&plaintext, &hash)).await
    }

    async fn verify_dummy(&self, plaintext: &str) -> Result<(), HashingError> {
        let params = self.params.clone();
        let decoy = Arc::clone(&self.decoy);
        let plaintext = plaintext.to_owned();
        Self::run_blocking(move || {
            let hash = decoy.get_or_try_init(|| Self::hash_blocking(params, "decoy-password"))?;
            Self::verify_blocking(&plaintext, hash).map(|_| ())
        })
        .await
    }
}

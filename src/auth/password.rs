use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use std::sync::Arc;
use tracing::error;

use crate::config::HashingConfig;

/// Argon2id hasher carrying the configured work factor.
#[derive(Clone)]
pub struct Hasher {
    argon2: Argon2<'static>,
    // Hash of a throwaway secret under the same work factor, checked when
    // there is no stored hash so that branch costs as much as a real one.
    placeholder: Arc<str>,
}

impl Hasher {
    pub fn new(cfg: HashingConfig) -> anyhow::Result<Self> {
        let params = Params::new(cfg.memory_kib, cfg.iterations, cfg.parallelism, None)
            .map_err(|e| anyhow::anyhow!("invalid argon2 params: {e}"))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let placeholder = argon2
            .hash_password(b"nestegg-placeholder", &SaltString::generate(&mut OsRng))
            .map_err(|e| anyhow::anyhow!("argon2 placeholder hash: {e}"))?
            .to_string();
        Ok(Self {
            argon2,
            placeholder: placeholder.into(),
        })
    }

    pub fn hash(&self, plain: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "argon2 hash_password error");
                anyhow::anyhow!(e.to_string())
            })?
            .to_string();
        Ok(hash)
    }

    /// Parameters and salt are read back from the PHC string, so hashes made
    /// under an older work factor still verify.
    pub fn verify(&self, plain: &str, hash: &str) -> anyhow::Result<bool> {
        let parsed = PasswordHash::new(hash).map_err(|e| {
            error!(error = %e, "argon2 parse hash error");
            anyhow::anyhow!(e.to_string())
        })?;
        Ok(self
            .argon2
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok())
    }

    /// `hash` on the blocking pool.
    pub async fn spawn_hash(&self, plain: String) -> anyhow::Result<String> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&plain)).await?
    }

    /// `verify` on the blocking pool. With no stored hash the work is done
    /// against the placeholder and the answer is always `false`.
    pub async fn spawn_verify(
        &self,
        plain: String,
        hash: Option<String>,
    ) -> anyhow::Result<bool> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || match hash {
            Some(hash) => hasher.verify(&plain, &hash),
            None => hasher.verify(&plain, &hasher.placeholder).map(|_| false),
        })
        .await?
    }
}

#[cfg(test)]
pub(crate) fn cheap_hasher() -> Hasher {
    Hasher::new(HashingConfig {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    })
    .expect("valid test params")
}

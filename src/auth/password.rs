use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use tracing::error;

use crate::{
    config::PasswordConfig,
    error::{AppError, AppResult},
};

/// Argon2id hasher with a fixed cost. Verification reads the cost from the
/// stored hash, so existing hashes survive a cost change.
#[derive(Clone)]
pub struct Hasher {
    params: Params,
    dummy_hash: String,
}

impl Hasher {
    pub fn new(cfg: &PasswordConfig) -> AppResult<Self> {
        let params = Params::new(cfg.memory_kib, cfg.iterations, cfg.parallelism, None)
            .map_err(|e| AppError::Hash(e.to_string()))?;
        let mut hasher = Self {
            params,
            dummy_hash: String::new(),
        };
        let filler = SaltString::generate(&mut OsRng);
        hasher.dummy_hash = hasher.hash(filler.as_str())?;
        Ok(hasher)
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    pub fn hash(&self, plain: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "argon2 hash_password error");
                AppError::Hash(e.to_string())
            })?
            .to_string();
        Ok(hash)
    }

    pub fn verify(&self, hash: &str, plain: &str) -> AppResult<bool> {
        let parsed = PasswordHash::new(hash).map_err(|e| {
            error!(error = %e, "argon2 parse hash error");
            AppError::Hash(e.to_string())
        })?;
        match self.argon2().verify_password(plain.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => {
                error!(error = %e, "argon2 verify_password error");
                Err(AppError::Hash(e.to_string()))
            }
        }
    }

    /// Burns one verification so unknown usernames take as long as wrong passwords.
    pub fn verify_dummy(&self, plain: &str) {
        let _ = self.verify(&self.dummy_hash, plain);
    }
}

#[cfg(test)]
pub(crate) fn test_hasher() -> Hasher {
    Hasher::new(&PasswordConfig {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    })
    .expect("cheap test params are valid")
}

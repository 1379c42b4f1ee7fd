//! Argon2id password hashing and verification.

use anyhow::{anyhow, Context, Result};
use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};

// OWASP-recommended Argon2id parameters.
const MEMORY_COST_KIB: u32 = 19_456;
const TIME_COST: u32 = 2;
const PARALLELISM: u32 = 1;
const OUTPUT_LEN: usize = 32;

/// Argon2id hasher behind the `verify(plain, stored) -> bool` contract.
///
/// The stored value is a PHC string carrying its own salt and parameters, so
/// verification needs no extra configuration. Hashing and verification run on
/// the blocking thread pool to keep the async runtime responsive.
#[derive(Clone, Copy, Debug)]
pub struct PasswordHasher {
    memory_cost: u32,
    time_cost: u32,
    parallelism: u32,
}

impl PasswordHasher {
    #[must_use]
    pub fn new() -> Self {
        Self {
            memory_cost: MEMORY_COST_KIB,
            time_cost: TIME_COST,
            parallelism: PARALLELISM,
        }
    }

    /// Custom cost parameters, mainly for tests that cannot afford the
    /// production memory cost.
    #[must_use]
    pub fn with_params(memory_cost: u32, time_cost: u32, parallelism: u32) -> Self {
        Self {
            memory_cost,
            time_cost,
            parallelism,
        }
    }

    /// Hash `password` into a PHC string with a fresh random salt.
    ///
    /// # Errors
    ///
    /// Fails if the configured parameters are rejected or hashing itself
    /// fails.
    pub async fn hash(&self, password: String) -> Result<String> {
        let argon2 = self.argon2()?;
        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            argon2
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|err| anyhow!("failed to hash password: {err}"))
        })
        .await
        .context("password hashing task panicked")?
    }

    /// Check `password` against a stored PHC string.
    ///
    /// # Errors
    ///
    /// Fails only when the stored hash cannot be parsed; a mismatching
    /// password is `Ok(false)`.
    pub async fn verify(&self, password: String, stored: String) -> Result<bool> {
        tokio::task::spawn_blocking(move || {
            let parsed = PasswordHash::new(&stored)
                .map_err(|err| anyhow!("invalid stored password hash: {err}"))?;
            // Parameters come from the PHC string itself.
            Ok(Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok())
        })
        .await
        .context("password verification task panicked")?
    }

    fn argon2(&self) -> Result<Argon2<'static>> {
        let params = Params::new(
            self.memory_cost,
            self.time_cost,
            self.parallelism,
            Some(OUTPUT_LEN),
        )
        .map_err(|err| anyhow!("invalid argon2 parameters: {err}"))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

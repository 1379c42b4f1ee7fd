//! First-time credential provisioning for the profile-creation flows.

use anyhow::Result;
use rand::{rngs::OsRng, Rng};

use super::store::CredentialStore;

const PASSWORD_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$^&*";
const PASSWORD_LENGTH: usize = 10;

/// Generate a 10-character starter password.
#[must_use]
pub fn generate_password() -> String {
    let mut rng = OsRng;
    (0..PASSWORD_LENGTH)
        .map(|_| {
            let idx = rng.gen_range(0..PASSWORD_ALPHABET.len());
            PASSWORD_ALPHABET[idx] as char
        })
        .collect()
}

/// Build a `first.last` username, disambiguated with a numeric suffix until
/// the credential store has no record for the candidate.
///
/// # Errors
///
/// Propagates store lookup failures.
pub async fn unique_username(
    store: &dyn CredentialStore,
    first_name: &str,
    last_name: &str,
) -> Result<String> {
    let base = format!(
        "{}.{}",
        first_name.trim().to_lowercase(),
        last_name.trim().to_lowercase()
    );
    if store.find_by_username(&base).await?.is_none() {
        return Ok(base);
    }

    let mut suffix: u64 = 1;
    loop {
        let candidate = format!("{base}{suffix}");
        if store.find_by_username(&candidate).await?.is_none() {
            return Ok(candidate);
        }
        suffix += 1;
    }
}

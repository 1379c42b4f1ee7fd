//! Error taxonomy for the auth flows.

use thiserror::Error;

use super::token::TokenError;

/// Failures surfaced by [`crate::auth::AuthService`].
///
/// Every variant is terminal for the current call; nothing is retried here.
/// The only self-healing behavior is the lockout window elapsing.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Too many recent failed logins for this username. The block itself is
    /// the signal; blocked calls do not count further failures.
    #[error("too many failed login attempts")]
    LoginBlocked,

    /// Username/password mismatch, deliberately silent about which part was
    /// wrong or whether the username exists at all.
    #[error("incorrect credentials")]
    IncorrectCredentials,

    /// Lookup miss during credential change or activation. The transport
    /// layer must present this with the same visible effect as
    /// [`AuthError::IncorrectCredentials`] to prevent username enumeration.
    #[error("user not found")]
    UserNotFound,

    /// Signature, format, expiry, or revocation failure on a presented token.
    /// The caller should re-authenticate rather than retry.
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Store-layer I/O failure, distinct from the client-facing kinds above.
    #[error("storage failure: {0}")]
    Store(#[from] anyhow::Error),
}

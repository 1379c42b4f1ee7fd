//! Login, logout, and credential-change orchestration.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;
use uuid::Uuid;

use super::attempts::LoginAttemptTracker;
use super::clock::Clock;
use super::error::AuthError;
use super::password::PasswordHasher;
use super::principal::Principal;
use super::provision;
use super::state::AuthConfig;
use super::store::{CredentialStore, SessionToken, TokenStore, User};
use super::token::{TokenError, TokenIssuer};
use super::types::{CredentialPair, IssuedToken};

/// The authentication state machine.
///
/// Each login attempt runs `START -> CHECK_BLOCKED -> VERIFY_CREDENTIALS ->
/// {SUCCESS | FAILURE}`. Success rotates session tokens: every previously
/// valid token for the user is revoked before a new one is minted, so the
/// "at most one valid token per user" invariant holds.
pub struct AuthService {
    credentials: Arc<dyn CredentialStore>,
    tokens: Arc<dyn TokenStore>,
    attempts: LoginAttemptTracker,
    issuer: TokenIssuer,
    hasher: PasswordHasher,
    clock: Arc<dyn Clock>,
    // Hash verified for unknown usernames, built lazily on first miss.
    dummy_hash: tokio::sync::OnceCell<String>,
    user_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl AuthService {
    #[must_use]
    pub fn new(
        config: &AuthConfig,
        secret: Vec<u8>,
        credentials: Arc<dyn CredentialStore>,
        tokens: Arc<dyn TokenStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let attempts = LoginAttemptTracker::new(
            config.max_login_failures(),
            config.lockout_window_seconds(),
            clock.clone(),
        );
        let issuer = TokenIssuer::new(
            secret,
            config.token_issuer().to_string(),
            config.token_ttl_seconds(),
        );
        Self {
            credentials,
            tokens,
            attempts,
            issuer,
            hasher: PasswordHasher::new(),
            clock,
            dummy_hash: tokio::sync::OnceCell::new(),
            user_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Swap the password hasher, mainly so tests can use cheaper parameters.
    #[must_use]
    pub fn with_hasher(mut self, hasher: PasswordHasher) -> Self {
        self.hasher = hasher;
        self
    }

    /// Run the login state machine for `username`.
    ///
    /// # Errors
    ///
    /// `LoginBlocked` while the lockout window is active (the blocked call
    /// itself does not count a failure), `IncorrectCredentials` on any
    /// mismatch, `Store` on storage failure.
    pub async fn login(&self, username: &str, password: &str) -> Result<IssuedToken, AuthError> {
        if self.attempts.is_blocked(username) {
            debug!("login blocked for {username}");
            return Err(AuthError::LoginBlocked);
        }

        // Serialize verification and rotation per username so two racing
        // logins cannot leave two valid tokens behind.
        let lock = self.user_lock(username);
        let _guard = lock.lock().await;

        let user = match self.verify_credentials(username, password).await {
            Ok(user) => user,
            Err(err) => {
                if matches!(err, AuthError::IncorrectCredentials) {
                    self.attempts.login_failed(username);
                }
                return Err(err);
            }
        };

        self.attempts.reset_attempts(username);
        self.revoke_all_user_tokens(user.id).await?;

        let now = self.clock.unix_seconds();
        let token = self.issuer.generate(&Principal::from(&user), now)?;
        self.tokens
            .save(&SessionToken {
                id: Uuid::new_v4(),
                user_id: user.id,
                token: token.clone(),
                expired: false,
                revoked: false,
            })
            .await?;

        debug!("login succeeded for {username}");
        Ok(IssuedToken { token })
    }

    /// Revoke the presented token. Idempotent: a well-signed token that is
    /// unknown or already revoked is left as it is.
    ///
    /// # Errors
    ///
    /// `Token` if the presented token fails validation, `Store` on storage
    /// failure.
    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        let now = self.clock.unix_seconds();
        self.issuer.validate(token, now)?;

        if let Some(mut stored) = self.tokens.find_by_token(token).await? {
            stored.expired = true;
            stored.revoked = true;
            self.tokens.save(&stored).await?;
        }
        Ok(())
    }

    /// Replace the stored password hash after verifying the old password.
    ///
    /// # Errors
    ///
    /// `UserNotFound` if the username has no record, `IncorrectCredentials`
    /// if `old_password` does not match, `Store` on storage failure.
    pub async fn change_credentials(
        &self,
        username: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<CredentialPair, AuthError> {
        debug!("changing credentials for {username}");
        let Some(mut user) = self.credentials.find_by_username(username).await? else {
            return Err(AuthError::UserNotFound);
        };
        if !self
            .hasher
            .verify(old_password.to_string(), user.password_hash.clone())
            .await?
        {
            return Err(AuthError::IncorrectCredentials);
        }

        user.password_hash = self.hasher.hash(new_password.to_string()).await?;
        self.credentials.save(&user).await?;

        debug!("credentials changed for {username}");
        Ok(CredentialPair {
            username: user.username,
            new_password: new_password.to_string(),
        })
    }

    /// Toggle the active flag: calling twice restores the original state.
    ///
    /// # Errors
    ///
    /// `UserNotFound` if the username has no record, `Store` on storage
    /// failure.
    pub async fn activate_profile(&self, username: &str) -> Result<(), AuthError> {
        let Some(mut user) = self.credentials.find_by_username(username).await? else {
            return Err(AuthError::UserNotFound);
        };
        user.active = !user.active;
        self.credentials.save(&user).await?;
        Ok(())
    }

    /// Read-only credential check used as a guard by other flows. Touches
    /// neither tokens nor the attempt counter.
    ///
    /// # Errors
    ///
    /// `IncorrectCredentials` on any mismatch, `Store` on storage failure.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<(), AuthError> {
        self.verify_credentials(username, password).await.map(|_| ())
    }

    /// Validate a presented token and return its principal, checking both
    /// the signature/expiry and that the stored record is still valid.
    ///
    /// # Errors
    ///
    /// `Token` if validation fails or the token was revoked, `Store` on
    /// storage failure.
    pub async fn verify_token(&self, token: &str) -> Result<Principal, AuthError> {
        let now = self.clock.unix_seconds();
        let principal = self.issuer.validate(token, now)?;
        match self.tokens.find_by_token(token).await? {
            Some(stored) if stored.is_valid() => Ok(principal),
            _ => Err(AuthError::Token(TokenError::Revoked)),
        }
    }

    async fn verify_credentials(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let Some(user) = self.credentials.find_by_username(username).await? else {
            // Burn a comparable verification so unknown usernames are not
            // distinguishable from wrong passwords by response time.
            self.dummy_verify(password).await?;
            return Err(AuthError::IncorrectCredentials);
        };
        if !self
            .hasher
            .verify(password.to_string(), user.password_hash.clone())
            .await?
        {
            return Err(AuthError::IncorrectCredentials);
        }
        if !user.active {
            return Err(AuthError::IncorrectCredentials);
        }
        Ok(user)
    }

    async fn dummy_verify(&self, password: &str) -> Result<(), AuthError> {
        let hash = self
            .dummy_hash
            .get_or_try_init(|| self.hasher.hash(provision::generate_password()))
            .await
            .map_err(AuthError::Store)?;
        let _ = self
            .hasher
            .verify(password.to_string(), hash.clone())
            .await?;
        Ok(())
    }

    async fn revoke_all_user_tokens(&self, user_id: Uuid) -> Result<(), AuthError> {
        let mut valid = self.tokens.find_all_valid(user_id).await?;
        if valid.is_empty() {
            return Ok(());
        }
        for token in &mut valid {
            token.expired = true;
            token.revoked = true;
        }
        self.tokens.save_all(&valid).await?;
        Ok(())
    }

    fn user_lock(&self, username: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.user_locks.lock().unwrap_or_else(PoisonError::into_inner);
        // Drop entries nobody is holding or waiting on.
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        locks.entry(username.to_string()).or_default().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::AuthService;
    use crate::auth::clock::ManualClock;
    use crate::auth::memory::{InMemoryCredentialStore, InMemoryTokenStore};
    use crate::auth::state::AuthConfig;
    use std::sync::Arc;

    #[test]
    fn user_locks_are_reused_while_held_and_pruned_after() {
        let service = AuthService::new(
            &AuthConfig::new(),
            b"secret".to_vec(),
            Arc::new(InMemoryCredentialStore::new()),
            Arc::new(InMemoryTokenStore::new()),
            Arc::new(ManualClock::new(0)),
        );

        let first = service.user_lock("john.doe");
        let again = service.user_lock("john.doe");
        assert!(Arc::ptr_eq(&first, &again));

        drop(first);
        drop(again);
        // With no holder left the entry is pruned and a fresh lock handed out.
        let fresh = service.user_lock("john.doe");
        assert_eq!(Arc::strong_count(&fresh), 2);
    }
}

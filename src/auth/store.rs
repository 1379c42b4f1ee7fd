//! User and session-token records plus the store seams the core consumes.

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use super::principal::Role;

/// Account record as the credential store persists it.
///
/// `password_hash` is an Argon2id PHC string; plaintext never lands here.
/// Records are created by the out-of-scope profile-creation flow and only
/// mutated by credential change and activation.
#[derive(Clone, Debug)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub active: bool,
    pub role: Role,
}

/// Issued session token row.
///
/// `expired` and `revoked` are distinct: expiry is time-based, revocation is
/// an explicit invalidation. Login flips both on every previously valid token.
#[derive(Clone, Debug)]
pub struct SessionToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token: String,
    pub expired: bool,
    pub revoked: bool,
}

impl SessionToken {
    /// A token is valid while neither flag is set.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.expired && !self.revoked
    }
}

/// Lookup and persistence for user records. Profile CRUD beyond this belongs
/// to the trainee/trainer services.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    async fn save(&self, user: &User) -> Result<()>;
}

/// Persistence for issued session tokens.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// All tokens for `user_id` with neither `expired` nor `revoked` set.
    async fn find_all_valid(&self, user_id: Uuid) -> Result<Vec<SessionToken>>;

    async fn find_by_token(&self, token: &str) -> Result<Option<SessionToken>>;

    async fn save(&self, token: &SessionToken) -> Result<()>;

    async fn save_all(&self, tokens: &[SessionToken]) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::SessionToken;
    use uuid::Uuid;

    #[test]
    fn token_validity_requires_both_flags_clear() {
        let mut token = SessionToken {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            token: "jwt".to_string(),
            expired: false,
            revoked: false,
        };
        assert!(token.is_valid());

        token.expired = true;
        assert!(!token.is_valid());

        token.expired = false;
        token.revoked = true;
        assert!(!token.is_valid());
    }
}

//! Mutex-backed stores for tests and single-process runs.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

use super::store::{CredentialStore, SessionToken, TokenStore, User};

/// In-memory [`CredentialStore`] keyed by username.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    users: Mutex<HashMap<String, User>>,
}

impl InMemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a user record, replacing any existing record for the username.
    pub fn insert(&self, user: User) {
        self.lock().insert(user.username.clone(), user);
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, User>> {
        self.users.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self.lock().get(username).cloned())
    }

    async fn save(&self, user: &User) -> Result<()> {
        self.lock().insert(user.username.clone(), user.clone());
        Ok(())
    }
}

/// In-memory [`TokenStore`] keyed by token id.
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    tokens: Mutex<HashMap<Uuid, SessionToken>>,
}

impl InMemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, SessionToken>> {
        self.tokens.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn find_all_valid(&self, user_id: Uuid) -> Result<Vec<SessionToken>> {
        Ok(self
            .lock()
            .values()
            .filter(|token| token.user_id == user_id && token.is_valid())
            .cloned()
            .collect())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<SessionToken>> {
        Ok(self
            .lock()
            .values()
            .find(|record| record.token == token)
            .cloned())
    }

    async fn save(&self, token: &SessionToken) -> Result<()> {
        self.lock().insert(token.id, token.clone());
        Ok(())
    }

    async fn save_all(&self, tokens: &[SessionToken]) -> Result<()> {
        let mut records = self.lock();
        for token in tokens {
            records.insert(token.id, token.clone());
        }
        Ok(())
    }
}

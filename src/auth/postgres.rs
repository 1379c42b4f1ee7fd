//! Postgres-backed stores.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

use super::principal::Role;
use super::store::{CredentialStore, SessionToken, TokenStore, User};

fn role_from_str(role: &str) -> Result<Role> {
    match role {
        "trainee" => Ok(Role::Trainee),
        "trainer" => Ok(Role::Trainer),
        other => bail!("unknown role in users table: {other}"),
    }
}

fn user_from_row(row: &sqlx::postgres::PgRow) -> Result<User> {
    let role: String = row.get("role");
    Ok(User {
        id: row.get("id"),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
        active: row.get("is_active"),
        role: role_from_str(&role)?,
    })
}

fn token_from_row(row: &sqlx::postgres::PgRow) -> SessionToken {
    SessionToken {
        id: row.get("id"),
        user_id: row.get("user_id"),
        token: row.get("token"),
        expired: row.get("expired"),
        revoked: row.get("revoked"),
    }
}

/// [`CredentialStore`] over the shared `users` table.
#[derive(Clone, Debug)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let query = r"
            SELECT id, username, password_hash, is_active, role
            FROM users
            WHERE username = $1
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(username)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup user")?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn save(&self, user: &User) -> Result<()> {
        let query = r"
            INSERT INTO users (id, username, password_hash, is_active, role)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE
            SET username = $2, password_hash = $3, is_active = $4, role = $5
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        sqlx::query(query)
            .bind(user.id)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(user.active)
            .bind(user.role.as_str())
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to save user")?;
        Ok(())
    }
}

/// [`TokenStore`] over the `session_tokens` table.
#[derive(Clone, Debug)]
pub struct PgTokenStore {
    pool: PgPool,
}

impl PgTokenStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenStore for PgTokenStore {
    async fn find_all_valid(&self, user_id: Uuid) -> Result<Vec<SessionToken>> {
        let query = r"
            SELECT id, user_id, token, expired, revoked
            FROM session_tokens
            WHERE user_id = $1 AND NOT expired AND NOT revoked
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let rows = sqlx::query(query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup valid tokens")?;

        Ok(rows.iter().map(token_from_row).collect())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<SessionToken>> {
        let query = r"
            SELECT id, user_id, token, expired, revoked
            FROM session_tokens
            WHERE token = $1
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(token)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup token")?;

        Ok(row.as_ref().map(token_from_row))
    }

    async fn save(&self, token: &SessionToken) -> Result<()> {
        let query = r"
            INSERT INTO session_tokens (id, user_id, token, expired, revoked)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE
            SET expired = $4, revoked = $5
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        sqlx::query(query)
            .bind(token.id)
            .bind(token.user_id)
            .bind(&token.token)
            .bind(token.expired)
            .bind(token.revoked)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to save token")?;
        Ok(())
    }

    async fn save_all(&self, tokens: &[SessionToken]) -> Result<()> {
        // One transaction so token rotation is all-or-nothing.
        let mut tx = self.pool.begin().await.context("begin token batch")?;

        let query = r"
            INSERT INTO session_tokens (id, user_id, token, expired, revoked)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE
            SET expired = $4, revoked = $5
        ";
        for token in tokens {
            let span = tracing::info_span!(
                "db.query",
                db.system = "postgresql",
                db.operation = "INSERT",
                db.statement = query
            );
            sqlx::query(query)
                .bind(token.id)
                .bind(token.user_id)
                .bind(&token.token)
                .bind(token.expired)
                .bind(token.revoked)
                .execute(&mut *tx)
                .instrument(span)
                .await
                .context("failed to save token in batch")?;
        }

        tx.commit().await.context("commit token batch")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::role_from_str;
    use crate::auth::principal::Role;

    #[test]
    fn role_parsing_round_trips() {
        assert_eq!(role_from_str("trainee").ok(), Some(Role::Trainee));
        assert_eq!(role_from_str("trainer").ok(), Some(Role::Trainer));
        assert!(role_from_str("janitor").is_err());
        assert_eq!(role_from_str(Role::Trainer.as_str()).ok(), Some(Role::Trainer));
    }
}

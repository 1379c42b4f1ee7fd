//! Auth configuration: lockout thresholds and token issuance settings.

const DEFAULT_MAX_LOGIN_FAILURES: u32 = 5;
const DEFAULT_LOCKOUT_WINDOW_SECONDS: i64 = 5 * 60;
const DEFAULT_TOKEN_TTL_SECONDS: i64 = 30 * 60;
const DEFAULT_TOKEN_ISSUER: &str = "gymgate";

#[derive(Clone, Debug)]
pub struct AuthConfig {
    max_login_failures: u32,
    lockout_window_seconds: i64,
    token_ttl_seconds: i64,
    token_issuer: String,
}

impl AuthConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_login_failures: DEFAULT_MAX_LOGIN_FAILURES,
            lockout_window_seconds: DEFAULT_LOCKOUT_WINDOW_SECONDS,
            token_ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
            token_issuer: DEFAULT_TOKEN_ISSUER.to_string(),
        }
    }

    #[must_use]
    pub fn with_max_login_failures(mut self, failures: u32) -> Self {
        self.max_login_failures = failures;
        self
    }

    #[must_use]
    pub fn with_lockout_window_seconds(mut self, seconds: i64) -> Self {
        self.lockout_window_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_token_ttl_seconds(mut self, seconds: i64) -> Self {
        self.token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_token_issuer(mut self, issuer: String) -> Self {
        self.token_issuer = issuer;
        self
    }

    #[must_use]
    pub fn max_login_failures(&self) -> u32 {
        self.max_login_failures
    }

    #[must_use]
    pub fn lockout_window_seconds(&self) -> i64 {
        self.lockout_window_seconds
    }

    #[must_use]
    pub fn token_ttl_seconds(&self) -> i64 {
        self.token_ttl_seconds
    }

    #[must_use]
    pub fn token_issuer(&self) -> &str {
        &self.token_issuer
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::AuthConfig;

    #[test]
    fn auth_config_defaults_and_overrides() {
        let config = AuthConfig::new();

        assert_eq!(
            config.max_login_failures(),
            super::DEFAULT_MAX_LOGIN_FAILURES
        );
        assert_eq!(
            config.lockout_window_seconds(),
            super::DEFAULT_LOCKOUT_WINDOW_SECONDS
        );
        assert_eq!(config.token_ttl_seconds(), super::DEFAULT_TOKEN_TTL_SECONDS);
        assert_eq!(config.token_issuer(), super::DEFAULT_TOKEN_ISSUER);

        let config = config
            .with_max_login_failures(3)
            .with_lockout_window_seconds(60)
            .with_token_ttl_seconds(120)
            .with_token_issuer("gym.test".to_string());

        assert_eq!(config.max_login_failures(), 3);
        assert_eq!(config.lockout_window_seconds(), 60);
        assert_eq!(config.token_ttl_seconds(), 120);
        assert_eq!(config.token_issuer(), "gym.test");
    }
}

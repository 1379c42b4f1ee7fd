//! Response payloads handed to the surrounding transport layer.

use serde::{Deserialize, Serialize};

/// Fresh session token returned by a successful login.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
}

/// Result of a credential change. `new_password` echoes the accepted value,
/// since only its hash is stored.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CredentialPair {
    pub username: String,
    pub new_password: String,
}

#[cfg(test)]
mod tests {
    use super::{CredentialPair, IssuedToken};
    use anyhow::Result;

    #[test]
    fn issued_token_round_trips() -> Result<()> {
        let issued = IssuedToken {
            token: "header.claims.sig".to_string(),
        };
        let value = serde_json::to_value(&issued)?;
        let decoded: IssuedToken = serde_json::from_value(value)?;
        assert_eq!(decoded.token, "header.claims.sig");
        Ok(())
    }

    #[test]
    fn credential_pair_round_trips() -> Result<()> {
        let pair = CredentialPair {
            username: "john.doe".to_string(),
            new_password: "pw456".to_string(),
        };
        let value = serde_json::to_value(&pair)?;
        let decoded: CredentialPair = serde_json::from_value(value)?;
        assert_eq!(decoded.username, "john.doe");
        assert_eq!(decoded.new_password, "pw456");
        Ok(())
    }
}

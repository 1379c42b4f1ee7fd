//! Signed session tokens (HS256 JWTs) bound to a principal.

use base64ct::{Base64UrlUnpadded, Encoding};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use uuid::Uuid;

use super::principal::{Principal, Role};

pub const TOKEN_VERSION: u8 = 1;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionTokenHeader {
    pub alg: String,
    pub typ: String,
}

impl SessionTokenHeader {
    fn hs256() -> Self {
        Self {
            alg: "HS256".to_string(),
            typ: "JWT".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionTokenClaims {
    pub v: u8,
    pub iss: String,
    /// Username of the authenticated principal.
    pub sub: String,
    pub uid: Uuid,
    pub role: Role,
    pub active: bool,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid token format")]
    TokenFormat,
    #[error("invalid base64url encoding")]
    Base64,
    #[error("invalid json")]
    Json(#[from] serde_json::Error),
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlg(String),
    #[error("invalid signing key")]
    Key,
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("invalid issuer")]
    InvalidIssuer,
    #[error("invalid token version")]
    InvalidVersion,
    #[error("token revoked")]
    Revoked,
}

fn b64e_json<T: Serialize>(value: &T) -> Result<String, TokenError> {
    let json = serde_json::to_vec(value)?;
    Ok(Base64UrlUnpadded::encode_string(&json))
}

fn b64d_json<T: for<'de> Deserialize<'de>>(s: &str) -> Result<T, TokenError> {
    let bytes = Base64UrlUnpadded::decode_vec(s).map_err(|_| TokenError::Base64)?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn keyed_mac(secret: &[u8]) -> Result<HmacSha256, TokenError> {
    HmacSha256::new_from_slice(secret).map_err(|_| TokenError::Key)
}

/// Create an HS256 signed session token (JWT).
///
/// # Errors
///
/// Returns an error if the header/claims JSON cannot be encoded or the
/// signing key is rejected.
pub fn sign_hs256(secret: &[u8], claims: &SessionTokenClaims) -> Result<String, TokenError> {
    let header_b64 = b64e_json(&SessionTokenHeader::hs256())?;
    let claims_b64 = b64e_json(claims)?;
    let signing_input = format!("{header_b64}.{claims_b64}");

    let mut mac = keyed_mac(secret)?;
    mac.update(signing_input.as_bytes());
    let signature = mac.finalize().into_bytes();
    let signature_b64 = Base64UrlUnpadded::encode_string(&signature);

    Ok(format!("{signing_input}.{signature_b64}"))
}

/// Verify an HS256 session token and return its decoded claims.
///
/// # Errors
///
/// Returns an error if:
/// - the token is malformed or contains invalid base64/json,
/// - the signature does not match the shared secret,
/// - the claims fail validation (`v`, `iss`, `exp`).
pub fn verify_hs256(
    token: &str,
    secret: &[u8],
    expected_issuer: &str,
    now_unix_seconds: i64,
) -> Result<SessionTokenClaims, TokenError> {
    let mut parts = token.split('.');
    let header_b64 = parts.next().ok_or(TokenError::TokenFormat)?;
    let claims_b64 = parts.next().ok_or(TokenError::TokenFormat)?;
    let sig_b64 = parts.next().ok_or(TokenError::TokenFormat)?;
    if parts.next().is_some() {
        return Err(TokenError::TokenFormat);
    }

    let header: SessionTokenHeader = b64d_json(header_b64)?;
    if header.alg != "HS256" {
        return Err(TokenError::UnsupportedAlg(header.alg));
    }

    let signature = Base64UrlUnpadded::decode_vec(sig_b64).map_err(|_| TokenError::Base64)?;
    let signing_input = format!("{header_b64}.{claims_b64}");
    let mut mac = keyed_mac(secret)?;
    mac.update(signing_input.as_bytes());
    mac.verify_slice(&signature)
        .map_err(|_| TokenError::InvalidSignature)?;

    let claims: SessionTokenClaims = b64d_json(claims_b64)?;
    if claims.v != TOKEN_VERSION {
        return Err(TokenError::InvalidVersion);
    }
    if claims.iss != expected_issuer {
        return Err(TokenError::InvalidIssuer);
    }
    if claims.exp <= now_unix_seconds {
        return Err(TokenError::Expired);
    }

    Ok(claims)
}

/// Issues and validates session tokens for authenticated principals.
///
/// Validation is stateless: the shared secret is enough, no storage lookup.
pub struct TokenIssuer {
    secret: Vec<u8>,
    issuer: String,
    ttl_seconds: i64,
}

impl TokenIssuer {
    #[must_use]
    pub fn new(secret: Vec<u8>, issuer: String, ttl_seconds: i64) -> Self {
        Self {
            secret,
            issuer,
            ttl_seconds,
        }
    }

    /// Mint a signed token for `principal`, valid for the configured TTL.
    ///
    /// # Errors
    ///
    /// Returns an error if claim encoding or signing fails.
    pub fn generate(
        &self,
        principal: &Principal,
        now_unix_seconds: i64,
    ) -> Result<String, TokenError> {
        let claims = SessionTokenClaims {
            v: TOKEN_VERSION,
            iss: self.issuer.clone(),
            sub: principal.username.clone(),
            uid: principal.user_id,
            role: principal.role,
            active: principal.active,
            iat: now_unix_seconds,
            exp: now_unix_seconds + self.ttl_seconds,
            jti: Uuid::new_v4().to_string(),
        };
        sign_hs256(&self.secret, &claims)
    }

    /// Validate `token` and return the principal it was bound to.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is malformed, the signature does not
    /// match, the issuer or version is wrong, or the expiry has elapsed.
    pub fn validate(&self, token: &str, now_unix_seconds: i64) -> Result<Principal, TokenError> {
        let claims = verify_hs256(token, &self.secret, &self.issuer, now_unix_seconds)?;
        Ok(Principal {
            user_id: claims.uid,
            username: claims.sub,
            active: claims.active,
            role: claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{
        sign_hs256, verify_hs256, Principal, Role, SessionTokenClaims, TokenError, TokenIssuer,
        TOKEN_VERSION,
    };
    use uuid::Uuid;

    const SECRET: &[u8] = b"test-secret-at-least-long-enough";
    const NOW: i64 = 1_700_000_000;

    fn test_claims() -> SessionTokenClaims {
        SessionTokenClaims {
            v: TOKEN_VERSION,
            iss: "gymgate".to_string(),
            sub: "john.doe".to_string(),
            uid: Uuid::nil(),
            role: Role::Trainee,
            active: true,
            iat: NOW,
            exp: NOW + 120,
            jti: "jti-1".to_string(),
        }
    }

    #[test]
    fn claims_serialize_with_uuid_and_role_fields() -> Result<(), TokenError> {
        let mut claims = test_claims();
        claims.uid = Uuid::from_u128(0xDEAD_BEEF);

        let json = serde_json::to_value(&claims)?;
        assert_eq!(json["uid"], "00000000-0000-0000-0000-0000deadbeef");
        assert_eq!(json["role"], "trainee");

        let decoded: SessionTokenClaims = serde_json::from_value(json)?;
        assert_eq!(decoded, claims);
        Ok(())
    }

    #[test]
    fn sign_and_verify_round_trip() -> Result<(), TokenError> {
        let token = sign_hs256(SECRET, &test_claims())?;
        let verified = verify_hs256(&token, SECRET, "gymgate", NOW)?;
        assert_eq!(verified, test_claims());
        Ok(())
    }

    #[test]
    fn rejects_wrong_secret() -> Result<(), TokenError> {
        let token = sign_hs256(SECRET, &test_claims())?;
        let result = verify_hs256(&token, b"another-secret", "gymgate", NOW);
        assert!(matches!(result, Err(TokenError::InvalidSignature)));
        Ok(())
    }

    #[test]
    fn rejects_tampered_signature() -> Result<(), TokenError> {
        let token = sign_hs256(SECRET, &test_claims())?;
        // Swap the final signature character for a different canonical one.
        let last = token.chars().last().ok_or(TokenError::TokenFormat)?;
        let replacement = if last == 'A' { 'Q' } else { 'A' };
        let mut tampered = token.clone();
        tampered.pop();
        tampered.push(replacement);

        let result = verify_hs256(&tampered, SECRET, "gymgate", NOW);
        assert!(matches!(result, Err(TokenError::InvalidSignature)));
        Ok(())
    }

    #[test]
    fn rejects_expired_or_wrong_issuer() -> Result<(), TokenError> {
        let token = sign_hs256(SECRET, &test_claims())?;

        let result = verify_hs256(&token, SECRET, "someone-else", NOW);
        assert!(matches!(result, Err(TokenError::InvalidIssuer)));

        let result = verify_hs256(&token, SECRET, "gymgate", NOW + 9999);
        assert!(matches!(result, Err(TokenError::Expired)));
        Ok(())
    }

    #[test]
    fn rejects_wrong_version_and_format() -> Result<(), TokenError> {
        let mut claims = test_claims();
        claims.v = 0;
        let token = sign_hs256(SECRET, &claims)?;
        let result = verify_hs256(&token, SECRET, "gymgate", NOW);
        assert!(matches!(result, Err(TokenError::InvalidVersion)));

        let result = verify_hs256("only.two", SECRET, "gymgate", NOW);
        assert!(matches!(result, Err(TokenError::TokenFormat)));

        let result = verify_hs256("a.b.c.d", SECRET, "gymgate", NOW);
        assert!(matches!(result, Err(TokenError::TokenFormat)));
        Ok(())
    }

    #[test]
    fn issuer_binds_principal_and_ttl() -> Result<(), TokenError> {
        let issuer = TokenIssuer::new(SECRET.to_vec(), "gymgate".to_string(), 120);
        let principal = Principal {
            user_id: Uuid::new_v4(),
            username: "jane.doe".to_string(),
            active: true,
            role: Role::Trainer,
        };

        let token = issuer.generate(&principal, NOW)?;
        let validated = issuer.validate(&token, NOW)?;
        assert_eq!(validated, principal);

        // One second before expiry is still fine; at expiry it is not.
        assert!(issuer.validate(&token, NOW + 119).is_ok());
        assert!(matches!(
            issuer.validate(&token, NOW + 120),
            Err(TokenError::Expired)
        ));
        Ok(())
    }

    #[test]
    fn issued_tokens_carry_unique_jti() -> Result<(), TokenError> {
        let issuer = TokenIssuer::new(SECRET.to_vec(), "gymgate".to_string(), 120);
        let principal = Principal {
            user_id: Uuid::new_v4(),
            username: "jane.doe".to_string(),
            active: true,
            role: Role::Trainer,
        };
        let first = issuer.generate(&principal, NOW)?;
        let second = issuer.generate(&principal, NOW)?;
        assert_ne!(first, second);
        Ok(())
    }
}

//! Signed session tokens
//!
//! Format: `v1.<base64url payload>.<base64url hmac>` where the payload is the
//! JSON-encoded claims and the signature is HMAC-SHA256 over the payload
//! bytes. Verification is server-side only; clients treat tokens as opaque.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::{Error, Result};

const TOKEN_VERSION: &str = "v1";

/// Hard cap before any parsing happens
pub const MAX_TOKEN_LEN: usize = 4096;

type HmacSha256 = Hmac<Sha256>;

/// Claims carried inside a session token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    /// Username the token was issued to
    pub subject: String,
    /// Issue time, seconds since the epoch
    pub issued_at: i64,
    /// Expiry time, seconds since the epoch
    pub expires_at: i64,
}

fn sign(payload: &[u8], secret: &[u8]) -> Result<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|_| Error::Config("Session secret must not be empty".to_string()))?;
    mac.update(payload);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Serialize and sign claims into a token string.
pub fn issue_token(claims: &SessionClaims, secret: &[u8]) -> Result<String> {
    let payload = serde_json::to_vec(claims)?;
    let signature = sign(&payload, secret)?;
    Ok(format!(
        "{}.{}.{}",
        TOKEN_VERSION,
        URL_SAFE_NO_PAD.encode(&payload),
        URL_SAFE_NO_PAD.encode(&signature)
    ))
}

/// Verify a token's signature and expiry against `now` (epoch seconds).
///
/// Any malformed, tampered, or expired token yields [`Error::AuthFailed`];
/// callers learn nothing about which check rejected it.
pub fn verify_token(token: &str, secret: &[u8], now: i64) -> Result<SessionClaims> {
    if token.is_empty() || token.len() > MAX_TOKEN_LEN {
        return Err(Error::AuthFailed);
    }
    let mut parts = token.splitn(3, '.');
    let (version, payload_b64, signature_b64) = match (parts.next(), parts.next(), parts.next()) {
        (Some(version), Some(payload), Some(signature)) => (version, payload, signature),
        _ => return Err(Error::AuthFailed),
    };
    if version != TOKEN_VERSION {
        return Err(Error::AuthFailed);
    }

    let payload = URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|_| Error::AuthFailed)?;
    let signature = URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|_| Error::AuthFailed)?;

    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|_| Error::Config("Session secret must not be empty".to_string()))?;
    mac.update(&payload);
    mac.verify_slice(&signature).map_err(|_| Error::AuthFailed)?;

    let claims: SessionClaims = serde_json::from_slice(&payload).map_err(|_| Error::AuthFailed)?;
    if claims.expires_at <= now {
        return Err(Error::AuthFailed);
    }
    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret-test-secret-32-bytes";

    fn claims(expires_at: i64) -> SessionClaims {
        SessionClaims {
            subject: "admin".to_string(),
            issued_at: 1_000,
            expires_at,
        }
    }

    #[test]
    fn test_round_trip() {
        let token = issue_token(&claims(2_000), SECRET).expect("Failed to issue token");
        let verified = verify_token(&token, SECRET, 1_500).expect("Failed to verify token");
        assert_eq!(verified, claims(2_000));
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = issue_token(&claims(2_000), SECRET).expect("Failed to issue token");
        assert!(matches!(
            verify_token(&token, SECRET, 2_000),
            Err(Error::AuthFailed)
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issue_token(&claims(2_000), SECRET).expect("Failed to issue token");
        assert!(matches!(
            verify_token(&token, b"another-secret", 1_500),
            Err(Error::AuthFailed)
        ));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let token = issue_token(&claims(2_000), SECRET).expect("Failed to issue token");
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged = URL_SAFE_NO_PAD.encode(
            serde_json::to_vec(&claims(i64::MAX)).expect("Failed to serialize forged claims"),
        );
        parts[1] = &forged;
        let tampered = parts.join(".");
        assert!(matches!(
            verify_token(&tampered, SECRET, 1_500),
            Err(Error::AuthFailed)
        ));
    }

    #[test]
    fn test_garbage_rejected() {
        for garbage in ["", "v1", "v1..", "not-a-token", "v2.aaaa.bbbb", "v1.!!.??"] {
            assert!(
                matches!(verify_token(garbage, SECRET, 0), Err(Error::AuthFailed)),
                "expected rejection for {garbage:?}"
            );
        }
    }

    #[test]
    fn test_oversize_rejected() {
        let oversize = format!("v1.{}.sig", "a".repeat(MAX_TOKEN_LEN));
        assert!(matches!(
            verify_token(&oversize, SECRET, 0),
            Err(Error::AuthFailed)
        ));
    }
}

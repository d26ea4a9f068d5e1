//! Admin session gate
//!
//! A single admin credential pair guards every mutating operation. Logging in
//! with the exact username and password yields a signed, expiring session
//! token; mutations must present that token. Credentials and the signing
//! secret come from the environment, never from config files on disk.

mod token;

pub use token::{issue_token, verify_token, SessionClaims, MAX_TOKEN_LEN};

use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::error::{Error, Result};

/// Environment variable holding the admin username
pub const ADMIN_USER_ENV: &str = "DESKFOLIO_ADMIN_USER";
/// Environment variable holding the admin password
pub const ADMIN_PASS_ENV: &str = "DESKFOLIO_ADMIN_PASS";
/// Environment variable holding the token-signing secret (optional)
pub const SESSION_SECRET_ENV: &str = "DESKFOLIO_SESSION_SECRET";

/// Default session lifetime in hours
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 12;

/// The configured admin credential pair
#[derive(Debug, Clone)]
pub struct AdminCredentials {
    username: String,
    password: String,
}

impl AdminCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Result<Self> {
        let username = username.into();
        let password = password.into();
        if username.is_empty() || password.is_empty() {
            return Err(Error::Config(
                "Admin username and password must not be empty".to_string(),
            ));
        }
        Ok(Self { username, password })
    }

    /// Read credentials from the environment.
    pub fn from_env() -> Result<Self> {
        let username = std::env::var(ADMIN_USER_ENV)
            .map_err(|_| Error::Config(format!("{} is not set", ADMIN_USER_ENV)))?;
        let password = std::env::var(ADMIN_PASS_ENV)
            .map_err(|_| Error::Config(format!("{} is not set", ADMIN_PASS_ENV)))?;
        Self::new(username, password)
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

/// A freshly issued session
#[derive(Debug, Clone)]
pub struct SessionToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Verifies admin logins and session tokens.
pub struct AdminGate {
    credentials: AdminCredentials,
    secret: Vec<u8>,
    ttl: Duration,
}

impl AdminGate {
    pub fn new(credentials: AdminCredentials, secret: Vec<u8>, ttl_hours: i64) -> Self {
        Self {
            credentials,
            secret,
            ttl: Duration::hours(ttl_hours.max(1)),
        }
    }

    /// Build a gate from environment credentials.
    ///
    /// The signing secret is `DESKFOLIO_SESSION_SECRET` when set; otherwise
    /// one is derived from the credential pair, which keeps tokens valid
    /// across restarts as long as the credentials do not change.
    pub fn from_env(ttl_hours: i64) -> Result<Self> {
        let credentials = AdminCredentials::from_env()?;
        let secret = resolve_session_secret(&credentials);
        Ok(Self::new(credentials, secret, ttl_hours))
    }

    /// Check a credential pair and issue a session token on success.
    ///
    /// Both fields must match exactly; any mismatch is [`Error::AuthFailed`].
    pub fn login(&self, username: &str, password: &str) -> Result<SessionToken> {
        if username != self.credentials.username || password != self.credentials.password {
            warn!(username = %username, "Rejected admin login");
            return Err(Error::AuthFailed);
        }

        let now = Utc::now();
        let expires_at = now + self.ttl;
        let claims = SessionClaims {
            subject: username.to_string(),
            issued_at: now.timestamp(),
            expires_at: expires_at.timestamp(),
        };
        let token = issue_token(&claims, &self.secret)?;
        info!(username = %username, expires_at = %expires_at, "Issued admin session");
        Ok(SessionToken { token, expires_at })
    }

    /// Verify a bearer token presented with a mutating request.
    pub fn verify(&self, token: &str) -> Result<SessionClaims> {
        verify_token(token, &self.secret, Utc::now().timestamp())
    }
}

/// Resolve the token-signing secret for a credential pair.
pub fn resolve_session_secret(credentials: &AdminCredentials) -> Vec<u8> {
    if let Ok(secret) = std::env::var(SESSION_SECRET_ENV) {
        if !secret.is_empty() {
            return secret.into_bytes();
        }
    }
    let mut hasher = Sha256::new();
    hasher.update(b"deskfolio-session:");
    hasher.update(credentials.username.as_bytes());
    hasher.update(b":");
    hasher.update(credentials.password.as_bytes());
    hasher.finalize().to_vec()
}

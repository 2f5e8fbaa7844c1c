//! Session tokens for the reference backend.
//!
//! Tokens are signed with HMAC-SHA256 and carry an issue timestamp for
//! expiration checking.
//!
//! ## Token Format
//!
//! - 16 bytes: user id
//! - 8 bytes: issue timestamp (Unix millis, big-endian)
//! - 32 bytes: HMAC-SHA256 signature over the first 24 bytes
//!
//! Total: 56 bytes.

use crate::error::{BackendError, BackendResult};
use hmac::{Hmac, Mac};
use linkshelf_protocol::OwnerId;
use sha2::Sha256;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

type HmacSha256 = Hmac<Sha256>;

/// Length of an encoded session token.
pub const TOKEN_LEN: usize = 56;

const SIGNED_LEN: usize = 24;

/// Authentication configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Secret key for HMAC.
    pub secret: Vec<u8>,
    /// Token expiration duration.
    pub token_expiry: Duration,
}

impl AuthConfig {
    /// Creates a new auth configuration.
    pub fn new(secret: Vec<u8>) -> Self {
        Self {
            secret,
            token_expiry: Duration::from_secs(60 * 60),
        }
    }

    /// Sets the token expiration duration.
    pub fn with_expiry(mut self, expiry: Duration) -> Self {
        self.token_expiry = expiry;
        self
    }
}

/// Issues and checks session tokens.
#[derive(Clone)]
pub struct TokenValidator {
    config: AuthConfig,
}

impl TokenValidator {
    /// Creates a new token validator.
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// Creates a session token for a user.
    pub fn create_token(&self, user: OwnerId) -> BackendResult<Vec<u8>> {
        let mut data = Vec::with_capacity(TOKEN_LEN);
        data.extend_from_slice(user.as_bytes());
        data.extend_from_slice(&now_millis().to_be_bytes());

        let signature = self.sign(&data)?;
        data.extend_from_slice(&signature);
        Ok(data)
    }

    /// Validates a token and returns the user it was issued to.
    pub fn validate_token(&self, token: &[u8]) -> BackendResult<OwnerId> {
        if token.len() != TOKEN_LEN {
            return Err(BackendError::AuthenticationFailed(
                "invalid token length".into(),
            ));
        }

        let (signed, signature) = token.split_at(SIGNED_LEN);
        let expected = self.sign(signed)?;
        if signature != expected.as_slice() {
            return Err(BackendError::AuthenticationFailed(
                "invalid signature".into(),
            ));
        }

        let mut user = [0u8; 16];
        user.copy_from_slice(&signed[..16]);
        let mut issued = [0u8; 8];
        issued.copy_from_slice(&signed[16..]);

        let issued_at = u64::from_be_bytes(issued);
        let expiry_millis = self.config.token_expiry.as_millis() as u64;
        if now_millis() > issued_at.saturating_add(expiry_millis) {
            return Err(BackendError::AuthenticationFailed("token expired".into()));
        }

        Ok(OwnerId::from_bytes(user))
    }

    /// Signs data with HMAC-SHA256.
    fn sign(&self, data: &[u8]) -> BackendResult<Vec<u8>> {
        let mut mac = HmacSha256::new_from_slice(&self.config.secret)
            .map_err(|e| BackendError::Internal(e.to_string()))?;
        mac.update(data);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

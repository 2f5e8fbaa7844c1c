//! Backend configuration.

use std::time::Duration;

/// Configuration for the reference backend.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Secret key for session token signing.
    pub auth_secret: Vec<u8>,
    /// How long an issued session token stays valid.
    pub session_ttl: Duration,
}

impl BackendConfig {
    /// Creates a configuration with the given signing secret.
    pub fn new(auth_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            auth_secret: auth_secret.into(),
            session_ttl: Duration::from_secs(60 * 60), // 1 hour
        }
    }

    /// Sets the session lifetime.
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::new(b"linkshelf-development-secret-key".to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder() {
        let config = BackendConfig::new(b"secret".to_vec())
            .with_session_ttl(Duration::from_secs(5));

        assert_eq!(config.auth_secret, b"secret".to_vec());
        assert_eq!(config.session_ttl, Duration::from_secs(5));
    }

    #[test]
    fn default_has_secret() {
        assert!(!BackendConfig::default().auth_secret.is_empty());
    }
}

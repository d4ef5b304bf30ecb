//! Configuration Builder
//!
//! Fluent builder for token manager configuration.

use secrecy::SecretString;

use crate::manager::{TokenConfig, DEFAULT_MAX_ATTEMPTS, DEFAULT_TOKEN_LENGTH};

/// Token configuration builder.
pub struct TokenConfigBuilder {
    length: usize,
    salt: Option<SecretString>,
    max_attempts: u32,
}

impl TokenConfigBuilder {
    /// Create new configuration builder with defaults.
    pub fn new() -> Self {
        Self {
            length: DEFAULT_TOKEN_LENGTH,
            salt: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Set generated token text length.
    pub fn length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }

    /// Set the salt prefixed to raw text before transformation.
    pub fn salt(mut self, salt: impl Into<String>) -> Self {
        self.salt = Some(SecretString::new(salt.into()));
        self
    }

    /// Set the bound on collision re-draws during generation.
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Build the configuration.
    ///
    /// Range checks happen when the configuration is handed to a manager,
    /// alongside transform resolution.
    pub fn build(self) -> TokenConfig {
        TokenConfig {
            length: self.length,
            salt: self.salt,
            max_attempts: self.max_attempts,
        }
    }
}

impl Default for TokenConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a token configuration builder.
pub fn token_config() -> TokenConfigBuilder {
    TokenConfigBuilder::new()
}

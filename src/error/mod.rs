//! Token Error Types
//!
//! Error hierarchy for token issuance, lookup, and revocation.

use thiserror::Error;

/// Root error type for token operations.
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl TokenError {
    /// Get error code for telemetry.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "TOKEN_CONFIG",
            Self::Generation(_) => "TOKEN_GENERATION",
            Self::Validation(_) => "TOKEN_VALIDATION",
            Self::Storage(_) => "TOKEN_STORAGE",
        }
    }

    /// Check if the error was raised before any store interaction.
    pub fn is_pre_storage(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::Validation(_))
    }
}

/// Construction-time configuration error.
///
/// Raised eagerly when a `TokenManager` is built, never deferred to first use.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Hash method not supported: {method}")]
    UnsupportedMethod { method: String },

    #[error("Token length must be at least 1, got {length}")]
    InvalidLength { length: usize },

    #[error("Generation attempt bound must be at least 1")]
    InvalidAttemptBound,
}

/// Token text generation error.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("No collision-free token text found after {attempts} attempts")]
    ExhaustedKeyspace { attempts: u32 },
}

/// Input validation error.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Scope value must not contain the scope delimiter: {scope:?}")]
    ScopeContainsDelimiter { scope: String },
}

/// Storage error reported by the store collaborator.
///
/// Propagated unchanged to the caller; the core never retries or swallows
/// storage failures.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Read failed: {message}")]
    ReadFailed { message: String },

    #[error("Write failed: {message}")]
    WriteFailed { message: String },

    #[error("Remove failed: {message}")]
    RemoveFailed { message: String },
}

/// Result type for token operations.
pub type TokenResult<T> = Result<T, TokenError>;

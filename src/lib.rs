//! Bearer Token Integration Module
//!
//! Issues, validates, and revokes opaque bearer tokens bound to an identity,
//! an ordered scope list, and an expiration instant. Persistence is delegated
//! to a pluggable [`TokenStore`] collaborator; the manager derives the storage
//! key by applying a configurable one-way transform (optionally salted) to the
//! token text, so the raw text is never persisted.
//!
//! # Features
//!
//! - Collision-free random token text generation with a bounded re-draw loop
//! - Named one-way transforms (plain, md5, sha1, sha256, sha384, sha512) plus
//!   caller-supplied custom transforms
//! - Optional salt to namespace keys across differently configured managers
//! - Lazy expiry: expired tokens are evicted when read and reported as absent
//! - Idempotent revocation
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use bearer_token_integration::{
//!     token_config, InMemoryTokenStore, TokenManager,
//! };
//! use chrono::{Duration, Utc};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(InMemoryTokenStore::new());
//!     let manager = TokenManager::new(
//!         store,
//!         "sha256",
//!         token_config().salt("my-salt").build(),
//!     )?;
//!
//!     let scopes = vec!["user.read".to_string(), "user.write".to_string()];
//!     let token = manager
//!         .create("user-1", &scopes, Utc::now() + Duration::hours(1))
//!         .await?;
//!
//!     // The raw text is the bearer credential; only its transform is stored.
//!     let info = manager.get(&token).await?.expect("token is live");
//!     println!("linked id: {}, scopes: {:?}", info.linked_id, info.scopes);
//!
//!     manager.revoke(&token).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `hash`: named transform registry and the custom-transform strategy
//! - `types`: record and lookup shapes, scope join/split
//! - `store`: storage collaborator trait plus in-memory and mock stores
//! - `manager`: token lifecycle (create/get/revoke) over a store
//! - `builders`: fluent configuration builder
//! - `error`: error hierarchy

pub mod builders;
pub mod error;
pub mod hash;
pub mod manager;
pub mod store;
pub mod types;

// Re-export builders
pub use builders::{token_config, TokenConfigBuilder};

// Re-export errors
pub use error::{
    ConfigurationError, GenerationError, StorageError, TokenError, TokenResult, ValidationError,
};

// Re-export transforms
pub use hash::{HashMethod, KeyTransform, TransformFn};

// Re-export manager
pub use manager::{TokenConfig, TokenManager, DEFAULT_MAX_ATTEMPTS, DEFAULT_TOKEN_LENGTH};

// Re-export storage
pub use store::{
    create_in_memory_token_store, create_mock_token_store, InMemoryTokenStore, MockTokenStore,
    TokenStore,
};

// Re-export types
pub use types::{join_scopes, split_scopes, TokenInfo, TokenRecord, SCOPE_DELIMITER};

//! Token Manager
//!
//! Issues, validates, and revokes opaque bearer tokens against a pluggable
//! [`TokenStore`]. Raw token text is transformed (optionally salted) before
//! any store interaction; only the raw text and expiration ever leave this
//! module.

use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{ConfigurationError, GenerationError, TokenResult, ValidationError};
use crate::hash::KeyTransform;
use crate::store::TokenStore;
use crate::types::{join_scopes, TokenInfo, TokenRecord, SCOPE_DELIMITER};

/// Default generated token text length.
pub const DEFAULT_TOKEN_LENGTH: usize = 32;

/// Default bound on collision re-draws during generation.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Token manager configuration.
///
/// Fixed for the lifetime of a manager. Changing `salt` between managers
/// sharing a store orphans previously issued tokens, since lookups recompute
/// different keys; `length` only affects newly generated text.
#[derive(Clone)]
pub struct TokenConfig {
    /// Generated token text length (default 32).
    pub length: usize,
    /// Optional salt prefixed to raw text before transformation.
    pub salt: Option<SecretString>,
    /// Bound on collision re-draws before giving up (default 10).
    pub max_attempts: u32,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            length: DEFAULT_TOKEN_LENGTH,
            salt: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl TokenConfig {
    fn validate(&self) -> Result<(), ConfigurationError> {
        if self.length == 0 {
            return Err(ConfigurationError::InvalidLength {
                length: self.length,
            });
        }
        if self.max_attempts == 0 {
            return Err(ConfigurationError::InvalidAttemptBound);
        }
        Ok(())
    }
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("length", &self.length)
            .field("salt", &self.salt.as_ref().map(|_| "[REDACTED]"))
            .field("max_attempts", &self.max_attempts)
            .finish()
    }
}

/// Opaque bearer token manager.
///
/// Holds no state beyond its immutable configuration; safe to share across
/// concurrent callers. Uniqueness of generated text is probabilistic and
/// advisory: two racing `create` calls can both pass the collision check
/// before either writes. Atomic uniqueness, if required, is the store's
/// responsibility (e.g. a unique-key constraint).
pub struct TokenManager<S: TokenStore> {
    store: Arc<S>,
    transform: KeyTransform,
    config: TokenConfig,
}

impl<S: TokenStore> TokenManager<S> {
    /// Create a manager using a named transform from the registry.
    ///
    /// Fails fast with `UnsupportedMethod` for an unknown name — before any
    /// store interaction, never on first token issuance.
    pub fn new(store: Arc<S>, method: &str, config: TokenConfig) -> TokenResult<Self> {
        let transform = KeyTransform::by_name(method)?;
        Self::with_key_transform(store, transform, config)
    }

    /// Create a manager using a caller-supplied transform function.
    pub fn with_transform<F>(store: Arc<S>, transform: F, config: TokenConfig) -> TokenResult<Self>
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self::with_key_transform(store, KeyTransform::custom(transform), config)
    }

    /// Create a manager from an already resolved transform.
    pub fn with_key_transform(
        store: Arc<S>,
        transform: KeyTransform,
        config: TokenConfig,
    ) -> TokenResult<Self> {
        config.validate()?;
        Ok(Self {
            store,
            transform,
            config,
        })
    }

    /// The manager's configuration.
    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    /// Derive the storage key for raw token text.
    ///
    /// Applied identically on write, read, and remove; any asymmetry here
    /// would make issued tokens permanently unretrievable.
    fn storage_key(&self, raw_text: &str) -> String {
        match &self.config.salt {
            Some(salt) => self
                .transform
                .apply(&format!("{}{}", salt.expose_secret(), raw_text)),
            None => self.transform.apply(raw_text),
        }
    }

    fn random_text(&self) -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(self.config.length)
            .map(char::from)
            .collect()
    }

    /// Draw candidate token text until one has no live record, bounded by
    /// `max_attempts`.
    ///
    /// The collision check runs through the public `get` path, which applies
    /// the transform itself and lazily evicts an expired record occupying the
    /// candidate's key.
    async fn generate_token_text(&self) -> TokenResult<String> {
        for attempt in 0..self.config.max_attempts {
            let candidate = self.random_text();
            if self.get(&candidate).await?.is_none() {
                return Ok(candidate);
            }
            debug!(attempt, "generated token text collided, redrawing");
        }

        warn!(
            attempts = self.config.max_attempts,
            length = self.config.length,
            "keyspace exhausted while generating token text"
        );
        Err(GenerationError::ExhaustedKeyspace {
            attempts: self.config.max_attempts,
        }
        .into())
    }

    /// Issue a token bound to `linked_id` with the given scopes and expiry.
    ///
    /// Returns the raw token text — the only moment it is observable outside
    /// the store's write path. The store persists the transformed key, never
    /// the raw text. Store failures propagate unchanged; no retries here.
    pub async fn create(
        &self,
        linked_id: &str,
        scopes: &[String],
        expires_at: DateTime<Utc>,
    ) -> TokenResult<String> {
        if let Some(scope) = scopes.iter().find(|s| s.contains(SCOPE_DELIMITER)) {
            return Err(ValidationError::ScopeContainsDelimiter {
                scope: scope.clone(),
            }
            .into());
        }

        let token_text = self.generate_token_text().await?;
        let record = TokenRecord {
            token: self.storage_key(&token_text),
            expires_at,
            linked_id: linked_id.to_string(),
            scopes: join_scopes(scopes),
        };

        self.store.write(record).await?;
        debug!(linked_id, %expires_at, scope_count = scopes.len(), "token issued");

        Ok(token_text)
    }

    /// Look up a token by its raw text.
    ///
    /// A miss yields `Ok(None)`, not an error; an expired record is removed
    /// as a side effect and also yields `Ok(None)`, indistinguishable from a
    /// token that never existed. This lazy eviction is the only eviction
    /// mechanism.
    pub async fn get(&self, token: &str) -> TokenResult<Option<TokenInfo>> {
        let key = self.storage_key(token);
        let record = match self.store.read(&key).await? {
            Some(record) => record,
            None => return Ok(None),
        };

        if record.is_expired_at(Utc::now()) {
            debug!(linked_id = %record.linked_id, "expired token evicted on read");
            self.revoke(token).await?;
            return Ok(None);
        }

        Ok(Some(TokenInfo::from(record)))
    }

    /// Revoke a token by its raw text.
    ///
    /// Idempotent: revoking an absent or already revoked token succeeds.
    pub async fn revoke(&self, token: &str) -> TokenResult<()> {
        let key = self.storage_key(token);
        self.store.remove(&key).await?;
        debug!("token revoked");
        Ok(())
    }
}

impl<S: TokenStore> fmt::Debug for TokenManager<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenManager")
            .field("transform", &self.transform)
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{StorageError, TokenError};
    use crate::hash::HashMethod;
    use crate::store::{InMemoryTokenStore, MockTokenStore};
    use async_trait::async_trait;
    use chrono::Duration;
    use std::sync::Mutex;

    fn test_scopes() -> Vec<String> {
        vec!["user.read".to_string(), "user.write".to_string()]
    }

    fn future_expiry() -> DateTime<Utc> {
        Utc::now() + Duration::hours(1)
    }

    fn salted_config() -> TokenConfig {
        TokenConfig {
            salt: Some(SecretString::new("test_salt".to_string())),
            ..Default::default()
        }
    }

    fn is_alphanumeric_of_length(text: &str, length: usize) -> bool {
        text.len() == length && text.chars().all(|c| c.is_ascii_alphanumeric())
    }

    /// Store whose reads report a live record for the first `colliding_reads`
    /// calls, simulating generated text colliding with live tokens.
    struct CollidingStore {
        colliding_reads: u32,
        reads: Mutex<u32>,
    }

    impl CollidingStore {
        fn new(colliding_reads: u32) -> Self {
            Self {
                colliding_reads,
                reads: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl TokenStore for CollidingStore {
        async fn write(&self, _record: TokenRecord) -> Result<(), StorageError> {
            Ok(())
        }

        async fn read(&self, key: &str) -> Result<Option<TokenRecord>, StorageError> {
            let mut reads = self.reads.lock().unwrap();
            *reads += 1;
            if *reads <= self.colliding_reads {
                Ok(Some(TokenRecord {
                    token: key.to_string(),
                    expires_at: Utc::now() + Duration::hours(1),
                    linked_id: "occupant".to_string(),
                    scopes: "user.read".to_string(),
                }))
            } else {
                Ok(None)
            }
        }

        async fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Ok(())
        }
    }

    #[test]
    fn test_unsupported_method_fails_before_store_interaction() {
        let store = Arc::new(MockTokenStore::new());
        let result = TokenManager::new(store.clone(), "not_supported", TokenConfig::default());

        assert!(matches!(
            result.unwrap_err(),
            TokenError::Configuration(ConfigurationError::UnsupportedMethod { ref method })
                if method == "not_supported"
        ));
        assert!(store.get_read_history().is_empty());
        assert!(store.get_write_history().is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let store = Arc::new(InMemoryTokenStore::new());

        let zero_length = TokenConfig {
            length: 0,
            ..Default::default()
        };
        assert!(matches!(
            TokenManager::new(store.clone(), "plain", zero_length).unwrap_err(),
            TokenError::Configuration(ConfigurationError::InvalidLength { length: 0 })
        ));

        let zero_attempts = TokenConfig {
            max_attempts: 0,
            ..Default::default()
        };
        assert!(matches!(
            TokenManager::new(store, "plain", zero_attempts).unwrap_err(),
            TokenError::Configuration(ConfigurationError::InvalidAttemptBound)
        ));
    }

    #[tokio::test]
    async fn test_create_returns_alphanumeric_text_of_configured_length() {
        let store = Arc::new(InMemoryTokenStore::new());
        let manager = TokenManager::new(store, "sha256", TokenConfig::default()).unwrap();

        let token = manager
            .create("user-1", &test_scopes(), future_expiry())
            .await
            .unwrap();
        assert!(is_alphanumeric_of_length(&token, DEFAULT_TOKEN_LENGTH));

        let store = Arc::new(InMemoryTokenStore::new());
        let config = TokenConfig {
            length: 16,
            ..Default::default()
        };
        let manager = TokenManager::new(store, "sha256", config).unwrap();
        let token = manager
            .create("user-1", &test_scopes(), future_expiry())
            .await
            .unwrap();
        assert!(is_alphanumeric_of_length(&token, 16));
    }

    #[tokio::test]
    async fn test_create_then_get_round_trip() {
        let store = Arc::new(InMemoryTokenStore::new());
        let manager = TokenManager::new(store, "sha256", TokenConfig::default()).unwrap();
        let expires_at = future_expiry();

        let token = manager
            .create("user-1", &test_scopes(), expires_at)
            .await
            .unwrap();

        let info = manager.get(&token).await.unwrap().unwrap();
        assert_eq!(
            info,
            TokenInfo {
                expires_at,
                linked_id: "user-1".to_string(),
                scopes: test_scopes(),
            }
        );
    }

    #[tokio::test]
    async fn test_raw_text_is_never_persisted() {
        let store = Arc::new(MockTokenStore::new());
        let manager = TokenManager::new(store.clone(), "sha256", TokenConfig::default()).unwrap();

        let token = manager
            .create("user-1", &test_scopes(), future_expiry())
            .await
            .unwrap();

        let written = store.get_write_history();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].token, HashMethod::Sha256.digest(&token));
        assert_ne!(written[0].token, token);
        assert_eq!(written[0].scopes, "user.read,user.write");
    }

    #[tokio::test]
    async fn test_get_miss_is_not_an_error() {
        let store = Arc::new(InMemoryTokenStore::new());
        let manager = TokenManager::new(store, "sha256", TokenConfig::default()).unwrap();

        let info = manager.get("neverIssuedTokenText0000000000000").await.unwrap();
        assert!(info.is_none());
    }

    #[tokio::test]
    async fn test_expired_token_is_evicted_on_read() {
        let store = Arc::new(InMemoryTokenStore::new());
        // plain + no salt, so the storage key equals the raw token text.
        let manager =
            TokenManager::new(store.clone(), "plain", TokenConfig::default()).unwrap();

        let token = manager
            .create("user-1", &test_scopes(), Utc::now() - Duration::hours(1))
            .await
            .unwrap();
        assert!(store.read(&token).await.unwrap().is_some());

        assert!(manager.get(&token).await.unwrap().is_none());
        // Lazy eviction: the read deleted the expired record.
        assert!(store.read(&token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_revoke_is_idempotent() {
        let store = Arc::new(InMemoryTokenStore::new());
        let manager = TokenManager::new(store, "md5", TokenConfig::default()).unwrap();

        let token = manager
            .create("user-1", &test_scopes(), future_expiry())
            .await
            .unwrap();
        assert!(manager.get(&token).await.unwrap().is_some());

        manager.revoke(&token).await.unwrap();
        assert!(manager.get(&token).await.unwrap().is_none());

        // Double revoke and revoke of a token never issued both succeed.
        manager.revoke(&token).await.unwrap();
        manager.revoke("neverIssuedTokenText0000000000000").await.unwrap();
    }

    #[tokio::test]
    async fn test_salt_prefixes_raw_text_before_transform() {
        let store = Arc::new(InMemoryTokenStore::new());
        let manager = TokenManager::new(store.clone(), "sha256", salted_config()).unwrap();

        let token = manager
            .create("user-1", &test_scopes(), future_expiry())
            .await
            .unwrap();

        let salted_key = HashMethod::Sha256.digest(&format!("test_salt{}", token));
        assert!(store.read(&salted_key).await.unwrap().is_some());

        let unsalted_key = HashMethod::Sha256.digest(&token);
        assert!(store.read(&unsalted_key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_salted_and_unsalted_managers_do_not_see_each_other() {
        let store = Arc::new(InMemoryTokenStore::new());
        let salted =
            TokenManager::new(store.clone(), "sha256", salted_config()).unwrap();
        let unsalted =
            TokenManager::new(store.clone(), "sha256", TokenConfig::default()).unwrap();

        let from_salted = salted
            .create("user-1", &test_scopes(), future_expiry())
            .await
            .unwrap();
        let from_unsalted = unsalted
            .create("user-2", &test_scopes(), future_expiry())
            .await
            .unwrap();

        assert!(unsalted.get(&from_salted).await.unwrap().is_none());
        assert!(salted.get(&from_unsalted).await.unwrap().is_none());
        assert!(salted.get(&from_salted).await.unwrap().is_some());
        assert!(unsalted.get(&from_unsalted).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_custom_transform_end_to_end() {
        let store = Arc::new(InMemoryTokenStore::new());
        let manager = TokenManager::with_transform(
            store.clone(),
            |text| HashMethod::Md5.digest(&HashMethod::Sha256.digest(text)),
            TokenConfig::default(),
        )
        .unwrap();

        let token = manager
            .create("user-1", &test_scopes(), future_expiry())
            .await
            .unwrap();

        let expected_key = HashMethod::Md5.digest(&HashMethod::Sha256.digest(&token));
        assert!(store.read(&expected_key).await.unwrap().is_some());

        let info = manager.get(&token).await.unwrap().unwrap();
        assert_eq!(info.linked_id, "user-1");
        assert_eq!(info.scopes, test_scopes());

        manager.revoke(&token).await.unwrap();
        assert!(manager.get(&token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_custom_transform_with_salt() {
        let store = Arc::new(InMemoryTokenStore::new());
        let manager = TokenManager::with_transform(
            store.clone(),
            |text| HashMethod::Md5.digest(&HashMethod::Sha256.digest(text)),
            salted_config(),
        )
        .unwrap();

        let token = manager
            .create("user-1", &test_scopes(), future_expiry())
            .await
            .unwrap();

        let expected_key =
            HashMethod::Md5.digest(&HashMethod::Sha256.digest(&format!("test_salt{}", token)));
        assert!(store.read(&expected_key).await.unwrap().is_some());
        assert!(manager.get(&token).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_collision_triggers_redraw() {
        let store = Arc::new(CollidingStore::new(2));
        let manager = TokenManager::new(store.clone(), "sha256", TokenConfig::default()).unwrap();

        let token = manager
            .create("user-1", &test_scopes(), future_expiry())
            .await
            .unwrap();
        assert!(is_alphanumeric_of_length(&token, DEFAULT_TOKEN_LENGTH));
        // Two colliding reads plus the accepted third draw.
        assert_eq!(*store.reads.lock().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_exhausted_keyspace_after_attempt_bound() {
        let store = Arc::new(CollidingStore::new(u32::MAX));
        let config = TokenConfig {
            max_attempts: 3,
            ..Default::default()
        };
        let manager = TokenManager::new(store.clone(), "sha256", config).unwrap();

        let error = manager
            .create("user-1", &test_scopes(), future_expiry())
            .await
            .unwrap_err();
        assert!(matches!(
            error,
            TokenError::Generation(GenerationError::ExhaustedKeyspace { attempts: 3 })
        ));
        assert_eq!(*store.reads.lock().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_scope_containing_delimiter_rejected_before_write() {
        let store = Arc::new(MockTokenStore::new());
        let manager = TokenManager::new(store.clone(), "sha256", TokenConfig::default()).unwrap();

        let scopes = vec!["user.read,user.write".to_string()];
        let error = manager
            .create("user-1", &scopes, future_expiry())
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            TokenError::Validation(ValidationError::ScopeContainsDelimiter { .. })
        ));
        assert!(store.get_write_history().is_empty());
        assert!(store.get_read_history().is_empty());
    }

    #[tokio::test]
    async fn test_store_failures_propagate_unchanged() {
        let store = Arc::new(MockTokenStore::new());
        let manager = TokenManager::new(store.clone(), "sha256", TokenConfig::default()).unwrap();

        store.set_should_fail(true);
        let error = manager
            .create("user-1", &test_scopes(), future_expiry())
            .await
            .unwrap_err();
        assert_eq!(error.error_code(), "TOKEN_STORAGE");

        let error = manager.get("someTokenText").await.unwrap_err();
        assert_eq!(error.error_code(), "TOKEN_STORAGE");

        let error = manager.revoke("someTokenText").await.unwrap_err();
        assert_eq!(error.error_code(), "TOKEN_STORAGE");
    }

    #[tokio::test]
    async fn test_empty_scopes_round_trip() {
        let store = Arc::new(InMemoryTokenStore::new());
        let manager = TokenManager::new(store, "sha256", TokenConfig::default()).unwrap();

        let token = manager.create("user-1", &[], future_expiry()).await.unwrap();
        let info = manager.get(&token).await.unwrap().unwrap();
        assert!(info.scopes.is_empty());
    }

    #[test]
    fn test_config_debug_redacts_salt() {
        let debug = format!("{:?}", salted_config());
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("test_salt"));
    }
}

//! Token Types
//!
//! Shapes exchanged with the store collaborator and returned by the public
//! API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Delimiter used to join scopes into a single storage field.
///
/// Individual scope values must not contain this character; `create` rejects
/// them before touching storage.
pub const SCOPE_DELIMITER: char = ',';

/// Record shape persisted by the store collaborator.
///
/// `token` holds the transformed storage key. The raw token text is never
/// part of this record; it only ever travels back to the caller of `create`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenRecord {
    /// Transformed storage key.
    pub token: String,
    /// Expiration instant.
    pub expires_at: DateTime<Utc>,
    /// Identity the token is bound to.
    pub linked_id: String,
    /// Comma-joined scope list.
    pub scopes: String,
}

impl TokenRecord {
    /// Check if the record is expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Token metadata returned by `get`.
///
/// Derived from a [`TokenRecord`] by splitting the scope field; never
/// persisted directly.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TokenInfo {
    /// Expiration instant.
    pub expires_at: DateTime<Utc>,
    /// Identity the token is bound to.
    pub linked_id: String,
    /// Ordered scope list.
    pub scopes: Vec<String>,
}

impl From<TokenRecord> for TokenInfo {
    fn from(record: TokenRecord) -> Self {
        Self {
            expires_at: record.expires_at,
            linked_id: record.linked_id,
            scopes: split_scopes(&record.scopes),
        }
    }
}

/// Join an ordered scope list into the storage field.
pub fn join_scopes(scopes: &[String]) -> String {
    scopes.join(&SCOPE_DELIMITER.to_string())
}

/// Split a storage field back into an ordered scope list.
///
/// An empty field yields an empty list, not a single empty scope.
pub fn split_scopes(field: &str) -> Vec<String> {
    if field.is_empty() {
        return Vec::new();
    }
    field.split(SCOPE_DELIMITER).map(String::from).collect()
}

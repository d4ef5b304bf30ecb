//! Hash Method Registry
//!
//! Named one-way text transforms used to derive storage keys from raw token
//! text. The registry is a closed, process-wide table; callers needing
//! anything else supply their own function through [`KeyTransform::Custom`].

use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};
use std::fmt;
use std::sync::Arc;

use crate::error::ConfigurationError;

/// Built-in one-way transforms, addressable by well-known name.
///
/// Every method is deterministic and pure: same input, same output, no I/O.
/// All digest outputs are lowercase hexadecimal; `Plain` is the identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashMethod {
    /// Identity transform (stores the text as-is).
    Plain,
    /// MD5 digest.
    Md5,
    /// SHA-1 digest.
    Sha1,
    /// SHA-256 digest.
    Sha256,
    /// SHA-384 digest.
    Sha384,
    /// SHA-512 digest.
    Sha512,
}

impl HashMethod {
    /// All supported methods.
    pub const ALL: [HashMethod; 6] = [
        HashMethod::Plain,
        HashMethod::Md5,
        HashMethod::Sha1,
        HashMethod::Sha256,
        HashMethod::Sha384,
        HashMethod::Sha512,
    ];

    /// Returns the registry name.
    pub fn name(&self) -> &'static str {
        match self {
            HashMethod::Plain => "plain",
            HashMethod::Md5 => "md5",
            HashMethod::Sha1 => "sha1",
            HashMethod::Sha256 => "sha256",
            HashMethod::Sha384 => "sha384",
            HashMethod::Sha512 => "sha512",
        }
    }

    /// Parses from a registry name (case-insensitive).
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "plain" => Some(HashMethod::Plain),
            "md5" => Some(HashMethod::Md5),
            "sha1" => Some(HashMethod::Sha1),
            "sha256" => Some(HashMethod::Sha256),
            "sha384" => Some(HashMethod::Sha384),
            "sha512" => Some(HashMethod::Sha512),
            _ => None,
        }
    }

    /// Apply the transform to `text`.
    pub fn digest(&self, text: &str) -> String {
        match self {
            HashMethod::Plain => text.to_string(),
            HashMethod::Md5 => hex::encode(Md5::digest(text.as_bytes())),
            HashMethod::Sha1 => hex::encode(Sha1::digest(text.as_bytes())),
            HashMethod::Sha256 => hex::encode(Sha256::digest(text.as_bytes())),
            HashMethod::Sha384 => hex::encode(Sha384::digest(text.as_bytes())),
            HashMethod::Sha512 => hex::encode(Sha512::digest(text.as_bytes())),
        }
    }
}

impl fmt::Display for HashMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Caller-supplied transform function.
pub type TransformFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// The transform a token manager applies before touching storage.
///
/// Either a built-in [`HashMethod`] resolved from the registry, or an
/// arbitrary caller-supplied function of the same shape. Custom functions
/// bypass the registry and receive no validation beyond their signature.
#[derive(Clone)]
pub enum KeyTransform {
    /// A registry method.
    Method(HashMethod),
    /// A caller-supplied function.
    Custom(TransformFn),
}

impl KeyTransform {
    /// Resolve a transform from a registry name.
    ///
    /// Fails with [`ConfigurationError::UnsupportedMethod`] for names the
    /// registry does not know. Lookup is case-insensitive.
    pub fn by_name(name: &str) -> Result<Self, ConfigurationError> {
        HashMethod::from_name(name)
            .map(KeyTransform::Method)
            .ok_or_else(|| ConfigurationError::UnsupportedMethod {
                method: name.to_string(),
            })
    }

    /// Wrap a caller-supplied function.
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        KeyTransform::Custom(Arc::new(f))
    }

    /// Apply the transform to `text`.
    pub fn apply(&self, text: &str) -> String {
        match self {
            KeyTransform::Method(method) => method.digest(text),
            KeyTransform::Custom(f) => f(text),
        }
    }
}

impl From<HashMethod> for KeyTransform {
    fn from(method: HashMethod) -> Self {
        KeyTransform::Method(method)
    }
}

impl fmt::Debug for KeyTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyTransform::Method(method) => f.debug_tuple("Method").field(method).finish(),
            KeyTransform::Custom(_) => f.debug_tuple("Custom").field(&"<fn>").finish(),
        }
    }
}

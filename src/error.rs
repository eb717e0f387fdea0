//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

use crate::config::EvictionPolicy;

// == Cache Error Enum ==
/// Unified error type for cache operations.
///
/// Both variants are caller-recoverable: a failing call leaves the
/// cache unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// A `set` under the LRA policy hit a key that is already present
    #[error("Key already exists: {0}")]
    DuplicateKey(String),

    /// A `set_state` was given a snapshot taken under a different policy
    #[error("Incompatible state policy: expected {expected}, found {found}")]
    PolicyMismatch {
        expected: EvictionPolicy,
        found: EvictionPolicy,
    },
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

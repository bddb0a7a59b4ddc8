//! Error types for the cache primitives
//!
//! Provides unified error handling using thiserror. Errors are only raised
//! while building a cache; lookups report absence through `Option`.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for cache construction and configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CacheError {
    /// Capacity is zero, or a bucket count is not a power of two
    #[error("Invalid capacity: {0}")]
    InvalidCapacity(String),

    /// Load factor is not a finite positive number
    #[error("Invalid load factor: {0}")]
    InvalidLoadFactor(String),

    /// Configuration could not be parsed or is inconsistent
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

// == Result Type Alias ==
/// Convenience Result type for the cache primitives.
pub type Result<T> = std::result::Result<T, CacheError>;

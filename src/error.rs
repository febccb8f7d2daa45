use crate::id::ResourceId;

use std::fmt;

/// Errors that can occur when building a cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
  /// The recent-lookup accelerator was configured with a capacity of zero.
  ZeroRecentCapacity,
  /// The unload timeout does not exceed the inactive timeout, which would
  /// make records fall straight through the aging tier.
  TimeoutOrdering,
  /// The device could not produce the error-fallback resource. This is the
  /// one device failure that is not swallowed: without a fallback the cache
  /// cannot honor its non-failing lookup contract.
  Fallback(String),
}

impl fmt::Display for BuildError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      BuildError::ZeroRecentCapacity => {
        write!(f, "recent-lookup accelerator capacity cannot be zero")
      }
      BuildError::TimeoutOrdering => {
        write!(f, "unload timeout must be greater than the inactive timeout")
      }
      BuildError::Fallback(reason) => {
        write!(f, "error-fallback resource creation failed: {reason}")
      }
    }
  }
}

impl std::error::Error for BuildError {}

/// Errors surfaced by cache operations.
///
/// Lookups never return an error (they degrade to the fallback resource),
/// so this covers only the registration surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
  /// A volatile resource was registered under an id already present in the
  /// volatile table. Ids are meant to be allocated fresh per use, so this
  /// points at an id-allocation bug in the caller.
  DuplicateVolatileId(ResourceId),
}

impl fmt::Display for CacheError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      CacheError::DuplicateVolatileId(id) => {
        write!(f, "volatile resource id {id} is already registered")
      }
    }
  }
}

impl std::error::Error for CacheError {}

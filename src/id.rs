use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// A process-unique identifier for a cached resource.
///
/// Ids are handed out by an [`IdAllocator`] and are the only lookup key the
/// cache understands. Two records with the same id are an invariant
/// violation, which is why there is no public constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceId(u64);

impl ResourceId {
  pub(crate) const fn new(raw: u64) -> Self {
    Self(raw)
  }

  /// Returns the raw integer value of the id.
  #[inline]
  pub const fn value(self) -> u64 {
    self.0
  }
}

impl fmt::Display for ResourceId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// A monotonically increasing id source.
///
/// The allocator is a plain value rather than a process-wide singleton so
/// that embedders decide its scope: share one allocator (behind an `Arc`)
/// between every cache and renderer that mints ids, and collisions cannot
/// happen.
#[derive(Debug)]
pub struct IdAllocator {
  next: AtomicU64,
}

impl IdAllocator {
  /// Creates an allocator whose first id is `1`.
  pub fn new() -> Self {
    Self {
      next: AtomicU64::new(1),
    }
  }

  /// Returns a fresh, never-before-seen id.
  #[inline]
  pub fn allocate(&self) -> ResourceId {
    ResourceId(self.next.fetch_add(1, Ordering::Relaxed))
  }
}

impl Default for IdAllocator {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_ids_are_unique_and_increasing() {
    let ids = IdAllocator::new();
    let a = ids.allocate();
    let b = ids.allocate();
    assert!(b > a);
    assert_ne!(a, b);
  }
}

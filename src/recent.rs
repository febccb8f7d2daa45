use crate::id::ResourceId;
use crate::record::SharedResource;

use std::collections::VecDeque;

/// A small bounded set of recently resolved records, scanned before the
/// tier maps on every lookup.
///
/// The set is advisory, not a strict LRU: a repeat touch does not reorder,
/// so eviction drops the oldest *insertion*, and an entry can go stale when
/// its backing record leaves its tier (volatile expiry invalidates eagerly;
/// demotion does not).
pub(crate) struct RecentLookups<H> {
  capacity: usize,
  entries: VecDeque<SharedResource<H>>,
}

impl<H> RecentLookups<H> {
  pub(crate) fn new(capacity: usize) -> Self {
    Self {
      capacity,
      entries: VecDeque::with_capacity(capacity),
    }
  }

  /// Scans for a record by id.
  pub(crate) fn find(&self, id: ResourceId) -> Option<SharedResource<H>> {
    self
      .entries
      .iter()
      .find(|record| record.id() == id)
      .cloned()
  }

  /// Records a resolved lookup. Already-present entries are left where they
  /// are; at capacity the oldest entry is dropped first.
  pub(crate) fn touch(&mut self, record: &SharedResource<H>) {
    if self.entries.iter().any(|entry| entry.id() == record.id()) {
      return;
    }
    if self.entries.len() >= self.capacity {
      self.entries.pop_front();
    }
    self.entries.push_back(record.clone());
  }

  /// Drops the entry for `id`, if present. Called when a record is removed
  /// from its owning table outright so the accelerator cannot serve it
  /// after eviction.
  pub(crate) fn invalidate(&mut self, id: ResourceId) {
    self.entries.retain(|record| record.id() != id);
  }

  pub(crate) fn clear(&mut self) {
    self.entries.clear();
  }

  pub(crate) fn capacity(&self) -> usize {
    self.capacity
  }

  #[cfg(test)]
  fn ids(&self) -> Vec<ResourceId> {
    self.entries.iter().map(|record| record.id()).collect()
  }
}

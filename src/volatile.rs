use crate::id::ResourceId;
use crate::record::SharedResource;
use crate::tier::RecordMap;

use std::time::Duration;

pub(crate) const VOLATILE_TTL_MS: u64 = 60_000;

/// The fixed idle TTL for volatile (generated) resources.
///
/// Deliberately not configurable: generated resources such as rasterized
/// text are cheap to regenerate and expensive to keep, and every producer
/// shares the same sixty-second budget.
pub const VOLATILE_TTL: Duration = Duration::from_millis(VOLATILE_TTL_MS);

/// The flat table of procedurally generated resources.
///
/// Disjoint from the primary tiers. Entries arrive already loaded and are
/// removed outright, not demoted, the moment their idle time reaches
/// [`VOLATILE_TTL`].
pub(crate) struct VolatileTable<H> {
  entries: RecordMap<H>,
}

impl<H> VolatileTable<H> {
  pub(crate) fn new() -> Self {
    Self {
      entries: RecordMap::default(),
    }
  }

  pub(crate) fn contains(&self, id: ResourceId) -> bool {
    self.entries.contains_key(&id)
  }

  pub(crate) fn get(&self, id: ResourceId) -> Option<&SharedResource<H>> {
    self.entries.get(&id)
  }

  pub(crate) fn insert(&mut self, record: SharedResource<H>) {
    self.entries.insert(record.id(), record);
  }

  pub(crate) fn remove(&mut self, id: ResourceId) -> Option<SharedResource<H>> {
    self.entries.remove(&id)
  }

  pub(crate) fn len(&self) -> usize {
    self.entries.len()
  }

  /// Adds `ms` of idle time to every entry and returns the ids whose idle
  /// time has reached the TTL.
  pub(crate) fn age_and_collect(&self, ms: u64) -> Vec<ResourceId> {
    let mut expired = Vec::new();
    for record in self.entries.values() {
      record.add_idle(ms);
      if record.idle_ms() >= VOLATILE_TTL_MS {
        expired.push(record.id());
      }
    }
    expired
  }

  pub(crate) fn drain(&mut self) -> Vec<SharedResource<H>> {
    self.entries.drain().map(|(_, record)| record).collect()
  }
}

use crate::id::ResourceId;
use crate::record::SharedResource;

use std::collections::HashMap;
use std::fmt;

use ahash::RandomState;

/// The mutually exclusive membership categories a record can belong to.
///
/// A record lives in exactly one tier at any time. `Active`, `Aging` and
/// `Dormant` form the demotion pipeline; `Pinned` entries are inserted once
/// and never migrate; `Volatile` entries live in their own short-TTL table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Tier {
  /// Recently resolved records.
  Active,
  /// Records idle past the inactive timeout; still loaded.
  Aging,
  /// Records idle past the unload timeout; unloaded, kept as metadata.
  Dormant,
  /// Utility records exempt from the aging pipeline.
  Pinned,
  /// Generated records with a fixed idle TTL and no aging step.
  Volatile,
}

/// The tier probe sequence a lookup falls back to after its hint, skipping
/// any tier already probed.
pub(crate) const FALLBACK_PROBE_ORDER: [Tier; 4] =
  [Tier::Active, Tier::Aging, Tier::Pinned, Tier::Dormant];

pub(crate) type RecordMap<H> = HashMap<ResourceId, SharedResource<H>, RandomState>;

/// The four primary tier collections behind one uniform map interface.
///
/// Replaces per-tier storage-and-search duplication with a single keyed
/// abstraction: every operation takes the tier it applies to, and lookup
/// order is expressed by iterating a tier slice.
pub(crate) struct TierMap<H> {
  active: RecordMap<H>,
  aging: RecordMap<H>,
  dormant: RecordMap<H>,
  pinned: RecordMap<H>,
}

impl<H> TierMap<H> {
  pub(crate) fn new() -> Self {
    Self {
      active: RecordMap::default(),
      aging: RecordMap::default(),
      dormant: RecordMap::default(),
      pinned: RecordMap::default(),
    }
  }

  fn map(&self, tier: Tier) -> &RecordMap<H> {
    match tier {
      Tier::Active => &self.active,
      Tier::Aging => &self.aging,
      Tier::Dormant => &self.dormant,
      Tier::Pinned => &self.pinned,
      Tier::Volatile => unreachable!("volatile records are kept in the volatile table"),
    }
  }

  fn map_mut(&mut self, tier: Tier) -> &mut RecordMap<H> {
    match tier {
      Tier::Active => &mut self.active,
      Tier::Aging => &mut self.aging,
      Tier::Dormant => &mut self.dormant,
      Tier::Pinned => &mut self.pinned,
      Tier::Volatile => unreachable!("volatile records are kept in the volatile table"),
    }
  }

  pub(crate) fn get(&self, tier: Tier, id: ResourceId) -> Option<&SharedResource<H>> {
    self.map(tier).get(&id)
  }

  pub(crate) fn insert(&mut self, tier: Tier, record: SharedResource<H>) {
    self.map_mut(tier).insert(record.id(), record);
  }

  pub(crate) fn remove(&mut self, tier: Tier, id: ResourceId) -> Option<SharedResource<H>> {
    self.map_mut(tier).remove(&id)
  }

  /// Finds a record in any primary tier, probing in the fallback order.
  pub(crate) fn find(&self, id: ResourceId) -> Option<(Tier, &SharedResource<H>)> {
    FALLBACK_PROBE_ORDER
      .iter()
      .find_map(|&tier| self.get(tier, id).map(|record| (tier, record)))
  }

  pub(crate) fn len(&self, tier: Tier) -> usize {
    self.map(tier).len()
  }

  /// Adds `ms` of idle time to every record in `tier`.
  pub(crate) fn age(&self, tier: Tier, ms: u64) {
    for record in self.map(tier).values() {
      record.add_idle(ms);
    }
  }

  /// Adds `ms` of idle time to every record in `tier` and returns the ids
  /// whose accumulated idle time now exceeds `threshold_ms`.
  pub(crate) fn age_and_collect(&self, tier: Tier, ms: u64, threshold_ms: u64) -> Vec<ResourceId> {
    let mut expired = Vec::new();
    for record in self.map(tier).values() {
      record.add_idle(ms);
      if record.idle_ms() > threshold_ms {
        expired.push(record.id());
      }
    }
    expired
  }

  /// Removes and returns every record from every primary tier.
  pub(crate) fn drain_all(&mut self) -> Vec<SharedResource<H>> {
    let mut drained = Vec::new();
    for tier in FALLBACK_PROBE_ORDER {
      drained.extend(self.map_mut(tier).drain().map(|(_, record)| record));
    }
    drained
  }
}

impl<H> fmt::Debug for TierMap<H> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("TierMap")
      .field("active", &self.active.len())
      .field("aging", &self.aging.len())
      .field("dormant", &self.dormant.len())
      .field("pinned", &self.pinned.len())
      .finish()
  }
}

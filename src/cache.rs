use crate::device::ResourceDevice;
use crate::id::{IdAllocator, ResourceId};
use crate::metrics::{Metrics, MetricsSnapshot};
use crate::record::{LoadState, ResourceDescriptor, ResourceKind, ResourceRecord, SharedResource};
use crate::recent::RecentLookups;
use crate::tier::{Tier, TierMap, FALLBACK_PROBE_ORDER};
use crate::volatile::VolatileTable;

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use ahash::RandomState;
use parking_lot::Mutex;
use tracing::{debug, warn};

/// Per-tier record counts, for diagnostics overlays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TierCounts {
  pub active: usize,
  pub aging: usize,
  pub dormant: usize,
  pub pinned: usize,
  pub volatile: usize,
  /// Records registered with a deferred load and not yet warmed up.
  pub pending: usize,
}

/// The mutable cache state, serialized behind one mutex per instance.
struct CacheCore<H> {
  tiers: TierMap<H>,
  recent: RecentLookups<H>,
  volatile: VolatileTable<H>,
  /// Ids registered with `load_now = false`, waiting for a warm-up pass.
  pending: HashSet<ResourceId, RandomState>,
  inactive_timeout_ms: u64,
  unload_timeout_ms: u64,
}

/// A tiered, frame-paced cache for GPU-backed resources.
///
/// Records move through `Active -> Aging -> Dormant` as idle time crosses
/// the configured thresholds (the aging-to-dormant transition releases the
/// device handle), are promoted back to `Active` on lookup, and are never
/// destroyed: a dormant record is metadata that can reload on demand.
/// `Pinned` records sit outside the pipeline entirely, and generated
/// resources live in a separate volatile table with a fixed 60-second TTL
/// and no aging step.
///
/// Lookups cannot fail: an unknown id or a record whose load failed
/// resolves to the error-fallback resource created at construction, so
/// render code always receives something drawable.
///
/// All operations serialize on one internal mutex; drive `advance` once per
/// frame from the simulation loop and call everything else from wherever is
/// convenient.
pub struct TextureCache<D: ResourceDevice> {
  device: D,
  ids: Arc<IdAllocator>,
  metrics: Metrics,
  fallback: SharedResource<D::Handle>,
  fallback_handle: Arc<D::Handle>,
  core: Mutex<CacheCore<D::Handle>>,
}

impl<D: ResourceDevice> TextureCache<D> {
  pub(crate) fn from_parts(
    device: D,
    ids: Arc<IdAllocator>,
    fallback: SharedResource<D::Handle>,
    fallback_handle: Arc<D::Handle>,
    inactive_timeout: Duration,
    unload_timeout: Duration,
    recent_capacity: usize,
  ) -> Self {
    Self {
      device,
      ids,
      metrics: Metrics::new(),
      fallback,
      fallback_handle,
      core: Mutex::new(CacheCore {
        tiers: TierMap::new(),
        recent: RecentLookups::new(recent_capacity),
        volatile: VolatileTable::new(),
        pending: HashSet::default(),
        inactive_timeout_ms: inactive_timeout.as_millis() as u64,
        unload_timeout_ms: unload_timeout.as_millis() as u64,
      }),
    }
  }

  // --- Lookup ---

  /// Resolves a record by id, or the error fallback when resolution fails.
  ///
  /// The recent-lookup accelerator is scanned first unless `skip_recent` is
  /// set; an accelerator hit resets idle time and returns the record as it
  /// stands, without reloading or re-tiering it. Otherwise tiers are probed
  /// starting at `hint`, then in fixed fallback order. A match is lazily
  /// loaded if needed, its idle time reset (pinned records keep theirs),
  /// and an aging or dormant match is promoted back to active.
  pub fn get(&self, id: ResourceId, hint: Tier, skip_recent: bool) -> SharedResource<D::Handle> {
    let mut core = self.core.lock();

    if !skip_recent {
      if let Some(record) = core.recent.find(id) {
        record.reset_idle();
        self.metrics.recent_hits.fetch_add(1, Ordering::Relaxed);
        if record.load_state() == LoadState::Failed {
          self.metrics.fallback_served.fetch_add(1, Ordering::Relaxed);
          return self.fallback.clone();
        }
        self.metrics.hits.fetch_add(1, Ordering::Relaxed);
        return record;
      }
    }

    match self.resolve(&mut core, id, hint) {
      Some(record) if record.load_state() == LoadState::Failed => {
        self.metrics.fallback_served.fetch_add(1, Ordering::Relaxed);
        self.fallback.clone()
      }
      Some(record) => {
        self.metrics.hits.fetch_add(1, Ordering::Relaxed);
        record
      }
      None => {
        debug!(%id, "lookup unresolved, serving fallback");
        self.metrics.fallback_served.fetch_add(1, Ordering::Relaxed);
        self.fallback.clone()
      }
    }
  }

  /// Resolves a record and returns its device handle directly, substituting
  /// the fallback's handle when the record is unresolved or unloaded.
  pub fn get_handle(&self, id: ResourceId, hint: Tier, skip_recent: bool) -> Arc<D::Handle> {
    self
      .get(id, hint, skip_recent)
      .handle()
      .unwrap_or_else(|| self.fallback_handle.clone())
  }

  /// Whether `resource` is the error-fallback sentinel.
  pub fn is_fallback(&self, resource: &SharedResource<D::Handle>) -> bool {
    Arc::ptr_eq(resource, &self.fallback)
  }

  /// The error-fallback resource itself. Always loaded, never tiered.
  pub fn fallback(&self) -> SharedResource<D::Handle> {
    self.fallback.clone()
  }

  fn resolve(
    &self,
    core: &mut CacheCore<D::Handle>,
    id: ResourceId,
    hint: Tier,
  ) -> Option<SharedResource<D::Handle>> {
    if hint == Tier::Volatile {
      if let Some(record) = Self::volatile_hit(core, id) {
        return Some(record);
      }
    } else if let Some(record) = self.primary_hit(core, hint, id) {
      return Some(record);
    }

    for tier in FALLBACK_PROBE_ORDER {
      if tier == hint {
        continue;
      }
      if let Some(record) = self.primary_hit(core, tier, id) {
        return Some(record);
      }
    }

    if hint != Tier::Volatile {
      if let Some(record) = Self::volatile_hit(core, id) {
        return Some(record);
      }
    }
    None
  }

  fn primary_hit(
    &self,
    core: &mut CacheCore<D::Handle>,
    tier: Tier,
    id: ResourceId,
  ) -> Option<SharedResource<D::Handle>> {
    let record = core.tiers.get(tier, id).cloned()?;

    if record.load_state() == LoadState::NotLoaded {
      self.metrics.loads.fetch_add(1, Ordering::Relaxed);
      if record.load(&self.device) != LoadState::Loaded {
        self.metrics.load_failures.fetch_add(1, Ordering::Relaxed);
      }
      core.pending.remove(&id);
    }

    if tier != Tier::Pinned {
      record.reset_idle();
    }
    if matches!(tier, Tier::Aging | Tier::Dormant) {
      core.tiers.remove(tier, id);
      core.tiers.insert(Tier::Active, record.clone());
      self.metrics.promotions.fetch_add(1, Ordering::Relaxed);
    }
    core.recent.touch(&record);
    Some(record)
  }

  /// A volatile match resets idle time but never enters the accelerator:
  /// TTL expiry removes the record outright and the accelerator must not
  /// outlive the table entry.
  fn volatile_hit(
    core: &mut CacheCore<D::Handle>,
    id: ResourceId,
  ) -> Option<SharedResource<D::Handle>> {
    let record = core.volatile.get(id).cloned()?;
    record.reset_idle();
    Some(record)
  }

  // --- Registration ---

  /// Registers a new persistent resource and returns its id.
  ///
  /// The record starts in the active tier. With `load_now` the device is
  /// asked synchronously (a failure is sticky and surfaces as the fallback
  /// on lookup); otherwise the record waits for its first lookup or a
  /// [`warm_up`](Self::warm_up) pass.
  pub fn load_new(
    &self,
    descriptor: ResourceDescriptor,
    kind: ResourceKind,
    load_now: bool,
  ) -> ResourceId {
    let id = self.ids.allocate();
    let record = Arc::new(ResourceRecord::new(id, descriptor, kind));

    if load_now {
      self.metrics.loads.fetch_add(1, Ordering::Relaxed);
      if record.load(&self.device) != LoadState::Loaded {
        self.metrics.load_failures.fetch_add(1, Ordering::Relaxed);
      }
    }

    let mut core = self.core.lock();
    if !load_now {
      core.pending.insert(id);
    }
    core.tiers.insert(Tier::Active, record);
    id
  }

  /// Registers a pinned resource, loading it eagerly, and returns its id.
  ///
  /// Pinned records never age out, are never unloaded automatically, and
  /// keep serving lookups for the cache's lifetime.
  pub fn add_pinned(&self, descriptor: ResourceDescriptor, kind: ResourceKind) -> ResourceId {
    let id = self.ids.allocate();
    let record = Arc::new(ResourceRecord::new(id, descriptor, kind));

    self.metrics.loads.fetch_add(1, Ordering::Relaxed);
    if record.load(&self.device) != LoadState::Loaded {
      self.metrics.load_failures.fetch_add(1, Ordering::Relaxed);
    }

    self.core.lock().tiers.insert(Tier::Pinned, record);
    id
  }

  /// Registers an already-materialized generated resource as pinned.
  pub fn add_pinned_generated(
    &self,
    source: impl Into<String>,
    handle: D::Handle,
    kind: ResourceKind,
  ) -> ResourceId {
    let id = self.ids.allocate();
    let record = Arc::new(ResourceRecord::new_loaded(
      id,
      ResourceDescriptor::generated(source),
      kind,
      Arc::new(handle),
    ));
    self.core.lock().tiers.insert(Tier::Pinned, record);
    id
  }

  /// Registers an already-materialized generated resource in the volatile
  /// table under a caller-allocated id.
  ///
  /// The entry starts loaded with zero idle time and is removed after
  /// [`VOLATILE_TTL`](crate::VOLATILE_TTL) of idleness. A duplicate id is
  /// rejected; the offered handle is released back through the device so it
  /// cannot leak.
  pub fn add_volatile(
    &self,
    id: ResourceId,
    source: impl Into<String>,
    handle: D::Handle,
    kind: ResourceKind,
  ) -> Result<(), crate::error::CacheError> {
    let mut core = self.core.lock();
    if core.volatile.contains(id) {
      warn!(%id, "duplicate volatile resource id");
      self.device.release_resource(&handle);
      return Err(crate::error::CacheError::DuplicateVolatileId(id));
    }
    let record = Arc::new(ResourceRecord::new_loaded(
      id,
      ResourceDescriptor::generated(source),
      kind,
      Arc::new(handle),
    ));
    core.volatile.insert(record);
    self.metrics.volatile_added.fetch_add(1, Ordering::Relaxed);
    Ok(())
  }

  /// Force-unloads and removes a volatile resource. No-op when absent.
  pub fn release_volatile(&self, id: ResourceId) {
    let mut core = self.core.lock();
    if let Some(record) = core.volatile.remove(id) {
      record.unload(&self.device, true);
      core.recent.invalidate(id);
      self.metrics.volatile_released.fetch_add(1, Ordering::Relaxed);
    }
  }

  // --- Maintenance ---

  /// Advances the cache clock by `elapsed`, aging every record and applying
  /// the tier transitions whose thresholds were crossed.
  ///
  /// Call once per frame. Tiers are swept dormant-first so a record crosses
  /// at most one transition per call: active records past the inactive
  /// timeout demote to aging; aging records past the unload timeout release
  /// their handle and demote to dormant; volatile records at their TTL are
  /// removed outright. Dormant records only accumulate idle time, and
  /// pinned records are exempt from every transition.
  pub fn advance(&self, elapsed: Duration) {
    let ms = elapsed.as_millis() as u64;
    let mut core = self.core.lock();

    core.tiers.age(Tier::Dormant, ms);

    let unload_ms = core.unload_timeout_ms;
    for id in core.tiers.age_and_collect(Tier::Aging, ms, unload_ms) {
      if let Some(record) = core.tiers.remove(Tier::Aging, id) {
        record.unload(&self.device, false);
        core.tiers.insert(Tier::Dormant, record);
        self.metrics.demotions_to_dormant.fetch_add(1, Ordering::Relaxed);
      }
    }

    let inactive_ms = core.inactive_timeout_ms;
    for id in core.tiers.age_and_collect(Tier::Active, ms, inactive_ms) {
      if let Some(record) = core.tiers.remove(Tier::Active, id) {
        core.tiers.insert(Tier::Aging, record);
        self.metrics.demotions_to_aging.fetch_add(1, Ordering::Relaxed);
      }
    }

    for id in core.volatile.age_and_collect(ms) {
      if let Some(record) = core.volatile.remove(id) {
        record.unload(&self.device, true);
        core.recent.invalidate(id);
        self.metrics.volatile_expired.fetch_add(1, Ordering::Relaxed);
        debug!(%id, "volatile resource expired");
      }
    }

    // Pinned records age too, but nothing ever acts on the value.
    core.tiers.age(Tier::Pinned, ms);
  }

  /// Loads every record registered with a deferred load.
  ///
  /// The batch counterpart to lazy loading on lookup: call once after
  /// registering an asset manifest to front-load device work. Records keep
  /// their current tier and idle time; failures are sticky as usual.
  pub fn warm_up(&self) {
    let mut core = self.core.lock();
    let pending: Vec<ResourceId> = core.pending.drain().collect();
    let mut failures = 0u64;

    for id in &pending {
      let Some((_, record)) = core.tiers.find(*id) else {
        continue;
      };
      let record = record.clone();
      if record.load_state() == LoadState::NotLoaded {
        self.metrics.loads.fetch_add(1, Ordering::Relaxed);
        if record.load(&self.device) != LoadState::Loaded {
          self.metrics.load_failures.fetch_add(1, Ordering::Relaxed);
          failures += 1;
        }
      }
    }
    debug!(requested = pending.len(), failures, "warm-up pass complete");
  }

  /// Force-unloads every record and drops all bookkeeping.
  ///
  /// The fallback resource survives, so lookups on a cleared cache still
  /// return something drawable.
  pub fn clear(&self) {
    let mut core = self.core.lock();
    core.recent.clear();
    core.pending.clear();
    for record in core.tiers.drain_all() {
      record.unload(&self.device, true);
    }
    for record in core.volatile.drain() {
      record.unload(&self.device, true);
    }
  }

  // --- Introspection ---

  /// The tier currently holding `id`, if any. Does not touch idle time.
  pub fn tier_of(&self, id: ResourceId) -> Option<Tier> {
    let core = self.core.lock();
    if core.volatile.contains(id) {
      return Some(Tier::Volatile);
    }
    core.tiers.find(id).map(|(tier, _)| tier)
  }

  /// Per-tier record counts.
  pub fn tier_counts(&self) -> TierCounts {
    let core = self.core.lock();
    TierCounts {
      active: core.tiers.len(Tier::Active),
      aging: core.tiers.len(Tier::Aging),
      dormant: core.tiers.len(Tier::Dormant),
      pinned: core.tiers.len(Tier::Pinned),
      volatile: core.volatile.len(),
      pending: core.pending.len(),
    }
  }

  /// A point-in-time snapshot of the cache's metrics.
  pub fn metrics(&self) -> MetricsSnapshot {
    self.metrics.snapshot()
  }

  /// The id allocator backing this cache. Clone it into any component that
  /// mints ids for [`add_volatile`](Self::add_volatile).
  pub fn ids(&self) -> &Arc<IdAllocator> {
    &self.ids
  }

  /// The device this cache loads and releases through.
  pub fn device(&self) -> &D {
    &self.device
  }

  pub fn inactive_timeout(&self) -> Duration {
    Duration::from_millis(self.core.lock().inactive_timeout_ms)
  }

  pub fn unload_timeout(&self) -> Duration {
    Duration::from_millis(self.core.lock().unload_timeout_ms)
  }

  pub fn recent_capacity(&self) -> usize {
    self.core.lock().recent.capacity()
  }
}

impl<D: ResourceDevice> fmt::Debug for TextureCache<D> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("TextureCache")
      .field("tiers", &self.tier_counts())
      .finish_non_exhaustive()
  }
}

impl<D: ResourceDevice> Drop for TextureCache<D> {
  fn drop(&mut self) {
    self.clear();
    self.device.release_resource(&self.fallback_handle);
  }
}

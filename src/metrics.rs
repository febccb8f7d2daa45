use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crossbeam_utils::CachePadded;

/// Internal metrics collector for the cache.
/// All fields are atomic to allow for lock-free updates.
#[derive(Debug)]
pub(crate) struct Metrics {
  // --- Lookup outcomes ---
  pub(crate) hits: CachePadded<AtomicU64>,
  pub(crate) recent_hits: CachePadded<AtomicU64>,
  pub(crate) fallback_served: CachePadded<AtomicU64>,

  // --- Device traffic ---
  pub(crate) loads: CachePadded<AtomicU64>,
  pub(crate) load_failures: CachePadded<AtomicU64>,

  // --- Tier movement ---
  pub(crate) promotions: CachePadded<AtomicU64>,
  pub(crate) demotions_to_aging: CachePadded<AtomicU64>,
  pub(crate) demotions_to_dormant: CachePadded<AtomicU64>,

  // --- Volatile tier ---
  pub(crate) volatile_added: CachePadded<AtomicU64>,
  pub(crate) volatile_expired: CachePadded<AtomicU64>,
  pub(crate) volatile_released: CachePadded<AtomicU64>,

  created_at: Instant,
}

impl Default for Metrics {
  fn default() -> Self {
    Self {
      hits: CachePadded::new(AtomicU64::new(0)),
      recent_hits: CachePadded::new(AtomicU64::new(0)),
      fallback_served: CachePadded::new(AtomicU64::new(0)),
      loads: CachePadded::new(AtomicU64::new(0)),
      load_failures: CachePadded::new(AtomicU64::new(0)),
      promotions: CachePadded::new(AtomicU64::new(0)),
      demotions_to_aging: CachePadded::new(AtomicU64::new(0)),
      demotions_to_dormant: CachePadded::new(AtomicU64::new(0)),
      volatile_added: CachePadded::new(AtomicU64::new(0)),
      volatile_expired: CachePadded::new(AtomicU64::new(0)),
      volatile_released: CachePadded::new(AtomicU64::new(0)),
      created_at: Instant::now(),
    }
  }
}

impl Metrics {
  pub(crate) fn new() -> Self {
    Self::default()
  }

  /// Creates a point-in-time snapshot of the current metrics.
  pub(crate) fn snapshot(&self) -> MetricsSnapshot {
    let hits = self.hits.load(Ordering::Relaxed);
    let fallback_served = self.fallback_served.load(Ordering::Relaxed);
    let total_lookups = hits + fallback_served;

    MetricsSnapshot {
      hits,
      recent_hits: self.recent_hits.load(Ordering::Relaxed),
      fallback_served,
      hit_ratio: if total_lookups == 0 {
        0.0
      } else {
        hits as f64 / total_lookups as f64
      },
      loads: self.loads.load(Ordering::Relaxed),
      load_failures: self.load_failures.load(Ordering::Relaxed),
      promotions: self.promotions.load(Ordering::Relaxed),
      demotions_to_aging: self.demotions_to_aging.load(Ordering::Relaxed),
      demotions_to_dormant: self.demotions_to_dormant.load(Ordering::Relaxed),
      volatile_added: self.volatile_added.load(Ordering::Relaxed),
      volatile_expired: self.volatile_expired.load(Ordering::Relaxed),
      volatile_released: self.volatile_released.load(Ordering::Relaxed),
      uptime_secs: self.created_at.elapsed().as_secs(),
    }
  }
}

/// A point-in-time, public-facing snapshot of the cache's metrics.
#[derive(Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MetricsSnapshot {
  /// Lookups resolved to a real (non-fallback) record.
  pub hits: u64,
  /// The subset of hits served straight from the recent-lookup accelerator.
  pub recent_hits: u64,
  /// Lookups that degraded to the error fallback (unknown id or a record
  /// with a sticky load failure).
  pub fallback_served: u64,
  /// The ratio of hits to total lookups.
  pub hit_ratio: f64,
  /// Device load attempts.
  pub loads: u64,
  /// Device load attempts that failed and marked their record.
  pub load_failures: u64,
  /// Records moved back to the active tier on access.
  pub promotions: u64,
  /// Records demoted from active to aging.
  pub demotions_to_aging: u64,
  /// Records demoted from aging to dormant (handle released).
  pub demotions_to_dormant: u64,
  /// Volatile resources registered.
  pub volatile_added: u64,
  /// Volatile resources removed by TTL expiry.
  pub volatile_expired: u64,
  /// Volatile resources removed by explicit release.
  pub volatile_released: u64,
  /// Seconds the cache has existed.
  pub uptime_secs: u64,
}

impl fmt::Debug for MetricsSnapshot {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("MetricsSnapshot")
      .field("hits", &self.hits)
      .field("recent_hits", &self.recent_hits)
      .field("fallback_served", &self.fallback_served)
      .field("hit_ratio", &format!("{:.2}%", self.hit_ratio * 100.0))
      .field("loads", &self.loads)
      .field("load_failures", &self.load_failures)
      .field("promotions", &self.promotions)
      .field("demotions_to_aging", &self.demotions_to_aging)
      .field("demotions_to_dormant", &self.demotions_to_dormant)
      .field("volatile_added", &self.volatile_added)
      .field("volatile_expired", &self.volatile_expired)
      .field("volatile_released", &self.volatile_released)
      .field("uptime_secs", &self.uptime_secs)
      .finish()
  }
}

mod common;

use common::*;
use std::sync::Arc;
use texcache::{CacheBuilder, ResourceDescriptor, ResourceKind, Tier};

#[test]
fn test_clear_releases_everything_but_keeps_the_fallback() {
  let cache = build_idle_cache();
  let a = cache.load_new(ResourceDescriptor::file("a.dds"), ResourceKind::Normal, true);
  let b = cache.load_new(ResourceDescriptor::file("b.dds"), ResourceKind::Normal, true);
  cache.add_pinned_generated("overlay:logo", 50, ResourceKind::Normal);
  let v = cache.ids().allocate();
  cache
    .add_volatile(v, "text:banner", 51, ResourceKind::UiText)
    .unwrap();

  cache.clear();

  // Two file-backed loads, one pinned generated, one volatile.
  assert_eq!(cache.device().release_count(), 4);
  let counts = cache.tier_counts();
  assert_eq!(
    (counts.active, counts.pinned, counts.volatile, counts.pending),
    (0, 0, 0, 0)
  );

  for id in [a, b, v] {
    let resource = cache.get(id, Tier::Active, false);
    assert!(cache.is_fallback(&resource));
  }
  // The sentinel itself still serves.
  assert!(cache.fallback().is_loaded());
}

#[test]
fn test_drop_releases_the_fallback_too() {
  let device = Arc::new(StubDevice::new());
  let cache = CacheBuilder::new(Arc::clone(&device)).build().unwrap();
  let id = cache.load_new(ResourceDescriptor::file("a.dds"), ResourceKind::Normal, true);
  cache.get(id, Tier::Active, false);

  drop(cache);

  // One loaded record plus the fallback handle.
  assert_eq!(device.release_count(), 2);
}

#[test]
fn test_clear_then_drop_does_not_double_release() {
  let device = Arc::new(StubDevice::new());
  let cache = CacheBuilder::new(Arc::clone(&device)).build().unwrap();
  cache.load_new(ResourceDescriptor::file("a.dds"), ResourceKind::Normal, true);

  cache.clear();
  assert_eq!(device.release_count(), 1);
  drop(cache);
  assert_eq!(device.release_count(), 2, "drop adds only the fallback");
}

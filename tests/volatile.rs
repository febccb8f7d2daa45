mod common;

use common::*;
use texcache::{CacheError, ResourceKind, Tier, VOLATILE_TTL};

#[test]
fn test_volatile_expires_at_ttl() {
  let cache = build_idle_cache();
  let id = cache.ids().allocate();
  cache
    .add_volatile(id, "text:fps-counter", 42, ResourceKind::UiText)
    .unwrap();

  cache.advance(ms(59_999));
  assert_eq!(cache.tier_of(id), Some(Tier::Volatile));
  assert_eq!(cache.device().release_count(), 0);

  // Crossing the 60 s TTL removes the entry outright.
  cache.advance(ms(2));
  assert_eq!(cache.tier_of(id), None);
  assert_eq!(cache.device().release_count(), 1);
  assert_eq!(cache.metrics().volatile_expired, 1);

  let resource = cache.get(id, Tier::Volatile, false);
  assert!(cache.is_fallback(&resource));
}

#[test]
fn test_volatile_lookup_resets_ttl() {
  let cache = build_idle_cache();
  let id = cache.ids().allocate();
  cache
    .add_volatile(id, "text:subtitle", 7, ResourceKind::UiText)
    .unwrap();

  cache.advance(ms(59_000));
  let resource = cache.get(id, Tier::Volatile, false);
  assert!(!cache.is_fallback(&resource));
  assert!(resource.descriptor().is_generated());

  // The access pushed the idle clock back to zero.
  cache.advance(ms(59_000));
  assert_eq!(cache.tier_of(id), Some(Tier::Volatile));

  cache.advance(ms(1_000));
  assert_eq!(cache.tier_of(id), None);
}

#[test]
fn test_duplicate_volatile_id_is_rejected() {
  let cache = build_idle_cache();
  let id = cache.ids().allocate();
  cache
    .add_volatile(id, "text:hint", 11, ResourceKind::UiText)
    .unwrap();

  let result = cache.add_volatile(id, "text:hint", 12, ResourceKind::UiText);
  assert_eq!(result, Err(CacheError::DuplicateVolatileId(id)));
  // The rejected handle went back through the device instead of leaking.
  assert_eq!(cache.device().release_count(), 1);
  // The original entry is untouched.
  assert_eq!(cache.tier_of(id), Some(Tier::Volatile));
  assert_eq!(cache.metrics().volatile_added, 1);
}

#[test]
fn test_release_volatile_is_idempotent() {
  let cache = build_idle_cache();
  let id = cache.ids().allocate();
  cache
    .add_volatile(id, "text:tooltip", 5, ResourceKind::UiText)
    .unwrap();

  cache.release_volatile(id);
  assert_eq!(cache.tier_of(id), None);
  assert_eq!(cache.device().release_count(), 1);
  assert_eq!(cache.metrics().volatile_released, 1);

  cache.release_volatile(id);
  assert_eq!(cache.device().release_count(), 1);
}

#[test]
fn test_expired_volatile_is_not_served_stale() {
  let cache = build_idle_cache();
  let id = cache.ids().allocate();
  cache
    .add_volatile(id, "text:chat-line", 3, ResourceKind::UiText)
    .unwrap();

  // Resolve it a few times, then let it idle out. Volatile records never
  // enter the recent-lookup accelerator, so expiry cannot leave a stale
  // entry behind.
  cache.get(id, Tier::Volatile, false);
  cache.get(id, Tier::Volatile, false);
  cache.advance(VOLATILE_TTL);

  let resource = cache.get(id, Tier::Volatile, false);
  assert!(cache.is_fallback(&resource));
}

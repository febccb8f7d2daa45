mod common;

use common::*;
use std::sync::Arc;
use texcache::{LoadState, ResourceDescriptor, ResourceKind, Tier};

#[test]
fn test_unknown_id_resolves_to_the_same_fallback() {
  let cache = build_idle_cache();
  let id = cache.ids().allocate();

  let first = cache.get(id, Tier::Active, false);
  let second = cache.get(id, Tier::Dormant, true);

  assert!(cache.is_fallback(&first));
  assert!(
    Arc::ptr_eq(&first, &second),
    "every failed lookup returns the one sentinel record"
  );
  assert_eq!(first.load_state(), LoadState::Loaded);
  assert!(first.handle().is_some());
  assert_eq!(cache.metrics().fallback_served, 2);
  assert_eq!(cache.metrics().hits, 0);
}

#[test]
fn test_load_failure_is_sticky_and_serves_fallback() {
  let cache = build_idle_cache();
  cache.device().fail_on("missing.dds");
  let id = cache.load_new(
    ResourceDescriptor::file("missing.dds"),
    ResourceKind::Normal,
    true,
  );
  assert_eq!(cache.metrics().load_failures, 1);

  let resource = cache.get(id, Tier::Active, false);
  assert!(cache.is_fallback(&resource));

  // The failure is remembered; repeat lookups do not retry the device.
  cache.get(id, Tier::Active, true);
  cache.get(id, Tier::Active, true);
  assert_eq!(cache.device().create_count(), 0);
  assert_eq!(cache.metrics().loads, 1);
  assert_eq!(cache.metrics().fallback_served, 3);
}

#[test]
fn test_failed_record_served_from_accelerator_still_degrades() {
  let cache = build_idle_cache();
  cache.device().fail_on("broken.dds");
  let good = cache.load_new(
    ResourceDescriptor::file("fine.dds"),
    ResourceKind::Normal,
    true,
  );
  let bad = cache.load_new(
    ResourceDescriptor::file("broken.dds"),
    ResourceKind::Normal,
    true,
  );

  cache.get(good, Tier::Active, false);
  cache.get(bad, Tier::Active, false);

  // Both lookups below land in the accelerator path; the failed record is
  // still substituted with the fallback there.
  let resource = cache.get(bad, Tier::Active, false);
  assert!(cache.is_fallback(&resource));
  let resource = cache.get(good, Tier::Active, false);
  assert!(!cache.is_fallback(&resource));
}

#[test]
fn test_get_handle_substitutes_fallback_handle() {
  let cache = build_idle_cache();
  let unknown = cache.ids().allocate();
  let handle = cache.get_handle(unknown, Tier::Active, false);
  assert_eq!(*handle, FALLBACK_HANDLE);

  let id = cache.load_new(
    ResourceDescriptor::file("panel.dds"),
    ResourceKind::UiText,
    true,
  );
  let handle = cache.get_handle(id, Tier::Active, false);
  assert_ne!(*handle, FALLBACK_HANDLE);
}

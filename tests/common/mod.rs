#![allow(dead_code)]

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use texcache::{CacheBuilder, ResourceDescriptor, ResourceDevice, TextureCache};

/// The handle value the stub device hands out for the error fallback.
pub const FALLBACK_HANDLE: u64 = 1;

#[derive(Debug)]
pub struct StubError(pub String);

impl fmt::Display for StubError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// A scriptable in-memory device: hands out counter-valued handles, counts
/// create/release traffic, and fails creation for blacklisted sources.
pub struct StubDevice {
  pub creates: AtomicUsize,
  pub releases: AtomicUsize,
  pub fail_fallback: AtomicBool,
  failing: Mutex<HashSet<String>>,
  next_handle: AtomicU64,
}

impl StubDevice {
  pub fn new() -> Self {
    Self {
      creates: AtomicUsize::new(0),
      releases: AtomicUsize::new(0),
      fail_fallback: AtomicBool::new(false),
      failing: Mutex::new(HashSet::new()),
      next_handle: AtomicU64::new(1000),
    }
  }

  /// Makes every subsequent load of `source` fail.
  pub fn fail_on(&self, source: &str) {
    self.failing.lock().insert(source.to_string());
  }

  pub fn create_count(&self) -> usize {
    self.creates.load(Ordering::SeqCst)
  }

  pub fn release_count(&self) -> usize {
    self.releases.load(Ordering::SeqCst)
  }
}

impl ResourceDevice for StubDevice {
  type Handle = u64;
  type Error = StubError;

  fn create_resource(&self, descriptor: &ResourceDescriptor) -> Result<u64, StubError> {
    if self.failing.lock().contains(descriptor.source()) {
      return Err(StubError(format!("no such source: {}", descriptor.source())));
    }
    self.creates.fetch_add(1, Ordering::SeqCst);
    Ok(self.next_handle.fetch_add(1, Ordering::SeqCst))
  }

  fn release_resource(&self, _handle: &u64) {
    self.releases.fetch_add(1, Ordering::SeqCst);
  }

  // The fallback is not counted in `creates` so tests can count real loads.
  fn create_fallback(&self) -> Result<u64, StubError> {
    if self.fail_fallback.load(Ordering::SeqCst) {
      return Err(StubError("fallback generation refused".to_string()));
    }
    Ok(FALLBACK_HANDLE)
  }
}

pub fn ms(millis: u64) -> Duration {
  Duration::from_millis(millis)
}

/// Builds a cache over a fresh stub device with the given aging thresholds.
pub fn build_cache(inactive: Duration, unload: Duration) -> TextureCache<StubDevice> {
  CacheBuilder::new(StubDevice::new())
    .inactive_timeout(inactive)
    .unload_timeout(unload)
    .build()
    .unwrap()
}

/// A cache with thresholds far enough out that nothing demotes on its own.
pub fn build_idle_cache() -> TextureCache<StubDevice> {
  build_cache(ms(30_000), ms(300_000))
}

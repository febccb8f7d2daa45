use crate::cache::TextureCache;
use crate::device::ResourceDevice;
use crate::error::BuildError;
use crate::id::IdAllocator;
use crate::record::{ResourceDescriptor, ResourceKind, ResourceRecord};

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// A builder for creating [`TextureCache`] instances.
///
/// ```
/// use texcache::{CacheBuilder, ResourceDescriptor, ResourceDevice};
/// use std::convert::Infallible;
/// use std::time::Duration;
///
/// struct NullDevice;
///
/// impl ResourceDevice for NullDevice {
///   type Handle = u64;
///   type Error = Infallible;
///   fn create_resource(&self, _: &ResourceDescriptor) -> Result<u64, Infallible> {
///     Ok(0)
///   }
///   fn release_resource(&self, _: &u64) {}
///   fn create_fallback(&self) -> Result<u64, Infallible> {
///     Ok(0)
///   }
/// }
///
/// let cache = CacheBuilder::new(NullDevice)
///   .inactive_timeout(Duration::from_secs(10))
///   .unload_timeout(Duration::from_secs(120))
///   .build()
///   .unwrap();
/// assert_eq!(cache.recent_capacity(), 10);
/// ```
pub struct CacheBuilder<D: ResourceDevice> {
  device: D,
  inactive_timeout: Duration,
  unload_timeout: Duration,
  recent_capacity: usize,
  ids: Option<Arc<IdAllocator>>,
}

impl<D: ResourceDevice> CacheBuilder<D> {
  /// Creates a new `CacheBuilder` around a device with default settings.
  pub fn new(device: D) -> Self {
    Self {
      device,
      inactive_timeout: Duration::from_secs(30),
      unload_timeout: Duration::from_secs(300),
      recent_capacity: 10,
      ids: None,
    }
  }

  /// Sets the idle time after which an active record is demoted to aging.
  ///
  /// Defaults to 30 seconds.
  pub fn inactive_timeout(mut self, duration: Duration) -> Self {
    self.inactive_timeout = duration;
    self
  }

  /// Sets the idle time after which an aging record is unloaded and demoted
  /// to dormant.
  ///
  /// Defaults to 300 seconds. Must exceed the inactive timeout.
  pub fn unload_timeout(mut self, duration: Duration) -> Self {
    self.unload_timeout = duration;
    self
  }

  /// Sets the capacity of the recent-lookup accelerator.
  ///
  /// Defaults to 10 entries.
  pub fn recent_capacity(mut self, capacity: usize) -> Self {
    self.recent_capacity = capacity;
    self
  }

  /// Shares an existing id allocator instead of creating a fresh one.
  ///
  /// Pass the same allocator to every component that mints resource ids
  /// (text renderers registering volatile resources, sibling caches) so ids
  /// stay process-unique.
  pub fn id_allocator(mut self, ids: Arc<IdAllocator>) -> Self {
    self.ids = Some(ids);
    self
  }

  /// Builds the cache, creating the error-fallback resource on the device.
  pub fn build(self) -> Result<TextureCache<D>, BuildError> {
    self.validate()?;

    let ids = self.ids.unwrap_or_default();
    let fallback_handle = self
      .device
      .create_fallback()
      .map(Arc::new)
      .map_err(|error| BuildError::Fallback(error.to_string()))?;
    let fallback = Arc::new(ResourceRecord::new_loaded(
      ids.allocate(),
      ResourceDescriptor::generated("error-fallback"),
      ResourceKind::Normal,
      fallback_handle.clone(),
    ));

    Ok(TextureCache::from_parts(
      self.device,
      ids,
      fallback,
      fallback_handle,
      self.inactive_timeout,
      self.unload_timeout,
      self.recent_capacity,
    ))
  }

  /// Validates the builder configuration.
  fn validate(&self) -> Result<(), BuildError> {
    if self.recent_capacity == 0 {
      return Err(BuildError::ZeroRecentCapacity);
    }
    if self.unload_timeout <= self.inactive_timeout {
      return Err(BuildError::TimeoutOrdering);
    }
    Ok(())
  }
}

// Manual Debug implementation; the device is not required to be Debug.
impl<D: ResourceDevice> fmt::Debug for CacheBuilder<D> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("CacheBuilder")
      .field("inactive_timeout", &self.inactive_timeout)
      .field("unload_timeout", &self.unload_timeout)
      .field("recent_capacity", &self.recent_capacity)
      .field("has_shared_ids", &self.ids.is_some())
      .finish_non_exhaustive()
  }
}

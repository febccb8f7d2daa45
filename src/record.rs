use crate::device::ResourceDevice;
use crate::id::ResourceId;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

/// The source a resource is materialized from.
///
/// `File` names a persistent, reloadable source the device can resolve any
/// number of times. `Generated` marks an in-memory resource that cannot be
/// recreated from disk; non-forced unloads leave such resources alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResourceDescriptor {
  /// A file path or logical asset name, opaque to the cache.
  File(String),
  /// A tag describing where a procedurally generated resource came from.
  Generated(String),
}

impl ResourceDescriptor {
  /// Creates a file-backed descriptor.
  pub fn file(source: impl Into<String>) -> Self {
    Self::File(source.into())
  }

  /// Creates a generated (non-file-backed) descriptor.
  pub fn generated(source: impl Into<String>) -> Self {
    Self::Generated(source.into())
  }

  /// Returns the source name, regardless of variant.
  #[inline]
  pub fn source(&self) -> &str {
    match self {
      Self::File(source) | Self::Generated(source) => source,
    }
  }

  /// Whether this resource was generated in memory rather than loaded
  /// from a file.
  #[inline]
  pub fn is_generated(&self) -> bool {
    matches!(self, Self::Generated(_))
  }
}

impl fmt::Display for ResourceDescriptor {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::File(source) => write!(f, "file:{source}"),
      Self::Generated(source) => write!(f, "generated:{source}"),
    }
  }
}

/// Caller-facing category tag for a resource. Carried through the cache
/// untouched; the cache itself never branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResourceKind {
  /// A plain color texture.
  Normal,
  Bump,
  Blend,
  LightMap,
  /// Rasterized UI text, the usual occupant of the volatile tier.
  UiText,
}

/// The load lifecycle of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LoadState {
  /// The record is tracked but holds no device handle.
  NotLoaded,
  /// The device handle is live.
  Loaded,
  /// The device refused the descriptor. Sticky: the record is remembered as
  /// permanently failing and is never retried automatically.
  Failed,
}

struct HandleState<H> {
  handle: Option<Arc<H>>,
  load: LoadState,
}

/// One cached, GPU-backed resource.
///
/// The record exclusively owns its device handle while loaded. The cache's
/// tier collections and the recent-lookup accelerator all hold the record
/// through [`SharedResource`]; only `load`/`unload` touch the handle.
pub struct ResourceRecord<H> {
  id: ResourceId,
  descriptor: ResourceDescriptor,
  kind: ResourceKind,
  /// Milliseconds since the record was last resolved via lookup.
  idle_ms: AtomicU64,
  state: Mutex<HandleState<H>>,
}

/// Shared ownership of a [`ResourceRecord`].
pub type SharedResource<H> = Arc<ResourceRecord<H>>;

impl<H> ResourceRecord<H> {
  pub(crate) fn new(id: ResourceId, descriptor: ResourceDescriptor, kind: ResourceKind) -> Self {
    Self {
      id,
      descriptor,
      kind,
      idle_ms: AtomicU64::new(0),
      state: Mutex::new(HandleState {
        handle: None,
        load: LoadState::NotLoaded,
      }),
    }
  }

  pub(crate) fn new_loaded(
    id: ResourceId,
    descriptor: ResourceDescriptor,
    kind: ResourceKind,
    handle: Arc<H>,
  ) -> Self {
    Self {
      id,
      descriptor,
      kind,
      idle_ms: AtomicU64::new(0),
      state: Mutex::new(HandleState {
        handle: Some(handle),
        load: LoadState::Loaded,
      }),
    }
  }

  #[inline]
  pub fn id(&self) -> ResourceId {
    self.id
  }

  #[inline]
  pub fn descriptor(&self) -> &ResourceDescriptor {
    &self.descriptor
  }

  #[inline]
  pub fn kind(&self) -> ResourceKind {
    self.kind
  }

  /// Time since this record was last resolved via lookup, as accumulated by
  /// [`TextureCache::advance`](crate::TextureCache::advance).
  pub fn idle(&self) -> Duration {
    Duration::from_millis(self.idle_ms.load(Ordering::Relaxed))
  }

  #[inline]
  pub(crate) fn idle_ms(&self) -> u64 {
    self.idle_ms.load(Ordering::Relaxed)
  }

  #[inline]
  pub(crate) fn reset_idle(&self) {
    self.idle_ms.store(0, Ordering::Relaxed);
  }

  pub(crate) fn add_idle(&self, ms: u64) {
    let current = self.idle_ms.load(Ordering::Relaxed);
    self.idle_ms.store(current.saturating_add(ms), Ordering::Relaxed);
  }

  pub fn load_state(&self) -> LoadState {
    self.state.lock().load
  }

  #[inline]
  pub fn is_loaded(&self) -> bool {
    self.load_state() == LoadState::Loaded
  }

  /// Returns a clone of the `Arc` holding the device handle, or `None`
  /// while the record is unloaded.
  pub fn handle(&self) -> Option<Arc<H>> {
    self.state.lock().handle.clone()
  }

  /// Materializes the device handle from the descriptor.
  ///
  /// A `Loaded` record is a no-op success; a `Failed` record stays failed
  /// without another device call. Returns the state after the attempt.
  pub(crate) fn load<D>(&self, device: &D) -> LoadState
  where
    D: ResourceDevice<Handle = H> + ?Sized,
  {
    let mut state = self.state.lock();
    match state.load {
      LoadState::Loaded => LoadState::Loaded,
      LoadState::Failed => LoadState::Failed,
      LoadState::NotLoaded => match device.create_resource(&self.descriptor) {
        Ok(handle) => {
          state.handle = Some(Arc::new(handle));
          state.load = LoadState::Loaded;
          debug!(id = %self.id, source = %self.descriptor, "resource materialized");
          LoadState::Loaded
        }
        Err(error) => {
          state.load = LoadState::Failed;
          warn!(id = %self.id, source = %self.descriptor, %error, "resource load failed");
          LoadState::Failed
        }
      },
    }
  }

  /// Releases the device handle, if any.
  ///
  /// Generated resources are only released when `force` is set; file-backed
  /// resources always are. A `Failed` state survives the unload.
  pub(crate) fn unload<D>(&self, device: &D, force: bool)
  where
    D: ResourceDevice<Handle = H> + ?Sized,
  {
    let mut state = self.state.lock();
    if !force && self.descriptor.is_generated() {
      return;
    }
    if let Some(handle) = state.handle.take() {
      device.release_resource(&handle);
      if state.load == LoadState::Loaded {
        state.load = LoadState::NotLoaded;
      }
      trace!(id = %self.id, "resource handle released");
    }
  }
}

impl<H> fmt::Debug for ResourceRecord<H> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ResourceRecord")
      .field("id", &self.id)
      .field("descriptor", &self.descriptor)
      .field("kind", &self.kind)
      .field("load_state", &self.load_state())
      .field("idle_ms", &self.idle_ms.load(Ordering::Relaxed))
      .finish()
  }
}

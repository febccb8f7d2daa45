use crate::record::ResourceDescriptor;

use std::fmt;
use std::sync::Arc;

/// The narrow seam between the cache and the render device.
///
/// The cache never touches GPU memory itself; it asks an implementation of
/// this trait to materialize a handle from a descriptor and to release it
/// again. Loads are synchronous blocking calls on the calling thread.
///
/// `release_resource` may be invoked while clones of the handle's `Arc` are
/// still alive in render lists; the device is called exactly once per loaded
/// handle and implementations must tolerate the Rust-side value outliving
/// the device-side release.
pub trait ResourceDevice: Send + Sync {
  /// The device-side resource handle: a shader resource view, a texture id,
  /// or whatever else the renderer resolves at draw time.
  type Handle: Send + Sync;
  /// The device's failure type for resource creation.
  type Error: fmt::Display;

  /// Materializes a resource from its descriptor.
  fn create_resource(&self, descriptor: &ResourceDescriptor) -> Result<Self::Handle, Self::Error>;

  /// Releases a previously created resource.
  fn release_resource(&self, handle: &Self::Handle);

  /// Produces the always-drawable error-fallback resource.
  ///
  /// Called once, at cache construction. The conventional implementation
  /// generates a small checkerboard so failed lookups are visible on screen.
  fn create_fallback(&self) -> Result<Self::Handle, Self::Error>;
}

impl<D> ResourceDevice for Arc<D>
where
  D: ResourceDevice + ?Sized,
{
  type Handle = D::Handle;
  type Error = D::Error;

  fn create_resource(&self, descriptor: &ResourceDescriptor) -> Result<Self::Handle, Self::Error> {
    (**self).create_resource(descriptor)
  }

  fn release_resource(&self, handle: &Self::Handle) {
    (**self).release_resource(handle)
  }

  fn create_fallback(&self) -> Result<Self::Handle, Self::Error> {
    (**self).create_fallback()
  }
}

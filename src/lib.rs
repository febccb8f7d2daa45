//! A tiered, frame-paced cache for GPU-backed resources.
//!
//! # Features
//! - **Idle-time tiers**: records demote `Active -> Aging -> Dormant` as
//!   frame-clock idle time crosses configurable thresholds, releasing the
//!   device handle on the way down and reloading on demand.
//! - **Non-failing lookups**: an unknown id or a failed load resolves to an
//!   always-loaded error-fallback resource, so render code never branches
//!   on a missing texture.
//! - **Pinned utilities**: records exempt from the aging pipeline for
//!   resources that must stay resident.
//! - **Volatile tier**: procedurally generated resources (rasterized text)
//!   with a fixed 60-second idle TTL and removal instead of demotion.
//! - **Recent-lookup accelerator**: a small bounded set scanned before the
//!   tier maps, sized for the handful of resources a frame touches often.
//! - **Observability**: detailed counters exposed as a metrics snapshot.
//!
//! The cache is deliberately device-agnostic: it drives a narrow
//! [`ResourceDevice`] seam to materialize and release handles, and time
//! only moves when the embedder calls [`TextureCache::advance`] each frame.

// Public modules that form the API
pub mod builder;
pub mod device;
pub mod error;
pub mod metrics;

// Internal, crate-only modules
mod cache;
mod id;
mod recent;
mod record;
mod tier;
mod volatile;

// Re-export the primary user-facing types for convenience
pub use builder::CacheBuilder;
pub use cache::{TextureCache, TierCounts};
pub use device::ResourceDevice;
pub use error::{BuildError, CacheError};
pub use id::{IdAllocator, ResourceId};
pub use metrics::MetricsSnapshot;
pub use record::{LoadState, ResourceDescriptor, ResourceKind, ResourceRecord, SharedResource};
pub use tier::Tier;
pub use volatile::VOLATILE_TTL;

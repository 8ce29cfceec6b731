//! Backend abstraction layer
//!
//! Provides the allocator trait and the render target types that every
//! allocator (headless or wgpu) understands.

pub mod headless;
pub mod traits;
pub mod types;

#[cfg(feature = "wgpu-backend")]
pub mod wgpu_backend;

pub use headless::HeadlessAllocator;
pub use traits::*;
pub use types::*;

//! Core allocator abstraction
//!
//! The render target cache only needs two operations from the GPU: allocate a
//! target from a descriptor and release it again. Both the headless and the wgpu
//! allocators implement [`TextureAllocator`].

use crate::backend::types::*;
use thiserror::Error;

/// Backend error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Failed to initialize backend: {0}")]
    InitializationFailed(String),
    #[error("Failed to create device: {0}")]
    DeviceCreationFailed(String),
    #[error("Failed to create texture: {0}")]
    TextureCreationFailed(String),
    #[error("Invalid render target descriptor: {0}")]
    InvalidDescriptor(String),
    #[error("Out of memory")]
    OutOfMemory,
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Handle to an allocated GPU render target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub(crate) u64);

impl TextureHandle {
    /// Wrap a raw id produced by an external allocator.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// GPU render target allocator.
///
/// Allocation is synchronous. A returned error is fatal for the request; callers
/// do not retry.
pub trait TextureAllocator {
    /// Allocate a render target matching `desc`
    fn allocate(&mut self, desc: &RenderTargetDescriptor) -> BackendResult<TextureHandle>;

    /// Release a previously allocated render target
    fn release(&mut self, handle: TextureHandle);
}

impl<A: TextureAllocator + ?Sized> TextureAllocator for &mut A {
    fn allocate(&mut self, desc: &RenderTargetDescriptor) -> BackendResult<TextureHandle> {
        (**self).allocate(desc)
    }

    fn release(&mut self, handle: TextureHandle) {
        (**self).release(handle)
    }
}

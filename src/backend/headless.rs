//! Headless allocator for testing and tooling.
//!
//! This allocator doesn't touch a GPU. It hands out sequential handles,
//! validates descriptors the way a real device would, and keeps enough
//! bookkeeping to check that every allocation is released exactly once.

use std::collections::HashMap;

use crate::backend::traits::*;
use crate::backend::types::*;

/// Headless render target allocator.
#[derive(Debug, Default)]
pub struct HeadlessAllocator {
    next_id: u64,
    live: HashMap<u64, RenderTargetDescriptor>,
    release_counts: HashMap<u64, u32>,
    allocations: u64,
    releases: u64,
}

impl HeadlessAllocator {
    /// Create a new headless allocator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the allocator name.
    pub fn name(&self) -> &'static str {
        "Headless Allocator"
    }

    /// Total number of successful allocations.
    pub fn allocation_count(&self) -> u64 {
        self.allocations
    }

    /// Total number of release calls that matched a live handle.
    pub fn release_count(&self) -> u64 {
        self.releases
    }

    /// Number of targets currently alive.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Descriptor of a live target.
    pub fn descriptor(&self, handle: TextureHandle) -> Option<&RenderTargetDescriptor> {
        self.live.get(&handle.0)
    }

    /// How many times `handle` has been released (including invalid repeats).
    pub fn times_released(&self, handle: TextureHandle) -> u32 {
        self.release_counts.get(&handle.0).copied().unwrap_or(0)
    }
}

impl TextureAllocator for HeadlessAllocator {
    fn allocate(&mut self, desc: &RenderTargetDescriptor) -> BackendResult<TextureHandle> {
        desc.validate().map_err(BackendError::InvalidDescriptor)?;

        let id = self.next_id;
        self.next_id += 1;
        self.live.insert(id, *desc);
        self.allocations += 1;

        log::trace!(
            "HeadlessAllocator: created target {} ({}x{} {:?})",
            id,
            desc.width,
            desc.height,
            desc.format
        );
        Ok(TextureHandle(id))
    }

    fn release(&mut self, handle: TextureHandle) {
        *self.release_counts.entry(handle.0).or_insert(0) += 1;
        if self.live.remove(&handle.0).is_some() {
            self.releases += 1;
            log::trace!("HeadlessAllocator: released target {}", handle.0);
        } else {
            log::warn!(
                "HeadlessAllocator: release of unknown or already released target {}",
                handle.0
            );
        }
    }
}

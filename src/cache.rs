//! Per-camera render target cache.
//!
//! Every frame rendered for the same camera reuses the same color and depth
//! targets. Targets are created on first request and live until the cache is
//! released, either camera by camera or all at once.
//!
//! # Resize policy
//!
//! A camera's pixel size may change after its targets were created. With
//! [`ResizePolicy::Retain`] the first allocation wins and later size arguments
//! are ignored. With [`ResizePolicy::Reallocate`] a size (or format) mismatch
//! releases the stale target and allocates a replacement.

use std::collections::HashMap;

use glam::Vec4;

use crate::backend::{
    BackendResult, RenderTargetDescriptor, TextureAllocator, TextureFormat, TextureHandle,
};
use crate::scene::CameraId;

/// Kind of per-camera target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    Color,
    Depth,
}

/// A cached render target owned by the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTarget {
    pub handle: TextureHandle,
    pub kind: TargetKind,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
}

impl RenderTarget {
    fn matches(&self, desc: &RenderTargetDescriptor) -> bool {
        self.width == desc.width && self.height == desc.height && self.format == desc.format
    }
}

/// `(w, h, 1/w, 1/h)` of a camera's output
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputTargetSize {
    pub width: f32,
    pub height: f32,
    pub inv_width: f32,
    pub inv_height: f32,
}

impl OutputTargetSize {
    pub fn new(width: u32, height: u32) -> Self {
        let (width, height) = (width as f32, height as f32);
        Self {
            width,
            height,
            inv_width: 1.0 / width,
            inv_height: 1.0 / height,
        }
    }

    pub fn as_vec4(&self) -> Vec4 {
        Vec4::new(self.width, self.height, self.inv_width, self.inv_height)
    }

    fn matches(&self, width: u32, height: u32) -> bool {
        self.width == width as f32 && self.height == height as f32
    }
}

/// What to do when a camera requests a size different from its cached one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResizePolicy {
    /// Keep the first allocation and size forever
    #[default]
    Retain,
    /// Release and reallocate on mismatch
    Reallocate,
}

/// Cache of render targets keyed by camera identity.
///
/// Holds at most one target per `(camera, kind)`. Not synchronized; the host
/// must not release while a frame is rendering.
#[derive(Debug, Default)]
pub struct CameraResourceCache {
    targets: HashMap<(CameraId, TargetKind), RenderTarget>,
    output_sizes: HashMap<CameraId, OutputTargetSize>,
    resize_policy: ResizePolicy,
}

impl CameraResourceCache {
    pub fn new(resize_policy: ResizePolicy) -> Self {
        Self {
            targets: HashMap::new(),
            output_sizes: HashMap::new(),
            resize_policy,
        }
    }

    pub fn resize_policy(&self) -> ResizePolicy {
        self.resize_policy
    }

    /// Color output target for `camera`, allocated on first request.
    pub fn get_or_create_color_target(
        &mut self,
        allocator: &mut dyn TextureAllocator,
        camera: CameraId,
        width: u32,
        height: u32,
        format: TextureFormat,
    ) -> BackendResult<RenderTarget> {
        let desc = RenderTargetDescriptor::color_output(width, height, format);
        self.get_or_create(allocator, camera, TargetKind::Color, &desc)
    }

    /// Depth output target for `camera`, allocated on first request.
    pub fn get_or_create_depth_target(
        &mut self,
        allocator: &mut dyn TextureAllocator,
        camera: CameraId,
        width: u32,
        height: u32,
    ) -> BackendResult<RenderTarget> {
        let desc = RenderTargetDescriptor::depth_output(width, height);
        self.get_or_create(allocator, camera, TargetKind::Depth, &desc)
    }

    /// Output size for `camera`, computed once.
    pub fn get_or_create_output_size(
        &mut self,
        camera: CameraId,
        width: u32,
        height: u32,
    ) -> OutputTargetSize {
        let policy = self.resize_policy;
        let size = self
            .output_sizes
            .entry(camera)
            .or_insert_with(|| OutputTargetSize::new(width, height));
        if policy == ResizePolicy::Reallocate && !size.matches(width, height) {
            log::debug!(
                "Camera {:?} output size changed to {}x{}",
                camera,
                width,
                height
            );
            *size = OutputTargetSize::new(width, height);
        }
        *size
    }

    fn get_or_create(
        &mut self,
        allocator: &mut dyn TextureAllocator,
        camera: CameraId,
        kind: TargetKind,
        desc: &RenderTargetDescriptor,
    ) -> BackendResult<RenderTarget> {
        let key = (camera, kind);
        if let Some(existing) = self.targets.get(&key).copied() {
            if self.resize_policy == ResizePolicy::Retain || existing.matches(desc) {
                return Ok(existing);
            }
            log::debug!(
                "Reallocating {:?} target of camera {:?}: {}x{} -> {}x{}",
                kind,
                camera,
                existing.width,
                existing.height,
                desc.width,
                desc.height
            );
            self.targets.remove(&key);
            allocator.release(existing.handle);
        }

        let handle = allocator.allocate(desc)?;
        let target = RenderTarget {
            handle,
            kind,
            width: desc.width,
            height: desc.height,
            format: desc.format,
        };
        self.targets.insert(key, target);

        log::debug!(
            "Created {:?} target {:?} for camera {:?} ({}x{})",
            kind,
            handle,
            camera,
            desc.width,
            desc.height
        );
        Ok(target)
    }

    /// Cached target, without allocating
    pub fn get(&self, camera: CameraId, kind: TargetKind) -> Option<RenderTarget> {
        self.targets.get(&(camera, kind)).copied()
    }

    /// Cached output size, without computing it
    pub fn output_size(&self, camera: CameraId) -> Option<OutputTargetSize> {
        self.output_sizes.get(&camera).copied()
    }

    /// Forget a cached output size so the next request recomputes it.
    pub fn invalidate_output_size(&mut self, camera: CameraId) -> bool {
        self.output_sizes.remove(&camera).is_some()
    }

    /// Number of live targets
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty() && self.output_sizes.is_empty()
    }

    /// Number of distinct cameras holding targets or sizes
    pub fn camera_count(&self) -> usize {
        let mut cameras: Vec<CameraId> = self
            .targets
            .keys()
            .map(|(camera, _)| *camera)
            .chain(self.output_sizes.keys().copied())
            .collect();
        cameras.sort_unstable();
        cameras.dedup();
        cameras.len()
    }

    /// Deregister one camera, releasing its targets. Returns how many were released.
    ///
    /// Call before the camera's identity may be reused by the host.
    pub fn release_camera(
        &mut self,
        allocator: &mut dyn TextureAllocator,
        camera: CameraId,
    ) -> usize {
        let mut released = 0;
        for kind in [TargetKind::Color, TargetKind::Depth] {
            if let Some(target) = self.targets.remove(&(camera, kind)) {
                allocator.release(target.handle);
                released += 1;
            }
        }
        self.output_sizes.remove(&camera);

        log::debug!("Released {} targets of camera {:?}", released, camera);
        released
    }

    /// Release every target exactly once and clear the cache.
    ///
    /// Safe to call on an empty cache and to call repeatedly.
    pub fn release_all(&mut self, allocator: &mut dyn TextureAllocator) -> usize {
        let released = self.targets.len();
        for (_, target) in self.targets.drain() {
            allocator.release(target.handle);
        }
        self.output_sizes.clear();

        if released > 0 {
            log::debug!("Released {} cached targets", released);
        }
        released
    }
}

impl Drop for CameraResourceCache {
    fn drop(&mut self) {
        if !self.targets.is_empty() {
            log::warn!(
                "CameraResourceCache dropped with {} live targets; release_all() was not called",
                self.targets.len()
            );
        }
    }
}

//! Common utilities for technique integration tests.
//!
//! Wraps the available allocators behind one context so scenarios can be
//! parameterized over backends with `rstest`.

use glam::Vec3;
use raytracing_tutorials::{
    tutorial::{ShaderAsset, ShaderLibrary},
    Camera, CameraId, DepthConvention, ExtractedCamera, HeadlessAllocator, PipelineContext,
    Projection, TextureAllocator, Transform, TutorialConfig,
};

pub const SHADER_NAME: &str = "primary_rays";

// ============================================================================
// Backend Enumeration
// ============================================================================

/// Allocator backends for testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// Bookkeeping allocator, always available.
    Headless,
    /// wgpu allocator on the first adapter found.
    Wgpu,
}

/// Allocator under test plus backend-specific introspection.
pub enum TestContext {
    Headless(HeadlessAllocator),
    #[cfg(feature = "wgpu-backend")]
    Wgpu(raytracing_tutorials::WgpuAllocator),
}

impl TestContext {
    /// Create a context, or `None` when the backend cannot run here.
    pub fn new(backend: Backend) -> Option<Self> {
        let _ = env_logger::builder().is_test(true).try_init();
        match backend {
            Backend::Headless => Some(Self::Headless(HeadlessAllocator::new())),
            #[cfg(feature = "wgpu-backend")]
            Backend::Wgpu => raytracing_tutorials::WgpuAllocator::new_headless()
                .map(Self::Wgpu)
                .ok(),
            #[cfg(not(feature = "wgpu-backend"))]
            Backend::Wgpu => None,
        }
    }

    pub fn allocator(&mut self) -> &mut dyn TextureAllocator {
        match self {
            Self::Headless(allocator) => allocator,
            #[cfg(feature = "wgpu-backend")]
            Self::Wgpu(allocator) => allocator,
        }
    }

    /// Targets allocated and not yet released
    pub fn live_count(&self) -> usize {
        match self {
            Self::Headless(allocator) => allocator.live_count(),
            #[cfg(feature = "wgpu-backend")]
            Self::Wgpu(allocator) => allocator.live_count(),
        }
    }
}

// ============================================================================
// Scene Helpers
// ============================================================================

pub fn pipeline(convention: DepthConvention) -> PipelineContext {
    PipelineContext::new(
        convention,
        ShaderLibrary::new().with(ShaderAsset::new(SHADER_NAME, "// ray generation")),
    )
}

pub fn config() -> TutorialConfig {
    TutorialConfig {
        shader: Some(SHADER_NAME.into()),
        ..Default::default()
    }
}

/// Perspective camera with a 60 degree vertical field of view.
pub fn camera(
    id: u64,
    position: Vec3,
    width: u32,
    height: u32,
    near: f32,
    far: f32,
) -> ExtractedCamera {
    let projection = Projection::perspective(60.0, width as f32 / height as f32, near, far);
    ExtractedCamera::new(
        CameraId::from_raw(id),
        &Camera::new(width, height, projection),
        &Transform::looking_at(position, Vec3::ZERO, Vec3::Y),
    )
}

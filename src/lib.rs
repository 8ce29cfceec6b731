//! Ray Tracing Tutorials - per-camera render targets and camera parameters for ray tracing techniques
//!
//! Every technique ("tutorial") owns a cache of output targets keyed by camera,
//! and derives shader-facing camera parameters once per camera per frame.
//!
//! # Features
//! - Camera parameter derivation with reverse-Z detection
//! - Per-camera color/depth target cache with explicit resize policy
//! - `init -> render -> dispose` technique lifecycle
//! - Headless allocator for tests and tooling, wgpu allocator for real devices
//! - Camera extraction from a Bevy ECS world

pub mod backend;
pub mod cache;
pub mod camera_params;
pub mod scene;
pub mod shader_globals;
pub mod tutorial;

pub use backend::{BackendError, BackendResult, HeadlessAllocator, TextureAllocator, TextureFormat};
#[cfg(feature = "wgpu-backend")]
pub use backend::wgpu_backend::WgpuAllocator;
pub use cache::{CameraResourceCache, OutputTargetSize, RenderTarget, ResizePolicy, TargetKind};
pub use camera_params::{CameraParameters, CameraShaderGlobals, DepthConvention};
pub use scene::{extract_cameras, Camera, CameraId, ExtractedCamera, Projection, Transform};
pub use shader_globals::ShaderGlobals;
pub use tutorial::{
    CommandRecorder, FrameContext, PipelineContext, PrimaryRayTutorial, Tutorial, TutorialCore,
    TutorialError, TutorialState,
};

/// Configuration for a technique
#[derive(Debug, Clone)]
pub struct TutorialConfig {
    /// Name of the ray generation shader in the pipeline's library
    pub shader: Option<String>,
    /// Format of the per-camera color target
    pub color_format: TextureFormat,
    /// What happens to cached targets when a camera changes size
    pub resize_policy: ResizePolicy,
    /// Override the depth convention reported by the pipeline
    pub depth_convention: Option<DepthConvention>,
}

impl Default for TutorialConfig {
    fn default() -> Self {
        Self {
            shader: None,
            color_format: TextureFormat::Rgba16Float,
            resize_policy: ResizePolicy::default(),
            depth_convention: None,
        }
    }
}

/// Initialize logging from `RUST_LOG`. Safe to call more than once.
#[cfg(not(target_arch = "wasm32"))]
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

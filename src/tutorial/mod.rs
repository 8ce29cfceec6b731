//! Ray tracing technique lifecycle
//!
//! A technique ("tutorial") goes through `Uninitialized -> Ready -> Disposed`.
//! Concrete techniques implement [`Tutorial`] and own a [`TutorialCore`], which
//! composes the camera parameter deriver and the per-camera target cache.

pub mod base;
pub mod commands;
pub mod primary_ray;
pub mod shaders;

pub use base::TutorialCore;
pub use commands::*;
pub use primary_ray::PrimaryRayTutorial;
pub use shaders::*;

use thiserror::Error;

use crate::backend::{BackendError, TextureAllocator};
use crate::camera_params::DepthConvention;
use crate::scene::ExtractedCamera;
use crate::shader_globals::ShaderGlobals;

/// Tutorial error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TutorialError {
    #[error("No shader configured for this technique")]
    MissingShaderReference,
    #[error("Shader '{0}' not found in the pipeline's shader library")]
    ShaderNotFound(String),
    #[error("Technique has been disposed")]
    Disposed,
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Lifecycle state of a technique
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TutorialState {
    #[default]
    Uninitialized,
    Ready,
    Disposed,
}

/// What the host pipeline provides at init time
#[derive(Debug, Clone, Default)]
pub struct PipelineContext {
    /// Clip-space depth convention of the device
    pub depth_convention: DepthConvention,
    pub shaders: ShaderLibrary,
}

impl PipelineContext {
    pub fn new(depth_convention: DepthConvention, shaders: ShaderLibrary) -> Self {
        Self {
            depth_convention,
            shaders,
        }
    }
}

/// Per-frame context passed to [`Tutorial::render`]
pub struct FrameContext<'a> {
    pub allocator: &'a mut dyn TextureAllocator,
    pub commands: &'a mut CommandRecorder,
    pub globals: ShaderGlobals,
    pub frame_index: u64,
}

impl<'a> FrameContext<'a> {
    pub fn new(
        allocator: &'a mut dyn TextureAllocator,
        commands: &'a mut CommandRecorder,
        frame_index: u64,
    ) -> Self {
        Self {
            allocator,
            commands,
            globals: ShaderGlobals::new(),
            frame_index,
        }
    }
}

/// Trait for ray tracing techniques
pub trait Tutorial {
    /// Get the technique name for debugging
    fn name(&self) -> &str;

    fn state(&self) -> TutorialState;

    /// Bind to the pipeline and resolve required assets.
    ///
    /// An error means the technique stays disabled for the session.
    fn init(&mut self, pipeline: &PipelineContext) -> Result<(), TutorialError>;

    /// Render one camera. Safe to call before `init`; only camera parameters
    /// are published in that case.
    fn render(
        &mut self,
        frame: &mut FrameContext,
        camera: &ExtractedCamera,
    ) -> Result<(), TutorialError>;

    /// Release every cached target. Idempotent.
    fn dispose(&mut self, allocator: &mut dyn TextureAllocator);
}

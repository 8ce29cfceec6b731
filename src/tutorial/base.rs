//! Collaborators shared by every technique.

use std::sync::Arc;

use crate::backend::TextureAllocator;
use crate::cache::{CameraResourceCache, OutputTargetSize, RenderTarget};
use crate::camera_params::{CameraParameters, CameraShaderGlobals};
use crate::scene::{CameraId, ExtractedCamera};
use crate::TutorialConfig;

use super::{FrameContext, PipelineContext, ShaderAsset, TutorialError, TutorialState};

/// State machine plus the parameter deriver and target cache a technique owns.
///
/// Techniques reach the cache only through the accessors here, which always
/// size targets from the camera being rendered.
#[derive(Debug)]
pub struct TutorialCore {
    state: TutorialState,
    config: TutorialConfig,
    params: CameraParameters,
    cache: CameraResourceCache,
    shader: Option<Arc<ShaderAsset>>,
}

impl TutorialCore {
    pub fn new(config: TutorialConfig) -> Self {
        let params = CameraParameters::new(config.depth_convention.unwrap_or_default());
        let cache = CameraResourceCache::new(config.resize_policy);
        Self {
            state: TutorialState::Uninitialized,
            config,
            params,
            cache,
            shader: None,
        }
    }

    pub fn state(&self) -> TutorialState {
        self.state
    }

    pub fn config(&self) -> &TutorialConfig {
        &self.config
    }

    pub fn params(&self) -> &CameraParameters {
        &self.params
    }

    pub fn cache(&self) -> &CameraResourceCache {
        &self.cache
    }

    /// Shader resolved during init
    pub fn shader(&self) -> Option<&Arc<ShaderAsset>> {
        self.shader.as_ref()
    }

    /// Resolve the configured shader and move to `Ready`.
    pub fn bind(&mut self, pipeline: &PipelineContext) -> Result<Arc<ShaderAsset>, TutorialError> {
        if self.state == TutorialState::Disposed {
            return Err(TutorialError::Disposed);
        }

        let name = self
            .config
            .shader
            .as_deref()
            .ok_or(TutorialError::MissingShaderReference)?;
        let shader = pipeline
            .shaders
            .get(name)
            .ok_or_else(|| TutorialError::ShaderNotFound(name.to_string()))?;

        self.params.convention = self
            .config
            .depth_convention
            .unwrap_or(pipeline.depth_convention);
        self.shader = Some(shader.clone());
        self.state = TutorialState::Ready;

        log::debug!(
            "Technique bound to shader '{}' ({:?})",
            shader.name,
            self.params.convention
        );
        Ok(shader)
    }

    /// Publish camera parameters for this frame.
    ///
    /// Returns whether the technique is ready to dispatch work. A disposed
    /// technique publishes nothing.
    pub fn begin_render(&mut self, frame: &mut FrameContext, camera: &ExtractedCamera) -> bool {
        match self.state {
            TutorialState::Disposed => {
                log::warn!("Render called on a disposed technique, ignoring");
                false
            }
            TutorialState::Uninitialized => {
                self.apply_camera(frame, camera);
                false
            }
            TutorialState::Ready => {
                self.apply_camera(frame, camera);
                true
            }
        }
    }

    pub fn apply_camera(
        &self,
        frame: &mut FrameContext,
        camera: &ExtractedCamera,
    ) -> CameraShaderGlobals {
        self.params.apply(camera, &mut frame.globals)
    }

    /// Color output target sized to the camera, in the configured format
    pub fn color_target(
        &mut self,
        frame: &mut FrameContext,
        camera: &ExtractedCamera,
    ) -> Result<RenderTarget, TutorialError> {
        let (width, height) = camera.pixel_size();
        Ok(self.cache.get_or_create_color_target(
            &mut *frame.allocator,
            camera.id,
            width,
            height,
            self.config.color_format,
        )?)
    }

    /// Depth output target sized to the camera
    pub fn depth_target(
        &mut self,
        frame: &mut FrameContext,
        camera: &ExtractedCamera,
    ) -> Result<RenderTarget, TutorialError> {
        let (width, height) = camera.pixel_size();
        Ok(self
            .cache
            .get_or_create_depth_target(&mut *frame.allocator, camera.id, width, height)?)
    }

    pub fn output_size(&mut self, camera: &ExtractedCamera) -> OutputTargetSize {
        let (width, height) = camera.pixel_size();
        self.cache.get_or_create_output_size(camera.id, width, height)
    }

    /// Release one camera's targets, e.g. after its entity was despawned.
    pub fn release_camera(
        &mut self,
        allocator: &mut dyn TextureAllocator,
        camera: CameraId,
    ) -> usize {
        self.cache.release_camera(allocator, camera)
    }

    /// Release all cached targets and enter the terminal state.
    pub fn dispose(&mut self, allocator: &mut dyn TextureAllocator) {
        let released = self.cache.release_all(allocator);
        if self.state != TutorialState::Disposed {
            log::debug!("Technique disposed, released {} targets", released);
        }
        self.state = TutorialState::Disposed;
        self.shader = None;
    }
}

//! Primary ray technique: one ray per pixel into the camera's color and depth targets.

use crate::backend::TextureAllocator;
use crate::scene::ExtractedCamera;
use crate::shader_globals;
use crate::TutorialConfig;

use super::{
    FrameContext, PipelineContext, RayDispatch, Tutorial, TutorialCore, TutorialError,
    TutorialState,
};

pub struct PrimaryRayTutorial {
    core: TutorialCore,
}

impl PrimaryRayTutorial {
    pub fn new(config: TutorialConfig) -> Self {
        Self {
            core: TutorialCore::new(config),
        }
    }

    pub fn core(&self) -> &TutorialCore {
        &self.core
    }

    pub fn core_mut(&mut self) -> &mut TutorialCore {
        &mut self.core
    }
}

impl Tutorial for PrimaryRayTutorial {
    fn name(&self) -> &str {
        "primary_rays"
    }

    fn state(&self) -> TutorialState {
        self.core.state()
    }

    fn init(&mut self, pipeline: &PipelineContext) -> Result<(), TutorialError> {
        self.core.bind(pipeline).map(|_| ()).map_err(|e| {
            log::error!("Failed to initialize {}: {}", self.name(), e);
            e
        })
    }

    fn render(
        &mut self,
        frame: &mut FrameContext,
        camera: &ExtractedCamera,
    ) -> Result<(), TutorialError> {
        if !self.core.begin_render(frame, camera) {
            return Ok(());
        }
        let Some(shader) = self.core.shader().cloned() else {
            return Ok(());
        };

        let color = self.core.color_target(frame, camera)?;
        let depth = self.core.depth_target(frame, camera)?;
        let size = self.core.output_size(camera);
        frame
            .globals
            .set_vector(shader_globals::OUTPUT_TARGET_SIZE, size.as_vec4());

        frame.commands.dispatch_rays(RayDispatch {
            shader,
            camera: camera.id,
            color,
            depth,
            width: color.width,
            height: color.height,
            globals: frame.globals.clone(),
        });
        Ok(())
    }

    fn dispose(&mut self, allocator: &mut dyn TextureAllocator) {
        self.core.dispose(allocator);
    }
}

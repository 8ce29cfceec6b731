//! Recorded GPU work for one frame

use std::sync::Arc;

use crate::cache::RenderTarget;
use crate::scene::CameraId;
use crate::shader_globals::ShaderGlobals;

use super::ShaderAsset;

/// A ray generation dispatch over a camera's output target
#[derive(Debug, Clone)]
pub struct RayDispatch {
    pub shader: Arc<ShaderAsset>,
    pub camera: CameraId,
    pub color: RenderTarget,
    pub depth: RenderTarget,
    pub width: u32,
    pub height: u32,
    /// Globals as they were when the dispatch was recorded
    pub globals: ShaderGlobals,
}

/// Buffered command
#[derive(Debug, Clone)]
pub enum RenderCommand {
    DispatchRays(RayDispatch),
}

/// Opaque command recording handle handed to techniques by the host.
#[derive(Debug, Default)]
pub struct CommandRecorder {
    commands: Vec<RenderCommand>,
}

impl CommandRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch_rays(&mut self, dispatch: RayDispatch) {
        log::trace!(
            "Recorded ray dispatch '{}' for camera {:?} ({}x{})",
            dispatch.shader.name,
            dispatch.camera,
            dispatch.width,
            dispatch.height
        );
        self.commands.push(RenderCommand::DispatchRays(dispatch));
    }

    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Hand recorded commands to the submitter, leaving the recorder empty
    pub fn take(&mut self) -> Vec<RenderCommand> {
        std::mem::take(&mut self.commands)
    }
}

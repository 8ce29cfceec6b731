//! Camera parameter derivation.
//!
//! Turns an [`ExtractedCamera`] into the parameter set ray tracing shaders read:
//! world position, view-projection and its inverse, far clip distance, and the
//! depth reconstruction vector. The reconstruction vector depends on whether the
//! device uses a reversed depth buffer, which is detected from the device-space
//! projection matrix itself.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};

use crate::scene::ExtractedCamera;
use crate::shader_globals::{self, ShaderGlobals};

/// Clip-space depth convention of the target device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DepthConvention {
    /// z in [-w, w], near maps to -1 (OpenGL)
    NegativeOneToOne,
    /// z in [0, w], near maps to 0
    ZeroToOne,
    /// z in [0, w], near maps to 1 and far to 0
    #[default]
    ZeroToOneReversed,
}

impl DepthConvention {
    fn flips_y_for_textures(&self) -> bool {
        !matches!(self, DepthConvention::NegativeOneToOne)
    }
}

/// Convert a GL-style projection matrix into the device convention.
///
/// With `render_into_texture` set, conventions whose texture space is Y-down get
/// their Y axis flipped.
pub fn gpu_projection_matrix(
    projection: Mat4,
    convention: DepthConvention,
    render_into_texture: bool,
) -> Mat4 {
    // z' = scale * z + bias * w
    let (scale, bias) = match convention {
        DepthConvention::NegativeOneToOne => (1.0, 0.0),
        DepthConvention::ZeroToOne => (0.5, 0.5),
        DepthConvention::ZeroToOneReversed => (-0.5, 0.5),
    };
    let flip = if render_into_texture && convention.flips_y_for_textures() {
        -1.0
    } else {
        1.0
    };

    let remap = Mat4::from_cols(
        Vec4::X,
        Vec4::new(0.0, flip, 0.0, 0.0),
        Vec4::new(0.0, 0.0, scale, 0.0),
        Vec4::new(0.0, 0.0, bias, 1.0),
    );
    remap * projection
}

/// Whether a device-space projection writes reversed depth.
///
/// Looks at the row 2, column 3 element scaled by `(f - n) / (f * n)`; it is
/// positive only for reversed depth.
pub fn is_reversed_z(gpu_projection: Mat4, near: f32, far: f32) -> bool {
    let m23 = gpu_projection.w_axis.z;
    m23 * (far - near) / (far * near) > 0.0
}

/// Depth reconstruction parameters for linearising device depth.
pub fn z_buffer_params(near: f32, far: f32, reversed: bool) -> Vec4 {
    if reversed {
        Vec4::new(-1.0 + far / near, 1.0, -1.0 / far + 1.0 / near, 1.0 / far)
    } else {
        Vec4::new(1.0 - far / near, far / near, 1.0 / far - 1.0 / near, 1.0 / near)
    }
}

/// Camera parameters as laid out in the shader uniform block
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CameraShaderGlobals {
    pub view_proj: Mat4,
    pub inv_view_proj: Mat4,
    pub world_position: Vec4, // w = 1
    pub z_buffer_params: Vec4,
    pub far_clip: f32,
    pub _padding: [f32; 3],
}

impl CameraShaderGlobals {
    /// Raw bytes for a uniform buffer upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }

    /// Publish every parameter under its global name
    pub fn publish(&self, globals: &mut ShaderGlobals) {
        globals.set_vector(shader_globals::CAMERA_WORLD_POSITION, self.world_position);
        globals.set_matrix(shader_globals::VIEW_PROJ, self.view_proj);
        globals.set_matrix(shader_globals::INV_VIEW_PROJ, self.inv_view_proj);
        globals.set_float(shader_globals::FAR_CLIP, self.far_clip);
        globals.set_vector(shader_globals::Z_BUFFER_PARAMS, self.z_buffer_params);
    }
}

/// Derives shader parameters for cameras rendered on one device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CameraParameters {
    pub convention: DepthConvention,
}

impl CameraParameters {
    pub fn new(convention: DepthConvention) -> Self {
        Self { convention }
    }

    /// Compute the parameter set. Degenerate cameras yield NaN/Inf, never an error.
    pub fn derive(&self, camera: &ExtractedCamera) -> CameraShaderGlobals {
        let proj = gpu_projection_matrix(camera.projection_matrix, self.convention, false);
        let view_proj = proj * camera.view_matrix;
        let inv_view_proj = view_proj.inverse();

        let reversed = is_reversed_z(proj, camera.near, camera.far);

        CameraShaderGlobals {
            view_proj,
            inv_view_proj,
            world_position: camera.position.extend(1.0),
            z_buffer_params: z_buffer_params(camera.near, camera.far, reversed),
            far_clip: camera.far,
            _padding: [0.0; 3],
        }
    }

    /// Derive and publish into `globals`.
    pub fn apply(
        &self,
        camera: &ExtractedCamera,
        globals: &mut ShaderGlobals,
    ) -> CameraShaderGlobals {
        let params = self.derive(camera);
        params.publish(globals);
        params
    }
}

//! Named shader globals for one frame.
//!
//! Instead of process-wide ambient state, globals live in a [`ShaderGlobals`]
//! value owned by the current frame. Dispatches snapshot it, so parameters of
//! two cameras can never mix within one dispatch.

use std::collections::HashMap;

use glam::{Mat4, Vec4};

/// World-space camera position, `w = 1`
pub const CAMERA_WORLD_POSITION: &str = "camera_world_position";
/// View-projection matrix in the device convention
pub const VIEW_PROJ: &str = "view_proj";
/// Inverse of [`VIEW_PROJ`]
pub const INV_VIEW_PROJ: &str = "inv_view_proj";
/// Far clip distance
pub const FAR_CLIP: &str = "far_clip";
/// Depth reconstruction parameters
pub const Z_BUFFER_PARAMS: &str = "z_buffer_params";
/// `(w, h, 1/w, 1/h)` of the output target
pub const OUTPUT_TARGET_SIZE: &str = "output_target_size";

/// A single global value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GlobalValue {
    Float(f32),
    Vector(Vec4),
    Matrix(Mat4),
}

/// Last-writer-wins store of named globals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShaderGlobals {
    values: HashMap<&'static str, GlobalValue>,
}

impl ShaderGlobals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_float(&mut self, name: &'static str, value: f32) {
        self.values.insert(name, GlobalValue::Float(value));
    }

    pub fn set_vector(&mut self, name: &'static str, value: Vec4) {
        self.values.insert(name, GlobalValue::Vector(value));
    }

    pub fn set_matrix(&mut self, name: &'static str, value: Mat4) {
        self.values.insert(name, GlobalValue::Matrix(value));
    }

    pub fn get(&self, name: &str) -> Option<GlobalValue> {
        self.values.get(name).copied()
    }

    /// Float value, `None` if unset or of another type
    pub fn float(&self, name: &str) -> Option<f32> {
        match self.get(name)? {
            GlobalValue::Float(v) => Some(v),
            _ => None,
        }
    }

    pub fn vector(&self, name: &str) -> Option<Vec4> {
        match self.get(name)? {
            GlobalValue::Vector(v) => Some(v),
            _ => None,
        }
    }

    pub fn matrix(&self, name: &str) -> Option<Mat4> {
        match self.get(name)? {
            GlobalValue::Matrix(m) => Some(m),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_accessors() {
        let mut globals = ShaderGlobals::new();
        globals.set_float(FAR_CLIP, 500.0);
        globals.set_vector(Z_BUFFER_PARAMS, Vec4::ONE);
        globals.set_matrix(VIEW_PROJ, Mat4::IDENTITY);

        assert_eq!(globals.float(FAR_CLIP), Some(500.0));
        assert_eq!(globals.vector(Z_BUFFER_PARAMS), Some(Vec4::ONE));
        assert_eq!(globals.matrix(VIEW_PROJ), Some(Mat4::IDENTITY));
        assert_eq!(globals.vector(FAR_CLIP), None);
        assert_eq!(globals.float(INV_VIEW_PROJ), None);
        assert_eq!(globals.len(), 3);
    }

    #[test]
    fn last_writer_wins() {
        let mut globals = ShaderGlobals::new();
        globals.set_float(FAR_CLIP, 100.0);
        globals.set_float(FAR_CLIP, 200.0);
        assert_eq!(globals.float(FAR_CLIP), Some(200.0));
        assert_eq!(globals.len(), 1);
    }
}

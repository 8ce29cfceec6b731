//! Transform component

use bevy_ecs::prelude::*;
use glam::{Mat3, Mat4, Quat, Vec3};

/// Transform component placing a camera in world space
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Place at `position` oriented towards `target`
    pub fn looking_at(position: Vec3, target: Vec3, up: Vec3) -> Self {
        let mut transform = Self::from_position(position);
        transform.look_at(target, up);
        transform
    }

    /// Local-to-world matrix
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }

    /// World-to-local matrix, i.e. the view matrix for a camera
    pub fn inverse_matrix(&self) -> Mat4 {
        let inv_rotation = self.rotation.inverse();
        Mat4::from_rotation_translation(inv_rotation, inv_rotation * -self.position)
    }

    /// Get forward direction (local -Z in world space)
    pub fn forward(&self) -> Vec3 {
        self.rotation * -Vec3::Z
    }

    /// Get up direction (local +Y in world space)
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Look at a target position
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        let forward = (target - self.position).normalize();
        let right = forward.cross(up).normalize();
        let up = right.cross(forward);

        self.rotation = Quat::from_mat3(&Mat3::from_cols(right, up, -forward));
    }
}

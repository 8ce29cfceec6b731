//! Camera components and per-frame camera snapshots

use bevy_ecs::prelude::*;
use glam::{Mat4, Vec3};

use super::Transform;

/// Stable identity of a camera, used as a cache key.
///
/// Built from an ECS entity, the id includes the entity generation, so a
/// despawned camera whose index gets recycled never aliases the old id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CameraId(u64);

impl CameraId {
    /// Id for hosts that track cameras without an ECS.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl From<Entity> for CameraId {
    fn from(entity: Entity) -> Self {
        Self(entity.to_bits())
    }
}

/// Camera projection type.
///
/// Matrices are produced in the GL clip convention (z in [-w, w]); conversion to
/// the device convention happens when camera parameters are derived.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    Perspective {
        fov_y: f32,
        aspect: f32,
        near: f32,
        far: f32,
    },
    Orthographic {
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    },
}

impl Default for Projection {
    fn default() -> Self {
        Projection::Perspective {
            fov_y: std::f32::consts::FRAC_PI_3,
            aspect: 16.0 / 9.0,
            near: 0.3,
            far: 1000.0,
        }
    }
}

impl Projection {
    pub fn perspective(fov_y_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Projection::Perspective {
            fov_y: fov_y_degrees.to_radians(),
            aspect,
            near,
            far,
        }
    }

    pub fn orthographic(width: f32, height: f32, near: f32, far: f32) -> Self {
        let half_w = width / 2.0;
        let half_h = height / 2.0;
        Projection::Orthographic {
            left: -half_w,
            right: half_w,
            bottom: -half_h,
            top: half_h,
            near,
            far,
        }
    }

    pub fn matrix(&self) -> Mat4 {
        match self {
            Projection::Perspective {
                fov_y,
                aspect,
                near,
                far,
            } => Mat4::perspective_rh_gl(*fov_y, *aspect, *near, *far),
            Projection::Orthographic {
                left,
                right,
                bottom,
                top,
                near,
                far,
            } => Mat4::orthographic_rh_gl(*left, *right, *bottom, *top, *near, *far),
        }
    }

    pub fn near(&self) -> f32 {
        match self {
            Projection::Perspective { near, .. } => *near,
            Projection::Orthographic { near, .. } => *near,
        }
    }

    pub fn far(&self) -> f32 {
        match self {
            Projection::Perspective { far, .. } => *far,
            Projection::Orthographic { far, .. } => *far,
        }
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        if let Projection::Perspective { aspect: a, .. } = self {
            *a = aspect;
        }
    }
}

/// Camera component. Placement comes from the entity's [`Transform`].
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Camera {
    pub projection: Projection,
    /// Output size in pixels
    pub pixel_width: u32,
    pub pixel_height: u32,
    /// Render order, lower first
    pub order: i32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(1920, 1080, Projection::default())
    }
}

impl Camera {
    pub fn new(pixel_width: u32, pixel_height: u32, projection: Projection) -> Self {
        let mut camera = Self {
            projection,
            pixel_width,
            pixel_height,
            order: 0,
        };
        camera.set_pixel_size(pixel_width, pixel_height);
        camera
    }

    /// Resize the output, keeping a perspective aspect ratio in sync
    pub fn set_pixel_size(&mut self, width: u32, height: u32) {
        self.pixel_width = width;
        self.pixel_height = height;
        if height > 0 {
            self.projection.set_aspect(width as f32 / height as f32);
        }
    }
}

/// Snapshot of everything the renderer needs from one camera for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedCamera {
    pub id: CameraId,
    /// World-space camera position
    pub position: Vec3,
    pub local_to_world: Mat4,
    /// World-to-view matrix
    pub view_matrix: Mat4,
    /// Projection matrix in the GL clip convention
    pub projection_matrix: Mat4,
    pub near: f32,
    pub far: f32,
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub order: i32,
}

impl ExtractedCamera {
    pub fn new(id: CameraId, camera: &Camera, transform: &Transform) -> Self {
        Self {
            id,
            position: transform.position,
            local_to_world: transform.matrix(),
            view_matrix: transform.inverse_matrix(),
            projection_matrix: camera.projection.matrix(),
            near: camera.projection.near(),
            far: camera.projection.far(),
            pixel_width: camera.pixel_width,
            pixel_height: camera.pixel_height,
            order: camera.order,
        }
    }

    /// Pixel size as (width, height)
    pub fn pixel_size(&self) -> (u32, u32) {
        (self.pixel_width, self.pixel_height)
    }
}

/// Snapshot every camera in the world, ordered by render order then id.
pub fn extract_cameras(world: &mut World) -> Vec<ExtractedCamera> {
    let mut query = world.query::<(Entity, &Camera, &Transform)>();
    let mut cameras: Vec<ExtractedCamera> = query
        .iter(world)
        .map(|(entity, camera, transform)| {
            ExtractedCamera::new(CameraId::from(entity), camera, transform)
        })
        .collect();
    cameras.sort_by(|a, b| a.order.cmp(&b.order).then(a.id.cmp(&b.id)));

    log::trace!("Extracted {} cameras", cameras.len());
    cameras
}

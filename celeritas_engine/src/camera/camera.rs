/// Perspective camera described by position, facing direction and up vector

use glam::{Mat4, Vec3};

/// Near clip plane distance
pub const DEFAULT_NEAR: f32 = 0.1;
/// Far clip plane distance
pub const DEFAULT_FAR: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    /// Facing direction (need not be normalized)
    pub front: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians
    pub fov: f32,
}

impl Camera {
    pub fn new(position: Vec3, front: Vec3, up: Vec3, fov: f32) -> Self {
        Self { position, front, up, fov }
    }

    /// Camera at `position` looking at `target`, +Y up
    pub fn looking_at(position: Vec3, target: Vec3, fov: f32) -> Self {
        Self::new(position, target - position, Vec3::Y, fov)
    }

    /// Right-handed look-at matrix towards `position + front`
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    /// Perspective projection for a `width` x `height` surface
    pub fn projection_matrix(&self, width: f32, height: f32) -> Mat4 {
        let aspect = if height > 0.0 { width / height } else { 1.0 };
        Mat4::perspective_rh_gl(self.fov, aspect, DEFAULT_NEAR, DEFAULT_FAR)
    }

    /// `(view, projection)`
    pub fn view_projection(&self, width: f32, height: f32) -> (Mat4, Mat4) {
        (self.view_matrix(), self.projection_matrix(width, height))
    }
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;

/// Fixed look-at camera and the per-frame view/projection block

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::renderer::sync::Extent2D;

/// Contents of the per-frame uniform buffer (set 1)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ViewProjection {
    pub view: Mat4,
    pub projection: Mat4,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fovy_radians: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 3.5),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fovy_radians: 45f32.to_radians(),
            near: 1.0,
            far: 1000.0,
        }
    }
}

impl Camera {
    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    /// Right-handed perspective with Y flipped for Vulkan clip space
    pub fn projection(&self, aspect_ratio: f32) -> Mat4 {
        let mut projection = Mat4::perspective_rh(self.fovy_radians, aspect_ratio, self.near, self.far);
        projection.y_axis.y *= -1.0;
        projection
    }

    pub fn view_projection(&self, extent: Extent2D) -> ViewProjection {
        ViewProjection {
            view: self.view(),
            projection: self.projection(extent.aspect_ratio()),
        }
    }
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;

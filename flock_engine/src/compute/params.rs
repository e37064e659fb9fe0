/// Boids simulation parameters
///
/// Uploaded once per frame into the slot's uniform buffer and read by
/// `shaders/boids.comp`. The layout matches the shader's std140 block.

use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};

use crate::config::{INSTANCE_COUNT, INSTANCE_SPACING};

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SimParams {
    /// xyz used, w ignored
    pub bounds_min: Vec4,
    pub bounds_max: Vec4,
    /// Seconds since this slot last advanced
    pub delta_time: f32,
    pub separation_distance: f32,
    pub alignment_distance: f32,
    pub cohesion_distance: f32,
    pub separation_weight: f32,
    pub alignment_weight: f32,
    pub cohesion_weight: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    pub instance_count: u32,
    pub _pad: [u32; 2],
}

impl Default for SimParams {
    fn default() -> Self {
        let half_width = (INSTANCE_COUNT as f32 - 1.0) * INSTANCE_SPACING * 0.5 + INSTANCE_SPACING;
        Self {
            bounds_min: Vec4::new(-half_width, -16.0, -16.0, 0.0),
            bounds_max: Vec4::new(half_width, 16.0, 16.0, 0.0),
            delta_time: 0.0,
            separation_distance: 2.0,
            alignment_distance: 5.0,
            cohesion_distance: 8.0,
            separation_weight: 1.5,
            alignment_weight: 1.0,
            cohesion_weight: 0.8,
            min_speed: 1.0,
            max_speed: 4.0,
            instance_count: INSTANCE_COUNT,
            _pad: [0; 2],
        }
    }
}

impl SimParams {
    pub fn with_delta_time(mut self, delta_time: f32) -> Self {
        self.delta_time = delta_time;
        self
    }

    pub fn bounds(&self) -> (Vec3, Vec3) {
        (self.bounds_min.truncate(), self.bounds_max.truncate())
    }

    /// Whether `point` lies inside the simulation domain
    pub fn contains(&self, point: Vec3) -> bool {
        let (min, max) = self.bounds();
        point.cmpge(min).all() && point.cmple(max).all()
    }
}

#[cfg(test)]
#[path = "params_tests.rs"]
mod tests;

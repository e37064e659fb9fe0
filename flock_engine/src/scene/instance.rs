/// Per-instance simulation state
///
/// Transforms and velocities are seeded on the CPU once, uploaded into
/// every slot's storage buffers, and from then on only advanced by the
/// compute shader.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::compute::SimParams;
use crate::config::INSTANCE_SPACING;

/// One instance transform (std430 `mat4`)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct InstanceData {
    pub model: Mat4,
}

impl InstanceData {
    pub const SIZE: u64 = std::mem::size_of::<InstanceData>() as u64;

    pub fn position(&self) -> Vec3 {
        self.model.w_axis.truncate()
    }
}

/// `count` transforms on a row along X, spaced `INSTANCE_SPACING` apart and centred on the origin
pub fn initial_instances(count: u32) -> Vec<InstanceData> {
    let centre = (count.saturating_sub(1)) as f32 * INSTANCE_SPACING * 0.5;
    (0..count)
        .map(|i| InstanceData {
            model: Mat4::from_translation(Vec3::new(i as f32 * INSTANCE_SPACING - centre, 0.0, 0.0)),
        })
        .collect()
}

/// Seed of the velocity generator; the same seed gives every run the same flock
pub const VELOCITY_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

/// Deterministic velocities: pseudo-random directions with speeds in `[min_speed, max_speed]`
///
/// The `w` component is unused and kept at 0 (std430 `vec4`).
pub fn initial_velocities(count: u32, params: &SimParams) -> Vec<Vec4> {
    let mut rng = StdRng::seed_from_u64(VELOCITY_SEED);

    (0..count)
        .map(|_| {
            // Uniform direction on the unit sphere
            let z: f32 = rng.gen_range(-1.0..=1.0);
            let phi: f32 = rng.gen_range(0.0..std::f32::consts::TAU);
            let r = (1.0 - z * z).max(0.0).sqrt();
            let direction = Vec3::new(r * phi.cos(), r * phi.sin(), z);
            let speed = params.min_speed + rng.gen::<f32>() * (params.max_speed - params.min_speed);
            (direction * speed).extend(0.0)
        })
        .collect()
}

#[cfg(test)]
#[path = "instance_tests.rs"]
mod tests;

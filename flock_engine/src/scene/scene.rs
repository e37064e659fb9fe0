/// Scene - everything the renderer draws and simulates
///
/// Owned by the application and passed by reference to the renderer each
/// frame. There is no global scene state.

use std::time::Instant;

use glam::Vec4;

use crate::compute::SimParams;
use crate::config::INSTANCE_COUNT;
use crate::frame::{FrameSlot, FrameStats, SlotClock};
use crate::renderer::sync::Extent2D;
use crate::scene::camera::{Camera, ViewProjection};
use crate::scene::instance::{initial_instances, initial_velocities, InstanceData};
use crate::scene::material::{ImageData, Material, MaterialConstants};
use crate::scene::mesh::MeshData;
use crate::scene::texture_table::{TextureHandle, TextureTable};

/// Name of the texture every table starts with
pub const DEFAULT_TEXTURE_NAME: &str = "default_white";

#[derive(Debug)]
pub struct Scene {
    pub mesh: MeshData,
    pub material: Material,
    pub textures: TextureTable<ImageData>,
    /// Sampled by the environment pass; `None` skips it
    pub environment: Option<TextureHandle>,
    /// Seed state, uploaded once into every slot
    pub instances: Vec<InstanceData>,
    pub velocities: Vec<Vec4>,
    pub sim_params: SimParams,
    pub camera: Camera,
    pub clock: SlotClock,
    pub stats: FrameStats,
}

impl Scene {
    /// A scene of `mesh` drawn `INSTANCE_COUNT` times with the default material
    pub fn new(mesh: MeshData) -> Self {
        Self::with_instance_count(mesh, INSTANCE_COUNT)
    }

    pub fn with_instance_count(mesh: MeshData, instance_count: u32) -> Self {
        let textures = TextureTable::new(DEFAULT_TEXTURE_NAME, ImageData::white());
        let material = Material::new(textures.default_handle());
        let sim_params = SimParams {
            instance_count,
            ..SimParams::default()
        };

        Self {
            mesh,
            material,
            textures,
            environment: None,
            instances: initial_instances(instance_count),
            velocities: initial_velocities(instance_count, &sim_params),
            sim_params,
            camera: Camera::default(),
            clock: SlotClock::new(Instant::now()),
            stats: FrameStats::new(),
        }
    }

    pub fn instance_count(&self) -> u32 {
        self.instances.len() as u32
    }

    /// Bytes of one slot's instance buffer
    pub fn instance_bytes(&self) -> u64 {
        self.instances.len() as u64 * InstanceData::SIZE
    }

    /// Bytes of one slot's velocity buffer
    pub fn velocity_bytes(&self) -> u64 {
        (self.velocities.len() * std::mem::size_of::<Vec4>()) as u64
    }

    /// Restart the per-slot simulation clock, right after the seed upload
    pub fn reset_clock(&mut self, now: Instant) {
        self.clock = SlotClock::new(now);
    }

    /// Advance timing for the frame in `slot` and return its simulation parameters
    ///
    /// `instance_count` never exceeds the seeded instances, so the shader
    /// stays inside the storage buffers.
    pub fn advance(&mut self, slot: FrameSlot, now: Instant) -> SimParams {
        self.stats.tick(now);
        let delta_time = self.clock.advance(slot, now);
        let mut params = self.sim_params.with_delta_time(delta_time);
        params.instance_count = params.instance_count.min(self.instance_count());
        params
    }

    pub fn view_projection(&self, extent: Extent2D) -> ViewProjection {
        self.camera.view_projection(extent)
    }

    pub fn material_constants(&self) -> MaterialConstants {
        self.material.constants(&self.textures, self.environment)
    }
}

#[cfg(test)]
#[path = "scene_tests.rs"]
mod tests;

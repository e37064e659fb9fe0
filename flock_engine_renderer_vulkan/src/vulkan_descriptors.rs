/// VulkanDescriptors - Set layouts, pool and the sets of every tier
///
/// Sets 0 and 1 and the compute set exist once per frame slot. The shared
/// sampler array (set 2) exists once and is written at load time.

use ash::vk;
use flock_engine::flock::config::PENDING_FRAMES;
use flock_engine::flock::descriptor::{BindingKind, DescriptorPoolSizing, SetLayoutDesc};
use flock_engine::flock::frame::{FrameSlot, PerSlot};
use flock_engine::flock::Result;
use flock_engine::{engine_bail_warn, engine_debug};
use std::sync::Arc;

use crate::vulkan_context::{map_vk_error, GpuContext};
use crate::vulkan_convert::{descriptor_type_to_vk, shader_stages_to_vk};
use crate::vulkan_memory::VulkanBuffer;

#[derive(Clone, Copy)]
struct SlotSets {
    dynamic: vk::DescriptorSet,
    per_frame: vk::DescriptorSet,
    compute: vk::DescriptorSet,
}

/// Buffers bound by one slot's sets
pub struct SlotBindings<'a> {
    pub instances: &'a VulkanBuffer,
    pub velocities: &'a VulkanBuffer,
    pub camera: &'a VulkanBuffer,
    pub sim_params: &'a VulkanBuffer,
}

pub struct VulkanDescriptors {
    ctx: Arc<GpuContext>,
    pool: vk::DescriptorPool,
    graphics_descs: Vec<SetLayoutDesc>,
    compute_desc: SetLayoutDesc,
    graphics_layouts: Vec<vk::DescriptorSetLayout>,
    compute_layout: vk::DescriptorSetLayout,
    slots: PerSlot<SlotSets>,
    shared: vk::DescriptorSet,
    texture_capacity: u32,
}

impl VulkanDescriptors {
    /// Layouts and sets for a sampler array of `texture_capacity` entries
    pub fn new(ctx: Arc<GpuContext>, texture_capacity: u32) -> Result<Self> {
        let graphics_descs = SetLayoutDesc::graphics(texture_capacity);
        let compute_desc = SetLayoutDesc::compute();

        let mut this = Self {
            ctx,
            pool: vk::DescriptorPool::null(),
            graphics_descs,
            compute_desc,
            graphics_layouts: Vec::new(),
            compute_layout: vk::DescriptorSetLayout::null(),
            slots: PerSlot::from_fn(|_| SlotSets {
                dynamic: vk::DescriptorSet::null(),
                per_frame: vk::DescriptorSet::null(),
                compute: vk::DescriptorSet::null(),
            }),
            shared: vk::DescriptorSet::null(),
            texture_capacity: texture_capacity.max(1),
        };

        // Drop cleans up whatever was created if a later step fails
        for desc in &this.graphics_descs {
            let layout = create_set_layout(&this.ctx.device, desc)?;
            this.graphics_layouts.push(layout);
        }
        this.compute_layout = create_set_layout(&this.ctx.device, &this.compute_desc)?;
        this.pool = create_pool(&this.ctx.device, DescriptorPoolSizing::for_scene(PENDING_FRAMES, texture_capacity))?;

        let [dynamic_layout, per_frame_layout, shared_layout] = [
            this.graphics_layouts[0],
            this.graphics_layouts[1],
            this.graphics_layouts[2],
        ];
        let compute_layout = this.compute_layout;
        let pool = this.pool;
        let device = &this.ctx.device;
        this.slots = PerSlot::try_from_fn(|_| {
            let sets = allocate_sets(device, pool, &[dynamic_layout, per_frame_layout, compute_layout])?;
            Ok::<_, flock_engine::flock::Error>(SlotSets {
                dynamic: sets[0],
                per_frame: sets[1],
                compute: sets[2],
            })
        })?;
        this.shared = allocate_sets(device, pool, &[shared_layout])?[0];

        engine_debug!("flock::vulkan", "Descriptor sets allocated for {} slots, sampler array of {}",
            PENDING_FRAMES, this.texture_capacity);
        Ok(this)
    }

    /// Layouts of sets 0, 1, 2 in set order
    pub fn graphics_layouts(&self) -> &[vk::DescriptorSetLayout] {
        &self.graphics_layouts
    }

    pub fn compute_layout(&self) -> vk::DescriptorSetLayout {
        self.compute_layout
    }

    pub fn graphics_descs(&self) -> &[SetLayoutDesc] {
        &self.graphics_descs
    }

    pub fn compute_desc(&self) -> &SetLayoutDesc {
        &self.compute_desc
    }

    /// Sets 0 and 1 of `slot` followed by the shared set
    pub fn graphics_sets(&self, slot: FrameSlot) -> [vk::DescriptorSet; 3] {
        let sets = self.slots.get(slot);
        [sets.dynamic, sets.per_frame, self.shared]
    }

    pub fn compute_set(&self, slot: FrameSlot) -> vk::DescriptorSet {
        self.slots.get(slot).compute
    }

    /// Point every set of `slot` at that slot's buffers
    pub fn write_slot(&self, slot: FrameSlot, bindings: &SlotBindings<'_>) {
        let sets = *self.slots.get(slot);
        self.write_buffer(sets.dynamic, 0, BindingKind::StorageBuffer, bindings.instances);
        self.write_buffer(sets.per_frame, 0, BindingKind::UniformBuffer, bindings.camera);
        self.write_buffer(sets.compute, 0, BindingKind::StorageBuffer, bindings.instances);
        self.write_buffer(sets.compute, 1, BindingKind::StorageBuffer, bindings.velocities);
        self.write_buffer(sets.compute, 2, BindingKind::UniformBuffer, bindings.sim_params);
    }

    /// Fill the shared sampler array
    ///
    /// Entries past `views.len()` repeat the first view so every array
    /// element is valid.
    pub fn write_textures(&self, views: &[vk::ImageView], sampler: vk::Sampler) -> Result<()> {
        let Some(&fallback) = views.first() else {
            engine_bail_warn!("flock::vulkan", "Texture table is empty");
        };
        if views.len() as u32 > self.texture_capacity {
            engine_bail_warn!("flock::vulkan",
                "{} textures exceed the sampler array of {}", views.len(), self.texture_capacity);
        }

        let image_infos: Vec<vk::DescriptorImageInfo> = (0..self.texture_capacity as usize)
            .map(|i| {
                vk::DescriptorImageInfo::default()
                    .sampler(sampler)
                    .image_view(views.get(i).copied().unwrap_or(fallback))
                    .image_layout(vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL)
            })
            .collect();

        let write = vk::WriteDescriptorSet::default()
            .dst_set(self.shared)
            .dst_binding(0)
            .dst_array_element(0)
            .descriptor_type(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
            .image_info(&image_infos);
        unsafe {
            self.ctx.device.update_descriptor_sets(&[write], &[]);
        }
        Ok(())
    }

    fn write_buffer(&self, set: vk::DescriptorSet, binding: u32, kind: BindingKind, buffer: &VulkanBuffer) {
        let buffer_infos = [vk::DescriptorBufferInfo::default()
            .buffer(buffer.handle())
            .offset(0)
            .range(buffer.size())];
        let write = vk::WriteDescriptorSet::default()
            .dst_set(set)
            .dst_binding(binding)
            .dst_array_element(0)
            .descriptor_type(descriptor_type_to_vk(kind))
            .buffer_info(&buffer_infos);
        unsafe {
            self.ctx.device.update_descriptor_sets(&[write], &[]);
        }
    }
}

fn create_set_layout(device: &ash::Device, desc: &SetLayoutDesc) -> Result<vk::DescriptorSetLayout> {
    let bindings: Vec<vk::DescriptorSetLayoutBinding> = desc
        .bindings
        .iter()
        .map(|binding| {
            vk::DescriptorSetLayoutBinding::default()
                .binding(binding.binding)
                .descriptor_type(descriptor_type_to_vk(binding.kind))
                .descriptor_count(binding.count)
                .stage_flags(shader_stages_to_vk(binding.stages))
        })
        .collect();
    let create_info = vk::DescriptorSetLayoutCreateInfo::default().bindings(&bindings);
    unsafe { device.create_descriptor_set_layout(&create_info, None) }
        .map_err(|e| map_vk_error("vkCreateDescriptorSetLayout", e))
}

fn create_pool(device: &ash::Device, sizing: DescriptorPoolSizing) -> Result<vk::DescriptorPool> {
    let pool_sizes: Vec<vk::DescriptorPoolSize> = [
        (vk::DescriptorType::UNIFORM_BUFFER, sizing.uniform_buffers),
        (vk::DescriptorType::STORAGE_BUFFER, sizing.storage_buffers),
        (vk::DescriptorType::COMBINED_IMAGE_SAMPLER, sizing.combined_image_samplers),
    ]
    .into_iter()
    .filter(|&(_, count)| count > 0)
    .map(|(ty, descriptor_count)| vk::DescriptorPoolSize { ty, descriptor_count })
    .collect();

    let create_info = vk::DescriptorPoolCreateInfo::default()
        .pool_sizes(&pool_sizes)
        .max_sets(sizing.max_sets);
    unsafe { device.create_descriptor_pool(&create_info, None) }
        .map_err(|e| map_vk_error("vkCreateDescriptorPool", e))
}

fn allocate_sets(
    device: &ash::Device,
    pool: vk::DescriptorPool,
    layouts: &[vk::DescriptorSetLayout],
) -> Result<Vec<vk::DescriptorSet>> {
    let allocate_info = vk::DescriptorSetAllocateInfo::default()
        .descriptor_pool(pool)
        .set_layouts(layouts);
    unsafe { device.allocate_descriptor_sets(&allocate_info) }
        .map_err(|e| map_vk_error("vkAllocateDescriptorSets", e))
}

impl Drop for VulkanDescriptors {
    fn drop(&mut self) {
        unsafe {
            // Sets are freed with the pool
            if self.pool != vk::DescriptorPool::null() {
                self.ctx.device.destroy_descriptor_pool(self.pool, None);
            }
            for &layout in self.graphics_layouts.iter().chain(std::iter::once(&self.compute_layout)) {
                if layout != vk::DescriptorSetLayout::null() {
                    self.ctx.device.destroy_descriptor_set_layout(layout, None);
                }
            }
        }
    }
}

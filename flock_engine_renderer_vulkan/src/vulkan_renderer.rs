/// VulkanRenderer - Top-level boids renderer
///
/// Owns the device context and every GPU resource built from it. Resources
/// live in `RendererState` and are dropped before the context is torn down.

use ash::vk;
use flock_engine::flock::compute::{SimParams, SimulationDispatch};
use flock_engine::flock::config::{Config, MAX_TEXTURES};
use flock_engine::flock::frame::{record_frame, ActiveFrame, FrameDraw, FrameManager, FrameSlot, PerSlot};
use flock_engine::flock::memory::MemoryProperties;
use flock_engine::flock::render::{BufferUsage, ClearValues, Extent2D};
use flock_engine::flock::scene::{Scene, ViewProjection};
use flock_engine::flock::transfer::mip_level_count;
use flock_engine::flock::Result;
use flock_engine::{engine_bail_warn, engine_debug, engine_error, engine_info};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use std::mem::ManuallyDrop;
use std::sync::Arc;
use std::time::Instant;

use crate::vulkan_context::GpuContext;
use crate::vulkan_convert::image_format_to_vk;
use crate::vulkan_descriptors::{SlotBindings, VulkanDescriptors};
use crate::vulkan_device::{create_device, DeviceBundle};
use crate::vulkan_frame::VulkanFrameSync;
use crate::vulkan_image::{supported_mip_levels, VulkanImage, VulkanSampler};
use crate::vulkan_memory::{create_dual_buffer, DualBuffer, VulkanBuffer};
use crate::vulkan_pipeline::VulkanPipelines;
use crate::vulkan_recorder::VulkanRecorder;
use crate::vulkan_render_pass::VulkanRenderPass;
use crate::vulkan_staging::StagingBuffer;
use crate::vulkan_swapchain::VulkanSwapchain;

/// Smallest buffer ever created, so empty scenes still get valid bindings
const MIN_BUFFER_SIZE: u64 = 64;

/// One slot's simulation and uniform buffers
struct SlotBuffers {
    instances: VulkanBuffer,
    velocities: VulkanBuffer,
    camera: VulkanBuffer,
    sim_params: VulkanBuffer,
}

struct RendererState {
    pipelines: VulkanPipelines,
    descriptors: VulkanDescriptors,
    slot_buffers: PerSlot<SlotBuffers>,
    /// Referenced by the shared set
    _sampler: VulkanSampler,
    textures: Vec<VulkanImage>,
    geometry: DualBuffer,
    staging: StagingBuffer,
    frames: FrameManager<VulkanFrameSync>,
    config: Config,
    instance_count: u32,
    instance_bytes: u64,
    index_count: u32,
}

pub struct VulkanRenderer {
    state: ManuallyDrop<RendererState>,
    context: Arc<GpuContext>,
}

impl VulkanRenderer {
    /// Bring up the device and upload everything `scene` needs
    ///
    /// `extent` is the window's framebuffer size. The scene's simulation
    /// clock restarts once the seed data is on the GPU.
    pub fn new<W: HasDisplayHandle + HasWindowHandle>(
        window: &W,
        extent: Extent2D,
        config: Config,
        scene: &mut Scene,
    ) -> Result<Self> {
        let DeviceBundle { context, surface, surface_loader } = create_device(window, &config)?;

        match build_state(&context, surface, surface_loader, extent, config, scene) {
            Ok(state) => {
                scene.reset_clock(Instant::now());
                engine_info!("flock::vulkan", "Renderer ready: {} instances, {} textures",
                    state.instance_count, state.textures.len());
                Ok(Self { state: ManuallyDrop::new(state), context })
            }
            Err(e) => {
                let mut context = context;
                release_context(&mut context);
                Err(e)
            }
        }
    }

    /// Simulate and draw one frame of `scene`
    ///
    /// Returns `Ok(())` without drawing while the window is minimized or
    /// when the swapchain had to be rebuilt first.
    pub fn render_frame(&mut self, scene: &mut Scene) -> Result<()> {
        let state = &mut *self.state;
        if state.frames.sync().desired_extent().is_empty() {
            return Ok(());
        }

        let Some(frame) = state.frames.begin()? else {
            return Ok(());
        };
        match record_slot(state, scene, &frame) {
            Ok(()) => state.frames.end(frame),
            Err(e) => {
                // The acquired image and fence must not leak with the frame
                if let Err(abandon_err) = state.frames.abandon(frame) {
                    engine_error!("flock::vulkan", "Failed to abandon frame: {}", abandon_err);
                }
                Err(e)
            }
        }
    }

    /// Record a new framebuffer size; the swapchain is rebuilt on the next frame
    ///
    /// A zero-sized window pauses rendering until a non-zero size arrives.
    pub fn resize(&mut self, width: u32, height: u32) {
        let extent = Extent2D::new(width, height);
        self.state.frames.sync_mut().set_desired_extent(extent);
        if !extent.is_empty() {
            engine_debug!("flock::vulkan", "Resize requested: {}x{}", width, height);
            self.state.frames.request_resize();
        }
    }

    /// Wait for every frame in flight
    pub fn wait_idle(&mut self) -> Result<()> {
        self.state.frames.wait_all()?;
        self.context.wait_idle()
    }

    pub fn extent(&self) -> Extent2D {
        self.state.frames.sync().extent()
    }

    pub fn frame_number(&self) -> u64 {
        self.state.frames.frame_number()
    }

    pub fn current_slot(&self) -> FrameSlot {
        self.state.frames.current_slot()
    }

    pub fn context(&self) -> &Arc<GpuContext> {
        &self.context
    }

    pub fn geometry(&self) -> &DualBuffer {
        &self.state.geometry
    }

    pub fn textures(&self) -> &[VulkanImage] {
        &self.state.textures
    }

    /// Copy `slot`'s instance buffer back to the host
    ///
    /// Waits for every frame in flight first.
    pub fn read_instances(&mut self, slot: FrameSlot) -> Result<Vec<u8>> {
        self.wait_idle()?;
        let state = &mut *self.state;
        let instances = &state.slot_buffers.get(slot).instances;
        state.staging.download_buffer(instances, BufferUsage::Storage, state.instance_bytes)
    }
}

impl Drop for VulkanRenderer {
    fn drop(&mut self) {
        self.context.wait_idle().ok();
        unsafe {
            ManuallyDrop::drop(&mut self.state);
        }
        release_context(&mut self.context);
    }
}

/// Destroy the context once nothing else holds it
fn release_context(context: &mut Arc<GpuContext>) {
    match Arc::get_mut(context) {
        Some(ctx) => unsafe {
            ctx.destroy();
        },
        None => {
            engine_error!("flock::vulkan",
                "GPU context still shared at shutdown ({} references), leaking device",
                Arc::strong_count(context));
        }
    }
}

/// Write the slot's uniforms and record its command buffer
fn record_slot(state: &mut RendererState, scene: &mut Scene, frame: &ActiveFrame) -> Result<()> {
    let slot = frame.slot();
    let extent = state.frames.sync().extent();

    let mut params = scene.advance(slot, Instant::now());
    params.instance_count = params.instance_count.min(state.instance_count);
    let buffers = state.slot_buffers.for_frame_mut(frame);
    buffers.camera.write(0, bytemuck::bytes_of(&scene.view_projection(extent)))?;
    buffers.sim_params.write(0, bytemuck::bytes_of(&params))?;

    let constants = scene.material_constants();
    {
        let sync = state.frames.sync();
        let buffers = state.slot_buffers.get(slot);
        let mut recorder = sync.recorder(slot);

        let simulation: SimulationDispatch<VulkanRecorder<'_>> = SimulationDispatch {
            pipeline: state.pipelines.boids(),
            layout: state.pipelines.compute_layout(),
            descriptor_set: state.descriptors.compute_set(slot),
            instance_buffer: buffers.instances.handle(),
            instance_bytes: state.instance_bytes,
            instance_count: state.instance_count,
        };
        let draw: FrameDraw<'_, VulkanRecorder<'_>> = FrameDraw {
            framebuffer: sync.framebuffer(frame.image_index())?,
            extent,
            clear: ClearValues {
                color: state.config.clear_color,
                depth: state.config.clear_depth,
            },
            layout: state.pipelines.graphics_layout(),
            opaque_pipeline: state.pipelines.opaque(),
            env_pipeline: state.pipelines.env_map(),
            descriptor_sets: state.descriptors.graphics_sets(slot),
            vertex_buffer: state.geometry.vertex.handle(),
            index_buffer: state.geometry.index.handle(),
            index_count: state.index_count,
            instance_count: state.instance_count,
            push_constants: bytemuck::bytes_of(&constants),
        };
        record_frame(&mut recorder, Some(&simulation), &draw);
    }

    Ok(())
}

fn build_state(
    ctx: &Arc<GpuContext>,
    surface: vk::SurfaceKHR,
    surface_loader: ash::khr::surface::Instance,
    extent: Extent2D,
    config: Config,
    scene: &Scene,
) -> Result<RendererState> {
    // ===== PRESENTATION =====
    let swapchain = VulkanSwapchain::new(Arc::clone(ctx), surface, surface_loader, &config, extent)?;
    let render_pass = VulkanRenderPass::new(Arc::clone(ctx), swapchain.format())?;
    let render_pass_handle = render_pass.handle();
    let frame_sync = VulkanFrameSync::new(Arc::clone(ctx), swapchain, render_pass, extent)?;
    let frames = FrameManager::new(frame_sync, config.fence_timeout_ns);

    let mut staging = StagingBuffer::new(Arc::clone(ctx))?;

    // ===== GEOMETRY =====
    let vertex_bytes = scene.mesh.vertex_bytes();
    let index_bytes = scene.mesh.index_bytes();
    let geometry = create_dual_buffer(
        Arc::clone(ctx),
        (vertex_bytes.len() as u64).max(MIN_BUFFER_SIZE),
        (index_bytes.len() as u64).max(MIN_BUFFER_SIZE),
        MemoryProperties::DEVICE_LOCAL,
    )?;
    staging.transfer_buffer(&geometry.vertex, 0, vertex_bytes, BufferUsage::Vertex)?;
    staging.transfer_buffer(&geometry.index, 0, index_bytes, BufferUsage::Index)?;
    engine_debug!("flock::vulkan", "Geometry: {} vertex bytes, {} indices, index offset {}",
        vertex_bytes.len(), scene.mesh.index_count(), geometry.layout.secondary_offset);

    // ===== TEXTURES =====
    if scene.textures.len() as u32 > MAX_TEXTURES {
        engine_bail_warn!("flock::vulkan",
            "Scene has {} textures, the sampler array holds {}", scene.textures.len(), MAX_TEXTURES);
    }
    let textures = scene.textures.try_map(|name, image| {
        let format = image_format_to_vk(image.format);
        let requested = if image.mipmapped {
            mip_level_count(image.width, image.height)
        } else {
            1
        };
        let mip_levels = supported_mip_levels(ctx, format, requested);
        let texture = VulkanImage::texture(
            Arc::clone(ctx),
            name,
            Extent2D::new(image.width, image.height),
            format,
            mip_levels,
        )?;
        staging.transfer_image(&texture, &image.pixels)?;
        Ok(texture)
    })?;
    let sampler = VulkanSampler::linear_repeat(Arc::clone(ctx))?;

    // ===== PER-SLOT BUFFERS =====
    let instance_bytes = scene.instance_bytes();
    let velocity_bytes = scene.velocity_bytes();
    let storage_usage = vk::BufferUsageFlags::STORAGE_BUFFER
        | vk::BufferUsageFlags::TRANSFER_DST
        | vk::BufferUsageFlags::TRANSFER_SRC;
    let slot_buffers = PerSlot::try_from_fn(|_| -> Result<SlotBuffers> {
        let instances = VulkanBuffer::new(
            Arc::clone(ctx),
            instance_bytes.max(MIN_BUFFER_SIZE),
            storage_usage,
            MemoryProperties::DEVICE_LOCAL,
        )?;
        let velocities = VulkanBuffer::new(
            Arc::clone(ctx),
            velocity_bytes.max(MIN_BUFFER_SIZE),
            storage_usage,
            MemoryProperties::DEVICE_LOCAL,
        )?;
        let camera = VulkanBuffer::new(
            Arc::clone(ctx),
            std::mem::size_of::<ViewProjection>() as u64,
            vk::BufferUsageFlags::UNIFORM_BUFFER,
            MemoryProperties::HOST_VISIBLE,
        )?;
        let mut sim_params = VulkanBuffer::new(
            Arc::clone(ctx),
            std::mem::size_of::<SimParams>() as u64,
            vk::BufferUsageFlags::UNIFORM_BUFFER,
            MemoryProperties::HOST_VISIBLE,
        )?;

        staging.transfer_buffer(&instances, 0, bytemuck::cast_slice(&scene.instances), BufferUsage::Storage)?;
        staging.transfer_buffer(&velocities, 0, bytemuck::cast_slice(&scene.velocities), BufferUsage::Storage)?;
        sim_params.write(0, bytemuck::bytes_of(&scene.sim_params))?;

        Ok(SlotBuffers { instances, velocities, camera, sim_params })
    })?;

    // ===== DESCRIPTORS & PIPELINES =====
    let descriptors = VulkanDescriptors::new(Arc::clone(ctx), MAX_TEXTURES)?;
    for (slot, buffers) in slot_buffers.iter() {
        descriptors.write_slot(slot, &SlotBindings {
            instances: &buffers.instances,
            velocities: &buffers.velocities,
            camera: &buffers.camera,
            sim_params: &buffers.sim_params,
        });
    }
    let views: Vec<vk::ImageView> = textures.iter().map(VulkanImage::view).collect();
    descriptors.write_textures(&views, sampler.handle())?;

    let pipelines = VulkanPipelines::new(
        Arc::clone(ctx),
        &config,
        render_pass_handle,
        &descriptors,
        scene.environment.is_some(),
    )?;

    Ok(RendererState {
        pipelines,
        descriptors,
        slot_buffers,
        _sampler: sampler,
        textures,
        geometry,
        staging,
        frames,
        config,
        instance_count: scene.instance_count(),
        instance_bytes,
        index_count: scene.mesh.index_count(),
    })
}

/// VulkanFrameSync - FrameSync over per-slot fences and command pools
///
/// Each frame slot owns one command pool, one primary command buffer and one
/// fence (created signaled). The swapchain, its depth buffer and the
/// framebuffers are rebuilt together on `recreate_swapchain`.

use ash::vk;
use flock_engine::flock::frame::{Acquired, ActiveFrame, FrameSlot, FrameSync, PerSlot, Presented, SemaphoreIndex};
use flock_engine::flock::render::Extent2D;
use flock_engine::flock::Result;
use flock_engine::{engine_err, engine_trace};
use std::sync::Arc;

use crate::vulkan_context::{map_vk_error, GpuContext};
use crate::vulkan_image::VulkanImage;
use crate::vulkan_recorder::VulkanRecorder;
use crate::vulkan_render_pass::VulkanRenderPass;
use crate::vulkan_swapchain::VulkanSwapchain;

struct SlotResources {
    command_pool: vk::CommandPool,
    command_buffer: vk::CommandBuffer,
    fence: vk::Fence,
}

impl SlotResources {
    fn new(ctx: &GpuContext) -> Result<Self> {
        unsafe {
            let pool_info = vk::CommandPoolCreateInfo::default()
                .queue_family_index(ctx.queue_family);
            let command_pool = ctx
                .device
                .create_command_pool(&pool_info, None)
                .map_err(|e| map_vk_error("vkCreateCommandPool", e))?;

            let allocate_info = vk::CommandBufferAllocateInfo::default()
                .command_pool(command_pool)
                .level(vk::CommandBufferLevel::PRIMARY)
                .command_buffer_count(1);
            let command_buffer = match ctx.device.allocate_command_buffers(&allocate_info) {
                Ok(buffers) => buffers[0],
                Err(e) => {
                    ctx.device.destroy_command_pool(command_pool, None);
                    return Err(map_vk_error("vkAllocateCommandBuffers", e));
                }
            };

            // Signaled so the first wait on the slot returns at once
            let fence_info = vk::FenceCreateInfo::default().flags(vk::FenceCreateFlags::SIGNALED);
            let fence = match ctx.device.create_fence(&fence_info, None) {
                Ok(fence) => fence,
                Err(e) => {
                    ctx.device.destroy_command_pool(command_pool, None);
                    return Err(map_vk_error("vkCreateFence", e));
                }
            };

            Ok(Self { command_pool, command_buffer, fence })
        }
    }

    unsafe fn destroy(&self, device: &ash::Device) {
        device.destroy_fence(self.fence, None);
        // Frees the command buffer with it
        device.destroy_command_pool(self.command_pool, None);
    }
}

pub struct VulkanFrameSync {
    ctx: Arc<GpuContext>,
    slots: PerSlot<SlotResources>,
    framebuffers: Vec<vk::Framebuffer>,
    depth: VulkanImage,
    swapchain: VulkanSwapchain,
    render_pass: VulkanRenderPass,
    /// Window size used by the next swapchain rebuild
    desired_extent: Extent2D,
}

impl VulkanFrameSync {
    pub fn new(
        ctx: Arc<GpuContext>,
        swapchain: VulkanSwapchain,
        render_pass: VulkanRenderPass,
        desired_extent: Extent2D,
    ) -> Result<Self> {
        let depth = VulkanImage::depth(Arc::clone(&ctx), swapchain.extent())?;
        let mut framebuffers = render_pass.create_framebuffers(swapchain.views(), depth.view(), swapchain.extent())?;

        let slots = match PerSlot::try_from_fn(|_| SlotResources::new(&ctx)) {
            Ok(slots) => slots,
            Err(e) => {
                render_pass.destroy_framebuffers(&mut framebuffers);
                return Err(e);
            }
        };

        Ok(Self {
            ctx,
            slots,
            framebuffers,
            depth,
            swapchain,
            render_pass,
            desired_extent,
        })
    }

    /// Recorder over the slot's command buffer
    pub fn recorder(&self, slot: FrameSlot) -> VulkanRecorder<'_> {
        VulkanRecorder::new(
            &self.ctx.device,
            self.slots.get(slot).command_buffer,
            self.render_pass.handle(),
        )
    }

    pub fn framebuffer(&self, image_index: u32) -> Result<vk::Framebuffer> {
        self.framebuffers
            .get(image_index as usize)
            .copied()
            .ok_or_else(|| engine_err!("flock::vulkan", "No framebuffer for image {}", image_index))
    }

    pub fn extent(&self) -> Extent2D {
        self.swapchain.extent()
    }

    pub fn render_pass(&self) -> vk::RenderPass {
        self.render_pass.handle()
    }

    pub fn set_desired_extent(&mut self, extent: Extent2D) {
        self.desired_extent = extent;
    }

    pub fn desired_extent(&self) -> Extent2D {
        self.desired_extent
    }

    fn command_buffer(&self, slot: FrameSlot) -> vk::CommandBuffer {
        self.slots.get(slot).command_buffer
    }
}

impl FrameSync for VulkanFrameSync {
    fn wait_fence(&mut self, slot: FrameSlot, timeout_ns: u64) -> Result<()> {
        let fences = [self.slots.get(slot).fence];
        unsafe {
            self.ctx
                .device
                .wait_for_fences(&fences, true, timeout_ns)
                .map_err(|e| map_vk_error("vkWaitForFences", e))
        }
    }

    fn reset_fence(&mut self, slot: FrameSlot) -> Result<()> {
        let fences = [self.slots.get(slot).fence];
        unsafe {
            self.ctx
                .device
                .reset_fences(&fences)
                .map_err(|e| map_vk_error("vkResetFences", e))
        }
    }

    fn reset_command_pool(&mut self, slot: FrameSlot) -> Result<()> {
        unsafe {
            self.ctx
                .device
                .reset_command_pool(self.slots.get(slot).command_pool, vk::CommandPoolResetFlags::empty())
                .map_err(|e| map_vk_error("vkResetCommandPool", e))
        }
    }

    fn acquire_image(&mut self, semaphore: SemaphoreIndex) -> Result<Acquired> {
        self.swapchain.acquire(semaphore)
    }

    fn begin_commands(&mut self, slot: FrameSlot) -> Result<()> {
        let begin_info = vk::CommandBufferBeginInfo::default()
            .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
        unsafe {
            self.ctx
                .device
                .begin_command_buffer(self.command_buffer(slot), &begin_info)
                .map_err(|e| map_vk_error("vkBeginCommandBuffer", e))
        }
    }

    fn end_commands(&mut self, slot: FrameSlot) -> Result<()> {
        unsafe {
            self.ctx
                .device
                .end_command_buffer(self.command_buffer(slot))
                .map_err(|e| map_vk_error("vkEndCommandBuffer", e))
        }
    }

    fn submit(&mut self, frame: &ActiveFrame) -> Result<()> {
        let slot = frame.slot();
        let wait_semaphores = [self.swapchain.acquire_semaphore(frame.semaphore())?];
        let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
        let signal_semaphores = [self.swapchain.render_complete_semaphore(frame.image_index())?];
        let command_buffers = [self.command_buffer(slot)];

        let submit_info = vk::SubmitInfo::default()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(&command_buffers)
            .signal_semaphores(&signal_semaphores);

        engine_trace!("flock::vulkan", "Submit frame {} on {} (image {})",
            frame.frame_number(), slot, frame.image_index());
        unsafe {
            self.ctx
                .device
                .queue_submit(self.ctx.queue, &[submit_info], self.slots.get(slot).fence)
                .map_err(|e| map_vk_error("vkQueueSubmit", e))
        }
    }

    fn present(&mut self, frame: &ActiveFrame) -> Result<Presented> {
        self.swapchain.present(frame.image_index())
    }

    fn signal_fence(&mut self, slot: FrameSlot) -> Result<()> {
        let submit_info = vk::SubmitInfo::default();
        unsafe {
            self.ctx
                .device
                .queue_submit(self.ctx.queue, &[submit_info], self.slots.get(slot).fence)
                .map_err(|e| map_vk_error("vkQueueSubmit", e))
        }
    }

    fn release_frame(&mut self, frame: &ActiveFrame) -> Result<()> {
        // No command buffers: the batch only waits on the acquire semaphore
        let wait_semaphores = [self.swapchain.acquire_semaphore(frame.semaphore())?];
        let wait_stages = [vk::PipelineStageFlags::ALL_COMMANDS];
        let submit_info = vk::SubmitInfo::default()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages);
        unsafe {
            self.ctx
                .device
                .queue_submit(self.ctx.queue, &[submit_info], self.slots.get(frame.slot()).fence)
                .map_err(|e| map_vk_error("vkQueueSubmit", e))
        }
    }

    fn recreate_swapchain(&mut self) -> Result<u32> {
        self.ctx.wait_idle()?;

        self.render_pass.destroy_framebuffers(&mut self.framebuffers);
        self.swapchain.recreate(self.desired_extent)?;

        let extent = self.swapchain.extent();
        self.depth = VulkanImage::depth(Arc::clone(&self.ctx), extent)?;
        self.framebuffers = self
            .render_pass
            .create_framebuffers(self.swapchain.views(), self.depth.view(), extent)?;

        Ok(self.swapchain.image_count())
    }

    fn image_count(&self) -> u32 {
        self.swapchain.image_count()
    }

    fn wait_idle(&mut self) -> Result<()> {
        self.ctx.wait_idle()
    }
}

impl Drop for VulkanFrameSync {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.device_wait_idle().ok();
            self.render_pass.destroy_framebuffers(&mut self.framebuffers);
            for (_, slot) in self.slots.iter() {
                slot.destroy(&self.ctx.device);
            }
        }
        // depth, swapchain and render pass drop after this, in field order
    }
}

/// StagingBuffer - The single host-visible buffer behind every load-time transfer
///
/// Each transfer copies into the staging memory, records a one-shot command
/// buffer from the upload pool, submits it and waits for the queue to go
/// idle. Only one transfer is ever in flight; `&mut self` serializes callers.

use ash::vk;
use flock_engine::flock::config::STAGING_CAPACITY;
use flock_engine::flock::memory::MemoryProperties;
use flock_engine::flock::render::BufferUsage;
use flock_engine::flock::transfer::{
    check_staging_capacity, record_buffer_download, record_buffer_upload, record_image_upload,
};
use flock_engine::flock::Result;
use flock_engine::{engine_bail_warn, engine_trace};
use std::sync::Arc;

use crate::vulkan_context::{map_vk_error, GpuContext};
use crate::vulkan_image::VulkanImage;
use crate::vulkan_memory::VulkanBuffer;
use crate::vulkan_recorder::VulkanRecorder;

pub struct StagingBuffer {
    ctx: Arc<GpuContext>,
    buffer: VulkanBuffer,
}

impl StagingBuffer {
    /// Staging buffer of `STAGING_CAPACITY` bytes
    pub fn new(ctx: Arc<GpuContext>) -> Result<Self> {
        Self::with_capacity(ctx, STAGING_CAPACITY)
    }

    pub fn with_capacity(ctx: Arc<GpuContext>, capacity: u64) -> Result<Self> {
        let buffer = VulkanBuffer::new(
            Arc::clone(&ctx),
            capacity,
            vk::BufferUsageFlags::TRANSFER_SRC | vk::BufferUsageFlags::TRANSFER_DST,
            MemoryProperties::HOST_VISIBLE,
        )?;
        Ok(Self { ctx, buffer })
    }

    pub fn capacity(&self) -> u64 {
        self.buffer.size()
    }

    /// Upload `data` into `dst` at `dst_offset`, then make it visible to `usage`
    pub fn transfer_buffer(&mut self, dst: &VulkanBuffer, dst_offset: u64, data: &[u8], usage: BufferUsage) -> Result<()> {
        let size = data.len() as u64;
        if size == 0 {
            return Ok(());
        }
        self.check(size)?;
        if dst_offset + size > dst.size() {
            engine_bail_warn!("flock::vulkan",
                "Upload of {} bytes at offset {} overruns buffer of {} bytes", size, dst_offset, dst.size());
        }

        self.buffer.write(0, data)?;
        let staging = self.buffer.handle();
        let dst = dst.handle();
        engine_trace!("flock::vulkan", "Staging upload: {} bytes -> {:?}+{}", size, dst, dst_offset);
        self.submit_once(|recorder| record_buffer_upload(recorder, staging, dst, dst_offset, size, usage))
    }

    /// Upload level 0 of `image` and blit the rest of its mip chain
    ///
    /// Leaves every level in SHADER_READ_ONLY_OPTIMAL.
    pub fn transfer_image(&mut self, image: &VulkanImage, pixels: &[u8]) -> Result<()> {
        let size = pixels.len() as u64;
        self.check(size)?;

        self.buffer.write(0, pixels)?;
        let staging = self.buffer.handle();
        let handle = image.handle();
        let extent = image.extent();
        let mip_levels = image.mip_levels();
        engine_trace!("flock::vulkan", "Staging image upload: {}x{}, {} level(s)",
            extent.width, extent.height, mip_levels);
        self.submit_once(|recorder| record_image_upload(recorder, staging, handle, extent, mip_levels))
    }

    /// Copy the first `size` bytes of a device buffer back to the host
    pub fn download_buffer(&mut self, src: &VulkanBuffer, src_usage: BufferUsage, size: u64) -> Result<Vec<u8>> {
        self.check(size)?;
        if size > src.size() {
            engine_bail_warn!("flock::vulkan",
                "Readback of {} bytes exceeds buffer of {} bytes", size, src.size());
        }

        let staging = self.buffer.handle();
        let src = src.handle();
        self.submit_once(|recorder| record_buffer_download(recorder, src, src_usage, staging, size))?;
        self.buffer.read(0, size)
    }

    fn check(&self, size: u64) -> Result<()> {
        check_staging_capacity(size)?;
        if size > self.capacity() {
            engine_bail_warn!("flock::vulkan",
                "Transfer of {} bytes exceeds staging capacity of {} bytes", size, self.capacity());
        }
        Ok(())
    }

    /// Record with `record`, submit, and block until the queue is idle
    fn submit_once(&mut self, record: impl FnOnce(&mut VulkanRecorder<'_>)) -> Result<()> {
        let device = &self.ctx.device;
        let pool = self.ctx.upload_command_pool()?;

        unsafe {
            let allocate_info = vk::CommandBufferAllocateInfo::default()
                .command_pool(*pool)
                .level(vk::CommandBufferLevel::PRIMARY)
                .command_buffer_count(1);
            let command_buffers = device
                .allocate_command_buffers(&allocate_info)
                .map_err(|e| map_vk_error("vkAllocateCommandBuffers", e))?;
            let command_buffer = command_buffers[0];

            let result = (|| {
                let begin_info = vk::CommandBufferBeginInfo::default()
                    .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
                device
                    .begin_command_buffer(command_buffer, &begin_info)
                    .map_err(|e| map_vk_error("vkBeginCommandBuffer", e))?;

                record(&mut VulkanRecorder::transfer(device, command_buffer));

                device
                    .end_command_buffer(command_buffer)
                    .map_err(|e| map_vk_error("vkEndCommandBuffer", e))?;

                let submit_info = vk::SubmitInfo::default().command_buffers(&command_buffers);
                device
                    .queue_submit(self.ctx.queue, &[submit_info], vk::Fence::null())
                    .map_err(|e| map_vk_error("vkQueueSubmit", e))?;
                device
                    .queue_wait_idle(self.ctx.queue)
                    .map_err(|e| map_vk_error("vkQueueWaitIdle", e))
            })();

            device.free_command_buffers(*pool, &command_buffers);
            result
        }
    }
}

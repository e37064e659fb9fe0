/// VulkanRecorder - CommandRecorder over a `vk::CommandBuffer`
///
/// Borrowed for the duration of one recording; the command buffer must be
/// in the recording state (begun by the frame manager or a one-shot upload).

use ash::vk;
use flock_engine::flock::descriptor::ShaderStages;
use flock_engine::flock::render::{
    BindPoint, BufferBarrier, ClearValues, CommandRecorder, Extent2D, ImageAspect, ImageBarrier,
};
use flock_engine::flock::transfer::MipBlit;

use crate::vulkan_convert::{
    access_to_vk, bind_point_to_vk, extent_to_vk, image_aspect_to_vk, image_layout_to_vk, pipeline_stages_to_vk,
    shader_stages_to_vk,
};

/// Records into one command buffer
pub struct VulkanRecorder<'a> {
    device: &'a ash::Device,
    command_buffer: vk::CommandBuffer,
    /// Render pass used by `begin_render_pass` (null for transfer-only recording)
    render_pass: vk::RenderPass,
}

impl<'a> VulkanRecorder<'a> {
    pub fn new(device: &'a ash::Device, command_buffer: vk::CommandBuffer, render_pass: vk::RenderPass) -> Self {
        Self { device, command_buffer, render_pass }
    }

    /// Recorder for transfer and compute work only
    pub fn transfer(device: &'a ash::Device, command_buffer: vk::CommandBuffer) -> Self {
        Self::new(device, command_buffer, vk::RenderPass::null())
    }

    pub fn command_buffer(&self) -> vk::CommandBuffer {
        self.command_buffer
    }
}

fn offset_3d(extent: Extent2D) -> vk::Offset3D {
    vk::Offset3D {
        x: extent.width as i32,
        y: extent.height as i32,
        z: 1,
    }
}

impl CommandRecorder for VulkanRecorder<'_> {
    type Buffer = vk::Buffer;
    type Image = vk::Image;
    type Pipeline = vk::Pipeline;
    type PipelineLayout = vk::PipelineLayout;
    type DescriptorSet = vk::DescriptorSet;
    type Framebuffer = vk::Framebuffer;

    // ===== SYNCHRONIZATION =====

    fn buffer_barrier(&mut self, barrier: &BufferBarrier<vk::Buffer>) {
        let buffer_barrier = vk::BufferMemoryBarrier::default()
            .src_access_mask(access_to_vk(barrier.src_access))
            .dst_access_mask(access_to_vk(barrier.dst_access))
            .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
            .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
            .buffer(barrier.buffer)
            .offset(barrier.offset)
            .size(barrier.size);

        unsafe {
            self.device.cmd_pipeline_barrier(
                self.command_buffer,
                pipeline_stages_to_vk(barrier.src_stage),
                pipeline_stages_to_vk(barrier.dst_stage),
                vk::DependencyFlags::empty(),
                &[],
                &[buffer_barrier],
                &[],
            );
        }
    }

    fn image_barrier(&mut self, barrier: &ImageBarrier<vk::Image>) {
        let image_barrier = vk::ImageMemoryBarrier::default()
            .src_access_mask(access_to_vk(barrier.src_access))
            .dst_access_mask(access_to_vk(barrier.dst_access))
            .old_layout(image_layout_to_vk(barrier.old_layout))
            .new_layout(image_layout_to_vk(barrier.new_layout))
            .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
            .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
            .image(barrier.image)
            .subresource_range(vk::ImageSubresourceRange {
                aspect_mask: image_aspect_to_vk(barrier.aspect),
                base_mip_level: barrier.base_mip_level,
                level_count: barrier.level_count,
                base_array_layer: 0,
                layer_count: 1,
            });

        unsafe {
            self.device.cmd_pipeline_barrier(
                self.command_buffer,
                pipeline_stages_to_vk(barrier.src_stage),
                pipeline_stages_to_vk(barrier.dst_stage),
                vk::DependencyFlags::empty(),
                &[],
                &[],
                &[image_barrier],
            );
        }
    }

    // ===== TRANSFER =====

    fn copy_buffer(&mut self, src: vk::Buffer, src_offset: u64, dst: vk::Buffer, dst_offset: u64, size: u64) {
        let region = vk::BufferCopy { src_offset, dst_offset, size };
        unsafe {
            self.device.cmd_copy_buffer(self.command_buffer, src, dst, &[region]);
        }
    }

    fn copy_buffer_to_image(
        &mut self,
        src: vk::Buffer,
        src_offset: u64,
        dst: vk::Image,
        aspect: ImageAspect,
        extent: Extent2D,
    ) {
        let region = vk::BufferImageCopy::default()
            .buffer_offset(src_offset)
            .buffer_row_length(0)
            .buffer_image_height(0)
            .image_subresource(vk::ImageSubresourceLayers {
                aspect_mask: image_aspect_to_vk(aspect),
                mip_level: 0,
                base_array_layer: 0,
                layer_count: 1,
            })
            .image_offset(vk::Offset3D { x: 0, y: 0, z: 0 })
            .image_extent(vk::Extent3D {
                width: extent.width,
                height: extent.height,
                depth: 1,
            });

        unsafe {
            self.device.cmd_copy_buffer_to_image(
                self.command_buffer,
                src,
                dst,
                vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                &[region],
            );
        }
    }

    fn blit_mip(&mut self, image: vk::Image, blit: &MipBlit) {
        let subresource = |level: u32| vk::ImageSubresourceLayers {
            aspect_mask: vk::ImageAspectFlags::COLOR,
            mip_level: level,
            base_array_layer: 0,
            layer_count: 1,
        };
        let region = vk::ImageBlit::default()
            .src_subresource(subresource(blit.src_level))
            .src_offsets([vk::Offset3D::default(), offset_3d(blit.src_extent)])
            .dst_subresource(subresource(blit.dst_level))
            .dst_offsets([vk::Offset3D::default(), offset_3d(blit.dst_extent)]);

        unsafe {
            self.device.cmd_blit_image(
                self.command_buffer,
                image,
                vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
                image,
                vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                &[region],
                vk::Filter::LINEAR,
            );
        }
    }

    // ===== BINDING =====

    fn bind_pipeline(&mut self, bind_point: BindPoint, pipeline: vk::Pipeline) {
        unsafe {
            self.device
                .cmd_bind_pipeline(self.command_buffer, bind_point_to_vk(bind_point), pipeline);
        }
    }

    fn bind_descriptor_sets(
        &mut self,
        bind_point: BindPoint,
        layout: vk::PipelineLayout,
        first_set: u32,
        sets: &[vk::DescriptorSet],
    ) {
        unsafe {
            self.device.cmd_bind_descriptor_sets(
                self.command_buffer,
                bind_point_to_vk(bind_point),
                layout,
                first_set,
                sets,
                &[],
            );
        }
    }

    fn bind_vertex_buffer(&mut self, buffer: vk::Buffer, offset: u64) {
        unsafe {
            self.device
                .cmd_bind_vertex_buffers(self.command_buffer, 0, &[buffer], &[offset]);
        }
    }

    fn bind_index_buffer(&mut self, buffer: vk::Buffer, offset: u64) {
        unsafe {
            self.device
                .cmd_bind_index_buffer(self.command_buffer, buffer, offset, vk::IndexType::UINT32);
        }
    }

    fn push_constants(&mut self, layout: vk::PipelineLayout, stages: ShaderStages, offset: u32, data: &[u8]) {
        unsafe {
            self.device.cmd_push_constants(
                self.command_buffer,
                layout,
                shader_stages_to_vk(stages),
                offset,
                data,
            );
        }
    }

    // ===== COMPUTE =====

    fn dispatch(&mut self, group_count_x: u32, group_count_y: u32, group_count_z: u32) {
        unsafe {
            self.device
                .cmd_dispatch(self.command_buffer, group_count_x, group_count_y, group_count_z);
        }
    }

    // ===== GRAPHICS =====

    fn begin_render_pass(&mut self, framebuffer: vk::Framebuffer, extent: Extent2D, clear: &ClearValues) {
        let clear_values = [
            vk::ClearValue {
                color: vk::ClearColorValue { float32: clear.color },
            },
            vk::ClearValue {
                depth_stencil: vk::ClearDepthStencilValue { depth: clear.depth, stencil: 0 },
            },
        ];
        let begin_info = vk::RenderPassBeginInfo::default()
            .render_pass(self.render_pass)
            .framebuffer(framebuffer)
            .render_area(vk::Rect2D {
                offset: vk::Offset2D { x: 0, y: 0 },
                extent: extent_to_vk(extent),
            })
            .clear_values(&clear_values);

        unsafe {
            self.device
                .cmd_begin_render_pass(self.command_buffer, &begin_info, vk::SubpassContents::INLINE);
        }
    }

    fn set_viewport_scissor(&mut self, extent: Extent2D) {
        let viewport = vk::Viewport {
            x: 0.0,
            y: 0.0,
            width: extent.width as f32,
            height: extent.height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        };
        let scissor = vk::Rect2D {
            offset: vk::Offset2D { x: 0, y: 0 },
            extent: extent_to_vk(extent),
        };
        unsafe {
            self.device.cmd_set_viewport(self.command_buffer, 0, &[viewport]);
            self.device.cmd_set_scissor(self.command_buffer, 0, &[scissor]);
        }
    }

    fn draw(&mut self, vertex_count: u32, instance_count: u32) {
        unsafe {
            self.device
                .cmd_draw(self.command_buffer, vertex_count, instance_count, 0, 0);
        }
    }

    fn draw_indexed(&mut self, index_count: u32, instance_count: u32) {
        unsafe {
            self.device
                .cmd_draw_indexed(self.command_buffer, index_count, instance_count, 0, 0, 0);
        }
    }

    fn end_render_pass(&mut self) {
        unsafe {
            self.device.cmd_end_render_pass(self.command_buffer);
        }
    }
}

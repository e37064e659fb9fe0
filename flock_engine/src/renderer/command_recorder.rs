/// CommandRecorder - the seam between recording sequences and a backend
///
/// The frame, compute and transfer sequences are written once against this
/// trait. The Vulkan backend implements it over a `vk::CommandBuffer`; unit
/// tests implement it with a recorder that logs each call.

use std::fmt::Debug;

use crate::descriptor::ShaderStages;
use crate::renderer::sync::{BufferBarrier, ImageBarrier, BindPoint, ClearValues, Extent2D, ImageAspect};
use crate::transfer::MipBlit;

/// Records GPU commands into a primary command buffer
pub trait CommandRecorder {
    type Buffer: Copy + Debug + PartialEq;
    type Image: Copy + Debug + PartialEq;
    type Pipeline: Copy + Debug + PartialEq;
    type PipelineLayout: Copy + Debug + PartialEq;
    type DescriptorSet: Copy + Debug + PartialEq;
    type Framebuffer: Copy + Debug + PartialEq;

    // ===== SYNCHRONIZATION =====

    fn buffer_barrier(&mut self, barrier: &BufferBarrier<Self::Buffer>);

    fn image_barrier(&mut self, barrier: &ImageBarrier<Self::Image>);

    // ===== TRANSFER =====

    /// Copy `size` bytes from `src[src_offset..]` to `dst[dst_offset..]`
    fn copy_buffer(&mut self, src: Self::Buffer, src_offset: u64, dst: Self::Buffer, dst_offset: u64, size: u64);

    /// Copy tightly packed texels from `src[src_offset..]` into mip 0 of `dst`
    fn copy_buffer_to_image(
        &mut self,
        src: Self::Buffer,
        src_offset: u64,
        dst: Self::Image,
        aspect: ImageAspect,
        extent: Extent2D,
    );

    /// Blit one mip level of `image` into the next with linear filtering
    fn blit_mip(&mut self, image: Self::Image, blit: &MipBlit);

    // ===== BINDING =====

    fn bind_pipeline(&mut self, bind_point: BindPoint, pipeline: Self::Pipeline);

    fn bind_descriptor_sets(
        &mut self,
        bind_point: BindPoint,
        layout: Self::PipelineLayout,
        first_set: u32,
        sets: &[Self::DescriptorSet],
    );

    fn bind_vertex_buffer(&mut self, buffer: Self::Buffer, offset: u64);

    /// Bind a 32-bit index buffer
    fn bind_index_buffer(&mut self, buffer: Self::Buffer, offset: u64);

    fn push_constants(&mut self, layout: Self::PipelineLayout, stages: ShaderStages, offset: u32, data: &[u8]);

    // ===== COMPUTE =====

    fn dispatch(&mut self, group_count_x: u32, group_count_y: u32, group_count_z: u32);

    // ===== GRAPHICS =====

    fn begin_render_pass(&mut self, framebuffer: Self::Framebuffer, extent: Extent2D, clear: &ClearValues);

    /// Full-extent viewport (depth 0..1) and scissor
    fn set_viewport_scissor(&mut self, extent: Extent2D);

    fn draw(&mut self, vertex_count: u32, instance_count: u32);

    fn draw_indexed(&mut self, index_count: u32, instance_count: u32);

    fn end_render_pass(&mut self);
}

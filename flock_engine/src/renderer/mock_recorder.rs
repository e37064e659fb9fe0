/// Mock recorder for unit tests (no GPU required)
///
/// Every call is logged as a short string so tests can assert on ordering.
/// Handles are plain `u32` tags chosen by the test.

#[cfg(test)]
use crate::renderer::command_recorder::CommandRecorder;
#[cfg(test)]
use crate::renderer::sync::{BufferBarrier, ImageBarrier, BindPoint, ClearValues, Extent2D, ImageAspect};
#[cfg(test)]
use crate::transfer::MipBlit;
#[cfg(test)]
use crate::descriptor::ShaderStages;

// ============================================================================
// Mock Recorder
// ============================================================================

#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockRecorder {
    pub commands: Vec<String>,
    pub buffer_barriers: Vec<BufferBarrier<u32>>,
    pub image_barriers: Vec<ImageBarrier<u32>>,
    pub blits: Vec<MipBlit>,
}

#[cfg(test)]
impl MockRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Position of the first command starting with `prefix`
    pub fn position(&self, prefix: &str) -> Option<usize> {
        self.commands.iter().position(|c| c.starts_with(prefix))
    }

    /// Number of commands starting with `prefix`
    pub fn count(&self, prefix: &str) -> usize {
        self.commands.iter().filter(|c| c.starts_with(prefix)).count()
    }
}

#[cfg(test)]
impl CommandRecorder for MockRecorder {
    type Buffer = u32;
    type Image = u32;
    type Pipeline = u32;
    type PipelineLayout = u32;
    type DescriptorSet = u32;
    type Framebuffer = u32;

    fn buffer_barrier(&mut self, barrier: &BufferBarrier<u32>) {
        self.commands.push(format!("buffer_barrier:{}", barrier.buffer));
        self.buffer_barriers.push(*barrier);
    }

    fn image_barrier(&mut self, barrier: &ImageBarrier<u32>) {
        self.commands.push(format!(
            "image_barrier:{}:{:?}->{:?}:mip{}+{}",
            barrier.image, barrier.old_layout, barrier.new_layout, barrier.base_mip_level, barrier.level_count
        ));
        self.image_barriers.push(*barrier);
    }

    fn copy_buffer(&mut self, src: u32, src_offset: u64, dst: u32, dst_offset: u64, size: u64) {
        self.commands.push(format!("copy_buffer:{}@{}->{}@{}:{}", src, src_offset, dst, dst_offset, size));
    }

    fn copy_buffer_to_image(&mut self, src: u32, _src_offset: u64, dst: u32, _aspect: ImageAspect, extent: Extent2D) {
        self.commands.push(format!("copy_buffer_to_image:{}->{}:{}x{}", src, dst, extent.width, extent.height));
    }

    fn blit_mip(&mut self, image: u32, blit: &MipBlit) {
        self.commands.push(format!("blit:{}:{}->{}", image, blit.src_level, blit.dst_level));
        self.blits.push(*blit);
    }

    fn bind_pipeline(&mut self, bind_point: BindPoint, pipeline: u32) {
        self.commands.push(format!("bind_pipeline:{:?}:{}", bind_point, pipeline));
    }

    fn bind_descriptor_sets(&mut self, bind_point: BindPoint, _layout: u32, first_set: u32, sets: &[u32]) {
        self.commands.push(format!("bind_descriptor_sets:{:?}:{}:{:?}", bind_point, first_set, sets));
    }

    fn bind_vertex_buffer(&mut self, buffer: u32, offset: u64) {
        self.commands.push(format!("bind_vertex_buffer:{}@{}", buffer, offset));
    }

    fn bind_index_buffer(&mut self, buffer: u32, offset: u64) {
        self.commands.push(format!("bind_index_buffer:{}@{}", buffer, offset));
    }

    fn push_constants(&mut self, layout: u32, _stages: ShaderStages, offset: u32, data: &[u8]) {
        self.commands.push(format!("push_constants:{}:{}+{}", layout, offset, data.len()));
    }

    fn dispatch(&mut self, x: u32, y: u32, z: u32) {
        self.commands.push(format!("dispatch:{}x{}x{}", x, y, z));
    }

    fn begin_render_pass(&mut self, framebuffer: u32, extent: Extent2D, _clear: &ClearValues) {
        self.commands.push(format!("begin_render_pass:{}:{}x{}", framebuffer, extent.width, extent.height));
    }

    fn set_viewport_scissor(&mut self, _extent: Extent2D) {
        self.commands.push("set_viewport_scissor".to_string());
    }

    fn draw(&mut self, vertex_count: u32, instance_count: u32) {
        self.commands.push(format!("draw:{}x{}", vertex_count, instance_count));
    }

    fn draw_indexed(&mut self, index_count: u32, instance_count: u32) {
        self.commands.push(format!("draw_indexed:{}x{}", index_count, instance_count));
    }

    fn end_render_pass(&mut self) {
        self.commands.push("end_render_pass".to_string());
    }
}

/// Per-frame command sequence
///
/// ```text
/// [bind compute -> dispatch -> barrier(instances: compute write -> vertex read)]
/// begin render pass -> viewport/scissor
///   bind opaque, sets 0..2, push material -> vertex+index -> draw_indexed(instances)
///   [bind env map -> draw 4]
/// end render pass
/// ```

use crate::compute::{record_simulation, SimulationDispatch};
use crate::descriptor::ShaderStages;
use crate::pipeline::ENV_MAP_VERTEX_COUNT;
use crate::renderer::command_recorder::CommandRecorder;
use crate::renderer::sync::{BindPoint, ClearValues, Extent2D};

/// Everything the render pass of one frame binds
pub struct FrameDraw<'a, R: CommandRecorder> {
    pub framebuffer: R::Framebuffer,
    pub extent: Extent2D,
    pub clear: ClearValues,
    pub layout: R::PipelineLayout,
    pub opaque_pipeline: R::Pipeline,
    pub env_pipeline: Option<R::Pipeline>,
    /// Sets 0 (dynamic) and 1 (per frame) of this slot, then the shared set 2
    pub descriptor_sets: [R::DescriptorSet; 3],
    /// The two halves of the dual buffer
    pub vertex_buffer: R::Buffer,
    pub index_buffer: R::Buffer,
    pub index_count: u32,
    pub instance_count: u32,
    pub push_constants: &'a [u8],
}

/// Record one frame into an open command buffer
pub fn record_frame<R: CommandRecorder>(
    recorder: &mut R,
    simulation: Option<&SimulationDispatch<R>>,
    draw: &FrameDraw<'_, R>,
) {
    if let Some(simulation) = simulation {
        record_simulation(recorder, simulation);
    }

    recorder.begin_render_pass(draw.framebuffer, draw.extent, &draw.clear);
    recorder.set_viewport_scissor(draw.extent);

    recorder.bind_pipeline(BindPoint::Graphics, draw.opaque_pipeline);
    recorder.bind_descriptor_sets(BindPoint::Graphics, draw.layout, 0, &draw.descriptor_sets);
    recorder.push_constants(draw.layout, ShaderStages::VERTEX | ShaderStages::FRAGMENT, 0, draw.push_constants);

    if draw.index_count > 0 && draw.instance_count > 0 {
        recorder.bind_vertex_buffer(draw.vertex_buffer, 0);
        recorder.bind_index_buffer(draw.index_buffer, 0);
        recorder.draw_indexed(draw.index_count, draw.instance_count);
    }

    if let Some(env_pipeline) = draw.env_pipeline {
        recorder.bind_pipeline(BindPoint::Graphics, env_pipeline);
        recorder.draw(ENV_MAP_VERTEX_COUNT, 1);
    }

    recorder.end_render_pass();
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;

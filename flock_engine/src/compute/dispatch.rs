/// Simulation dispatch and the compute -> vertex dependency

use crate::config::LOCAL_GROUP_SIZE;
use crate::renderer::command_recorder::CommandRecorder;
use crate::renderer::sync::{Access, BindPoint, BufferBarrier, PipelineStages};

/// Workgroups needed to cover `instance_count` invocations
pub fn dispatch_group_count(instance_count: u32) -> u32 {
    instance_count.div_ceil(LOCAL_GROUP_SIZE)
}

/// Handles one slot's simulation dispatch needs
pub struct SimulationDispatch<R: CommandRecorder> {
    pub pipeline: R::Pipeline,
    pub layout: R::PipelineLayout,
    /// Instance SSBO, velocity SSBO and params UBO of this slot
    pub descriptor_set: R::DescriptorSet,
    pub instance_buffer: R::Buffer,
    pub instance_bytes: u64,
    pub instance_count: u32,
}

/// Record the dispatch and the barrier that publishes its writes to the vertex stage
///
/// Returns `false` and records nothing when there are no instances.
pub fn record_simulation<R: CommandRecorder>(recorder: &mut R, dispatch: &SimulationDispatch<R>) -> bool {
    let groups = dispatch_group_count(dispatch.instance_count);
    if groups == 0 {
        return false;
    }

    recorder.bind_pipeline(BindPoint::Compute, dispatch.pipeline);
    recorder.bind_descriptor_sets(BindPoint::Compute, dispatch.layout, 0, &[dispatch.descriptor_set]);
    recorder.dispatch(groups, 1, 1);

    recorder.buffer_barrier(&BufferBarrier {
        buffer: dispatch.instance_buffer,
        src_stage: PipelineStages::COMPUTE_SHADER,
        dst_stage: PipelineStages::VERTEX_SHADER,
        src_access: Access::SHADER_WRITE,
        dst_access: Access::SHADER_READ,
        offset: 0,
        size: dispatch.instance_bytes,
    });
    true
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;

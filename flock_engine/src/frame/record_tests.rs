use super::*;
use crate::renderer::sync::{Access, PipelineStages};
use crate::renderer::MockRecorder;

const INSTANCE_BUFFER: u32 = 5;
const VERTICES: u32 = 9;
const INDICES: u32 = 8;

fn simulation(count: u32) -> SimulationDispatch<MockRecorder> {
    SimulationDispatch {
        pipeline: 30,
        layout: 31,
        descriptor_set: 32,
        instance_buffer: INSTANCE_BUFFER,
        instance_bytes: count as u64 * 64,
        instance_count: count,
    }
}

fn draw(push: &[u8], instance_count: u32, env: bool) -> FrameDraw<'_, MockRecorder> {
    FrameDraw {
        framebuffer: 40,
        extent: Extent2D::new(800, 600),
        clear: ClearValues { color: [1.0, 1.0, 0.0, 1.0], depth: 1.0 },
        layout: 20,
        opaque_pipeline: 21,
        env_pipeline: env.then_some(22),
        descriptor_sets: [10, 11, 12],
        vertex_buffer: VERTICES,
        index_buffer: INDICES,
        index_count: 36,
        instance_count,
        push_constants: push,
    }
}

// ============================================================================
// Barrier ordering
// ============================================================================

#[test]
fn test_instance_barrier_between_dispatch_and_draw() {
    let push = [0u8; 64];
    let mut rec = MockRecorder::new();
    record_frame(&mut rec, Some(&simulation(200)), &draw(&push, 200, true));

    let dispatch = rec.position("dispatch:").unwrap();
    let barrier = rec.position(&format!("buffer_barrier:{}", INSTANCE_BUFFER)).unwrap();
    let begin = rec.position("begin_render_pass").unwrap();
    let draw_indexed = rec.position("draw_indexed:36x200").unwrap();

    assert!(dispatch < barrier);
    assert!(barrier < begin);
    assert!(begin < draw_indexed);

    let b = rec.buffer_barriers[0];
    assert_eq!((b.src_stage, b.dst_stage), (PipelineStages::COMPUTE_SHADER, PipelineStages::VERTEX_SHADER));
    assert_eq!((b.src_access, b.dst_access), (Access::SHADER_WRITE, Access::SHADER_READ));
}

#[test]
fn test_full_frame_sequence() {
    let push = [0u8; 64];
    let mut rec = MockRecorder::new();
    record_frame(&mut rec, Some(&simulation(200)), &draw(&push, 200, true));

    assert_eq!(rec.commands, vec![
        "bind_pipeline:Compute:30".to_string(),
        "bind_descriptor_sets:Compute:0:[32]".to_string(),
        "dispatch:1x1x1".to_string(),
        "buffer_barrier:5".to_string(),
        "begin_render_pass:40:800x600".to_string(),
        "set_viewport_scissor".to_string(),
        "bind_pipeline:Graphics:21".to_string(),
        "bind_descriptor_sets:Graphics:0:[10, 11, 12]".to_string(),
        "push_constants:20:0+64".to_string(),
        "bind_vertex_buffer:9@0".to_string(),
        "bind_index_buffer:8@0".to_string(),
        "draw_indexed:36x200".to_string(),
        "bind_pipeline:Graphics:22".to_string(),
        "draw:4x1".to_string(),
        "end_render_pass".to_string(),
    ]);
}

#[test]
fn test_one_render_pass_one_dispatch_per_frame() {
    let push = [0u8; 64];
    let mut rec = MockRecorder::new();
    record_frame(&mut rec, Some(&simulation(1000)), &draw(&push, 1000, true));
    assert_eq!(rec.count("begin_render_pass"), 1);
    assert_eq!(rec.count("end_render_pass"), 1);
    assert_eq!(rec.count("dispatch:"), 1);
    assert!(rec.position("dispatch:4x1x1").is_some());
}

// ============================================================================
// Optional stages
// ============================================================================

#[test]
fn test_zero_instances_skip_dispatch_barrier_and_draw() {
    let push = [0u8; 64];
    let mut rec = MockRecorder::new();
    record_frame(&mut rec, Some(&simulation(0)), &draw(&push, 0, true));

    assert_eq!(rec.count("dispatch:"), 0);
    assert!(rec.buffer_barriers.is_empty());
    assert_eq!(rec.count("draw_indexed"), 0);
    assert_eq!(rec.count("draw:4x1"), 1);
}

#[test]
fn test_without_compute_or_env() {
    let push = [0u8; 64];
    let mut rec = MockRecorder::new();
    record_frame(&mut rec, None, &draw(&push, 200, false));

    assert_eq!(rec.commands[0], "begin_render_pass:40:800x600");
    assert_eq!(rec.count("bind_pipeline:"), 1);
    assert_eq!(rec.commands.last().unwrap(), "end_render_pass");
}

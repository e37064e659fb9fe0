use super::*;
use std::mem::offset_of;

// ============================================================================
// Vertex input
// ============================================================================

#[test]
fn test_mesh_vertex_layout_matches_struct() {
    let layout = VertexLayout::mesh_vertex();
    assert_eq!(layout.stride, 48);
    let offsets: Vec<u32> = layout.attributes.iter().map(|a| a.offset).collect();
    assert_eq!(offsets, vec![
        offset_of!(Vertex, position) as u32,
        offset_of!(Vertex, uv) as u32,
        offset_of!(Vertex, normal) as u32,
        offset_of!(Vertex, tangent) as u32,
    ]);
    let locations: Vec<u32> = layout.attributes.iter().map(|a| a.location).collect();
    assert_eq!(locations, vec![0, 1, 2, 3]);
}

#[test]
fn test_attributes_fill_stride() {
    let layout = VertexLayout::mesh_vertex();
    let total: u32 = layout.attributes.iter().map(|a| a.format.size()).sum();
    assert_eq!(total, layout.stride);
}

// ============================================================================
// Presets
// ============================================================================

#[test]
fn test_opaque_preset() {
    let desc = GraphicsPipelineDesc::opaque();
    assert_eq!(desc.topology, Topology::TriangleList);
    assert_eq!(desc.cull_mode, CullMode::Back);
    assert_eq!(desc.front_face, FrontFace::CounterClockwise);
    assert_eq!(desc.depth, DepthState { test: true, write: true, compare: CompareOp::Less });
    assert!(!desc.blend);
    assert!(desc.vertex_layout.is_some());
}

#[test]
fn test_env_map_preset() {
    let desc = GraphicsPipelineDesc::env_map();
    assert_eq!(desc.topology, Topology::TriangleStrip);
    assert_eq!(desc.cull_mode, CullMode::None);
    assert!(!desc.depth.write);
    assert_eq!(desc.depth.compare, CompareOp::LessOrEqual);
    assert!(desc.vertex_layout.is_none());
    assert_eq!(ENV_MAP_VERTEX_COUNT, 4);
}

#[test]
fn test_material_push_range() {
    let range = PushConstantRange::material();
    assert_eq!(range.size, 64);
    assert!(range.stages.contains(ShaderStages::VERTEX | ShaderStages::FRAGMENT));
}

#[test]
fn test_compute_preset() {
    assert_eq!(ComputePipelineDesc::boids().shader, "boids.comp.spv");
}

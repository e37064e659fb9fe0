/// Pipeline presets and vertex input layout

pub mod desc;

pub use desc::{
    CompareOp, ComputePipelineDesc, CullMode, DepthState, FrontFace, GraphicsPipelineDesc, PushConstantRange,
    Topology, VertexAttribute, VertexFormat, VertexLayout, ENV_MAP_VERTEX_COUNT,
};

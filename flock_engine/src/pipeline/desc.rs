/// Fixed-function pipeline presets
///
/// The renderer builds exactly two graphics pipelines (opaque instanced
/// meshes and the environment backdrop) plus the boids compute pipeline.

use crate::descriptor::ShaderStages;
use crate::scene::{MaterialConstants, Vertex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    TriangleList,
    TriangleStrip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullMode {
    None,
    Front,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontFace {
    CounterClockwise,
    Clockwise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Less,
    LessOrEqual,
    Always,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthState {
    pub test: bool,
    pub write: bool,
    pub compare: CompareOp,
}

// ===== VERTEX INPUT =====

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexFormat {
    Float2,
    Float3,
    Float4,
}

impl VertexFormat {
    pub fn size(&self) -> u32 {
        match self {
            VertexFormat::Float2 => 8,
            VertexFormat::Float3 => 12,
            VertexFormat::Float4 => 16,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    pub location: u32,
    pub format: VertexFormat,
    pub offset: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexLayout {
    pub stride: u32,
    pub attributes: Vec<VertexAttribute>,
}

impl VertexLayout {
    /// Layout of [`Vertex`]: position, uv, normal, tangent at locations 0..4
    pub fn mesh_vertex() -> Self {
        let formats = [VertexFormat::Float3, VertexFormat::Float2, VertexFormat::Float3, VertexFormat::Float4];
        let mut offset = 0;
        let attributes = formats
            .iter()
            .enumerate()
            .map(|(location, &format)| {
                let attribute = VertexAttribute { location: location as u32, format, offset };
                offset += format.size();
                attribute
            })
            .collect();
        Self { stride: Vertex::STRIDE, attributes }
    }
}

// ===== PIPELINES =====

/// Push-constant range shared by both graphics pipelines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PushConstantRange {
    pub stages: ShaderStages,
    pub size: u32,
}

impl PushConstantRange {
    pub fn material() -> Self {
        Self {
            stages: ShaderStages::VERTEX | ShaderStages::FRAGMENT,
            size: MaterialConstants::SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphicsPipelineDesc {
    pub name: &'static str,
    /// Compiled SPIR-V file names, relative to the shader directory
    pub vertex_shader: &'static str,
    pub fragment_shader: &'static str,
    pub topology: Topology,
    pub cull_mode: CullMode,
    pub front_face: FrontFace,
    pub depth: DepthState,
    pub blend: bool,
    /// `None` means the vertex shader generates its own positions
    pub vertex_layout: Option<VertexLayout>,
}

impl GraphicsPipelineDesc {
    /// Instanced meshes: back-face culled, depth tested and written
    pub fn opaque() -> Self {
        Self {
            name: "opaque",
            vertex_shader: "mesh.vert.spv",
            fragment_shader: "mesh.frag.spv",
            topology: Topology::TriangleList,
            cull_mode: CullMode::Back,
            front_face: FrontFace::CounterClockwise,
            depth: DepthState { test: true, write: true, compare: CompareOp::Less },
            blend: false,
            vertex_layout: Some(VertexLayout::mesh_vertex()),
        }
    }

    /// Fullscreen backdrop drawn at the far plane behind the meshes
    pub fn env_map() -> Self {
        Self {
            name: "env_map",
            vertex_shader: "envmap.vert.spv",
            fragment_shader: "envmap.frag.spv",
            topology: Topology::TriangleStrip,
            cull_mode: CullMode::None,
            front_face: FrontFace::CounterClockwise,
            depth: DepthState { test: true, write: false, compare: CompareOp::LessOrEqual },
            blend: false,
            vertex_layout: None,
        }
    }
}

/// Vertices of the environment backdrop strip
pub const ENV_MAP_VERTEX_COUNT: u32 = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputePipelineDesc {
    pub name: &'static str,
    pub shader: &'static str,
}

impl ComputePipelineDesc {
    pub fn boids() -> Self {
        Self { name: "boids", shader: "boids.comp.spv" }
    }
}

#[cfg(test)]
#[path = "desc_tests.rs"]
mod tests;

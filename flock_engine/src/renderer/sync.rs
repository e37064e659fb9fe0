/// Backend-agnostic synchronization vocabulary
///
/// Pipeline stages, access masks, image layouts and the barrier records
/// built from them. The Vulkan backend maps each of these one-to-one onto
/// `vk::PipelineStageFlags`, `vk::AccessFlags` and `vk::ImageLayout`.

use bitflags::bitflags;

bitflags! {
    /// Pipeline stages a barrier waits on or blocks
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PipelineStages: u32 {
        const TOP_OF_PIPE             = 1 << 0;
        const VERTEX_INPUT            = 1 << 1;
        const VERTEX_SHADER           = 1 << 2;
        const FRAGMENT_SHADER         = 1 << 3;
        const EARLY_FRAGMENT_TESTS    = 1 << 4;
        const LATE_FRAGMENT_TESTS     = 1 << 5;
        const COLOR_ATTACHMENT_OUTPUT = 1 << 6;
        const COMPUTE_SHADER          = 1 << 7;
        const TRANSFER                = 1 << 8;
        const BOTTOM_OF_PIPE          = 1 << 9;
        const HOST                    = 1 << 10;
    }
}

bitflags! {
    /// Memory accesses made visible or available by a barrier
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Access: u32 {
        const INDEX_READ             = 1 << 0;
        const VERTEX_ATTRIBUTE_READ  = 1 << 1;
        const UNIFORM_READ           = 1 << 2;
        const SHADER_READ            = 1 << 3;
        const SHADER_WRITE           = 1 << 4;
        const COLOR_ATTACHMENT_WRITE = 1 << 5;
        const DEPTH_ATTACHMENT_WRITE = 1 << 6;
        const TRANSFER_READ          = 1 << 7;
        const TRANSFER_WRITE         = 1 << 8;
        const HOST_READ              = 1 << 9;
        const HOST_WRITE             = 1 << 10;
    }
}

impl Access {
    /// Whether this mask contains any write access
    pub fn has_write(&self) -> bool {
        self.intersects(
            Access::SHADER_WRITE
                | Access::COLOR_ATTACHMENT_WRITE
                | Access::DEPTH_ATTACHMENT_WRITE
                | Access::TRANSFER_WRITE
                | Access::HOST_WRITE,
        )
    }
}

/// Image layouts used by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageLayout {
    Undefined,
    TransferDst,
    TransferSrc,
    ShaderReadOnly,
    ColorAttachment,
    DepthAttachment,
    PresentSrc,
}

/// Image aspect touched by a barrier or copy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageAspect {
    Color,
    Depth,
}

/// 2D extent in texels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Extent2D {
    pub width: u32,
    pub height: u32,
}

impl Extent2D {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Next mip level extent: halved with floor, never below 1
    pub fn halved(&self) -> Self {
        Self {
            width: (self.width / 2).max(1),
            height: (self.height / 2).max(1),
        }
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Buffer memory barrier over an exact byte range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferBarrier<B> {
    pub buffer: B,
    pub src_stage: PipelineStages,
    pub dst_stage: PipelineStages,
    pub src_access: Access,
    pub dst_access: Access,
    pub offset: u64,
    pub size: u64,
}

/// Image memory barrier over a mip range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageBarrier<I> {
    pub image: I,
    pub aspect: ImageAspect,
    pub old_layout: ImageLayout,
    pub new_layout: ImageLayout,
    pub src_stage: PipelineStages,
    pub dst_stage: PipelineStages,
    pub src_access: Access,
    pub dst_access: Access,
    pub base_mip_level: u32,
    pub level_count: u32,
}

/// How a buffer is consumed once its upload lands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    Vertex,
    Index,
    /// Vertex and index data packed into one dual buffer
    VertexIndex,
    Uniform,
    Storage,
    /// Source of a readback copy
    TransferSrc,
}

impl BufferUsage {
    /// Stage and access a post-upload barrier must make the data visible to
    pub fn consumer(&self) -> (PipelineStages, Access) {
        match self {
            BufferUsage::Vertex => (PipelineStages::VERTEX_INPUT, Access::VERTEX_ATTRIBUTE_READ),
            BufferUsage::Index => (PipelineStages::VERTEX_INPUT, Access::INDEX_READ),
            BufferUsage::VertexIndex => (
                PipelineStages::VERTEX_INPUT,
                Access::VERTEX_ATTRIBUTE_READ | Access::INDEX_READ,
            ),
            BufferUsage::Uniform => (
                PipelineStages::VERTEX_SHADER | PipelineStages::COMPUTE_SHADER,
                Access::UNIFORM_READ,
            ),
            BufferUsage::Storage => (
                PipelineStages::VERTEX_SHADER | PipelineStages::COMPUTE_SHADER,
                Access::SHADER_READ | Access::SHADER_WRITE,
            ),
            BufferUsage::TransferSrc => (PipelineStages::TRANSFER, Access::TRANSFER_READ),
        }
    }
}

/// Pipeline bind point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindPoint {
    Graphics,
    Compute,
}

/// Clear values for the color and depth attachments
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearValues {
    pub color: [f32; 4],
    pub depth: f32,
}

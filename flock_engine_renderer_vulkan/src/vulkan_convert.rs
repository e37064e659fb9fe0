/// Conversions between engine types and Vulkan types
///
/// Pure functions, no device needed.

use ash::vk;
use flock_engine::flock::config::PresentMode;
use flock_engine::flock::descriptor::{BindingKind, ShaderStages};
use flock_engine::flock::memory::{MemoryProperties, MemoryTypeTable};
use flock_engine::flock::pipeline::{CompareOp, CullMode, FrontFace, Topology, VertexFormat};
use flock_engine::flock::render::{Access, BindPoint, Extent2D, ImageAspect, ImageLayout, PipelineStages};
use flock_engine::flock::scene::ImageFormat;

// ===== MEMORY =====

pub fn memory_properties_to_vk(properties: MemoryProperties) -> vk::MemoryPropertyFlags {
    // Same bit values on both sides
    vk::MemoryPropertyFlags::from_raw(properties.bits())
}

pub fn memory_properties_from_vk(flags: vk::MemoryPropertyFlags) -> MemoryProperties {
    MemoryProperties::from_bits_truncate(flags.as_raw())
}

/// Property table of the device's memory types, in device order
pub fn memory_type_table(properties: &vk::PhysicalDeviceMemoryProperties) -> MemoryTypeTable {
    let count = (properties.memory_type_count as usize).min(properties.memory_types.len());
    MemoryTypeTable::new(
        properties.memory_types[..count]
            .iter()
            .map(|memory_type| memory_properties_from_vk(memory_type.property_flags))
            .collect(),
    )
}

// ===== SYNCHRONIZATION =====

pub fn pipeline_stages_to_vk(stages: PipelineStages) -> vk::PipelineStageFlags {
    let mut flags = vk::PipelineStageFlags::empty();
    for (stage, vk_stage) in [
        (PipelineStages::TOP_OF_PIPE, vk::PipelineStageFlags::TOP_OF_PIPE),
        (PipelineStages::VERTEX_INPUT, vk::PipelineStageFlags::VERTEX_INPUT),
        (PipelineStages::VERTEX_SHADER, vk::PipelineStageFlags::VERTEX_SHADER),
        (PipelineStages::FRAGMENT_SHADER, vk::PipelineStageFlags::FRAGMENT_SHADER),
        (PipelineStages::EARLY_FRAGMENT_TESTS, vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS),
        (PipelineStages::LATE_FRAGMENT_TESTS, vk::PipelineStageFlags::LATE_FRAGMENT_TESTS),
        (PipelineStages::COLOR_ATTACHMENT_OUTPUT, vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT),
        (PipelineStages::COMPUTE_SHADER, vk::PipelineStageFlags::COMPUTE_SHADER),
        (PipelineStages::TRANSFER, vk::PipelineStageFlags::TRANSFER),
        (PipelineStages::BOTTOM_OF_PIPE, vk::PipelineStageFlags::BOTTOM_OF_PIPE),
        (PipelineStages::HOST, vk::PipelineStageFlags::HOST),
    ] {
        if stages.contains(stage) {
            flags |= vk_stage;
        }
    }
    flags
}

pub fn access_to_vk(access: Access) -> vk::AccessFlags {
    let mut flags = vk::AccessFlags::empty();
    for (bit, vk_access) in [
        (Access::INDEX_READ, vk::AccessFlags::INDEX_READ),
        (Access::VERTEX_ATTRIBUTE_READ, vk::AccessFlags::VERTEX_ATTRIBUTE_READ),
        (Access::UNIFORM_READ, vk::AccessFlags::UNIFORM_READ),
        (Access::SHADER_READ, vk::AccessFlags::SHADER_READ),
        (Access::SHADER_WRITE, vk::AccessFlags::SHADER_WRITE),
        (Access::COLOR_ATTACHMENT_WRITE, vk::AccessFlags::COLOR_ATTACHMENT_WRITE),
        (Access::DEPTH_ATTACHMENT_WRITE, vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE),
        (Access::TRANSFER_READ, vk::AccessFlags::TRANSFER_READ),
        (Access::TRANSFER_WRITE, vk::AccessFlags::TRANSFER_WRITE),
        (Access::HOST_READ, vk::AccessFlags::HOST_READ),
        (Access::HOST_WRITE, vk::AccessFlags::HOST_WRITE),
    ] {
        if access.contains(bit) {
            flags |= vk_access;
        }
    }
    flags
}

pub fn image_layout_to_vk(layout: ImageLayout) -> vk::ImageLayout {
    match layout {
        ImageLayout::Undefined => vk::ImageLayout::UNDEFINED,
        ImageLayout::TransferDst => vk::ImageLayout::TRANSFER_DST_OPTIMAL,
        ImageLayout::TransferSrc => vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
        ImageLayout::ShaderReadOnly => vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
        ImageLayout::ColorAttachment => vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
        ImageLayout::DepthAttachment => vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL,
        ImageLayout::PresentSrc => vk::ImageLayout::PRESENT_SRC_KHR,
    }
}

pub fn image_aspect_to_vk(aspect: ImageAspect) -> vk::ImageAspectFlags {
    match aspect {
        ImageAspect::Color => vk::ImageAspectFlags::COLOR,
        ImageAspect::Depth => vk::ImageAspectFlags::DEPTH,
    }
}

pub fn bind_point_to_vk(bind_point: BindPoint) -> vk::PipelineBindPoint {
    match bind_point {
        BindPoint::Graphics => vk::PipelineBindPoint::GRAPHICS,
        BindPoint::Compute => vk::PipelineBindPoint::COMPUTE,
    }
}

pub fn extent_to_vk(extent: Extent2D) -> vk::Extent2D {
    vk::Extent2D { width: extent.width, height: extent.height }
}

pub fn extent_from_vk(extent: vk::Extent2D) -> Extent2D {
    Extent2D::new(extent.width, extent.height)
}

// ===== DESCRIPTORS =====

pub fn descriptor_type_to_vk(kind: BindingKind) -> vk::DescriptorType {
    match kind {
        BindingKind::UniformBuffer => vk::DescriptorType::UNIFORM_BUFFER,
        BindingKind::StorageBuffer => vk::DescriptorType::STORAGE_BUFFER,
        BindingKind::CombinedImageSampler => vk::DescriptorType::COMBINED_IMAGE_SAMPLER,
    }
}

pub fn shader_stages_to_vk(stages: ShaderStages) -> vk::ShaderStageFlags {
    let mut flags = vk::ShaderStageFlags::empty();
    if stages.contains(ShaderStages::VERTEX) {
        flags |= vk::ShaderStageFlags::VERTEX;
    }
    if stages.contains(ShaderStages::FRAGMENT) {
        flags |= vk::ShaderStageFlags::FRAGMENT;
    }
    if stages.contains(ShaderStages::COMPUTE) {
        flags |= vk::ShaderStageFlags::COMPUTE;
    }
    flags
}

// ===== PIPELINE STATE =====

pub fn topology_to_vk(topology: Topology) -> vk::PrimitiveTopology {
    match topology {
        Topology::TriangleList => vk::PrimitiveTopology::TRIANGLE_LIST,
        Topology::TriangleStrip => vk::PrimitiveTopology::TRIANGLE_STRIP,
    }
}

pub fn cull_mode_to_vk(cull_mode: CullMode) -> vk::CullModeFlags {
    match cull_mode {
        CullMode::None => vk::CullModeFlags::NONE,
        CullMode::Front => vk::CullModeFlags::FRONT,
        CullMode::Back => vk::CullModeFlags::BACK,
    }
}

pub fn front_face_to_vk(front_face: FrontFace) -> vk::FrontFace {
    match front_face {
        FrontFace::CounterClockwise => vk::FrontFace::COUNTER_CLOCKWISE,
        FrontFace::Clockwise => vk::FrontFace::CLOCKWISE,
    }
}

pub fn compare_op_to_vk(op: CompareOp) -> vk::CompareOp {
    match op {
        CompareOp::Less => vk::CompareOp::LESS,
        CompareOp::LessOrEqual => vk::CompareOp::LESS_OR_EQUAL,
        CompareOp::Always => vk::CompareOp::ALWAYS,
    }
}

pub fn vertex_format_to_vk(format: VertexFormat) -> vk::Format {
    match format {
        VertexFormat::Float2 => vk::Format::R32G32_SFLOAT,
        VertexFormat::Float3 => vk::Format::R32G32B32_SFLOAT,
        VertexFormat::Float4 => vk::Format::R32G32B32A32_SFLOAT,
    }
}

pub fn image_format_to_vk(format: ImageFormat) -> vk::Format {
    match format {
        ImageFormat::Rgba8Srgb => vk::Format::R8G8B8A8_SRGB,
        ImageFormat::Rgba8Unorm => vk::Format::R8G8B8A8_UNORM,
        ImageFormat::Rgba32Float => vk::Format::R32G32B32A32_SFLOAT,
    }
}

// ===== PRESENTATION =====

pub fn present_mode_to_vk(mode: PresentMode) -> vk::PresentModeKHR {
    match mode {
        PresentMode::FifoRelaxed => vk::PresentModeKHR::FIFO_RELAXED,
        PresentMode::Fifo => vk::PresentModeKHR::FIFO,
        PresentMode::Mailbox => vk::PresentModeKHR::MAILBOX,
        PresentMode::Immediate => vk::PresentModeKHR::IMMEDIATE,
    }
}

/// First preferred mode the surface supports, FIFO otherwise
pub fn choose_present_mode(preferences: &[PresentMode], available: &[vk::PresentModeKHR]) -> vk::PresentModeKHR {
    preferences
        .iter()
        .map(|&mode| present_mode_to_vk(mode))
        .find(|mode| available.contains(mode))
        .unwrap_or(vk::PresentModeKHR::FIFO)
}

/// 8-bit sRGB with the nonlinear color space when preferred, else the first format
///
/// Returns `None` only when the surface reports no format at all.
pub fn choose_surface_format(formats: &[vk::SurfaceFormatKHR], prefer_srgb: bool) -> Option<vk::SurfaceFormatKHR> {
    let srgb = formats.iter().find(|f| {
        matches!(f.format, vk::Format::B8G8R8A8_SRGB | vk::Format::R8G8B8A8_SRGB)
            && f.color_space == vk::ColorSpaceKHR::SRGB_NONLINEAR
    });
    match srgb {
        Some(format) if prefer_srgb => Some(*format),
        _ => formats.first().copied(),
    }
}

/// Swapchain extent: the surface's current extent, or the window size
/// clamped to the surface limits when the surface leaves it to us
pub fn choose_extent(capabilities: &vk::SurfaceCapabilitiesKHR, desired: Extent2D) -> vk::Extent2D {
    if capabilities.current_extent.width != u32::MAX {
        return capabilities.current_extent;
    }
    vk::Extent2D {
        width: desired
            .width
            .clamp(capabilities.min_image_extent.width, capabilities.max_image_extent.width),
        height: desired
            .height
            .clamp(capabilities.min_image_extent.height, capabilities.max_image_extent.height),
    }
}

/// Requested image count raised to the surface minimum, capped by its maximum (0 = no cap)
pub fn choose_image_count(capabilities: &vk::SurfaceCapabilitiesKHR, requested: u32) -> u32 {
    let count = requested.max(capabilities.min_image_count);
    if capabilities.max_image_count > 0 {
        count.min(capabilities.max_image_count)
    } else {
        count
    }
}

#[cfg(test)]
#[path = "vulkan_convert_tests.rs"]
mod tests;

/*!
# Flock Engine - Vulkan Renderer Backend

Vulkan implementation of the Flock boids renderer.

This crate implements the `flock_engine` seams on top of `ash`:
[`FrameSync`](flock_engine::flock::frame::FrameSync) for the swapchain, the
per-slot fences and command pools, and
[`CommandRecorder`](flock_engine::flock::render::CommandRecorder) over a
`vk::CommandBuffer`. Images go through `gpu-allocator`; buffers are bound to
raw `vkAllocateMemory` allocations picked with the core memory-type table.

## Usage

```no_run
use flock_engine::flock::config::Config;
use flock_engine::flock::render::Extent2D;
use flock_engine::flock::scene::{MeshData, Scene};
use flock_engine_renderer_vulkan::flock::VulkanRenderer;
# fn run(window: &winit::window::Window, mesh: MeshData) -> flock_engine::flock::Result<()> {
let size = window.inner_size();
let mut scene = Scene::new(mesh);
let mut renderer = VulkanRenderer::new(window, Extent2D::new(size.width, size.height), Config::default(), &mut scene)?;
renderer.render_frame(&mut scene)?;
# Ok(())
# }
```
*/

// Device and shared context
mod vulkan_context;
mod vulkan_device;
#[cfg(feature = "vulkan-validation")]
mod vulkan_debug;
mod vulkan_convert;

// Resources
mod vulkan_memory;
mod vulkan_image;
mod vulkan_staging;
mod vulkan_recorder;

// Presentation and frames
mod vulkan_swapchain;
mod vulkan_frame;

// Binding and pipelines
mod vulkan_descriptors;
mod vulkan_shader;
mod vulkan_render_pass;
mod vulkan_pipeline;

mod vulkan_renderer;

// Main flock namespace module
pub mod flock {
    /// Directory the build script compiled `shaders/` into
    pub const COMPILED_SHADER_DIR: &str = env!("FLOCK_SHADER_DIR");

    pub use crate::vulkan_renderer::VulkanRenderer;
    pub use crate::vulkan_context::GpuContext;
    pub use crate::vulkan_memory::{DualBuffer, VulkanBuffer};
    pub use crate::vulkan_image::{VulkanImage, VulkanSampler, DEPTH_FORMAT};
    pub use crate::vulkan_staging::StagingBuffer;
    pub use crate::vulkan_recorder::VulkanRecorder;
    pub use crate::vulkan_frame::VulkanFrameSync;
    pub use crate::vulkan_descriptors::{SlotBindings, VulkanDescriptors};
    pub use crate::vulkan_pipeline::VulkanPipelines;
    pub use crate::vulkan_shader::{reflect, ReflectedResource, ShaderModule};

    #[cfg(feature = "vulkan-validation")]
    pub use crate::vulkan_debug::{get_validation_stats, print_validation_stats_report};
}

/// Images (sampled textures and the depth buffer) and samplers
///
/// Image memory comes from gpu-allocator (`GpuOnly`).

use ash::vk;
use flock_engine::flock::render::Extent2D;
use flock_engine::flock::{Error, Result};
use flock_engine::{engine_err, engine_error, engine_warn};
use gpu_allocator::vulkan::{Allocation, AllocationCreateDesc, AllocationScheme};
use gpu_allocator::MemoryLocation;
use std::sync::Arc;

use crate::vulkan_context::{map_vk_error, GpuContext};
use crate::vulkan_convert::extent_to_vk;

/// Depth attachment format
pub const DEPTH_FORMAT: vk::Format = vk::Format::D32_SFLOAT;

/// A 2D image with its view and memory
pub struct VulkanImage {
    ctx: Arc<GpuContext>,
    image: vk::Image,
    view: vk::ImageView,
    allocation: Option<Allocation>,
    format: vk::Format,
    extent: Extent2D,
    mip_levels: u32,
}

impl VulkanImage {
    /// Sampled color image, filled later by a staging upload
    ///
    /// A mip chain additionally needs the image as a blit source.
    pub fn texture(
        ctx: Arc<GpuContext>,
        name: &str,
        extent: Extent2D,
        format: vk::Format,
        mip_levels: u32,
    ) -> Result<Self> {
        let mut usage = vk::ImageUsageFlags::SAMPLED | vk::ImageUsageFlags::TRANSFER_DST;
        if mip_levels > 1 {
            usage |= vk::ImageUsageFlags::TRANSFER_SRC;
        }
        Self::new(ctx, name, extent, format, mip_levels, usage, vk::ImageAspectFlags::COLOR)
    }

    /// Depth attachment matching the swapchain extent
    pub fn depth(ctx: Arc<GpuContext>, extent: Extent2D) -> Result<Self> {
        Self::new(
            ctx,
            "depth",
            extent,
            DEPTH_FORMAT,
            1,
            vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT,
            vk::ImageAspectFlags::DEPTH,
        )
    }

    fn new(
        ctx: Arc<GpuContext>,
        name: &str,
        extent: Extent2D,
        format: vk::Format,
        mip_levels: u32,
        usage: vk::ImageUsageFlags,
        aspect_mask: vk::ImageAspectFlags,
    ) -> Result<Self> {
        if extent.is_empty() {
            return Err(engine_err!("flock::vulkan", "Image '{}' has an empty extent {:?}", name, extent));
        }

        unsafe {
            let image_create_info = vk::ImageCreateInfo::default()
                .image_type(vk::ImageType::TYPE_2D)
                .format(format)
                .extent(vk::Extent3D {
                    width: extent.width,
                    height: extent.height,
                    depth: 1,
                })
                .mip_levels(mip_levels)
                .array_layers(1)
                .samples(vk::SampleCountFlags::TYPE_1)
                .tiling(vk::ImageTiling::OPTIMAL)
                .usage(usage)
                .sharing_mode(vk::SharingMode::EXCLUSIVE)
                .initial_layout(vk::ImageLayout::UNDEFINED);

            let image = ctx
                .device
                .create_image(&image_create_info, None)
                .map_err(|e| map_vk_error("vkCreateImage", e))?;

            // From here on, `this` owns whatever has been created
            let mut this = Self {
                ctx,
                image,
                view: vk::ImageView::null(),
                allocation: None,
                format,
                extent,
                mip_levels,
            };

            let requirements = this.ctx.device.get_image_memory_requirements(image);
            let allocation = this
                .ctx
                .allocator()?
                .allocate(&AllocationCreateDesc {
                    name,
                    requirements,
                    location: MemoryLocation::GpuOnly,
                    linear: false,
                    allocation_scheme: AllocationScheme::GpuAllocatorManaged,
                })
                .map_err(|_| {
                    let size_mb = requirements.size as f64 / (1024.0 * 1024.0);
                    engine_error!("flock::vulkan", "Out of GPU memory for image '{}' ({}x{}, {:.2} MB)",
                        name, extent.width, extent.height, size_mb);
                    Error::OutOfMemory
                })?;

            this.ctx
                .device
                .bind_image_memory(image, allocation.memory(), allocation.offset())
                .map_err(|e| map_vk_error("vkBindImageMemory", e))?;
            this.allocation = Some(allocation);

            let view_create_info = vk::ImageViewCreateInfo::default()
                .image(image)
                .view_type(vk::ImageViewType::TYPE_2D)
                .format(format)
                .subresource_range(vk::ImageSubresourceRange {
                    aspect_mask,
                    base_mip_level: 0,
                    level_count: mip_levels,
                    base_array_layer: 0,
                    layer_count: 1,
                });
            this.view = this
                .ctx
                .device
                .create_image_view(&view_create_info, None)
                .map_err(|e| map_vk_error("vkCreateImageView", e))?;

            Ok(this)
        }
    }

    pub fn handle(&self) -> vk::Image {
        self.image
    }

    pub fn view(&self) -> vk::ImageView {
        self.view
    }

    pub fn format(&self) -> vk::Format {
        self.format
    }

    pub fn extent(&self) -> Extent2D {
        self.extent
    }

    pub fn vk_extent(&self) -> vk::Extent2D {
        extent_to_vk(self.extent)
    }

    pub fn mip_levels(&self) -> u32 {
        self.mip_levels
    }
}

impl Drop for VulkanImage {
    fn drop(&mut self) {
        unsafe {
            if self.view != vk::ImageView::null() {
                self.ctx.device.destroy_image_view(self.view, None);
            }
            if let Some(allocation) = self.allocation.take() {
                // Don't panic if the lock fails, the image still has to go
                if let Ok(mut allocator) = self.ctx.allocator() {
                    allocator.free(allocation).ok();
                }
            }
            self.ctx.device.destroy_image(self.image, None);
        }
    }
}

/// Mip levels the device can actually generate for `format`
///
/// Generating mips by blitting needs BLIT_SRC, BLIT_DST and linear filtering
/// in optimal tiling; without them the image keeps a single level.
pub fn supported_mip_levels(ctx: &GpuContext, format: vk::Format, requested: u32) -> u32 {
    if requested <= 1 {
        return 1;
    }
    let properties = unsafe {
        ctx.instance
            .get_physical_device_format_properties(ctx.physical_device, format)
    };
    let needed = vk::FormatFeatureFlags::BLIT_SRC
        | vk::FormatFeatureFlags::BLIT_DST
        | vk::FormatFeatureFlags::SAMPLED_IMAGE_FILTER_LINEAR;
    if properties.optimal_tiling_features.contains(needed) {
        requested
    } else {
        engine_warn!("flock::vulkan",
            "Format {:?} cannot be blitted with linear filtering; uploading without mipmaps", format);
        1
    }
}

// ===== SAMPLER =====

/// A linear, repeating sampler covering every mip level
pub struct VulkanSampler {
    ctx: Arc<GpuContext>,
    sampler: vk::Sampler,
}

impl VulkanSampler {
    pub fn linear_repeat(ctx: Arc<GpuContext>) -> Result<Self> {
        let anisotropy = unsafe {
            ctx.instance
                .get_physical_device_features(ctx.physical_device)
                .sampler_anisotropy
                == vk::TRUE
        };
        let create_info = vk::SamplerCreateInfo::default()
            .mag_filter(vk::Filter::LINEAR)
            .min_filter(vk::Filter::LINEAR)
            .mipmap_mode(vk::SamplerMipmapMode::LINEAR)
            .address_mode_u(vk::SamplerAddressMode::REPEAT)
            .address_mode_v(vk::SamplerAddressMode::REPEAT)
            .address_mode_w(vk::SamplerAddressMode::REPEAT)
            .anisotropy_enable(anisotropy)
            .max_anisotropy(if anisotropy { 16.0 } else { 1.0 })
            .border_color(vk::BorderColor::FLOAT_OPAQUE_BLACK)
            .min_lod(0.0)
            .max_lod(vk::LOD_CLAMP_NONE);

        let sampler = unsafe { ctx.device.create_sampler(&create_info, None) }
            .map_err(|e| map_vk_error("vkCreateSampler", e))?;
        Ok(Self { ctx, sampler })
    }

    pub fn handle(&self) -> vk::Sampler {
        self.sampler
    }
}

impl Drop for VulkanSampler {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_sampler(self.sampler, None);
        }
    }
}

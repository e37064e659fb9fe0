/// VulkanSwapchain - Surface, swapchain images and presentation semaphores
///
/// Semaphores:
/// - one acquire semaphore per swapchain image, selected by the rotating
///   `SemaphoreIndex` (never by the frame slot)
/// - one render-complete semaphore per swapchain image, selected by the
///   acquired image index

use ash::vk;
use flock_engine::flock::config::{Config, PresentMode, SWAPCHAIN_IMAGES};
use flock_engine::flock::frame::{Acquired, Presented, SemaphoreIndex};
use flock_engine::flock::render::Extent2D;
use flock_engine::flock::{Error, Result};
use flock_engine::{engine_debug, engine_err, engine_error, engine_info};
use std::sync::Arc;

use crate::vulkan_context::{map_vk_error, GpuContext};
use crate::vulkan_convert::{choose_extent, choose_image_count, choose_present_mode, choose_surface_format, extent_from_vk};

pub struct VulkanSwapchain {
    ctx: Arc<GpuContext>,

    surface: vk::SurfaceKHR,
    surface_loader: ash::khr::surface::Instance,

    loader: ash::khr::swapchain::Device,
    swapchain: vk::SwapchainKHR,
    images: Vec<vk::Image>,
    views: Vec<vk::ImageView>,
    surface_format: vk::SurfaceFormatKHR,
    extent: vk::Extent2D,

    present_modes: Vec<PresentMode>,

    acquire_semaphores: Vec<vk::Semaphore>,
    render_complete_semaphores: Vec<vk::Semaphore>,
}

impl VulkanSwapchain {
    /// Create the swapchain for `surface`, taking ownership of the surface
    pub fn new(
        ctx: Arc<GpuContext>,
        surface: vk::SurfaceKHR,
        surface_loader: ash::khr::surface::Instance,
        config: &Config,
        desired_extent: Extent2D,
    ) -> Result<Self> {
        let loader = ash::khr::swapchain::Device::new(&ctx.instance, &ctx.device);

        let formats = unsafe {
            surface_loader.get_physical_device_surface_formats(ctx.physical_device, surface)
        };
        let surface_format = match formats.map(|f| choose_surface_format(&f, config.prefer_srgb)) {
            Ok(Some(format)) => format,
            failure => {
                // Nothing owns the surface yet
                unsafe { surface_loader.destroy_surface(surface, None) };
                let detail = match failure {
                    Err(e) => format!("Failed to get surface formats: {:?}", e),
                    _ => "Surface reports no formats".to_string(),
                };
                engine_error!("flock::vulkan", "{}", detail);
                return Err(Error::InitializationFailed(detail));
            }
        };

        let mut this = Self {
            ctx,
            surface,
            surface_loader,
            loader,
            swapchain: vk::SwapchainKHR::null(),
            images: Vec::new(),
            views: Vec::new(),
            surface_format,
            extent: vk::Extent2D::default(),
            present_modes: config.present_modes.clone(),
            acquire_semaphores: Vec::new(),
            render_complete_semaphores: Vec::new(),
        };
        this.build(desired_extent)?;
        Ok(this)
    }

    /// (Re)create swapchain, views and semaphores; the old swapchain is retired
    fn build(&mut self, desired_extent: Extent2D) -> Result<()> {
        let ctx = Arc::clone(&self.ctx);
        let device = &ctx.device;
        unsafe {
            let capabilities = self
                .surface_loader
                .get_physical_device_surface_capabilities(self.ctx.physical_device, self.surface)
                .map_err(|e| map_vk_error("vkGetPhysicalDeviceSurfaceCapabilitiesKHR", e))?;
            let available_modes = self
                .surface_loader
                .get_physical_device_surface_present_modes(self.ctx.physical_device, self.surface)
                .map_err(|e| map_vk_error("vkGetPhysicalDeviceSurfacePresentModesKHR", e))?;

            let extent = choose_extent(&capabilities, desired_extent);
            let image_count = choose_image_count(&capabilities, SWAPCHAIN_IMAGES);
            let present_mode = choose_present_mode(&self.present_modes, &available_modes);

            let queue_families = [self.ctx.queue_family, self.ctx.present_queue_family];
            let old_swapchain = self.swapchain;
            let mut create_info = vk::SwapchainCreateInfoKHR::default()
                .surface(self.surface)
                .min_image_count(image_count)
                .image_format(self.surface_format.format)
                .image_color_space(self.surface_format.color_space)
                .image_extent(extent)
                .image_array_layers(1)
                .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
                .pre_transform(capabilities.current_transform)
                .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
                .present_mode(present_mode)
                .clipped(true)
                .old_swapchain(old_swapchain);
            create_info = if self.ctx.queue_family != self.ctx.present_queue_family {
                create_info
                    .image_sharing_mode(vk::SharingMode::CONCURRENT)
                    .queue_family_indices(&queue_families)
            } else {
                create_info.image_sharing_mode(vk::SharingMode::EXCLUSIVE)
            };

            let swapchain = self
                .loader
                .create_swapchain(&create_info, None)
                .map_err(|e| map_vk_error("vkCreateSwapchainKHR", e))?;

            self.destroy_views_and_semaphores();
            if old_swapchain != vk::SwapchainKHR::null() {
                self.loader.destroy_swapchain(old_swapchain, None);
            }
            self.swapchain = swapchain;
            self.extent = extent;

            self.images = self
                .loader
                .get_swapchain_images(swapchain)
                .map_err(|e| map_vk_error("vkGetSwapchainImagesKHR", e))?;

            for &image in &self.images {
                let view_info = vk::ImageViewCreateInfo::default()
                    .image(image)
                    .view_type(vk::ImageViewType::TYPE_2D)
                    .format(self.surface_format.format)
                    .components(vk::ComponentMapping {
                        r: vk::ComponentSwizzle::IDENTITY,
                        g: vk::ComponentSwizzle::IDENTITY,
                        b: vk::ComponentSwizzle::IDENTITY,
                        a: vk::ComponentSwizzle::IDENTITY,
                    })
                    .subresource_range(vk::ImageSubresourceRange {
                        aspect_mask: vk::ImageAspectFlags::COLOR,
                        base_mip_level: 0,
                        level_count: 1,
                        base_array_layer: 0,
                        layer_count: 1,
                    });
                let view = device
                    .create_image_view(&view_info, None)
                    .map_err(|e| map_vk_error("vkCreateImageView", e))?;
                self.views.push(view);
            }

            let semaphore_info = vk::SemaphoreCreateInfo::default();
            for _ in 0..self.images.len() {
                let acquire = device
                    .create_semaphore(&semaphore_info, None)
                    .map_err(|e| map_vk_error("vkCreateSemaphore", e))?;
                self.acquire_semaphores.push(acquire);
                let render_complete = device
                    .create_semaphore(&semaphore_info, None)
                    .map_err(|e| map_vk_error("vkCreateSemaphore", e))?;
                self.render_complete_semaphores.push(render_complete);
            }

            engine_info!("flock::vulkan", "Swapchain: {}x{}, {} images, {:?}, {:?}",
                extent.width, extent.height, self.images.len(), self.surface_format.format, present_mode);
            Ok(())
        }
    }

    /// Rebuild for a new window size
    ///
    /// The device must be idle: every image view and semaphore is replaced.
    pub fn recreate(&mut self, desired_extent: Extent2D) -> Result<()> {
        engine_debug!("flock::vulkan", "Recreating swapchain for {}x{}",
            desired_extent.width, desired_extent.height);
        self.build(desired_extent)
    }

    /// Acquire the next image, signaling the acquire semaphore `semaphore`
    pub fn acquire(&self, semaphore: SemaphoreIndex) -> Result<Acquired> {
        let signal = self.acquire_semaphore(semaphore)?;
        let result = unsafe {
            self.loader
                .acquire_next_image(self.swapchain, u64::MAX, signal, vk::Fence::null())
        };
        match result {
            Ok((index, suboptimal)) => Ok(Acquired::Image { index, suboptimal }),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(Acquired::OutOfDate),
            Err(e) => Err(map_vk_error("vkAcquireNextImageKHR", e)),
        }
    }

    /// Present `image_index` once its render-complete semaphore signals
    pub fn present(&self, image_index: u32) -> Result<Presented> {
        let wait_semaphores = [self.render_complete_semaphore(image_index)?];
        let swapchains = [self.swapchain];
        let image_indices = [image_index];
        let present_info = vk::PresentInfoKHR::default()
            .wait_semaphores(&wait_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        match unsafe { self.loader.queue_present(self.ctx.present_queue, &present_info) } {
            Ok(false) => Ok(Presented::Optimal),
            Ok(true) => Ok(Presented::Suboptimal),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(Presented::OutOfDate),
            Err(e) => Err(map_vk_error("vkQueuePresentKHR", e)),
        }
    }

    pub fn acquire_semaphore(&self, semaphore: SemaphoreIndex) -> Result<vk::Semaphore> {
        self.acquire_semaphores
            .get(semaphore.as_usize())
            .copied()
            .ok_or_else(|| engine_err!("flock::vulkan", "{:?} out of range for {} images", semaphore, self.images.len()))
    }

    pub fn render_complete_semaphore(&self, image_index: u32) -> Result<vk::Semaphore> {
        self.render_complete_semaphores
            .get(image_index as usize)
            .copied()
            .ok_or_else(|| engine_err!("flock::vulkan", "Image index {} out of range", image_index))
    }

    pub fn image_count(&self) -> u32 {
        self.images.len() as u32
    }

    pub fn views(&self) -> &[vk::ImageView] {
        &self.views
    }

    pub fn format(&self) -> vk::Format {
        self.surface_format.format
    }

    pub fn extent(&self) -> Extent2D {
        extent_from_vk(self.extent)
    }

    fn destroy_views_and_semaphores(&mut self) {
        unsafe {
            for view in self.views.drain(..) {
                self.ctx.device.destroy_image_view(view, None);
            }
            for semaphore in self
                .acquire_semaphores
                .drain(..)
                .chain(self.render_complete_semaphores.drain(..))
            {
                self.ctx.device.destroy_semaphore(semaphore, None);
            }
        }
    }
}

impl Drop for VulkanSwapchain {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.device_wait_idle().ok();
            self.destroy_views_and_semaphores();
            if self.swapchain != vk::SwapchainKHR::null() {
                self.loader.destroy_swapchain(self.swapchain, None);
            }
            self.surface_loader.destroy_surface(self.surface, None);
        }
    }
}

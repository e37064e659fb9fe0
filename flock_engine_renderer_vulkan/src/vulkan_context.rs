/// GpuContext - Shared GPU handles for all Vulkan objects
///
/// Contains everything resource creation needs:
/// - Instance, physical and logical device
/// - The graphics+compute queue and the present queue
/// - The classified memory-type table and `nonCoherentAtomSize`
/// - The image allocator
/// - The command pool for one-shot uploads

use ash::vk;
use flock_engine::flock::memory::MemoryTypeTable;
use flock_engine::flock::{Error, Result};
use flock_engine::{engine_err, engine_error, engine_warn};
use gpu_allocator::vulkan::Allocator;
use std::mem::ManuallyDrop;
use std::sync::{Mutex, MutexGuard};

/// Shared GPU context, held in an `Arc` by every GPU resource.
///
/// Device and instance destruction is driven by `VulkanRenderer::drop`
/// through [`GpuContext::destroy`], once every dependent resource is gone.
pub struct GpuContext {
    /// Kept alive for the lifetime of the instance
    #[allow(dead_code)]
    pub(crate) entry: ash::Entry,
    pub instance: ash::Instance,
    pub physical_device: vk::PhysicalDevice,
    pub device: ash::Device,

    /// Queue supporting both graphics and compute
    pub queue: vk::Queue,
    pub queue_family: u32,
    /// Queue able to present to the surface (may equal `queue`)
    pub present_queue: vk::Queue,
    pub present_queue_family: u32,

    /// Memory types in device order
    pub memory_types: MemoryTypeTable,
    /// Flush/invalidate granularity for non-coherent memory
    pub non_coherent_atom_size: u64,

    /// Image allocator; dropped before the device in `destroy`
    allocator: ManuallyDrop<Mutex<Allocator>>,

    /// Command pool for one-shot uploads (TRANSIENT + RESET_COMMAND_BUFFER)
    upload_command_pool: Mutex<vk::CommandPool>,

    /// Debug messenger, present when validation is compiled in and enabled
    pub(crate) debug_utils: Option<(ash::ext::debug_utils::Instance, vk::DebugUtilsMessengerEXT)>,
}

impl GpuContext {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        entry: ash::Entry,
        instance: ash::Instance,
        physical_device: vk::PhysicalDevice,
        device: ash::Device,
        queues: (vk::Queue, u32, vk::Queue, u32),
        memory_types: MemoryTypeTable,
        non_coherent_atom_size: u64,
        allocator: Allocator,
        upload_command_pool: vk::CommandPool,
        debug_utils: Option<(ash::ext::debug_utils::Instance, vk::DebugUtilsMessengerEXT)>,
    ) -> Self {
        let (queue, queue_family, present_queue, present_queue_family) = queues;
        Self {
            entry,
            instance,
            physical_device,
            device,
            queue,
            queue_family,
            present_queue,
            present_queue_family,
            memory_types,
            non_coherent_atom_size,
            allocator: ManuallyDrop::new(Mutex::new(allocator)),
            upload_command_pool: Mutex::new(upload_command_pool),
            debug_utils,
        }
    }

    /// Lock the image allocator
    pub fn allocator(&self) -> Result<MutexGuard<'_, Allocator>> {
        self.allocator
            .lock()
            .map_err(|_| engine_err!("flock::vulkan", "GPU allocator mutex poisoned"))
    }

    /// Lock the upload command pool
    pub(crate) fn upload_command_pool(&self) -> Result<MutexGuard<'_, vk::CommandPool>> {
        self.upload_command_pool
            .lock()
            .map_err(|_| engine_err!("flock::vulkan", "Upload command pool mutex poisoned"))
    }

    pub fn wait_idle(&self) -> Result<()> {
        unsafe {
            self.device
                .device_wait_idle()
                .map_err(|e| map_vk_error("vkDeviceWaitIdle", e))
        }
    }

    /// Tear down the allocator, upload pool, messenger, device and instance
    ///
    /// # Safety
    ///
    /// Every object created from this device must already be destroyed and
    /// the device must be idle. Must be called at most once.
    pub(crate) unsafe fn destroy(&mut self) {
        ManuallyDrop::drop(&mut self.allocator);

        if let Ok(pool) = self.upload_command_pool.get_mut() {
            if *pool != vk::CommandPool::null() {
                self.device.destroy_command_pool(*pool, None);
                *pool = vk::CommandPool::null();
            }
        }

        #[cfg(feature = "vulkan-validation")]
        crate::vulkan_debug::cleanup_debug_config();

        if let Some((debug_utils, messenger)) = self.debug_utils.take() {
            debug_utils.destroy_debug_utils_messenger(messenger, None);
        }

        self.device.destroy_device(None);
        self.instance.destroy_instance(None);
    }
}

/// Classify a failed Vulkan call
///
/// Device loss, stale swapchains and expired waits get their own variants;
/// everything else is a backend error. Every case is logged with the failing call's name.
pub(crate) fn map_vk_error(call: &str, result: vk::Result) -> Error {
    match result {
        vk::Result::ERROR_DEVICE_LOST => {
            engine_error!("flock::vulkan", "{}: device lost", call);
            Error::DeviceLost(call.to_string())
        }
        vk::Result::ERROR_OUT_OF_DATE_KHR => {
            engine_warn!("flock::vulkan", "{}: swapchain out of date", call);
            Error::SwapchainOutOfDate
        }
        vk::Result::TIMEOUT => {
            engine_error!("flock::vulkan", "{}: timed out", call);
            Error::Timeout(call.to_string())
        }
        vk::Result::ERROR_OUT_OF_DEVICE_MEMORY | vk::Result::ERROR_OUT_OF_HOST_MEMORY => {
            engine_error!("flock::vulkan", "{}: {:?}", call, result);
            Error::OutOfMemory
        }
        other => engine_err!("flock::vulkan", "{}: {:?}", call, other),
    }
}

#[cfg(test)]
#[path = "vulkan_context_tests.rs"]
mod tests;

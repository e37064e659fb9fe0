/// Device bring-up: instance, validation messenger, surface, device and allocator
///
/// Picks the first physical device exposing a queue family with both
/// graphics and compute, plus a family that can present to the window's
/// surface.

use ash::vk;
use flock_engine::flock::config::Config;
use flock_engine::flock::{Error, Result};
use flock_engine::{engine_debug, engine_error, engine_info, engine_warn};
use gpu_allocator::vulkan::{Allocator, AllocatorCreateDesc};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use std::ffi::{CStr, CString};
use std::sync::Arc;

use crate::vulkan_context::GpuContext;
use crate::vulkan_convert::memory_type_table;

/// Everything `create_device` hands over to the renderer
pub(crate) struct DeviceBundle {
    pub context: Arc<GpuContext>,
    pub surface: vk::SurfaceKHR,
    pub surface_loader: ash::khr::surface::Instance,
}

fn init_failed(what: &str, detail: impl std::fmt::Debug) -> Error {
    engine_error!("flock::vulkan", "{}: {:?}", what, detail);
    Error::InitializationFailed(format!("{}: {:?}", what, detail))
}

pub(crate) fn create_device<W: HasDisplayHandle + HasWindowHandle>(window: &W, config: &Config) -> Result<DeviceBundle> {
    unsafe {
        let entry = ash::Entry::load().map_err(|e| init_failed("Failed to load Vulkan library", e))?;

        let validation = validation_requested(config);

        let app_name = CString::new(config.app_name.as_str()).unwrap_or_else(|_| CString::from(c"Flock"));
        let app_info = vk::ApplicationInfo::default()
            .application_name(&app_name)
            .application_version(vk::make_api_version(0, 1, 0, 0))
            .engine_name(c"Flock")
            .engine_version(vk::make_api_version(0, 0, 1, 0))
            .api_version(vk::API_VERSION_1_2);

        let display_handle = window
            .display_handle()
            .map_err(|e| init_failed("Failed to get display handle", e))?;
        let mut extension_names = ash_window::enumerate_required_extensions(display_handle.as_raw())
            .map_err(|e| init_failed("Failed to get required extensions", e))?
            .to_vec();
        if validation {
            extension_names.push(ash::ext::debug_utils::NAME.as_ptr());
        }

        let layer_names = if validation {
            vec![c"VK_LAYER_KHRONOS_validation".as_ptr()]
        } else {
            vec![]
        };

        let create_info = vk::InstanceCreateInfo::default()
            .application_info(&app_info)
            .enabled_layer_names(&layer_names)
            .enabled_extension_names(&extension_names);

        let instance = entry
            .create_instance(&create_info, None)
            .map_err(|e| init_failed("Failed to create instance", e))?;

        let debug_utils = if validation {
            match create_debug_messenger(&entry, &instance, config) {
                Ok(messenger) => Some(messenger),
                Err(e) => {
                    instance.destroy_instance(None);
                    return Err(e);
                }
            }
        } else {
            None
        };

        // Past this point a failure leaks the instance; initialization errors are fatal
        let window_handle = window
            .window_handle()
            .map_err(|e| init_failed("Failed to get window handle", e))?;
        let surface = ash_window::create_surface(
            &entry,
            &instance,
            display_handle.as_raw(),
            window_handle.as_raw(),
            None,
        )
        .map_err(|e| init_failed("Failed to create surface", e))?;
        let surface_loader = ash::khr::surface::Instance::new(&entry, &instance);

        let (physical_device, queue_family, present_queue_family) =
            pick_physical_device(&instance, &surface_loader, surface)?;

        let properties = instance.get_physical_device_properties(physical_device);
        let device_name = CStr::from_ptr(properties.device_name.as_ptr()).to_string_lossy();
        engine_info!("flock::vulkan", "Using GPU: {} (API {}.{}.{})",
            device_name,
            vk::api_version_major(properties.api_version),
            vk::api_version_minor(properties.api_version),
            vk::api_version_patch(properties.api_version));

        let queue_priorities = [1.0];
        let mut queue_create_infos = vec![vk::DeviceQueueCreateInfo::default()
            .queue_family_index(queue_family)
            .queue_priorities(&queue_priorities)];
        if present_queue_family != queue_family {
            queue_create_infos.push(
                vk::DeviceQueueCreateInfo::default()
                    .queue_family_index(present_queue_family)
                    .queue_priorities(&queue_priorities),
            );
        }

        let supported = instance.get_physical_device_features(physical_device);
        let device_features = vk::PhysicalDeviceFeatures::default()
            .sampler_anisotropy(supported.sampler_anisotropy == vk::TRUE)
            // Material textures are picked by a push-constant index
            .shader_sampled_image_array_dynamic_indexing(
                supported.shader_sampled_image_array_dynamic_indexing == vk::TRUE,
            );
        let device_extension_names = [ash::khr::swapchain::NAME.as_ptr()];

        let device_create_info = vk::DeviceCreateInfo::default()
            .queue_create_infos(&queue_create_infos)
            .enabled_extension_names(&device_extension_names)
            .enabled_features(&device_features);

        let device = instance
            .create_device(physical_device, &device_create_info, None)
            .map_err(|e| init_failed("Failed to create logical device", e))?;

        let queue = device.get_device_queue(queue_family, 0);
        let present_queue = device.get_device_queue(present_queue_family, 0);

        let memory_properties = instance.get_physical_device_memory_properties(physical_device);
        let memory_types = memory_type_table(&memory_properties);
        for line in memory_types.describe() {
            engine_debug!("flock::vulkan", "{}", line);
        }
        let non_coherent_atom_size = properties.limits.non_coherent_atom_size.max(1);

        let allocator = Allocator::new(&AllocatorCreateDesc {
            instance: instance.clone(),
            device: device.clone(),
            physical_device,
            debug_settings: Default::default(),
            buffer_device_address: false,
            allocation_sizes: Default::default(),
        })
        .map_err(|e| init_failed("Failed to create GPU allocator", e))?;

        let upload_pool_create_info = vk::CommandPoolCreateInfo::default()
            .queue_family_index(queue_family)
            .flags(vk::CommandPoolCreateFlags::TRANSIENT | vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER);
        let upload_command_pool = device
            .create_command_pool(&upload_pool_create_info, None)
            .map_err(|e| init_failed("Failed to create upload command pool", e))?;

        let context = Arc::new(GpuContext::new(
            entry,
            instance,
            physical_device,
            device,
            (queue, queue_family, present_queue, present_queue_family),
            memory_types,
            non_coherent_atom_size,
            allocator,
            upload_command_pool,
            debug_utils,
        ));

        Ok(DeviceBundle { context, surface, surface_loader })
    }
}

fn validation_requested(config: &Config) -> bool {
    if !config.enable_validation {
        return false;
    }
    if cfg!(feature = "vulkan-validation") {
        true
    } else {
        engine_warn!("flock::vulkan",
            "Validation requested but the `vulkan-validation` feature is not compiled in");
        false
    }
}

#[cfg(feature = "vulkan-validation")]
fn create_debug_messenger(
    entry: &ash::Entry,
    instance: &ash::Instance,
    config: &Config,
) -> Result<(ash::ext::debug_utils::Instance, vk::DebugUtilsMessengerEXT)> {
    use crate::vulkan_debug::{init_debug_config, severity_flags, vulkan_debug_callback, DebugSettings};

    let debug_utils = ash::ext::debug_utils::Instance::new(entry, instance);

    init_debug_config(DebugSettings {
        severity: config.debug_severity,
        output: config.debug_output.clone(),
        message_filter: config.debug_message_filter,
        break_on_error: config.break_on_validation_error,
        panic_on_error: config.panic_on_error,
        enable_stats: config.enable_validation_stats,
    });

    let debug_info = vk::DebugUtilsMessengerCreateInfoEXT::default()
        .message_severity(severity_flags(config.debug_severity))
        .message_type(
            vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
        )
        .pfn_user_callback(Some(vulkan_debug_callback));

    let messenger = unsafe { debug_utils.create_debug_utils_messenger(&debug_info, None) }
        .map_err(|e| init_failed("Failed to create debug messenger", e))?;

    Ok((debug_utils, messenger))
}

#[cfg(not(feature = "vulkan-validation"))]
fn create_debug_messenger(
    _entry: &ash::Entry,
    _instance: &ash::Instance,
    _config: &Config,
) -> Result<(ash::ext::debug_utils::Instance, vk::DebugUtilsMessengerEXT)> {
    Err(Error::InitializationFailed("Validation support not compiled in".to_string()))
}

/// First device with a graphics+compute family and a family that can present
unsafe fn pick_physical_device(
    instance: &ash::Instance,
    surface_loader: &ash::khr::surface::Instance,
    surface: vk::SurfaceKHR,
) -> Result<(vk::PhysicalDevice, u32, u32)> {
    let physical_devices = instance
        .enumerate_physical_devices()
        .map_err(|e| init_failed("Failed to enumerate physical devices", e))?;

    for physical_device in physical_devices {
        let queue_families = instance.get_physical_device_queue_family_properties(physical_device);

        let Some(queue_family) = queue_families
            .iter()
            .position(|qf| qf.queue_flags.contains(vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE))
            .map(|i| i as u32)
        else {
            continue;
        };

        let can_present = |family: u32| {
            surface_loader
                .get_physical_device_surface_support(physical_device, family, surface)
                .unwrap_or(false)
        };
        let present_family = if can_present(queue_family) {
            Some(queue_family)
        } else {
            (0..queue_families.len() as u32).find(|&i| can_present(i))
        };

        if let Some(present_family) = present_family {
            return Ok((physical_device, queue_family, present_family));
        }
    }

    engine_error!("flock::vulkan", "No GPU with a graphics+compute queue that can present");
    Err(Error::InitializationFailed("No suitable Vulkan device found".to_string()))
}

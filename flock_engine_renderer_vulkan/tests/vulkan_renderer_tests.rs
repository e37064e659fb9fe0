//! GPU tests for VulkanRenderer and the transfer engine
//!
//! All tests require a GPU and are marked with #[ignore]. They share one
//! renderer (see gpu_test_utils) and run serially.
//!
//! Run with: cargo test --test vulkan_renderer_tests -- --ignored


use flock_engine::flock::frame::FrameSlot;
use flock_engine::flock::memory::MemoryProperties;
use flock_engine::flock::render::BufferUsage;
use flock_engine::flock::transfer::mip_level_count;
use flock_engine::flock::Error;
use flock_engine_renderer_vulkan::flock::{StagingBuffer, VulkanBuffer};
use gpu_test_utils::{get_test_context, CHECKER_SIZE, TEST_INSTANCE_COUNT};
use serial_test::serial;
use std::sync::Arc;

use ash::vk;

const MIB: u64 = 1024 * 1024;

fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i.wrapping_mul(31) ^ (i >> 8)) as u8).collect()
}

fn device_storage_buffer(renderer: &flock_engine_renderer_vulkan::flock::VulkanRenderer, size: u64) -> VulkanBuffer {
    VulkanBuffer::new(
        Arc::clone(renderer.context()),
        size,
        vk::BufferUsageFlags::STORAGE_BUFFER
            | vk::BufferUsageFlags::TRANSFER_DST
            | vk::BufferUsageFlags::TRANSFER_SRC,
        MemoryProperties::DEVICE_LOCAL,
    )
    .unwrap()
}

// ============================================================================
// TRANSFER TESTS
// ============================================================================

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_staging_round_trip_one_mebibyte() {
    let ctx = get_test_context();
    let guard = ctx.lock().unwrap();

    let buffer = device_storage_buffer(&guard.renderer, MIB);
    let mut staging = StagingBuffer::with_capacity(Arc::clone(guard.renderer.context()), MIB).unwrap();
    let data = pattern(MIB as usize);

    staging.transfer_buffer(&buffer, 0, &data, BufferUsage::Storage).unwrap();
    let read_back = staging.download_buffer(&buffer, BufferUsage::Storage, MIB).unwrap();

    assert_eq!(read_back.len(), data.len());
    assert!(read_back == data, "device-local buffer content differs from the upload");
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_staging_upload_at_offset() {
    let ctx = get_test_context();
    let guard = ctx.lock().unwrap();

    let buffer = device_storage_buffer(&guard.renderer, 4096);
    let mut staging = StagingBuffer::with_capacity(Arc::clone(guard.renderer.context()), 4096).unwrap();

    staging.transfer_buffer(&buffer, 0, &[0u8; 4096], BufferUsage::Storage).unwrap();
    staging.transfer_buffer(&buffer, 1024, &[0xAB; 256], BufferUsage::Storage).unwrap();
    let read_back = staging.download_buffer(&buffer, BufferUsage::Storage, 4096).unwrap();

    assert!(read_back[..1024].iter().all(|&b| b == 0));
    assert!(read_back[1024..1280].iter().all(|&b| b == 0xAB));
    assert!(read_back[1280..].iter().all(|&b| b == 0));
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_staging_rejects_oversized_upload() {
    let ctx = get_test_context();
    let guard = ctx.lock().unwrap();

    let buffer = device_storage_buffer(&guard.renderer, 4096);
    let mut staging = StagingBuffer::with_capacity(Arc::clone(guard.renderer.context()), 1024).unwrap();

    let result = staging.transfer_buffer(&buffer, 0, &[1u8; 2048], BufferUsage::Storage);
    assert!(matches!(result, Err(Error::InvalidResource(_))));
}

// ============================================================================
// RESOURCE TESTS
// ============================================================================

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_dual_buffer_shares_one_allocation() {
    let ctx = get_test_context();
    let guard = ctx.lock().unwrap();
    let geometry = guard.renderer.geometry();

    assert_eq!(geometry.vertex.memory_offset(), 0);
    assert_eq!(geometry.index.memory_offset(), geometry.layout.secondary_offset);
    assert!(geometry.layout.secondary_offset >= geometry.layout.primary.size);
    assert_eq!(geometry.layout.secondary_offset % geometry.layout.secondary.alignment.max(1), 0);
    assert!(geometry.layout.allocation_size >= geometry.layout.secondary_offset + geometry.layout.secondary.size);
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_mipmapped_texture_gets_full_chain() {
    let ctx = get_test_context();
    let guard = ctx.lock().unwrap();
    let textures = guard.renderer.textures();

    // Default white texture first, then the checker
    assert_eq!(textures.len(), 2);
    assert_eq!(textures[0].mip_levels(), 1);

    let checker = &textures[1];
    assert_eq!(checker.extent().width, CHECKER_SIZE);
    assert_eq!(mip_level_count(CHECKER_SIZE, CHECKER_SIZE), 10);
    // Formats without linear blit support fall back to a single level
    assert!(
        checker.mip_levels() == 10 || checker.mip_levels() == 1,
        "unexpected mip count {}",
        checker.mip_levels()
    );
}

// ============================================================================
// FRAME TESTS
// ============================================================================

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_render_five_frames() {
    let ctx = get_test_context();
    let mut guard = ctx.lock().unwrap();
    let gpu = &mut *guard;

    let start = gpu.renderer.frame_number();
    // A swapchain rebuild skips a frame without counting it
    for _ in 0..20 {
        gpu.renderer.render_frame(&mut gpu.scene).unwrap();
        if gpu.renderer.frame_number() >= start + 5 {
            break;
        }
    }
    assert!(gpu.renderer.frame_number() >= start + 5);
    gpu.renderer.wait_idle().unwrap();
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_simulation_moves_instances() {
    let ctx = get_test_context();
    let mut guard = ctx.lock().unwrap();
    let gpu = &mut *guard;

    let seed: Vec<u8> = bytemuck::cast_slice(&gpu.scene.instances).to_vec();
    for _ in 0..6 {
        gpu.renderer.render_frame(&mut gpu.scene).unwrap();
    }

    let slot = FrameSlot::new(0).unwrap();
    let instances = gpu.renderer.read_instances(slot).unwrap();
    assert_eq!(instances.len() as u64, gpu.scene.instance_bytes());
    assert_eq!(gpu.scene.instance_count(), TEST_INSTANCE_COUNT);
    assert_ne!(instances, seed, "boids did not move");
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_zero_extent_pauses_rendering() {
    let ctx = get_test_context();
    let mut guard = ctx.lock().unwrap();
    let gpu = &mut *guard;

    gpu.renderer.resize(0, 0);
    let before = gpu.renderer.frame_number();
    for _ in 0..3 {
        gpu.renderer.render_frame(&mut gpu.scene).unwrap();
    }
    assert_eq!(gpu.renderer.frame_number(), before);

    // Restore for the other tests
    let extent = gpu.window_extent;
    gpu.renderer.resize(extent.width, extent.height);
    for _ in 0..4 {
        gpu.renderer.render_frame(&mut gpu.scene).unwrap();
    }
    assert!(gpu.renderer.frame_number() > before);
}

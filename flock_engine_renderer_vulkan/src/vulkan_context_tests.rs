//! Unit tests for Vulkan result classification
//!
//! No GPU required.

use super::*;

// ============================================================================
// map_vk_error
// ============================================================================

#[test]
fn test_out_of_date_maps_to_recoverable_variant() {
    let err = map_vk_error("vkCreateSwapchainKHR", vk::Result::ERROR_OUT_OF_DATE_KHR);
    assert_eq!(err, Error::SwapchainOutOfDate);
    assert!(err.is_recoverable());
}

#[test]
fn test_device_lost_keeps_call_name() {
    let err = map_vk_error("vkQueueSubmit", vk::Result::ERROR_DEVICE_LOST);
    assert_eq!(err, Error::DeviceLost("vkQueueSubmit".to_string()));
    assert!(!err.is_recoverable());
}

#[test]
fn test_timeout_is_recoverable() {
    let err = map_vk_error("vkWaitForFences", vk::Result::TIMEOUT);
    assert!(matches!(err, Error::Timeout(ref call) if call == "vkWaitForFences"));
    assert!(err.is_recoverable());
}

#[test]
fn test_memory_exhaustion_maps_to_out_of_memory() {
    assert_eq!(map_vk_error("vkAllocateMemory", vk::Result::ERROR_OUT_OF_DEVICE_MEMORY), Error::OutOfMemory);
    assert_eq!(map_vk_error("vkAllocateMemory", vk::Result::ERROR_OUT_OF_HOST_MEMORY), Error::OutOfMemory);
}

#[test]
fn test_other_results_are_backend_errors() {
    let err = map_vk_error("vkCreateImage", vk::Result::ERROR_FORMAT_NOT_SUPPORTED);
    assert!(!err.is_recoverable());
    assert!(!matches!(err, Error::SwapchainOutOfDate | Error::DeviceLost(_) | Error::OutOfMemory));
}

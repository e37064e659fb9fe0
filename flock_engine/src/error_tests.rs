//! Unit tests for error.rs
//!
//! Covers Display output, the std::error::Error impl and recoverability.

use crate::error::{Error, Result};

// ============================================================================
// ERROR DISPLAY TESTS
// ============================================================================

#[test]
fn test_backend_error_display() {
    let err = Error::BackendError("vkQueueSubmit failed".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Backend error"));
    assert!(display.contains("vkQueueSubmit failed"));
}

#[test]
fn test_out_of_memory_display() {
    assert_eq!(format!("{}", Error::OutOfMemory), "Out of GPU memory");
}

#[test]
fn test_invalid_resource_display() {
    let err = Error::InvalidResource("staging overflow".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Invalid resource"));
    assert!(display.contains("staging overflow"));
}

#[test]
fn test_swapchain_out_of_date_display() {
    assert_eq!(format!("{}", Error::SwapchainOutOfDate), "Swapchain out of date");
}

#[test]
fn test_device_lost_display() {
    let err = Error::DeviceLost("during present".to_string());
    assert_eq!(format!("{}", err), "Device lost: during present");
}

#[test]
fn test_timeout_display() {
    let err = Error::Timeout("slot 1 fence".to_string());
    assert!(format!("{}", err).starts_with("Timeout"));
}

// ============================================================================
// RECOVERABILITY
// ============================================================================

#[test]
fn test_out_of_date_is_recoverable() {
    assert!(Error::SwapchainOutOfDate.is_recoverable());
    assert!(Error::Timeout("fence".to_string()).is_recoverable());
}

#[test]
fn test_device_lost_is_fatal() {
    assert!(!Error::DeviceLost("submit".to_string()).is_recoverable());
    assert!(!Error::BackendError("x".to_string()).is_recoverable());
    assert!(!Error::OutOfMemory.is_recoverable());
    assert!(!Error::InitializationFailed("x".to_string()).is_recoverable());
    assert!(!Error::InvalidResource("x".to_string()).is_recoverable());
}

// ============================================================================
// ERROR TRAIT IMPLEMENTATIONS
// ============================================================================

#[test]
fn test_error_is_std_error() {
    let err = Error::OutOfMemory;
    let _: &dyn std::error::Error = &err;
}

#[test]
fn test_error_clone_eq() {
    let err = Error::DeviceLost("queue".to_string());
    assert_eq!(err.clone(), err);
}

#[test]
fn test_result_propagation() {
    fn fails() -> Result<u32> {
        Err(Error::SwapchainOutOfDate)
    }
    fn caller() -> Result<u32> {
        let v = fails()?;
        Ok(v + 1)
    }
    assert_eq!(caller(), Err(Error::SwapchainOutOfDate));
}

//! Error types for the Flock engine
//!
//! One error enum covers setup, resource creation, per-frame presentation
//! and device loss. `is_recoverable` separates the conditions the frame loop
//! can heal (swapchain rebuild, retry after timeout) from fatal ones.

use std::fmt;

/// Result type for Flock engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Flock engine errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Backend-specific error (Vulkan API call failed)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (buffer, image, shader, memory type, staging overflow)
    InvalidResource(String),

    /// Initialization failed (instance, device, surface, swapchain)
    InitializationFailed(String),

    /// Swapchain no longer matches the surface and must be rebuilt
    SwapchainOutOfDate,

    /// The logical device was lost
    DeviceLost(String),

    /// A bounded wait expired before the GPU signaled
    Timeout(String),
}

impl Error {
    /// Whether the frame loop can continue after this error.
    ///
    /// Out-of-date swapchains are rebuilt, timeouts may be retried. Everything
    /// else aborts the loop.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::SwapchainOutOfDate | Error::Timeout(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::SwapchainOutOfDate => write!(f, "Swapchain out of date"),
            Error::DeviceLost(msg) => write!(f, "Device lost: {}", msg),
            Error::Timeout(msg) => write!(f, "Timeout: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

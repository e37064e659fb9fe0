/*!
# Flock Engine

Core types for the Flock boids renderer.

This crate holds everything that can be reasoned about and tested without a
GPU: the frame-slot model and frame state machine, memory-type selection and
buffer placement, the staging transfer sequences, descriptor tiers, pipeline
presets and the scene data model. The Vulkan backend
(`flock_engine_renderer_vulkan`) implements the [`flock::frame::FrameSync`] and
[`flock::render::CommandRecorder`] traits on top of `ash`.

## Architecture

- **frame**: `FrameSlot`, `PerSlot`, `FrameManager` (wait -> acquire -> record -> submit -> present)
- **memory**: `MemoryTypeTable`, `DualBufferLayout`, `FlushRange`
- **transfer**: staging upload/download sequences and mip-chain blits
- **descriptor**: the three graphics set tiers plus the compute set
- **compute**: boids dispatch sizing and `SimParams`
- **pipeline**: opaque and environment pipeline presets
- **scene**: mesh, instances, camera, material, texture handle table
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod config;
pub mod renderer;
pub mod memory;
pub mod transfer;
pub mod frame;
pub mod descriptor;
pub mod compute;
pub mod pipeline;
pub mod scene;

// Main flock namespace module
pub mod flock {
    // Error types
    pub use crate::error::{Error, Result};

    // Logging hub
    pub use crate::engine::Engine;

    // Logging sub-module (types only, macros live at the crate root)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    pub mod config {
        pub use crate::config::*;
    }

    // Command recording vocabulary
    pub mod render {
        pub use crate::renderer::*;
    }

    pub mod frame {
        pub use crate::frame::*;
    }

    pub mod memory {
        pub use crate::memory::*;
    }

    pub mod transfer {
        pub use crate::transfer::*;
    }

    pub mod descriptor {
        pub use crate::descriptor::*;
    }

    pub mod compute {
        pub use crate::compute::*;
    }

    pub mod pipeline {
        pub use crate::pipeline::*;
    }

    pub mod scene {
        pub use crate::scene::*;
    }
}

// Re-export math and byte-casting libraries at crate root
pub use glam;
pub use bytemuck;

/// Build-time tunables and runtime renderer configuration

use std::path::PathBuf;

// ===== BUILD-TIME TUNABLES =====

/// Frames whose GPU work may be in flight at once
pub const PENDING_FRAMES: usize = 2;

/// Minimum swapchain image count requested from the surface
pub const SWAPCHAIN_IMAGES: u32 = 2;

/// Number of simulated and drawn instances
pub const INSTANCE_COUNT: u32 = 200;

/// `local_size_x` of `shaders/boids.comp`
pub const LOCAL_GROUP_SIZE: u32 = 256;

/// Staging buffer capacity: one 4096x4096 RGBA32F image
pub const STAGING_CAPACITY: u64 = 4096 * 4096 * 4 * 4;

/// Length of the shared sampler array; unused entries repeat texture 0
pub const MAX_TEXTURES: u32 = 16;

/// Spacing between initial instance positions along X
pub const INSTANCE_SPACING: f32 = 2.5;

// ===== VALIDATION CONFIG =====

/// Which validation messages reach the log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugSeverity {
    ErrorsOnly,
    ErrorsAndWarnings,
    All,
}

/// Where validation messages go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebugOutput {
    /// Through the engine logger
    Console,
    /// Appended to a file
    File(String),
    /// Both
    Both(String),
}

/// Message category filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebugMessageFilter {
    pub show_general: bool,
    pub show_validation: bool,
    pub show_performance: bool,
}

impl Default for DebugMessageFilter {
    fn default() -> Self {
        Self {
            show_general: false,
            show_validation: true,
            show_performance: true,
        }
    }
}

/// Counters collected by the validation callback
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationStats {
    pub errors: u32,
    pub warnings: u32,
    pub info: u32,
    pub verbose: u32,
}

impl ValidationStats {
    pub fn total(&self) -> u32 {
        self.errors + self.warnings + self.info + self.verbose
    }
}

// ===== PRESENTATION =====

/// Present mode preference, tried in order with FIFO as the guaranteed fallback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentMode {
    FifoRelaxed,
    Fifo,
    Mailbox,
    Immediate,
}

// ===== RENDERER CONFIG =====

/// Renderer configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Application name reported to the driver
    pub app_name: String,
    /// Enable VK_LAYER_KHRONOS_validation (needs the `vulkan-validation` feature)
    pub enable_validation: bool,
    pub debug_severity: DebugSeverity,
    pub debug_output: DebugOutput,
    pub debug_message_filter: DebugMessageFilter,
    /// Abort the process on the first validation error
    pub break_on_validation_error: bool,
    /// Panic on the first validation error
    pub panic_on_error: bool,
    pub enable_validation_stats: bool,
    /// Present modes in order of preference
    pub present_modes: Vec<PresentMode>,
    /// Prefer an sRGB surface format
    pub prefer_srgb: bool,
    /// Fence wait timeout in nanoseconds (`u64::MAX` waits forever)
    pub fence_timeout_ns: u64,
    pub clear_color: [f32; 4],
    pub clear_depth: f32,
    /// Directory holding compiled `.spv` shaders
    pub shader_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "Flock".to_string(),
            enable_validation: cfg!(debug_assertions),
            debug_severity: DebugSeverity::ErrorsAndWarnings,
            debug_output: DebugOutput::Console,
            debug_message_filter: DebugMessageFilter::default(),
            break_on_validation_error: false,
            panic_on_error: false,
            enable_validation_stats: true,
            present_modes: vec![PresentMode::FifoRelaxed, PresentMode::Fifo],
            prefer_srgb: true,
            fence_timeout_ns: u64::MAX,
            clear_color: [1.0, 1.0, 0.0, 1.0],
            clear_depth: 1.0,
            shader_dir: PathBuf::from("shaders"),
        }
    }
}

impl Config {
    /// Path of a compiled shader inside `shader_dir`
    pub fn shader_path(&self, name: &str) -> PathBuf {
        self.shader_dir.join(name)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

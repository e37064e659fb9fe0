/// Memory-type selection, dual-buffer placement and flush ranges

pub mod memory_type;
pub mod layout;

pub use memory_type::{MemoryProperties, MemoryTypeTable};
pub use layout::{align_up, align_down, BufferRequirements, DualBufferLayout, FlushRange};

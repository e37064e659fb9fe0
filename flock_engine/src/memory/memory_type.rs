/// Memory-type classification and selection
///
/// The device reports up to 32 memory types, each with a set of property
/// flags. Resource creation asks for the first type allowed by the
/// resource's `memoryTypeBits` that carries every required property.

use bitflags::bitflags;

use crate::error::{Error, Result};
use crate::{engine_error, engine_warn};

bitflags! {
    /// Memory property flags (same bit values as `VkMemoryPropertyFlagBits`)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MemoryProperties: u32 {
        const DEVICE_LOCAL     = 0x01;
        const HOST_VISIBLE     = 0x02;
        const HOST_COHERENT    = 0x04;
        const HOST_CACHED      = 0x08;
        const LAZILY_ALLOCATED = 0x10;
    }
}

/// The device's memory-type property table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryTypeTable {
    types: Vec<MemoryProperties>,
}

impl MemoryTypeTable {
    /// Build from the per-type property flags, in device order
    pub fn new(types: Vec<MemoryProperties>) -> Self {
        debug_assert!(types.len() <= 32, "Vulkan exposes at most 32 memory types");
        Self { types }
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn properties(&self, index: u32) -> Option<MemoryProperties> {
        self.types.get(index as usize).copied()
    }

    /// Lowest index allowed by `type_bits` whose flags contain `required`
    ///
    /// `None` is the only failure value. Index 0 is a valid answer.
    pub fn find_memory_type(&self, type_bits: u32, required: MemoryProperties) -> Option<u32> {
        self.types
            .iter()
            .enumerate()
            .take(32)
            .find(|(i, flags)| type_bits & (1u32 << i) != 0 && flags.contains(required))
            .map(|(i, _)| i as u32)
    }

    /// `find_memory_type`, degrading once by dropping LAZILY_ALLOCATED
    ///
    /// A miss is logged as an error. If the degraded request also misses,
    /// resource creation cannot proceed.
    pub fn find_memory_type_or_degrade(&self, type_bits: u32, required: MemoryProperties) -> Result<u32> {
        if let Some(index) = self.find_memory_type(type_bits, required) {
            return Ok(index);
        }

        engine_error!("flock::memory",
            "No memory type for bits {:#x} with {:?}", type_bits, required);

        let degraded = required - MemoryProperties::LAZILY_ALLOCATED;
        if degraded != required {
            if let Some(index) = self.find_memory_type(type_bits, degraded) {
                engine_warn!("flock::memory",
                    "Falling back to memory type {} without LAZILY_ALLOCATED", index);
                return Ok(index);
            }
        }

        Err(Error::InvalidResource(format!(
            "no memory type matches bits {:#x} with {:?}", type_bits, required
        )))
    }

    /// One line per type, for the device info log
    pub fn describe(&self) -> Vec<String> {
        self.types
            .iter()
            .enumerate()
            .map(|(i, flags)| format!("memory type {}: {:?}", i, flags))
            .collect()
    }
}

#[cfg(test)]
#[path = "memory_type_tests.rs"]
mod tests;

/// Buffer placement arithmetic
///
/// Sub-allocation offsets for the vertex+index dual buffer and the byte
/// ranges used to flush or invalidate non-coherent mapped memory.

/// Round `value` up to a multiple of `alignment` (a power of two, or 0/1 for none)
pub fn align_up(value: u64, alignment: u64) -> u64 {
    if alignment <= 1 {
        return value;
    }
    debug_assert!(alignment.is_power_of_two(), "alignment {} is not a power of two", alignment);
    (value + alignment - 1) & !(alignment - 1)
}

/// Round `value` down to a multiple of `alignment`
pub fn align_down(value: u64, alignment: u64) -> u64 {
    if alignment <= 1 {
        return value;
    }
    value & !(alignment - 1)
}

/// Size and alignment a buffer reports before being bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferRequirements {
    pub size: u64,
    pub alignment: u64,
}

impl BufferRequirements {
    pub const fn new(size: u64, alignment: u64) -> Self {
        Self { size, alignment }
    }
}

/// Two buffers sharing one device allocation
///
/// The primary (vertex data) sits at offset 0. The secondary (index data)
/// starts at the first offset past the primary that satisfies both
/// alignments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DualBufferLayout {
    pub primary: BufferRequirements,
    pub secondary: BufferRequirements,
    pub secondary_offset: u64,
    pub allocation_size: u64,
}

/// Allocation size is rounded to this granularity, with one extra block of slack
const DUAL_BUFFER_GRANULARITY: u64 = 0x80;

impl DualBufferLayout {
    pub fn compute(primary: BufferRequirements, secondary: BufferRequirements) -> Self {
        let alignment = primary.alignment.max(secondary.alignment).max(1);
        let secondary_offset = align_up(primary.size, alignment);
        let end = secondary_offset + align_up(secondary.size, alignment);
        let allocation_size = (end + DUAL_BUFFER_GRANULARITY) & !(DUAL_BUFFER_GRANULARITY - 1);

        Self {
            primary,
            secondary,
            secondary_offset,
            allocation_size,
        }
    }

    /// Byte range `[start, end)` of the secondary buffer
    pub fn secondary_range(&self) -> (u64, u64) {
        (self.secondary_offset, self.secondary_offset + self.secondary.size)
    }
}

/// A flush or invalidate range for non-coherent memory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushRange {
    pub offset: u64,
    pub size: u64,
}

impl FlushRange {
    /// Smallest atom-aligned range covering `[offset, offset + size)`
    ///
    /// The end is clamped to `allocation_size`; a clamped range does not need
    /// to end on an atom boundary.
    pub fn exact(offset: u64, size: u64, non_coherent_atom_size: u64, allocation_size: u64) -> Self {
        let start = align_down(offset, non_coherent_atom_size);
        let end = align_up(offset + size, non_coherent_atom_size).min(allocation_size);
        Self {
            offset: start,
            size: end.saturating_sub(start),
        }
    }

    pub fn end(&self) -> u64 {
        self.offset + self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

#[cfg(test)]
#[path = "layout_tests.rs"]
mod tests;

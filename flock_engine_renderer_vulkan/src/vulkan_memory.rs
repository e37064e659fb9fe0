/// Buffers bound to raw device memory
///
/// Buffers get their own `vkAllocateMemory` allocation, picked through the
/// core memory-type table. Host-visible buffers stay mapped for their whole
/// lifetime; writes to non-coherent memory are flushed over the exact
/// atom-aligned range they touched.
///
/// A dual buffer places two buffers (vertex data at offset 0, index data
/// after it) in one allocation. Only the offset-0 buffer frees the memory.

use ash::vk;
use flock_engine::flock::memory::{BufferRequirements, DualBufferLayout, FlushRange, MemoryProperties};
use flock_engine::flock::Result;
use flock_engine::{engine_bail_warn, engine_debug};
use std::sync::Arc;

use crate::vulkan_context::{map_vk_error, GpuContext};

/// A buffer with its (possibly shared) device memory
pub struct VulkanBuffer {
    ctx: Arc<GpuContext>,
    buffer: vk::Buffer,
    memory: vk::DeviceMemory,
    /// Where this buffer starts inside `memory`
    memory_offset: u64,
    /// Size of the whole allocation `memory`
    allocation_size: u64,
    size: u64,
    /// Persistent mapping of this buffer's first byte
    mapped: Option<*mut u8>,
    coherent: bool,
    owns_memory: bool,
}

// The mapped pointer is only dereferenced through `&mut self` (writes) or
// `&self` reads of host memory the GPU is not writing.
unsafe impl Send for VulkanBuffer {}
unsafe impl Sync for VulkanBuffer {}

impl VulkanBuffer {
    /// Create a buffer in its own allocation
    ///
    /// `properties` picks the memory type (lowest qualifying index).
    /// Host-visible memory is mapped immediately.
    pub fn new(
        ctx: Arc<GpuContext>,
        size: u64,
        usage: vk::BufferUsageFlags,
        properties: MemoryProperties,
    ) -> Result<Self> {
        unsafe {
            let buffer = create_raw_buffer(&ctx, size, usage)?;
            let requirements = ctx.device.get_buffer_memory_requirements(buffer);

            let (memory, coherent) =
                match allocate(&ctx, requirements.size, requirements.memory_type_bits, properties) {
                    Ok(allocated) => allocated,
                    Err(e) => {
                        ctx.device.destroy_buffer(buffer, None);
                        return Err(e);
                    }
                };

            if let Err(e) = ctx.device.bind_buffer_memory(buffer, memory, 0) {
                ctx.device.destroy_buffer(buffer, None);
                ctx.device.free_memory(memory, None);
                return Err(map_vk_error("vkBindBufferMemory", e));
            }

            let mut this = Self {
                ctx,
                buffer,
                memory,
                memory_offset: 0,
                allocation_size: requirements.size,
                size,
                mapped: None,
                coherent,
                owns_memory: true,
            };
            if properties.contains(MemoryProperties::HOST_VISIBLE) {
                this.mapped = Some(this.map_allocation()?);
            }
            Ok(this)
        }
    }

    pub fn handle(&self) -> vk::Buffer {
        self.buffer
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Offset inside the backing allocation
    pub fn memory_offset(&self) -> u64 {
        self.memory_offset
    }

    pub fn is_mapped(&self) -> bool {
        self.mapped.is_some()
    }

    /// Copy `data` into the mapping at `offset` and flush if needed
    pub fn write(&mut self, offset: u64, data: &[u8]) -> Result<()> {
        let ptr = self.mapped_range(offset, data.len() as u64)?;
        unsafe {
            std::ptr::copy_nonoverlapping(data.as_ptr(), ptr, data.len());
        }
        self.flush(offset, data.len() as u64)
    }

    /// Copy `len` bytes out of the mapping, invalidating first if needed
    pub fn read(&self, offset: u64, len: u64) -> Result<Vec<u8>> {
        let ptr = self.mapped_range(offset, len)?;
        if !self.coherent {
            let range = self.flush_range(offset, len);
            if !range.is_empty() {
                let ranges = [self.mapped_memory_range(range)];
                unsafe {
                    self.ctx
                        .device
                        .invalidate_mapped_memory_ranges(&ranges)
                        .map_err(|e| map_vk_error("vkInvalidateMappedMemoryRanges", e))?;
                }
            }
        }
        let mut out = vec![0u8; len as usize];
        unsafe {
            std::ptr::copy_nonoverlapping(ptr as *const u8, out.as_mut_ptr(), out.len());
        }
        Ok(out)
    }

    /// Make host writes to `[offset, offset + len)` visible to the device
    pub fn flush(&self, offset: u64, len: u64) -> Result<()> {
        if self.coherent {
            return Ok(());
        }
        let range = self.flush_range(offset, len);
        if range.is_empty() {
            return Ok(());
        }
        let ranges = [self.mapped_memory_range(range)];
        unsafe {
            self.ctx
                .device
                .flush_mapped_memory_ranges(&ranges)
                .map_err(|e| map_vk_error("vkFlushMappedMemoryRanges", e))
        }
    }

    fn flush_range(&self, offset: u64, len: u64) -> FlushRange {
        FlushRange::exact(
            self.memory_offset + offset,
            len,
            self.ctx.non_coherent_atom_size,
            self.allocation_size,
        )
    }

    fn mapped_memory_range(&self, range: FlushRange) -> vk::MappedMemoryRange<'static> {
        vk::MappedMemoryRange::default()
            .memory(self.memory)
            .offset(range.offset)
            .size(range.size)
    }

    fn mapped_range(&self, offset: u64, len: u64) -> Result<*mut u8> {
        let Some(base) = self.mapped else {
            engine_bail_warn!("flock::vulkan", "Buffer {:?} is not host-visible", self.buffer);
        };
        if offset.checked_add(len).map_or(true, |end| end > self.size) {
            engine_bail_warn!("flock::vulkan",
                "Access of {} bytes at offset {} overruns buffer of {} bytes", len, offset, self.size);
        }
        Ok(unsafe { base.add(offset as usize) })
    }

    /// Map the whole allocation and return the pointer to this buffer's start
    unsafe fn map_allocation(&self) -> Result<*mut u8> {
        let base = self
            .ctx
            .device
            .map_memory(self.memory, 0, vk::WHOLE_SIZE, vk::MemoryMapFlags::empty())
            .map_err(|e| map_vk_error("vkMapMemory", e))?;
        Ok((base as *mut u8).add(self.memory_offset as usize))
    }
}

impl Drop for VulkanBuffer {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_buffer(self.buffer, None);
            if self.owns_memory {
                if self.mapped.is_some() {
                    self.ctx.device.unmap_memory(self.memory);
                }
                self.ctx.device.free_memory(self.memory, None);
            }
        }
    }
}

// ===== DUAL BUFFER =====

/// Vertex and index buffers sharing one allocation
///
/// `index` is declared first so it drops before `vertex`, which frees the
/// memory.
pub struct DualBuffer {
    pub index: VulkanBuffer,
    pub vertex: VulkanBuffer,
    pub layout: DualBufferLayout,
}

/// Create a vertex buffer at offset 0 and an index buffer right after it
pub fn create_dual_buffer(
    ctx: Arc<GpuContext>,
    vertex_size: u64,
    index_size: u64,
    properties: MemoryProperties,
) -> Result<DualBuffer> {
    unsafe {
        let vertex_buffer = create_raw_buffer(
            &ctx,
            vertex_size,
            vk::BufferUsageFlags::VERTEX_BUFFER | vk::BufferUsageFlags::TRANSFER_DST,
        )?;
        let index_buffer = match create_raw_buffer(
            &ctx,
            index_size,
            vk::BufferUsageFlags::INDEX_BUFFER | vk::BufferUsageFlags::TRANSFER_DST,
        ) {
            Ok(buffer) => buffer,
            Err(e) => {
                ctx.device.destroy_buffer(vertex_buffer, None);
                return Err(e);
            }
        };

        let vertex_req = ctx.device.get_buffer_memory_requirements(vertex_buffer);
        let index_req = ctx.device.get_buffer_memory_requirements(index_buffer);
        let layout = DualBufferLayout::compute(
            BufferRequirements::new(vertex_req.size, vertex_req.alignment),
            BufferRequirements::new(index_req.size, index_req.alignment),
        );
        engine_debug!("flock::vulkan",
            "Dual buffer: vertex {} B @0, index {} B @{}, allocation {} B",
            vertex_size, index_size, layout.secondary_offset, layout.allocation_size);

        let destroy_buffers = || {
            ctx.device.destroy_buffer(index_buffer, None);
            ctx.device.destroy_buffer(vertex_buffer, None);
        };

        let type_bits = vertex_req.memory_type_bits & index_req.memory_type_bits;
        let (memory, coherent) = match allocate(&ctx, layout.allocation_size, type_bits, properties) {
            Ok(allocated) => allocated,
            Err(e) => {
                destroy_buffers();
                return Err(e);
            }
        };

        let bound = ctx
            .device
            .bind_buffer_memory(vertex_buffer, memory, 0)
            .and_then(|_| ctx.device.bind_buffer_memory(index_buffer, memory, layout.secondary_offset));
        if let Err(e) = bound {
            destroy_buffers();
            ctx.device.free_memory(memory, None);
            return Err(map_vk_error("vkBindBufferMemory", e));
        }

        let mut vertex = VulkanBuffer {
            ctx: Arc::clone(&ctx),
            buffer: vertex_buffer,
            memory,
            memory_offset: 0,
            allocation_size: layout.allocation_size,
            size: vertex_size,
            mapped: None,
            coherent,
            owns_memory: true,
        };
        let mut index = VulkanBuffer {
            ctx,
            buffer: index_buffer,
            memory,
            memory_offset: layout.secondary_offset,
            allocation_size: layout.allocation_size,
            size: index_size,
            mapped: None,
            coherent,
            owns_memory: false,
        };

        if properties.contains(MemoryProperties::HOST_VISIBLE) {
            let base = vertex.map_allocation()?;
            vertex.mapped = Some(base);
            index.mapped = Some(base.add(layout.secondary_offset as usize));
        }

        Ok(DualBuffer { index, vertex, layout })
    }
}

// ===== RAW ALLOCATION =====

unsafe fn create_raw_buffer(ctx: &GpuContext, size: u64, usage: vk::BufferUsageFlags) -> Result<vk::Buffer> {
    if size == 0 {
        engine_bail_warn!("flock::vulkan", "Cannot create a zero-sized buffer");
    }
    let create_info = vk::BufferCreateInfo::default()
        .size(size)
        .usage(usage)
        .sharing_mode(vk::SharingMode::EXCLUSIVE);
    ctx.device
        .create_buffer(&create_info, None)
        .map_err(|e| map_vk_error("vkCreateBuffer", e))
}

/// Allocate memory of the first qualifying type; also reports whether it is coherent
unsafe fn allocate(
    ctx: &GpuContext,
    size: u64,
    type_bits: u32,
    properties: MemoryProperties,
) -> Result<(vk::DeviceMemory, bool)> {
    let memory_type = ctx.memory_types.find_memory_type_or_degrade(type_bits, properties)?;
    let coherent = ctx
        .memory_types
        .properties(memory_type)
        .is_some_and(|p| p.contains(MemoryProperties::HOST_COHERENT));

    let allocate_info = vk::MemoryAllocateInfo::default()
        .allocation_size(size)
        .memory_type_index(memory_type);
    let memory = ctx
        .device
        .allocate_memory(&allocate_info, None)
        .map_err(|e| map_vk_error("vkAllocateMemory", e))?;
    Ok((memory, coherent))
}

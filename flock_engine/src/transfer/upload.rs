/// Staging transfer sequences
///
/// Every load-time transfer goes through the single staging buffer and is
/// bracketed by barriers so the copy is ordered after earlier writes and
/// before the first consumer. The backend submits the recorded commands and
/// waits for the queue to go idle before the staging buffer is reused.

use crate::config::STAGING_CAPACITY;
use crate::error::Result;
use crate::renderer::command_recorder::CommandRecorder;
use crate::renderer::sync::{
    Access, BufferBarrier, BufferUsage, Extent2D, ImageAspect, ImageBarrier, ImageLayout, PipelineStages,
};
use crate::transfer::mip::MipChain;
use crate::engine_bail_warn;

/// Reject payloads the staging buffer cannot hold
pub fn check_staging_capacity(size: u64) -> Result<()> {
    check_capacity(size, STAGING_CAPACITY)
}

pub(crate) fn check_capacity(size: u64, capacity: u64) -> Result<()> {
    if size > capacity {
        engine_bail_warn!("flock::transfer",
            "Transfer of {} bytes exceeds staging capacity of {} bytes", size, capacity);
    }
    Ok(())
}

/// Record staging -> buffer copy with its two bracketing barriers
pub fn record_buffer_upload<R: CommandRecorder>(
    recorder: &mut R,
    staging: R::Buffer,
    dst: R::Buffer,
    dst_offset: u64,
    size: u64,
    usage: BufferUsage,
) {
    recorder.buffer_barrier(&BufferBarrier {
        buffer: dst,
        src_stage: PipelineStages::TOP_OF_PIPE,
        dst_stage: PipelineStages::TRANSFER,
        src_access: Access::empty(),
        dst_access: Access::TRANSFER_WRITE,
        offset: dst_offset,
        size,
    });

    recorder.copy_buffer(staging, 0, dst, dst_offset, size);

    let (dst_stage, dst_access) = usage.consumer();
    recorder.buffer_barrier(&BufferBarrier {
        buffer: dst,
        src_stage: PipelineStages::TRANSFER,
        dst_stage,
        src_access: Access::TRANSFER_WRITE,
        dst_access,
        offset: dst_offset,
        size,
    });
}

/// Record staging -> image copy of level 0 and the blit chain for the rest
///
/// On return every level of the image is in `ShaderReadOnly`.
pub fn record_image_upload<R: CommandRecorder>(
    recorder: &mut R,
    staging: R::Buffer,
    image: R::Image,
    extent: Extent2D,
    mip_levels: u32,
) {
    let chain = MipChain::with_levels(extent.width, extent.height, mip_levels);
    let levels = chain.level_count();

    let barrier = |level: u32, count: u32, old: ImageLayout, new: ImageLayout| {
        let (src_stage, src_access) = layout_source(old);
        let (dst_stage, dst_access) = layout_destination(new);
        ImageBarrier {
            image,
            aspect: ImageAspect::Color,
            old_layout: old,
            new_layout: new,
            src_stage,
            dst_stage,
            src_access,
            dst_access,
            base_mip_level: level,
            level_count: count,
        }
    };

    recorder.image_barrier(&barrier(0, levels, ImageLayout::Undefined, ImageLayout::TransferDst));
    recorder.copy_buffer_to_image(staging, 0, image, ImageAspect::Color, chain.base());

    for blit in chain.blits() {
        recorder.image_barrier(&barrier(blit.src_level, 1, ImageLayout::TransferDst, ImageLayout::TransferSrc));
        recorder.blit_mip(image, &blit);
        recorder.image_barrier(&barrier(blit.src_level, 1, ImageLayout::TransferSrc, ImageLayout::ShaderReadOnly));
    }

    recorder.image_barrier(&barrier(levels - 1, 1, ImageLayout::TransferDst, ImageLayout::ShaderReadOnly));
}

/// Record buffer -> staging copy for a host readback
pub fn record_buffer_download<R: CommandRecorder>(
    recorder: &mut R,
    src: R::Buffer,
    src_usage: BufferUsage,
    staging: R::Buffer,
    size: u64,
) {
    let (src_stage, src_access) = src_usage.consumer();
    recorder.buffer_barrier(&BufferBarrier {
        buffer: src,
        src_stage,
        dst_stage: PipelineStages::TRANSFER,
        src_access,
        dst_access: Access::TRANSFER_READ,
        offset: 0,
        size,
    });

    recorder.copy_buffer(src, 0, staging, 0, size);

    recorder.buffer_barrier(&BufferBarrier {
        buffer: staging,
        src_stage: PipelineStages::TRANSFER,
        dst_stage: PipelineStages::HOST,
        src_access: Access::TRANSFER_WRITE,
        dst_access: Access::HOST_READ,
        offset: 0,
        size,
    });
}

// ===== LAYOUT TRANSITION MASKS =====

fn layout_source(layout: ImageLayout) -> (PipelineStages, Access) {
    match layout {
        ImageLayout::Undefined => (PipelineStages::TOP_OF_PIPE, Access::empty()),
        ImageLayout::TransferDst => (PipelineStages::TRANSFER, Access::TRANSFER_WRITE),
        ImageLayout::TransferSrc => (PipelineStages::TRANSFER, Access::TRANSFER_READ),
        ImageLayout::ShaderReadOnly => (PipelineStages::FRAGMENT_SHADER, Access::SHADER_READ),
        ImageLayout::ColorAttachment => (PipelineStages::COLOR_ATTACHMENT_OUTPUT, Access::COLOR_ATTACHMENT_WRITE),
        ImageLayout::DepthAttachment => (PipelineStages::LATE_FRAGMENT_TESTS, Access::DEPTH_ATTACHMENT_WRITE),
        ImageLayout::PresentSrc => (PipelineStages::BOTTOM_OF_PIPE, Access::empty()),
    }
}

fn layout_destination(layout: ImageLayout) -> (PipelineStages, Access) {
    match layout {
        ImageLayout::Undefined => (PipelineStages::TOP_OF_PIPE, Access::empty()),
        ImageLayout::TransferDst => (PipelineStages::TRANSFER, Access::TRANSFER_WRITE),
        ImageLayout::TransferSrc => (PipelineStages::TRANSFER, Access::TRANSFER_READ),
        ImageLayout::ShaderReadOnly => (PipelineStages::FRAGMENT_SHADER, Access::SHADER_READ),
        ImageLayout::ColorAttachment => (PipelineStages::COLOR_ATTACHMENT_OUTPUT, Access::COLOR_ATTACHMENT_WRITE),
        ImageLayout::DepthAttachment => (PipelineStages::EARLY_FRAGMENT_TESTS, Access::DEPTH_ATTACHMENT_WRITE),
        ImageLayout::PresentSrc => (PipelineStages::BOTTOM_OF_PIPE, Access::empty()),
    }
}

#[cfg(test)]
#[path = "upload_tests.rs"]
mod tests;

use super::*;
use crate::error::Error;
use crate::renderer::MockRecorder;

const STAGING: u32 = 1;
const DST: u32 = 2;
const IMAGE: u32 = 7;

// ============================================================================
// Staging capacity
// ============================================================================

#[test]
fn test_capacity_accepts_exact_fit() {
    assert!(check_staging_capacity(STAGING_CAPACITY).is_ok());
    assert!(check_staging_capacity(0).is_ok());
}

#[test]
fn test_capacity_rejects_overflow() {
    let result = check_staging_capacity(STAGING_CAPACITY + 1);
    assert!(matches!(result, Err(Error::InvalidResource(_))));
}

#[test]
fn test_capacity_custom_limit() {
    assert!(check_capacity(1024, 1024).is_ok());
    assert!(check_capacity(1025, 1024).is_err());
}

// ============================================================================
// Buffer upload
// ============================================================================

#[test]
fn test_buffer_upload_bracketed_by_barriers() {
    let mut rec = MockRecorder::new();
    record_buffer_upload(&mut rec, STAGING, DST, 0, 4096, BufferUsage::Storage);

    assert_eq!(rec.commands, vec![
        "buffer_barrier:2".to_string(),
        "copy_buffer:1@0->2@0:4096".to_string(),
        "buffer_barrier:2".to_string(),
    ]);

    let before = rec.buffer_barriers[0];
    assert_eq!(before.src_stage, PipelineStages::TOP_OF_PIPE);
    assert_eq!(before.dst_access, Access::TRANSFER_WRITE);

    let after = rec.buffer_barriers[1];
    assert_eq!(after.src_access, Access::TRANSFER_WRITE);
    assert_eq!(after.dst_stage, PipelineStages::VERTEX_SHADER | PipelineStages::COMPUTE_SHADER);
    assert!(after.dst_access.contains(Access::SHADER_READ));
}

#[test]
fn test_buffer_upload_at_offset() {
    let mut rec = MockRecorder::new();
    record_buffer_upload(&mut rec, STAGING, DST, 1024, 400, BufferUsage::Index);

    assert_eq!(rec.commands[1], "copy_buffer:1@0->2@1024:400");
    assert!(rec.buffer_barriers.iter().all(|b| b.offset == 1024 && b.size == 400));
    assert_eq!(rec.buffer_barriers[1].dst_access, Access::INDEX_READ);
    assert_eq!(rec.buffer_barriers[1].dst_stage, PipelineStages::VERTEX_INPUT);
}

// ============================================================================
// Image upload
// ============================================================================

#[test]
fn test_image_upload_single_level() {
    let mut rec = MockRecorder::new();
    record_image_upload(&mut rec, STAGING, IMAGE, Extent2D::new(1, 1), 1);

    assert_eq!(rec.commands, vec![
        "image_barrier:7:Undefined->TransferDst:mip0+1".to_string(),
        "copy_buffer_to_image:1->7:1x1".to_string(),
        "image_barrier:7:TransferDst->ShaderReadOnly:mip0+1".to_string(),
    ]);
    assert!(rec.blits.is_empty());
}

#[test]
fn test_image_upload_512_mip_chain() {
    let mut rec = MockRecorder::new();
    record_image_upload(&mut rec, STAGING, IMAGE, Extent2D::new(512, 512), 10);

    // 1 initial + 9 * 2 around blits + 1 final
    assert_eq!(rec.image_barriers.len(), 20);
    assert_eq!(rec.count("blit:"), 9);
    assert_eq!(rec.commands[0], "image_barrier:7:Undefined->TransferDst:mip0+10");
    assert_eq!(rec.commands[1], "copy_buffer_to_image:1->7:512x512");

    for level in 1..10u32 {
        let src = level - 1;
        let to_src = rec.commands.iter()
            .position(|c| *c == format!("image_barrier:7:TransferDst->TransferSrc:mip{}+1", src))
            .unwrap();
        let blit = rec.commands.iter()
            .position(|c| *c == format!("blit:7:{}->{}", src, level))
            .unwrap();
        let to_read = rec.commands.iter()
            .position(|c| *c == format!("image_barrier:7:TransferSrc->ShaderReadOnly:mip{}+1", src))
            .unwrap();
        assert!(to_src < blit && blit < to_read, "level {} out of order", level);
    }

    assert_eq!(
        rec.commands.last().unwrap(),
        "image_barrier:7:TransferDst->ShaderReadOnly:mip9+1"
    );
}

#[test]
fn test_image_upload_every_level_ends_shader_readable() {
    let mut rec = MockRecorder::new();
    record_image_upload(&mut rec, STAGING, IMAGE, Extent2D::new(64, 16), 7);

    for level in 0..7u32 {
        let last = rec.image_barriers.iter()
            .filter(|b| b.base_mip_level <= level && level < b.base_mip_level + b.level_count)
            .last()
            .unwrap();
        assert_eq!(last.new_layout, ImageLayout::ShaderReadOnly, "level {}", level);
    }
}

#[test]
fn test_image_upload_blits_halve_extent() {
    let mut rec = MockRecorder::new();
    record_image_upload(&mut rec, STAGING, IMAGE, Extent2D::new(8, 2), 4);

    let dst: Vec<Extent2D> = rec.blits.iter().map(|b| b.dst_extent).collect();
    assert_eq!(dst, vec![Extent2D::new(4, 1), Extent2D::new(2, 1), Extent2D::new(1, 1)]);
}

// ============================================================================
// Download
// ============================================================================

#[test]
fn test_buffer_download_makes_staging_host_visible() {
    let mut rec = MockRecorder::new();
    record_buffer_download(&mut rec, DST, BufferUsage::TransferSrc, STAGING, 256);

    assert_eq!(rec.commands, vec![
        "buffer_barrier:2".to_string(),
        "copy_buffer:2@0->1@0:256".to_string(),
        "buffer_barrier:1".to_string(),
    ]);
    assert_eq!(rec.buffer_barriers[0].dst_access, Access::TRANSFER_READ);
    assert_eq!(rec.buffer_barriers[1].dst_stage, PipelineStages::HOST);
    assert_eq!(rec.buffer_barriers[1].dst_access, Access::HOST_READ);
}

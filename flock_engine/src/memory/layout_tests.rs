use super::*;

// ============================================================================
// align_up / align_down
// ============================================================================

#[test]
fn test_align_up() {
    assert_eq!(align_up(0, 256), 0);
    assert_eq!(align_up(1, 256), 256);
    assert_eq!(align_up(256, 256), 256);
    assert_eq!(align_up(1000, 256), 1024);
    assert_eq!(align_up(17, 1), 17);
    assert_eq!(align_up(17, 0), 17);
}

#[test]
fn test_align_down() {
    assert_eq!(align_down(1000, 256), 768);
    assert_eq!(align_down(1024, 256), 1024);
    assert_eq!(align_down(5, 0), 5);
}

// ============================================================================
// Dual buffer
// ============================================================================

#[test]
fn test_dual_buffer_scenario() {
    let layout = DualBufferLayout::compute(
        BufferRequirements::new(1000, 256),
        BufferRequirements::new(400, 256),
    );
    assert_eq!(layout.secondary_offset, 1024);
    assert_eq!(layout.allocation_size, 1664);
    assert!(layout.allocation_size >= 1024 + 400);
    assert_eq!(layout.secondary_range(), (1024, 1424));
}

#[test]
fn test_dual_buffer_uses_larger_alignment() {
    // Primary alignment is small, secondary is large
    let layout = DualBufferLayout::compute(
        BufferRequirements::new(100, 4),
        BufferRequirements::new(64, 64),
    );
    assert_eq!(layout.secondary_offset, 128);

    let layout = DualBufferLayout::compute(
        BufferRequirements::new(100, 64),
        BufferRequirements::new(64, 4),
    );
    assert_eq!(layout.secondary_offset, 128);
}

#[test]
fn test_dual_buffer_offset_properties() {
    let sizes = [1u64, 48, 255, 256, 257, 1000, 4096, 65_537];
    let alignments = [1u64, 4, 16, 64, 256];

    for &sv in &sizes {
        for &si in &sizes {
            for &av in &alignments {
                for &ai in &alignments {
                    let layout = DualBufferLayout::compute(
                        BufferRequirements::new(sv, av),
                        BufferRequirements::new(si, ai),
                    );
                    let offset = layout.secondary_offset;
                    assert!(offset >= sv, "secondary overlaps primary");
                    assert_eq!(offset % av, 0);
                    assert_eq!(offset % ai, 0);
                    assert!(layout.allocation_size >= offset + si);
                    assert_eq!(layout.allocation_size % 0x80, 0);
                }
            }
        }
    }
}

#[test]
fn test_dual_buffer_offset_is_minimal() {
    let layout = DualBufferLayout::compute(
        BufferRequirements::new(768, 256),
        BufferRequirements::new(12, 256),
    );
    assert_eq!(layout.secondary_offset, 768);
}

// ============================================================================
// Flush ranges
// ============================================================================

#[test]
fn test_flush_range_widens_to_atoms() {
    let range = FlushRange::exact(100, 50, 64, 4096);
    assert_eq!(range.offset, 64);
    assert_eq!(range.end(), 192);
    assert!(range.offset <= 100);
    assert!(range.end() >= 150);
}

#[test]
fn test_flush_range_clamps_to_allocation() {
    let range = FlushRange::exact(4000, 90, 256, 4090);
    assert_eq!(range.offset, 3840);
    assert_eq!(range.end(), 4090);
}

#[test]
fn test_flush_range_aligned_input_unchanged() {
    let range = FlushRange::exact(256, 512, 256, 4096);
    assert_eq!(range, FlushRange { offset: 256, size: 512 });
}

#[test]
fn test_flush_range_coherent_atom() {
    let range = FlushRange::exact(3, 5, 1, 100);
    assert_eq!(range, FlushRange { offset: 3, size: 5 });
    assert!(!range.is_empty());
}

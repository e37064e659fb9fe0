use super::*;

// ============================================================================
// mip_level_count
// ============================================================================

#[test]
fn test_mip_level_count() {
    assert_eq!(mip_level_count(1, 1), 1);
    assert_eq!(mip_level_count(2, 2), 2);
    assert_eq!(mip_level_count(512, 512), 10);
    assert_eq!(mip_level_count(513, 1), 10);
    assert_eq!(mip_level_count(1024, 16), 11);
    assert_eq!(mip_level_count(0, 0), 1);
}

// ============================================================================
// MipChain
// ============================================================================

#[test]
fn test_chain_512_has_ten_levels_nine_blits() {
    let chain = MipChain::new(512, 512);
    assert_eq!(chain.level_count(), 10);

    let blits = chain.blits();
    assert_eq!(blits.len(), 9);
    assert_eq!(blits[0].src_extent, Extent2D::new(512, 512));
    assert_eq!(blits[0].dst_extent, Extent2D::new(256, 256));
    assert_eq!(blits[8].src_level, 8);
    assert_eq!(blits[8].dst_level, 9);
    assert_eq!(blits[8].dst_extent, Extent2D::new(1, 1));
}

#[test]
fn test_chain_halves_each_level() {
    let chain = MipChain::new(512, 512);
    for blit in chain.blits() {
        assert_eq!(blit.dst_level, blit.src_level + 1);
        assert_eq!(blit.dst_extent.width, (blit.src_extent.width / 2).max(1));
        assert_eq!(blit.dst_extent.height, (blit.src_extent.height / 2).max(1));
    }
}

#[test]
fn test_chain_non_square_clamps_to_one() {
    let chain = MipChain::new(300, 5);
    assert_eq!(chain.level_count(), 9);
    assert_eq!(chain.extent(1), Some(Extent2D::new(150, 2)));
    assert_eq!(chain.extent(2), Some(Extent2D::new(75, 1)));
    assert_eq!(chain.extent(8), Some(Extent2D::new(1, 1)));
    assert_eq!(chain.extent(9), None);
}

#[test]
fn test_chain_single_level() {
    let chain = MipChain::with_levels(512, 512, 1);
    assert_eq!(chain.level_count(), 1);
    assert!(chain.blits().is_empty());
    assert_eq!(chain.base(), Extent2D::new(512, 512));
}

#[test]
fn test_chain_levels_clamped() {
    assert_eq!(MipChain::with_levels(16, 16, 0).level_count(), 1);
    assert_eq!(MipChain::with_levels(16, 16, 99).level_count(), 5);
}

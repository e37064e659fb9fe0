/// Mip-chain geometry

use crate::renderer::sync::Extent2D;

/// `floor(log2(max(width, height))) + 1`, or 1 for a degenerate extent
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    let largest = width.max(height);
    if largest == 0 {
        return 1;
    }
    32 - largest.leading_zeros()
}

/// One downsampling blit from `src_level` into `dst_level`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MipBlit {
    pub src_level: u32,
    pub dst_level: u32,
    pub src_extent: Extent2D,
    pub dst_extent: Extent2D,
}

/// Extents of every level of a mip chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MipChain {
    extents: Vec<Extent2D>,
}

impl MipChain {
    /// Full chain down to 1x1
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_levels(width, height, mip_level_count(width, height))
    }

    /// Chain truncated to `levels` (at least 1, at most the full count)
    pub fn with_levels(width: u32, height: u32, levels: u32) -> Self {
        let levels = levels.clamp(1, mip_level_count(width, height));
        let mut extents = Vec::with_capacity(levels as usize);
        let mut extent = Extent2D::new(width.max(1), height.max(1));
        for _ in 0..levels {
            extents.push(extent);
            extent = extent.halved();
        }
        Self { extents }
    }

    pub fn level_count(&self) -> u32 {
        self.extents.len() as u32
    }

    pub fn extent(&self, level: u32) -> Option<Extent2D> {
        self.extents.get(level as usize).copied()
    }

    pub fn base(&self) -> Extent2D {
        self.extents[0]
    }

    /// Blits generating levels `1..level_count` from their predecessors
    pub fn blits(&self) -> Vec<MipBlit> {
        self.extents
            .windows(2)
            .enumerate()
            .map(|(i, pair)| MipBlit {
                src_level: i as u32,
                dst_level: i as u32 + 1,
                src_extent: pair[0],
                dst_extent: pair[1],
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "mip_tests.rs"]
mod tests;

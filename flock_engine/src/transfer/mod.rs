/// Staging transfers and mip-chain generation

pub mod mip;
pub mod upload;

pub use mip::{mip_level_count, MipBlit, MipChain};
pub use upload::{check_staging_capacity, record_buffer_upload, record_buffer_download, record_image_upload};

/// Material parameters and CPU-side image data

use bytemuck::{Pod, Zeroable};
use glam::{UVec4, Vec3, Vec4};

use crate::error::Result;
use crate::scene::texture_table::{TextureHandle, TextureTable};
use crate::engine_bail_warn;

// ===== IMAGES =====

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Rgba8Srgb,
    Rgba8Unorm,
    Rgba32Float,
}

impl ImageFormat {
    pub fn bytes_per_pixel(&self) -> u64 {
        match self {
            ImageFormat::Rgba8Srgb | ImageFormat::Rgba8Unorm => 4,
            ImageFormat::Rgba32Float => 16,
        }
    }

    pub fn is_float(&self) -> bool {
        matches!(self, ImageFormat::Rgba32Float)
    }
}

/// Decoded pixels, tightly packed rows
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
    /// Generate a full mip chain on upload
    pub mipmapped: bool,
}

impl ImageData {
    pub fn new(pixels: Vec<u8>, width: u32, height: u32, format: ImageFormat, mipmapped: bool) -> Result<Self> {
        let expected = width as u64 * height as u64 * format.bytes_per_pixel();
        if width == 0 || height == 0 {
            engine_bail_warn!("flock::scene", "Image has an empty extent {}x{}", width, height);
        }
        if pixels.len() as u64 != expected {
            engine_bail_warn!("flock::scene",
                "Image {}x{} {:?} needs {} bytes, got {}", width, height, format, expected, pixels.len());
        }
        Ok(Self { pixels, width, height, format, mipmapped })
    }

    /// Single-color RGBA8 image
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = rgba.iter().copied().cycle().take((width * height * 4) as usize).collect();
        Self {
            pixels,
            width,
            height,
            format: ImageFormat::Rgba8Unorm,
            mipmapped: false,
        }
    }

    /// The 1x1 white texture every material slot falls back to
    pub fn white() -> Self {
        Self::solid(1, 1, [255; 4])
    }

    pub fn is_float(&self) -> bool {
        self.format.is_float()
    }

    pub fn byte_size(&self) -> u64 {
        self.pixels.len() as u64
    }
}

// ===== MATERIAL =====

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub diffuse: Vec3,
    pub emissive: Vec3,
    pub roughness: f32,
    pub metalness: f32,
    pub albedo_texture: TextureHandle,
    pub normal_texture: TextureHandle,
    pub metal_roughness_texture: TextureHandle,
    pub occlusion_texture: TextureHandle,
    pub emissive_texture: TextureHandle,
}

impl Material {
    /// White, rough, fully metallic, every texture pointing at `default_texture`
    pub fn new(default_texture: TextureHandle) -> Self {
        Self {
            diffuse: Vec3::ONE,
            emissive: Vec3::ZERO,
            roughness: 1.0,
            metalness: 1.0,
            albedo_texture: default_texture,
            normal_texture: default_texture,
            metal_roughness_texture: default_texture,
            occlusion_texture: default_texture,
            emissive_texture: default_texture,
        }
    }

    /// Push-constant block with texture handles resolved to descriptor indices
    ///
    /// A stale handle resolves to index 0, the default texture.
    pub fn constants<T>(&self, textures: &TextureTable<T>, environment: Option<TextureHandle>) -> MaterialConstants {
        let index = |h: TextureHandle| textures.descriptor_index(h).unwrap_or(0);
        MaterialConstants {
            diffuse_roughness: self.diffuse.extend(self.roughness),
            emissive_metalness: self.emissive.extend(self.metalness),
            texture_indices: UVec4::new(
                index(self.albedo_texture),
                index(self.normal_texture),
                index(self.metal_roughness_texture),
                index(self.occlusion_texture),
            ),
            extra_indices: UVec4::new(
                index(self.emissive_texture),
                environment.map_or(0, index),
                0,
                0,
            ),
        }
    }
}

/// Push constants shared by the opaque and environment pipelines (64 bytes)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MaterialConstants {
    pub diffuse_roughness: Vec4,
    pub emissive_metalness: Vec4,
    /// albedo, normal, metal-roughness, occlusion
    pub texture_indices: UVec4,
    /// emissive, environment
    pub extra_indices: UVec4,
}

impl MaterialConstants {
    pub const SIZE: u32 = std::mem::size_of::<MaterialConstants>() as u32;
}

#[cfg(test)]
#[path = "material_tests.rs"]
mod tests;

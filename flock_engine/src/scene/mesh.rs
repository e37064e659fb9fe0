/// Interleaved mesh data

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3, Vec4};

use crate::error::Result;
use crate::engine_bail_warn;

/// One interleaved vertex (48 bytes)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
    pub normal: [f32; 3],
    /// xyz tangent, w handedness
    pub tangent: [f32; 4],
}

impl Vertex {
    pub const STRIDE: u32 = std::mem::size_of::<Vertex>() as u32;

    pub fn new(position: Vec3, uv: Vec2, normal: Vec3, tangent: Vec4) -> Self {
        Self {
            position: position.to_array(),
            uv: uv.to_array(),
            normal: normal.to_array(),
            tangent: tangent.to_array(),
        }
    }
}

/// Vertices plus 32-bit indices, ready for the dual buffer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Interleave separate attribute streams
    ///
    /// Missing streams default to uv `0`, normal `+Z` and tangent `(1, 0, 0, 1)`.
    /// Present streams must match the position count and every index must
    /// be in range.
    pub fn from_streams(
        positions: &[Vec3],
        normals: Option<&[Vec3]>,
        uvs: Option<&[Vec2]>,
        tangents: Option<&[Vec4]>,
        indices: Vec<u32>,
    ) -> Result<Self> {
        let count = positions.len();
        for (name, len) in [
            ("normal", normals.map(|s| s.len())),
            ("uv", uvs.map(|s| s.len())),
            ("tangent", tangents.map(|s| s.len())),
        ] {
            if let Some(len) = len {
                if len != count {
                    engine_bail_warn!("flock::scene",
                        "Mesh has {} positions but {} {} values", count, len, name);
                }
            }
        }
        if let Some(bad) = indices.iter().find(|&&i| i as usize >= count) {
            engine_bail_warn!("flock::scene", "Mesh index {} out of range for {} vertices", bad, count);
        }

        let vertices = (0..count)
            .map(|i| {
                Vertex::new(
                    positions[i],
                    uvs.map_or(Vec2::ZERO, |s| s[i]),
                    normals.map_or(Vec3::Z, |s| s[i]),
                    tangents.map_or(Vec4::new(1.0, 0.0, 0.0, 1.0), |s| s[i]),
                )
            })
            .collect();

        Ok(Self { vertices, indices })
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.indices.is_empty()
    }
}

#[cfg(test)]
#[path = "mesh_tests.rs"]
mod tests;

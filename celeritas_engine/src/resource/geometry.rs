//! CPU-side geometry handed over by model loaders and primitive generators.
//!
//! A [`Geometry`] is a typed vertex array ([`VertexData`]) plus optional
//! 32-bit indices. The vertex format is fixed when the geometry is built, so
//! the byte layout uploaded to the GPU always matches the format's
//! [`VertexDescription`].

use std::f32::consts::{PI, TAU};

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

use crate::error::{Error, Result};
use crate::ral::{VertexAttribType, VertexDescription, VertexStride};

// ============================================================================
// VERTEX FORMATS
// ============================================================================

/// The closed set of engine vertex layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexFormat {
    Static3d,
    Sprite,
    Skinned3d,
    ColouredStatic3d,
    RawPosColour,
}

impl VertexFormat {
    pub fn name(self) -> &'static str {
        match self {
            VertexFormat::Static3d => "Static 3D",
            VertexFormat::Sprite => "Sprite",
            VertexFormat::Skinned3d => "Skinned 3D",
            VertexFormat::ColouredStatic3d => "Coloured Static 3D",
            VertexFormat::RawPosColour => "Raw Position Colour",
        }
    }

    /// Size of one vertex struct, before stride padding
    pub fn vertex_size(self) -> usize {
        match self {
            VertexFormat::Static3d => std::mem::size_of::<Static3dVertex>(),
            VertexFormat::Sprite => std::mem::size_of::<SpriteVertex>(),
            VertexFormat::Skinned3d => std::mem::size_of::<Skinned3dVertex>(),
            VertexFormat::ColouredStatic3d => std::mem::size_of::<ColouredStatic3dVertex>(),
            VertexFormat::RawPosColour => std::mem::size_of::<RawPosColourVertex>(),
        }
    }

    /// Attribute layout the shaders see for this format
    pub fn vertex_description(self) -> VertexDescription {
        use VertexAttribType::*;
        match self {
            VertexFormat::Static3d => VertexDescription::static_3d(),
            VertexFormat::Sprite => VertexDescription::from_table(
                "Sprite vertex format",
                &[("inPosition", F32x2), ("inColour", F32x4), ("inTexCoords", F32x2)],
                VertexStride::Packed,
            ),
            VertexFormat::Skinned3d => VertexDescription::from_table(
                "Skinned 3d vertex format",
                &[
                    ("inPosition", F32x3),
                    ("inColour", F32x4),
                    ("inTexCoords", F32x2),
                    ("inNormal", F32x3),
                    ("inBoneIds", I32x4),
                    ("inWeights", F32x4),
                ],
                VertexStride::FullVertex,
            ),
            VertexFormat::ColouredStatic3d => VertexDescription::from_table(
                "Coloured static 3d vertex format",
                &[
                    ("inPosition", F32x3),
                    ("inTexCoords", F32x2),
                    ("inNormal", F32x3),
                    ("inColour", F32x4),
                ],
                VertexStride::Packed,
            ),
            VertexFormat::RawPosColour => VertexDescription::from_table(
                "Raw position colour vertex format",
                &[("inPos", F32x2), ("inColor", F32x3)],
                VertexStride::Packed,
            ),
        }
    }

    /// Byte distance between vertices in an uploaded buffer
    pub fn stride(self) -> usize {
        self.vertex_description().stride()
    }
}

// ============================================================================
// VERTEX STRUCTS
// ============================================================================

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Static3dVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl Static3dVertex {
    pub fn new(position: Vec3, normal: Vec3, tex_coords: Vec2) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            tex_coords: tex_coords.to_array(),
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct SpriteVertex {
    pub position: [f32; 2],
    pub colour: [f32; 4],
    pub tex_coords: [f32; 2],
}

/// Vertex for skeletal meshes; its size defines `FULL_VERTEX_SIZE`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Skinned3dVertex {
    pub position: [f32; 3],
    pub colour: [f32; 4],
    pub tex_coords: [f32; 2],
    pub normal: [f32; 3],
    pub bone_ids: [i32; 4],
    pub bone_weights: [f32; 4],
}

/// Debug geometry vertex
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct ColouredStatic3dVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
    pub normal: [f32; 3],
    pub colour: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct RawPosColourVertex {
    pub position: [f32; 2],
    pub colour: [f32; 3],
}

/// Vertices of a single format
#[derive(Debug, Clone, PartialEq)]
pub enum VertexData {
    Static3d(Vec<Static3dVertex>),
    Sprite(Vec<SpriteVertex>),
    Skinned3d(Vec<Skinned3dVertex>),
    ColouredStatic3d(Vec<ColouredStatic3dVertex>),
    RawPosColour(Vec<RawPosColourVertex>),
}

impl VertexData {
    pub fn format(&self) -> VertexFormat {
        match self {
            VertexData::Static3d(_) => VertexFormat::Static3d,
            VertexData::Sprite(_) => VertexFormat::Sprite,
            VertexData::Skinned3d(_) => VertexFormat::Skinned3d,
            VertexData::ColouredStatic3d(_) => VertexFormat::ColouredStatic3d,
            VertexData::RawPosColour(_) => VertexFormat::RawPosColour,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            VertexData::Static3d(v) => v.len(),
            VertexData::Sprite(v) => v.len(),
            VertexData::Skinned3d(v) => v.len(),
            VertexData::ColouredStatic3d(v) => v.len(),
            VertexData::RawPosColour(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tightly packed vertex bytes
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            VertexData::Static3d(v) => bytemuck::cast_slice(v),
            VertexData::Sprite(v) => bytemuck::cast_slice(v),
            VertexData::Skinned3d(v) => bytemuck::cast_slice(v),
            VertexData::ColouredStatic3d(v) => bytemuck::cast_slice(v),
            VertexData::RawPosColour(v) => bytemuck::cast_slice(v),
        }
    }
}

// ============================================================================
// GEOMETRY
// ============================================================================

/// Vertices plus optional triangle indices
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    vertices: VertexData,
    indices: Option<Vec<u32>>,
}

impl Geometry {
    pub fn new(vertices: VertexData, indices: Option<Vec<u32>>) -> Self {
        Self { vertices, indices }
    }

    pub fn format(&self) -> VertexFormat {
        self.vertices.format()
    }

    pub fn vertices(&self) -> &VertexData {
        &self.vertices
    }

    pub fn indices(&self) -> Option<&[u32]> {
        self.indices.as_deref()
    }

    pub fn has_indices(&self) -> bool {
        self.indices.is_some()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.as_ref().map_or(0, Vec::len)
    }

    /// Vertex bytes laid out at the format's stride, zero-padded per vertex
    pub fn vertex_bytes(&self) -> Vec<u8> {
        let format = self.format();
        let size = format.vertex_size();
        let stride = format.stride().max(size);
        let packed = self.vertices.as_bytes();
        if stride == size {
            return packed.to_vec();
        }

        let mut bytes = vec![0u8; stride * self.vertex_count()];
        for (dst, src) in bytes.chunks_exact_mut(stride).zip(packed.chunks_exact(size)) {
            dst[..size].copy_from_slice(src);
        }
        bytes
    }

    pub fn index_bytes(&self) -> Option<&[u8]> {
        self.indices.as_deref().map(bytemuck::cast_slice)
    }

    /// Reverse the winding of every indexed triangle so its faces point
    /// inwards (skyboxes). Geometry without indices is returned unchanged.
    pub fn flip_winding(mut self) -> Self {
        if let Some(indices) = self.indices.as_mut() {
            for triangle in indices.chunks_exact_mut(3) {
                triangle.swap(1, 2);
            }
        }
        self
    }

    /// Non-empty, and every index addresses an existing vertex
    pub fn validate(&self) -> Result<()> {
        if self.vertices.is_empty() {
            return Err(Error::InvalidResource(format!(
                "{} geometry has no vertices",
                self.format().name()
            )));
        }
        let count = self.vertex_count();
        if let Some(bad) = self.indices().and_then(|idx| idx.iter().find(|&&i| i as usize >= count)) {
            return Err(Error::InvalidResource(format!(
                "index {} out of range for {} vertices",
                bad, count
            )));
        }
        Ok(())
    }

    // ===== PRIMITIVES =====

    /// Flat XZ plane centred on the origin, facing +Y
    pub fn plane(extents: Vec2) -> Self {
        let corners = [
            (Vec3::new(-0.5, 0.0, -0.5), Vec2::new(0.0, 0.0)),
            (Vec3::new(0.5, 0.0, -0.5), Vec2::new(1.0, 0.0)),
            (Vec3::new(-0.5, 0.0, 0.5), Vec2::new(0.0, 1.0)),
            (Vec3::new(0.5, 0.0, 0.5), Vec2::new(1.0, 1.0)),
        ];
        let scale = Vec3::new(extents.x, 1.0, extents.y);
        let vertices = corners
            .iter()
            .map(|&(pos, uv)| Static3dVertex::new(pos * scale, Vec3::Y, uv))
            .collect();
        Self::new(VertexData::Static3d(vertices), Some(vec![0, 1, 2, 2, 1, 3]))
    }

    /// Axis-aligned box centred on the origin, 6 vertices per face
    pub fn cuboid(extents: Vec3) -> Self {
        const FACES: [(Vec3, [Vec3; 4]); 6] = [
            // normal, corners: bottom-left, bottom-right, top-right, top-left (seen from outside)
            (Vec3::NEG_Z, [Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0), Vec3::new(1.0, 1.0, 0.0)]),
            (Vec3::Z, [Vec3::new(0.0, 0.0, 1.0), Vec3::new(1.0, 0.0, 1.0), Vec3::new(1.0, 1.0, 1.0), Vec3::new(0.0, 1.0, 1.0)]),
            (Vec3::Y, [Vec3::new(0.0, 1.0, 1.0), Vec3::new(1.0, 1.0, 1.0), Vec3::new(1.0, 1.0, 0.0), Vec3::new(0.0, 1.0, 0.0)]),
            (Vec3::NEG_Y, [Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 1.0), Vec3::new(0.0, 0.0, 1.0)]),
            (Vec3::X, [Vec3::new(1.0, 0.0, 1.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 0.0), Vec3::new(1.0, 1.0, 1.0)]),
            (Vec3::NEG_X, [Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 1.0, 1.0), Vec3::new(0.0, 1.0, 0.0)]),
        ];
        let uvs = [Vec2::new(0.0, 1.0), Vec2::new(1.0, 1.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 0.0)];

        let mut vertices = Vec::with_capacity(36);
        for (normal, corners) in FACES {
            for corner in [0usize, 1, 2, 0, 2, 3] {
                let position = (corners[corner] - Vec3::splat(0.5)) * extents;
                vertices.push(Static3dVertex::new(position, normal, uvs[corner]));
            }
        }
        let indices = (0..vertices.len() as u32).collect();
        Self::new(VertexData::Static3d(vertices), Some(indices))
    }

    /// UV sphere: poles plus `east_west_lines - 1` rings of `north_south_lines` vertices
    ///
    /// # Errors
    ///
    /// `InvalidResource` if either line count is below 3 (degenerate sphere).
    pub fn uv_sphere(radius: f32, north_south_lines: u32, east_west_lines: u32) -> Result<Self> {
        if north_south_lines < 3 || east_west_lines < 3 {
            return Err(Error::InvalidResource(format!(
                "uv sphere needs at least 3 lines each way (got {}x{})",
                north_south_lines, east_west_lines
            )));
        }
        let ns = north_south_lines;
        let rings = east_west_lines - 1;

        let mut vertices = Vec::with_capacity((2 + rings * ns) as usize);
        vertices.push(Static3dVertex::new(Vec3::new(0.0, radius, 0.0), Vec3::Y, Vec2::ZERO));
        for ring in 0..rings {
            let phi = PI * (ring + 1) as f32 / east_west_lines as f32;
            for meridian in 0..ns {
                let theta = TAU * meridian as f32 / ns as f32;
                let position = Vec3::new(
                    radius * phi.sin() * theta.cos(),
                    radius * phi.cos(),
                    radius * phi.sin() * theta.sin(),
                );
                let uv = Vec2::new(meridian as f32 / ns as f32, (ring + 1) as f32 / east_west_lines as f32);
                vertices.push(Static3dVertex::new(position, position.normalize_or_zero(), uv));
            }
        }
        vertices.push(Static3dVertex::new(Vec3::new(0.0, -radius, 0.0), Vec3::NEG_Y, Vec2::new(0.0, 1.0)));

        let bottom = vertices.len() as u32 - 1;
        let last_ring = ns * (rings - 1) + 1;
        let mut indices = Vec::with_capacity((6 * ns * rings) as usize);
        for i in 0..ns {
            let next = (i + 1) % ns;
            indices.extend_from_slice(&[0, i + 1, next + 1]);
            indices.extend_from_slice(&[last_ring + i, bottom, last_ring + next]);
        }
        for ring in 0..rings - 1 {
            let start = ring * ns + 1;
            let next_start = start + ns;
            for j in 0..ns {
                let next = (j + 1) % ns;
                let (i0, i1, i2, i3) = (start + j, next_start + j, start + next, next_start + next);
                indices.extend_from_slice(&[i0, i2, i1, i1, i2, i3]);
            }
        }
        Ok(Self::new(VertexData::Static3d(vertices), Some(indices)))
    }

    /// Two-triangle coloured quad in clip space
    pub fn coloured_quad() -> Self {
        let vertices = vec![
            RawPosColourVertex { position: [-0.5, 0.5], colour: [0.0, 0.0, 1.0] },
            RawPosColourVertex { position: [0.5, 0.5], colour: [0.0, 1.0, 0.0] },
            RawPosColourVertex { position: [-0.5, -0.5], colour: [1.0, 0.0, 0.0] },
            RawPosColourVertex { position: [0.5, -0.5], colour: [1.0, 1.0, 1.0] },
        ];
        Self::new(VertexData::RawPosColour(vertices), Some(vec![2, 1, 0, 1, 2, 3]))
    }
}

#[cfg(test)]
#[path = "geometry_tests.rs"]
mod tests;

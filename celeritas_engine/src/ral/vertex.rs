/// Vertex attribute types and vertex descriptions
///
/// A [`VertexDescription`] lists named attributes in buffer order. Offsets are
/// the running sum of attribute sizes; the stride is either that sum
/// ([`VertexStride::Packed`]) or the fixed size of the largest engine vertex
/// ([`VertexStride::FullVertex`]).

use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

use crate::error::{Error, Result};
use crate::ral::MAX_VERTEX_ATTRIBUTES;

/// Size in bytes of the largest engine vertex (skinned 3D).
pub const FULL_VERTEX_SIZE: usize = 80;

/// Scalar type of an attribute lane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexScalar {
    F32,
    U32,
    I32,
}

/// Attribute type: scalar kind times 1..4 lanes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexAttribType {
    F32,
    F32x2,
    F32x3,
    F32x4,
    U32,
    U32x2,
    U32x3,
    U32x4,
    I32,
    I32x2,
    I32x3,
    I32x4,
}

impl VertexAttribType {
    /// Number of lanes (1..=4)
    pub fn components(self) -> u32 {
        use VertexAttribType::*;
        match self {
            F32 | U32 | I32 => 1,
            F32x2 | U32x2 | I32x2 => 2,
            F32x3 | U32x3 | I32x3 => 3,
            F32x4 | U32x4 | I32x4 => 4,
        }
    }

    pub fn scalar(self) -> VertexScalar {
        use VertexAttribType::*;
        match self {
            F32 | F32x2 | F32x3 | F32x4 => VertexScalar::F32,
            U32 | U32x2 | U32x3 | U32x4 => VertexScalar::U32,
            I32 | I32x2 | I32x3 | I32x4 => VertexScalar::I32,
        }
    }

    /// Size in bytes (4 per lane)
    pub fn size(self) -> usize {
        self.components() as usize * 4
    }
}

/// How consecutive vertices are spaced in the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VertexStride {
    /// Sum of attribute sizes
    #[default]
    Packed,
    /// [`FULL_VERTEX_SIZE`] regardless of the attributes used
    FullVertex,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    pub name: String,
    pub attr_type: VertexAttribType,
}

/// Ordered attribute list plus stride mode
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct VertexDescription {
    debug_label: String,
    attributes: Vec<VertexAttribute>,
    stride_mode: VertexStride,
}

impl VertexDescription {
    pub fn new(debug_label: impl Into<String>) -> Self {
        Self {
            debug_label: debug_label.into(),
            attributes: Vec::new(),
            stride_mode: VertexStride::Packed,
        }
    }

    /// Append an attribute after the existing ones
    ///
    /// # Errors
    ///
    /// `InvalidResource` once [`MAX_VERTEX_ATTRIBUTES`] attributes are present.
    pub fn add_attr(&mut self, name: impl Into<String>, attr_type: VertexAttribType) -> Result<()> {
        if self.attributes.len() >= MAX_VERTEX_ATTRIBUTES {
            return Err(Error::InvalidResource(format!(
                "vertex description '{}' already has {} attributes",
                self.debug_label, MAX_VERTEX_ATTRIBUTES
            )));
        }
        self.attributes.push(VertexAttribute { name: name.into(), attr_type });
        Ok(())
    }

    /// Builder form of [`add_attr`](Self::add_attr)
    pub fn with_attr(mut self, name: impl Into<String>, attr_type: VertexAttribType) -> Result<Self> {
        self.add_attr(name, attr_type)?;
        Ok(self)
    }

    pub fn with_stride(mut self, stride_mode: VertexStride) -> Self {
        self.stride_mode = stride_mode;
        self
    }

    /// Description from a fixed attribute table (engine vertex formats)
    pub(crate) fn from_table(
        debug_label: &str,
        table: &[(&str, VertexAttribType)],
        stride_mode: VertexStride,
    ) -> Self {
        debug_assert!(table.len() <= MAX_VERTEX_ATTRIBUTES);
        Self {
            debug_label: debug_label.to_string(),
            attributes: table
                .iter()
                .map(|&(name, attr_type)| VertexAttribute { name: name.to_string(), attr_type })
                .collect(),
            stride_mode,
        }
    }

    /// Position, normal and texture coordinates, spaced at the full vertex size
    pub fn static_3d() -> Self {
        Self::from_table(
            "Standard static 3d vertex format",
            &[
                ("inPosition", VertexAttribType::F32x3),
                ("inNormal", VertexAttribType::F32x3),
                ("inTexCoords", VertexAttribType::F32x2),
            ],
            VertexStride::FullVertex,
        )
    }

    pub fn debug_label(&self) -> &str {
        &self.debug_label
    }

    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    pub fn stride_mode(&self) -> VertexStride {
        self.stride_mode
    }

    /// Sum of attribute sizes
    pub fn packed_size(&self) -> usize {
        self.attributes.iter().map(|a| a.attr_type.size()).sum()
    }

    /// Byte distance between consecutive vertices
    pub fn stride(&self) -> usize {
        match self.stride_mode {
            VertexStride::Packed => self.packed_size(),
            VertexStride::FullVertex => FULL_VERTEX_SIZE,
        }
    }

    /// Attributes with their byte offsets, in order
    pub fn offsets(&self) -> impl Iterator<Item = (usize, &VertexAttribute)> {
        self.attributes.iter().scan(0usize, |offset, attr| {
            let current = *offset;
            *offset += attr.attr_type.size();
            Some((current, attr))
        })
    }

    /// Hash of everything that affects attribute setup (types and stride,
    /// not names). Two descriptions with the same key can share a vertex
    /// array object for the same buffer.
    pub fn layout_key(&self) -> u64 {
        let mut hasher = FxHasher::default();
        for attr in &self.attributes {
            attr.attr_type.hash(&mut hasher);
        }
        self.stride().hash(&mut hasher);
        hasher.finish()
    }
}

#[cfg(test)]
#[path = "vertex_tests.rs"]
mod tests;

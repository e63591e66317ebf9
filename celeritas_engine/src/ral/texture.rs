/// Texture descriptions

use glam::UVec2;

use crate::error::{Error, Result};

/// Texture dimensionality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureType {
    #[default]
    Tex2d,
    Tex3d,
    Tex2dArray,
    /// Six square faces, uploaded in +X, -X, +Y, -Y, +Z, -Z order
    CubeMap,
}

/// Texel format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureFormat {
    /// 8 bits per channel RGBA, normalized
    #[default]
    Rgba8Unorm,
    /// Backend default depth format (32-bit float on OpenGL)
    DepthDefault,
}

impl TextureFormat {
    pub fn bytes_per_texel(self) -> usize {
        match self {
            TextureFormat::Rgba8Unorm => 4,
            TextureFormat::DepthDefault => 4,
        }
    }

    pub fn is_depth(self) -> bool {
        matches!(self, TextureFormat::DepthDefault)
    }
}

/// Texture creation descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureDesc {
    pub debug_name: String,
    pub tex_type: TextureType,
    pub format: TextureFormat,
    /// Width and height in texels
    pub extents: UVec2,
    /// Depth for 3D textures, layer count for arrays; ignored otherwise
    pub layers: u32,
}

impl TextureDesc {
    /// 2D texture of the given format and size
    pub fn new_2d(debug_name: impl Into<String>, format: TextureFormat, width: u32, height: u32) -> Self {
        Self {
            debug_name: debug_name.into(),
            tex_type: TextureType::Tex2d,
            format,
            extents: UVec2::new(width, height),
            layers: 1,
        }
    }

    /// Depth attachment sized to a framebuffer
    pub fn depth(debug_name: impl Into<String>, width: u32, height: u32) -> Self {
        Self::new_2d(debug_name, TextureFormat::DepthDefault, width, height)
    }

    /// Cube map with square faces of `size` texels
    pub fn cube_map(debug_name: impl Into<String>, format: TextureFormat, size: u32) -> Self {
        Self {
            debug_name: debug_name.into(),
            tex_type: TextureType::CubeMap,
            format,
            extents: UVec2::new(size, size),
            layers: 6,
        }
    }

    pub fn with_type(mut self, tex_type: TextureType, layers: u32) -> Self {
        self.tex_type = tex_type;
        self.layers = layers;
        self
    }

    /// Number of 2D images the texture holds
    pub fn image_count(&self) -> u32 {
        match self.tex_type {
            TextureType::Tex2d => 1,
            TextureType::Tex3d | TextureType::Tex2dArray => self.layers.max(1),
            TextureType::CubeMap => 6,
        }
    }

    /// Bytes expected by an upload covering the whole texture
    pub fn byte_size(&self) -> usize {
        self.extents.x as usize
            * self.extents.y as usize
            * self.image_count() as usize
            * self.format.bytes_per_texel()
    }

    /// Reject zero-sized textures, non-square cube faces and uploads of the
    /// wrong length.
    pub fn validate(&self, data: Option<&[u8]>) -> Result<()> {
        if self.extents.x == 0 || self.extents.y == 0 {
            return Err(Error::InvalidResource(format!(
                "texture '{}' has zero extent {}x{}",
                self.debug_name, self.extents.x, self.extents.y
            )));
        }
        if self.tex_type == TextureType::CubeMap && self.extents.x != self.extents.y {
            return Err(Error::InvalidResource(format!(
                "cube map '{}' faces must be square, got {}x{}",
                self.debug_name, self.extents.x, self.extents.y
            )));
        }
        if let Some(bytes) = data {
            if bytes.len() != self.byte_size() {
                return Err(Error::InvalidResource(format!(
                    "texture '{}' expects {} bytes of texel data, got {}",
                    self.debug_name,
                    self.byte_size(),
                    bytes.len()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "texture_tests.rs"]
mod tests;

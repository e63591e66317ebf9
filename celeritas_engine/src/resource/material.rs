/// PBR materials and their shader-data layout

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::ral::{ShaderBinding, ShaderData, ShaderDataLayout, TextureHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MaterialKind {
    /// Surface properties come from texture maps
    #[default]
    Pbr,
    /// Uniform surface described by the scalar parameters only
    PbrParams,
}

impl MaterialKind {
    pub fn name(self) -> &'static str {
        match self {
            MaterialKind::Pbr => "PBR (Textures)",
            MaterialKind::PbrParams => "PBR (Params)",
        }
    }
}

/// Metallic-roughness material
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub kind: MaterialKind,
    /// Linear RGB, 0..1 per channel
    pub base_colour: Vec3,
    pub metallic: f32,
    pub roughness: f32,
    pub ambient_occlusion: f32,
    pub albedo_map: Option<TextureHandle>,
    pub normal_map: Option<TextureHandle>,
    pub metallic_roughness_map: Option<TextureHandle>,
    pub ambient_occlusion_map: Option<TextureHandle>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "Standard Material".to_string(),
            kind: MaterialKind::Pbr,
            base_colour: Vec3::ONE,
            metallic: 0.0,
            roughness: 0.5,
            ambient_occlusion: 0.0,
            albedo_map: None,
            normal_map: None,
            metallic_roughness_map: None,
            ambient_occlusion_map: None,
        }
    }
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    /// Scalar-only material
    pub fn from_params(name: impl Into<String>, base_colour: Vec3, metallic: f32, roughness: f32) -> Self {
        Self {
            name: name.into(),
            kind: MaterialKind::PbrParams,
            base_colour,
            metallic,
            roughness,
            ..Default::default()
        }
    }
}

/// `uniform PBR_Params { vec3 albedo; float metallic; float roughness; float ao; }`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct PbrParams {
    pub albedo: [f32; 3],
    pub metallic: f32,
    pub roughness: f32,
    pub ambient_occlusion: f32,
}

/// Draw-time view of a [`Material`]: maps with a fallback texture for the
/// missing ones, plus the scalar block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PbrMaterialUniforms {
    pub albedo_map: TextureHandle,
    pub metallic_roughness_map: TextureHandle,
    pub ambient_occlusion_map: TextureHandle,
    pub normal_map: TextureHandle,
    pub params: PbrParams,
}

impl PbrMaterialUniforms {
    /// `fallback` (normally a 1x1 white texture) replaces every absent map
    pub fn new(material: &Material, fallback: TextureHandle) -> Self {
        Self {
            albedo_map: material.albedo_map.unwrap_or(fallback),
            metallic_roughness_map: material.metallic_roughness_map.unwrap_or(fallback),
            ambient_occlusion_map: material.ambient_occlusion_map.unwrap_or(fallback),
            normal_map: material.normal_map.unwrap_or(fallback),
            params: PbrParams {
                albedo: material.base_colour.to_array(),
                metallic: material.metallic,
                roughness: material.roughness,
                ambient_occlusion: material.ambient_occlusion,
            },
        }
    }
}

impl ShaderData for PbrMaterialUniforms {
    fn layout(data: Option<&Self>) -> ShaderDataLayout<'_> {
        ShaderDataLayout::new("PBRMaterial")
            .with(ShaderBinding::texture("albedoMap", data.map(|d| d.albedo_map)))
            .with(ShaderBinding::texture("metallicRoughnessMap", data.map(|d| d.metallic_roughness_map)))
            .with(ShaderBinding::texture("aoMap", data.map(|d| d.ambient_occlusion_map)))
            .with(ShaderBinding::texture("normalMap", data.map(|d| d.normal_map)))
            .with(ShaderBinding::bytes("PBR_Params", data.map(|d| &d.params)))
    }
}

#[cfg(test)]
#[path = "material_tests.rs"]
mod tests;

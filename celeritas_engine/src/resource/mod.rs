//! Resource layer: CPU-side geometry and materials, and the GPU meshes built
//! from them.
//!
//! Loaders produce [`Geometry`] and [`Material`] values; [`Mesh::upload`]
//! turns geometry into backend buffers.

mod geometry;
mod material;
mod mesh;
mod shader_layouts;

pub use geometry::{
    ColouredStatic3dVertex, Geometry, RawPosColourVertex, Skinned3dVertex, SpriteVertex,
    Static3dVertex, VertexData, VertexFormat,
};
pub use material::{Material, MaterialKind, PbrMaterialUniforms, PbrParams};
pub use mesh::Mesh;
pub use shader_layouts::{
    CameraBinding, ModelBinding, PointLight, PointLightsBinding, MAX_POINT_LIGHTS,
};

crate::define_handle! {
    /// Mesh stored in an application-owned `Pool<Mesh, MeshHandle>`
    pub struct MeshHandle => "mesh";
    /// Material stored in an application-owned `Pool<Material, MaterialHandle>`
    pub struct MaterialHandle => "material";
}

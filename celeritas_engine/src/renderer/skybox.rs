/// Cube-map skybox
///
/// An inward-facing unit cube textured with a cube map. It is drawn first in
/// the main pass with depth testing off, and the camera translation is
/// stripped from the view so the cube stays centred on the eye.

use glam::{Mat3, Mat4};

use crate::camera::Camera;
use crate::error::{Error, Result};
use crate::ral::{
    CmdEncoder, GraphicsPipelineDesc, PipelineHandle, RenderBackend, RenderpassHandle,
    ShaderBinding, ShaderData, ShaderDataDesc, ShaderDataLayout, ShaderDesc, TextureDesc,
    TextureFormat, TextureHandle, VertexDescription,
};
use crate::renderer::log_release_failure;
use crate::resource::{CameraBinding, Geometry, Mesh};

const SOURCE: &str = "celeritas::Skybox";

const SKYBOX_VERT: &str = include_str!("../../shaders/skybox.vert");
const SKYBOX_FRAG: &str = include_str!("../../shaders/skybox.frag");

/// `uniform samplerCube cubemap;`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyboxUniforms {
    pub cubemap: TextureHandle,
}

impl ShaderData for SkyboxUniforms {
    fn layout(data: Option<&Self>) -> ShaderDataLayout<'_> {
        ShaderDataLayout::new("Skybox").with(ShaderBinding::texture("cubemap", data.map(|d| d.cubemap)))
    }
}

#[derive(Debug)]
pub struct Skybox {
    cube: Mesh,
    texture: TextureHandle,
    pipeline: PipelineHandle,
}

impl Skybox {
    /// Upload the six RGBA8 faces (+X, -X, +Y, -Y, +Z, -Z, each `face_size`
    /// texels square) and build the skybox pipeline against `renderpass`.
    ///
    /// # Errors
    ///
    /// `InvalidResource` when `faces` is not six faces of `face_size`.
    pub fn new<B: RenderBackend>(
        backend: &mut B,
        renderpass: RenderpassHandle,
        face_size: u32,
        faces: &[u8],
    ) -> Result<Self> {
        let desc = TextureDesc::cube_map("skybox", TextureFormat::Rgba8Unorm, face_size);
        if faces.len() != desc.byte_size() {
            return Err(Error::InvalidResource(format!(
                "skybox needs 6 faces of {}x{} RGBA8 ({} bytes), got {}",
                face_size,
                face_size,
                desc.byte_size(),
                faces.len()
            )));
        }

        crate::engine_info!(SOURCE, "Creating a skybox ({}x{} faces)", face_size, face_size);
        let cube = Mesh::upload(backend, &Geometry::cuboid(glam::Vec3::ONE).flip_winding())?;
        let texture = match backend.texture_create(&desc, true, Some(faces)) {
            Ok(texture) => texture,
            Err(err) => {
                log_release_failure(SOURCE, "skybox cube", cube.destroy(backend));
                return Err(err);
            }
        };

        let pipeline_desc = GraphicsPipelineDesc::new(
            "skybox",
            VertexDescription::static_3d(),
            ShaderDesc::glsl("skybox.vert", SKYBOX_VERT),
            ShaderDesc::glsl("skybox.frag", SKYBOX_FRAG),
        )
        .with_layout(ShaderDataDesc::of::<CameraBinding>())
        .with_layout(ShaderDataDesc::of::<SkyboxUniforms>())
        .with_depth_test(false);
        let pipeline = match backend.graphics_pipeline_create(&pipeline_desc, renderpass) {
            Ok(pipeline) => pipeline,
            Err(err) => {
                log_release_failure(SOURCE, "skybox cube map", backend.texture_destroy(texture));
                log_release_failure(SOURCE, "skybox cube", cube.destroy(backend));
                return Err(err);
            }
        };

        Ok(Self { cube, texture, pipeline })
    }

    pub fn texture(&self) -> TextureHandle {
        self.texture
    }

    /// Camera block with the view translation removed
    pub fn camera_binding(camera: &Camera, width: f32, height: f32) -> CameraBinding {
        let mut binding = CameraBinding::from_camera(camera, width, height);
        binding.view = Mat4::from_mat3(Mat3::from_mat4(binding.view));
        binding
    }

    /// Record the skybox draw. A renderpass on the default framebuffer must
    /// be active; the skybox pipeline stays bound afterwards.
    pub fn draw(&self, encoder: &mut dyn CmdEncoder, camera: &Camera, width: f32, height: f32) -> Result<()> {
        encoder.bind_pipeline(self.pipeline)?;
        encoder.bind_shader_data(0, &Self::camera_binding(camera, width, height).shader_data())?;
        encoder.bind_shader_data(1, &SkyboxUniforms { cubemap: self.texture }.shader_data())?;
        self.cube.draw(encoder)
    }

    pub fn destroy<B: RenderBackend>(self, backend: &mut B) -> Result<()> {
        backend.pipeline_destroy(self.pipeline)?;
        backend.texture_destroy(self.texture)?;
        self.cube.destroy(backend)
    }
}

#[cfg(test)]
#[path = "skybox_tests.rs"]
mod tests;

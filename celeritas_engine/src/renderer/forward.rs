/// Lit forward pass
///
/// Draws every entity once with a directional light and the shadow map from
/// [`ShadowPass`](crate::renderer::ShadowPass).

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};

use crate::error::Result;
use crate::ral::{
    CmdEncoder, GraphicsPipelineDesc, PipelineHandle, RenderBackend, RenderpassHandle,
    ShaderBinding, ShaderData, ShaderDataDesc, ShaderDataLayout, ShaderDesc, TextureHandle,
    VertexDescription,
};
use crate::renderer::RenderEnt;
use crate::resource::CameraBinding;

const FORWARD_VERT: &str = include_str!("../../shaders/forward.vert");
const FORWARD_FRAG: &str = include_str!("../../shaders/forward.frag");

/// `uniform ForwardUniforms { mat4 model; mat4 lightSpace; vec4 lightDirection; vec4 albedo; }`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ForwardUniforms {
    pub model: Mat4,
    pub light_space: Mat4,
    pub light_direction: Vec4,
    pub albedo: Vec4,
}

/// Per-entity uniforms plus the shadow map they are lit against
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForwardData {
    pub uniforms: ForwardUniforms,
    pub shadow_map: TextureHandle,
}

impl ShaderData for ForwardData {
    fn layout(data: Option<&Self>) -> ShaderDataLayout<'_> {
        ShaderDataLayout::new("Forward")
            .with(ShaderBinding::bytes("ForwardUniforms", data.map(|d| &d.uniforms)))
            .with(ShaderBinding::texture("shadowMap", data.map(|d| d.shadow_map)))
    }
}

#[derive(Debug)]
pub struct ForwardPass {
    pipeline: PipelineHandle,
}

impl ForwardPass {
    pub fn new<B: RenderBackend>(backend: &mut B, renderpass: RenderpassHandle) -> Result<Self> {
        let desc = GraphicsPipelineDesc::new(
            "forward",
            VertexDescription::static_3d(),
            ShaderDesc::glsl("forward.vert", FORWARD_VERT),
            ShaderDesc::glsl("forward.frag", FORWARD_FRAG),
        )
        .with_layout(ShaderDataDesc::of::<CameraBinding>())
        .with_layout(ShaderDataDesc::of::<ForwardData>());
        let pipeline = backend.graphics_pipeline_create(&desc, renderpass)?;
        Ok(Self { pipeline })
    }

    pub fn pipeline(&self) -> PipelineHandle {
        self.pipeline
    }

    /// Draw `entities` inside the active renderpass
    pub fn draw(
        &self,
        encoder: &mut dyn CmdEncoder,
        camera: &CameraBinding,
        light_space: Mat4,
        light_direction: Vec3,
        shadow_map: TextureHandle,
        entities: &[RenderEnt<'_>],
    ) -> Result<u32> {
        if entities.is_empty() {
            return Ok(0);
        }
        encoder.bind_pipeline(self.pipeline)?;
        encoder.bind_shader_data(0, &camera.shader_data())?;

        for entity in entities {
            let data = ForwardData {
                uniforms: ForwardUniforms {
                    model: entity.transform,
                    light_space,
                    light_direction: light_direction.extend(0.0),
                    albedo: entity.albedo,
                },
                shadow_map,
            };
            encoder.bind_shader_data(1, &data.shader_data())?;
            entity.mesh.draw(encoder)?;
        }
        Ok(entities.len() as u32)
    }

    pub fn destroy<B: RenderBackend>(self, backend: &mut B) -> Result<()> {
        backend.pipeline_destroy(self.pipeline)
    }
}

#[cfg(test)]
#[path = "forward_tests.rs"]
mod tests;

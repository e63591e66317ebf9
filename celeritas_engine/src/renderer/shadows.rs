/// Directional-light shadow map
///
/// Renders every shadow-casting entity into a depth-only offscreen target
/// from the light's point of view. The depth texture is then sampled by the
/// lit pass.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, UVec2};

use crate::error::Result;
use crate::ral::{
    CmdEncoder, GraphicsPipelineDesc, PipelineHandle, RenderBackend, RenderpassDesc,
    RenderpassHandle, ShaderBinding, ShaderData, ShaderDataDesc, ShaderDataLayout, ShaderDesc,
    TextureDesc, TextureHandle, VertexDescription,
};
use crate::renderer::{log_release_failure, RenderEnt};

const SOURCE: &str = "celeritas::ShadowPass";

/// Default shadow map width and height in texels
pub const SHADOW_MAP_SIZE: u32 = 2048;

const SHADOWS_VERT: &str = include_str!("../../shaders/shadows.vert");
const SHADOWS_FRAG: &str = include_str!("../../shaders/shadows.frag");

/// `uniform ShadowUniforms { mat4 lightSpace; mat4 model; }`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ShadowUniforms {
    pub light_space: Mat4,
    pub model: Mat4,
}

impl ShaderData for ShadowUniforms {
    fn layout(data: Option<&Self>) -> ShaderDataLayout<'_> {
        ShaderDataLayout::new("ShadowUniforms").with(ShaderBinding::bytes("ShadowUniforms", data))
    }
}

#[derive(Debug)]
pub struct ShadowPass {
    extents: UVec2,
    depth_texture: TextureHandle,
    renderpass: RenderpassHandle,
    pipeline: PipelineHandle,
}

impl ShadowPass {
    /// Create the depth texture, its renderpass and the depth-only pipeline
    ///
    /// Objects created before a failure are released again.
    pub fn new<B: RenderBackend>(backend: &mut B, extents: UVec2) -> Result<Self> {
        let depth_texture =
            backend.texture_create(&TextureDesc::depth("shadow map", extents.x, extents.y), false, None)?;

        let renderpass = match backend.renderpass_create(&RenderpassDesc::offscreen(
            "shadow map",
            None,
            Some(depth_texture),
        )) {
            Ok(renderpass) => renderpass,
            Err(err) => {
                log_release_failure(SOURCE, "shadow map", backend.texture_destroy(depth_texture));
                return Err(err);
            }
        };

        let desc = GraphicsPipelineDesc::new(
            "shadows",
            VertexDescription::static_3d(),
            ShaderDesc::glsl("shadows.vert", SHADOWS_VERT),
            ShaderDesc::glsl("shadows.frag", SHADOWS_FRAG),
        )
        .with_layout(ShaderDataDesc::of::<ShadowUniforms>());
        let pipeline = match backend.graphics_pipeline_create(&desc, renderpass) {
            Ok(pipeline) => pipeline,
            Err(err) => {
                log_release_failure(SOURCE, "shadow renderpass", backend.renderpass_destroy(renderpass));
                log_release_failure(SOURCE, "shadow map", backend.texture_destroy(depth_texture));
                return Err(err);
            }
        };

        crate::engine_debug!(
            SOURCE,
            "Shadow map {}x{} ({})",
            extents.x,
            extents.y,
            depth_texture
        );
        Ok(Self { extents, depth_texture, renderpass, pipeline })
    }

    /// Depth texture written by [`run`](Self::run)
    pub fn shadow_map(&self) -> TextureHandle {
        self.depth_texture
    }

    pub fn extents(&self) -> UVec2 {
        self.extents
    }

    pub fn renderpass(&self) -> RenderpassHandle {
        self.renderpass
    }

    /// Record the shadow renderpass. Must be called between renderpasses.
    ///
    /// Returns the number of entities drawn (those with `casts_shadows`).
    pub fn run(&self, encoder: &mut dyn CmdEncoder, light_space: Mat4, entities: &[RenderEnt<'_>]) -> Result<u32> {
        encoder.begin_render(self.renderpass)?;
        encoder.bind_pipeline(self.pipeline)?;

        let mut drawn = 0;
        for entity in entities.iter().filter(|e| e.casts_shadows) {
            let uniforms = ShadowUniforms { light_space, model: entity.transform };
            encoder.bind_shader_data(0, &uniforms.shader_data())?;
            entity.mesh.draw(encoder)?;
            drawn += 1;
        }

        encoder.end_render()?;
        Ok(drawn)
    }

    /// Release the pipeline, renderpass and depth texture
    pub fn destroy<B: RenderBackend>(self, backend: &mut B) -> Result<()> {
        backend.pipeline_destroy(self.pipeline)?;
        backend.renderpass_destroy(self.renderpass)?;
        backend.texture_destroy(self.depth_texture)
    }
}

#[cfg(test)]
#[path = "shadows_tests.rs"]
mod tests;

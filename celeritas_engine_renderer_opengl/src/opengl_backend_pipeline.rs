/// OpenGlBackend - graphics pipelines and their uniform blocks

use celeritas_engine::celeritas::render::{
    BindingKind, BufferFlags, BufferHandle, BufferType, GraphicsPipelineDesc, PipelineHandle,
    RenderpassHandle, ShaderDataLayout, MAX_PIPELINE_UNIFORM_BUFFERS,
};
use celeritas_engine::celeritas::{Error, Result};
use celeritas_engine::{engine_debug, engine_info, engine_warn};
use gl::types::GLuint;

use crate::gl_api::GlApi;
use crate::opengl_backend::{exhausted, OpenGlBackend};
use crate::opengl_helpers::link_program;
use crate::opengl_surface::GlSurface;
use crate::opengl_types::{GlPipeline, GlPipelineLayout, GlUniformBlock};

impl<S: GlSurface, G: GlApi> OpenGlBackend<S, G> {
    pub(crate) fn create_graphics_pipeline(
        &mut self,
        desc: &GraphicsPipelineDesc,
        renderpass: RenderpassHandle,
    ) -> Result<PipelineHandle> {
        desc.validate()?;
        self.renderpasses.get(renderpass)?;
        if self.pipelines.is_full() {
            return Err(exhausted("pipeline", self.pipelines.capacity()));
        }
        if self.pipeline_layouts.is_full() {
            return Err(exhausted("pipeline layout", self.pipeline_layouts.capacity()));
        }

        let program = link_program(&self.gl, &desc.vs, &desc.fs)?;

        let layouts: Vec<ShaderDataLayout<'static>> =
            desc.data_layouts.iter().map(|data| data.layout()).collect();
        let mut layout = GlPipelineLayout::new(&layouts);

        if let Err(err) = self.create_uniform_blocks(program, &desc.debug_name, &layouts, &mut layout) {
            let owned: Vec<BufferHandle> = layout.uniforms.iter().map(|u| u.buffer).collect();
            self.discard_pipeline_objects(program, &owned);
            return Err(err);
        }

        let uniform_count = layout.uniforms.len();
        let owned: Vec<BufferHandle> = layout.uniforms.iter().map(|u| u.buffer).collect();
        let Some(layout_handle) = self.pipeline_layouts.insert(layout) else {
            self.discard_pipeline_objects(program, &owned);
            return Err(exhausted("pipeline layout", self.pipeline_layouts.capacity()));
        };

        let pipeline = GlPipeline {
            debug_name: desc.debug_name.clone(),
            program,
            vertex_desc: desc.vertex_desc.clone(),
            layout_key: desc.vertex_desc.layout_key(),
            topology: desc.topology,
            wireframe: desc.wireframe,
            depth_test: desc.depth_test,
            layout: layout_handle,
            renderpass,
        };
        let Some(handle) = self.pipelines.insert(pipeline) else {
            let _ = self.pipeline_layouts.dealloc(layout_handle);
            self.discard_pipeline_objects(program, &owned);
            return Err(exhausted("pipeline", self.pipelines.capacity()));
        };

        engine_info!(
            "celeritas::opengl",
            "Created pipeline '{}' {} (program {}, {} uniform blocks, vertex '{}')",
            desc.debug_name,
            handle,
            program,
            uniform_count,
            desc.vertex_desc.debug_label()
        );
        Ok(handle)
    }

    /// One uniform buffer per bytes binding, bound to consecutive binding points
    fn create_uniform_blocks(
        &mut self,
        program: GLuint,
        pipeline_name: &str,
        layouts: &[ShaderDataLayout<'static>],
        layout: &mut GlPipelineLayout,
    ) -> Result<()> {
        let mut binding_point = 0u32;

        for data_layout in layouts {
            for binding in &data_layout.bindings {
                let BindingKind::Bytes { size, .. } = &binding.kind else {
                    continue;
                };
                let size = *size;

                if binding_point as usize >= MAX_PIPELINE_UNIFORM_BUFFERS {
                    return Err(Error::InvalidResource(format!(
                        "pipeline '{}' needs more than {} uniform buffers",
                        pipeline_name, MAX_PIPELINE_UNIFORM_BUFFERS
                    )));
                }
                if layout.uniform(binding.label).is_some() {
                    return Err(Error::InvalidResource(format!(
                        "pipeline '{}' declares uniform block '{}' twice",
                        pipeline_name, binding.label
                    )));
                }

                let buffer = self.create_buffer(size, BufferType::Uniform, BufferFlags::GPU, None)?;
                layout.add_uniform(GlUniformBlock {
                    label: binding.label.to_string(),
                    buffer,
                    binding_point,
                    size,
                });
                let record = self.buffers.get_mut(buffer)?;
                record.ubo_binding_point = Some(binding_point);
                record.name = Some(binding.label.to_string());

                match self.gl.uniform_block_index(program, binding.label) {
                    Some(block) => {
                        self.gl.uniform_block_binding(program, block, binding_point);
                        engine_debug!(
                            "celeritas::opengl",
                            "'{}': uniform block '{}' ({} bytes) -> binding {}",
                            pipeline_name,
                            binding.label,
                            size,
                            binding_point
                        );
                    }
                    None => engine_warn!(
                        "celeritas::opengl",
                        "'{}': couldn't retrieve block index for uniform block '{}'",
                        pipeline_name,
                        binding.label
                    ),
                }
                binding_point += 1;
            }
        }
        Ok(())
    }

    fn discard_pipeline_objects(&mut self, program: GLuint, uniforms: &[BufferHandle]) {
        for &buffer in uniforms {
            self.release_uniform_buffer(buffer);
        }
        self.gl.delete_program(program);
    }

    pub(crate) fn destroy_pipeline(&mut self, pipeline: PipelineHandle) -> Result<()> {
        let record = self.pipelines.dealloc(pipeline)?;
        let owned: Vec<BufferHandle> = match self.pipeline_layouts.dealloc(record.layout) {
            Ok(layout) => layout.uniforms.iter().map(|u| u.buffer).collect(),
            Err(_) => Vec::new(),
        };
        self.discard_pipeline_objects(record.program, &owned);
        engine_debug!(
            "celeritas::opengl",
            "Destroyed pipeline '{}' ({} uniform buffers released)",
            record.debug_name,
            owned.len()
        );
        Ok(())
    }
}

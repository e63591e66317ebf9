/// GlEncoder - immediate-mode CmdEncoder for the OpenGL backend
///
/// GL has no command buffers: every call validates against the frame tracker
/// and issues its GL commands right away. `finish` only reports how many
/// commands went through.

use celeritas_engine::celeritas::render::{
    BindingKind, BufferHandle, BufferType, CmdBuffer, CmdEncoder, PipelineHandle,
    RenderpassHandle, ShaderDataLayout, MAX_SHADER_DATA_LAYOUTS,
};
use celeritas_engine::celeritas::{Error, Result};
use celeritas_engine::{engine_fail, engine_trace, engine_warn};

use crate::gl_api::GlApi;
use crate::opengl_backend::OpenGlBackend;
use crate::opengl_helpers::primitive_topology;
use crate::opengl_surface::GlSurface;

pub struct GlEncoder<'a, S: GlSurface, G: GlApi> {
    backend: &'a mut OpenGlBackend<S, G>,
    recorded: u32,
}

impl<'a, S: GlSurface, G: GlApi> GlEncoder<'a, S, G> {
    pub(crate) fn new(backend: &'a mut OpenGlBackend<S, G>) -> Self {
        Self { backend, recorded: 0 }
    }

    /// Commands encoded so far
    pub fn recorded(&self) -> u32 {
        self.recorded
    }

    fn draw_count(count: u32) -> Result<i32> {
        i32::try_from(count)
            .map_err(|_| Error::InvalidResource(format!("draw of {} elements exceeds GL limits", count)))
    }

    fn bind_uniform_bytes(
        &mut self,
        pipeline: PipelineHandle,
        label: &str,
        bytes: &[u8],
    ) -> Result<()> {
        let backend = &mut *self.backend;
        let record = backend.pipelines.get(pipeline)?;
        let layout = backend.pipeline_layouts.get(record.layout)?;

        let Some(block) = layout.uniform(label) else {
            engine_fail!(
                "celeritas::opengl",
                Error::InvalidResource(format!(
                    "pipeline '{}' has no uniform block '{}'",
                    record.debug_name, label
                ))
            );
        };
        if bytes.len() > block.size {
            engine_fail!(
                "celeritas::opengl",
                Error::InvalidResource(format!(
                    "{} bytes for uniform block '{}' of {} bytes",
                    bytes.len(),
                    label,
                    block.size
                ))
            );
        }
        let buffer = backend.buffers.get(block.buffer)?.id;

        // zero-padded copy in frame memory, uploaded as one block
        let staged = backend.frame_arena.alloc(block.size)?;
        backend.frame_arena.bytes_mut(staged)?[..bytes.len()].copy_from_slice(bytes);
        let staging = backend.frame_arena.bytes(staged)?;

        backend.gl.bind_buffer(gl::UNIFORM_BUFFER, buffer);
        backend.gl.buffer_sub_data(gl::UNIFORM_BUFFER, 0, staging);
        backend.gl.bind_buffer(gl::UNIFORM_BUFFER, 0);
        backend.stats.uniform_bytes += block.size as u64;

        engine_trace!(
            "celeritas::opengl",
            "Uploaded {} bytes to uniform block '{}'",
            block.size,
            label
        );
        Ok(())
    }
}

impl<S: GlSurface, G: GlApi> CmdEncoder for GlEncoder<'_, S, G> {
    fn begin_render(&mut self, renderpass: RenderpassHandle) -> Result<()> {
        let backend = &mut *self.backend;
        let record = backend.renderpasses.get(renderpass)?;
        backend.frame.begin_render(renderpass)?;

        let (width, height) = record
            .extents
            .unwrap_or((backend.dimensions.x, backend.dimensions.y));
        backend.gl.bind_framebuffer(gl::FRAMEBUFFER, record.fbo);
        backend.gl.viewport(0, 0, width as i32, height as i32);

        let mut mask = 0;
        if let Some(colour) = record.desc.clear_colour {
            backend.gl.clear_color(colour);
            mask |= gl::COLOR_BUFFER_BIT;
        }
        if record.desc.clear_depth {
            mask |= gl::DEPTH_BUFFER_BIT;
        }
        if mask != 0 {
            backend.gl.clear(mask);
        }

        engine_trace!("celeritas::opengl", "Begin renderpass '{}'", record.desc.debug_name);
        self.recorded += 1;
        Ok(())
    }

    fn end_render(&mut self) -> Result<()> {
        let backend = &mut *self.backend;
        backend.frame.end_render()?;
        backend.gl.bind_vertex_array(0);
        backend.gl.bind_framebuffer(gl::FRAMEBUFFER, 0);
        self.recorded += 1;
        Ok(())
    }

    fn bind_pipeline(&mut self, pipeline: PipelineHandle) -> Result<()> {
        let backend = &mut *self.backend;
        let record = backend.pipelines.get(pipeline)?;
        let layout = backend.pipeline_layouts.get(record.layout)?;
        backend.frame.bind_pipeline(pipeline)?;

        backend.gl.use_program(record.program);
        let mode = if record.wireframe { gl::LINE } else { gl::FILL };
        backend.gl.polygon_mode(gl::FRONT_AND_BACK, mode);
        if record.depth_test && backend.config.enable_depth_test {
            backend.gl.enable(gl::DEPTH_TEST);
        } else {
            backend.gl.disable(gl::DEPTH_TEST);
        }

        for uniform in &layout.uniforms {
            let buffer = backend.buffers.get(uniform.buffer)?;
            backend.gl.bind_buffer_base(gl::UNIFORM_BUFFER, uniform.binding_point, buffer.id);
        }

        backend.stats.pipeline_binds += 1;
        self.recorded += 1;
        Ok(())
    }

    fn bind_shader_data(&mut self, group: u32, layout: &ShaderDataLayout<'_>) -> Result<()> {
        let pipeline = self.backend.frame.current_pipeline("bind_shader_data")?;
        if group as usize >= MAX_SHADER_DATA_LAYOUTS {
            return Err(Error::InvalidResource(format!(
                "shader data group {} (at most {} per pipeline)",
                group, MAX_SHADER_DATA_LAYOUTS
            )));
        }
        layout.validate()?;

        let first_unit = {
            let backend = &*self.backend;
            let record = backend.pipelines.get(pipeline)?;
            let Some(shape) = backend.pipeline_layouts.get(record.layout)?.group(group) else {
                engine_fail!(
                    "celeritas::opengl",
                    Error::InvalidResource(format!(
                        "pipeline '{}' declares no shader data group {}",
                        record.debug_name, group
                    ))
                );
            };
            if let Err(mismatch) = shape.matches(layout) {
                engine_fail!(
                    "celeritas::opengl",
                    Error::InvalidResource(format!(
                        "pipeline '{}', group {}: {}",
                        record.debug_name, group, mismatch
                    ))
                );
            }
            shape.first_unit
        };

        for (index, binding) in layout.bindings.iter().enumerate() {
            // the layout matches the group shape, so index stays inside the group's units
            let unit = first_unit + index as u32;
            match &binding.kind {
                BindingKind::Bytes { data: Some(bytes), .. } => {
                    self.bind_uniform_bytes(pipeline, binding.label, bytes)?;
                }
                BindingKind::Texture(Some(texture)) => {
                    let backend = &mut *self.backend;
                    let record = backend.pipelines.get(pipeline)?;
                    let texture = backend.textures.get(*texture)?;

                    match backend.gl.uniform_location(record.program, binding.label) {
                        Some(location) => backend.gl.uniform_1i(location, unit as i32),
                        None => engine_warn!(
                            "celeritas::opengl",
                            "'{}': no sampler uniform named '{}'",
                            record.debug_name,
                            binding.label
                        ),
                    }
                    backend.gl.active_texture(unit);
                    backend.gl.bind_texture(texture.target, texture.id);
                }
                BindingKind::Buffer(Some(buffer)) => {
                    let backend = &mut *self.backend;
                    let buffer = backend.buffers.get(*buffer)?;
                    backend.gl.bind_buffer_base(gl::SHADER_STORAGE_BUFFER, unit, buffer.id);
                }
                BindingKind::Sampler(_) => {
                    engine_trace!(
                        "celeritas::opengl",
                        "Sampler '{}' ignored: GL samples through texture state",
                        binding.label
                    );
                }
                other => {
                    return Err(Error::InvalidResource(format!(
                        "{} binding '{}' of '{}' carries no data",
                        other.name(),
                        binding.label,
                        layout.name
                    )));
                }
            }
        }

        self.recorded += 1;
        Ok(())
    }

    fn set_vertex_buffer(&mut self, buffer: BufferHandle) -> Result<()> {
        let backend = &mut *self.backend;
        let pipeline = backend.frame.current_pipeline("set_vertex_buffer")?;
        let record = backend.buffers.get(buffer)?;
        if matches!(record.buffer_type, BufferType::Index | BufferType::Uniform) {
            return Err(Error::InvalidResource(format!(
                "{} is a {} buffer, not vertex data",
                buffer,
                record.buffer_type.name()
            )));
        }
        let vbo = record.id;
        let vertex_desc = &backend.pipelines.get(pipeline)?.vertex_desc;
        backend.frame.set_vertex_buffer(buffer)?;

        let vao = backend.vertex_arrays.get_or_create(&backend.gl, buffer, vbo, vertex_desc);
        backend.gl.bind_vertex_array(vao);

        // the element buffer binding is part of VAO state
        if let Some(index_buffer) = backend.frame.index_buffer() {
            let ebo = backend.buffers.get(index_buffer)?.id;
            backend.gl.bind_buffer(gl::ELEMENT_ARRAY_BUFFER, ebo);
        }

        self.recorded += 1;
        Ok(())
    }

    fn set_index_buffer(&mut self, buffer: BufferHandle) -> Result<()> {
        let backend = &mut *self.backend;
        let record = backend.buffers.get(buffer)?;
        if record.buffer_type != BufferType::Index {
            return Err(Error::InvalidResource(format!(
                "{} is a {} buffer, not an index buffer",
                buffer,
                record.buffer_type.name()
            )));
        }
        backend.frame.set_index_buffer(buffer)?;
        backend.gl.bind_buffer(gl::ELEMENT_ARRAY_BUFFER, record.id);

        self.recorded += 1;
        Ok(())
    }

    fn draw(&mut self, vertex_count: u32) -> Result<()> {
        let backend = &mut *self.backend;
        let pipeline = backend.frame.check_draw(false)?;
        let mode = primitive_topology(backend.pipelines.get(pipeline)?.topology);
        backend.gl.draw_arrays(mode, 0, Self::draw_count(vertex_count)?);

        backend.stats.draw_calls += 1;
        backend.stats.elements += vertex_count as u64;
        self.recorded += 1;
        Ok(())
    }

    fn draw_indexed(&mut self, index_count: u32) -> Result<()> {
        let backend = &mut *self.backend;
        let pipeline = backend.frame.check_draw(true)?;
        let mode = primitive_topology(backend.pipelines.get(pipeline)?.topology);
        backend.gl.draw_elements(mode, Self::draw_count(index_count)?, gl::UNSIGNED_INT);

        backend.stats.draw_calls += 1;
        backend.stats.elements += index_count as u64;
        self.recorded += 1;
        Ok(())
    }

    fn finish(self) -> CmdBuffer {
        CmdBuffer { commands: self.recorded }
    }
}

#[cfg(test)]
#[path = "opengl_cmd_encoder_tests.rs"]
mod tests;

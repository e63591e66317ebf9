/// OpenGlBackend - buffers, textures and renderpasses

use celeritas_engine::celeritas::render::{
    BufferFlags, BufferHandle, BufferType, RenderpassDesc, RenderpassHandle, TextureDesc,
    TextureHandle, TextureType,
};
use celeritas_engine::celeritas::{Error, Result};
use celeritas_engine::{engine_debug, engine_error, engine_fail, engine_trace};
use gl::types::{GLenum, GLint, GLuint};

use crate::gl_api::GlApi;
use crate::opengl_backend::{exhausted, OpenGlBackend};
use crate::opengl_helpers::{
    buffer_target, buffer_usage, texture_formats, texture_target, UPLOAD_TEXTURE_UNIT,
};
use crate::opengl_surface::GlSurface;
use crate::opengl_types::{GlBuffer, GlRenderpass, GlTexture};

impl<S: GlSurface, G: GlApi> OpenGlBackend<S, G> {
    // ===== BUFFERS =====

    pub(crate) fn create_buffer(
        &mut self,
        size: usize,
        buffer_type: BufferType,
        flags: BufferFlags,
        data: Option<&[u8]>,
    ) -> Result<BufferHandle> {
        if let Some(bytes) = data {
            if bytes.len() > size {
                return Err(Error::InvalidResource(format!(
                    "{} bytes of data for a {} byte {} buffer",
                    bytes.len(),
                    size,
                    buffer_type.name()
                )));
            }
        }

        let capacity = self.buffers.capacity();
        let Some((handle, record)) = self.buffers.alloc() else {
            return Err(exhausted("buffer", capacity));
        };

        let usage = buffer_usage(buffer_type, flags);
        let id = self.gl.gen_buffer();

        // Staging target: leaves the bound VAO's element buffer alone
        self.gl.bind_buffer(gl::COPY_WRITE_BUFFER, id);
        match data {
            Some(bytes) if bytes.len() == size => {
                self.gl.buffer_data(gl::COPY_WRITE_BUFFER, size, Some(bytes), usage);
            }
            Some(bytes) => {
                self.gl.buffer_data(gl::COPY_WRITE_BUFFER, size, None, usage);
                self.gl.buffer_sub_data(gl::COPY_WRITE_BUFFER, 0, bytes);
            }
            None => self.gl.buffer_data(gl::COPY_WRITE_BUFFER, size, None, usage),
        }
        self.gl.bind_buffer(gl::COPY_WRITE_BUFFER, 0);

        *record = GlBuffer {
            id,
            target: buffer_target(buffer_type, flags),
            size,
            buffer_type,
            flags,
            ubo_binding_point: None,
            name: None,
        };

        engine_debug!(
            "celeritas::opengl",
            "Created {} buffer {} (GL {}, {} bytes)",
            buffer_type.name(),
            handle,
            id,
            size
        );
        Ok(handle)
    }

    pub(crate) fn upload_buffer(
        &mut self,
        buffer: BufferHandle,
        offset: usize,
        data: &[u8],
    ) -> Result<()> {
        let record = self.buffers.get(buffer)?;
        let fits = offset.checked_add(data.len()).is_some_and(|end| end <= record.size);
        if !fits {
            engine_fail!(
                "celeritas::opengl",
                Error::InvalidResource(format!(
                    "upload of {} bytes at offset {} overflows {} ({} bytes)",
                    data.len(),
                    offset,
                    buffer,
                    record.size
                ))
            );
        }

        self.gl.bind_buffer(gl::COPY_WRITE_BUFFER, record.id);
        self.gl.buffer_sub_data(gl::COPY_WRITE_BUFFER, offset, data);
        self.gl.bind_buffer(gl::COPY_WRITE_BUFFER, 0);
        Ok(())
    }

    pub(crate) fn destroy_buffer(&mut self, buffer: BufferHandle) -> Result<()> {
        if let Some(label) = self.buffers.get(buffer)?.name.as_deref() {
            return Err(Error::InvalidResource(format!(
                "{} backs uniform block '{}'; destroy its pipeline instead",
                buffer, label
            )));
        }

        let record = self.buffers.dealloc(buffer)?;
        self.vertex_arrays.purge_buffer(&self.gl, buffer);
        self.gl.delete_buffer(record.id);
        engine_trace!("celeritas::opengl", "Destroyed buffer {} (GL {})", buffer, record.id);
        Ok(())
    }

    /// Free a pipeline-owned uniform buffer
    pub(crate) fn release_uniform_buffer(&mut self, buffer: BufferHandle) {
        if let Ok(record) = self.buffers.dealloc(buffer) {
            self.gl.delete_buffer(record.id);
        }
    }

    // ===== TEXTURES =====

    pub(crate) fn create_texture(
        &mut self,
        desc: &TextureDesc,
        create_view: bool,
        data: Option<&[u8]>,
    ) -> Result<TextureHandle> {
        desc.validate(data)?;
        if self.textures.is_full() {
            return Err(exhausted("texture", self.textures.capacity()));
        }

        let target = texture_target(desc.tex_type);
        let id = self.gl.gen_texture();
        self.gl.active_texture(UPLOAD_TEXTURE_UNIT);
        self.gl.bind_texture(target, id);
        set_sampling_parameters(&self.gl, target, desc);
        specify_images(&self.gl, target, desc, data);
        self.gl.bind_texture(target, 0);

        if !create_view {
            engine_trace!(
                "celeritas::opengl",
                "'{}': GL textures are always sampleable, view request ignored",
                desc.debug_name
            );
        }

        let texture = GlTexture { id, target, desc: desc.clone() };
        match self.textures.insert(texture) {
            Some(handle) => {
                engine_debug!(
                    "celeritas::opengl",
                    "Created texture '{}' {} (GL {}, {}x{}x{})",
                    desc.debug_name,
                    handle,
                    id,
                    desc.extents.x,
                    desc.extents.y,
                    desc.image_count()
                );
                Ok(handle)
            }
            None => {
                self.gl.delete_texture(id);
                Err(exhausted("texture", self.textures.capacity()))
            }
        }
    }

    pub(crate) fn upload_texture(&mut self, texture: TextureHandle, data: &[u8]) -> Result<()> {
        let record = self.textures.get(texture)?;
        record.desc.validate(Some(data))?;

        self.gl.active_texture(UPLOAD_TEXTURE_UNIT);
        self.gl.bind_texture(record.target, record.id);
        specify_images(&self.gl, record.target, &record.desc, Some(data));
        self.gl.bind_texture(record.target, 0);
        Ok(())
    }

    pub(crate) fn destroy_texture(&mut self, texture: TextureHandle) -> Result<()> {
        let record = self.textures.dealloc(texture)?;
        self.gl.delete_texture(record.id);
        engine_trace!(
            "celeritas::opengl",
            "Destroyed texture '{}' (GL {})",
            record.desc.debug_name,
            record.id
        );
        Ok(())
    }

    // ===== RENDERPASSES =====

    pub(crate) fn create_renderpass(&mut self, desc: &RenderpassDesc) -> Result<RenderpassHandle> {
        if let Err(err) = desc.validate() {
            engine_fail!("celeritas::opengl", err);
        }
        if self.renderpasses.is_full() {
            return Err(exhausted("renderpass", self.renderpasses.capacity()));
        }

        let renderpass = if desc.default_framebuffer {
            GlRenderpass { fbo: 0, desc: desc.clone(), extents: None }
        } else {
            self.create_framebuffer(desc)?
        };

        let fbo = renderpass.fbo;
        match self.renderpasses.insert(renderpass) {
            Some(handle) => {
                engine_debug!(
                    "celeritas::opengl",
                    "Created renderpass '{}' {} (FBO {})",
                    desc.debug_name,
                    handle,
                    fbo
                );
                Ok(handle)
            }
            None => {
                if fbo != 0 {
                    self.gl.delete_framebuffer(fbo);
                }
                Err(exhausted("renderpass", self.renderpasses.capacity()))
            }
        }
    }

    fn create_framebuffer(&mut self, desc: &RenderpassDesc) -> Result<GlRenderpass> {
        let colour = match desc.color_target {
            Some(handle) => Some(self.attachment(desc, handle, false)?),
            None => None,
        };
        let depth = match desc.depth_stencil {
            Some(handle) => Some(self.attachment(desc, handle, true)?),
            None => None,
        };

        let extents = match (colour, depth) {
            (Some(c), Some(d)) if c.extents != d.extents => {
                return Err(Error::InvalidResource(format!(
                    "renderpass '{}': colour target is {}x{} but depth target is {}x{}",
                    desc.debug_name, c.extents.0, c.extents.1, d.extents.0, d.extents.1
                )));
            }
            (Some(c), _) => c.extents,
            (None, Some(d)) => d.extents,
            (None, None) => {
                return Err(Error::InvalidResource(format!(
                    "offscreen renderpass '{}' has no attachments",
                    desc.debug_name
                )));
            }
        };

        let fbo = self.gl.gen_framebuffer();
        self.gl.bind_framebuffer(gl::FRAMEBUFFER, fbo);
        if let Some(c) = colour {
            self.gl.framebuffer_texture_2d(gl::FRAMEBUFFER, gl::COLOR_ATTACHMENT0, c.target, c.id);
        }
        if let Some(d) = depth {
            self.gl.framebuffer_texture_2d(gl::FRAMEBUFFER, gl::DEPTH_ATTACHMENT, d.target, d.id);
        }
        if desc.depth_only() {
            self.gl.draw_buffer(gl::NONE);
            self.gl.read_buffer(gl::NONE);
        }

        let status = self.gl.check_framebuffer_status(gl::FRAMEBUFFER);
        self.gl.bind_framebuffer(gl::FRAMEBUFFER, 0);

        if status != gl::FRAMEBUFFER_COMPLETE {
            self.gl.delete_framebuffer(fbo);
            engine_error!(
                "celeritas::opengl",
                "Framebuffer for '{}' is incomplete (status {:#x})",
                desc.debug_name,
                status
            );
            return Err(Error::InvalidResource(format!(
                "framebuffer for renderpass '{}' is incomplete (status {:#x})",
                desc.debug_name, status
            )));
        }

        Ok(GlRenderpass { fbo, desc: desc.clone(), extents: Some(extents) })
    }

    fn attachment(
        &self,
        desc: &RenderpassDesc,
        texture: TextureHandle,
        depth: bool,
    ) -> Result<Attachment> {
        let record = self.textures.get(texture)?;
        if record.desc.format.is_depth() != depth || record.desc.tex_type != TextureType::Tex2d {
            return Err(Error::InvalidResource(format!(
                "renderpass '{}': texture '{}' cannot be its {} attachment",
                desc.debug_name,
                record.desc.debug_name,
                if depth { "depth" } else { "colour" }
            )));
        }
        Ok(Attachment {
            id: record.id,
            target: record.target,
            extents: (record.desc.extents.x, record.desc.extents.y),
        })
    }

    pub(crate) fn destroy_renderpass(&mut self, renderpass: RenderpassHandle) -> Result<()> {
        let record = self.renderpasses.dealloc(renderpass)?;
        if record.fbo != 0 {
            self.gl.delete_framebuffer(record.fbo);
        }
        engine_trace!("celeritas::opengl", "Destroyed renderpass '{}'", record.desc.debug_name);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
struct Attachment {
    id: GLuint,
    target: GLenum,
    extents: (u32, u32),
}

// ============================================================================
// Texture storage formats
// ============================================================================

fn set_sampling_parameters<G: GlApi>(gl: &G, target: GLenum, desc: &TextureDesc) {
    if desc.format.is_depth() {
        gl.tex_parameter_i(target, gl::TEXTURE_MIN_FILTER, gl::NEAREST as GLint);
        gl.tex_parameter_i(target, gl::TEXTURE_MAG_FILTER, gl::NEAREST as GLint);
        gl.tex_parameter_i(target, gl::TEXTURE_WRAP_S, gl::CLAMP_TO_BORDER as GLint);
        gl.tex_parameter_i(target, gl::TEXTURE_WRAP_T, gl::CLAMP_TO_BORDER as GLint);
        return;
    }

    if desc.tex_type == TextureType::CubeMap {
        gl.tex_parameter_i(target, gl::TEXTURE_WRAP_S, gl::CLAMP_TO_EDGE as GLint);
        gl.tex_parameter_i(target, gl::TEXTURE_WRAP_T, gl::CLAMP_TO_EDGE as GLint);
        gl.tex_parameter_i(target, gl::TEXTURE_WRAP_R, gl::CLAMP_TO_EDGE as GLint);
    } else {
        gl.tex_parameter_i(target, gl::TEXTURE_WRAP_S, gl::REPEAT as GLint);
        gl.tex_parameter_i(target, gl::TEXTURE_WRAP_T, gl::REPEAT as GLint);
    }
    // switched to trilinear once a mip chain exists
    gl.tex_parameter_i(target, gl::TEXTURE_MIN_FILTER, gl::LINEAR as GLint);
    gl.tex_parameter_i(target, gl::TEXTURE_MAG_FILTER, gl::LINEAR as GLint);
}

/// (Re)specify every image of the bound texture. `data` has been validated
/// against `desc`.
fn specify_images<G: GlApi>(gl: &G, target: GLenum, desc: &TextureDesc, data: Option<&[u8]>) {
    let (internal_format, format, data_type) = texture_formats(desc.format);
    let width = desc.extents.x as i32;
    let height = desc.extents.y as i32;

    match desc.tex_type {
        TextureType::Tex2d => {
            gl.tex_image_2d(target, internal_format, width, height, format, data_type, data);
        }
        TextureType::CubeMap => {
            let face_size = desc.byte_size() / 6;
            for face in 0..6usize {
                let face_data = data.and_then(|d| d.get(face * face_size..(face + 1) * face_size));
                gl.tex_image_2d(
                    gl::TEXTURE_CUBE_MAP_POSITIVE_X + face as u32,
                    internal_format,
                    width,
                    height,
                    format,
                    data_type,
                    face_data,
                );
            }
        }
        TextureType::Tex3d | TextureType::Tex2dArray => {
            let depth = desc.image_count() as i32;
            gl.tex_image_3d(target, internal_format, width, height, depth, format, data_type, data);
        }
    }

    if data.is_some() && desc.tex_type == TextureType::Tex2d && !desc.format.is_depth() {
        gl.tex_parameter_i(target, gl::TEXTURE_MIN_FILTER, gl::LINEAR_MIPMAP_LINEAR as GLint);
        gl.generate_mipmap(target);
    }
}

/// The OpenGL entry points the backend uses
///
/// Every native call goes through [`GlApi`]. [`NativeGl`] forwards to the
/// `gl` crate's loaded function pointers; the headless recorder implements
/// the same trait for tests and tooling.

use std::ffi::{c_void, CString};
use std::marker::PhantomData;

use celeritas_engine::celeritas::{Error, Result};
use celeritas_engine::engine_error;
use gl::types::{GLbitfield, GLboolean, GLchar, GLenum, GLint, GLintptr, GLsizei, GLsizeiptr, GLuint};

/// Thin, safe surface over the GL functions the backend calls.
///
/// Object-creating calls return the new name; queries that can come back
/// empty (uniform block index, uniform location) return `None` instead of
/// the GL sentinel value.
pub trait GlApi {
    // ===== STATE =====
    fn enable(&self, cap: GLenum);
    fn disable(&self, cap: GLenum);
    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    fn clear_color(&self, rgba: [f32; 4]);
    fn clear(&self, mask: GLbitfield);
    fn polygon_mode(&self, face: GLenum, mode: GLenum);

    // ===== BUFFERS =====
    fn gen_buffer(&self) -> GLuint;
    fn bind_buffer(&self, target: GLenum, buffer: GLuint);
    /// Allocate `size` bytes, optionally initialised from `data`
    fn buffer_data(&self, target: GLenum, size: usize, data: Option<&[u8]>, usage: GLenum);
    fn buffer_sub_data(&self, target: GLenum, offset: usize, data: &[u8]);
    fn bind_buffer_base(&self, target: GLenum, index: u32, buffer: GLuint);
    fn delete_buffer(&self, buffer: GLuint);

    // ===== TEXTURES =====
    fn gen_texture(&self) -> GLuint;
    fn bind_texture(&self, target: GLenum, texture: GLuint);
    /// Select texture unit `unit` (offset from `TEXTURE0`)
    fn active_texture(&self, unit: u32);
    #[allow(clippy::too_many_arguments)]
    fn tex_image_2d(
        &self,
        target: GLenum,
        internal_format: GLint,
        width: i32,
        height: i32,
        format: GLenum,
        data_type: GLenum,
        data: Option<&[u8]>,
    );
    #[allow(clippy::too_many_arguments)]
    fn tex_image_3d(
        &self,
        target: GLenum,
        internal_format: GLint,
        width: i32,
        height: i32,
        depth: i32,
        format: GLenum,
        data_type: GLenum,
        data: Option<&[u8]>,
    );
    fn tex_parameter_i(&self, target: GLenum, pname: GLenum, param: GLint);
    fn generate_mipmap(&self, target: GLenum);
    fn delete_texture(&self, texture: GLuint);

    // ===== FRAMEBUFFERS =====
    fn gen_framebuffer(&self) -> GLuint;
    fn bind_framebuffer(&self, target: GLenum, framebuffer: GLuint);
    fn framebuffer_texture_2d(&self, target: GLenum, attachment: GLenum, tex_target: GLenum, texture: GLuint);
    fn draw_buffer(&self, mode: GLenum);
    fn read_buffer(&self, mode: GLenum);
    fn check_framebuffer_status(&self, target: GLenum) -> GLenum;
    fn delete_framebuffer(&self, framebuffer: GLuint);

    // ===== SHADERS AND PROGRAMS =====
    fn create_shader(&self, kind: GLenum) -> GLuint;
    fn shader_source(&self, shader: GLuint, source: &str);
    fn compile_shader(&self, shader: GLuint);
    fn shader_compiled(&self, shader: GLuint) -> bool;
    fn shader_info_log(&self, shader: GLuint) -> String;
    fn delete_shader(&self, shader: GLuint);
    fn create_program(&self) -> GLuint;
    fn attach_shader(&self, program: GLuint, shader: GLuint);
    fn link_program(&self, program: GLuint);
    fn program_linked(&self, program: GLuint) -> bool;
    fn program_info_log(&self, program: GLuint) -> String;
    fn use_program(&self, program: GLuint);
    fn delete_program(&self, program: GLuint);

    // ===== UNIFORMS =====
    fn uniform_block_index(&self, program: GLuint, name: &str) -> Option<GLuint>;
    fn uniform_block_binding(&self, program: GLuint, block: GLuint, binding: u32);
    fn uniform_location(&self, program: GLuint, name: &str) -> Option<GLint>;
    fn uniform_1i(&self, location: GLint, value: i32);

    // ===== VERTEX ARRAYS =====
    fn gen_vertex_array(&self) -> GLuint;
    fn bind_vertex_array(&self, vao: GLuint);
    fn enable_vertex_attrib_array(&self, index: u32);
    fn vertex_attrib_pointer(&self, index: u32, size: i32, data_type: GLenum, stride: i32, offset: usize);
    /// Integer attribute, delivered to the shader without conversion
    fn vertex_attrib_i_pointer(&self, index: u32, size: i32, data_type: GLenum, stride: i32, offset: usize);
    fn delete_vertex_array(&self, vao: GLuint);

    // ===== DRAWING =====
    fn draw_arrays(&self, mode: GLenum, first: i32, count: i32);
    /// Indexed draw reading `count` indices of `index_type` from offset 0
    fn draw_elements(&self, mode: GLenum, count: i32, index_type: GLenum);
}

// ============================================================================
// Native implementation
// ============================================================================

/// Forwards to the process-wide function pointers loaded by [`NativeGl::load`].
///
/// Only valid on the thread that owns the current GL context, hence `!Send`.
pub struct NativeGl {
    _context_thread: PhantomData<*const ()>,
}

impl NativeGl {
    /// Load every GL function pointer through `loader` (usually the
    /// windowing library's `get_proc_address`).
    ///
    /// # Errors
    ///
    /// `InitializationFailed` if core entry points could not be resolved.
    pub fn load<F>(loader: F) -> Result<Self>
    where
        F: FnMut(&'static str) -> *const c_void,
    {
        gl::load_with(loader);

        if !gl::Viewport::is_loaded() || !gl::CreateProgram::is_loaded() || !gl::GenVertexArrays::is_loaded() {
            engine_error!("celeritas::opengl", "Failed to load OpenGL function pointers");
            return Err(Error::InitializationFailed(
                "OpenGL function pointers could not be loaded".to_string(),
            ));
        }

        Ok(Self { _context_thread: PhantomData })
    }
}

fn data_ptr(data: Option<&[u8]>) -> *const c_void {
    data.map_or(std::ptr::null(), |bytes| bytes.as_ptr() as *const c_void)
}

/// Bytes GL reads for one image with the default unpack alignment of 4.
/// `None` for formats and types the backend never uploads.
pub(crate) fn image_bytes(
    width: i32,
    height: i32,
    depth: i32,
    format: GLenum,
    data_type: GLenum,
) -> Option<usize> {
    let components = match format {
        gl::RED | gl::DEPTH_COMPONENT | gl::RED_INTEGER => 1,
        gl::RG | gl::RG_INTEGER => 2,
        gl::RGB | gl::BGR | gl::RGB_INTEGER => 3,
        gl::RGBA | gl::BGRA | gl::RGBA_INTEGER => 4,
        _ => return None,
    };
    let component_size = match data_type {
        gl::UNSIGNED_BYTE | gl::BYTE => 1,
        gl::UNSIGNED_SHORT | gl::SHORT | gl::HALF_FLOAT => 2,
        gl::UNSIGNED_INT | gl::INT | gl::FLOAT => 4,
        _ => return None,
    };
    let (width, height, depth) = (
        usize::try_from(width).ok()?,
        usize::try_from(height).ok()?,
        usize::try_from(depth).ok()?,
    );
    let row = width.checked_mul(components * component_size)?.checked_next_multiple_of(4)?;
    row.checked_mul(height)?.checked_mul(depth)
}

/// `data` when it covers the whole image, `None` (storage only) otherwise
fn checked_image<'a>(
    data: Option<&'a [u8]>,
    dims: (i32, i32, i32),
    format: GLenum,
    data_type: GLenum,
) -> Option<&'a [u8]> {
    let bytes = data?;
    match image_bytes(dims.0, dims.1, dims.2, format, data_type) {
        Some(needed) if bytes.len() >= needed => Some(bytes),
        needed => {
            engine_error!(
                "celeritas::opengl",
                "Texture data of {} bytes does not cover a {}x{}x{} image ({:?} bytes needed), uploading none",
                bytes.len(),
                dims.0,
                dims.1,
                dims.2,
                needed
            );
            None
        }
    }
}

fn info_log(length: GLint, read: impl FnOnce(GLsizei, *mut GLsizei, *mut GLchar)) -> String {
    let mut buffer = vec![0u8; length.max(1) as usize];
    let mut written: GLsizei = 0;
    read(buffer.len() as GLsizei, &mut written, buffer.as_mut_ptr() as *mut GLchar);
    buffer.truncate(written.max(0) as usize);
    String::from_utf8_lossy(&buffer).into_owned()
}

impl GlApi for NativeGl {
    fn enable(&self, cap: GLenum) {
        unsafe { gl::Enable(cap) }
    }

    fn disable(&self, cap: GLenum) {
        unsafe { gl::Disable(cap) }
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { gl::Viewport(x, y, width, height) }
    }

    fn clear_color(&self, rgba: [f32; 4]) {
        unsafe { gl::ClearColor(rgba[0], rgba[1], rgba[2], rgba[3]) }
    }

    fn clear(&self, mask: GLbitfield) {
        unsafe { gl::Clear(mask) }
    }

    fn polygon_mode(&self, face: GLenum, mode: GLenum) {
        unsafe { gl::PolygonMode(face, mode) }
    }

    fn gen_buffer(&self) -> GLuint {
        let mut buffer = 0;
        unsafe { gl::GenBuffers(1, &mut buffer) };
        buffer
    }

    fn bind_buffer(&self, target: GLenum, buffer: GLuint) {
        unsafe { gl::BindBuffer(target, buffer) }
    }

    fn buffer_data(&self, target: GLenum, size: usize, data: Option<&[u8]>, usage: GLenum) {
        // a shorter payload would make GL read past its end
        let data = data.filter(|bytes| bytes.len() >= size);
        unsafe { gl::BufferData(target, size as GLsizeiptr, data_ptr(data), usage) }
    }

    fn buffer_sub_data(&self, target: GLenum, offset: usize, data: &[u8]) {
        unsafe {
            gl::BufferSubData(
                target,
                offset as GLintptr,
                data.len() as GLsizeiptr,
                data.as_ptr() as *const c_void,
            )
        }
    }

    fn bind_buffer_base(&self, target: GLenum, index: u32, buffer: GLuint) {
        unsafe { gl::BindBufferBase(target, index, buffer) }
    }

    fn delete_buffer(&self, buffer: GLuint) {
        unsafe { gl::DeleteBuffers(1, &buffer) }
    }

    fn gen_texture(&self) -> GLuint {
        let mut texture = 0;
        unsafe { gl::GenTextures(1, &mut texture) };
        texture
    }

    fn bind_texture(&self, target: GLenum, texture: GLuint) {
        unsafe { gl::BindTexture(target, texture) }
    }

    fn active_texture(&self, unit: u32) {
        unsafe { gl::ActiveTexture(gl::TEXTURE0 + unit) }
    }

    fn tex_image_2d(
        &self,
        target: GLenum,
        internal_format: GLint,
        width: i32,
        height: i32,
        format: GLenum,
        data_type: GLenum,
        data: Option<&[u8]>,
    ) {
        let data = checked_image(data, (width, height, 1), format, data_type);
        unsafe {
            gl::TexImage2D(target, 0, internal_format, width, height, 0, format, data_type, data_ptr(data))
        }
    }

    fn tex_image_3d(
        &self,
        target: GLenum,
        internal_format: GLint,
        width: i32,
        height: i32,
        depth: i32,
        format: GLenum,
        data_type: GLenum,
        data: Option<&[u8]>,
    ) {
        let data = checked_image(data, (width, height, depth), format, data_type);
        unsafe {
            gl::TexImage3D(
                target,
                0,
                internal_format,
                width,
                height,
                depth,
                0,
                format,
                data_type,
                data_ptr(data),
            )
        }
    }

    fn tex_parameter_i(&self, target: GLenum, pname: GLenum, param: GLint) {
        unsafe { gl::TexParameteri(target, pname, param) }
    }

    fn generate_mipmap(&self, target: GLenum) {
        unsafe { gl::GenerateMipmap(target) }
    }

    fn delete_texture(&self, texture: GLuint) {
        unsafe { gl::DeleteTextures(1, &texture) }
    }

    fn gen_framebuffer(&self) -> GLuint {
        let mut framebuffer = 0;
        unsafe { gl::GenFramebuffers(1, &mut framebuffer) };
        framebuffer
    }

    fn bind_framebuffer(&self, target: GLenum, framebuffer: GLuint) {
        unsafe { gl::BindFramebuffer(target, framebuffer) }
    }

    fn framebuffer_texture_2d(&self, target: GLenum, attachment: GLenum, tex_target: GLenum, texture: GLuint) {
        unsafe { gl::FramebufferTexture2D(target, attachment, tex_target, texture, 0) }
    }

    fn draw_buffer(&self, mode: GLenum) {
        unsafe { gl::DrawBuffer(mode) }
    }

    fn read_buffer(&self, mode: GLenum) {
        unsafe { gl::ReadBuffer(mode) }
    }

    fn check_framebuffer_status(&self, target: GLenum) -> GLenum {
        unsafe { gl::CheckFramebufferStatus(target) }
    }

    fn delete_framebuffer(&self, framebuffer: GLuint) {
        unsafe { gl::DeleteFramebuffers(1, &framebuffer) }
    }

    fn create_shader(&self, kind: GLenum) -> GLuint {
        unsafe { gl::CreateShader(kind) }
    }

    fn shader_source(&self, shader: GLuint, source: &str) {
        let pointer = source.as_ptr() as *const GLchar;
        let length = source.len() as GLint;
        unsafe { gl::ShaderSource(shader, 1, &pointer, &length) }
    }

    fn compile_shader(&self, shader: GLuint) {
        unsafe { gl::CompileShader(shader) }
    }

    fn shader_compiled(&self, shader: GLuint) -> bool {
        let mut status = 0;
        unsafe { gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut status) };
        status == gl::TRUE as GLint
    }

    fn shader_info_log(&self, shader: GLuint) -> String {
        let mut length = 0;
        unsafe { gl::GetShaderiv(shader, gl::INFO_LOG_LENGTH, &mut length) };
        info_log(length, |size, written, buffer| unsafe {
            gl::GetShaderInfoLog(shader, size, written, buffer)
        })
    }

    fn delete_shader(&self, shader: GLuint) {
        unsafe { gl::DeleteShader(shader) }
    }

    fn create_program(&self) -> GLuint {
        unsafe { gl::CreateProgram() }
    }

    fn attach_shader(&self, program: GLuint, shader: GLuint) {
        unsafe { gl::AttachShader(program, shader) }
    }

    fn link_program(&self, program: GLuint) {
        unsafe { gl::LinkProgram(program) }
    }

    fn program_linked(&self, program: GLuint) -> bool {
        let mut status = 0;
        unsafe { gl::GetProgramiv(program, gl::LINK_STATUS, &mut status) };
        status == gl::TRUE as GLint
    }

    fn program_info_log(&self, program: GLuint) -> String {
        let mut length = 0;
        unsafe { gl::GetProgramiv(program, gl::INFO_LOG_LENGTH, &mut length) };
        info_log(length, |size, written, buffer| unsafe {
            gl::GetProgramInfoLog(program, size, written, buffer)
        })
    }

    fn use_program(&self, program: GLuint) {
        unsafe { gl::UseProgram(program) }
    }

    fn delete_program(&self, program: GLuint) {
        unsafe { gl::DeleteProgram(program) }
    }

    fn uniform_block_index(&self, program: GLuint, name: &str) -> Option<GLuint> {
        let name = CString::new(name).ok()?;
        let index = unsafe { gl::GetUniformBlockIndex(program, name.as_ptr()) };
        (index != gl::INVALID_INDEX).then_some(index)
    }

    fn uniform_block_binding(&self, program: GLuint, block: GLuint, binding: u32) {
        unsafe { gl::UniformBlockBinding(program, block, binding) }
    }

    fn uniform_location(&self, program: GLuint, name: &str) -> Option<GLint> {
        let name = CString::new(name).ok()?;
        let location = unsafe { gl::GetUniformLocation(program, name.as_ptr()) };
        (location >= 0).then_some(location)
    }

    fn uniform_1i(&self, location: GLint, value: i32) {
        unsafe { gl::Uniform1i(location, value) }
    }

    fn gen_vertex_array(&self) -> GLuint {
        let mut vao = 0;
        unsafe { gl::GenVertexArrays(1, &mut vao) };
        vao
    }

    fn bind_vertex_array(&self, vao: GLuint) {
        unsafe { gl::BindVertexArray(vao) }
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        unsafe { gl::EnableVertexAttribArray(index) }
    }

    fn vertex_attrib_pointer(&self, index: u32, size: i32, data_type: GLenum, stride: i32, offset: usize) {
        unsafe {
            gl::VertexAttribPointer(
                index,
                size,
                data_type,
                gl::FALSE as GLboolean,
                stride,
                offset as *const c_void,
            )
        }
    }

    fn vertex_attrib_i_pointer(&self, index: u32, size: i32, data_type: GLenum, stride: i32, offset: usize) {
        unsafe { gl::VertexAttribIPointer(index, size, data_type, stride, offset as *const c_void) }
    }

    fn delete_vertex_array(&self, vao: GLuint) {
        unsafe { gl::DeleteVertexArrays(1, &vao) }
    }

    fn draw_arrays(&self, mode: GLenum, first: i32, count: i32) {
        unsafe { gl::DrawArrays(mode, first, count) }
    }

    fn draw_elements(&self, mode: GLenum, count: i32, index_type: GLenum) {
        unsafe { gl::DrawElements(mode, count, index_type, std::ptr::null()) }
    }
}

#[cfg(test)]
#[path = "gl_api_tests.rs"]
mod tests;

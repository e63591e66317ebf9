//! Headless GL: a recording [`GlApi`] and a window-less [`GlSurface`].
//!
//! Lets the backend run without a driver, for tests and for tools that want
//! to inspect the exact GL stream a frame produces.
//!
//! ```
//! use celeritas_engine_renderer_opengl::headless::{GlCall, HeadlessSurface, RecordingGl};
//! use celeritas_engine_renderer_opengl::OpenGlBackend;
//! use celeritas_engine::celeritas::render::BackendConfig;
//!
//! let backend = OpenGlBackend::with_api(
//!     HeadlessSurface::new(640, 480),
//!     RecordingGl::new(),
//!     BackendConfig::default(),
//! )?;
//! assert!(backend.gl().calls().contains(&GlCall::Enable(gl::DEPTH_TEST)));
//! # Ok::<(), celeritas_engine::celeritas::Error>(())
//! ```

use std::cell::{Cell, RefCell};
use std::ffi::c_void;

use celeritas_engine::celeritas::{Error, Result};
use gl::types::{GLbitfield, GLenum, GLint, GLuint};

use crate::gl_api::GlApi;
use crate::opengl_surface::GlSurface;

/// One recorded GL call. Queries are answered but not recorded.
#[derive(Debug, Clone, PartialEq)]
pub enum GlCall {
    Enable(GLenum),
    Disable(GLenum),
    Viewport(i32, i32, i32, i32),
    ClearColor([f32; 4]),
    Clear(GLbitfield),
    PolygonMode(GLenum, GLenum),

    GenBuffer(GLuint),
    BindBuffer(GLenum, GLuint),
    BufferData { target: GLenum, size: usize, data: Option<Vec<u8>>, usage: GLenum },
    BufferSubData { target: GLenum, offset: usize, data: Vec<u8> },
    BindBufferBase(GLenum, u32, GLuint),
    DeleteBuffer(GLuint),

    GenTexture(GLuint),
    BindTexture(GLenum, GLuint),
    ActiveTexture(u32),
    TexImage2d { target: GLenum, internal_format: GLint, width: i32, height: i32, has_data: bool },
    TexImage3d { target: GLenum, internal_format: GLint, width: i32, height: i32, depth: i32, has_data: bool },
    TexParameter(GLenum, GLenum, GLint),
    GenerateMipmap(GLenum),
    DeleteTexture(GLuint),

    GenFramebuffer(GLuint),
    BindFramebuffer(GLenum, GLuint),
    FramebufferTexture2d { attachment: GLenum, tex_target: GLenum, texture: GLuint },
    DrawBuffer(GLenum),
    ReadBuffer(GLenum),
    DeleteFramebuffer(GLuint),

    CreateShader(GLenum, GLuint),
    CompileShader(GLuint),
    DeleteShader(GLuint),
    CreateProgram(GLuint),
    AttachShader(GLuint, GLuint),
    LinkProgram(GLuint),
    UseProgram(GLuint),
    DeleteProgram(GLuint),

    UniformBlockBinding { program: GLuint, block: GLuint, binding: u32 },
    Uniform1i(GLint, i32),

    GenVertexArray(GLuint),
    BindVertexArray(GLuint),
    EnableVertexAttribArray(u32),
    VertexAttribPointer { index: u32, size: i32, data_type: GLenum, stride: i32, offset: usize },
    VertexAttribIPointer { index: u32, size: i32, data_type: GLenum, stride: i32, offset: usize },
    DeleteVertexArray(GLuint),

    DrawArrays { mode: GLenum, first: i32, count: i32 },
    DrawElements { mode: GLenum, count: i32, index_type: GLenum },
}

/// [`GlApi`] that records every call instead of talking to a driver.
///
/// Object names are handed out from one increasing counter starting at 1.
/// Uniform blocks and uniforms are found for every name except those
/// registered with [`RecordingGl::hide_uniform`]; block indices and
/// locations are assigned in lookup order.
#[derive(Debug)]
pub struct RecordingGl {
    calls: RefCell<Vec<GlCall>>,
    next_name: Cell<GLuint>,
    uniform_names: RefCell<Vec<String>>,
    hidden_uniforms: RefCell<Vec<String>>,
    compile_error: RefCell<Option<String>>,
    link_error: RefCell<Option<String>>,
    framebuffer_status: Cell<GLenum>,
}

impl Default for RecordingGl {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingGl {
    pub fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            next_name: Cell::new(1),
            uniform_names: RefCell::new(Vec::new()),
            hidden_uniforms: RefCell::new(Vec::new()),
            compile_error: RefCell::new(None),
            link_error: RefCell::new(None),
            framebuffer_status: Cell::new(gl::FRAMEBUFFER_COMPLETE),
        }
    }

    /// Every call recorded so far
    pub fn calls(&self) -> Vec<GlCall> {
        self.calls.borrow().clone()
    }

    /// Number of recorded calls matching `predicate`
    pub fn count(&self, predicate: impl Fn(&GlCall) -> bool) -> usize {
        self.calls.borrow().iter().filter(|call| predicate(call)).count()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    /// Make uniform block / uniform lookups of `name` fail
    pub fn hide_uniform(&self, name: &str) {
        self.hidden_uniforms.borrow_mut().push(name.to_string());
    }

    /// The next shader compile reports failure with `log`
    pub fn fail_next_compile(&self, log: &str) {
        *self.compile_error.borrow_mut() = Some(log.to_string());
    }

    /// The next program link reports failure with `log`
    pub fn fail_next_link(&self, log: &str) {
        *self.link_error.borrow_mut() = Some(log.to_string());
    }

    /// Status returned by `check_framebuffer_status`
    pub fn set_framebuffer_status(&self, status: GLenum) {
        self.framebuffer_status.set(status);
    }

    fn record(&self, call: GlCall) {
        self.calls.borrow_mut().push(call);
    }

    fn name(&self) -> GLuint {
        let name = self.next_name.get();
        self.next_name.set(name + 1);
        name
    }

    fn lookup(&self, name: &str) -> Option<usize> {
        if self.hidden_uniforms.borrow().iter().any(|hidden| hidden == name) {
            return None;
        }
        let mut names = self.uniform_names.borrow_mut();
        match names.iter().position(|known| known == name) {
            Some(index) => Some(index),
            None => {
                names.push(name.to_string());
                Some(names.len() - 1)
            }
        }
    }
}

impl GlApi for RecordingGl {
    fn enable(&self, cap: GLenum) {
        self.record(GlCall::Enable(cap));
    }

    fn disable(&self, cap: GLenum) {
        self.record(GlCall::Disable(cap));
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.record(GlCall::Viewport(x, y, width, height));
    }

    fn clear_color(&self, rgba: [f32; 4]) {
        self.record(GlCall::ClearColor(rgba));
    }

    fn clear(&self, mask: GLbitfield) {
        self.record(GlCall::Clear(mask));
    }

    fn polygon_mode(&self, face: GLenum, mode: GLenum) {
        self.record(GlCall::PolygonMode(face, mode));
    }

    fn gen_buffer(&self) -> GLuint {
        let name = self.name();
        self.record(GlCall::GenBuffer(name));
        name
    }

    fn bind_buffer(&self, target: GLenum, buffer: GLuint) {
        self.record(GlCall::BindBuffer(target, buffer));
    }

    fn buffer_data(&self, target: GLenum, size: usize, data: Option<&[u8]>, usage: GLenum) {
        self.record(GlCall::BufferData { target, size, data: data.map(<[u8]>::to_vec), usage });
    }

    fn buffer_sub_data(&self, target: GLenum, offset: usize, data: &[u8]) {
        self.record(GlCall::BufferSubData { target, offset, data: data.to_vec() });
    }

    fn bind_buffer_base(&self, target: GLenum, index: u32, buffer: GLuint) {
        self.record(GlCall::BindBufferBase(target, index, buffer));
    }

    fn delete_buffer(&self, buffer: GLuint) {
        self.record(GlCall::DeleteBuffer(buffer));
    }

    fn gen_texture(&self) -> GLuint {
        let name = self.name();
        self.record(GlCall::GenTexture(name));
        name
    }

    fn bind_texture(&self, target: GLenum, texture: GLuint) {
        self.record(GlCall::BindTexture(target, texture));
    }

    fn active_texture(&self, unit: u32) {
        self.record(GlCall::ActiveTexture(unit));
    }

    fn tex_image_2d(
        &self,
        target: GLenum,
        internal_format: GLint,
        width: i32,
        height: i32,
        _format: GLenum,
        _data_type: GLenum,
        data: Option<&[u8]>,
    ) {
        self.record(GlCall::TexImage2d { target, internal_format, width, height, has_data: data.is_some() });
    }

    fn tex_image_3d(
        &self,
        target: GLenum,
        internal_format: GLint,
        width: i32,
        height: i32,
        depth: i32,
        _format: GLenum,
        _data_type: GLenum,
        data: Option<&[u8]>,
    ) {
        self.record(GlCall::TexImage3d {
            target,
            internal_format,
            width,
            height,
            depth,
            has_data: data.is_some(),
        });
    }

    fn tex_parameter_i(&self, target: GLenum, pname: GLenum, param: GLint) {
        self.record(GlCall::TexParameter(target, pname, param));
    }

    fn generate_mipmap(&self, target: GLenum) {
        self.record(GlCall::GenerateMipmap(target));
    }

    fn delete_texture(&self, texture: GLuint) {
        self.record(GlCall::DeleteTexture(texture));
    }

    fn gen_framebuffer(&self) -> GLuint {
        let name = self.name();
        self.record(GlCall::GenFramebuffer(name));
        name
    }

    fn bind_framebuffer(&self, target: GLenum, framebuffer: GLuint) {
        self.record(GlCall::BindFramebuffer(target, framebuffer));
    }

    fn framebuffer_texture_2d(&self, _target: GLenum, attachment: GLenum, tex_target: GLenum, texture: GLuint) {
        self.record(GlCall::FramebufferTexture2d { attachment, tex_target, texture });
    }

    fn draw_buffer(&self, mode: GLenum) {
        self.record(GlCall::DrawBuffer(mode));
    }

    fn read_buffer(&self, mode: GLenum) {
        self.record(GlCall::ReadBuffer(mode));
    }

    fn check_framebuffer_status(&self, _target: GLenum) -> GLenum {
        self.framebuffer_status.get()
    }

    fn delete_framebuffer(&self, framebuffer: GLuint) {
        self.record(GlCall::DeleteFramebuffer(framebuffer));
    }

    fn create_shader(&self, kind: GLenum) -> GLuint {
        let name = self.name();
        self.record(GlCall::CreateShader(kind, name));
        name
    }

    fn shader_source(&self, _shader: GLuint, _source: &str) {}

    fn compile_shader(&self, shader: GLuint) {
        self.record(GlCall::CompileShader(shader));
    }

    fn shader_compiled(&self, _shader: GLuint) -> bool {
        self.compile_error.borrow().is_none()
    }

    fn shader_info_log(&self, _shader: GLuint) -> String {
        self.compile_error.borrow_mut().take().unwrap_or_default()
    }

    fn delete_shader(&self, shader: GLuint) {
        self.record(GlCall::DeleteShader(shader));
    }

    fn create_program(&self) -> GLuint {
        let name = self.name();
        self.record(GlCall::CreateProgram(name));
        name
    }

    fn attach_shader(&self, program: GLuint, shader: GLuint) {
        self.record(GlCall::AttachShader(program, shader));
    }

    fn link_program(&self, program: GLuint) {
        self.record(GlCall::LinkProgram(program));
    }

    fn program_linked(&self, _program: GLuint) -> bool {
        self.link_error.borrow().is_none()
    }

    fn program_info_log(&self, _program: GLuint) -> String {
        self.link_error.borrow_mut().take().unwrap_or_default()
    }

    fn use_program(&self, program: GLuint) {
        self.record(GlCall::UseProgram(program));
    }

    fn delete_program(&self, program: GLuint) {
        self.record(GlCall::DeleteProgram(program));
    }

    fn uniform_block_index(&self, _program: GLuint, name: &str) -> Option<GLuint> {
        self.lookup(name).map(|index| index as GLuint)
    }

    fn uniform_block_binding(&self, program: GLuint, block: GLuint, binding: u32) {
        self.record(GlCall::UniformBlockBinding { program, block, binding });
    }

    fn uniform_location(&self, _program: GLuint, name: &str) -> Option<GLint> {
        self.lookup(name).map(|index| index as GLint)
    }

    fn uniform_1i(&self, location: GLint, value: i32) {
        self.record(GlCall::Uniform1i(location, value));
    }

    fn gen_vertex_array(&self) -> GLuint {
        let name = self.name();
        self.record(GlCall::GenVertexArray(name));
        name
    }

    fn bind_vertex_array(&self, vao: GLuint) {
        self.record(GlCall::BindVertexArray(vao));
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        self.record(GlCall::EnableVertexAttribArray(index));
    }

    fn vertex_attrib_pointer(&self, index: u32, size: i32, data_type: GLenum, stride: i32, offset: usize) {
        self.record(GlCall::VertexAttribPointer { index, size, data_type, stride, offset });
    }

    fn vertex_attrib_i_pointer(&self, index: u32, size: i32, data_type: GLenum, stride: i32, offset: usize) {
        self.record(GlCall::VertexAttribIPointer { index, size, data_type, stride, offset });
    }

    fn delete_vertex_array(&self, vao: GLuint) {
        self.record(GlCall::DeleteVertexArray(vao));
    }

    fn draw_arrays(&self, mode: GLenum, first: i32, count: i32) {
        self.record(GlCall::DrawArrays { mode, first, count });
    }

    fn draw_elements(&self, mode: GLenum, count: i32, index_type: GLenum) {
        self.record(GlCall::DrawElements { mode, count, index_type });
    }
}

// ============================================================================
// Headless surface
// ============================================================================

/// Surface with a settable framebuffer size and a swap counter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlessSurface {
    pub width: u32,
    pub height: u32,
    pub swaps: u32,
    /// When set, `swap_buffers` fails with `BackendError`
    pub fail_swap: bool,
}

impl HeadlessSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, swaps: 0, fail_swap: false }
    }
}

impl GlSurface for HeadlessSurface {
    fn get_proc_address(&self, _symbol: &str) -> *const c_void {
        std::ptr::null()
    }

    fn swap_buffers(&mut self) -> Result<()> {
        if self.fail_swap {
            return Err(Error::BackendError("headless surface refused to swap".to_string()));
        }
        self.swaps += 1;
        Ok(())
    }

    fn framebuffer_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Conversions from RAL descriptions to GL enums, and program building

use celeritas_engine::celeritas::render::{
    BufferFlags, BufferType, PrimitiveTopology, ShaderDesc, TextureFormat, TextureType,
    VertexAttribType, VertexScalar, MAX_LAYOUT_BINDINGS, MAX_SHADER_DATA_LAYOUTS,
};
use celeritas_engine::celeritas::{Error, Result};
use celeritas_engine::{engine_debug, engine_error};
use gl::types::{GLenum, GLint, GLuint};

use crate::gl_api::GlApi;

/// Texture unit used for texture creation and uploads. Shader data never
/// reaches it, so uploads leave sampled bindings alone.
pub(crate) const UPLOAD_TEXTURE_UNIT: u32 = (MAX_SHADER_DATA_LAYOUTS * MAX_LAYOUT_BINDINGS) as u32;

/// Component count and GL type of a vertex attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct GlVertexAttr {
    pub count: i32,
    pub data_type: GLenum,
    /// Fed through `glVertexAttribIPointer`
    pub integer: bool,
}

pub(crate) fn vertex_attrib_format(attr: VertexAttribType) -> GlVertexAttr {
    let (data_type, integer) = match attr.scalar() {
        VertexScalar::F32 => (gl::FLOAT, false),
        VertexScalar::U32 => (gl::UNSIGNED_INT, true),
        VertexScalar::I32 => (gl::INT, true),
    };
    GlVertexAttr { count: attr.components() as i32, data_type, integer }
}

pub(crate) fn texture_target(tex_type: TextureType) -> GLenum {
    match tex_type {
        TextureType::Tex2d => gl::TEXTURE_2D,
        TextureType::Tex3d => gl::TEXTURE_3D,
        TextureType::Tex2dArray => gl::TEXTURE_2D_ARRAY,
        TextureType::CubeMap => gl::TEXTURE_CUBE_MAP,
    }
}

pub(crate) fn primitive_topology(topology: PrimitiveTopology) -> GLenum {
    match topology {
        PrimitiveTopology::Point => gl::POINTS,
        PrimitiveTopology::Line => gl::LINES,
        PrimitiveTopology::LineStrip => gl::LINE_STRIP,
        PrimitiveTopology::Triangle => gl::TRIANGLES,
        PrimitiveTopology::TriangleStrip => gl::TRIANGLE_STRIP,
    }
}

/// Target a buffer is bound to when used for drawing or shading
pub(crate) fn buffer_target(buffer_type: BufferType, flags: BufferFlags) -> GLenum {
    match buffer_type {
        BufferType::Default if flags.contains(BufferFlags::STORAGE) => gl::SHADER_STORAGE_BUFFER,
        BufferType::Default | BufferType::Vertex => gl::ARRAY_BUFFER,
        BufferType::Index => gl::ELEMENT_ARRAY_BUFFER,
        BufferType::Uniform => gl::UNIFORM_BUFFER,
    }
}

pub(crate) fn buffer_usage(buffer_type: BufferType, flags: BufferFlags) -> GLenum {
    if buffer_type == BufferType::Uniform || flags.contains(BufferFlags::CPU) {
        gl::DYNAMIC_DRAW
    } else {
        gl::STATIC_DRAW
    }
}

/// `(internal format, pixel format, pixel type)` for `glTexImage*`
pub(crate) fn texture_formats(format: TextureFormat) -> (GLint, GLenum, GLenum) {
    match format {
        TextureFormat::Rgba8Unorm => (gl::RGBA as GLint, gl::RGBA, gl::UNSIGNED_BYTE),
        TextureFormat::DepthDefault => (gl::DEPTH_COMPONENT as GLint, gl::DEPTH_COMPONENT, gl::FLOAT),
    }
}

// ============================================================================
// Programs
// ============================================================================

fn stage_name(kind: GLenum) -> &'static str {
    match kind {
        gl::VERTEX_SHADER => "vertex",
        gl::FRAGMENT_SHADER => "fragment",
        _ => "unknown",
    }
}

fn compile_stage<G: GlApi>(gl: &G, kind: GLenum, desc: &ShaderDesc) -> Result<GLuint> {
    let source = desc.glsl_source()?;

    let shader = gl.create_shader(kind);
    gl.shader_source(shader, &source);
    gl.compile_shader(shader);

    if !gl.shader_compiled(shader) {
        let log = gl.shader_info_log(shader);
        gl.delete_shader(shader);
        engine_error!(
            "celeritas::opengl",
            "{} shader '{}' failed to compile: {}",
            stage_name(kind),
            desc.debug_name,
            log.trim_end()
        );
        return Err(Error::ShaderCompilation(format!(
            "{} shader '{}': {}",
            stage_name(kind),
            desc.debug_name,
            log.trim_end()
        )));
    }
    Ok(shader)
}

/// Compile both stages and link them into a program.
///
/// # Errors
///
/// - `ShaderCompilation` with the driver's info log on compile or link failure
/// - `Unsupported` for SPIR-V stages, `InvalidResource` for unreadable files
pub(crate) fn link_program<G: GlApi>(gl: &G, vs: &ShaderDesc, fs: &ShaderDesc) -> Result<GLuint> {
    let vertex = compile_stage(gl, gl::VERTEX_SHADER, vs)?;
    let fragment = match compile_stage(gl, gl::FRAGMENT_SHADER, fs) {
        Ok(fragment) => fragment,
        Err(err) => {
            gl.delete_shader(vertex);
            return Err(err);
        }
    };

    let program = gl.create_program();
    gl.attach_shader(program, vertex);
    gl.attach_shader(program, fragment);
    gl.link_program(program);
    gl.delete_shader(vertex);
    gl.delete_shader(fragment);

    if !gl.program_linked(program) {
        let log = gl.program_info_log(program);
        gl.delete_program(program);
        engine_error!(
            "celeritas::opengl",
            "Program '{}' + '{}' failed to link: {}",
            vs.debug_name,
            fs.debug_name,
            log.trim_end()
        );
        return Err(Error::ShaderCompilation(format!(
            "link '{}' + '{}': {}",
            vs.debug_name,
            fs.debug_name,
            log.trim_end()
        )));
    }

    engine_debug!(
        "celeritas::opengl",
        "Linked program {} from '{}' and '{}'",
        program,
        vs.debug_name,
        fs.debug_name
    );
    Ok(program)
}

#[cfg(test)]
#[path = "opengl_helpers_tests.rs"]
mod tests;

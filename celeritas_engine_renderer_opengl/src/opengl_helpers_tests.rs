//! Unit tests for the RAL -> GL conversions and program building
//!
//! Runs against the recording GL; no driver required.

use super::*;
use crate::headless::{GlCall, RecordingGl};

// ============================================================================
// CONVERSIONS
// ============================================================================

#[test]
fn test_vertex_attrib_format_float_and_integer_lanes() {
    assert_eq!(
        vertex_attrib_format(VertexAttribType::F32x3),
        GlVertexAttr { count: 3, data_type: gl::FLOAT, integer: false }
    );
    assert_eq!(
        vertex_attrib_format(VertexAttribType::F32),
        GlVertexAttr { count: 1, data_type: gl::FLOAT, integer: false }
    );
    assert_eq!(
        vertex_attrib_format(VertexAttribType::U32x4),
        GlVertexAttr { count: 4, data_type: gl::UNSIGNED_INT, integer: true }
    );
    assert_eq!(
        vertex_attrib_format(VertexAttribType::I32x2),
        GlVertexAttr { count: 2, data_type: gl::INT, integer: true }
    );
}

#[test]
fn test_texture_targets() {
    assert_eq!(texture_target(TextureType::Tex2d), gl::TEXTURE_2D);
    assert_eq!(texture_target(TextureType::Tex3d), gl::TEXTURE_3D);
    assert_eq!(texture_target(TextureType::Tex2dArray), gl::TEXTURE_2D_ARRAY);
    assert_eq!(texture_target(TextureType::CubeMap), gl::TEXTURE_CUBE_MAP);
}

#[test]
fn test_topology_point_is_the_primitive_mode() {
    // GL_POINT is a polygon mode, not a draw mode
    assert_eq!(primitive_topology(PrimitiveTopology::Point), gl::POINTS);
    assert_ne!(primitive_topology(PrimitiveTopology::Point), gl::POINT);
    assert_eq!(primitive_topology(PrimitiveTopology::Line), gl::LINES);
    assert_eq!(primitive_topology(PrimitiveTopology::LineStrip), gl::LINE_STRIP);
    assert_eq!(primitive_topology(PrimitiveTopology::Triangle), gl::TRIANGLES);
    assert_eq!(primitive_topology(PrimitiveTopology::TriangleStrip), gl::TRIANGLE_STRIP);
}

#[test]
fn test_buffer_targets() {
    assert_eq!(buffer_target(BufferType::Vertex, BufferFlags::GPU), gl::ARRAY_BUFFER);
    assert_eq!(buffer_target(BufferType::Default, BufferFlags::GPU), gl::ARRAY_BUFFER);
    assert_eq!(
        buffer_target(BufferType::Default, BufferFlags::GPU | BufferFlags::STORAGE),
        gl::SHADER_STORAGE_BUFFER
    );
    assert_eq!(buffer_target(BufferType::Index, BufferFlags::GPU), gl::ELEMENT_ARRAY_BUFFER);
    assert_eq!(buffer_target(BufferType::Uniform, BufferFlags::CPU), gl::UNIFORM_BUFFER);
}

#[test]
fn test_buffer_usage() {
    assert_eq!(buffer_usage(BufferType::Vertex, BufferFlags::GPU), gl::STATIC_DRAW);
    assert_eq!(buffer_usage(BufferType::Vertex, BufferFlags::CPU), gl::DYNAMIC_DRAW);
    assert_eq!(buffer_usage(BufferType::Uniform, BufferFlags::GPU), gl::DYNAMIC_DRAW);
}

#[test]
fn test_texture_formats() {
    assert_eq!(
        texture_formats(TextureFormat::Rgba8Unorm),
        (gl::RGBA as GLint, gl::RGBA, gl::UNSIGNED_BYTE)
    );
    assert_eq!(
        texture_formats(TextureFormat::DepthDefault),
        (gl::DEPTH_COMPONENT as GLint, gl::DEPTH_COMPONENT, gl::FLOAT)
    );
}

// ============================================================================
// PROGRAMS
// ============================================================================

fn stages() -> (ShaderDesc, ShaderDesc) {
    (
        ShaderDesc::glsl("blinn_phong.vert", "#version 430 core\nvoid main() {}"),
        ShaderDesc::glsl("blinn_phong.frag", "#version 430 core\nvoid main() {}"),
    )
}

#[test]
fn test_link_program_attaches_both_stages() {
    let gl = RecordingGl::new();
    let (vs, fs) = stages();

    let program = link_program(&gl, &vs, &fs).unwrap();

    // shaders get names 1 and 2, the program 3
    assert_eq!(program, 3);
    let calls = gl.calls();
    assert!(calls.contains(&GlCall::CreateShader(gl::VERTEX_SHADER, 1)));
    assert!(calls.contains(&GlCall::CreateShader(gl::FRAGMENT_SHADER, 2)));
    assert!(calls.contains(&GlCall::AttachShader(3, 1)));
    assert!(calls.contains(&GlCall::AttachShader(3, 2)));
    assert!(calls.contains(&GlCall::LinkProgram(3)));
    // stages are released once linked
    assert!(calls.contains(&GlCall::DeleteShader(1)));
    assert!(calls.contains(&GlCall::DeleteShader(2)));
    assert_eq!(gl.count(|c| matches!(c, GlCall::DeleteProgram(_))), 0);
}

#[test]
fn test_compile_failure_carries_info_log() {
    let gl = RecordingGl::new();
    gl.fail_next_compile("0:3(1): error: syntax error, unexpected '}'\n");
    let (vs, fs) = stages();

    let err = link_program(&gl, &vs, &fs).unwrap_err();

    match &err {
        Error::ShaderCompilation(log) => {
            assert!(log.contains("blinn_phong.vert"));
            assert!(log.contains("syntax error"));
        }
        other => panic!("expected ShaderCompilation, got {:?}", other),
    }
    assert!(err.is_fatal());
    assert!(gl.calls().contains(&GlCall::DeleteShader(1)));
    assert_eq!(gl.count(|c| matches!(c, GlCall::CreateProgram(_))), 0);
}

#[test]
fn test_link_failure_deletes_program() {
    let gl = RecordingGl::new();
    gl.fail_next_link("error: vertex output 'fragPos' not read by fragment shader");
    let (vs, fs) = stages();

    let err = link_program(&gl, &vs, &fs).unwrap_err();

    assert!(matches!(&err, Error::ShaderCompilation(log) if log.contains("fragPos")));
    assert!(gl.calls().contains(&GlCall::DeleteProgram(3)));
}

#[test]
fn test_spirv_stage_is_unsupported() {
    let gl = RecordingGl::new();
    let vs = ShaderDesc::spirv("shadow.vert.spv", vec![0x0723_0203]);
    let (_, fs) = stages();

    let err = link_program(&gl, &vs, &fs).unwrap_err();

    assert!(matches!(err, Error::Unsupported(_)));
    assert!(gl.calls().is_empty());
}

#[test]
fn test_missing_shader_file_is_invalid_resource() {
    let gl = RecordingGl::new();
    let (vs, _) = stages();
    let fs = ShaderDesc::from_path("missing.frag", "/nonexistent/celeritas/missing.frag");

    let err = link_program(&gl, &vs, &fs).unwrap_err();

    assert!(matches!(err, Error::InvalidResource(_)));
    // the already compiled vertex stage is released
    assert!(gl.calls().contains(&GlCall::DeleteShader(1)));
}

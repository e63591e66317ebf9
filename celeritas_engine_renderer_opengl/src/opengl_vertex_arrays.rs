/// Vertex array objects cached per (vertex buffer, vertex layout)
///
/// The same buffer may be drawn with different layouts (a shadow pass reading
/// positions only, a colour pass reading the full vertex); each pair gets its
/// own VAO, created on first use.

use celeritas_engine::celeritas::render::{BufferHandle, VertexDescription};
use celeritas_engine::{engine_debug, engine_trace};
use gl::types::GLuint;
use rustc_hash::FxHashMap;

use crate::gl_api::GlApi;
use crate::opengl_helpers::vertex_attrib_format;

#[derive(Debug, Default)]
pub struct VertexArrayCache {
    vaos: FxHashMap<(BufferHandle, u64), GLuint>,
}

impl VertexArrayCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// VAO for `buffer` read through `desc`, creating it if needed.
    ///
    /// A newly created VAO is left bound.
    pub fn get_or_create<G: GlApi>(
        &mut self,
        gl: &G,
        buffer: BufferHandle,
        vbo: GLuint,
        desc: &VertexDescription,
    ) -> GLuint {
        let key = (buffer, desc.layout_key());
        if let Some(&vao) = self.vaos.get(&key) {
            return vao;
        }

        let vao = create_vertex_array(gl, vbo, desc);
        engine_debug!(
            "celeritas::opengl",
            "Created VAO {} for {} with '{}'",
            vao,
            buffer,
            desc.debug_label()
        );
        self.vaos.insert(key, vao);
        vao
    }

    /// Delete every VAO built over `buffer`
    pub fn purge_buffer<G: GlApi>(&mut self, gl: &G, buffer: BufferHandle) {
        self.vaos.retain(|&(owner, _), &mut vao| {
            if owner == buffer {
                gl.delete_vertex_array(vao);
                false
            } else {
                true
            }
        });
    }

    pub fn clear<G: GlApi>(&mut self, gl: &G) {
        for (_, vao) in self.vaos.drain() {
            gl.delete_vertex_array(vao);
        }
    }

    pub fn len(&self) -> usize {
        self.vaos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vaos.is_empty()
    }
}

fn create_vertex_array<G: GlApi>(gl: &G, vbo: GLuint, desc: &VertexDescription) -> GLuint {
    let stride = desc.stride() as i32;

    gl.bind_buffer(gl::ARRAY_BUFFER, vbo);
    let vao = gl.gen_vertex_array();
    gl.bind_vertex_array(vao);

    for (index, (offset, attr)) in desc.offsets().enumerate() {
        let format = vertex_attrib_format(attr.attr_type);
        let index = index as u32;
        if format.integer {
            gl.vertex_attrib_i_pointer(index, format.count, format.data_type, stride, offset);
        } else {
            gl.vertex_attrib_pointer(index, format.count, format.data_type, stride, offset);
        }
        gl.enable_vertex_attrib_array(index);
        engine_trace!(
            "celeritas::opengl",
            "  attr {} '{}': {} x {:#x} at {} (stride {})",
            index,
            attr.name,
            format.count,
            format.data_type,
            offset,
            stride
        );
    }

    gl.bind_buffer(gl::ARRAY_BUFFER, 0);
    vao
}

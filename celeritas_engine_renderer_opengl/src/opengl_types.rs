/// Backend-side records stored in the OpenGL backend's pools

use celeritas_engine::celeritas::render::{
    BufferFlags, BufferHandle, BufferType, PipelineLayoutHandle, PrimitiveTopology,
    RenderpassDesc, RenderpassHandle, ShaderDataLayout, TextureDesc, VertexDescription,
};
use gl::types::{GLenum, GLuint};
use rustc_hash::FxHashMap;

/// GL buffer object
#[derive(Debug, Default)]
pub struct GlBuffer {
    pub id: GLuint,
    /// Target used when the buffer is bound for drawing or shading
    pub target: GLenum,
    pub size: usize,
    pub buffer_type: BufferType,
    pub flags: BufferFlags,
    /// Binding point when the buffer backs a pipeline's uniform block
    pub ubo_binding_point: Option<u32>,
    /// Uniform block label it backs
    pub name: Option<String>,
}

/// GL texture object
#[derive(Debug)]
pub struct GlTexture {
    pub id: GLuint,
    pub target: GLenum,
    pub desc: TextureDesc,
}

/// One uniform block owned by a pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlUniformBlock {
    pub label: String,
    pub buffer: BufferHandle,
    /// Per-pipeline binding point, 0..MAX_PIPELINE_UNIFORM_BUFFERS
    pub binding_point: u32,
    pub size: usize,
}

/// Creation-time shape of one shader-data group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlShaderDataGroup {
    pub name: String,
    /// (label, binding kind name) in declaration order
    pub bindings: Vec<(String, &'static str)>,
    /// Texture unit (and storage index) of the group's first binding
    pub first_unit: u32,
}

impl GlShaderDataGroup {
    /// Check a draw-time layout against this shape
    pub fn matches(&self, layout: &ShaderDataLayout<'_>) -> std::result::Result<(), String> {
        if layout.bindings.len() != self.bindings.len() {
            return Err(format!(
                "'{}' has {} bindings, group '{}' was declared with {}",
                layout.name,
                layout.bindings.len(),
                self.name,
                self.bindings.len()
            ));
        }
        for (binding, (label, kind)) in layout.bindings.iter().zip(&self.bindings) {
            if binding.label != label.as_str() || binding.kind.name() != *kind {
                return Err(format!(
                    "'{}' binds {} '{}' where group '{}' declared {} '{}'",
                    layout.name,
                    binding.kind.name(),
                    binding.label,
                    self.name,
                    kind,
                    label
                ));
            }
        }
        Ok(())
    }
}

/// What a pipeline's shader-data layouts resolve to
#[derive(Debug, Default)]
pub struct GlPipelineLayout {
    pub uniforms: Vec<GlUniformBlock>,
    /// Uniform block label -> index in `uniforms`
    by_label: FxHashMap<String, usize>,
    groups: Vec<GlShaderDataGroup>,
}

impl GlPipelineLayout {
    /// Groups take consecutive texture units in declaration order
    pub fn new(layouts: &[ShaderDataLayout<'_>]) -> Self {
        let mut next = 0u32;
        let groups = layouts
            .iter()
            .map(|layout| {
                let group = GlShaderDataGroup {
                    name: layout.name.to_string(),
                    bindings: layout
                        .bindings
                        .iter()
                        .map(|b| (b.label.to_string(), b.kind.name()))
                        .collect(),
                    first_unit: next,
                };
                next += layout.bindings.len() as u32;
                group
            })
            .collect();
        Self { uniforms: Vec::new(), by_label: FxHashMap::default(), groups }
    }

    /// Register a uniform block. Returns `false` if the label is taken.
    pub fn add_uniform(&mut self, block: GlUniformBlock) -> bool {
        if self.by_label.contains_key(&block.label) {
            return false;
        }
        self.by_label.insert(block.label.clone(), self.uniforms.len());
        self.uniforms.push(block);
        true
    }

    pub fn uniform(&self, label: &str) -> Option<&GlUniformBlock> {
        self.by_label.get(label).map(|&index| &self.uniforms[index])
    }

    pub fn group(&self, group: u32) -> Option<&GlShaderDataGroup> {
        self.groups.get(group as usize)
    }

    /// Texture unit of binding `index` in `group`; `None` outside the declared shape
    pub fn texture_unit(&self, group: u32, index: usize) -> Option<u32> {
        self.group(group)
            .filter(|g| index < g.bindings.len())
            .map(|g| g.first_unit + index as u32)
    }
}

/// Linked program plus the fixed-function state applied at bind time
#[derive(Debug)]
pub struct GlPipeline {
    pub debug_name: String,
    pub program: GLuint,
    pub vertex_desc: VertexDescription,
    /// `VertexDescription::layout_key` of `vertex_desc`
    pub layout_key: u64,
    pub topology: PrimitiveTopology,
    pub wireframe: bool,
    pub depth_test: bool,
    pub layout: PipelineLayoutHandle,
    pub renderpass: RenderpassHandle,
}

/// Framebuffer object (0 for the window framebuffer)
#[derive(Debug)]
pub struct GlRenderpass {
    pub fbo: GLuint,
    pub desc: RenderpassDesc,
    /// Size of the attachments, `None` for the window framebuffer
    pub extents: Option<(u32, u32)>,
}

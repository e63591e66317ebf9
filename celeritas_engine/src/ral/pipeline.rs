/// Graphics pipeline descriptions

use std::borrow::Cow;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::ral::{ShaderDataDesc, VertexDescription, MAX_SHADER_DATA_LAYOUTS};

/// Primitive topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveTopology {
    Point,
    Line,
    LineStrip,
    /// Triangle list
    #[default]
    Triangle,
    TriangleStrip,
}

/// Where a shader stage's code comes from
#[derive(Debug, Clone, PartialEq)]
pub enum ShaderSource {
    /// GLSL text
    Glsl(String),
    /// GLSL text read from disk when the pipeline is created
    Path(PathBuf),
    /// SPIR-V words
    SpirV(Vec<u32>),
}

/// One shader stage
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderDesc {
    pub debug_name: String,
    pub source: ShaderSource,
}

impl ShaderDesc {
    pub fn glsl(debug_name: impl Into<String>, code: impl Into<String>) -> Self {
        Self { debug_name: debug_name.into(), source: ShaderSource::Glsl(code.into()) }
    }

    pub fn from_path(debug_name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self { debug_name: debug_name.into(), source: ShaderSource::Path(path.into()) }
    }

    pub fn spirv(debug_name: impl Into<String>, words: Vec<u32>) -> Self {
        Self { debug_name: debug_name.into(), source: ShaderSource::SpirV(words) }
    }

    /// GLSL text of the stage, reading it from disk if needed
    ///
    /// # Errors
    ///
    /// - `InvalidResource` if the file cannot be read
    /// - `Unsupported` for SPIR-V stages
    pub fn glsl_source(&self) -> Result<Cow<'_, str>> {
        match &self.source {
            ShaderSource::Glsl(code) => Ok(Cow::Borrowed(code.as_str())),
            ShaderSource::Path(path) => std::fs::read_to_string(path).map(Cow::Owned).map_err(|e| {
                Error::InvalidResource(format!(
                    "shader '{}': cannot read {}: {}",
                    self.debug_name,
                    path.display(),
                    e
                ))
            }),
            ShaderSource::SpirV(_) => Err(Error::Unsupported(format!(
                "shader '{}' is SPIR-V; a GLSL source is required",
                self.debug_name
            ))),
        }
    }
}

/// Everything needed to build a graphics pipeline
#[derive(Debug, Clone)]
pub struct GraphicsPipelineDesc {
    pub debug_name: String,
    pub vertex_desc: VertexDescription,
    pub vs: ShaderDesc,
    pub fs: ShaderDesc,
    /// Shader-data layouts in group order (at most [`MAX_SHADER_DATA_LAYOUTS`])
    pub data_layouts: Vec<ShaderDataDesc>,
    pub topology: PrimitiveTopology,
    pub wireframe: bool,
    pub depth_test: bool,
}

impl GraphicsPipelineDesc {
    pub fn new(
        debug_name: impl Into<String>,
        vertex_desc: VertexDescription,
        vs: ShaderDesc,
        fs: ShaderDesc,
    ) -> Self {
        Self {
            debug_name: debug_name.into(),
            vertex_desc,
            vs,
            fs,
            data_layouts: Vec::new(),
            topology: PrimitiveTopology::Triangle,
            wireframe: false,
            depth_test: true,
        }
    }

    /// Append a shader-data layout; its group index is its position
    pub fn with_layout(mut self, layout: ShaderDataDesc) -> Self {
        self.data_layouts.push(layout);
        self
    }

    pub fn with_topology(mut self, topology: PrimitiveTopology) -> Self {
        self.topology = topology;
        self
    }

    pub fn with_wireframe(mut self, wireframe: bool) -> Self {
        self.wireframe = wireframe;
        self
    }

    pub fn with_depth_test(mut self, depth_test: bool) -> Self {
        self.depth_test = depth_test;
        self
    }

    /// Check layout count and every layout's bindings
    pub fn validate(&self) -> Result<()> {
        if self.data_layouts.len() > MAX_SHADER_DATA_LAYOUTS {
            return Err(Error::InvalidResource(format!(
                "pipeline '{}' declares {} shader data layouts (max {})",
                self.debug_name,
                self.data_layouts.len(),
                MAX_SHADER_DATA_LAYOUTS
            )));
        }
        if self.vertex_desc.attributes().is_empty() {
            return Err(Error::InvalidResource(format!(
                "pipeline '{}' has an empty vertex description",
                self.debug_name
            )));
        }
        for desc in &self.data_layouts {
            desc.layout().validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;

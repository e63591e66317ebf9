//! Render abstraction layer
//!
//! Backend-agnostic descriptions of GPU resources, the handle types that name
//! them, and the two traits every backend implements:
//!
//! - [`RenderBackend`]: resource creation/destruction and the frame lifecycle
//! - [`CmdEncoder`]: the per-frame command protocol
//!   (begin renderpass, bind pipeline, bind shader data, bind buffers, draw)

mod backend;
mod buffer;
mod frame;
mod handles;
mod pipeline;
mod renderpass;
mod shader_data;
mod texture;
mod vertex;

#[cfg(test)]
pub(crate) mod mock_backend;

pub use backend::{BackendConfig, BackendStats, CmdBuffer, CmdEncoder, RenderBackend};
pub use buffer::{BufferFlags, BufferType};
pub use frame::{run_frame, FrameState, FrameTracker};
pub use handles::{
    BufferHandle, PipelineHandle, PipelineLayoutHandle, RenderpassHandle, SamplerHandle,
    ShaderHandle, TextureHandle,
};
pub use pipeline::{GraphicsPipelineDesc, PrimitiveTopology, ShaderDesc, ShaderSource};
pub use renderpass::RenderpassDesc;
pub use shader_data::{
    BindingKind, ShaderBinding, ShaderData, ShaderDataDesc, ShaderDataLayout, ShaderVisibility,
};
pub use texture::{TextureDesc, TextureFormat, TextureType};
pub use vertex::{
    VertexAttribType, VertexAttribute, VertexDescription, VertexScalar, VertexStride,
    FULL_VERTEX_SIZE,
};

// ===== LIMITS =====

/// Shader-data layouts per pipeline
pub const MAX_SHADER_DATA_LAYOUTS: usize = 8;
/// Bindings per shader-data layout
pub const MAX_LAYOUT_BINDINGS: usize = 8;
/// Attributes per vertex description
pub const MAX_VERTEX_ATTRIBUTES: usize = 16;
/// Uniform buffers one pipeline may own
pub const MAX_PIPELINE_UNIFORM_BUFFERS: usize = 32;

/// Default pool capacities
pub const MAX_BUFFERS: usize = 256;
pub const MAX_TEXTURES: usize = 256;
pub const MAX_PIPELINES: usize = 128;
pub const MAX_RENDERPASSES: usize = 128;

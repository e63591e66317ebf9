/// Backend and command-encoder traits
///
/// A backend is an owned value created by the application. Dropping out of
/// scope without calling its shutdown leaks GPU objects; shutting it down
/// consumes it, so a backend can never be used after shutdown.

use glam::UVec2;

use crate::error::Result;
use crate::ral::{
    BufferFlags, BufferHandle, BufferType, GraphicsPipelineDesc, PipelineHandle, RenderpassDesc,
    RenderpassHandle, ShaderData, ShaderDataLayout, TextureDesc, TextureHandle, MAX_BUFFERS,
    MAX_PIPELINES, MAX_RENDERPASSES, MAX_TEXTURES,
};

// ============================================================================
// Configuration and statistics
// ============================================================================

/// Backend configuration
#[derive(Debug, Clone, PartialEq)]
pub struct BackendConfig {
    /// Application name (logged at init)
    pub app_name: String,
    /// Colour the window framebuffer is cleared to by `begin_frame`
    pub clear_colour: [f32; 4],
    pub max_buffers: usize,
    pub max_textures: usize,
    pub max_pipelines: usize,
    pub max_renderpasses: usize,
    /// Bytes of per-frame scratch memory (uniform staging)
    pub frame_arena_size: usize,
    /// Arena the pipeline, pipeline-layout and renderpass pools are carved from
    pub backend_arena_size: usize,
    /// Arena the buffer and texture pools are carved from
    pub resource_arena_size: usize,
    pub enable_depth_test: bool,
    pub enable_face_culling: bool,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            app_name: "Celeritas Application".to_string(),
            clear_colour: [0.1, 0.1, 0.1, 1.0],
            max_buffers: MAX_BUFFERS,
            max_textures: MAX_TEXTURES,
            max_pipelines: MAX_PIPELINES,
            max_renderpasses: MAX_RENDERPASSES,
            frame_arena_size: 1024 * 1024,
            backend_arena_size: 1024 * 1024,
            resource_arena_size: 1024 * 1024,
            enable_depth_test: true,
            enable_face_culling: true,
        }
    }
}

/// Counters for the frame in progress (reset by `begin_frame`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackendStats {
    pub draw_calls: u32,
    /// Vertices or indices submitted
    pub elements: u64,
    pub pipeline_binds: u32,
    /// Bytes uploaded through shader-data bindings
    pub uniform_bytes: u64,
}

/// Recorded commands ready for submission
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CmdBuffer {
    pub commands: u32,
}

// ============================================================================
// Backend trait
// ============================================================================

/// Resource factory and frame lifecycle of a graphics backend
///
/// Frame protocol:
///
/// ```text
/// begin_frame() == true
///   encoder() -> begin_render -> bind_pipeline -> bind_shader_data*
///             -> set_vertex_buffer -> set_index_buffer? -> draw*
///             -> end_render -> finish
///   queue_submit(cmd)
/// end_frame()
/// ```
///
/// When `begin_frame` returns `false` the frame must be skipped; `end_frame`
/// may still be called and presents nothing.
pub trait RenderBackend {
    type Encoder<'a>: CmdEncoder
    where
        Self: 'a;

    /// Short backend name ("opengl", "mock")
    fn name(&self) -> &'static str;

    fn config(&self) -> &BackendConfig;

    fn stats(&self) -> BackendStats;

    // ===== BUFFERS =====

    /// Create a buffer of `size` bytes, optionally filled with `data`
    ///
    /// # Errors
    ///
    /// `PoolExhausted` when the buffer pool is full, `InvalidResource` when
    /// `data` is longer than `size`.
    fn buffer_create(
        &mut self,
        size: usize,
        buffer_type: BufferType,
        flags: BufferFlags,
        data: Option<&[u8]>,
    ) -> Result<BufferHandle>;

    /// Overwrite `data.len()` bytes starting at `offset`
    fn buffer_upload(&mut self, buffer: BufferHandle, offset: usize, data: &[u8]) -> Result<()>;

    fn buffer_destroy(&mut self, buffer: BufferHandle) -> Result<()>;

    // ===== TEXTURES =====

    /// Create a texture, optionally with its full texel data
    fn texture_create(
        &mut self,
        desc: &TextureDesc,
        create_view: bool,
        data: Option<&[u8]>,
    ) -> Result<TextureHandle>;

    /// Replace the full texel data of an existing texture
    fn texture_upload(&mut self, texture: TextureHandle, data: &[u8]) -> Result<()>;

    fn texture_destroy(&mut self, texture: TextureHandle) -> Result<()>;

    // ===== RENDERPASSES AND PIPELINES =====

    /// # Errors
    ///
    /// `InvalidResource` when a default-framebuffer pass declares attachments.
    fn renderpass_create(&mut self, desc: &RenderpassDesc) -> Result<RenderpassHandle>;

    fn renderpass_destroy(&mut self, renderpass: RenderpassHandle) -> Result<()>;

    /// Compile shaders, record the vertex description and allocate a uniform
    /// buffer for every bytes binding of every declared layout.
    fn graphics_pipeline_create(
        &mut self,
        desc: &GraphicsPipelineDesc,
        renderpass: RenderpassHandle,
    ) -> Result<PipelineHandle>;

    fn pipeline_destroy(&mut self, pipeline: PipelineHandle) -> Result<()>;

    // ===== FRAME =====

    /// Start a frame. `Ok(false)` means skip this frame (e.g. swapchain resize).
    fn begin_frame(&mut self) -> Result<bool>;

    /// Encoder for the frame in progress
    ///
    /// # Errors
    ///
    /// `InvalidState` outside `begin_frame`/`end_frame`.
    fn encoder(&mut self) -> Result<Self::Encoder<'_>>;

    fn queue_submit(&mut self, cmd: CmdBuffer) -> Result<()>;

    /// Present the frame (presents nothing for a skipped frame)
    fn end_frame(&mut self) -> Result<()>;

    /// Abandon the frame in progress without presenting
    fn abort_frame(&mut self);

    /// Record new surface dimensions; applied at the next `begin_frame`
    fn resize(&mut self, width: u32, height: u32);

    fn swapchain_dimensions(&self) -> UVec2;
}

// ============================================================================
// Encoder trait
// ============================================================================

/// Per-frame command recording
///
/// Every method fails with `InvalidState` when called out of sequence
/// (drawing without a bound pipeline, binding outside a renderpass, ...).
pub trait CmdEncoder {
    fn begin_render(&mut self, renderpass: RenderpassHandle) -> Result<()>;

    fn end_render(&mut self) -> Result<()>;

    /// Make `pipeline` current for the following binds and draws
    fn bind_pipeline(&mut self, pipeline: PipelineHandle) -> Result<()>;

    /// Upload/bind every binding of `layout` for the current pipeline.
    ///
    /// `group` is the layout's index in the pipeline description.
    fn bind_shader_data(&mut self, group: u32, layout: &ShaderDataLayout<'_>) -> Result<()>;

    fn set_vertex_buffer(&mut self, buffer: BufferHandle) -> Result<()>;

    fn set_index_buffer(&mut self, buffer: BufferHandle) -> Result<()>;

    /// Non-indexed draw of `vertex_count` vertices from vertex 0
    fn draw(&mut self, vertex_count: u32) -> Result<()>;

    /// Indexed draw of `index_count` 32-bit indices
    fn draw_indexed(&mut self, index_count: u32) -> Result<()>;

    /// Stop recording
    fn finish(self) -> CmdBuffer
    where
        Self: Sized;

    /// `bind_shader_data(group, &data.shader_data())`
    fn bind<T: ShaderData>(&mut self, group: u32, data: &T) -> Result<()>
    where
        Self: Sized,
    {
        self.bind_shader_data(group, &data.shader_data())
    }
}

/// OpenGlBackend - OpenGL implementation of the RenderBackend trait

use std::marker::PhantomData;

use celeritas_engine::celeritas::memory::{Arena, Pool};
use celeritas_engine::celeritas::render::{
    BackendConfig, BackendStats, BufferFlags, BufferHandle, BufferType, CmdBuffer,
    FrameTracker, GraphicsPipelineDesc, PipelineHandle, PipelineLayoutHandle, RenderBackend,
    RenderpassDesc, RenderpassHandle, TextureDesc, TextureHandle,
};
use celeritas_engine::celeritas::{Error, Result};
use celeritas_engine::glam::UVec2;
use celeritas_engine::{engine_debug, engine_info, engine_trace};
use gl::types::GLuint;

use crate::gl_api::{GlApi, NativeGl};
use crate::opengl_cmd_encoder::GlEncoder;
use crate::opengl_surface::GlSurface;
use crate::opengl_types::{
    GlBuffer, GlPipeline, GlPipelineLayout, GlRenderpass, GlTexture, GlUniformBlock,
};
use crate::opengl_vertex_arrays::VertexArrayCache;

/// OpenGL backend
///
/// Owns the window surface, every GL object it created and the pools that
/// name them. Must stay on the thread whose GL context is current, so it is
/// neither `Send` nor `Sync`.
pub struct OpenGlBackend<S: GlSurface, G: GlApi = NativeGl> {
    pub(crate) gl: G,
    surface: S,
    pub(crate) config: BackendConfig,
    pub(crate) stats: BackendStats,
    pub(crate) frame: FrameTracker,
    /// Per-frame scratch memory (uniform staging)
    pub(crate) frame_arena: Arena,
    /// Backs the pipeline, pipeline-layout and renderpass pools
    backend_arena: Arena,
    /// Backs the buffer and texture pools
    resource_arena: Arena,

    /// Dimensions frames are rendered at
    pub(crate) dimensions: UVec2,
    /// Last size reported by the surface
    surface_size: (u32, u32),
    resize_pending: bool,
    presented_frames: u64,

    pub(crate) buffers: Pool<GlBuffer, BufferHandle>,
    pub(crate) textures: Pool<GlTexture, TextureHandle>,
    pub(crate) pipelines: Pool<GlPipeline, PipelineHandle>,
    pub(crate) pipeline_layouts: Pool<GlPipelineLayout, PipelineLayoutHandle>,
    pub(crate) renderpasses: Pool<GlRenderpass, RenderpassHandle>,
    pub(crate) vertex_arrays: VertexArrayCache,

    _context_thread: PhantomData<*const ()>,
}

impl<S: GlSurface> OpenGlBackend<S, NativeGl> {
    /// Load GL through `surface` and create the backend
    ///
    /// The surface's GL context must be current on this thread.
    ///
    /// # Errors
    ///
    /// `InitializationFailed` if GL cannot be loaded or a pool capacity is 0.
    pub fn init(surface: S, config: BackendConfig) -> Result<Self> {
        let gl = NativeGl::load(|symbol| surface.get_proc_address(symbol))?;
        Self::with_api(surface, gl, config)
    }
}

impl<S: GlSurface, G: GlApi> OpenGlBackend<S, G> {
    /// Create the backend over an already-loaded [`GlApi`]
    pub fn with_api(surface: S, gl: G, config: BackendConfig) -> Result<Self> {
        engine_info!("celeritas::opengl", "Loading OpenGL backend for '{}'", config.app_name);

        let mut backend_arena = Arena::new(config.backend_arena_size);
        let pipelines = Pool::new_in(&mut backend_arena, "pipelines", config.max_pipelines)?;
        let pipeline_layouts =
            Pool::new_in(&mut backend_arena, "pipeline layouts", config.max_pipelines)?;
        let renderpasses =
            Pool::new_in(&mut backend_arena, "renderpasses", config.max_renderpasses)?;

        let mut resource_arena = Arena::new(config.resource_arena_size);
        let buffers = Pool::new_in(&mut resource_arena, "gpu buffers", config.max_buffers)?;
        let textures = Pool::new_in(&mut resource_arena, "gpu textures", config.max_textures)?;
        engine_debug!(
            "celeritas::opengl",
            "Pools use {} of {} backend arena bytes and {} of {} resource arena bytes",
            backend_arena.used(),
            backend_arena.capacity(),
            resource_arena.used(),
            resource_arena.capacity()
        );

        if config.enable_depth_test {
            gl.enable(gl::DEPTH_TEST);
        }
        if config.enable_face_culling {
            gl.enable(gl::CULL_FACE);
        }

        let surface_size = surface.framebuffer_size();
        engine_debug!(
            "celeritas::opengl",
            "Surface framebuffer is {}x{}",
            surface_size.0,
            surface_size.1
        );

        Ok(Self {
            gl,
            surface,
            stats: BackendStats::default(),
            frame: FrameTracker::new(),
            frame_arena: Arena::new(config.frame_arena_size),
            backend_arena,
            resource_arena,
            dimensions: UVec2::new(surface_size.0, surface_size.1),
            surface_size,
            resize_pending: false,
            presented_frames: 0,
            buffers,
            textures,
            pipelines,
            pipeline_layouts,
            renderpasses,
            vertex_arrays: VertexArrayCache::new(),
            config,
            _context_thread: PhantomData,
        })
    }

    /// Delete every GL object and hand back the surface and GL API
    pub fn shutdown(mut self) -> (S, G) {
        self.vertex_arrays.clear(&self.gl);
        for (_, pipeline) in self.pipelines.iter() {
            self.gl.delete_program(pipeline.program);
        }
        for (_, renderpass) in self.renderpasses.iter() {
            if renderpass.fbo != 0 {
                self.gl.delete_framebuffer(renderpass.fbo);
            }
        }
        for (_, texture) in self.textures.iter() {
            self.gl.delete_texture(texture.id);
        }
        // uniform buffers live in the buffer pool too
        for (_, buffer) in self.buffers.iter() {
            self.gl.delete_buffer(buffer.id);
        }

        engine_info!(
            "celeritas::opengl",
            "OpenGL backend shut down after {} presented frames",
            self.presented_frames
        );
        (self.surface, self.gl)
    }

    // ===== ACCESSORS =====

    pub fn gl(&self) -> &G {
        &self.gl
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn frame(&self) -> &FrameTracker {
        &self.frame
    }

    pub fn frame_arena(&self) -> &Arena {
        &self.frame_arena
    }

    pub fn backend_arena(&self) -> &Arena {
        &self.backend_arena
    }

    pub fn resource_arena(&self) -> &Arena {
        &self.resource_arena
    }

    pub fn presented_frames(&self) -> u64 {
        self.presented_frames
    }

    /// GL name of a live buffer
    pub fn buffer_id(&self, buffer: BufferHandle) -> Result<GLuint> {
        Ok(self.buffers.get(buffer)?.id)
    }

    /// GL name of a live texture
    pub fn texture_id(&self, texture: TextureHandle) -> Result<GLuint> {
        Ok(self.textures.get(texture)?.id)
    }

    /// GL program of a live pipeline
    pub fn program(&self, pipeline: PipelineHandle) -> Result<GLuint> {
        Ok(self.pipelines.get(pipeline)?.program)
    }

    /// Uniform blocks owned by a pipeline, in binding-point order
    pub fn pipeline_uniforms(&self, pipeline: PipelineHandle) -> Result<&[GlUniformBlock]> {
        let layout = self.pipelines.get(pipeline)?.layout;
        Ok(&self.pipeline_layouts.get(layout)?.uniforms)
    }

    /// Number of cached vertex array objects
    pub fn vertex_array_count(&self) -> usize {
        self.vertex_arrays.len()
    }

    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }
}

pub(crate) fn exhausted(kind: &str, capacity: usize) -> Error {
    Error::PoolExhausted(format!("all {} {} slots are in use", capacity, kind))
}

impl<S: GlSurface, G: GlApi> RenderBackend for OpenGlBackend<S, G> {
    type Encoder<'a> = GlEncoder<'a, S, G>
    where
        Self: 'a;

    fn name(&self) -> &'static str {
        "opengl"
    }

    fn config(&self) -> &BackendConfig {
        &self.config
    }

    fn stats(&self) -> BackendStats {
        self.stats
    }

    // ===== RESOURCES =====

    fn buffer_create(
        &mut self,
        size: usize,
        buffer_type: BufferType,
        flags: BufferFlags,
        data: Option<&[u8]>,
    ) -> Result<BufferHandle> {
        self.create_buffer(size, buffer_type, flags, data)
    }

    fn buffer_upload(&mut self, buffer: BufferHandle, offset: usize, data: &[u8]) -> Result<()> {
        self.upload_buffer(buffer, offset, data)
    }

    fn buffer_destroy(&mut self, buffer: BufferHandle) -> Result<()> {
        self.destroy_buffer(buffer)
    }

    fn texture_create(
        &mut self,
        desc: &TextureDesc,
        create_view: bool,
        data: Option<&[u8]>,
    ) -> Result<TextureHandle> {
        self.create_texture(desc, create_view, data)
    }

    fn texture_upload(&mut self, texture: TextureHandle, data: &[u8]) -> Result<()> {
        self.upload_texture(texture, data)
    }

    fn texture_destroy(&mut self, texture: TextureHandle) -> Result<()> {
        self.destroy_texture(texture)
    }

    fn renderpass_create(&mut self, desc: &RenderpassDesc) -> Result<RenderpassHandle> {
        self.create_renderpass(desc)
    }

    fn renderpass_destroy(&mut self, renderpass: RenderpassHandle) -> Result<()> {
        self.destroy_renderpass(renderpass)
    }

    fn graphics_pipeline_create(
        &mut self,
        desc: &GraphicsPipelineDesc,
        renderpass: RenderpassHandle,
    ) -> Result<PipelineHandle> {
        self.create_graphics_pipeline(desc, renderpass)
    }

    fn pipeline_destroy(&mut self, pipeline: PipelineHandle) -> Result<()> {
        self.destroy_pipeline(pipeline)
    }

    // ===== FRAME =====

    fn begin_frame(&mut self) -> Result<bool> {
        let surface_size = self.surface.framebuffer_size();
        if surface_size != self.surface_size {
            self.surface_size = surface_size;
            self.dimensions = UVec2::new(surface_size.0, surface_size.1);
            self.resize_pending = true;
        }

        let proceed = !self.resize_pending && self.dimensions.x > 0 && self.dimensions.y > 0;
        self.frame.begin_frame(proceed)?;
        self.stats = BackendStats::default();

        if !proceed {
            engine_debug!(
                "celeritas::opengl",
                "Skipping frame (surface {}x{}, resized: {})",
                self.dimensions.x,
                self.dimensions.y,
                self.resize_pending
            );
            self.resize_pending = false;
            return Ok(false);
        }

        self.frame_arena.free_all();
        self.gl.bind_framebuffer(gl::FRAMEBUFFER, 0);
        self.gl.viewport(0, 0, self.dimensions.x as i32, self.dimensions.y as i32);
        self.gl.clear_color(self.config.clear_colour);
        self.gl.clear(gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT);
        Ok(true)
    }

    fn encoder(&mut self) -> Result<GlEncoder<'_, S, G>> {
        self.frame.check_recording("encoder")?;
        Ok(GlEncoder::new(self))
    }

    fn queue_submit(&mut self, cmd: CmdBuffer) -> Result<()> {
        // GL executes commands as they are encoded
        self.frame.check_recording("queue_submit")?;
        engine_trace!("celeritas::opengl", "Submitted {} commands", cmd.commands);
        Ok(())
    }

    fn end_frame(&mut self) -> Result<()> {
        if self.frame.end_frame()? {
            self.surface.swap_buffers()?;
            self.presented_frames += 1;
        }
        Ok(())
    }

    fn abort_frame(&mut self) {
        self.frame.abort();
        self.gl.bind_vertex_array(0);
        self.gl.bind_framebuffer(gl::FRAMEBUFFER, 0);
        engine_debug!("celeritas::opengl", "Frame aborted");
    }

    fn resize(&mut self, width: u32, height: u32) {
        engine_debug!("celeritas::opengl", "Resize requested: {}x{}", width, height);
        self.dimensions = UVec2::new(width, height);
        self.resize_pending = true;
    }

    fn swapchain_dimensions(&self) -> UVec2 {
        self.dimensions
    }
}

#[cfg(test)]
#[path = "opengl_backend_tests.rs"]
mod tests;

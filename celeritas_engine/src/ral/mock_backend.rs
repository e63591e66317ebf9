/// Mock backend for unit tests (no GPU required)
///
/// Resources live in the same pools a real backend uses, the frame protocol is
/// enforced by the shared `FrameTracker`, and every encoder call is recorded
/// as a string in `commands`.

use glam::UVec2;

use crate::error::{Error, Result};
use crate::memory::{Arena, Pool};
use crate::ral::{
    BackendConfig, BackendStats, BindingKind, BufferFlags, BufferHandle, BufferType, CmdBuffer,
    CmdEncoder, FrameTracker, GraphicsPipelineDesc, PipelineHandle, PrimitiveTopology,
    RenderBackend, RenderpassDesc, RenderpassHandle, ShaderDataLayout, TextureDesc,
    TextureHandle, VertexDescription, MAX_SHADER_DATA_LAYOUTS,
};

// ============================================================================
// Mock resources
// ============================================================================

#[derive(Debug)]
pub struct MockBuffer {
    pub buffer_type: BufferType,
    pub flags: BufferFlags,
    pub contents: Vec<u8>,
}

#[derive(Debug)]
pub struct MockTexture {
    pub desc: TextureDesc,
    pub contents: Option<Vec<u8>>,
}

#[derive(Debug)]
pub struct MockPipeline {
    pub name: String,
    pub vertex_desc: VertexDescription,
    pub topology: PrimitiveTopology,
    /// (label, size) of every bytes binding, in creation order
    pub uniforms: Vec<(String, usize)>,
}

#[derive(Debug)]
pub struct MockRenderpass {
    pub desc: RenderpassDesc,
}

// ============================================================================
// Mock backend
// ============================================================================

pub struct MockBackend {
    config: BackendConfig,
    stats: BackendStats,
    frame: FrameTracker,
    frame_arena: Arena,
    backend_arena: Arena,
    resource_arena: Arena,
    dimensions: UVec2,
    resize_pending: bool,
    pub buffers: Pool<MockBuffer, BufferHandle>,
    pub textures: Pool<MockTexture, TextureHandle>,
    pub pipelines: Pool<MockPipeline, PipelineHandle>,
    pub renderpasses: Pool<MockRenderpass, RenderpassHandle>,
    /// Encoder calls of the current frame
    pub commands: Vec<String>,
    pub presented_frames: u32,
    /// Make `buffer_destroy` fail with `BackendError`
    pub fail_buffer_destroy: bool,
}

impl MockBackend {
    pub fn new() -> Result<Self> {
        Self::with_config(BackendConfig::default())
    }

    pub fn with_config(config: BackendConfig) -> Result<Self> {
        let mut backend_arena = Arena::new(config.backend_arena_size);
        let mut resource_arena = Arena::new(config.resource_arena_size);
        Ok(Self {
            buffers: Pool::new_in(&mut resource_arena, "mock buffers", config.max_buffers)?,
            textures: Pool::new_in(&mut resource_arena, "mock textures", config.max_textures)?,
            pipelines: Pool::new_in(&mut backend_arena, "mock pipelines", config.max_pipelines)?,
            renderpasses: Pool::new_in(&mut backend_arena, "mock renderpasses", config.max_renderpasses)?,
            backend_arena,
            resource_arena,
            frame_arena: Arena::new(config.frame_arena_size),
            stats: BackendStats::default(),
            frame: FrameTracker::new(),
            dimensions: UVec2::new(800, 600),
            resize_pending: false,
            commands: Vec::new(),
            presented_frames: 0,
            fail_buffer_destroy: false,
            config,
        })
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
}

fn exhausted(kind: &str) -> Error {
    Error::PoolExhausted(format!("no free {} slot", kind))
}

impl RenderBackend for MockBackend {
    type Encoder<'a> = MockEncoder<'a>;

    fn name(&self) -> &'static str {
        "mock"
    }

    fn config(&self) -> &BackendConfig {
        &self.config
    }

    fn stats(&self) -> BackendStats {
        self.stats
    }

    fn buffer_create(
        &mut self,
        size: usize,
        buffer_type: BufferType,
        flags: BufferFlags,
        data: Option<&[u8]>,
    ) -> Result<BufferHandle> {
        let mut contents = vec![0u8; size];
        if let Some(data) = data {
            if data.len() > size {
                return Err(Error::InvalidResource(format!(
                    "{} bytes of data for a {} byte buffer",
                    data.len(),
                    size
                )));
            }
            contents[..data.len()].copy_from_slice(data);
        }
        self.buffers
            .insert(MockBuffer { buffer_type, flags, contents })
            .ok_or_else(|| exhausted("buffer"))
    }

    fn buffer_upload(&mut self, buffer: BufferHandle, offset: usize, data: &[u8]) -> Result<()> {
        let buffer = self.buffers.get_mut(buffer)?;
        let end = offset.checked_add(data.len()).filter(|end| *end <= buffer.contents.len());
        match end {
            Some(end) => {
                buffer.contents[offset..end].copy_from_slice(data);
                Ok(())
            }
            None => Err(Error::InvalidResource("upload past the end of the buffer".to_string())),
        }
    }

    fn buffer_destroy(&mut self, buffer: BufferHandle) -> Result<()> {
        if self.fail_buffer_destroy {
            return Err(Error::BackendError(format!("cannot destroy {}", buffer)));
        }
        self.buffers.dealloc(buffer).map(|_| ())
    }

    fn texture_create(
        &mut self,
        desc: &TextureDesc,
        _create_view: bool,
        data: Option<&[u8]>,
    ) -> Result<TextureHandle> {
        desc.validate(data)?;
        self.textures
            .insert(MockTexture { desc: desc.clone(), contents: data.map(<[u8]>::to_vec) })
            .ok_or_else(|| exhausted("texture"))
    }

    fn texture_upload(&mut self, texture: TextureHandle, data: &[u8]) -> Result<()> {
        let texture = self.textures.get_mut(texture)?;
        texture.desc.validate(Some(data))?;
        texture.contents = Some(data.to_vec());
        Ok(())
    }

    fn texture_destroy(&mut self, texture: TextureHandle) -> Result<()> {
        self.textures.dealloc(texture).map(|_| ())
    }

    fn renderpass_create(&mut self, desc: &RenderpassDesc) -> Result<RenderpassHandle> {
        desc.validate()?;
        for target in desc.color_target.iter().chain(desc.depth_stencil.iter()) {
            self.textures.get(*target)?;
        }
        self.renderpasses
            .insert(MockRenderpass { desc: desc.clone() })
            .ok_or_else(|| exhausted("renderpass"))
    }

    fn renderpass_destroy(&mut self, renderpass: RenderpassHandle) -> Result<()> {
        self.renderpasses.dealloc(renderpass).map(|_| ())
    }

    fn graphics_pipeline_create(
        &mut self,
        desc: &GraphicsPipelineDesc,
        renderpass: RenderpassHandle,
    ) -> Result<PipelineHandle> {
        desc.validate()?;
        self.renderpasses.get(renderpass)?;
        desc.vs.glsl_source()?;
        desc.fs.glsl_source()?;

        let uniforms = desc
            .data_layouts
            .iter()
            .flat_map(|layout_desc| layout_desc.layout().bindings)
            .filter_map(|binding| match binding.kind {
                BindingKind::Bytes { size, .. } => Some((binding.label.to_string(), size)),
                _ => None,
            })
            .collect();

        self.pipelines
            .insert(MockPipeline {
                name: desc.debug_name.clone(),
                vertex_desc: desc.vertex_desc.clone(),
                topology: desc.topology,
                uniforms,
            })
            .ok_or_else(|| exhausted("pipeline"))
    }

    fn pipeline_destroy(&mut self, pipeline: PipelineHandle) -> Result<()> {
        self.pipelines.dealloc(pipeline).map(|_| ())
    }

    fn begin_frame(&mut self) -> Result<bool> {
        let proceed = !self.resize_pending && self.dimensions.x > 0 && self.dimensions.y > 0;
        self.frame.begin_frame(proceed)?;
        self.resize_pending = false;
        self.stats = BackendStats::default();
        self.commands.clear();
        self.frame_arena.free_all();
        Ok(proceed)
    }

    fn encoder(&mut self) -> Result<MockEncoder<'_>> {
        self.frame.check_recording("encoder")?;
        Ok(MockEncoder { backend: self, recorded: 0 })
    }

    fn queue_submit(&mut self, cmd: CmdBuffer) -> Result<()> {
        self.frame.check_recording("queue_submit")?;
        self.commands.push(format!("submit {}", cmd.commands));
        Ok(())
    }

    fn end_frame(&mut self) -> Result<()> {
        if self.frame.end_frame()? {
            self.presented_frames += 1;
        }
        Ok(())
    }

    fn abort_frame(&mut self) {
        self.frame.abort();
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.dimensions = UVec2::new(width, height);
        self.resize_pending = true;
    }

    fn swapchain_dimensions(&self) -> UVec2 {
        self.dimensions
    }
}

// ============================================================================
// Mock encoder
// ============================================================================

pub struct MockEncoder<'a> {
    backend: &'a mut MockBackend,
    recorded: u32,
}

impl MockEncoder<'_> {
    fn record(&mut self, command: String) {
        self.recorded += 1;
        self.backend.commands.push(command);
    }
}

impl CmdEncoder for MockEncoder<'_> {
    fn begin_render(&mut self, renderpass: RenderpassHandle) -> Result<()> {
        self.backend.renderpasses.get(renderpass)?;
        self.backend.frame.begin_render(renderpass)?;
        self.record(format!("begin_render {}", renderpass));
        Ok(())
    }

    fn end_render(&mut self) -> Result<()> {
        self.backend.frame.end_render()?;
        self.record("end_render".to_string());
        Ok(())
    }

    fn bind_pipeline(&mut self, pipeline: PipelineHandle) -> Result<()> {
        self.backend.pipelines.get(pipeline)?;
        self.backend.frame.bind_pipeline(pipeline)?;
        self.backend.stats.pipeline_binds += 1;
        self.record(format!("bind_pipeline {}", pipeline));
        Ok(())
    }

    fn bind_shader_data(&mut self, group: u32, layout: &ShaderDataLayout<'_>) -> Result<()> {
        let pipeline = self.backend.frame.current_pipeline("bind_shader_data")?;
        if group as usize >= MAX_SHADER_DATA_LAYOUTS {
            return Err(Error::InvalidResource(format!("shader data group {} out of range", group)));
        }
        layout.validate()?;
        for (unit, binding) in layout.bindings.iter().enumerate() {
            match &binding.kind {
                BindingKind::Bytes { size, data: Some(bytes) } => {
                    let known = self
                        .backend
                        .pipelines
                        .get(pipeline)?
                        .uniforms
                        .iter()
                        .any(|(label, _)| label == binding.label);
                    if !known {
                        return Err(Error::InvalidResource(format!(
                            "pipeline has no uniform block '{}'",
                            binding.label
                        )));
                    }
                    let staged = self.backend.frame_arena.alloc(*size)?;
                    let len = bytes.len().min(*size);
                    self.backend.frame_arena.bytes_mut(staged)?[..len].copy_from_slice(&bytes[..len]);
                    self.backend.stats.uniform_bytes += *size as u64;
                    self.record(format!("upload_uniform {} {}", binding.label, size));
                }
                BindingKind::Texture(Some(texture)) => {
                    self.backend.textures.get(*texture)?;
                    self.record(format!("bind_texture {} {}", binding.label, unit));
                }
                BindingKind::Buffer(Some(buffer)) => {
                    self.backend.buffers.get(*buffer)?;
                    self.record(format!("bind_storage {} {}", binding.label, unit));
                }
                BindingKind::Sampler(_) => {}
                other => {
                    return Err(Error::InvalidResource(format!(
                        "{} binding '{}' carries no data",
                        other.name(),
                        binding.label
                    )));
                }
            }
        }
        Ok(())
    }

    fn set_vertex_buffer(&mut self, buffer: BufferHandle) -> Result<()> {
        self.backend.buffers.get(buffer)?;
        self.backend.frame.set_vertex_buffer(buffer)?;
        self.record(format!("set_vertex_buffer {}", buffer));
        Ok(())
    }

    fn set_index_buffer(&mut self, buffer: BufferHandle) -> Result<()> {
        self.backend.buffers.get(buffer)?;
        self.backend.frame.set_index_buffer(buffer)?;
        self.record(format!("set_index_buffer {}", buffer));
        Ok(())
    }

    fn draw(&mut self, vertex_count: u32) -> Result<()> {
        self.backend.frame.check_draw(false)?;
        self.backend.stats.draw_calls += 1;
        self.backend.stats.elements += u64::from(vertex_count);
        self.record(format!("draw {}", vertex_count));
        Ok(())
    }

    fn draw_indexed(&mut self, index_count: u32) -> Result<()> {
        self.backend.frame.check_draw(true)?;
        self.backend.stats.draw_calls += 1;
        self.backend.stats.elements += u64::from(index_count);
        self.record(format!("draw_indexed {}", index_count));
        Ok(())
    }

    fn finish(self) -> CmdBuffer {
        CmdBuffer { commands: self.recorded }
    }
}

#[cfg(test)]
#[path = "mock_backend_tests.rs"]
mod tests;

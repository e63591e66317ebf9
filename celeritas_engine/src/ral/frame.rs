/// Frame state machine shared by every backend, and the `run_frame` helper

use crate::error::{Error, Result};
use crate::ral::{BufferHandle, CmdEncoder, PipelineHandle, RenderBackend, RenderpassHandle};

/// Where a backend is in the frame protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameState {
    #[default]
    Idle,
    /// `begin_frame` returned `false`; only `end_frame` is allowed
    Skipped,
    FrameBegun,
    RenderpassActive,
}

/// Validates the order of frame and encoder calls
///
/// Backends call the matching method before touching native state; an
/// out-of-sequence call yields `Error::InvalidState` and changes nothing.
#[derive(Debug, Default)]
pub struct FrameTracker {
    state: FrameState,
    renderpass: Option<RenderpassHandle>,
    pipeline: Option<PipelineHandle>,
    vertex_buffer: Option<BufferHandle>,
    index_buffer: Option<BufferHandle>,
}

impl FrameTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> FrameState {
        self.state
    }

    pub fn renderpass(&self) -> Option<RenderpassHandle> {
        self.renderpass
    }

    pub fn pipeline(&self) -> Option<PipelineHandle> {
        self.pipeline
    }

    pub fn vertex_buffer(&self) -> Option<BufferHandle> {
        self.vertex_buffer
    }

    pub fn index_buffer(&self) -> Option<BufferHandle> {
        self.index_buffer
    }

    fn expect(&self, wanted: FrameState, operation: &str) -> Result<()> {
        if self.state == wanted {
            Ok(())
        } else {
            Err(Error::InvalidState(format!(
                "{} requires state {:?}, current state is {:?}",
                operation, wanted, self.state
            )))
        }
    }

    /// Idle -> FrameBegun (or Skipped when `proceed` is false)
    pub fn begin_frame(&mut self, proceed: bool) -> Result<()> {
        self.expect(FrameState::Idle, "begin_frame")?;
        self.state = if proceed { FrameState::FrameBegun } else { FrameState::Skipped };
        Ok(())
    }

    /// Back to Idle. Returns whether there is a frame to present.
    pub fn end_frame(&mut self) -> Result<bool> {
        match self.state {
            FrameState::FrameBegun => {
                self.state = FrameState::Idle;
                Ok(true)
            }
            FrameState::Skipped => {
                self.state = FrameState::Idle;
                Ok(false)
            }
            _ => self.expect(FrameState::FrameBegun, "end_frame").map(|_| false),
        }
    }

    /// Drop whatever is in progress and return to Idle
    pub fn abort(&mut self) {
        *self = Self::default();
    }

    /// Encoders and submission are only valid between renderpasses of a begun frame
    pub fn check_recording(&self, operation: &str) -> Result<()> {
        self.expect(FrameState::FrameBegun, operation)
    }

    pub fn begin_render(&mut self, renderpass: RenderpassHandle) -> Result<()> {
        self.expect(FrameState::FrameBegun, "begin_render")?;
        self.state = FrameState::RenderpassActive;
        self.renderpass = Some(renderpass);
        self.pipeline = None;
        self.vertex_buffer = None;
        self.index_buffer = None;
        Ok(())
    }

    pub fn end_render(&mut self) -> Result<()> {
        self.expect(FrameState::RenderpassActive, "end_render")?;
        self.state = FrameState::FrameBegun;
        self.renderpass = None;
        self.pipeline = None;
        Ok(())
    }

    pub fn bind_pipeline(&mut self, pipeline: PipelineHandle) -> Result<()> {
        self.expect(FrameState::RenderpassActive, "bind_pipeline")?;
        if self.pipeline != Some(pipeline) {
            // vertex arrays depend on the pipeline's vertex description
            self.vertex_buffer = None;
        }
        self.pipeline = Some(pipeline);
        Ok(())
    }

    /// The bound pipeline, required by shader-data binds and draws
    pub fn current_pipeline(&self, operation: &str) -> Result<PipelineHandle> {
        self.expect(FrameState::RenderpassActive, operation)?;
        self.pipeline
            .ok_or_else(|| Error::InvalidState(format!("{} without a bound pipeline", operation)))
    }

    pub fn set_vertex_buffer(&mut self, buffer: BufferHandle) -> Result<()> {
        self.current_pipeline("set_vertex_buffer")?;
        self.vertex_buffer = Some(buffer);
        Ok(())
    }

    pub fn set_index_buffer(&mut self, buffer: BufferHandle) -> Result<()> {
        self.expect(FrameState::RenderpassActive, "set_index_buffer")?;
        self.index_buffer = Some(buffer);
        Ok(())
    }

    /// Pipeline and vertex buffer bound, plus an index buffer for indexed draws
    pub fn check_draw(&self, indexed: bool) -> Result<PipelineHandle> {
        let operation = if indexed { "draw_indexed" } else { "draw" };
        let pipeline = self.current_pipeline(operation)?;
        if self.vertex_buffer.is_none() {
            return Err(Error::InvalidState(format!("{} without a vertex buffer", operation)));
        }
        if indexed && self.index_buffer.is_none() {
            return Err(Error::InvalidState("draw_indexed without an index buffer".to_string()));
        }
        Ok(pipeline)
    }
}

/// Run one frame: begin, record through `record`, finish, submit, end.
///
/// Returns `Ok(false)` without calling `record` when the backend skips the
/// frame. If `record` fails the frame is aborted and the error returned.
///
/// # Example
///
/// ```ignore
/// let presented = run_frame(&mut backend, |encoder| {
///     encoder.begin_render(pass)?;
///     encoder.bind_pipeline(pipeline)?;
///     mesh.draw(encoder)?;
///     encoder.end_render()
/// })?;
/// ```
pub fn run_frame<B, F>(backend: &mut B, record: F) -> Result<bool>
where
    B: RenderBackend,
    F: FnOnce(&mut dyn CmdEncoder) -> Result<()>,
{
    if !backend.begin_frame()? {
        backend.end_frame()?;
        return Ok(false);
    }

    let recorded = match backend.encoder() {
        Ok(mut encoder) => record(&mut encoder).map(|_| encoder.finish()),
        Err(err) => Err(err),
    };

    match recorded {
        Ok(cmd) => {
            backend.queue_submit(cmd)?;
            backend.end_frame()?;
            Ok(true)
        }
        Err(err) => {
            backend.abort_frame();
            Err(err)
        }
    }
}

#[cfg(test)]
#[path = "frame_tests.rs"]
mod tests;

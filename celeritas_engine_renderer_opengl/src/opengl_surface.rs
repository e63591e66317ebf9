/// Window-side collaborator of the OpenGL backend

use std::ffi::c_void;

use celeritas_engine::celeritas::Result;

/// What the backend needs from the window that owns the GL context.
///
/// Implemented by the windowing layer (GLFW, winit + glutin, SDL, ...).
/// The context must be current on the calling thread for the lifetime of
/// the backend.
pub trait GlSurface {
    /// Address of a GL entry point, or null if unavailable
    fn get_proc_address(&self, symbol: &str) -> *const c_void;

    /// Present the back buffer
    fn swap_buffers(&mut self) -> Result<()>;

    /// Size of the default framebuffer in pixels (not window points)
    fn framebuffer_size(&self) -> (u32, u32);
}

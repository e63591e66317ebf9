/*!
# Celeritas Engine - OpenGL Renderer Backend

OpenGL 4.3 core implementation of the Celeritas render abstraction layer.

This crate implements the `celeritas_engine` [`RenderBackend`] and
[`CmdEncoder`] traits on top of the `gl` crate's function loader. The
window is supplied by the application through [`GlSurface`] (context
creation, buffer swaps and the framebuffer size stay with the windowing
library of your choice).

[`RenderBackend`]: celeritas_engine::celeritas::render::RenderBackend
[`CmdEncoder`]: celeritas_engine::celeritas::render::CmdEncoder

## Example

```no_run
use celeritas_engine::celeritas::render::{BackendConfig, RenderBackend, RenderpassDesc};
use celeritas_engine_renderer_opengl::{GlSurface, OpenGlBackend};

fn start(surface: impl GlSurface) -> celeritas_engine::celeritas::Result<()> {
    let mut backend = OpenGlBackend::init(surface, BackendConfig::default())?;
    let main_pass = backend.renderpass_create(&RenderpassDesc::default_framebuffer("main"))?;
    # let _ = main_pass;
    Ok(())
}
```

[`headless`] runs the same backend against a recording GL, without a driver.
*/

mod gl_api;
mod opengl_surface;
mod opengl_helpers;
mod opengl_types;
mod opengl_vertex_arrays;
mod opengl_backend;
mod opengl_backend_resources;
mod opengl_backend_pipeline;
mod opengl_cmd_encoder;

pub mod headless;

pub use gl_api::{GlApi, NativeGl};
pub use opengl_backend::OpenGlBackend;
pub use opengl_cmd_encoder::GlEncoder;
pub use opengl_surface::GlSurface;
pub use opengl_types::GlUniformBlock;

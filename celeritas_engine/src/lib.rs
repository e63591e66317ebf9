/*!
# Celeritas Engine

Core of the Celeritas renderer: memory primitives, the render abstraction
layer (RAL) and the resource types built on it.

Backends (OpenGL in `celeritas_engine_renderer_opengl`) implement the
[`RenderBackend`](celeritas::render::RenderBackend) and
[`CmdEncoder`](celeritas::render::CmdEncoder) traits declared here.

## Architecture

- **memory**: bump [`Arena`](memory::Arena) and handle-indexed [`Pool`](memory::Pool)
- **render**: backend-agnostic descriptions (buffers, textures, vertex layouts,
  shader-data layouts, pipelines, renderpasses) and the frame protocol
- **resource**: geometry, meshes, materials and the built-in uniform blocks
- **camera**: view and projection matrices
- **renderer**: shadow, skybox, lit and immediate-mode passes and the
  [`Renderer`](renderer::Renderer) that records them as one frame

## Frame protocol

```text
begin_frame -> begin_render -> bind_pipeline -> bind_shader_data
            -> set_vertex_buffer -> set_index_buffer -> draw -> end_render
            -> finish -> queue_submit -> end_frame
```
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod memory;
pub mod ral;
pub mod resource;
pub mod camera;
pub mod renderer;

// Main celeritas namespace module
pub mod celeritas {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine singleton
    pub use crate::engine::Engine;

    // Logging sub-module (types only; the engine_* macros are exported at the crate root)
    pub mod log {
        pub use crate::log::{DefaultLogger, LogEntry, LogSeverity, Logger};
    }

    // Memory primitives
    pub mod memory {
        pub use crate::memory::*;
    }

    // Render abstraction layer
    pub mod render {
        pub use crate::ral::*;
    }

    // Resource sub-module
    pub mod resource {
        pub use crate::resource::*;
    }

    // Camera sub-module
    pub mod camera {
        pub use crate::camera::*;
    }

    // Built-in passes and frame orchestration
    pub mod renderer {
        pub use crate::renderer::*;
    }
}

// Re-export math and byte-casting libraries at crate root
pub use bytemuck;
pub use glam;

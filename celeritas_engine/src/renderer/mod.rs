//! Render passes built on the RAL
//!
//! Each pass owns the backend objects it draws with (textures, renderpasses,
//! pipelines, meshes) and records through any [`CmdEncoder`](crate::ral::CmdEncoder):
//!
//! - [`ShadowPass`]: depth-only render of shadow casters from the light
//! - [`Skybox`]: cube-map background drawn first in the main pass
//! - [`ForwardPass`]: lit entities sampling the shadow map
//! - [`Immdraw`]: queued debug shapes, flushed at the end of the main pass
//!
//! [`Renderer`] strings them into a frame.

mod forward;
mod frame;
mod immdraw;
mod shadows;
mod skybox;

pub use forward::{ForwardData, ForwardPass, ForwardUniforms};
pub use frame::{FrameReport, RenderScene, Renderer, RendererConfig};
pub use immdraw::{ImmShape, ImmediateShape, ImmediateUniforms, Immdraw};
pub use shadows::{ShadowPass, ShadowUniforms, SHADOW_MAP_SIZE};
pub use skybox::{Skybox, SkyboxUniforms};

use glam::{Mat4, Vec4};

use crate::error::Result;
use crate::resource::Mesh;

/// One drawable in the scene: a mesh placed by an affine transform
#[derive(Debug, Clone, Copy)]
pub struct RenderEnt<'a> {
    pub mesh: &'a Mesh,
    pub transform: Mat4,
    /// Base colour used by the lit pass
    pub albedo: Vec4,
    pub casts_shadows: bool,
}

impl<'a> RenderEnt<'a> {
    pub fn new(mesh: &'a Mesh, transform: Mat4) -> Self {
        Self { mesh, transform, albedo: Vec4::new(0.8, 0.8, 0.8, 1.0), casts_shadows: true }
    }

    pub fn with_albedo(mut self, albedo: Vec4) -> Self {
        self.albedo = albedo;
        self
    }

    pub fn with_shadows(mut self, casts_shadows: bool) -> Self {
        self.casts_shadows = casts_shadows;
        self
    }
}

/// Log a failed release during constructor rollback; the caller returns the
/// error that caused the rollback.
pub(crate) fn log_release_failure(source: &str, what: &str, result: Result<()>) {
    if let Err(err) = result {
        crate::engine_warn!(source, "Leaked {} during rollback: {}", what, err);
    }
}

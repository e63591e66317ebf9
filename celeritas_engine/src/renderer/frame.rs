/// Frame orchestration
///
/// A [`Renderer`] owns the built-in passes and records one frame as:
///
/// ```text
/// shadow pass (offscreen depth)
/// main pass: skybox -> lit entities -> immediate shapes
/// ```

use glam::{Mat4, UVec2, Vec3};

use crate::camera::Camera;
use crate::error::Result;
use crate::ral::{run_frame, RenderBackend, RenderpassDesc, RenderpassHandle, TextureHandle};
use crate::renderer::{
    log_release_failure, ForwardPass, Immdraw, RenderEnt, ShadowPass, Skybox, SHADOW_MAP_SIZE,
};
use crate::resource::CameraBinding;

const SOURCE: &str = "celeritas::Renderer";

#[derive(Debug, Clone, PartialEq)]
pub struct RendererConfig {
    /// Shadow map width and height in texels
    pub shadow_map_size: u32,
    /// Half-width of the light's orthographic frustum
    pub shadow_extent: f32,
    pub shadow_near: f32,
    pub shadow_far: f32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            shadow_map_size: SHADOW_MAP_SIZE,
            shadow_extent: 10.0,
            shadow_near: 1.0,
            shadow_far: 20.0,
        }
    }
}

/// What the frame is viewed from and lit by
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderScene {
    pub camera: Camera,
    /// Position of the directional light, which shines towards the origin
    pub sun_position: Vec3,
}

impl RenderScene {
    pub fn new(camera: Camera, sun_position: Vec3) -> Self {
        Self { camera, sun_position }
    }

    /// Unit direction the light travels in
    pub fn light_direction(&self) -> Vec3 {
        (-self.sun_position).normalize_or_zero()
    }
}

/// Counts for one `render_frame` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// False when the backend skipped the frame
    pub presented: bool,
    pub shadow_casters: u32,
    pub entities: u32,
    pub immediate_shapes: u32,
}

pub struct Renderer {
    config: RendererConfig,
    main_pass: RenderpassHandle,
    shadows: ShadowPass,
    forward: ForwardPass,
    immdraw: Immdraw,
    skybox: Option<Skybox>,
    presented_frames: u64,
    skipped_frames: u64,
}

impl Renderer {
    /// Create the main renderpass and the shadow, lit and immediate passes
    pub fn new<B: RenderBackend>(backend: &mut B, config: RendererConfig) -> Result<Self> {
        let main_pass = backend.renderpass_create(&RenderpassDesc::default_framebuffer("main"))?;

        let size = config.shadow_map_size;
        let shadows = match ShadowPass::new(backend, UVec2::new(size, size)) {
            Ok(shadows) => shadows,
            Err(err) => {
                log_release_failure(SOURCE, "main renderpass", backend.renderpass_destroy(main_pass));
                return Err(err);
            }
        };
        let forward = match ForwardPass::new(backend, main_pass) {
            Ok(forward) => forward,
            Err(err) => {
                log_release_failure(SOURCE, "shadow pass", shadows.destroy(backend));
                log_release_failure(SOURCE, "main renderpass", backend.renderpass_destroy(main_pass));
                return Err(err);
            }
        };
        let immdraw = match Immdraw::new(backend, main_pass) {
            Ok(immdraw) => immdraw,
            Err(err) => {
                log_release_failure(SOURCE, "forward pass", forward.destroy(backend));
                log_release_failure(SOURCE, "shadow pass", shadows.destroy(backend));
                log_release_failure(SOURCE, "main renderpass", backend.renderpass_destroy(main_pass));
                return Err(err);
            }
        };

        crate::engine_info!(SOURCE, "Renderer ready on '{}' backend", backend.name());
        Ok(Self {
            config,
            main_pass,
            shadows,
            forward,
            immdraw,
            skybox: None,
            presented_frames: 0,
            skipped_frames: 0,
        })
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn main_pass(&self) -> RenderpassHandle {
        self.main_pass
    }

    pub fn shadow_map(&self) -> TextureHandle {
        self.shadows.shadow_map()
    }

    pub fn shadows(&self) -> &ShadowPass {
        &self.shadows
    }

    pub fn skybox(&self) -> Option<&Skybox> {
        self.skybox.as_ref()
    }

    /// Queue for debug shapes drawn at the end of the next frame
    pub fn immdraw(&mut self) -> &mut Immdraw {
        &mut self.immdraw
    }

    pub fn presented_frames(&self) -> u64 {
        self.presented_frames
    }

    pub fn skipped_frames(&self) -> u64 {
        self.skipped_frames
    }

    /// Replace the skybox with one built from six RGBA8 faces
    pub fn set_skybox<B: RenderBackend>(&mut self, backend: &mut B, face_size: u32, faces: &[u8]) -> Result<()> {
        let skybox = Skybox::new(backend, self.main_pass, face_size, faces)?;
        if let Some(previous) = self.skybox.replace(skybox) {
            previous.destroy(backend)?;
        }
        Ok(())
    }

    /// Orthographic light projection times the light's look-at view
    pub fn light_space(&self, scene: &RenderScene) -> Mat4 {
        let extent = self.config.shadow_extent;
        let projection = Mat4::orthographic_rh_gl(
            -extent,
            extent,
            -extent,
            extent,
            self.config.shadow_near,
            self.config.shadow_far,
        );
        let up = if scene.light_direction().cross(Vec3::Y).length_squared() < 1e-6 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        projection * Mat4::look_at_rh(scene.sun_position, Vec3::ZERO, up)
    }

    /// Record and present one frame
    ///
    /// Queued immediate shapes are consumed whether or not the frame is
    /// presented. A skipped frame records nothing and reports
    /// `presented == false`.
    pub fn render_frame<B: RenderBackend>(
        &mut self,
        backend: &mut B,
        scene: &RenderScene,
        entities: &[RenderEnt<'_>],
    ) -> Result<FrameReport> {
        let dimensions = backend.swapchain_dimensions();
        let (width, height) = (dimensions.x as f32, dimensions.y as f32);
        let camera = CameraBinding::from_camera(&scene.camera, width, height);
        let light_space = self.light_space(scene);
        let light_direction = scene.light_direction();

        let mut report = FrameReport::default();
        let main_pass = self.main_pass;
        let (shadows, forward, skybox, immdraw) =
            (&self.shadows, &self.forward, self.skybox.as_ref(), &mut self.immdraw);

        let recorded = run_frame(backend, |encoder| {
            report.shadow_casters = shadows.run(encoder, light_space, entities)?;

            encoder.begin_render(main_pass)?;
            if let Some(skybox) = skybox {
                skybox.draw(encoder, &scene.camera, width, height)?;
            }
            report.entities =
                forward.draw(encoder, &camera, light_space, light_direction, shadows.shadow_map(), entities)?;
            report.immediate_shapes = immdraw.flush(encoder, &camera)?;
            encoder.end_render()
        });
        self.immdraw.clear();

        report.presented = recorded?;
        if report.presented {
            self.presented_frames += 1;
        } else {
            self.skipped_frames += 1;
            crate::engine_warn!(SOURCE, "Frame skipped by the backend");
        }
        Ok(report)
    }

    /// Release every backend object the renderer created
    pub fn shutdown<B: RenderBackend>(self, backend: &mut B) -> Result<()> {
        if let Some(skybox) = self.skybox {
            skybox.destroy(backend)?;
        }
        self.immdraw.destroy(backend)?;
        self.forward.destroy(backend)?;
        self.shadows.destroy(backend)?;
        backend.renderpass_destroy(self.main_pass)?;
        crate::engine_info!(SOURCE, "Renderer shut down after {} frames", self.presented_frames);
        Ok(())
    }
}

#[cfg(test)]
#[path = "frame_tests.rs"]
mod tests;

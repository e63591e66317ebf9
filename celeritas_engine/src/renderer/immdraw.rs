/// Immediate-mode debug shapes
///
/// Shapes are queued during the frame (`plane`, `cuboid`, `sphere`, `bbox`)
/// and recorded by [`Immdraw::flush`] at the end of the main pass. Each shape
/// is drawn with a flat colour from a built-in unit mesh scaled by its
/// transform.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::error::Result;
use crate::ral::{
    CmdEncoder, GraphicsPipelineDesc, PipelineHandle, PrimitiveTopology, RenderBackend,
    RenderpassHandle, ShaderBinding, ShaderData, ShaderDataDesc, ShaderDataLayout, ShaderDesc,
    VertexDescription,
};
use crate::renderer::log_release_failure;
use crate::resource::{CameraBinding, Geometry, Mesh, Static3dVertex, VertexData};

const SOURCE: &str = "celeritas::Immdraw";

const IMMDRAW_VERT: &str = include_str!("../../shaders/immdraw.vert");
const IMMDRAW_FRAG: &str = include_str!("../../shaders/immdraw.frag");

/// Corner pairs of the 12 box edges
const BBOX_LINES: [u32; 24] = [0, 1, 2, 3, 0, 2, 1, 3, 4, 5, 6, 7, 4, 6, 5, 7, 0, 4, 1, 5, 2, 6, 3, 7];

/// `uniform ImmUniforms { mat4 model; vec4 colour; }`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ImmediateUniforms {
    pub model: Mat4,
    pub colour: Vec4,
}

impl ShaderData for ImmediateUniforms {
    fn layout(data: Option<&Self>) -> ShaderDataLayout<'_> {
        ShaderDataLayout::new("ImmUniforms").with(ShaderBinding::bytes("ImmUniforms", data))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImmShape {
    /// Unit XZ plane facing +Y
    Plane,
    /// Unit cube centred on the origin
    Cuboid,
    /// Sphere of radius 1
    Sphere,
    /// Edges of the unit cube, drawn as lines
    Bbox,
}

impl ImmShape {
    fn mesh_index(self) -> usize {
        match self {
            ImmShape::Plane => 0,
            ImmShape::Cuboid => 1,
            ImmShape::Sphere => 2,
            ImmShape::Bbox => 3,
        }
    }
}

/// A queued shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImmediateShape {
    pub shape: ImmShape,
    pub transform: Mat4,
    pub colour: Vec4,
    pub wireframe: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ImmPipeline {
    Fill,
    Wireframe,
    Lines,
}

impl ImmediateShape {
    fn pipeline(&self) -> ImmPipeline {
        match (self.shape, self.wireframe) {
            (ImmShape::Bbox, _) => ImmPipeline::Lines,
            (_, true) => ImmPipeline::Wireframe,
            (_, false) => ImmPipeline::Fill,
        }
    }
}

/// Unit cube corners joined by line-list indices
pub(crate) fn bbox_geometry() -> Geometry {
    let vertices = (0..8)
        .map(|corner| {
            let position = Vec3::new(
                if corner & 1 == 0 { -0.5 } else { 0.5 },
                if corner & 4 == 0 { -0.5 } else { 0.5 },
                if corner & 2 == 0 { 0.5 } else { -0.5 },
            );
            Static3dVertex::new(position, Vec3::NEG_Z, Vec2::ZERO)
        })
        .collect();
    Geometry::new(VertexData::Static3d(vertices), Some(BBOX_LINES.to_vec()))
}

#[derive(Debug)]
pub struct Immdraw {
    /// Indexed by `ImmShape::mesh_index`
    meshes: Vec<Mesh>,
    fill: PipelineHandle,
    wireframe: PipelineHandle,
    lines: PipelineHandle,
    queue: Vec<ImmediateShape>,
}

impl Immdraw {
    /// Upload the shape meshes and build the fill, wireframe and line
    /// pipelines against `renderpass`
    pub fn new<B: RenderBackend>(backend: &mut B, renderpass: RenderpassHandle) -> Result<Self> {
        crate::engine_info!(SOURCE, "Immediate drawing initialisation");

        let geometries = [
            Geometry::plane(Vec2::ONE),
            Geometry::cuboid(Vec3::ONE),
            Geometry::uv_sphere(1.0, 16, 16)?,
            bbox_geometry(),
        ];
        let mut meshes = Vec::with_capacity(geometries.len());
        for geometry in &geometries {
            match Mesh::upload(backend, geometry) {
                Ok(mesh) => meshes.push(mesh),
                Err(err) => {
                    release_meshes(backend, meshes);
                    return Err(err);
                }
            }
        }

        let specs = [
            ("immdraw fill", false, PrimitiveTopology::Triangle),
            ("immdraw wireframe", true, PrimitiveTopology::Triangle),
            ("immdraw lines", false, PrimitiveTopology::Line),
        ];
        let mut pipelines = Vec::with_capacity(specs.len());
        for (name, wireframe, topology) in specs {
            let desc = GraphicsPipelineDesc::new(
                name,
                VertexDescription::static_3d(),
                ShaderDesc::glsl("immdraw.vert", IMMDRAW_VERT),
                ShaderDesc::glsl("immdraw.frag", IMMDRAW_FRAG),
            )
            .with_layout(ShaderDataDesc::of::<CameraBinding>())
            .with_layout(ShaderDataDesc::of::<ImmediateUniforms>())
            .with_wireframe(wireframe)
            .with_topology(topology);
            match backend.graphics_pipeline_create(&desc, renderpass) {
                Ok(pipeline) => pipelines.push(pipeline),
                Err(err) => {
                    for pipeline in pipelines {
                        log_release_failure(SOURCE, "pipeline", backend.pipeline_destroy(pipeline));
                    }
                    release_meshes(backend, meshes);
                    return Err(err);
                }
            }
        }

        Ok(Self {
            meshes,
            fill: pipelines[0],
            wireframe: pipelines[1],
            lines: pipelines[2],
            queue: Vec::new(),
        })
    }

    // ===== QUEUEING =====

    pub fn plane(&mut self, transform: Mat4, colour: Vec4, wireframe: bool) {
        self.push(ImmShape::Plane, transform, colour, wireframe);
    }

    pub fn cuboid(&mut self, transform: Mat4, colour: Vec4, wireframe: bool) {
        self.push(ImmShape::Cuboid, transform, colour, wireframe);
    }

    pub fn sphere(&mut self, transform: Mat4, colour: Vec4, wireframe: bool) {
        self.push(ImmShape::Sphere, transform, colour, wireframe);
    }

    /// Box outline; always drawn as lines
    pub fn bbox(&mut self, transform: Mat4, colour: Vec4, wireframe: bool) {
        self.push(ImmShape::Bbox, transform, colour, wireframe);
    }

    fn push(&mut self, shape: ImmShape, transform: Mat4, colour: Vec4, wireframe: bool) {
        crate::engine_trace!(SOURCE, "Queue {:?}", shape);
        self.queue.push(ImmediateShape { shape, transform, colour, wireframe });
    }

    pub fn queued(&self) -> &[ImmediateShape] {
        &self.queue
    }

    /// Drop every queued shape without drawing it
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    pub fn mesh(&self, shape: ImmShape) -> &Mesh {
        &self.meshes[shape.mesh_index()]
    }

    // ===== RECORDING =====

    /// Record every queued shape inside the active renderpass and empty the
    /// queue. The pipeline is only rebound when the next shape needs a
    /// different one. Returns the number of shapes drawn.
    pub fn flush(&mut self, encoder: &mut dyn CmdEncoder, camera: &CameraBinding) -> Result<u32> {
        let mut bound = None;
        let mut drawn = 0;
        for shape in self.queue.drain(..) {
            let wanted = shape.pipeline();
            if bound != Some(wanted) {
                let pipeline = match wanted {
                    ImmPipeline::Fill => self.fill,
                    ImmPipeline::Wireframe => self.wireframe,
                    ImmPipeline::Lines => self.lines,
                };
                encoder.bind_pipeline(pipeline)?;
                encoder.bind_shader_data(0, &camera.shader_data())?;
                bound = Some(wanted);
            }
            let uniforms = ImmediateUniforms { model: shape.transform, colour: shape.colour };
            encoder.bind_shader_data(1, &uniforms.shader_data())?;
            self.meshes[shape.shape.mesh_index()].draw(encoder)?;
            drawn += 1;
        }
        Ok(drawn)
    }

    /// Release the pipelines and shape meshes
    pub fn destroy<B: RenderBackend>(self, backend: &mut B) -> Result<()> {
        for pipeline in [self.fill, self.wireframe, self.lines] {
            backend.pipeline_destroy(pipeline)?;
        }
        for mesh in self.meshes {
            mesh.destroy(backend)?;
        }
        Ok(())
    }
}

fn release_meshes<B: RenderBackend>(backend: &mut B, meshes: Vec<Mesh>) {
    for mesh in meshes {
        log_release_failure(SOURCE, "immdraw mesh", mesh.destroy(backend));
    }
}

#[cfg(test)]
#[path = "immdraw_tests.rs"]
mod tests;

/// GPU-resident mesh: the buffers created from one [`Geometry`]

use crate::error::{Error, Result};
use crate::ral::{BufferFlags, BufferHandle, BufferType, CmdEncoder, RenderBackend};
use crate::resource::{Geometry, MaterialHandle, VertexFormat};

#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    vertex_buffer: BufferHandle,
    index_buffer: Option<BufferHandle>,
    format: VertexFormat,
    vertex_count: u32,
    index_count: u32,
    material: Option<MaterialHandle>,
}

impl Mesh {
    /// Create GPU buffers for `geometry`
    ///
    /// # Errors
    ///
    /// - `InvalidResource` for empty geometry or out-of-range indices
    /// - `PoolExhausted` when the backend has no free buffer slot
    ///   (no buffer is left behind in that case)
    pub fn upload<B: RenderBackend>(backend: &mut B, geometry: &Geometry) -> Result<Self> {
        geometry.validate()?;
        let vertex_count = u32::try_from(geometry.vertex_count())
            .map_err(|_| Error::InvalidResource("too many vertices".to_string()))?;
        let index_count = u32::try_from(geometry.index_count())
            .map_err(|_| Error::InvalidResource("too many indices".to_string()))?;

        let vertex_bytes = geometry.vertex_bytes();
        let vertex_buffer = backend.buffer_create(
            vertex_bytes.len(),
            BufferType::Vertex,
            BufferFlags::GPU,
            Some(&vertex_bytes),
        )?;

        let index_buffer = match geometry.index_bytes() {
            Some(bytes) => {
                match backend.buffer_create(bytes.len(), BufferType::Index, BufferFlags::GPU, Some(bytes)) {
                    Ok(handle) => Some(handle),
                    Err(err) => {
                        if let Err(cleanup) = backend.buffer_destroy(vertex_buffer) {
                            crate::engine_warn!(
                                "celeritas::Mesh",
                                "Leaked vertex buffer {} after failed upload: {}",
                                vertex_buffer,
                                cleanup
                            );
                        }
                        return Err(err);
                    }
                }
            }
            None => None,
        };

        crate::engine_debug!(
            "celeritas::Mesh",
            "Uploaded {} mesh: {} vertices, {} indices",
            geometry.format().name(),
            vertex_count,
            index_count
        );

        Ok(Self {
            vertex_buffer,
            index_buffer,
            format: geometry.format(),
            vertex_count,
            index_count,
            material: None,
        })
    }

    pub fn with_material(mut self, material: MaterialHandle) -> Self {
        self.material = Some(material);
        self
    }

    pub fn vertex_buffer(&self) -> BufferHandle {
        self.vertex_buffer
    }

    pub fn index_buffer(&self) -> Option<BufferHandle> {
        self.index_buffer
    }

    pub fn format(&self) -> VertexFormat {
        self.format
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn material(&self) -> Option<MaterialHandle> {
        self.material
    }

    /// Bind buffers and issue one draw (indexed when the mesh has indices).
    /// The pipeline and shader data must already be bound.
    pub fn draw(&self, encoder: &mut dyn CmdEncoder) -> Result<()> {
        encoder.set_vertex_buffer(self.vertex_buffer)?;
        match self.index_buffer {
            Some(indices) => {
                encoder.set_index_buffer(indices)?;
                encoder.draw_indexed(self.index_count)
            }
            None => encoder.draw(self.vertex_count),
        }
    }

    /// Release the mesh's buffers
    pub fn destroy<B: RenderBackend>(self, backend: &mut B) -> Result<()> {
        backend.buffer_destroy(self.vertex_buffer)?;
        if let Some(indices) = self.index_buffer {
            backend.buffer_destroy(indices)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "mesh_tests.rs"]
mod tests;

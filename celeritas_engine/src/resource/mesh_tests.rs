use super::*;
use crate::memory::PoolHandle;
use crate::ral::mock_backend::MockBackend;
use crate::ral::{
    run_frame, BackendConfig, GraphicsPipelineDesc, RenderpassDesc, ShaderDesc,
};
use crate::resource::{RawPosColourVertex, VertexData};

fn triangle() -> Geometry {
    let vertices = vec![
        RawPosColourVertex { position: [-0.5, -0.5], colour: [1.0, 0.0, 0.0] },
        RawPosColourVertex { position: [0.5, -0.5], colour: [0.0, 1.0, 0.0] },
        RawPosColourVertex { position: [0.0, 0.5], colour: [0.0, 0.0, 1.0] },
    ];
    Geometry::new(VertexData::RawPosColour(vertices), Some(vec![0, 1, 2]))
}

#[test]
fn test_upload_creates_vertex_and_index_buffers() {
    let mut backend = MockBackend::new().unwrap();
    let mesh = Mesh::upload(&mut backend, &triangle()).unwrap();

    assert_eq!(mesh.vertex_count(), 3);
    assert_eq!(mesh.index_count(), 3);
    assert_eq!(mesh.format(), VertexFormat::RawPosColour);
    assert_eq!(backend.buffers.len(), 2);

    let vertex = backend.buffers.get(mesh.vertex_buffer()).unwrap();
    assert_eq!(vertex.buffer_type, BufferType::Vertex);
    assert_eq!(vertex.contents.len(), 3 * 20);

    let index = backend.buffers.get(mesh.index_buffer().unwrap()).unwrap();
    assert_eq!(index.contents, bytemuck::cast_slice::<u32, u8>(&[0, 1, 2]));
}

#[test]
fn test_upload_without_indices() {
    let mut backend = MockBackend::new().unwrap();
    let geometry = Geometry::new(
        VertexData::RawPosColour(vec![RawPosColourVertex::default(); 6]),
        None,
    );
    let mesh = Mesh::upload(&mut backend, &geometry).unwrap();
    assert!(mesh.index_buffer().is_none());
    assert_eq!(backend.buffers.len(), 1);
}

#[test]
fn test_upload_rolls_back_on_exhaustion() {
    let config = BackendConfig { max_buffers: 1, ..Default::default() };
    let mut backend = MockBackend::with_config(config).unwrap();
    let result = Mesh::upload(&mut backend, &triangle());
    assert!(matches!(result, Err(Error::PoolExhausted(_))));
    assert!(backend.buffers.is_empty());
}

#[test]
fn test_upload_reports_exhaustion_when_cleanup_fails() {
    let config = BackendConfig { max_buffers: 1, ..Default::default() };
    let mut backend = MockBackend::with_config(config).unwrap();
    backend.fail_buffer_destroy = true;
    let result = Mesh::upload(&mut backend, &triangle());
    assert!(matches!(result, Err(Error::PoolExhausted(_))));
    assert_eq!(backend.buffers.len(), 1);
}

#[test]
fn test_upload_rejects_invalid_geometry() {
    let mut backend = MockBackend::new().unwrap();
    let empty = Geometry::new(VertexData::Static3d(Vec::new()), None);
    assert!(Mesh::upload(&mut backend, &empty).is_err());
    assert!(backend.buffers.is_empty());
}

#[test]
fn test_draw_issues_single_indexed_draw() {
    let mut backend = MockBackend::new().unwrap();
    let pass = backend.renderpass_create(&RenderpassDesc::default_framebuffer("main")).unwrap();
    let desc = GraphicsPipelineDesc::new(
        "triangle",
        VertexFormat::RawPosColour.vertex_description(),
        ShaderDesc::glsl("vs", "void main() {}"),
        ShaderDesc::glsl("fs", "void main() {}"),
    )
    .with_depth_test(false);
    let pipeline = backend.graphics_pipeline_create(&desc, pass).unwrap();
    let mesh = Mesh::upload(&mut backend, &triangle()).unwrap();

    run_frame(&mut backend, |encoder| {
        encoder.begin_render(pass)?;
        encoder.bind_pipeline(pipeline)?;
        mesh.draw(encoder)?;
        encoder.end_render()
    })
    .unwrap();

    let draws: Vec<&str> = backend
        .commands
        .iter()
        .map(String::as_str)
        .filter(|c| c.starts_with("draw"))
        .collect();
    assert_eq!(draws, ["draw_indexed 3"]);
}

#[test]
fn test_destroy_releases_buffers() {
    let mut backend = MockBackend::new().unwrap();
    let mesh = Mesh::upload(&mut backend, &triangle()).unwrap();
    let vertex = mesh.vertex_buffer();
    mesh.destroy(&mut backend).unwrap();
    assert!(backend.buffers.is_empty());
    assert!(backend.buffers.get(vertex).is_err());
}

#[test]
fn test_material_assignment() {
    let mut backend = MockBackend::new().unwrap();
    let material = MaterialHandle::from_parts(1, 0);
    let mesh = Mesh::upload(&mut backend, &triangle()).unwrap().with_material(material);
    assert_eq!(mesh.material(), Some(material));
}

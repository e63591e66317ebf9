use super::*;
use crate::ral::{ShaderBinding, ShaderData, ShaderDataLayout, VertexAttribType};

struct Empty;

impl ShaderData for Empty {
    fn layout(_data: Option<&Self>) -> ShaderDataLayout<'_> {
        ShaderDataLayout::new("Empty")
    }
}

struct Crowded;

impl ShaderData for Crowded {
    fn layout(_data: Option<&Self>) -> ShaderDataLayout<'_> {
        let labels = ["t0", "t1", "t2", "t3", "t4", "t5", "t6", "t7", "t8"];
        labels
            .into_iter()
            .fold(ShaderDataLayout::new("Crowded"), |layout, label| {
                layout.with(ShaderBinding::texture(label, None))
            })
    }
}

fn basic_desc() -> GraphicsPipelineDesc {
    let vertex = VertexDescription::new("pos")
        .with_attr("inPos", VertexAttribType::F32x2)
        .unwrap();
    GraphicsPipelineDesc::new(
        "Basic Pipeline",
        vertex,
        ShaderDesc::glsl("vs", "void main() {}"),
        ShaderDesc::glsl("fs", "void main() {}"),
    )
}

#[test]
fn test_defaults() {
    let desc = basic_desc();
    assert_eq!(desc.topology, PrimitiveTopology::Triangle);
    assert!(desc.depth_test);
    assert!(!desc.wireframe);
    assert!(desc.data_layouts.is_empty());
    assert!(desc.validate().is_ok());
}

#[test]
fn test_builders() {
    let desc = basic_desc()
        .with_topology(PrimitiveTopology::LineStrip)
        .with_wireframe(true)
        .with_depth_test(false)
        .with_layout(ShaderDataDesc::of::<Empty>());
    assert_eq!(desc.topology, PrimitiveTopology::LineStrip);
    assert!(desc.wireframe);
    assert!(!desc.depth_test);
    assert_eq!(desc.data_layouts.len(), 1);
}

#[test]
fn test_too_many_layouts_rejected() {
    let mut desc = basic_desc();
    for _ in 0..=MAX_SHADER_DATA_LAYOUTS {
        desc = desc.with_layout(ShaderDataDesc::of::<Empty>());
    }
    assert!(matches!(desc.validate(), Err(Error::InvalidResource(_))));
}

#[test]
fn test_oversized_layout_rejected() {
    let desc = basic_desc().with_layout(ShaderDataDesc::of::<Crowded>());
    assert!(desc.validate().is_err());
}

#[test]
fn test_empty_vertex_description_rejected() {
    let mut desc = basic_desc();
    desc.vertex_desc = VertexDescription::new("nothing");
    assert!(desc.validate().is_err());
}

#[test]
fn test_glsl_source_variants() {
    let inline = ShaderDesc::glsl("vs", "#version 410\nvoid main() {}");
    assert!(inline.glsl_source().unwrap().starts_with("#version"));

    let missing = ShaderDesc::from_path("fs", "/definitely/not/here.frag");
    assert!(matches!(missing.glsl_source(), Err(Error::InvalidResource(_))));

    let spirv = ShaderDesc::spirv("vs", vec![0x0723_0203]);
    assert!(matches!(spirv.glsl_source(), Err(Error::Unsupported(_))));
}

#[test]
fn test_glsl_source_from_file() {
    let path = std::env::temp_dir().join(format!("celeritas_shader_{}.vert", std::process::id()));
    std::fs::write(&path, "void main() {}").unwrap();
    let desc = ShaderDesc::from_path("vs", &path);
    assert_eq!(desc.glsl_source().unwrap(), "void main() {}");
    std::fs::remove_file(&path).unwrap();
}

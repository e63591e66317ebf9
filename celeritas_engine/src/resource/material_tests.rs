use super::*;
use crate::memory::PoolHandle;
use crate::ral::{BindingKind, ShaderDataDesc};

fn white() -> TextureHandle {
    TextureHandle::from_parts(0, 0)
}

#[test]
fn test_default_material() {
    let material = Material::default();
    assert_eq!(material.name, "Standard Material");
    assert_eq!(material.kind, MaterialKind::Pbr);
    assert_eq!(material.base_colour, Vec3::ONE);
    assert_eq!(material.metallic, 0.0);
    assert_eq!(material.roughness, 0.5);
    assert_eq!(material.ambient_occlusion, 0.0);
    assert!(material.albedo_map.is_none());
}

#[test]
fn test_from_params() {
    let material = Material::from_params("gold", Vec3::new(1.0, 0.8, 0.2), 1.0, 0.3);
    assert_eq!(material.kind, MaterialKind::PbrParams);
    assert_eq!(material.kind.name(), "PBR (Params)");
    assert_eq!(material.metallic, 1.0);
}

#[test]
fn test_layout_shape() {
    let layout = PbrMaterialUniforms::layout(None);
    let labels: Vec<&str> = layout.bindings.iter().map(|b| b.label).collect();
    assert_eq!(labels, ["albedoMap", "metallicRoughnessMap", "aoMap", "normalMap", "PBR_Params"]);
    assert!(layout.validate().is_ok());
    assert!(!layout.stores_data());
    assert_eq!(
        layout.binding("PBR_Params").map(|b| b.kind.clone()),
        Some(BindingKind::Bytes { size: 24, data: None })
    );
}

#[test]
fn test_missing_maps_fall_back() {
    let albedo = TextureHandle::from_parts(5, 2);
    let material = Material { albedo_map: Some(albedo), ..Material::new("brick") };
    let uniforms = PbrMaterialUniforms::new(&material, white());

    let layout = uniforms.shader_data();
    assert!(layout.stores_data());
    assert_eq!(layout.bindings[0].kind, BindingKind::Texture(Some(albedo)));
    for binding in &layout.bindings[1..4] {
        assert_eq!(binding.kind, BindingKind::Texture(Some(white())));
    }
}

#[test]
fn test_params_bytes() {
    let material = Material::from_params("red", Vec3::new(1.0, 0.0, 0.0), 0.25, 0.75);
    let uniforms = PbrMaterialUniforms::new(&material, white());
    let layout = uniforms.shader_data();
    match &layout.bindings[4].kind {
        BindingKind::Bytes { data: Some(bytes), .. } => {
            let params: PbrParams = bytemuck::pod_read_unaligned(bytes);
            assert_eq!(params.albedo, [1.0, 0.0, 0.0]);
            assert_eq!(params.metallic, 0.25);
            assert_eq!(params.roughness, 0.75);
        }
        other => panic!("unexpected binding {:?}", other),
    }
}

#[test]
fn test_desc_reports_layout() {
    let desc = ShaderDataDesc::of::<PbrMaterialUniforms>();
    assert_eq!(desc.layout().name, "PBRMaterial");
    assert_eq!(desc.layout().bindings.len(), 5);
}

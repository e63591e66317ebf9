/// Uniform blocks shared by the built-in shaders
///
/// Field order and padding follow the std140 blocks declared in GLSL.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};

use crate::camera::Camera;
use crate::ral::{ShaderBinding, ShaderData, ShaderDataLayout};

pub const MAX_POINT_LIGHTS: usize = 4;

/// `uniform Camera { mat4 view; mat4 projection; vec4 viewPos; }`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CameraBinding {
    pub view: Mat4,
    pub projection: Mat4,
    pub view_pos: Vec4,
}

impl CameraBinding {
    /// View/projection of `camera` for a surface of `width` x `height` pixels
    pub fn from_camera(camera: &Camera, width: f32, height: f32) -> Self {
        let (view, projection) = camera.view_projection(width, height);
        Self { view, projection, view_pos: camera.position.extend(1.0) }
    }
}

impl ShaderData for CameraBinding {
    fn layout(data: Option<&Self>) -> ShaderDataLayout<'_> {
        ShaderDataLayout::new("Camera").with(ShaderBinding::bytes("Camera", data))
    }
}

/// `uniform Model { mat4 model; }`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ModelBinding {
    pub model: Mat4,
}

impl ShaderData for ModelBinding {
    fn layout(data: Option<&Self>) -> ShaderDataLayout<'_> {
        ShaderDataLayout::new("Model").with(ShaderBinding::bytes("Model", data))
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct PointLight {
    pub position: Vec3,
    _pad: f32,
    pub colour: Vec3,
    _pad2: f32,
}

impl PointLight {
    pub fn new(position: Vec3, colour: Vec3) -> Self {
        Self { position, _pad: 0.0, colour, _pad2: 0.0 }
    }
}

/// `uniform Lights { PointLight pointLights[4]; vec4 viewPos; }`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PointLightsBinding {
    pub point_lights: [PointLight; MAX_POINT_LIGHTS],
    pub view_pos: Vec4,
}

impl ShaderData for PointLightsBinding {
    fn layout(data: Option<&Self>) -> ShaderDataLayout<'_> {
        ShaderDataLayout::new("Lights").with(ShaderBinding::bytes("Lights", data))
    }
}

#[cfg(test)]
#[path = "shader_layouts_tests.rs"]
mod tests;

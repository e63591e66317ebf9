//! Shader-data layouts
//!
//! A type that feeds data to shaders implements [`ShaderData`]. Its single
//! function answers two questions:
//!
//! - `T::layout(None)`: what bindings does the shader expect (labels, kinds,
//!   sizes)? Used once at pipeline creation to allocate uniform buffers.
//! - `T::layout(Some(&value))`: the same bindings with their payloads filled
//!   in. Used at draw time by [`CmdEncoder::bind_shader_data`](crate::ral::CmdEncoder::bind_shader_data).
//!
//! Both answers must list the same bindings in the same order.
//!
//! ```
//! use celeritas_engine::celeritas::render::{ShaderBinding, ShaderData, ShaderDataLayout};
//!
//! #[repr(C)]
//! #[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
//! struct Tint {
//!     rgba: [f32; 4],
//! }
//!
//! impl ShaderData for Tint {
//!     fn layout(data: Option<&Self>) -> ShaderDataLayout<'_> {
//!         ShaderDataLayout::new("Tint").with(ShaderBinding::bytes("Tint", data))
//!     }
//! }
//!
//! assert!(!Tint::layout(None).stores_data());
//! assert!(Tint::layout(Some(&Tint { rgba: [1.0; 4] })).stores_data());
//! ```

use std::borrow::Cow;
use std::fmt;

use bitflags::bitflags;

use crate::error::{Error, Result};
use crate::ral::{BufferHandle, SamplerHandle, TextureHandle, MAX_LAYOUT_BINDINGS};

bitflags! {
    /// Shader stages a binding is visible to
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ShaderVisibility: u32 {
        const VERTEX = 1 << 0;
        const FRAGMENT = 1 << 1;
        const COMPUTE = 1 << 2;
    }
}

impl Default for ShaderVisibility {
    fn default() -> Self {
        ShaderVisibility::VERTEX | ShaderVisibility::FRAGMENT
    }
}

/// What a binding carries. Payloads are `None` in layout-only answers.
#[derive(Debug, Clone, PartialEq)]
pub enum BindingKind<'a> {
    /// Plain bytes uploaded to a uniform block of `size` bytes
    Bytes { size: usize, data: Option<Cow<'a, [u8]>> },
    /// Storage buffer
    Buffer(Option<BufferHandle>),
    Texture(Option<TextureHandle>),
    Sampler(Option<SamplerHandle>),
}

impl BindingKind<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            BindingKind::Bytes { .. } => "bytes",
            BindingKind::Buffer(_) => "buffer",
            BindingKind::Texture(_) => "texture",
            BindingKind::Sampler(_) => "sampler",
        }
    }
}

/// One named binding inside a [`ShaderDataLayout`]
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderBinding<'a> {
    /// Uniform block or sampler uniform name in the shader source
    pub label: &'a str,
    pub visibility: ShaderVisibility,
    pub kind: BindingKind<'a>,
}

impl<'a> ShaderBinding<'a> {
    /// Uniform block sized and filled from a plain-old-data value
    pub fn bytes<T: bytemuck::Pod>(label: &'a str, data: Option<&'a T>) -> Self {
        Self {
            label,
            visibility: ShaderVisibility::default(),
            kind: BindingKind::Bytes {
                size: std::mem::size_of::<T>(),
                data: data.map(|value| Cow::Borrowed(bytemuck::bytes_of(value))),
            },
        }
    }

    /// Uniform block of `size` bytes whose payload is computed on the fly
    pub fn bytes_owned(label: &'a str, size: usize, data: Option<Vec<u8>>) -> Self {
        Self {
            label,
            visibility: ShaderVisibility::default(),
            kind: BindingKind::Bytes { size, data: data.map(Cow::Owned) },
        }
    }

    pub fn texture(label: &'a str, texture: Option<TextureHandle>) -> Self {
        Self {
            label,
            visibility: ShaderVisibility::FRAGMENT,
            kind: BindingKind::Texture(texture),
        }
    }

    pub fn buffer(label: &'a str, buffer: Option<BufferHandle>) -> Self {
        Self {
            label,
            visibility: ShaderVisibility::default(),
            kind: BindingKind::Buffer(buffer),
        }
    }

    pub fn sampler(label: &'a str, sampler: Option<SamplerHandle>) -> Self {
        Self {
            label,
            visibility: ShaderVisibility::FRAGMENT,
            kind: BindingKind::Sampler(sampler),
        }
    }

    pub fn with_visibility(mut self, visibility: ShaderVisibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Whether the binding carries a live payload (as opposed to describing shape only)
    pub fn stores_data(&self) -> bool {
        match &self.kind {
            BindingKind::Bytes { data, .. } => data.is_some(),
            BindingKind::Buffer(handle) => handle.is_some(),
            BindingKind::Texture(handle) => handle.is_some(),
            BindingKind::Sampler(handle) => handle.is_some(),
        }
    }
}

/// Ordered bindings a shader expects (roughly one descriptor set)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShaderDataLayout<'a> {
    pub name: &'a str,
    pub bindings: Vec<ShaderBinding<'a>>,
}

impl<'a> ShaderDataLayout<'a> {
    pub fn new(name: &'a str) -> Self {
        Self { name, bindings: Vec::new() }
    }

    /// Append a binding
    pub fn with(mut self, binding: ShaderBinding<'a>) -> Self {
        self.bindings.push(binding);
        self
    }

    /// True when every binding carries its payload
    pub fn stores_data(&self) -> bool {
        !self.bindings.is_empty() && self.bindings.iter().all(ShaderBinding::stores_data)
    }

    /// Find a binding by label
    pub fn binding(&self, label: &str) -> Option<&ShaderBinding<'a>> {
        self.bindings.iter().find(|b| b.label == label)
    }

    /// Check the binding count and label uniqueness
    pub fn validate(&self) -> Result<()> {
        if self.bindings.len() > MAX_LAYOUT_BINDINGS {
            return Err(Error::InvalidResource(format!(
                "shader data layout '{}' has {} bindings (max {})",
                self.name,
                self.bindings.len(),
                MAX_LAYOUT_BINDINGS
            )));
        }
        for (i, binding) in self.bindings.iter().enumerate() {
            if self.bindings[..i].iter().any(|b| b.label == binding.label) {
                return Err(Error::InvalidResource(format!(
                    "shader data layout '{}' repeats label '{}'",
                    self.name, binding.label
                )));
            }
        }
        Ok(())
    }
}

/// Types that describe (and supply) their own shader bindings
pub trait ShaderData {
    /// Layout only when `data` is `None`; layout plus payloads otherwise.
    fn layout(data: Option<&Self>) -> ShaderDataLayout<'_>;

    /// `Self::layout(Some(self))`
    fn shader_data(&self) -> ShaderDataLayout<'_>
    where
        Self: Sized,
    {
        Self::layout(Some(self))
    }
}

/// Type-erased reference to a [`ShaderData`] implementation, stored in
/// pipeline descriptions.
#[derive(Clone, Copy)]
pub struct ShaderDataDesc {
    type_name: &'static str,
    layout_fn: fn() -> ShaderDataLayout<'static>,
}

impl ShaderDataDesc {
    pub fn of<T: ShaderData + 'static>() -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            layout_fn: || T::layout(None),
        }
    }

    /// The layout-only answer of the described type
    pub fn layout(&self) -> ShaderDataLayout<'static> {
        (self.layout_fn)()
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for ShaderDataDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderDataDesc").field("type_name", &self.type_name).finish()
    }
}

#[cfg(test)]
#[path = "shader_data_tests.rs"]
mod tests;

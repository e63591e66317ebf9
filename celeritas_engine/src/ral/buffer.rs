/// Buffer kinds and creation flags

use bitflags::bitflags;

/// What a buffer is bound as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BufferType {
    /// Generic data; treated as vertex data unless created with `STORAGE`
    #[default]
    Default,
    Vertex,
    Index,
    Uniform,
}

bitflags! {
    /// Where a buffer lives and how it is accessed
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BufferFlags: u32 {
        /// Updated from the CPU every frame or so
        const CPU = 1 << 0;
        /// Written once, read by the GPU
        const GPU = 1 << 1;
        /// Bindable as a shader storage buffer
        const STORAGE = 1 << 2;
    }
}

impl BufferType {
    pub fn name(self) -> &'static str {
        match self {
            BufferType::Default => "default",
            BufferType::Vertex => "vertex",
            BufferType::Index => "index",
            BufferType::Uniform => "uniform",
        }
    }
}

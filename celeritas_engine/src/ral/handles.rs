//! Handle types for every GPU-side resource kind.

crate::define_handle! {
    /// Vertex, index, uniform or storage buffer
    pub struct BufferHandle => "buffer";
    /// 2D, 3D, array or cube texture
    pub struct TextureHandle => "texture";
    pub struct SamplerHandle => "sampler";
    pub struct ShaderHandle => "shader";
    /// Per-pipeline binding bookkeeping (uniform slots by label)
    pub struct PipelineLayoutHandle => "pipeline_layout";
    pub struct PipelineHandle => "pipeline";
    pub struct RenderpassHandle => "renderpass";
}

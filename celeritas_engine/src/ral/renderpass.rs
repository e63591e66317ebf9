/// Renderpass descriptions

use crate::error::{Error, Result};
use crate::ral::TextureHandle;

/// Where a renderpass draws and what it clears on begin
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderpassDesc {
    pub debug_name: String,
    /// Draw to the window's framebuffer. Excludes attachments.
    pub default_framebuffer: bool,
    pub color_target: Option<TextureHandle>,
    pub depth_stencil: Option<TextureHandle>,
    /// Colour written to the colour target on begin; `None` keeps its contents
    pub clear_colour: Option<[f32; 4]>,
    /// Reset depth to 1.0 on begin
    pub clear_depth: bool,
}

impl RenderpassDesc {
    /// Pass targeting the window framebuffer (cleared by `begin_frame`)
    pub fn default_framebuffer(debug_name: impl Into<String>) -> Self {
        Self {
            debug_name: debug_name.into(),
            default_framebuffer: true,
            ..Default::default()
        }
    }

    /// Offscreen pass with a colour and/or depth attachment
    pub fn offscreen(
        debug_name: impl Into<String>,
        color_target: Option<TextureHandle>,
        depth_stencil: Option<TextureHandle>,
    ) -> Self {
        Self {
            debug_name: debug_name.into(),
            default_framebuffer: false,
            color_target,
            depth_stencil,
            clear_colour: color_target.map(|_| [0.0, 0.0, 0.0, 1.0]),
            clear_depth: depth_stencil.is_some(),
        }
    }

    /// Depth attachment only (shadow maps)
    pub fn depth_only(&self) -> bool {
        self.depth_stencil.is_some() && self.color_target.is_none()
    }

    /// The default framebuffer takes no attachments; an offscreen pass needs at least one.
    pub fn validate(&self) -> Result<()> {
        let has_attachments = self.color_target.is_some() || self.depth_stencil.is_some();
        if self.default_framebuffer && has_attachments {
            return Err(Error::InvalidResource(format!(
                "renderpass '{}' targets the default framebuffer but declares attachments",
                self.debug_name
            )));
        }
        if !self.default_framebuffer && !has_attachments {
            return Err(Error::InvalidResource(format!(
                "offscreen renderpass '{}' has no attachments",
                self.debug_name
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "renderpass_tests.rs"]
mod tests;

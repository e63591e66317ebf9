//! Unit tests for renderpass descriptions

use super::*;
use crate::memory::PoolHandle;

#[test]
fn test_default_framebuffer_with_colour_target_is_invalid() {
    let mut desc = RenderpassDesc::default_framebuffer("main");
    assert!(desc.validate().is_ok());

    desc.color_target = Some(TextureHandle::from_parts(0, 0));
    assert!(matches!(desc.validate(), Err(Error::InvalidResource(_))));
}

#[test]
fn test_offscreen_requires_attachment() {
    assert!(RenderpassDesc::offscreen("none", None, None).validate().is_err());

    let shadow = RenderpassDesc::offscreen("shadow", None, Some(TextureHandle::from_parts(1, 0)));
    assert!(shadow.validate().is_ok());
    assert!(shadow.depth_only());
    assert!(shadow.clear_depth);
    assert!(shadow.clear_colour.is_none());
}

#[test]
fn test_offscreen_colour_clears_colour() {
    let pass = RenderpassDesc::offscreen("post", Some(TextureHandle::from_parts(2, 0)), None);
    assert!(!pass.depth_only());
    assert_eq!(pass.clear_colour, Some([0.0, 0.0, 0.0, 1.0]));
}

/// Render and depth target entries

use std::sync::Arc;
use crate::graphics_device::{DeviceView, TextureDesc, TextureFormat};
use crate::handle::TextureId;

/// Descriptor for a render target backed by a new texture
#[derive(Debug, Clone)]
pub struct RenderTargetDesc {
    /// Texture to create; usage must include `RENDER_TARGET`
    pub texture_desc: TextureDesc,
    /// Render-target view format
    pub format: TextureFormat,
}

/// Descriptor for a depth target backed by a new texture
#[derive(Debug, Clone)]
pub struct DepthTargetDesc {
    /// Texture to create; usage must include `DEPTH_STENCIL`
    pub texture_desc: TextureDesc,
    /// Depth-stencil view format
    pub format: TextureFormat,
}

/// A texture plus a render-target view
#[derive(Clone)]
pub struct RenderTarget {
    pub texture: TextureId,
    pub(crate) view: Arc<dyn DeviceView>,
}

impl RenderTarget {
    pub fn view(&self) -> &Arc<dyn DeviceView> {
        &self.view
    }
}

/// One slice (or cube face) of a depth texture plus its depth-stencil view
#[derive(Clone)]
pub struct DepthTarget {
    pub texture: TextureId,
    /// First array slice the view covers
    pub slice: u32,
    pub(crate) view: Arc<dyn DeviceView>,
}

impl DepthTarget {
    pub fn view(&self) -> &Arc<dyn DeviceView> {
        &self.view
    }
}

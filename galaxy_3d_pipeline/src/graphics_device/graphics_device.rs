/// GraphicsDevice trait - device factory and presentation interface

use std::sync::Arc;

use crate::error::Result;
use crate::graphics_device::{
    DeviceTexture, DeviceBuffer, DeviceView, DeviceSampler, DeviceShader,
    DeviceRasterizerState, DeviceBlendState, DeviceDepthStencilState, DeviceContext,
    TextureDesc, BufferDesc, ViewKind, ViewDesc, SamplerDesc, ShaderDesc,
    RasterizerDesc, BlendDesc, DepthStencilDesc,
};

// ============================================================================
// Capabilities
// ============================================================================

/// Hardware feature level reported by the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FeatureLevel {
    Level10_0,
    Level10_1,
    Level11_0,
    Level11_1,
    Level12_0,
}

/// Device limits consumed when creating fixed-function state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceCapabilities {
    /// Highest supported anisotropic filtering level
    pub max_anisotropy: u32,
    pub feature_level: FeatureLevel,
}

impl Default for DeviceCapabilities {
    fn default() -> Self {
        Self {
            max_anisotropy: 16,
            feature_level: FeatureLevel::Level11_0,
        }
    }
}

// ============================================================================
// GraphicsDevice trait
// ============================================================================

/// Graphics device trait
///
/// Owns the physical device and swap chain and materializes backing
/// objects for the resource pool. Creation never panics: failures come back
/// as `Err`, and the pool turns them into invalid handles.
pub trait GraphicsDevice: Send {
    /// Create a texture
    ///
    /// # Arguments
    ///
    /// * `desc` - Texture descriptor, including optional initial data
    fn create_texture(&mut self, desc: &TextureDesc) -> Result<Arc<dyn DeviceTexture>>;

    /// Create a buffer
    fn create_buffer(&mut self, desc: &BufferDesc) -> Result<Arc<dyn DeviceBuffer>>;

    /// Create a view of `texture`
    ///
    /// # Arguments
    ///
    /// * `kind` - What the view exposes the texture as
    /// * `texture` - Backing texture
    /// * `desc` - Format and subresource range
    fn create_view(
        &mut self,
        kind: ViewKind,
        texture: &Arc<dyn DeviceTexture>,
        desc: &ViewDesc,
    ) -> Result<Arc<dyn DeviceView>>;

    fn create_sampler(&mut self, desc: &SamplerDesc) -> Result<Arc<dyn DeviceSampler>>;

    fn create_rasterizer_state(&mut self, desc: &RasterizerDesc) -> Result<Arc<dyn DeviceRasterizerState>>;

    fn create_blend_state(&mut self, desc: &BlendDesc) -> Result<Arc<dyn DeviceBlendState>>;

    fn create_depth_stencil_state(&mut self, desc: &DepthStencilDesc) -> Result<Arc<dyn DeviceDepthStencilState>>;

    /// Compile and reflect every stage of a shader program
    fn compile_shader(&mut self, desc: &ShaderDesc) -> Result<Arc<dyn DeviceShader>>;

    /// Present the back buffer
    fn present(&mut self) -> Result<()>;

    /// Resize the swap chain; the back buffer texture keeps its identity
    fn resize(&mut self, width: u32, height: u32) -> Result<()>;

    /// Log and return the number of device objects still alive
    fn report_live_objects(&self) -> usize;

    fn capabilities(&self) -> DeviceCapabilities;

    /// Swap chain back buffer
    fn back_buffer(&self) -> Arc<dyn DeviceTexture>;

    /// Immediate context for state setting and draw submission
    fn context(&mut self) -> &mut dyn DeviceContext;
}

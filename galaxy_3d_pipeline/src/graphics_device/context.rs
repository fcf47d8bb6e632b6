/// Immediate-mode state setting and draw submission

use std::sync::Arc;
use crate::error::Result;
use crate::graphics_device::{
    DeviceBuffer, DeviceView, DeviceSampler, DeviceShader, DeviceTexture,
    DeviceRasterizerState, DeviceBlendState, DeviceDepthStencilState, ShaderStage,
};

/// Primitive topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrimitiveTopology {
    #[default]
    PointList,
    LineList,
    LineStrip,
    TriangleList,
    TriangleStrip,
}

impl PrimitiveTopology {
    /// Triangles produced by `count` vertices or indices
    pub fn triangle_count(self, count: u32) -> u32 {
        match self {
            PrimitiveTopology::TriangleList => count / 3,
            PrimitiveTopology::TriangleStrip => count.saturating_sub(2),
            _ => 0,
        }
    }
}

/// Viewport rectangle in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    /// Full [0, 1] depth range viewport anchored at the origin
    pub fn from_size(width: u32, height: u32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: width as f32,
            height: height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::from_size(0, 0)
    }
}

/// Integer rectangle (scissor)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

/// Which planes of a depth-stencil view to clear
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthStencilClear {
    pub depth: bool,
    pub stencil: bool,
}

/// Device context
///
/// Records pipeline state changes and draws in submission order. Setters
/// take already-resolved backing objects; handle resolution is done by the
/// renderer before it calls in here.
pub trait DeviceContext: Send {
    // ===== PIPELINE STATE =====

    fn set_shader(&mut self, shader: Option<&Arc<dyn DeviceShader>>) -> Result<()>;

    fn set_primitive_topology(&mut self, topology: PrimitiveTopology) -> Result<()>;

    fn set_vertex_buffer(&mut self, buffer: Option<&Arc<dyn DeviceBuffer>>, stride: u32) -> Result<()>;

    fn set_index_buffer(&mut self, buffer: Option<&Arc<dyn DeviceBuffer>>) -> Result<()>;

    /// Bind a read-write structured buffer to the compute stage
    fn set_rw_buffer(&mut self, slot: u32, buffer: Option<&Arc<dyn DeviceBuffer>>) -> Result<()>;

    fn set_render_targets(
        &mut self,
        targets: &[Arc<dyn DeviceView>],
        depth: Option<&Arc<dyn DeviceView>>,
    ) -> Result<()>;

    fn set_viewport(&mut self, viewport: Viewport) -> Result<()>;

    fn set_scissor_rect(&mut self, rect: Rect) -> Result<()>;

    fn set_rasterizer_state(&mut self, state: Option<&Arc<dyn DeviceRasterizerState>>) -> Result<()>;

    fn set_blend_state(&mut self, state: Option<&Arc<dyn DeviceBlendState>>) -> Result<()>;

    fn set_depth_stencil_state(
        &mut self,
        state: Option<&Arc<dyn DeviceDepthStencilState>>,
        stencil_ref: u32,
    ) -> Result<()>;

    // ===== RESOURCE BINDING =====

    fn set_constant_buffer(&mut self, stage: ShaderStage, slot: u32, buffer: &Arc<dyn DeviceBuffer>) -> Result<()>;

    /// Bind consecutive shader-resource views starting at `slot`
    fn set_shader_resources(
        &mut self,
        stage: ShaderStage,
        slot: u32,
        views: &[Arc<dyn DeviceView>],
    ) -> Result<()>;

    fn set_unordered_access(&mut self, stage: ShaderStage, slot: u32, view: &Arc<dyn DeviceView>) -> Result<()>;

    fn set_sampler(&mut self, stage: ShaderStage, slot: u32, sampler: &Arc<dyn DeviceSampler>) -> Result<()>;

    // ===== SUBMISSION =====

    fn draw(&mut self, vertex_count: u32, first_vertex: u32) -> Result<()>;

    fn draw_indexed(&mut self, index_count: u32, first_index: u32, base_vertex: i32) -> Result<()>;

    fn draw_indexed_instanced(&mut self, index_count: u32, instance_count: u32) -> Result<()>;

    fn dispatch(&mut self, x: u32, y: u32, z: u32) -> Result<()>;

    // ===== TRANSFER =====

    /// Copy the whole of `src` mip 0 into `dst` mip `dst_mip`
    fn copy_texture(
        &mut self,
        dst: &Arc<dyn DeviceTexture>,
        dst_mip: u32,
        src: &Arc<dyn DeviceTexture>,
    ) -> Result<()>;

    /// Fill mips 1.. from mip 0 (texture must allow mip generation)
    fn generate_mips(&mut self, view: &Arc<dyn DeviceView>) -> Result<()>;

    fn clear_render_target(&mut self, view: &Arc<dyn DeviceView>, color: [f32; 4]) -> Result<()>;

    fn clear_depth_stencil(
        &mut self,
        view: &Arc<dyn DeviceView>,
        planes: DepthStencilClear,
        depth: f32,
        stencil: u8,
    ) -> Result<()>;

    // ===== DEBUG MARKERS =====

    fn begin_event(&mut self, name: &str);

    fn end_event(&mut self);
}

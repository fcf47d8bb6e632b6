/// Frame-level command descriptors and statistics

use glam::Vec2;

use crate::handle::{BufferId, TextureId};

/// What `begin_render` clears on the bound targets
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearCommand {
    pub clear_color: bool,
    pub clear_depth: bool,
    pub clear_stencil: bool,
    pub color: [f32; 4],
    pub depth: f32,
    pub stencil: u8,
}

impl ClearCommand {
    /// Clear the color targets only
    pub fn color(color: [f32; 4]) -> Self {
        Self { clear_color: true, ..Self::default() }.with_color(color)
    }

    /// Clear the depth plane to `depth`
    pub fn depth(depth: f32) -> Self {
        Self { clear_depth: true, depth, ..Self::default() }
    }

    /// Clear color and depth
    pub fn color_depth(color: [f32; 4], depth: f32) -> Self {
        Self { clear_color: true, clear_depth: true, depth, ..Self::default() }.with_color(color)
    }

    fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }
}

impl Default for ClearCommand {
    fn default() -> Self {
        Self {
            clear_color: false,
            clear_depth: false,
            clear_stencil: false,
            color: [0.0, 0.0, 0.0, 1.0],
            depth: 1.0,
            stencil: 0,
        }
    }
}

/// A textured quad placed in screen pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawQuadOnScreenCommand {
    /// Quad size in pixels
    pub dimensions_in_pixels: Vec2,
    /// Position of the bottom-left corner in pixels
    pub bottom_left_corner: Vec2,
    pub texture: TextureId,
    /// Sample the texture as a depth buffer (single channel)
    pub is_depth_texture: bool,
    pub num_channels: i32,
}

impl DrawQuadOnScreenCommand {
    pub fn new(texture: TextureId, dimensions_in_pixels: Vec2, bottom_left_corner: Vec2) -> Self {
        Self {
            dimensions_in_pixels,
            bottom_left_corner,
            texture,
            is_depth_texture: false,
            num_channels: 4,
        }
    }
}

/// Geometry of a unit quad, created by the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuadBuffers {
    pub vertex_buffer: BufferId,
    pub index_buffer: BufferId,
}

/// Per-frame draw statistics, reset by `begin_frame`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RendererStats {
    pub draw_calls: u32,
    pub vertices: u64,
    pub indices: u64,
    pub triangles: u64,
}

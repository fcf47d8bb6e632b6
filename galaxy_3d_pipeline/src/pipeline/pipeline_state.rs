/// Logical pipeline state
///
/// The set of handles the next draw will use. The renderer keeps the state
/// being edited and the state of the last submission; `changes` tells
/// `apply()` which device setters actually need calling.

use bitflags::bitflags;

use crate::graphics_device::{PrimitiveTopology, Viewport};
use crate::handle::{
    ShaderId, BufferId, RenderTargetId, DepthTargetId, RasterizerStateId, BlendStateId, DepthStencilStateId,
};
use crate::engine_warn;

const SOURCE: &str = "galaxy3d::PipelineState";

/// Simultaneously bound color targets
pub const MAX_RENDER_TARGETS: usize = 6;

bitflags! {
    /// Parts of the pipeline that differ between two states
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PipelineChanges: u32 {
        const SHADER = 1 << 0;
        const VERTEX_BUFFER = 1 << 1;
        const INDEX_BUFFER = 1 << 2;
        const RW_BUFFER = 1 << 3;
        const RENDER_TARGETS = 1 << 4;
        const DEPTH_TARGET = 1 << 5;
        const RASTERIZER_STATE = 1 << 6;
        const BLEND_STATE = 1 << 7;
        const DEPTH_STENCIL_STATE = 1 << 8;
        const VIEWPORT = 1 << 9;
        const TOPOLOGY = 1 << 10;

        /// Render targets and depth target are bound together
        const OUTPUT_MERGER = Self::RENDER_TARGETS.bits() | Self::DEPTH_TARGET.bits();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineState {
    pub shader: ShaderId,
    pub vertex_buffer: BufferId,
    pub index_buffer: BufferId,
    /// Read-write compute buffer bound to slot 0
    pub rw_buffer: BufferId,
    pub render_targets: [RenderTargetId; MAX_RENDER_TARGETS],
    pub depth_target: DepthTargetId,
    pub rasterizer_state: RasterizerStateId,
    pub blend_state: BlendStateId,
    pub depth_stencil_state: DepthStencilStateId,
    pub stencil_ref: u32,
    pub viewport: Viewport,
    pub topology: PrimitiveTopology,
}

impl Default for PipelineState {
    fn default() -> Self {
        Self {
            shader: ShaderId::INVALID,
            vertex_buffer: BufferId::INVALID,
            index_buffer: BufferId::INVALID,
            rw_buffer: BufferId::INVALID,
            render_targets: [RenderTargetId::INVALID; MAX_RENDER_TARGETS],
            depth_target: DepthTargetId::INVALID,
            rasterizer_state: RasterizerStateId::INVALID,
            blend_state: BlendStateId::INVALID,
            depth_stencil_state: DepthStencilStateId::INVALID,
            stencil_ref: 0,
            viewport: Viewport::default(),
            topology: PrimitiveTopology::PointList,
        }
    }
}

impl PipelineState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a single color target; every other slot is cleared
    pub fn bind_render_target(&mut self, target: RenderTargetId) {
        self.render_targets = [RenderTargetId::INVALID; MAX_RENDER_TARGETS];
        self.render_targets[0] = target;
    }

    /// Bind color targets to slots 0..n
    pub fn bind_render_targets(&mut self, targets: &[RenderTargetId]) {
        if targets.len() > MAX_RENDER_TARGETS {
            engine_warn!(
                SOURCE,
                "{} render targets requested, only {} can be bound",
                targets.len(), MAX_RENDER_TARGETS
            );
        }
        self.render_targets = [RenderTargetId::INVALID; MAX_RENDER_TARGETS];
        for (slot, &target) in self.render_targets.iter_mut().zip(targets) {
            *slot = target;
        }
    }

    pub fn unbind_render_targets(&mut self) {
        self.render_targets = [RenderTargetId::INVALID; MAX_RENDER_TARGETS];
    }

    pub fn bind_depth_target(&mut self, target: DepthTargetId) {
        self.depth_target = target;
    }

    pub fn unbind_depth_target(&mut self) {
        self.depth_target = DepthTargetId::INVALID;
    }

    /// Valid color targets, in slot order
    pub fn bound_render_targets(&self) -> Vec<RenderTargetId> {
        self.render_targets.iter().copied().filter(|target| target.is_valid()).collect()
    }

    /// Drop the shader selection; everything else stays bound
    pub fn reset_shader(&mut self) {
        self.shader = ShaderId::INVALID;
    }

    /// What differs from `previous`
    pub fn changes(&self, previous: &PipelineState) -> PipelineChanges {
        let mut changes = PipelineChanges::empty();
        changes.set(PipelineChanges::SHADER, self.shader != previous.shader);
        changes.set(PipelineChanges::VERTEX_BUFFER, self.vertex_buffer != previous.vertex_buffer);
        changes.set(PipelineChanges::INDEX_BUFFER, self.index_buffer != previous.index_buffer);
        changes.set(PipelineChanges::RW_BUFFER, self.rw_buffer != previous.rw_buffer);
        changes.set(PipelineChanges::RENDER_TARGETS, self.render_targets != previous.render_targets);
        changes.set(PipelineChanges::DEPTH_TARGET, self.depth_target != previous.depth_target);
        changes.set(PipelineChanges::RASTERIZER_STATE, self.rasterizer_state != previous.rasterizer_state);
        changes.set(PipelineChanges::BLEND_STATE, self.blend_state != previous.blend_state);
        changes.set(
            PipelineChanges::DEPTH_STENCIL_STATE,
            self.depth_stencil_state != previous.depth_stencil_state || self.stencil_ref != previous.stencil_ref,
        );
        changes.set(PipelineChanges::VIEWPORT, self.viewport != previous.viewport);
        changes.set(PipelineChanges::TOPOLOGY, self.topology != previous.topology);
        changes
    }
}

#[cfg(test)]
#[path = "pipeline_state_tests.rs"]
mod tests;

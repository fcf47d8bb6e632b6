/// Renderer - the pipeline-state front end applications draw through
///
/// Owns the resource pool, the shaders and the deferred bind queue, and
/// tracks the pipeline state being edited next to the state of the last
/// submission. Setters only record intent. `apply()` pushes what changed to
/// the device, uploads dirty constant buffers and flushes queued texture and
/// sampler bindings; a `draw*` call then submits.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

use crate::command::CommandQueue;
use crate::config::RendererConfig;
use crate::error::{Error, Result};
use crate::graphics_device::{
    BlendDesc, BufferDesc, DepthStencilClear, DepthStencilDesc, DeviceBlendState, DeviceBuffer, DeviceContext,
    DeviceDepthStencilState, DeviceRasterizerState, DeviceShader, DeviceView, GraphicsDevice, PrimitiveTopology,
    RasterizerDesc, Rect, SamplerDesc, ShaderDesc, ShaderStageDesc, TextureDesc, TextureFormat, TextureUsage,
    Viewport,
};
use crate::handle::{
    BlendStateId, BufferId, DepthStencilStateId, DepthTargetId, RasterizerStateId, RenderTargetId, SamplerId,
    ShaderId, TextureId,
};
use crate::pipeline::{PipelineChanges, PipelineState};
use crate::renderer::{
    ClearCommand, DefaultBlendState, DefaultDepthStencilState, DefaultRasterizerState, DefaultSamplerState,
    DefaultStates, DrawQuadOnScreenCommand, QuadBuffers, RendererStats,
};
use crate::resource::{Buffer, BufferKind, DepthTargetDesc, ImageLoader, RenderTargetDesc, ResourcePool};
use crate::shader::{ConstantResolver, Shader};
use crate::utils::lock;
use crate::{engine_err, engine_error, engine_info, engine_trace, engine_warn};

const SOURCE: &str = "galaxy3d::Renderer";

// ============================================================================
// Resolved state changes
// ============================================================================

/// A pipeline change with its device objects looked up, ready to submit
enum StateChange {
    Shader(Arc<dyn DeviceShader>),
    VertexBuffer(Option<Arc<dyn DeviceBuffer>>, u32),
    IndexBuffer(Option<Arc<dyn DeviceBuffer>>),
    RwBuffer(Option<Arc<dyn DeviceBuffer>>),
    OutputMerger(Vec<Arc<dyn DeviceView>>, Option<Arc<dyn DeviceView>>),
    RasterizerState(Option<Arc<dyn DeviceRasterizerState>>),
    BlendState(Option<Arc<dyn DeviceBlendState>>),
    DepthStencilState(Option<Arc<dyn DeviceDepthStencilState>>, u32),
    Viewport(Viewport),
}

impl StateChange {
    fn submit(&self, context: &mut dyn DeviceContext) -> Result<()> {
        match self {
            StateChange::Shader(program) => context.set_shader(Some(program)),
            StateChange::VertexBuffer(buffer, stride) => context.set_vertex_buffer(buffer.as_ref(), *stride),
            StateChange::IndexBuffer(buffer) => context.set_index_buffer(buffer.as_ref()),
            StateChange::RwBuffer(buffer) => context.set_rw_buffer(0, buffer.as_ref()),
            StateChange::OutputMerger(targets, depth) => context.set_render_targets(targets, depth.as_ref()),
            StateChange::RasterizerState(state) => context.set_rasterizer_state(state.as_ref()),
            StateChange::BlendState(state) => context.set_blend_state(state.as_ref()),
            StateChange::DepthStencilState(state, stencil_ref) => {
                context.set_depth_stencil_state(state.as_ref(), *stencil_ref)
            }
            StateChange::Viewport(viewport) => context.set_viewport(*viewport),
        }
    }
}

// ============================================================================
// Renderer
// ============================================================================

pub struct Renderer {
    device: Arc<Mutex<dyn GraphicsDevice>>,
    config: RendererConfig,
    pool: ResourcePool,
    shaders: Vec<Shader>,
    constants: ConstantResolver,
    queue: CommandQueue,
    state: PipelineState,
    previous: PipelineState,
    defaults: DefaultStates,
    stats: RendererStats,
    back_buffer: TextureId,
    back_buffer_target: RenderTargetId,
    default_depth_target: DepthTargetId,
    width: u32,
    height: u32,
    /// Next `apply()` resubmits every part of the pipeline
    force_full_apply: bool,
    /// Device topology matches `previous.topology`
    topology_sent: bool,
    /// `apply()` ran since the last draw
    applied: bool,
    shut_down: bool,
}

impl Renderer {
    /// Build the pool over `device` and create the default targets and states
    ///
    /// The swap chain back buffer becomes texture 0 / render target 0. A
    /// depth target at window size is created next, then the default
    /// fixed-function states.
    pub fn new(
        device: Arc<Mutex<dyn GraphicsDevice>>,
        config: RendererConfig,
        image_loader: Option<Arc<dyn ImageLoader>>,
    ) -> Result<Self> {
        let (width, height) = (config.device.width, config.device.height);
        let mut pool = ResourcePool::new(device.clone())
            .with_roots(config.texture_root.as_str(), config.hdr_texture_root.as_str());
        if let Some(loader) = image_loader {
            pool = pool.with_image_loader(loader);
        }

        let (back_buffer, back_buffer_target) = pool.register_back_buffer();
        if !back_buffer_target.is_valid() {
            return Err(initialization_failed("Cannot create default render target"));
        }

        let default_depth_target = pool
            .create_depth_target(&default_depth_desc(width, height, config.depth_format))
            .first()
            .copied()
            .unwrap_or(DepthTargetId::INVALID);
        if !default_depth_target.is_valid() {
            return Err(initialization_failed("Cannot create default depth target"));
        }

        let max_anisotropy = lock(&device).capabilities().max_anisotropy;
        let defaults = DefaultStates::create(&mut pool, max_anisotropy)?;

        let mut state = PipelineState::new();
        state.viewport = Viewport::from_size(width, height);

        engine_info!(SOURCE, "Renderer initialized ({}x{})", width, height);

        Ok(Self {
            device,
            constants: ConstantResolver::new(config.constant_lookup),
            config,
            pool,
            shaders: Vec::new(),
            queue: CommandQueue::new(),
            previous: state.clone(),
            state,
            defaults,
            stats: RendererStats::default(),
            back_buffer,
            back_buffer_target,
            default_depth_target,
            width,
            height,
            force_full_apply: true,
            topology_sent: false,
            applied: false,
            shut_down: false,
        })
    }

    // ===== ACCESSORS =====

    pub fn device(&self) -> &Arc<Mutex<dyn GraphicsDevice>> {
        &self.device
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Shared pool access; texture loading from other threads goes through here
    pub fn pool(&self) -> &ResourcePool {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut ResourcePool {
        &mut self.pool
    }

    /// Pipeline state the next `apply()` will submit
    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Pipeline state of the last submission
    pub fn previous_state(&self) -> &PipelineState {
        &self.previous
    }

    /// Bind commands waiting for the next `apply()`
    pub fn pending_commands(&self) -> &CommandQueue {
        &self.queue
    }

    pub fn stats(&self) -> RendererStats {
        self.stats
    }

    // ===== DEFAULTS =====

    /// Texture wrapping the swap chain back buffer
    pub fn back_buffer_texture(&self) -> TextureId {
        self.back_buffer
    }

    pub fn default_render_target(&self) -> RenderTargetId {
        self.back_buffer_target
    }

    pub fn default_depth_target(&self) -> DepthTargetId {
        self.default_depth_target
    }

    pub fn default_rasterizer_state(&self, state: DefaultRasterizerState) -> RasterizerStateId {
        self.defaults.rasterizer(state)
    }

    pub fn default_blend_state(&self, state: DefaultBlendState) -> BlendStateId {
        self.defaults.blend(state)
    }

    pub fn default_sampler(&self, state: DefaultSamplerState) -> SamplerId {
        self.defaults.sampler(state)
    }

    pub fn default_depth_stencil_state(&self, state: DefaultDepthStencilState) -> DepthStencilStateId {
        self.defaults.depth_stencil(state)
    }

    // ===== WINDOW =====

    pub fn window_width(&self) -> u32 {
        self.width
    }

    pub fn window_height(&self) -> u32 {
        self.height
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    pub fn window_dimensions(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    /// Resize the swap chain, then rebuild the back buffer views and the
    /// default depth target in place
    ///
    /// Handles of the back buffer and the default depth target are kept.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        lock(&self.device).resize(width, height)?;
        self.width = width;
        self.height = height;

        if !self.pool.refresh_back_buffer(self.back_buffer, self.back_buffer_target) {
            return Err(engine_err!(SOURCE, "Cannot rebuild the back buffer after resize to {}x{}", width, height));
        }
        let depth_desc = default_depth_desc(width, height, self.config.depth_format);
        if !self.pool.recycle_depth_target(self.default_depth_target, &depth_desc) {
            return Err(engine_err!(SOURCE, "Cannot rebuild the default depth target after resize"));
        }

        self.force_full_apply = true;
        engine_info!(SOURCE, "Resized to {}x{}", width, height);
        Ok(())
    }

    // ===== RESOURCE CREATION =====

    pub fn create_texture_2d(&mut self, desc: &TextureDesc) -> TextureId {
        self.pool.create_texture_2d(desc)
    }

    /// Load a texture from the texture root; repeated names return the
    /// first handle
    pub fn create_texture_from_file(&self, file_name: &str, generate_mips: bool) -> TextureId {
        self.pool.create_texture_from_file(file_name, generate_mips)
    }

    pub fn create_hdr_texture(&self, file_name: &str) -> TextureId {
        self.pool.create_hdr_texture(file_name)
    }

    pub fn create_cubemap_from_face_textures(&mut self, face_files: &[&str], generate_mips: bool) -> TextureId {
        self.pool.create_cubemap_from_face_textures(face_files, generate_mips)
    }

    pub fn texture_by_name(&self, name: &str) -> TextureId {
        self.pool.texture_by_name(name)
    }

    pub fn create_buffer(&mut self, desc: &BufferDesc) -> BufferId {
        self.pool.create_buffer(desc)
    }

    /// Overwrite the contents of a CPU-writable vertex buffer
    pub fn update_buffer(&self, buffer: BufferId, data: &[u8]) -> Result<()> {
        self.pool.update_buffer(BufferKind::Vertex, buffer, data).map_err(|e| {
            engine_error!(SOURCE, "Cannot update vertex buffer {}: {}", buffer, e);
            e
        })
    }

    pub fn create_sampler(&mut self, desc: &SamplerDesc) -> SamplerId {
        self.pool.create_sampler(desc)
    }

    pub fn create_rasterizer_state(&mut self, desc: &RasterizerDesc) -> RasterizerStateId {
        self.pool.create_rasterizer_state(desc)
    }

    pub fn create_blend_state(&mut self, desc: &BlendDesc) -> BlendStateId {
        self.pool.create_blend_state(desc)
    }

    pub fn create_depth_stencil_state(&mut self, desc: &DepthStencilDesc) -> DepthStencilStateId {
        self.pool.create_depth_stencil_state(desc)
    }

    pub fn create_render_target(&mut self, desc: &RenderTargetDesc) -> RenderTargetId {
        self.pool.create_render_target(desc)
    }

    pub fn create_depth_target(&mut self, desc: &DepthTargetDesc) -> Vec<DepthTargetId> {
        self.pool.create_depth_target(desc)
    }

    // ===== SHADERS =====

    /// Compile a shader; stage paths are resolved against the shader root
    ///
    /// Compilation failure is logged and yields `ShaderId::INVALID`.
    pub fn create_shader(&mut self, desc: &ShaderDesc) -> ShaderId {
        let desc = self.resolve_shader_paths(desc);
        let created = Shader::new(&mut *lock(&self.device), &desc);
        match created {
            Ok(shader) => {
                self.shaders.push(shader);
                ShaderId::from_index(self.shaders.len() - 1)
            }
            Err(e) => {
                engine_error!(SOURCE, "Cannot create shader '{}': {}", desc.name, e);
                ShaderId::INVALID
            }
        }
    }

    /// Recompile `id` from `desc`, keeping its handle
    ///
    /// An unknown handle creates a new shader instead. A failed recompile
    /// keeps the previous program.
    pub fn reload_shader(&mut self, desc: &ShaderDesc, id: ShaderId) -> ShaderId {
        let Some(index) = self.shader_index(id) else {
            engine_warn!(SOURCE, "Reload shader called on uninitialized shader.");
            return self.create_shader(desc);
        };
        let desc = self.resolve_shader_paths(desc);
        let reloaded = self.shaders[index].reload_from(&mut *lock(&self.device), &desc);
        if reloaded {
            self.invalidate_shader_binding(id);
        }
        id
    }

    /// Reload every shader whose source changed on disk
    ///
    /// Returns the number of shaders reloaded.
    pub fn reload_shaders(&mut self) -> usize {
        let mut reloaded = Vec::new();
        {
            let mut device = lock(&self.device);
            for (index, shader) in self.shaders.iter_mut().enumerate() {
                if shader.has_source_file_been_updated() && shader.reload(&mut *device) {
                    reloaded.push((ShaderId::from_index(index), shader.name().to_string()));
                }
            }
        }
        for &(id, _) in &reloaded {
            self.invalidate_shader_binding(id);
        }

        if reloaded.is_empty() {
            engine_info!(SOURCE, "No updates have been made to shader source files");
        } else {
            engine_info!(SOURCE, "Reloaded {} Shaders:", reloaded.len());
            for (_, name) in &reloaded {
                engine_info!(SOURCE, "    {}", name);
            }
        }
        reloaded.len()
    }

    /// A reloaded program sits under the same handle; forget the submitted
    /// one so the next `apply()` binds it again
    fn invalidate_shader_binding(&mut self, id: ShaderId) {
        if self.state.shader == id || self.previous.shader == id {
            self.previous.shader = ShaderId::INVALID;
        }
    }

    /// Panics on a handle that was never returned by `create_shader`
    pub fn shader(&self, id: ShaderId) -> &Shader {
        match self.shader_index(id) {
            Some(index) => &self.shaders[index],
            None => panic!("shader handle {} is not live", id),
        }
    }

    pub fn try_shader(&self, id: ShaderId) -> Option<&Shader> {
        self.shader_index(id).map(|index| &self.shaders[index])
    }

    pub fn shader_desc(&self, id: ShaderId) -> &ShaderDesc {
        self.shader(id).desc()
    }

    pub fn shader_count(&self) -> usize {
        self.shaders.len()
    }

    fn shader_index(&self, id: ShaderId) -> Option<usize> {
        id.index().filter(|&index| index < self.shaders.len())
    }

    fn resolve_shader_paths(&self, desc: &ShaderDesc) -> ShaderDesc {
        let root = Path::new(&self.config.shader_root);
        let resolve = |path: &PathBuf| {
            if path.is_absolute() || path.starts_with(root) {
                path.clone()
            } else {
                root.join(path)
            }
        };
        ShaderDesc {
            name: desc.name.clone(),
            stages: desc
                .stages
                .iter()
                .map(|stage| ShaderStageDesc { stage: stage.stage, path: resolve(&stage.path) })
                .collect(),
        }
    }

    // ===== PIPELINE STATE =====

    pub fn set_shader(&mut self, id: ShaderId) {
        debug_assert!(self.shader_index(id).is_some(), "set_shader() with unknown handle {}", id);
        self.state.shader = id;
    }

    /// Clear the shader selection; every other binding stays
    pub fn reset_pipeline_state(&mut self) {
        self.state.reset_shader();
    }

    pub fn set_vertex_buffer(&mut self, buffer: BufferId) {
        self.state.vertex_buffer = buffer;
    }

    pub fn set_index_buffer(&mut self, buffer: BufferId) {
        self.state.index_buffer = buffer;
    }

    /// Read-write compute buffer bound to slot 0
    pub fn set_uav_buffer(&mut self, buffer: BufferId) {
        self.state.rw_buffer = buffer;
    }

    pub fn set_rasterizer_state(&mut self, state: RasterizerStateId) {
        self.state.rasterizer_state = state;
    }

    /// Ignored by the device while blending is disabled in the config
    pub fn set_blend_state(&mut self, state: BlendStateId) {
        self.state.blend_state = state;
    }

    pub fn set_depth_stencil_state(&mut self, state: DepthStencilStateId) {
        self.state.depth_stencil_state = state;
    }

    pub fn set_stencil_ref(&mut self, stencil_ref: u32) {
        self.state.stencil_ref = stencil_ref;
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.state.viewport = viewport;
    }

    pub fn set_viewport_size(&mut self, width: u32, height: u32) {
        self.state.viewport = Viewport::from_size(width, height);
    }

    /// Sent to the device immediately
    pub fn set_scissors_rect(&mut self, left: i32, right: i32, top: i32, bottom: i32) -> Result<()> {
        lock(&self.device).context().set_scissor_rect(Rect { left, top, right, bottom })
    }

    pub fn bind_render_target(&mut self, target: RenderTargetId) {
        self.state.bind_render_target(target);
    }

    pub fn bind_render_targets(&mut self, targets: &[RenderTargetId]) {
        self.state.bind_render_targets(targets);
    }

    pub fn unbind_render_targets(&mut self) {
        self.state.unbind_render_targets();
    }

    pub fn bind_depth_target(&mut self, target: DepthTargetId) {
        self.state.bind_depth_target(target);
    }

    pub fn unbind_depth_target(&mut self) {
        self.state.unbind_depth_target();
    }

    // ===== CONSTANTS =====

    /// Write `data` into constant `name` of the selected shader
    pub fn set_constant(&mut self, name: &str, data: &[u8]) -> bool {
        let Some(index) = self.selected_shader("set_constant", name) else {
            return false;
        };
        self.constants.set_constant(&mut self.shaders[index], name, data)
    }

    pub fn set_constant_1f(&mut self, name: &str, value: f32) -> bool {
        self.set_constant(name, bytemuck::bytes_of(&value))
    }

    pub fn set_constant_1i(&mut self, name: &str, value: i32) -> bool {
        self.set_constant(name, bytemuck::bytes_of(&value))
    }

    pub fn set_constant_2f(&mut self, name: &str, value: Vec2) -> bool {
        self.set_constant(name, bytemuck::bytes_of(&value))
    }

    pub fn set_constant_3f(&mut self, name: &str, value: Vec3) -> bool {
        self.set_constant(name, bytemuck::bytes_of(&value))
    }

    pub fn set_constant_4f(&mut self, name: &str, value: Vec4) -> bool {
        self.set_constant(name, bytemuck::bytes_of(&value))
    }

    pub fn set_constant_4x4f(&mut self, name: &str, value: Mat4) -> bool {
        self.set_constant(name, bytemuck::bytes_of(&value))
    }

    // ===== TEXTURES & SAMPLERS =====

    pub fn set_texture(&mut self, name: &str, texture: TextureId) -> bool {
        let Some(index) = self.selected_shader("set_texture", name) else {
            return false;
        };
        self.queue.set_texture(&self.shaders[index], name, texture)
    }

    pub fn set_texture_slice(&mut self, name: &str, texture: TextureId, slice: u32) -> bool {
        let Some(index) = self.selected_shader("set_texture_slice", name) else {
            return false;
        };
        self.queue.set_texture_slice(&self.shaders[index], name, texture, slice)
    }

    pub fn set_texture_array(&mut self, name: &str, textures: &[TextureId], count: usize) -> bool {
        let Some(index) = self.selected_shader("set_texture_array", name) else {
            return false;
        };
        self.queue.set_texture_array(&self.shaders[index], name, textures, count)
    }

    pub fn set_rw_texture(&mut self, name: &str, texture: TextureId) -> bool {
        let Some(index) = self.selected_shader("set_rw_texture", name) else {
            return false;
        };
        self.queue.set_rw_texture(&self.shaders[index], name, texture)
    }

    pub fn set_sampler_state(&mut self, name: &str, sampler: SamplerId) -> bool {
        let Some(index) = self.selected_shader("set_sampler_state", name) else {
            return false;
        };
        self.queue.set_sampler_state(&self.shaders[index], name, sampler)
    }

    fn selected_shader(&self, call: &str, name: &str) -> Option<usize> {
        let index = self.shader_index(self.state.shader);
        if index.is_none() {
            engine_error!(SOURCE, "{}(\"{}\") called without a shader selected", call, name);
        }
        index
    }

    // ===== APPLY =====

    /// Push the pipeline state to the device
    ///
    /// Only parts that differ from the last submission are sent, unless a
    /// full resubmission is pending (new frame, resize). Dirty constant
    /// buffers are uploaded, every constant buffer of the shader is bound,
    /// then the queued bindings are flushed in order.
    pub fn apply(&mut self) -> Result<()> {
        let Some(shader_index) = self.shader_index(self.state.shader) else {
            return Err(contract_violation("apply() called without a shader selected"));
        };

        let changes = if self.force_full_apply {
            PipelineChanges::all()
        } else {
            self.state.changes(&self.previous)
        };
        let state_changes = self.resolve_changes(shader_index, changes);

        let uploaded = self.constants.upload_dirty(&mut self.shaders[shader_index])?;
        let constant_buffers: Vec<_> = self.shaders[shader_index]
            .constant_buffers()
            .iter()
            .map(|buffer| (buffer.stage, buffer.slot, buffer.backing().clone()))
            .collect();

        {
            let mut device = lock(&self.device);
            let context = device.context();
            for change in &state_changes {
                change.submit(context)?;
            }
            for (stage, slot, buffer) in &constant_buffers {
                context.set_constant_buffer(*stage, *slot, buffer)?;
            }
        }

        let bound = self.queue.flush(&self.pool)?;
        engine_trace!(
            SOURCE,
            "apply: {} state changes, {} constant buffers uploaded, {} resource bindings",
            state_changes.len(), uploaded, bound
        );

        let topology = self.previous.topology;
        self.previous = self.state.clone();
        self.previous.topology = topology;
        self.force_full_apply = false;
        self.applied = true;
        Ok(())
    }

    fn resolve_changes(&self, shader_index: usize, changes: PipelineChanges) -> Vec<StateChange> {
        let state = &self.state;
        let mut resolved = Vec::new();

        if changes.contains(PipelineChanges::SHADER) {
            resolved.push(StateChange::Shader(self.shaders[shader_index].program().clone()));
        }
        if changes.contains(PipelineChanges::VERTEX_BUFFER) {
            let stride = self
                .bound_buffer(BufferKind::Vertex, state.vertex_buffer)
                .map(|buffer| buffer.stride)
                .unwrap_or(0);
            resolved.push(StateChange::VertexBuffer(self.buffer_backing(BufferKind::Vertex, state.vertex_buffer), stride));
        }
        if changes.contains(PipelineChanges::INDEX_BUFFER) {
            resolved.push(StateChange::IndexBuffer(self.buffer_backing(BufferKind::Index, state.index_buffer)));
        }
        if changes.contains(PipelineChanges::RW_BUFFER) {
            resolved.push(StateChange::RwBuffer(self.buffer_backing(BufferKind::ReadWriteCompute, state.rw_buffer)));
        }
        if changes.intersects(PipelineChanges::OUTPUT_MERGER) {
            resolved.push(StateChange::OutputMerger(self.render_target_views(), self.depth_target_view()));
        }
        if changes.contains(PipelineChanges::RASTERIZER_STATE) {
            let rasterizer = state
                .rasterizer_state
                .is_valid()
                .then(|| self.pool.rasterizer_state(state.rasterizer_state).backing().clone());
            resolved.push(StateChange::RasterizerState(rasterizer));
        }
        if changes.contains(PipelineChanges::BLEND_STATE) {
            let blend = (self.config.enable_blend && state.blend_state.is_valid())
                .then(|| self.pool.blend_state(state.blend_state).backing().clone());
            resolved.push(StateChange::BlendState(blend));
        }
        if changes.contains(PipelineChanges::DEPTH_STENCIL_STATE) {
            let depth_stencil = state
                .depth_stencil_state
                .is_valid()
                .then(|| self.pool.depth_stencil_state(state.depth_stencil_state).backing().clone());
            resolved.push(StateChange::DepthStencilState(depth_stencil, state.stencil_ref));
        }
        if changes.contains(PipelineChanges::VIEWPORT) {
            resolved.push(StateChange::Viewport(state.viewport));
        }
        resolved
    }

    fn bound_buffer(&self, kind: BufferKind, id: BufferId) -> Option<&Buffer> {
        if !id.is_valid() {
            return None;
        }
        let buffer = self.pool.try_buffer(kind, id);
        if buffer.is_none() {
            engine_error!(SOURCE, "{:?} buffer {} is not live", kind, id);
        }
        buffer
    }

    fn buffer_backing(&self, kind: BufferKind, id: BufferId) -> Option<Arc<dyn DeviceBuffer>> {
        self.bound_buffer(kind, id).map(|buffer| buffer.backing().clone())
    }

    fn render_target_views(&self) -> Vec<Arc<dyn DeviceView>> {
        self.state
            .bound_render_targets()
            .into_iter()
            .map(|target| self.pool.render_target(target).view().clone())
            .collect()
    }

    fn depth_target_view(&self) -> Option<Arc<dyn DeviceView>> {
        let target = self.state.depth_target;
        target.is_valid().then(|| self.pool.depth_target(target).view().clone())
    }

    // ===== DRAW =====

    /// Non-indexed draw of `vertex_count` vertices
    pub fn draw(&mut self, vertex_count: u32, topology: PrimitiveTopology) -> Result<()> {
        self.begin_draw("draw", Some(topology))?;
        lock(&self.device).context().draw(vertex_count, 0)?;

        self.stats.draw_calls += 1;
        self.stats.vertices += vertex_count as u64;
        self.stats.triangles += topology.triangle_count(vertex_count) as u64;
        self.applied = false;
        Ok(())
    }

    /// Draw the whole bound index buffer
    pub fn draw_indexed(&mut self, topology: PrimitiveTopology) -> Result<()> {
        let (index_count, vertex_count) = self.indexed_counts("draw_indexed")?;
        self.begin_draw("draw_indexed", Some(topology))?;
        lock(&self.device).context().draw_indexed(index_count, 0, 0)?;

        self.record_indexed(index_count, vertex_count, topology);
        self.applied = false;
        Ok(())
    }

    pub fn draw_indexed_instanced(&mut self, instance_count: u32, topology: PrimitiveTopology) -> Result<()> {
        let (index_count, vertex_count) = self.indexed_counts("draw_indexed_instanced")?;
        self.begin_draw("draw_indexed_instanced", Some(topology))?;
        lock(&self.device).context().draw_indexed_instanced(index_count, instance_count)?;

        self.record_indexed(index_count, vertex_count, topology);
        self.applied = false;
        Ok(())
    }

    /// Compute dispatch with the selected shader
    pub fn dispatch(&mut self, x: u32, y: u32, z: u32) -> Result<()> {
        self.begin_draw("dispatch", None)?;
        lock(&self.device).context().dispatch(x, y, z)?;
        self.applied = false;
        Ok(())
    }

    fn begin_draw(&mut self, call: &str, topology: Option<PrimitiveTopology>) -> Result<()> {
        if self.shader_index(self.state.shader).is_none() {
            return Err(contract_violation(&format!("{}() called without a shader selected", call)));
        }
        if !self.applied {
            return Err(contract_violation(&format!("{}() called without apply()", call)));
        }

        if let Some(topology) = topology {
            self.state.topology = topology;
            if !self.topology_sent || topology != self.previous.topology {
                lock(&self.device).context().set_primitive_topology(topology)?;
                self.previous.topology = topology;
                self.topology_sent = true;
            }
        }
        Ok(())
    }

    fn indexed_counts(&self, call: &str) -> Result<(u32, u32)> {
        let Some(index_buffer) = self.bound_buffer(BufferKind::Index, self.state.index_buffer) else {
            return Err(contract_violation(&format!("{}() called without an index buffer", call)));
        };
        let vertex_count = self
            .bound_buffer(BufferKind::Vertex, self.state.vertex_buffer)
            .map(|buffer| buffer.element_count)
            .unwrap_or(0);
        Ok((index_buffer.element_count, vertex_count))
    }

    fn record_indexed(&mut self, index_count: u32, vertex_count: u32, topology: PrimitiveTopology) {
        self.stats.draw_calls += 1;
        self.stats.indices += index_count as u64;
        self.stats.vertices += vertex_count as u64;
        self.stats.triangles += topology.triangle_count(index_count) as u64;
    }

    // ===== FRAME =====

    /// Reset the statistics; the next `apply()` resubmits everything
    pub fn begin_frame(&mut self) {
        self.stats = RendererStats::default();
        self.force_full_apply = true;
        self.topology_sent = false;
    }

    /// Clear the bound color targets and depth target as requested
    pub fn begin_render(&mut self, clear: &ClearCommand) -> Result<()> {
        let targets = self.render_target_views();
        let depth = self.depth_target_view();

        let mut device = lock(&self.device);
        let context = device.context();
        if clear.clear_color {
            if targets.is_empty() {
                engine_error!(SOURCE, "Begin called with clear color command without a render target bound");
            }
            for target in &targets {
                context.clear_render_target(target, clear.color)?;
            }
        }
        if clear.clear_depth || clear.clear_stencil {
            match &depth {
                Some(view) => {
                    let planes = DepthStencilClear { depth: clear.clear_depth, stencil: clear.clear_stencil };
                    context.clear_depth_stencil(view, planes, clear.depth, clear.stencil)?;
                }
                None => {
                    engine_error!(SOURCE, "Begin called with clear depth command without a depth target bound");
                }
            }
        }
        Ok(())
    }

    /// Present the back buffer
    pub fn end_frame(&mut self) -> Result<()> {
        if !self.queue.is_empty() {
            engine_warn!(SOURCE, "{} bind commands were never applied this frame", self.queue.len());
            self.queue.clear();
        }
        engine_trace!(
            SOURCE,
            "Frame: {} draw calls, {} triangles",
            self.stats.draw_calls, self.stats.triangles
        );
        lock(&self.device).present()
    }

    pub fn begin_event(&mut self, name: &str) {
        lock(&self.device).context().begin_event(name);
    }

    pub fn end_event(&mut self) {
        lock(&self.device).context().end_event();
    }

    // ===== HELPERS =====

    /// Draw `command.texture` on a quad placed in screen pixels
    ///
    /// The selected shader must declare "screenSpaceTransformation",
    /// "isDepthTexture", "numChannels" and "inputTexture".
    pub fn draw_quad_on_screen(&mut self, command: &DrawQuadOnScreenCommand, quad: QuadBuffers) -> Result<()> {
        let window = self.window_dimensions();
        let position = command.bottom_left_corner * 2.0 - window;
        let center = (position + command.dimensions_in_pixels) / window;
        let scale = (command.dimensions_in_pixels / window).extend(0.0);
        let transform = Mat4::from_scale_rotation_translation(scale, Quat::IDENTITY, center.extend(0.0));

        self.set_constant_4x4f("screenSpaceTransformation", transform);
        self.set_constant_1f("isDepthTexture", if command.is_depth_texture { 1.0 } else { 0.0 });
        self.set_constant_1i("numChannels", command.num_channels);
        self.set_texture("inputTexture", command.texture);
        self.set_vertex_buffer(quad.vertex_buffer);
        self.set_index_buffer(quad.index_buffer);
        self.apply()?;
        self.draw_indexed(PrimitiveTopology::TriangleList)
    }

    /// Draw a line from `p1` to `p2` with a shader that expands a point
    pub fn draw_line(&mut self, p1: Vec3, p2: Vec3, color: Vec3) -> Result<()> {
        self.set_constant_3f("p1", p1);
        self.set_constant_3f("p2", p2);
        self.set_constant_3f("color", color);
        self.apply()?;
        self.draw(1, PrimitiveTopology::PointList)
    }

    // ===== SHUTDOWN =====

    /// Release everything, then report live device objects
    ///
    /// Returns the live object count reported by the device. Calling it
    /// again is a no-op.
    pub fn shutdown(&mut self) -> usize {
        if self.shut_down {
            return 0;
        }
        self.queue.clear();
        let buffers = self.pool.release_buffers();
        let shaders = self.shaders.len();
        self.shaders.clear();
        self.pool.release_all();
        self.state = PipelineState::new();
        self.previous = PipelineState::new();
        self.shut_down = true;

        engine_info!(SOURCE, "Renderer shut down ({} buffers, {} shaders released)", buffers, shaders);
        lock(&self.device).report_live_objects()
    }
}

fn default_depth_desc(width: u32, height: u32, format: TextureFormat) -> DepthTargetDesc {
    DepthTargetDesc {
        texture_desc: TextureDesc {
            usage: TextureUsage::DEPTH_STENCIL | TextureUsage::SHADER_RESOURCE,
            ..TextureDesc::new_2d(width, height, TextureFormat::R32_TYPELESS)
        },
        format,
    }
}

fn initialization_failed(message: &str) -> Error {
    engine_error!(SOURCE, "{}", message);
    Error::InitializationFailed(message.to_string())
}

/// Misuse of the draw protocol: panics in debug builds, an error otherwise
fn contract_violation(message: &str) -> Error {
    engine_error!(SOURCE, "{}", message);
    if cfg!(debug_assertions) {
        panic!("{}", message);
    }
    Error::InvalidResource(message.to_string())
}

#[cfg(test)]
#[path = "renderer_tests.rs"]
mod tests;

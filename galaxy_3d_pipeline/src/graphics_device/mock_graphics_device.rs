/// Mock GraphicsDevice for tests (no GPU required)
///
/// Records every context call as a string, counts object creations per kind,
/// keeps weak references to created objects for live-object reports, and can
/// be told to fail any creation path.

use std::any::Any;
use std::sync::{Arc, Mutex, Weak};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{Error, Result};
use crate::graphics_device::{
    GraphicsDevice, DeviceContext, DeviceCapabilities,
    DeviceTexture, DeviceBuffer, DeviceView, DeviceSampler, DeviceShader,
    DeviceRasterizerState, DeviceBlendState, DeviceDepthStencilState,
    TextureDesc, TextureInfo, TextureFormat, TextureUsage, BufferDesc, ViewKind, ViewDesc,
    SamplerDesc, ShaderDesc, ShaderStage, ShaderReflection,
    RasterizerDesc, BlendDesc, DepthStencilDesc,
    PrimitiveTopology, Viewport, Rect, DepthStencilClear,
};
use crate::engine_bail;
use crate::engine_info;

const SOURCE: &str = "galaxy3d::MockGraphicsDevice";

// ============================================================================
// Mock Texture
// ============================================================================

#[derive(Debug)]
pub struct MockTexture {
    pub info: TextureInfo,
    pub label: String,
}

impl MockTexture {
    pub fn new(info: TextureInfo, label: String) -> Self {
        Self { info, label }
    }
}

impl DeviceTexture for MockTexture {
    fn info(&self) -> &TextureInfo {
        &self.info
    }
}

// ============================================================================
// Mock View
// ============================================================================

pub struct MockView {
    pub kind: ViewKind,
    pub desc: ViewDesc,
    pub label: String,
    /// Views keep their resource alive, as API views do
    pub texture: Arc<dyn DeviceTexture>,
}

impl DeviceView for MockView {
    fn kind(&self) -> ViewKind {
        self.kind
    }

    fn desc(&self) -> &ViewDesc {
        &self.desc
    }
}

// ============================================================================
// Mock Buffer
// ============================================================================

/// One `DeviceBuffer::update` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferUpload {
    pub buffer: String,
    pub offset: u64,
    pub data: Vec<u8>,
}

#[derive(Debug)]
pub struct MockBuffer {
    pub size: u64,
    pub label: String,
    uploads: Arc<Mutex<Vec<BufferUpload>>>,
}

impl DeviceBuffer for MockBuffer {
    fn update(&self, offset: u64, data: &[u8]) -> Result<()> {
        if offset + data.len() as u64 > self.size {
            engine_bail!(
                SOURCE,
                "Buffer '{}' update out of range: {} bytes at offset {} (size {})",
                self.label, data.len(), offset, self.size
            );
        }
        let mut uploads = self
            .uploads
            .lock()
            .map_err(|_| Error::BackendError("upload log poisoned".to_string()))?;
        uploads.push(BufferUpload {
            buffer: self.label.clone(),
            offset,
            data: data.to_vec(),
        });
        Ok(())
    }

    fn size(&self) -> u64 {
        self.size
    }
}

// ============================================================================
// Mock Sampler / State objects / Shader
// ============================================================================

#[derive(Debug)]
pub struct MockSampler {
    pub desc: SamplerDesc,
}

impl DeviceSampler for MockSampler {
    fn desc(&self) -> &SamplerDesc {
        &self.desc
    }
}

#[derive(Debug)]
pub struct MockRasterizerState {
    pub desc: RasterizerDesc,
}

impl DeviceRasterizerState for MockRasterizerState {
    fn desc(&self) -> &RasterizerDesc {
        &self.desc
    }
}

#[derive(Debug)]
pub struct MockBlendState {
    pub desc: BlendDesc,
}

impl DeviceBlendState for MockBlendState {
    fn desc(&self) -> &BlendDesc {
        &self.desc
    }
}

#[derive(Debug)]
pub struct MockDepthStencilState {
    pub desc: DepthStencilDesc,
}

impl DeviceDepthStencilState for MockDepthStencilState {
    fn desc(&self) -> &DepthStencilDesc {
        &self.desc
    }
}

#[derive(Debug)]
pub struct MockShader {
    pub name: String,
    pub stages: Vec<ShaderStage>,
    pub reflection: ShaderReflection,
}

impl DeviceShader for MockShader {
    fn stages(&self) -> Vec<ShaderStage> {
        self.stages.clone()
    }

    fn reflection(&self) -> &ShaderReflection {
        &self.reflection
    }
}

// ============================================================================
// Mock GraphicsDevice
// ============================================================================

/// Mock graphics device that records calls without a GPU
///
/// The same object serves as its own immediate context.
pub struct MockGraphicsDevice {
    /// Context calls, in submission order
    pub commands: Vec<String>,

    // Failure injection
    pub fail_texture_creation: bool,
    pub fail_buffer_creation: bool,
    pub fail_view_creation: bool,
    pub fail_sampler_creation: bool,
    pub fail_state_creation: bool,
    pub fail_shader_compilation: bool,

    capabilities: DeviceCapabilities,
    width: u32,
    height: u32,
    back_buffer: Arc<MockTexture>,
    reflections: FxHashMap<String, ShaderReflection>,
    broken_shaders: FxHashSet<String>,
    creation_counts: FxHashMap<&'static str, usize>,
    live_objects: Vec<(String, Weak<dyn Any + Send + Sync>)>,
    uploads: Arc<Mutex<Vec<BufferUpload>>>,
    present_count: u32,
    next_label: usize,
}

impl MockGraphicsDevice {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            commands: Vec::new(),
            fail_texture_creation: false,
            fail_buffer_creation: false,
            fail_view_creation: false,
            fail_sampler_creation: false,
            fail_state_creation: false,
            fail_shader_compilation: false,
            capabilities: DeviceCapabilities::default(),
            width,
            height,
            back_buffer: Arc::new(Self::back_buffer_texture(width, height)),
            reflections: FxHashMap::default(),
            broken_shaders: FxHashSet::default(),
            creation_counts: FxHashMap::default(),
            live_objects: Vec::new(),
            uploads: Arc::new(Mutex::new(Vec::new())),
            present_count: 0,
            next_label: 0,
        }
    }

    /// Wrap a new device for sharing with a renderer
    pub fn shared(width: u32, height: u32) -> Arc<Mutex<MockGraphicsDevice>> {
        Arc::new(Mutex::new(Self::new(width, height)))
    }

    fn back_buffer_texture(width: u32, height: u32) -> MockTexture {
        MockTexture::new(
            TextureInfo {
                width,
                height,
                format: TextureFormat::R8G8B8A8_UNORM,
                usage: TextureUsage::RENDER_TARGET_RW,
                slice_count: 1,
                mip_count: 1,
                is_cube_map: false,
            },
            "back_buffer".to_string(),
        )
    }

    // ===== CONFIGURATION =====

    /// Serve `reflection` for shaders compiled under `name`
    pub fn with_shader_reflection(mut self, name: &str, reflection: ShaderReflection) -> Self {
        self.set_shader_reflection(name, reflection);
        self
    }

    pub fn set_shader_reflection(&mut self, name: &str, reflection: ShaderReflection) {
        self.reflections.insert(name.to_string(), reflection);
    }

    pub fn with_capabilities(mut self, capabilities: DeviceCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Make compilation of one named shader fail (or succeed again)
    pub fn set_shader_broken(&mut self, name: &str, broken: bool) {
        if broken {
            self.broken_shaders.insert(name.to_string());
        } else {
            self.broken_shaders.remove(name);
        }
    }

    // ===== INSPECTION =====

    /// Number of successful creations of a kind: "texture", "buffer", "view",
    /// "sampler", "rasterizer_state", "blend_state", "depth_stencil_state", "shader"
    pub fn creation_count(&self, kind: &str) -> usize {
        self.creation_counts.get(kind).copied().unwrap_or(0)
    }

    /// Recorded commands starting with `prefix`
    pub fn commands_matching(&self, prefix: &str) -> Vec<String> {
        self.commands
            .iter()
            .filter(|command| command.starts_with(prefix))
            .cloned()
            .collect()
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Every buffer update recorded so far
    pub fn buffer_uploads(&self) -> Vec<BufferUpload> {
        match self.uploads.lock() {
            Ok(uploads) => uploads.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn clear_buffer_uploads(&self) {
        match self.uploads.lock() {
            Ok(mut uploads) => uploads.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
    }

    /// Labels of created objects that are still referenced somewhere
    pub fn live_object_labels(&self) -> Vec<String> {
        self.live_objects
            .iter()
            .filter(|(_, weak)| weak.strong_count() > 0)
            .map(|(label, _)| label.clone())
            .collect()
    }

    pub fn present_count(&self) -> u32 {
        self.present_count
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    // ===== INTERNALS =====

    fn next_label(&mut self, kind: &str) -> String {
        self.next_label += 1;
        format!("{}#{}", kind, self.next_label)
    }

    fn track<T: Any + Send + Sync>(&mut self, kind: &'static str, label: &str, object: &Arc<T>) {
        *self.creation_counts.entry(kind).or_insert(0) += 1;
        let erased: Arc<dyn Any + Send + Sync> = object.clone();
        let weak: Weak<dyn Any + Send + Sync> = Arc::downgrade(&erased);
        self.live_objects.push((label.to_string(), weak));
    }

    fn record(&mut self, command: String) -> Result<()> {
        self.commands.push(command);
        Ok(())
    }
}

fn buffer_label(buffer: Option<&Arc<dyn DeviceBuffer>>) -> String {
    match buffer {
        Some(buffer) => format!("{}B", buffer.size()),
        None => "none".to_string(),
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn create_texture(&mut self, desc: &TextureDesc) -> Result<Arc<dyn DeviceTexture>> {
        if self.fail_texture_creation {
            engine_bail!(SOURCE, "Texture creation failed: '{}' {}x{}", desc.name, desc.width, desc.height);
        }
        let label = if desc.name.is_empty() { self.next_label("texture") } else { desc.name.clone() };
        let texture = Arc::new(MockTexture::new(TextureInfo::from_desc(desc), label.clone()));
        self.track("texture", &label, &texture);
        Ok(texture)
    }

    fn create_buffer(&mut self, desc: &BufferDesc) -> Result<Arc<dyn DeviceBuffer>> {
        if self.fail_buffer_creation {
            engine_bail!(SOURCE, "Buffer creation failed: {:?} {} bytes", desc.usage, desc.size());
        }
        if desc.size() == 0 {
            return Err(Error::InvalidResource("zero-sized buffer".to_string()));
        }
        let label = self.next_label("buffer");
        let buffer = Arc::new(MockBuffer {
            size: desc.size(),
            label: label.clone(),
            uploads: self.uploads.clone(),
        });
        self.track("buffer", &label, &buffer);
        Ok(buffer)
    }

    fn create_view(
        &mut self,
        kind: ViewKind,
        texture: &Arc<dyn DeviceTexture>,
        desc: &ViewDesc,
    ) -> Result<Arc<dyn DeviceView>> {
        if self.fail_view_creation {
            engine_bail!(SOURCE, "{:?} view creation failed", kind);
        }
        let info = texture.info();
        let required = match kind {
            ViewKind::ShaderResource => TextureUsage::SHADER_RESOURCE,
            ViewKind::UnorderedAccess => TextureUsage::UNORDERED_ACCESS,
            ViewKind::RenderTarget => TextureUsage::RENDER_TARGET,
            ViewKind::DepthStencil => TextureUsage::DEPTH_STENCIL,
        };
        if !info.usage.contains(required) {
            return Err(Error::InvalidResource(format!(
                "{:?} view over a texture with usage {:?}", kind, info.usage
            )));
        }
        if desc.first_slice + desc.array_size.max(1) > info.slice_count {
            return Err(Error::InvalidResource(format!(
                "view slices {}..{} out of range ({} slices)",
                desc.first_slice, desc.first_slice + desc.array_size, info.slice_count
            )));
        }
        let label = self.next_label("view");
        let view = Arc::new(MockView {
            kind,
            desc: desc.clone(),
            label: label.clone(),
            texture: texture.clone(),
        });
        self.track("view", &label, &view);
        Ok(view)
    }

    fn create_sampler(&mut self, desc: &SamplerDesc) -> Result<Arc<dyn DeviceSampler>> {
        if self.fail_sampler_creation {
            engine_bail!(SOURCE, "Sampler creation failed");
        }
        let label = self.next_label("sampler");
        let sampler = Arc::new(MockSampler { desc: desc.clone() });
        self.track("sampler", &label, &sampler);
        Ok(sampler)
    }

    fn create_rasterizer_state(&mut self, desc: &RasterizerDesc) -> Result<Arc<dyn DeviceRasterizerState>> {
        if self.fail_state_creation {
            engine_bail!(SOURCE, "Rasterizer state creation failed");
        }
        let label = self.next_label("rasterizer_state");
        let state = Arc::new(MockRasterizerState { desc: *desc });
        self.track("rasterizer_state", &label, &state);
        Ok(state)
    }

    fn create_blend_state(&mut self, desc: &BlendDesc) -> Result<Arc<dyn DeviceBlendState>> {
        if self.fail_state_creation {
            engine_bail!(SOURCE, "Blend state creation failed");
        }
        let label = self.next_label("blend_state");
        let state = Arc::new(MockBlendState { desc: *desc });
        self.track("blend_state", &label, &state);
        Ok(state)
    }

    fn create_depth_stencil_state(&mut self, desc: &DepthStencilDesc) -> Result<Arc<dyn DeviceDepthStencilState>> {
        if self.fail_state_creation {
            engine_bail!(SOURCE, "Depth-stencil state creation failed");
        }
        let label = self.next_label("depth_stencil_state");
        let state = Arc::new(MockDepthStencilState { desc: *desc });
        self.track("depth_stencil_state", &label, &state);
        Ok(state)
    }

    fn compile_shader(&mut self, desc: &ShaderDesc) -> Result<Arc<dyn DeviceShader>> {
        if self.fail_shader_compilation || self.broken_shaders.contains(&desc.name) {
            return Err(Error::ShaderCompilationFailed(format!("'{}' failed to compile", desc.name)));
        }
        let shader = Arc::new(MockShader {
            name: desc.name.clone(),
            stages: desc.stages.iter().map(|stage| stage.stage).collect(),
            reflection: self.reflections.get(&desc.name).cloned().unwrap_or_default(),
        });
        let label = format!("shader:{}", desc.name);
        self.track("shader", &label, &shader);
        Ok(shader)
    }

    fn present(&mut self) -> Result<()> {
        self.present_count += 1;
        self.record("present".to_string())
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.width = width;
        self.height = height;
        self.back_buffer = Arc::new(Self::back_buffer_texture(width, height));
        self.record(format!("resize {}x{}", width, height))
    }

    fn report_live_objects(&self) -> usize {
        let live = self.live_object_labels();
        for label in &live {
            engine_info!(SOURCE, "Live object: {}", label);
        }
        engine_info!(SOURCE, "{} live device objects", live.len());
        live.len()
    }

    fn capabilities(&self) -> DeviceCapabilities {
        self.capabilities
    }

    fn back_buffer(&self) -> Arc<dyn DeviceTexture> {
        self.back_buffer.clone()
    }

    fn context(&mut self) -> &mut dyn DeviceContext {
        self
    }
}

impl DeviceContext for MockGraphicsDevice {
    fn set_shader(&mut self, shader: Option<&Arc<dyn DeviceShader>>) -> Result<()> {
        let stages = shader.map(|shader| shader.stages().len()).unwrap_or(0);
        self.record(format!("set_shader {}", stages))
    }

    fn set_primitive_topology(&mut self, topology: PrimitiveTopology) -> Result<()> {
        self.record(format!("set_primitive_topology {:?}", topology))
    }

    fn set_vertex_buffer(&mut self, buffer: Option<&Arc<dyn DeviceBuffer>>, stride: u32) -> Result<()> {
        self.record(format!("set_vertex_buffer {} {}", buffer_label(buffer), stride))
    }

    fn set_index_buffer(&mut self, buffer: Option<&Arc<dyn DeviceBuffer>>) -> Result<()> {
        self.record(format!("set_index_buffer {}", buffer_label(buffer)))
    }

    fn set_rw_buffer(&mut self, slot: u32, buffer: Option<&Arc<dyn DeviceBuffer>>) -> Result<()> {
        self.record(format!("set_rw_buffer {} {}", slot, buffer_label(buffer)))
    }

    fn set_render_targets(
        &mut self,
        targets: &[Arc<dyn DeviceView>],
        depth: Option<&Arc<dyn DeviceView>>,
    ) -> Result<()> {
        let depth = if depth.is_some() { "depth" } else { "no_depth" };
        self.record(format!("set_render_targets {} {}", targets.len(), depth))
    }

    fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        self.record(format!("set_viewport {}x{}", viewport.width, viewport.height))
    }

    fn set_scissor_rect(&mut self, rect: Rect) -> Result<()> {
        self.record(format!(
            "set_scissor_rect {} {} {} {}",
            rect.left, rect.top, rect.right, rect.bottom
        ))
    }

    fn set_rasterizer_state(&mut self, state: Option<&Arc<dyn DeviceRasterizerState>>) -> Result<()> {
        let cull = state.map(|state| format!("{:?}", state.desc().cull_mode)).unwrap_or_else(|| "none".into());
        self.record(format!("set_rasterizer_state {}", cull))
    }

    fn set_blend_state(&mut self, state: Option<&Arc<dyn DeviceBlendState>>) -> Result<()> {
        let enabled = state.map(|state| state.desc().blend_enable).unwrap_or(false);
        self.record(format!("set_blend_state {}", enabled))
    }

    fn set_depth_stencil_state(
        &mut self,
        state: Option<&Arc<dyn DeviceDepthStencilState>>,
        stencil_ref: u32,
    ) -> Result<()> {
        let depth = state.map(|state| state.desc().depth_test_enable).unwrap_or(false);
        self.record(format!("set_depth_stencil_state {} {}", depth, stencil_ref))
    }

    fn set_constant_buffer(&mut self, stage: ShaderStage, slot: u32, _buffer: &Arc<dyn DeviceBuffer>) -> Result<()> {
        self.record(format!("set_constant_buffer {:?} {}", stage, slot))
    }

    fn set_shader_resources(
        &mut self,
        stage: ShaderStage,
        slot: u32,
        views: &[Arc<dyn DeviceView>],
    ) -> Result<()> {
        self.record(format!("set_shader_resources {:?} {} {}", stage, slot, views.len()))
    }

    fn set_unordered_access(&mut self, stage: ShaderStage, slot: u32, _view: &Arc<dyn DeviceView>) -> Result<()> {
        self.record(format!("set_unordered_access {:?} {}", stage, slot))
    }

    fn set_sampler(&mut self, stage: ShaderStage, slot: u32, _sampler: &Arc<dyn DeviceSampler>) -> Result<()> {
        self.record(format!("set_sampler {:?} {}", stage, slot))
    }

    fn draw(&mut self, vertex_count: u32, first_vertex: u32) -> Result<()> {
        self.record(format!("draw {} {}", vertex_count, first_vertex))
    }

    fn draw_indexed(&mut self, index_count: u32, first_index: u32, base_vertex: i32) -> Result<()> {
        self.record(format!("draw_indexed {} {} {}", index_count, first_index, base_vertex))
    }

    fn draw_indexed_instanced(&mut self, index_count: u32, instance_count: u32) -> Result<()> {
        self.record(format!("draw_indexed_instanced {} {}", index_count, instance_count))
    }

    fn dispatch(&mut self, x: u32, y: u32, z: u32) -> Result<()> {
        self.record(format!("dispatch {} {} {}", x, y, z))
    }

    fn copy_texture(
        &mut self,
        dst: &Arc<dyn DeviceTexture>,
        dst_mip: u32,
        src: &Arc<dyn DeviceTexture>,
    ) -> Result<()> {
        if dst_mip >= dst.info().mip_count {
            return Err(Error::InvalidResource(format!("copy into missing mip {}", dst_mip)));
        }
        self.record(format!(
            "copy_texture {}x{} -> mip {}",
            src.info().width, src.info().height, dst_mip
        ))
    }

    fn generate_mips(&mut self, view: &Arc<dyn DeviceView>) -> Result<()> {
        self.record(format!("generate_mips {}", view.desc().mip_count))
    }

    fn clear_render_target(&mut self, _view: &Arc<dyn DeviceView>, color: [f32; 4]) -> Result<()> {
        self.record(format!("clear_render_target {:?}", color))
    }

    fn clear_depth_stencil(
        &mut self,
        _view: &Arc<dyn DeviceView>,
        planes: DepthStencilClear,
        depth: f32,
        stencil: u8,
    ) -> Result<()> {
        self.record(format!(
            "clear_depth_stencil {} {} {} {}",
            planes.depth, planes.stencil, depth, stencil
        ))
    }

    fn begin_event(&mut self, name: &str) {
        self.commands.push(format!("begin_event {}", name));
    }

    fn end_event(&mut self) {
        self.commands.push("end_event".to_string());
    }
}

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;

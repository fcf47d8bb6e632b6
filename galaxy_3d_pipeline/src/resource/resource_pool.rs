/// Resource pool
///
/// Owns every texture, buffer, sampler, render/depth target and
/// fixed-function state object, and hands out integer handles to them.
///
/// Creation never fails loudly: when the device refuses to create a backing
/// object the pool logs an error and returns the `INVALID` handle. Looking up
/// a handle that is out of range or released is a programming error and
/// panics.
///
/// Texture creation from files takes `&self`: the texture registry sits
/// behind a mutex that is held for the whole lookup-or-create sequence, so a
/// loader thread can create textures while the render thread keeps a shared
/// reference to the pool.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use rustc_hash::FxHashMap;

use crate::error::Result;
use crate::graphics_device::{
    GraphicsDevice, DeviceTexture, DeviceView, TextureDesc, TextureData, TextureFormat, TextureUsage,
    BufferDesc, ViewKind, ViewDesc, ViewDimension, SamplerDesc, RasterizerDesc, BlendDesc,
    DepthStencilDesc,
};
use crate::handle::{
    TextureId, BufferId, SamplerId, RenderTargetId, DepthTargetId,
    RasterizerStateId, BlendStateId, DepthStencilStateId,
};
use crate::resource::{
    Registry, Texture, Buffer, BufferKind, Sampler, RasterizerState, BlendState, DepthStencilState,
    RenderTarget, RenderTargetDesc, DepthTarget, DepthTargetDesc, ImageLoader, ImageData,
    mip_count_for,
};
use crate::utils::lock;
use crate::{engine_debug, engine_error, engine_info, engine_warn};

const SOURCE: &str = "galaxy3d::ResourcePool";

/// Number of faces in a cube map
pub const CUBE_FACE_COUNT: usize = 6;

// ============================================================================
// Texture registry
// ============================================================================

/// Texture slots plus the name index used for file deduplication
#[derive(Default)]
pub(crate) struct TextureRegistry {
    slots: Registry<Texture>,
    names: FxHashMap<String, TextureId>,
}

/// Where a new texture lands in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    /// Lowest released slot first (`create_texture_2d`)
    Recycle,
    /// Always past the end (file-backed textures)
    Append,
}

impl TextureRegistry {
    fn insert(&mut self, texture: Texture, placement: Placement) -> TextureId {
        let name = texture.name.clone();
        let index = match placement {
            Placement::Recycle => self.slots.insert(texture),
            Placement::Append => self.slots.push(texture),
        };
        let id = TextureId::from_index(index);
        if !name.is_empty() {
            self.names.entry(name).or_insert(id);
        }
        id
    }

    fn get(&self, id: TextureId) -> Option<&Texture> {
        self.slots.get(id.index()?)
    }

    fn release(&mut self, id: TextureId) -> Option<Texture> {
        let texture = self.slots.release(id.index()?)?;
        if self.names.get(&texture.name) == Some(&id) {
            self.names.remove(&texture.name);
        }
        Some(texture)
    }
}

/// Build the backing texture and its views
fn build_texture(device: &mut dyn GraphicsDevice, desc: &TextureDesc) -> Result<Texture> {
    let backing = device.create_texture(desc)?;
    let slice_count = desc.slice_count();
    let is_array = desc.array_size > 1;
    let mip_count = desc.mip_count.max(1);

    let mut srv = None;
    let mut uav = None;
    let mut srv_slices = Vec::new();
    let mut uav_slices = Vec::new();

    if desc.usage.contains(TextureUsage::SHADER_RESOURCE) {
        let mut view_desc = ViewDesc {
            format: desc.format.shader_resource_format(),
            dimension: ViewDimension::Texture2D,
            first_slice: 0,
            array_size: 1,
            first_mip: 0,
            mip_count,
        };
        if desc.is_cube_map {
            view_desc.dimension = if is_array { ViewDimension::TextureCubeArray } else { ViewDimension::TextureCube };
            view_desc.array_size = slice_count;
            srv = Some(device.create_view(ViewKind::ShaderResource, &backing, &view_desc)?);
        } else if is_array {
            view_desc.dimension = ViewDimension::Texture2DArray;
            for slice in 0..slice_count {
                view_desc.first_slice = slice;
                view_desc.array_size = slice_count - slice;
                srv_slices.push(device.create_view(ViewKind::ShaderResource, &backing, &view_desc)?);
            }
            srv = srv_slices.first().cloned();
        } else {
            srv = Some(device.create_view(ViewKind::ShaderResource, &backing, &view_desc)?);
        }
    }

    if desc.usage.contains(TextureUsage::UNORDERED_ACCESS) && !desc.is_cube_map {
        let mut view_desc = ViewDesc::texture_2d(desc.format);
        if is_array {
            view_desc.dimension = ViewDimension::Texture2DArray;
            for slice in 0..slice_count {
                view_desc.first_slice = slice;
                view_desc.array_size = slice_count - slice;
                uav_slices.push(device.create_view(ViewKind::UnorderedAccess, &backing, &view_desc)?);
            }
            uav = uav_slices.first().cloned();
        } else {
            uav = Some(device.create_view(ViewKind::UnorderedAccess, &backing, &view_desc)?);
        }
    }

    Ok(Texture {
        name: desc.name.clone(),
        width: desc.width.max(1),
        height: desc.height.max(1),
        depth: slice_count,
        mip_count,
        format: desc.format,
        usage: desc.usage,
        is_cube_map: desc.is_cube_map,
        backing,
        srv,
        uav,
        srv_slices,
        uav_slices,
    })
}

/// Create a texture into the lowest free slot
fn create_texture_in(
    textures: &mut TextureRegistry,
    device: &mut dyn GraphicsDevice,
    desc: &TextureDesc,
    placement: Placement,
) -> TextureId {
    match build_texture(device, desc) {
        Ok(texture) => textures.insert(texture, placement),
        Err(e) => {
            engine_error!(SOURCE, "Cannot create texture '{}' ({}x{}): {}", desc.name, desc.width, desc.height, e);
            TextureId::INVALID
        }
    }
}

/// Create a texture whose mip chain is generated on the device from `image`
///
/// The image is uploaded into an intermediate full-resolution texture, copied
/// into mip 0 of the final render-target-capable texture, and mips are
/// generated from there. The intermediate is released before returning.
fn create_mipped_texture_in(
    textures: &mut TextureRegistry,
    device: &mut dyn GraphicsDevice,
    name: &str,
    image: ImageData,
) -> TextureId {
    let (width, height, format) = (image.width, image.height, image.format);
    let intermediate_desc = TextureDesc {
        name: String::new(),
        data: Some(TextureData::Single(image.pixels)),
        ..TextureDesc::new_2d(width, height, format)
    };
    let intermediate = match device.create_texture(&intermediate_desc) {
        Ok(texture) => texture,
        Err(e) => {
            engine_error!(SOURCE, "Cannot create intermediate texture for '{}': {}", name, e);
            return TextureId::INVALID;
        }
    };

    let final_desc = TextureDesc {
        name: name.to_string(),
        usage: TextureUsage::RENDER_TARGET_RW,
        mip_count: mip_count_for(width, height),
        generate_mips: true,
        ..TextureDesc::new_2d(width, height, format)
    };
    let id = create_texture_in(textures, device, &final_desc, Placement::Append);
    let Some(texture) = textures.get(id) else {
        return TextureId::INVALID;
    };

    let context = device.context();
    if let Err(e) = context.copy_texture(&texture.backing, 0, &intermediate) {
        engine_error!(SOURCE, "Cannot copy '{}' into its mip chain: {}", name, e);
    } else if let Some(srv) = &texture.srv {
        if let Err(e) = context.generate_mips(srv) {
            engine_error!(SOURCE, "Cannot generate mips for '{}': {}", name, e);
        }
    }
    drop(intermediate);
    id
}

fn is_hdr_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("hdr"))
}

// ============================================================================
// Resource pool
// ============================================================================

pub struct ResourcePool {
    device: Arc<Mutex<dyn GraphicsDevice>>,
    image_loader: Option<Arc<dyn ImageLoader>>,
    texture_root: PathBuf,
    hdr_texture_root: PathBuf,

    textures: Mutex<TextureRegistry>,
    vertex_buffers: Registry<Buffer>,
    index_buffers: Registry<Buffer>,
    rw_buffers: Registry<Buffer>,
    samplers: Registry<Sampler>,
    render_targets: Registry<RenderTarget>,
    depth_targets: Registry<DepthTarget>,
    rasterizer_states: Registry<RasterizerState>,
    blend_states: Registry<BlendState>,
    depth_stencil_states: Registry<DepthStencilState>,
}

impl ResourcePool {
    pub fn new(device: Arc<Mutex<dyn GraphicsDevice>>) -> Self {
        Self {
            device,
            image_loader: None,
            texture_root: PathBuf::new(),
            hdr_texture_root: PathBuf::new(),
            textures: Mutex::new(TextureRegistry::default()),
            vertex_buffers: Registry::new(),
            index_buffers: Registry::new(),
            rw_buffers: Registry::new(),
            samplers: Registry::new(),
            render_targets: Registry::new(),
            depth_targets: Registry::new(),
            rasterizer_states: Registry::new(),
            blend_states: Registry::new(),
            depth_stencil_states: Registry::new(),
        }
    }

    /// Decoder used by every file-based texture creation
    pub fn with_image_loader(mut self, loader: Arc<dyn ImageLoader>) -> Self {
        self.image_loader = Some(loader);
        self
    }

    /// Directories prepended to texture and HDR file names
    pub fn with_roots(mut self, texture_root: impl Into<PathBuf>, hdr_texture_root: impl Into<PathBuf>) -> Self {
        self.texture_root = texture_root.into();
        self.hdr_texture_root = hdr_texture_root.into();
        self
    }

    pub fn device(&self) -> &Arc<Mutex<dyn GraphicsDevice>> {
        &self.device
    }

    fn textures_mut(&mut self) -> &mut TextureRegistry {
        self.textures.get_mut().unwrap_or_else(PoisonError::into_inner)
    }

    // ===== TEXTURES =====

    /// Register the swap chain back buffer as a texture plus render target
    pub fn register_back_buffer(&mut self) -> (TextureId, RenderTargetId) {
        let backing = lock(&self.device).back_buffer();
        let texture = match self.wrap_back_buffer(backing) {
            Ok(texture) => texture,
            Err(e) => {
                engine_error!(SOURCE, "Cannot create back buffer views: {}", e);
                return (TextureId::INVALID, RenderTargetId::INVALID);
            }
        };
        let view = match self.create_back_buffer_view(&texture.backing) {
            Ok(view) => view,
            Err(e) => {
                engine_error!(SOURCE, "Cannot create default render target view: {}", e);
                return (TextureId::INVALID, RenderTargetId::INVALID);
            }
        };
        let texture_id = TextureId::from_index(self.textures_mut().slots.push(texture));
        let target = RenderTargetId::from_index(self.render_targets.push(RenderTarget { texture: texture_id, view }));
        (texture_id, target)
    }

    /// Point an existing back buffer texture/target pair at the device's
    /// current back buffer (after a swap chain resize)
    pub fn refresh_back_buffer(&mut self, texture_id: TextureId, target: RenderTargetId) -> bool {
        let backing = lock(&self.device).back_buffer();
        let rebuilt = self
            .wrap_back_buffer(backing)
            .and_then(|texture| Ok((self.create_back_buffer_view(&texture.backing)?, texture)));
        let (view, texture) = match rebuilt {
            Ok(pair) => pair,
            Err(e) => {
                engine_error!(SOURCE, "Cannot recreate back buffer views: {}", e);
                return false;
            }
        };

        let Some(slot) = texture_id.index().and_then(|index| self.textures_mut().slots.get_mut(index)) else {
            engine_error!(SOURCE, "Back buffer texture {} is not registered", texture_id);
            return false;
        };
        *slot = texture;
        match target.index().and_then(|index| self.render_targets.get_mut(index)) {
            Some(render_target) => {
                render_target.view = view;
                true
            }
            None => {
                engine_error!(SOURCE, "Back buffer render target {} is not registered", target);
                false
            }
        }
    }

    fn wrap_back_buffer(&self, backing: Arc<dyn DeviceTexture>) -> Result<Texture> {
        let info = backing.info().clone();
        let srv = if info.usage.contains(TextureUsage::SHADER_RESOURCE) {
            Some(lock(&self.device).create_view(ViewKind::ShaderResource, &backing, &ViewDesc::texture_2d(info.format))?)
        } else {
            None
        };
        Ok(Texture {
            name: String::new(),
            width: info.width,
            height: info.height,
            depth: 1,
            mip_count: 1,
            format: info.format,
            usage: info.usage,
            is_cube_map: false,
            backing,
            srv,
            uav: None,
            srv_slices: Vec::new(),
            uav_slices: Vec::new(),
        })
    }

    fn create_back_buffer_view(&self, backing: &Arc<dyn DeviceTexture>) -> Result<Arc<dyn DeviceView>> {
        let format = backing.info().format;
        lock(&self.device).create_view(ViewKind::RenderTarget, backing, &ViewDesc::texture_2d(format))
    }

    /// Create a 2D texture (array, cube map) from a descriptor
    ///
    /// Reuses the lowest released texture slot before growing the registry.
    pub fn create_texture_2d(&mut self, desc: &TextureDesc) -> TextureId {
        let textures = self.textures.get_mut().unwrap_or_else(PoisonError::into_inner);
        let mut device = lock(&self.device);
        create_texture_in(textures, &mut *device, desc, Placement::Recycle)
    }

    /// Create a texture from an image file under the texture root
    ///
    /// File textures always take a fresh slot, released ones are left to
    /// `create_texture_2d`.
    /// Repeated calls with the same file name return the first handle
    /// without touching the device.
    pub fn create_texture_from_file(&self, file_name: &str, generate_mips: bool) -> TextureId {
        let root = self.texture_root.clone();
        self.create_texture_from_file_in(file_name, &root, generate_mips)
    }

    /// Same as `create_texture_from_file` with an explicit root directory
    pub fn create_texture_from_file_in(&self, file_name: &str, root: &Path, generate_mips: bool) -> TextureId {
        let mut textures = lock(&self.textures);

        if file_name.is_empty() || file_name == "\"\"" {
            engine_warn!(SOURCE, "create_texture_from_file() - empty texture file name");
            return TextureId::INVALID;
        }
        if let Some(&id) = textures.names.get(file_name) {
            return id;
        }

        let Some(loader) = &self.image_loader else {
            engine_error!(SOURCE, "Cannot load texture '{}': no image loader installed", file_name);
            return TextureId::INVALID;
        };
        let path = root.join(file_name);
        engine_debug!(SOURCE, "Loading texture: {}", path.display());
        let image = match loader.load(&path) {
            Ok(image) => image,
            Err(e) => {
                engine_error!(SOURCE, "Cannot load texture file: {} ({})", path.display(), e);
                return TextureId::INVALID;
            }
        };

        let mut device = lock(&self.device);
        if generate_mips {
            return create_mipped_texture_in(&mut textures, &mut *device, file_name, image);
        }
        let desc = TextureDesc {
            name: file_name.to_string(),
            data: Some(TextureData::Single(image.pixels)),
            ..TextureDesc::new_2d(image.width, image.height, image.format)
        };
        create_texture_in(&mut textures, &mut *device, &desc, Placement::Append)
    }

    /// Create an RGBA32F texture from an HDR file under the HDR root
    pub fn create_hdr_texture(&self, file_name: &str) -> TextureId {
        let mut textures = lock(&self.textures);
        if let Some(&id) = textures.names.get(file_name) {
            return id;
        }

        let Some(loader) = &self.image_loader else {
            engine_error!(SOURCE, "Cannot load HDR texture '{}': no image loader installed", file_name);
            return TextureId::INVALID;
        };
        let path = self.hdr_texture_root.join(file_name);
        let image = match loader.load_hdr(&path) {
            Ok(image) => image,
            Err(e) => {
                engine_error!(SOURCE, "Cannot load HDR texture: {} ({})", path.display(), e);
                return TextureId::INVALID;
            }
        };

        let desc = TextureDesc {
            name: file_name.to_string(),
            data: Some(TextureData::Single(image.pixels)),
            ..TextureDesc::new_2d(image.width, image.height, TextureFormat::R32G32B32A32_FLOAT)
        };
        let mut device = lock(&self.device);
        let id = create_texture_in(&mut textures, &mut *device, &desc, Placement::Append);
        if !id.is_valid() {
            engine_error!(SOURCE, "Cannot create HDR texture from data: {}", path.display());
        }
        id
    }

    /// Create a cube map from six face images (+X, -X, +Y, -Y, +Z, -Z)
    ///
    /// Paths are used as given. `.hdr` faces are decoded as HDR. The texture
    /// is named after the first face's file stem up to its first underscore.
    pub fn create_cubemap_from_face_textures(&mut self, face_files: &[&str], generate_mips: bool) -> TextureId {
        if face_files.len() != CUBE_FACE_COUNT {
            engine_error!(SOURCE, "Cube map needs {} faces, got {}", CUBE_FACE_COUNT, face_files.len());
            return TextureId::INVALID;
        }
        let name = Path::new(face_files[0])
            .file_stem()
            .and_then(|stem| stem.to_str())
            .and_then(|stem| stem.split('_').next())
            .unwrap_or_default()
            .to_string();
        if let Some(&id) = self.textures_mut().names.get(&name) {
            return id;
        }

        let Some(loader) = self.image_loader.clone() else {
            engine_error!(SOURCE, "Cannot load cube map '{}': no image loader installed", name);
            return TextureId::INVALID;
        };
        let mut faces: Vec<ImageData> = Vec::with_capacity(CUBE_FACE_COUNT);
        for file in face_files {
            let path = Path::new(file);
            let loaded = if is_hdr_path(path) { loader.load_hdr(path) } else { loader.load(path) };
            match loaded {
                Ok(image) => faces.push(image),
                Err(e) => {
                    engine_error!(SOURCE, "Cannot load cube map face {}: {}", file, e);
                    return TextureId::INVALID;
                }
            }
        }
        let (width, height, format) = (faces[0].width, faces[0].height, faces[0].format);
        if faces.iter().any(|face| (face.width, face.height, face.format) != (width, height, format)) {
            engine_error!(SOURCE, "Cube map '{}' faces differ in size or format", name);
            return TextureId::INVALID;
        }
        engine_debug!(SOURCE, "Loading cube map texture: {}", name);

        let desc = TextureDesc {
            name: name.clone(),
            usage: if generate_mips { TextureUsage::RENDER_TARGET_RW } else { TextureUsage::SHADER_RESOURCE },
            mip_count: if generate_mips { mip_count_for(width, height) } else { 1 },
            is_cube_map: true,
            generate_mips,
            data: Some(TextureData::Slices(faces.into_iter().map(|face| face.pixels).collect())),
            ..TextureDesc::new_2d(width, height, format)
        };
        let id = self.create_texture_2d(&desc);
        if generate_mips && id.is_valid() {
            let srv = self.textures_mut().get(id).and_then(|texture| texture.srv.clone());
            if let Some(srv) = srv {
                if let Err(e) = lock(&self.device).context().generate_mips(&srv) {
                    engine_error!(SOURCE, "Cannot generate mips for cube map '{}': {}", name, e);
                }
            }
        }
        id
    }

    /// Snapshot of a texture entry (device objects are shared)
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range or released.
    pub fn texture(&self, id: TextureId) -> Texture {
        match lock(&self.textures).get(id) {
            Some(texture) => texture.clone(),
            None => panic!("texture handle {} is not live", id),
        }
    }

    /// Non-panicking variant of `texture`
    pub fn try_texture(&self, id: TextureId) -> Option<Texture> {
        lock(&self.textures).get(id).cloned()
    }

    /// Run `f` on a live texture without cloning it
    pub fn with_texture<R>(&self, id: TextureId, f: impl FnOnce(&Texture) -> R) -> Option<R> {
        lock(&self.textures).get(id).map(f)
    }

    /// Handle of the texture registered under `name`
    pub fn texture_by_name(&self, name: &str) -> TextureId {
        match lock(&self.textures).names.get(name) {
            Some(&id) => id,
            None => {
                engine_error!(SOURCE, "Texture not found: {}", name);
                TextureId::INVALID
            }
        }
    }

    /// Release views, then the backing resource, then tombstone the slot
    pub fn release_texture(&mut self, id: TextureId) -> bool {
        match self.textures_mut().release(id) {
            Some(texture) => {
                texture.release();
                true
            }
            None => {
                engine_warn!(SOURCE, "release_texture() on a texture that is not live: {}", id);
                false
            }
        }
    }

    pub fn texture_count(&self) -> usize {
        lock(&self.textures).slots.len()
    }

    pub fn texture_slot_count(&self) -> usize {
        lock(&self.textures).slots.slot_count()
    }

    // ===== BUFFERS =====

    fn buffers(&self, kind: BufferKind) -> &Registry<Buffer> {
        match kind {
            BufferKind::Vertex => &self.vertex_buffers,
            BufferKind::Index => &self.index_buffers,
            BufferKind::ReadWriteCompute => &self.rw_buffers,
        }
    }

    fn buffers_mut(&mut self, kind: BufferKind) -> &mut Registry<Buffer> {
        match kind {
            BufferKind::Vertex => &mut self.vertex_buffers,
            BufferKind::Index => &mut self.index_buffers,
            BufferKind::ReadWriteCompute => &mut self.rw_buffers,
        }
    }

    /// Create a vertex, index or read-write buffer
    ///
    /// The handle indexes the registry of the buffer's kind; callers keep
    /// track of which kind a handle belongs to.
    pub fn create_buffer(&mut self, desc: &BufferDesc) -> BufferId {
        let Some(kind) = BufferKind::from_usage(desc.usage) else {
            engine_warn!(SOURCE, "Unknown buffer type: {:?}", desc.usage);
            return BufferId::INVALID;
        };
        let backing = match lock(&self.device).create_buffer(desc) {
            Ok(backing) => backing,
            Err(e) => {
                engine_error!(SOURCE, "Cannot create {:?} buffer ({} bytes): {}", kind, desc.size(), e);
                return BufferId::INVALID;
            }
        };
        let buffer = Buffer {
            kind,
            element_count: desc.element_count,
            stride: desc.stride,
            cpu_writable: desc.cpu_writable,
            backing,
        };
        BufferId::from_index(self.buffers_mut(kind).push(buffer))
    }

    /// # Panics
    ///
    /// Panics if `id` is not a live buffer of `kind`.
    pub fn buffer(&self, kind: BufferKind, id: BufferId) -> &Buffer {
        match id.index().and_then(|index| self.buffers(kind).get(index)) {
            Some(buffer) => buffer,
            None => panic!("{:?} buffer handle {} is not live", kind, id),
        }
    }

    pub fn try_buffer(&self, kind: BufferKind, id: BufferId) -> Option<&Buffer> {
        self.buffers(kind).get(id.index()?)
    }

    /// Overwrite the start of a CPU-writable buffer
    pub fn update_buffer(&self, kind: BufferKind, id: BufferId, data: &[u8]) -> Result<()> {
        let buffer = self.buffer(kind, id);
        if !buffer.cpu_writable {
            return Err(crate::error::Error::InvalidResource(format!(
                "{:?} buffer {} is not CPU writable", kind, id
            )));
        }
        if data.len() as u64 > buffer.size() {
            return Err(crate::error::Error::InvalidResource(format!(
                "{} bytes do not fit {:?} buffer {} ({} bytes)", data.len(), kind, id, buffer.size()
            )));
        }
        buffer.backing.update(0, data)
    }

    pub fn buffer_count(&self, kind: BufferKind) -> usize {
        self.buffers(kind).len()
    }

    // ===== SAMPLERS AND FIXED-FUNCTION STATE =====

    pub fn create_sampler(&mut self, desc: &SamplerDesc) -> SamplerId {
        match lock(&self.device).create_sampler(desc) {
            Ok(backing) => SamplerId::from_index(self.samplers.push(Sampler { desc: desc.clone(), backing })),
            Err(e) => {
                engine_error!(SOURCE, "Cannot create sampler state: {}", e);
                SamplerId::INVALID
            }
        }
    }

    pub fn sampler(&self, id: SamplerId) -> &Sampler {
        match id.index().and_then(|index| self.samplers.get(index)) {
            Some(sampler) => sampler,
            None => panic!("sampler handle {} is not live", id),
        }
    }

    pub fn try_sampler(&self, id: SamplerId) -> Option<&Sampler> {
        self.samplers.get(id.index()?)
    }

    pub fn sampler_count(&self) -> usize {
        self.samplers.len()
    }

    pub fn create_rasterizer_state(&mut self, desc: &RasterizerDesc) -> RasterizerStateId {
        match lock(&self.device).create_rasterizer_state(desc) {
            Ok(backing) => RasterizerStateId::from_index(
                self.rasterizer_states.push(RasterizerState { desc: *desc, backing }),
            ),
            Err(e) => {
                engine_error!(SOURCE, "Unable to create rasterizer state (cull {:?}): {}", desc.cull_mode, e);
                RasterizerStateId::INVALID
            }
        }
    }

    pub fn rasterizer_state(&self, id: RasterizerStateId) -> &RasterizerState {
        match id.index().and_then(|index| self.rasterizer_states.get(index)) {
            Some(state) => state,
            None => panic!("rasterizer state handle {} is not live", id),
        }
    }

    pub fn create_blend_state(&mut self, desc: &BlendDesc) -> BlendStateId {
        match lock(&self.device).create_blend_state(desc) {
            Ok(backing) => BlendStateId::from_index(self.blend_states.push(BlendState { desc: *desc, backing })),
            Err(e) => {
                engine_error!(SOURCE, "Unable to create blend state: {}", e);
                BlendStateId::INVALID
            }
        }
    }

    pub fn blend_state(&self, id: BlendStateId) -> &BlendState {
        match id.index().and_then(|index| self.blend_states.get(index)) {
            Some(state) => state,
            None => panic!("blend state handle {} is not live", id),
        }
    }

    pub fn create_depth_stencil_state(&mut self, desc: &DepthStencilDesc) -> DepthStencilStateId {
        match lock(&self.device).create_depth_stencil_state(desc) {
            Ok(backing) => DepthStencilStateId::from_index(
                self.depth_stencil_states.push(DepthStencilState { desc: *desc, backing }),
            ),
            Err(e) => {
                engine_error!(SOURCE, "Unable to create depth-stencil state: {}", e);
                DepthStencilStateId::INVALID
            }
        }
    }

    pub fn depth_stencil_state(&self, id: DepthStencilStateId) -> &DepthStencilState {
        match id.index().and_then(|index| self.depth_stencil_states.get(index)) {
            Some(state) => state,
            None => panic!("depth-stencil state handle {} is not live", id),
        }
    }

    // ===== RENDER TARGETS =====

    /// Create a texture and a render-target view over it
    pub fn create_render_target(&mut self, desc: &RenderTargetDesc) -> RenderTargetId {
        let texture = self.create_texture_2d(&desc.texture_desc);
        if !texture.is_valid() {
            return RenderTargetId::INVALID;
        }
        let target = self.create_render_target_from_texture(texture, &ViewDesc::texture_2d(desc.format));
        if !target.is_valid() {
            self.release_texture(texture);
        }
        target
    }

    /// Create a render-target view over an existing texture
    pub fn create_render_target_from_texture(&mut self, texture: TextureId, view_desc: &ViewDesc) -> RenderTargetId {
        let Some(backing) = self.textures_mut().get(texture).map(|entry| entry.backing.clone()) else {
            engine_error!(SOURCE, "Render target over a texture that is not live: {}", texture);
            return RenderTargetId::INVALID;
        };
        match lock(&self.device).create_view(ViewKind::RenderTarget, &backing, view_desc) {
            Ok(view) => RenderTargetId::from_index(self.render_targets.push(RenderTarget { texture, view })),
            Err(e) => {
                engine_error!(SOURCE, "Cannot create render target view: {}", e);
                RenderTargetId::INVALID
            }
        }
    }

    pub fn render_target(&self, id: RenderTargetId) -> &RenderTarget {
        match id.index().and_then(|index| self.render_targets.get(index)) {
            Some(target) => target,
            None => panic!("render target handle {} is not live", id),
        }
    }

    pub fn render_target_count(&self) -> usize {
        self.render_targets.len()
    }

    // ===== DEPTH TARGETS =====

    /// Create a depth texture and one depth target per slice (cube face)
    ///
    /// Slices whose view cannot be created get an `INVALID` entry.
    pub fn create_depth_target(&mut self, desc: &DepthTargetDesc) -> Vec<DepthTargetId> {
        let slice_count = desc.texture_desc.slice_count();
        let texture = self.create_texture_2d(&desc.texture_desc);
        let Some(backing) = self.textures_mut().get(texture).map(|entry| entry.backing.clone()) else {
            return vec![DepthTargetId::INVALID; slice_count as usize];
        };

        (0..slice_count)
            .map(|slice| match self.create_depth_view(&backing, desc.format, slice, slice_count) {
                Ok(view) => DepthTargetId::from_index(self.depth_targets.push(DepthTarget { texture, slice, view })),
                Err(e) => {
                    engine_error!(SOURCE, "Cannot create depth stencil view for slice {}: {}", slice, e);
                    DepthTargetId::INVALID
                }
            })
            .collect()
    }

    fn create_depth_view(
        &self,
        backing: &Arc<dyn DeviceTexture>,
        format: TextureFormat,
        slice: u32,
        slice_count: u32,
    ) -> Result<Arc<dyn DeviceView>> {
        let view_desc = ViewDesc {
            format,
            dimension: if slice_count > 1 { ViewDimension::Texture2DArray } else { ViewDimension::Texture2D },
            first_slice: slice,
            array_size: slice_count - slice,
            first_mip: 0,
            mip_count: 1,
        };
        lock(&self.device).create_view(ViewKind::DepthStencil, backing, &view_desc)
    }

    /// Rebuild a single-slice depth target in place with a new descriptor
    ///
    /// The old texture is released first so the new one lands in a recycled
    /// slot; the depth target handle stays the same.
    pub fn recycle_depth_target(&mut self, id: DepthTargetId, desc: &DepthTargetDesc) -> bool {
        if desc.texture_desc.slice_count() != 1 {
            engine_error!(SOURCE, "recycle_depth_target() does not support depth target arrays");
            return false;
        }
        let Some(old_texture) = id.index().and_then(|index| self.depth_targets.get(index)).map(|target| target.texture) else {
            engine_error!(SOURCE, "recycle_depth_target() on a depth target that is not live: {}", id);
            return false;
        };

        self.release_texture(old_texture);
        let texture = self.create_texture_2d(&desc.texture_desc);
        let Some(backing) = self.textures_mut().get(texture).map(|entry| entry.backing.clone()) else {
            self.detach_depth_target(id);
            return false;
        };
        let view = match self.create_depth_view(&backing, desc.format, 0, 1) {
            Ok(view) => view,
            Err(e) => {
                engine_error!(SOURCE, "Cannot recreate depth stencil view: {}", e);
                self.release_texture(texture);
                self.detach_depth_target(id);
                return false;
            }
        };
        match id.index().and_then(|index| self.depth_targets.get_mut(index)) {
            Some(target) => {
                *target = DepthTarget { texture, slice: 0, view };
                true
            }
            None => false,
        }
    }

    /// The texture behind `id` is gone; stop the entry from naming its slot
    fn detach_depth_target(&mut self, id: DepthTargetId) {
        engine_error!(SOURCE, "Depth target {} lost its texture during recycle", id);
        if let Some(target) = id.index().and_then(|index| self.depth_targets.get_mut(index)) {
            target.texture = TextureId::INVALID;
        }
    }

    pub fn depth_target(&self, id: DepthTargetId) -> &DepthTarget {
        match id.index().and_then(|index| self.depth_targets.get(index)) {
            Some(target) => target,
            None => panic!("depth target handle {} is not live", id),
        }
    }

    pub fn depth_target_count(&self) -> usize {
        self.depth_targets.len()
    }

    // ===== SHUTDOWN =====

    /// Release every vertex, index and read-write buffer
    pub fn release_buffers(&mut self) -> usize {
        self.vertex_buffers.drain().len() + self.index_buffers.drain().len() + self.rw_buffers.drain().len()
    }

    /// Release everything in dependency order: buffers, textures (views
    /// before backing), samplers, render targets, fixed-function states,
    /// depth targets
    pub fn release_all(&mut self) {
        let buffers = self.release_buffers();

        let textures = self.textures_mut();
        textures.names.clear();
        let released = textures.slots.drain();
        let texture_count = released.len();
        for texture in released {
            texture.release();
        }

        let samplers = self.samplers.drain().len();
        let render_targets = self.render_targets.drain().len();
        let states = self.rasterizer_states.drain().len()
            + self.blend_states.drain().len()
            + self.depth_stencil_states.drain().len();
        let depth_targets = self.depth_targets.drain().len();

        engine_info!(
            SOURCE,
            "Released {} buffers, {} textures, {} samplers, {} render targets, {} states, {} depth targets",
            buffers, texture_count, samplers, render_targets, states, depth_targets
        );
    }
}

#[cfg(test)]
#[path = "resource_pool_tests.rs"]
mod tests;

use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use serial_test::serial;
use crate::error::Error;
use crate::graphics_device::mock_graphics_device::MockGraphicsDevice;
use crate::graphics_device::{BufferUsage, Filter, AddressMode, CullMode, FillMode};
use crate::log::LogSeverity;
use crate::test_utils::capture_logs;

// ============================================================================
// Helpers
// ============================================================================

/// Serves solid images; any path containing "missing" fails to decode
struct TestImageLoader {
    width: u32,
    height: u32,
    loads: AtomicUsize,
    hdr_loads: AtomicUsize,
}

impl TestImageLoader {
    fn new(width: u32, height: u32) -> Arc<Self> {
        Arc::new(Self { width, height, loads: AtomicUsize::new(0), hdr_loads: AtomicUsize::new(0) })
    }

    fn image(&self, path: &Path, format: TextureFormat) -> Result<ImageData> {
        if path.to_string_lossy().contains("missing") {
            return Err(Error::InvalidResource(format!("cannot decode {}", path.display())));
        }
        Ok(ImageData {
            width: self.width,
            height: self.height,
            format,
            pixels: vec![0x7F; (self.width * self.height * format.bytes_per_pixel()) as usize],
        })
    }
}

impl ImageLoader for TestImageLoader {
    fn load(&self, path: &Path) -> Result<ImageData> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.image(path, TextureFormat::R8G8B8A8_UNORM)
    }

    fn load_hdr(&self, path: &Path) -> Result<ImageData> {
        self.hdr_loads.fetch_add(1, Ordering::SeqCst);
        self.image(path, TextureFormat::R32G32B32A32_FLOAT)
    }
}

fn create_pool() -> (Arc<Mutex<MockGraphicsDevice>>, ResourcePool) {
    let device = MockGraphicsDevice::shared(800, 600);
    let shared: Arc<Mutex<dyn GraphicsDevice>> = device.clone();
    (device, ResourcePool::new(shared))
}

fn create_pool_with_loader(loader: Arc<TestImageLoader>) -> (Arc<Mutex<MockGraphicsDevice>>, ResourcePool) {
    let (device, pool) = create_pool();
    let pool = pool.with_image_loader(loader).with_roots("Data/Textures/", "Data/Textures/EnvironmentMaps/");
    (device, pool)
}

fn color_desc(width: u32, height: u32) -> TextureDesc {
    TextureDesc::new_2d(width, height, TextureFormat::R8G8B8A8_UNORM)
}

fn depth_desc(width: u32, height: u32) -> DepthTargetDesc {
    DepthTargetDesc {
        texture_desc: TextureDesc {
            usage: TextureUsage::DEPTH_STENCIL | TextureUsage::SHADER_RESOURCE,
            ..TextureDesc::new_2d(width, height, TextureFormat::R32_TYPELESS)
        },
        format: TextureFormat::D32_FLOAT,
    }
}

// ============================================================================
// create_texture_2d
// ============================================================================

#[test]
fn test_create_texture_2d_with_srv() {
    let (device, mut pool) = create_pool();
    let id = pool.create_texture_2d(&color_desc(64, 32));

    assert_eq!(id, TextureId::from_index(0));
    let texture = pool.texture(id);
    assert_eq!((texture.width, texture.height, texture.depth), (64, 32, 1));
    assert!(texture.srv().is_some());
    assert!(texture.uav().is_none());
    assert!(!texture.is_array());
    assert_eq!(device.lock().unwrap().creation_count("texture"), 1);
}

#[test]
fn test_file_textures_append_past_released_slots() {
    let (_device, mut pool) = create_pool_with_loader(TestImageLoader::new(8, 8));
    let first = pool.create_texture_2d(&color_desc(4, 4));
    let second = pool.create_texture_2d(&color_desc(4, 4));
    assert!(pool.release_texture(first));

    let brick = pool.create_texture_from_file("brick.png", false);
    let sky = pool.create_hdr_texture("sky.hdr");
    assert_eq!(brick.index(), Some(2));
    assert_eq!(sky.index(), Some(3));

    assert_eq!(pool.create_texture_2d(&color_desc(4, 4)), first);
    assert_eq!(pool.texture_by_name("brick.png"), brick);
    assert_eq!(second.index(), Some(1));
    assert_eq!(pool.texture_count(), 4);
}

#[test]
fn test_create_texture_2d_reuses_released_slot() {
    let (_device, mut pool) = create_pool();
    let ids: Vec<TextureId> = (0..3).map(|_| pool.create_texture_2d(&color_desc(4, 4))).collect();

    assert!(pool.release_texture(ids[1]));
    assert!(pool.try_texture(ids[1]).is_none());

    let reused = pool.create_texture_2d(&color_desc(8, 8));
    assert_eq!(reused, ids[1]);
    assert_eq!(pool.texture(reused).width, 8);
    assert_eq!(pool.create_texture_2d(&color_desc(4, 4)), TextureId::from_index(3));
}

#[test]
fn test_create_texture_2d_array_views() {
    let (_device, mut pool) = create_pool();
    let desc = TextureDesc {
        usage: TextureUsage::COMPUTE_RW,
        array_size: 4,
        ..color_desc(16, 16)
    };
    let id = pool.create_texture_2d(&desc);
    let texture = pool.texture(id);

    assert!(texture.is_array());
    assert_eq!(texture.depth, 4);
    assert_eq!(texture.srv_slices.len(), 4);
    assert_eq!(texture.uav_slices.len(), 4);
    assert!(Arc::ptr_eq(texture.srv_slice(0).unwrap(), texture.srv().unwrap()));
    assert_eq!(texture.srv_slice(2).unwrap().desc().first_slice, 2);
    assert!(texture.srv_slice(4).is_none());
}

#[test]
fn test_create_texture_2d_cube_array_view() {
    let (_device, mut pool) = create_pool();
    let desc = TextureDesc { is_cube_map: true, array_size: 2, ..color_desc(16, 16) };
    let id = pool.create_texture_2d(&desc);
    let texture = pool.texture(id);

    assert_eq!(texture.depth, 12);
    let srv = texture.srv().unwrap();
    assert_eq!(srv.desc().dimension, ViewDimension::TextureCubeArray);
    assert_eq!(srv.desc().array_size, 12);
}

#[test]
fn test_typeless_depth_formats_get_readable_srv() {
    let (_device, mut pool) = create_pool();
    let desc = TextureDesc {
        usage: TextureUsage::DEPTH_STENCIL | TextureUsage::SHADER_RESOURCE,
        ..TextureDesc::new_2d(32, 32, TextureFormat::R24G8_TYPELESS)
    };
    let id = pool.create_texture_2d(&desc);
    let texture = pool.texture(id);
    assert_eq!(texture.srv().unwrap().desc().format, TextureFormat::R24_UNORM_X8_TYPELESS);
}

#[test]
#[serial]
fn test_create_texture_2d_device_failure_returns_invalid() {
    let logs = capture_logs();
    let (device, mut pool) = create_pool();
    device.lock().unwrap().fail_texture_creation = true;

    assert_eq!(pool.create_texture_2d(&color_desc(4, 4)), TextureId::INVALID);
    assert!(logs.contains(LogSeverity::Error, "Cannot create texture"));
    assert_eq!(pool.texture_count(), 0);
}

#[test]
#[should_panic]
fn test_texture_lookup_of_released_slot_panics() {
    let (_device, mut pool) = create_pool();
    let id = pool.create_texture_2d(&color_desc(4, 4));
    pool.release_texture(id);
    let _ = pool.texture(id);
}

#[test]
#[should_panic]
fn test_texture_lookup_of_invalid_handle_panics() {
    let (_device, pool) = create_pool();
    let _ = pool.texture(TextureId::INVALID);
}

// ============================================================================
// Textures from files
// ============================================================================

#[test]
fn test_texture_from_file_is_deduplicated() {
    let loader = TestImageLoader::new(64, 64);
    let (device, pool) = create_pool_with_loader(loader.clone());

    let first = pool.create_texture_from_file("brick.png", false);
    let second = pool.create_texture_from_file("brick.png", false);

    assert!(first.is_valid());
    assert_eq!(first, second);
    assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
    assert_eq!(device.lock().unwrap().creation_count("texture"), 1);
}

#[test]
fn test_distinct_files_get_distinct_handles() {
    let (_device, pool) = create_pool_with_loader(TestImageLoader::new(8, 8));
    let names = ["a.png", "b.png", "c.png", "d.png"];
    let ids: Vec<TextureId> = names.iter().map(|name| pool.create_texture_from_file(name, false)).collect();

    for (i, id) in ids.iter().enumerate() {
        assert!(id.is_valid());
        assert!(ids[i + 1..].iter().all(|other| other != id));
        assert_eq!(pool.texture_by_name(names[i]), *id);
    }
}

#[test]
#[serial]
fn test_texture_from_file_empty_name() {
    let logs = capture_logs();
    let (_device, pool) = create_pool_with_loader(TestImageLoader::new(8, 8));

    assert_eq!(pool.create_texture_from_file("", false), TextureId::INVALID);
    assert_eq!(pool.create_texture_from_file("\"\"", false), TextureId::INVALID);
    assert_eq!(logs.count(LogSeverity::Warn), 2);
}

#[test]
#[serial]
fn test_texture_from_file_decode_failure() {
    let logs = capture_logs();
    let (_device, pool) = create_pool_with_loader(TestImageLoader::new(8, 8));

    assert_eq!(pool.create_texture_from_file("missing.png", false), TextureId::INVALID);
    assert!(logs.contains(LogSeverity::Error, "Data/Textures/missing.png"));
    assert_eq!(pool.texture_count(), 0);
}

#[test]
#[serial]
fn test_texture_from_file_without_loader() {
    let logs = capture_logs();
    let (_device, pool) = create_pool();

    assert_eq!(pool.create_texture_from_file("brick.png", false), TextureId::INVALID);
    assert!(logs.contains(LogSeverity::Error, "no image loader"));
}

#[test]
fn test_texture_from_file_generates_mips() {
    let (device, pool) = create_pool_with_loader(TestImageLoader::new(256, 128));
    let id = pool.create_texture_from_file("brick.png", true);

    let texture = pool.texture(id);
    assert_eq!(texture.mip_count, 7);
    assert!(texture.usage.contains(TextureUsage::RENDER_TARGET));

    let device = device.lock().unwrap();
    assert_eq!(device.creation_count("texture"), 2);
    assert_eq!(
        device.commands,
        vec!["copy_texture 256x128 -> mip 0".to_string(), "generate_mips 7".to_string()]
    );
    // Intermediate texture is gone, final texture is still alive
    let live = device.live_object_labels();
    assert!(live.iter().all(|label| !label.starts_with("texture#")));
    assert!(live.iter().any(|label| label == "brick.png"));
}

#[test]
fn test_texture_from_file_with_explicit_root() {
    let (_device, pool) = create_pool_with_loader(TestImageLoader::new(8, 8));
    let id = pool.create_texture_from_file_in("grass.png", Path::new("Other/"), false);
    assert_eq!(pool.texture(id).name, "grass.png");
}

#[test]
fn test_hdr_texture() {
    let loader = TestImageLoader::new(32, 16);
    let (_device, pool) = create_pool_with_loader(loader.clone());

    let id = pool.create_hdr_texture("sky.hdr");
    assert_eq!(pool.create_hdr_texture("sky.hdr"), id);
    assert_eq!(loader.hdr_loads.load(Ordering::SeqCst), 1);

    let texture = pool.texture(id);
    assert_eq!(texture.format, TextureFormat::R32G32B32A32_FLOAT);
    assert_eq!(texture.mip_count, 1);
}

// ============================================================================
// Cube maps
// ============================================================================

const FACES: [&str; 6] = [
    "Data/Sky/sky_px.png", "Data/Sky/sky_nx.png", "Data/Sky/sky_py.png",
    "Data/Sky/sky_ny.png", "Data/Sky/sky_pz.png", "Data/Sky/sky_nz.png",
];

#[test]
fn test_cubemap_from_faces() {
    let loader = TestImageLoader::new(16, 16);
    let (_device, mut pool) = create_pool_with_loader(loader.clone());

    let id = pool.create_cubemap_from_face_textures(&FACES, false);
    let texture = pool.texture(id);

    assert_eq!(texture.name, "sky");
    assert!(texture.is_cube_map);
    assert_eq!(texture.depth, 6);
    assert_eq!(texture.srv().unwrap().desc().dimension, ViewDimension::TextureCube);
    assert_eq!(loader.loads.load(Ordering::SeqCst), 6);

    assert_eq!(pool.create_cubemap_from_face_textures(&FACES, false), id);
    assert_eq!(loader.loads.load(Ordering::SeqCst), 6);
}

#[test]
fn test_cubemap_hdr_faces_use_hdr_decoder() {
    let loader = TestImageLoader::new(16, 16);
    let (_device, mut pool) = create_pool_with_loader(loader.clone());
    let faces = FACES.map(|face| face.replace(".png", ".HDR"));
    let faces: Vec<&str> = faces.iter().map(String::as_str).collect();

    let id = pool.create_cubemap_from_face_textures(&faces, false);
    assert_eq!(pool.texture(id).format, TextureFormat::R32G32B32A32_FLOAT);
    assert_eq!(loader.hdr_loads.load(Ordering::SeqCst), 6);
}

#[test]
fn test_cubemap_with_mips() {
    let (device, mut pool) = create_pool_with_loader(TestImageLoader::new(64, 64));
    let id = pool.create_cubemap_from_face_textures(&FACES, true);

    assert_eq!(pool.texture(id).mip_count, 6);
    assert_eq!(device.lock().unwrap().commands_matching("generate_mips"), vec!["generate_mips 6".to_string()]);
}

#[test]
#[serial]
fn test_cubemap_needs_six_faces() {
    let logs = capture_logs();
    let (_device, mut pool) = create_pool_with_loader(TestImageLoader::new(16, 16));

    assert_eq!(pool.create_cubemap_from_face_textures(&FACES[..5], false), TextureId::INVALID);
    assert!(logs.contains(LogSeverity::Error, "needs 6 faces"));
}

#[test]
#[serial]
fn test_cubemap_face_failure() {
    let logs = capture_logs();
    let (_device, mut pool) = create_pool_with_loader(TestImageLoader::new(16, 16));
    let mut faces = FACES;
    faces[3] = "Data/Sky/sky_missing.png";

    assert_eq!(pool.create_cubemap_from_face_textures(&faces, false), TextureId::INVALID);
    assert!(logs.contains(LogSeverity::Error, "sky_missing.png"));
}

// ============================================================================
// Name lookup and release
// ============================================================================

#[test]
#[serial]
fn test_texture_by_name_missing() {
    let logs = capture_logs();
    let (_device, pool) = create_pool();

    assert_eq!(pool.texture_by_name("nothing.png"), TextureId::INVALID);
    assert!(logs.contains(LogSeverity::Error, "Texture not found: nothing.png"));
}

#[test]
fn test_release_texture_frees_name_and_device_objects() {
    let (device, mut pool) = create_pool_with_loader(TestImageLoader::new(8, 8));
    let id = pool.create_texture_from_file("brick.png", false);
    assert!(!device.lock().unwrap().live_object_labels().is_empty());

    assert!(pool.release_texture(id));
    assert!(device.lock().unwrap().live_object_labels().is_empty());
    assert!(!pool.release_texture(id));

    // Loading again goes back to the device
    let again = pool.create_texture_from_file("brick.png", false);
    assert_eq!(again, id);
    assert_eq!(device.lock().unwrap().creation_count("texture"), 2);
}

// ============================================================================
// Back buffer
// ============================================================================

#[test]
fn test_register_and_refresh_back_buffer() {
    let (device, mut pool) = create_pool();
    let (texture, target) = pool.register_back_buffer();

    assert_eq!(texture, TextureId::from_index(0));
    assert_eq!(target, RenderTargetId::from_index(0));
    assert_eq!(pool.texture(texture).width, 800);
    assert_eq!(pool.render_target(target).texture, texture);

    device.lock().unwrap().resize(1024, 768).unwrap();
    assert!(pool.refresh_back_buffer(texture, target));
    assert_eq!(pool.texture(texture).width, 1024);
    assert_eq!(pool.texture_count(), 1);
    assert_eq!(pool.render_target_count(), 1);
}

// ============================================================================
// Buffers
// ============================================================================

#[test]
fn test_buffer_registries_are_per_kind() {
    let (_device, mut pool) = create_pool();
    let vertex = pool.create_buffer(&BufferDesc::new(BufferUsage::Vertex, 4, 12));
    let index = pool.create_buffer(&BufferDesc::new(BufferUsage::Index, 6, 4));
    let rw = pool.create_buffer(&BufferDesc::new(BufferUsage::ReadWriteCompute, 16, 16));

    assert_eq!(vertex, BufferId::from_index(0));
    assert_eq!(index, BufferId::from_index(0));
    assert_eq!(rw, BufferId::from_index(0));
    assert_eq!(pool.buffer(BufferKind::Vertex, vertex).size(), 48);
    assert_eq!(pool.buffer(BufferKind::Index, index).element_count, 6);
    assert_eq!(pool.buffer_count(BufferKind::ReadWriteCompute), 1);
}

#[test]
#[serial]
fn test_constant_buffers_are_not_pooled() {
    let logs = capture_logs();
    let (_device, mut pool) = create_pool();

    assert_eq!(pool.create_buffer(&BufferDesc::constant(64)), BufferId::INVALID);
    assert!(logs.contains(LogSeverity::Warn, "Unknown buffer type"));
}

#[test]
#[serial]
fn test_buffer_device_failure() {
    let logs = capture_logs();
    let (device, mut pool) = create_pool();
    device.lock().unwrap().fail_buffer_creation = true;

    assert_eq!(pool.create_buffer(&BufferDesc::new(BufferUsage::Vertex, 3, 12)), BufferId::INVALID);
    assert_eq!(logs.count(LogSeverity::Error), 2);
}

#[test]
fn test_update_buffer() {
    let (device, mut pool) = create_pool();
    let dynamic = pool.create_buffer(&BufferDesc { cpu_writable: true, ..BufferDesc::new(BufferUsage::Vertex, 2, 4) });
    let fixed = pool.create_buffer(&BufferDesc::new(BufferUsage::Vertex, 2, 4));

    pool.update_buffer(BufferKind::Vertex, dynamic, &[1, 2, 3, 4]).unwrap();
    assert!(pool.update_buffer(BufferKind::Vertex, dynamic, &[0; 12]).is_err());
    assert!(pool.update_buffer(BufferKind::Vertex, fixed, &[0; 4]).is_err());

    let uploads = device.lock().unwrap().buffer_uploads();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].data, vec![1, 2, 3, 4]);
}

// ============================================================================
// Samplers and states
// ============================================================================

#[test]
fn test_samplers_and_states() {
    let (device, mut pool) = create_pool();
    let sampler = pool.create_sampler(&SamplerDesc::new(Filter::Point, AddressMode::Clamp));
    let rasterizer = pool.create_rasterizer_state(&RasterizerDesc::new(CullMode::None, FillMode::Wireframe));
    let blend = pool.create_blend_state(&BlendDesc::alpha_blend());
    let depth = pool.create_depth_stencil_state(&DepthStencilDesc::new(true, false));

    assert_eq!(pool.sampler(sampler).desc.filter, Filter::Point);
    assert_eq!(pool.rasterizer_state(rasterizer).desc.fill_mode, FillMode::Wireframe);
    assert!(pool.blend_state(blend).desc.blend_enable);
    assert!(!pool.depth_stencil_state(depth).desc.stencil_test_enable);
    assert_eq!(pool.sampler_count(), 1);
    assert_eq!(device.lock().unwrap().creation_count("rasterizer_state"), 1);
}

#[test]
#[serial]
fn test_state_creation_failure() {
    let logs = capture_logs();
    let (device, mut pool) = create_pool();
    {
        let mut device = device.lock().unwrap();
        device.fail_sampler_creation = true;
        device.fail_state_creation = true;
    }

    assert_eq!(pool.create_sampler(&SamplerDesc::default()), SamplerId::INVALID);
    assert_eq!(pool.create_rasterizer_state(&RasterizerDesc::default()), RasterizerStateId::INVALID);
    assert_eq!(pool.create_blend_state(&BlendDesc::disabled()), BlendStateId::INVALID);
    assert_eq!(pool.create_depth_stencil_state(&DepthStencilDesc::default()), DepthStencilStateId::INVALID);
    assert!(logs.contains(LogSeverity::Error, "Unable to create blend state"));
}

// ============================================================================
// Render targets
// ============================================================================

#[test]
fn test_create_render_target() {
    let (_device, mut pool) = create_pool();
    let desc = RenderTargetDesc {
        texture_desc: TextureDesc { usage: TextureUsage::RENDER_TARGET_RW, ..color_desc(128, 128) },
        format: TextureFormat::R8G8B8A8_UNORM,
    };
    let target = pool.create_render_target(&desc);

    let texture = pool.render_target(target).texture;
    assert_eq!(pool.texture(texture).width, 128);
    assert_eq!(pool.render_target(target).view().kind(), ViewKind::RenderTarget);
}

#[test]
#[serial]
fn test_render_target_over_shader_only_texture_fails() {
    let logs = capture_logs();
    let (_device, mut pool) = create_pool();
    let desc = RenderTargetDesc { texture_desc: color_desc(16, 16), format: TextureFormat::R8G8B8A8_UNORM };

    assert_eq!(pool.create_render_target(&desc), RenderTargetId::INVALID);
    assert_eq!(pool.texture_count(), 0);
    assert!(logs.contains(LogSeverity::Error, "render target view"));
}

#[test]
fn test_render_target_from_existing_texture() {
    let (_device, mut pool) = create_pool();
    let texture = pool.create_texture_2d(&TextureDesc { usage: TextureUsage::RENDER_TARGET_RW, ..color_desc(8, 8) });
    let target = pool.create_render_target_from_texture(texture, &ViewDesc::texture_2d(TextureFormat::R8G8B8A8_UNORM));

    assert!(target.is_valid());
    assert_eq!(pool.render_target(target).texture, texture);
}

// ============================================================================
// Depth targets
// ============================================================================

#[test]
fn test_depth_target_per_cube_face() {
    let (_device, mut pool) = create_pool();
    let mut desc = depth_desc(512, 512);
    desc.texture_desc.is_cube_map = true;

    let targets = pool.create_depth_target(&desc);
    assert_eq!(targets.len(), 6);
    for (face, id) in targets.iter().enumerate() {
        let target = pool.depth_target(*id);
        assert_eq!(target.slice, face as u32);
        assert_eq!(target.view().desc().first_slice, face as u32);
        assert_eq!(target.texture, pool.depth_target(targets[0]).texture);
    }
    assert_eq!(pool.depth_target_count(), 6);
}

#[test]
fn test_depth_target_creation_failure() {
    let (device, mut pool) = create_pool();
    device.lock().unwrap().fail_texture_creation = true;

    assert_eq!(pool.create_depth_target(&depth_desc(64, 64)), vec![DepthTargetId::INVALID]);
}

#[test]
fn test_recycle_depth_target_keeps_handle() {
    let (_device, mut pool) = create_pool();
    pool.create_texture_2d(&color_desc(4, 4));
    let id = pool.create_depth_target(&depth_desc(800, 600))[0];
    let old_texture = pool.depth_target(id).texture;

    assert!(pool.recycle_depth_target(id, &depth_desc(1024, 768)));

    let target = pool.depth_target(id);
    assert_eq!(target.texture, old_texture);
    assert_eq!(pool.texture(target.texture).width, 1024);
    assert_eq!(target.view().desc().format, TextureFormat::D32_FLOAT);
    assert_eq!(pool.texture_count(), 2);
    assert_eq!(pool.depth_target_count(), 1);
}

#[test]
#[serial]
fn test_failed_recycle_detaches_depth_target() {
    let logs = capture_logs();
    let (device, mut pool) = create_pool();
    let id = pool.create_depth_target(&depth_desc(800, 600))[0];
    let old_texture = pool.depth_target(id).texture;

    device.lock().unwrap().fail_texture_creation = true;
    assert!(!pool.recycle_depth_target(id, &depth_desc(1024, 768)));
    assert_eq!(pool.depth_target(id).texture, TextureId::INVALID);
    assert!(logs.contains(LogSeverity::Error, "lost its texture during recycle"));

    // The freed slot goes to an unrelated texture, not back to the target
    device.lock().unwrap().fail_texture_creation = false;
    assert_eq!(pool.create_texture_2d(&color_desc(4, 4)), old_texture);
    assert_eq!(pool.depth_target(id).texture, TextureId::INVALID);
}

#[test]
fn test_failed_recycle_view_leaves_no_texture_behind() {
    let (device, mut pool) = create_pool();
    let id = pool.create_depth_target(&depth_desc(800, 600))[0];

    device.lock().unwrap().fail_view_creation = true;
    assert!(!pool.recycle_depth_target(id, &depth_desc(1024, 768)));
    assert_eq!(pool.depth_target(id).texture, TextureId::INVALID);
    assert_eq!(pool.texture_count(), 0);
}

#[test]
#[serial]
fn test_recycle_depth_target_rejects_arrays() {
    let logs = capture_logs();
    let (_device, mut pool) = create_pool();
    let id = pool.create_depth_target(&depth_desc(64, 64))[0];
    let mut desc = depth_desc(64, 64);
    desc.texture_desc.array_size = 4;

    assert!(!pool.recycle_depth_target(id, &desc));
    assert!(logs.contains(LogSeverity::Error, "depth target arrays"));
}

// ============================================================================
// Shutdown
// ============================================================================

#[test]
fn test_release_all_drops_every_device_object() {
    let (device, mut pool) = create_pool_with_loader(TestImageLoader::new(8, 8));
    pool.register_back_buffer();
    pool.create_texture_from_file("brick.png", true);
    pool.create_buffer(&BufferDesc::new(BufferUsage::Index, 3, 4));
    pool.create_sampler(&SamplerDesc::default());
    pool.create_blend_state(&BlendDesc::additive());
    pool.create_depth_target(&depth_desc(64, 64));
    assert!(device.lock().unwrap().report_live_objects() > 0);

    pool.release_all();

    assert_eq!(pool.texture_count(), 0);
    assert_eq!(pool.render_target_count(), 0);
    assert_eq!(pool.depth_target_count(), 0);
    assert_eq!(pool.buffer_count(BufferKind::Index), 0);
    assert_eq!(device.lock().unwrap().report_live_objects(), 0);
    assert_eq!(pool.texture_by_name("brick.png"), TextureId::INVALID);
}

#[test]
fn test_mip_count_for() {
    assert_eq!(mip_count_for(256, 128), 7);
    assert_eq!(mip_count_for(1024, 1024), 10);
    assert_eq!(mip_count_for(1, 1), 1);
    assert_eq!(mip_count_for(300, 200), 7);
}

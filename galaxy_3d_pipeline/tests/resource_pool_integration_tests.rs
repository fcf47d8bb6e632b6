//! Integration tests for the resource pool behind a renderer
//!
//! Driven by the mock graphics device. No GPU required.
//!
//! Run with: cargo test --test resource_pool_integration_tests


use galaxy_3d_pipeline::graphics_device::{BufferDesc, BufferUsage, TextureDesc, TextureFormat, TextureUsage};
use galaxy_3d_pipeline::handle::TextureId;
use galaxy_3d_pipeline::resource::{BufferKind, DepthTargetDesc, RenderTargetDesc};
use mock_test_utils::create_renderer;
use std::path::Path;
use std::thread;

// ============================================================================
// TEXTURES FROM FILES
// ============================================================================

#[test]
fn test_integration_file_textures_are_deduplicated() {
    let (renderer, mock, loader) = create_renderer(800, 600);
    let textures_before = mock.lock().unwrap().creation_count("texture");

    let brick = renderer.create_texture_from_file("brick.png", false);
    let again = renderer.create_texture_from_file("brick.png", false);
    let stone = renderer.create_texture_from_file("stone.png", false);

    assert_eq!(brick, again);
    assert_ne!(brick, stone);
    assert_eq!(mock.lock().unwrap().creation_count("texture") - textures_before, 2);
    assert_eq!(loader.requests().len(), 2);
    assert_eq!(loader.requests()[0], Path::new("Data/Textures/").join("brick.png"));
    assert_eq!(renderer.texture_by_name("brick.png"), brick);
}

#[test]
fn test_integration_distinct_names_get_distinct_handles() {
    let (renderer, _mock, _loader) = create_renderer(800, 600);

    let names: Vec<String> = (0..10).map(|i| format!("tile_{}.png", i)).collect();
    let mut handles: Vec<TextureId> = names.iter().map(|name| renderer.create_texture_from_file(name, false)).collect();
    assert!(handles.iter().all(|handle| handle.is_valid()));

    handles.sort();
    handles.dedup();
    assert_eq!(handles.len(), 10);
}

#[test]
fn test_integration_missing_file_yields_invalid_handle() {
    let (renderer, _mock, _loader) = create_renderer(800, 600);
    let count = renderer.pool().texture_count();

    assert_eq!(renderer.create_texture_from_file("missing.png", false), TextureId::INVALID);
    assert_eq!(renderer.pool().texture_count(), count);
}

#[test]
fn test_integration_mipped_texture_from_file() {
    let (renderer, mock, _loader) = create_renderer(800, 600);

    let texture = renderer.create_texture_from_file("grass.png", true);
    let entry = renderer.pool().texture(texture);
    assert_eq!(entry.mip_count, 6);
    assert!(entry.usage.contains(TextureUsage::RENDER_TARGET));
    assert_eq!(mock.lock().unwrap().commands_matching("generate_mips"), vec!["generate_mips 6"]);
}

#[test]
fn test_integration_concurrent_loading() {
    let (renderer, mock, loader) = create_renderer(800, 600);
    let textures_before = mock.lock().unwrap().creation_count("texture");
    let names: Vec<String> = (0..8).map(|i| format!("shared_{}.png", i)).collect();

    let results: Vec<Vec<TextureId>> = thread::scope(|scope| {
        let workers: Vec<_> = (0..4)
            .map(|_| {
                let pool = renderer.pool();
                let names = &names;
                scope.spawn(move || {
                    names.iter().map(|name| pool.create_texture_from_file(name, false)).collect::<Vec<_>>()
                })
            })
            .collect();
        workers.into_iter().map(|worker| worker.join().unwrap()).collect()
    });

    for handles in &results[1..] {
        assert_eq!(handles, &results[0]);
    }
    assert_eq!(mock.lock().unwrap().creation_count("texture") - textures_before, 8);
    assert_eq!(loader.requests().len(), 8);
}

// ============================================================================
// SLOT RECYCLING
// ============================================================================

#[test]
fn test_integration_released_texture_slot_is_reused() {
    let (mut renderer, _mock, _loader) = create_renderer(800, 600);
    let desc = TextureDesc::new_2d(128, 128, TextureFormat::R8G8B8A8_UNORM);

    let first = renderer.create_texture_2d(&desc);
    let second = renderer.create_texture_2d(&desc);
    assert!(renderer.pool_mut().release_texture(first));

    assert_eq!(renderer.create_texture_2d(&desc), first);
    assert_ne!(renderer.create_texture_2d(&desc), second);
}

#[test]
fn test_integration_cubemap_and_hdr() {
    let (mut renderer, _mock, loader) = create_renderer(800, 600);

    let faces = ["sky_px.png", "sky_nx.png", "sky_py.png", "sky_ny.png", "sky_pz.png", "sky_nz.png"];
    let cube = renderer.create_cubemap_from_face_textures(&faces, false);
    let entry = renderer.pool().texture(cube);
    assert!(entry.is_cube_map);
    assert_eq!(entry.depth, 6);
    assert_eq!(renderer.texture_by_name("sky"), cube);

    let hdr = renderer.create_hdr_texture("studio.hdr");
    assert_eq!(renderer.create_hdr_texture("studio.hdr"), hdr);
    assert_eq!(renderer.pool().texture(hdr).format, TextureFormat::R32G32B32A32_FLOAT);
    assert_eq!(loader.requests().last(), Some(&Path::new("Data/Textures/EnvironmentMaps/").join("studio.hdr")));
}

// ============================================================================
// TARGETS AND BUFFERS
// ============================================================================

#[test]
fn test_integration_render_and_depth_targets() {
    let (mut renderer, _mock, _loader) = create_renderer(800, 600);

    let target = renderer.create_render_target(&RenderTargetDesc {
        texture_desc: TextureDesc {
            usage: TextureUsage::RENDER_TARGET_RW,
            ..TextureDesc::new_2d(400, 300, TextureFormat::R16G16B16A16_FLOAT)
        },
        format: TextureFormat::R16G16B16A16_FLOAT,
    });
    assert!(target.is_valid());

    let cascades = renderer.create_depth_target(&DepthTargetDesc {
        texture_desc: TextureDesc {
            usage: TextureUsage::DEPTH_STENCIL | TextureUsage::SHADER_RESOURCE,
            array_size: 4,
            ..TextureDesc::new_2d(1024, 1024, TextureFormat::R32_TYPELESS)
        },
        format: TextureFormat::D32_FLOAT,
    });
    assert_eq!(cascades.len(), 4);
    let slices: Vec<u32> = cascades.iter().map(|&id| renderer.pool().depth_target(id).slice).collect();
    assert_eq!(slices, vec![0, 1, 2, 3]);
}

#[test]
fn test_integration_buffers_live_in_their_kind_registry() {
    let (mut renderer, _mock, _loader) = create_renderer(800, 600);

    let vertices = renderer.create_buffer(&BufferDesc::new(BufferUsage::Vertex, 24, 32));
    let indices = renderer.create_buffer(&BufferDesc::new(BufferUsage::Index, 36, 4));
    let particles = renderer.create_buffer(&BufferDesc::new(BufferUsage::ReadWriteCompute, 1024, 16));

    // Each kind counts from zero
    assert_eq!(vertices.raw(), 0);
    assert_eq!(indices.raw(), 0);
    assert_eq!(particles.raw(), 0);
    assert_eq!(renderer.pool().buffer(BufferKind::Index, indices).element_count, 36);
    assert_eq!(renderer.pool().buffer(BufferKind::ReadWriteCompute, particles).size(), 16 * 1024);
}

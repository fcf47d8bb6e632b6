//! Integration tests for the logging routed through Engine
//!
//! A custom logger is installed for each test and every renderer-level
//! diagnostic is checked for severity, source and location.
//! No GPU required.
//!
//! Run with: cargo test --test logging_integration_tests


use galaxy_3d_pipeline::galaxy3d::log::LogSeverity;
use galaxy_3d_pipeline::galaxy3d::Engine;
use galaxy_3d_pipeline::graphics_device::{ShaderDesc, ShaderStage};
use mock_test_utils::{create_renderer, has_entry, TestLogger};
use serial_test::serial;

// ============================================================================
// ENGINE LOGGER
// ============================================================================

#[test]
#[serial]
fn test_integration_custom_logger_receives_renderer_logs() {
    let (logger, entries) = TestLogger::new();
    Engine::set_logger(logger);

    let (_renderer, _mock, _loader) = create_renderer(1024, 768);

    assert!(has_entry(&entries, LogSeverity::Info, "Renderer initialized (1024x768)"));
    {
        let captured = entries.lock().unwrap();
        let init = captured
            .iter()
            .find(|entry| entry.message.starts_with("Renderer initialized"))
            .unwrap();
        assert_eq!(init.source, "galaxy3d::Renderer");
        assert!(init.file.is_some());
        assert!(init.line.is_some());
    }

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_integration_reset_logger_stops_capture() {
    let (logger, entries) = TestLogger::new();
    Engine::set_logger(logger);
    Engine::reset_logger();

    let (_renderer, _mock, _loader) = create_renderer(800, 600);
    assert!(entries.lock().unwrap().is_empty());
}

// ============================================================================
// DIAGNOSTICS
// ============================================================================

#[test]
#[serial]
fn test_integration_missing_texture_is_logged() {
    let (logger, entries) = TestLogger::new();
    Engine::set_logger(logger);

    let (renderer, _mock, _loader) = create_renderer(800, 600);
    assert!(!renderer.create_texture_from_file("missing_albedo.png", false).is_valid());

    assert!(has_entry(&entries, LogSeverity::Error, "Cannot load texture file"));
    let captured = entries.lock().unwrap();
    assert!(captured
        .iter()
        .any(|entry| entry.severity == LogSeverity::Error && entry.source == "galaxy3d::ResourcePool"));
    drop(captured);

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_integration_unknown_constant_and_texture_are_logged() {
    let (logger, entries) = TestLogger::new();
    Engine::set_logger(logger);

    let (mut renderer, _mock, _loader) = create_renderer(800, 600);
    let desc = ShaderDesc::new("Scene")
        .with_stage(ShaderStage::Vertex, "Scene_vs.hlsl")
        .with_stage(ShaderStage::Pixel, "Scene_ps.hlsl");
    let shader = renderer.create_shader(&desc);
    renderer.set_shader(shader);
    let texture = renderer.create_texture_from_file("brick.png", false);

    assert!(!renderer.set_constant_1f("roughness", 0.5));
    assert!(!renderer.set_texture("normalMap", texture));

    assert!(has_entry(&entries, LogSeverity::Error, "Constant not found: \"roughness\" in shader 'Scene'"));
    assert!(has_entry(&entries, LogSeverity::Error, "\"normalMap\""));

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_integration_shader_failure_and_reload_are_logged() {
    let (logger, entries) = TestLogger::new();
    Engine::set_logger(logger);

    let (mut renderer, mock, _loader) = create_renderer(800, 600);
    mock.lock().unwrap().set_shader_broken("Scene", true);
    let desc = ShaderDesc::new("Scene").with_stage(ShaderStage::Vertex, "Scene_vs.hlsl");
    assert!(!renderer.create_shader(&desc).is_valid());
    assert!(has_entry(&entries, LogSeverity::Error, "Cannot create shader 'Scene'"));

    assert_eq!(renderer.reload_shaders(), 0);
    assert!(has_entry(&entries, LogSeverity::Info, "No updates have been made to shader source files"));

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_integration_shutdown_reports_live_objects() {
    let (logger, entries) = TestLogger::new();
    Engine::set_logger(logger);

    let (mut renderer, _mock, _loader) = create_renderer(800, 600);
    renderer.shutdown();

    assert!(has_entry(&entries, LogSeverity::Info, "Renderer shut down"));
    assert!(has_entry(&entries, LogSeverity::Info, "0 live device objects"));

    Engine::reset_logger();
}

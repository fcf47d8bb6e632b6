//! Device and renderer configuration
//!
//! Parsing these from a settings file is left to the application; the
//! structs only carry the values and sensible defaults.

use crate::graphics_device::TextureFormat;

/// Parameters used to bootstrap a graphics device and its swap chain
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Back buffer width in pixels
    pub width: u32,
    /// Back buffer height in pixels
    pub height: u32,
    /// Wait for vertical sync on present
    pub vsync: bool,
    /// Exclusive fullscreen
    pub fullscreen: bool,
    /// Swap chain color format
    pub back_buffer_format: TextureFormat,
    /// Enable the API debug layer
    pub enable_validation: bool,
    /// Application name (debug markers, window title)
    pub app_name: String,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            vsync: false,
            fullscreen: false,
            back_buffer_format: TextureFormat::R8G8B8A8_UNORM,
            enable_validation: cfg!(debug_assertions),
            app_name: String::from("Galaxy3D"),
        }
    }
}

/// Strategy used to match a constant name against a shader's mapping list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConstantLookup {
    /// Scan every mapping in order
    #[default]
    Linear,
    /// Binary search over the name-sorted mapping list
    BinarySearch,
}

/// Renderer-level configuration
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Device/swap chain parameters
    pub device: DeviceConfig,
    /// Format of the default depth target's depth-stencil view
    pub depth_format: TextureFormat,
    /// Directory prepended to shader stage file names
    pub shader_root: String,
    /// Directory prepended to texture file names
    pub texture_root: String,
    /// Directory prepended to HDR environment map file names
    pub hdr_texture_root: String,
    /// Allow blend states to be bound (debug switch)
    pub enable_blend: bool,
    /// Constant name lookup strategy
    pub constant_lookup: ConstantLookup,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            device: DeviceConfig::default(),
            depth_format: TextureFormat::D32_FLOAT,
            shader_root: String::from("Source/Shaders/"),
            texture_root: String::from("Data/Textures/"),
            hdr_texture_root: String::from("Data/Textures/EnvironmentMaps/"),
            enable_blend: true,
            constant_lookup: ConstantLookup::Linear,
        }
    }
}

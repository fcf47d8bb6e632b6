/// Graphics device module - backend-facing traits and descriptors

// Module declarations
pub mod graphics_device;
pub mod texture;
pub mod buffer;
pub mod sampler;
pub mod state;
pub mod shader;
pub mod context;

// Re-export everything from graphics_device.rs
pub use graphics_device::*;

// Re-export from other modules
pub use texture::*;
pub use buffer::*;
pub use sampler::*;
pub use state::*;
pub use shader::*;
pub use context::*;

// Mock graphics device (no GPU required), public so integration tests and
// downstream crates can drive a renderer headless
pub mod mock_graphics_device;

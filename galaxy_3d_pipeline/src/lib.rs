/*!
# Galaxy 3D Pipeline

GPU resource and pipeline-state management for the Galaxy 3D engine.

The crate sits between application rendering code and a graphics device.
It owns the lifetime of every GPU object behind stable integer handles,
tracks the logical pipeline state, and defers per-draw texture and sampler
bindings until just before the draw is submitted.

## Architecture

- **GraphicsDevice / DeviceContext**: backend traits that create objects and submit work
- **ResourcePool**: handle registries with slot recycling for every resource kind
- **Shader / ConstantResolver**: reflected constant tables, CPU shadows and dirty uploads
- **CommandQueue**: deferred bind commands flushed in order before each draw
- **PipelineState**: selected handles and change detection against the last submission
- **Renderer**: the front end applications draw through

A `MockGraphicsDevice` records every call and needs no GPU.
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod config;
pub mod handle;
pub mod utils;
pub mod graphics_device;
pub mod resource;
pub mod shader;
pub mod command;
pub mod pipeline;
pub mod renderer;

#[cfg(test)]
mod test_utils;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine singleton
    pub use crate::engine::Engine;

    // Front end
    pub use crate::renderer::Renderer;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Backend traits and descriptors
    pub mod device {
        pub use crate::graphics_device::*;
    }

    // Resource sub-module
    pub mod resource {
        pub use crate::handle::*;
        pub use crate::resource::*;
    }

    // Shader sub-module
    pub mod shader {
        pub use crate::shader::*;
    }

    // Pipeline sub-module
    pub mod pipeline {
        pub use crate::command::*;
        pub use crate::pipeline::*;
        pub use crate::renderer::*;
    }

    // Configuration
    pub mod config {
        pub use crate::config::*;
    }
}

// Re-export math library at crate root
pub use glam;

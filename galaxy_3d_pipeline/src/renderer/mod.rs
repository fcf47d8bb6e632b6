/// Renderer front end: default states, frame commands and the renderer

pub mod default_states;
pub mod render_commands;
#[allow(clippy::module_inception)]
pub mod renderer;

pub use default_states::*;
pub use render_commands::*;
pub use renderer::*;

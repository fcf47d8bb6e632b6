/// Resource module - pool entries and the resource pool itself

pub(crate) mod registry;
pub mod texture;
pub mod buffer;
pub mod state;
pub mod render_target;
pub mod image_loader;
pub mod resource_pool;

pub(crate) use registry::Registry;
pub use texture::*;
pub use buffer::*;
pub use state::*;
pub use render_target::*;
pub use image_loader::*;
pub use resource_pool::*;

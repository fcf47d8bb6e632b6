/// Shader module - compiled programs, constant tables and constant resolution

pub mod shader;
pub mod constant_resolver;

pub use shader::*;
pub use constant_resolver::*;

/// Pipeline module - logical pipeline state and change detection

pub mod pipeline_state;

pub use pipeline_state::*;

/// Command module - deferred bind commands flushed before each draw

pub mod command_queue;

pub use command_queue::*;

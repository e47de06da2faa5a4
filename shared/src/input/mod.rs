pub mod error;
pub mod input_buffer;
pub mod input_event;
pub mod input_log;

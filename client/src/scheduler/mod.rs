pub mod frame_scheduler;
pub mod scheduler_config;

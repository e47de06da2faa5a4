pub mod ping_config;
pub mod ping_manager;

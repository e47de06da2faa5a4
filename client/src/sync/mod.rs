pub mod loss_window;
pub mod sync_config;
pub mod synchronizer;

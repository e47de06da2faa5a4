mod relay;
pub use relay::Relay;

mod relay_config;
pub use relay_config::RelayConfig;

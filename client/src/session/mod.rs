mod session;
pub use session::Session;

mod session_config;
pub use session_config::SessionConfig;

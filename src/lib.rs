// Re-export needed modules for the binary and the integration tests
pub mod app;
pub mod call;
pub mod composer;
pub mod config;
pub mod conversation;
pub mod models;
pub mod seed;
pub mod timers;

// Re-export main types for convenience
pub use app::ChatApp;
pub use config::{Features, Settings};
pub use models::*;

//! Configuration file parsing for the dart bridge
//!
//! Supports:
//! - `.dartbridge/config.toml` - Bridge timing, store, surface and notification settings

pub mod settings;
pub mod types;

pub use settings::{config_path, init_config_dir, load_settings, CONFIG_DIR, CONFIG_FILENAME};
pub use types::*;

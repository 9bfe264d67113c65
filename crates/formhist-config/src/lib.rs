pub mod config;

pub use config::{resolve_config_path, AppConfig, CONFIG_FILE_NAME};

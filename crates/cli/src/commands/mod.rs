pub mod alerts;
pub mod config;
pub mod utils;

pub use alerts::{
    handle_alerts_command, handle_hash_command, handle_sources_command, AlertsOptions,
};
pub use config::{handle_config_command, ConfigCommands};

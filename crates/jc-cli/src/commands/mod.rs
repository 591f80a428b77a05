//! CLI command implementations

mod config;
mod gateway;

pub use config::{config_init, config_path, config_show, resolve_config_path};
pub use gateway::{parse_assignments, run_request, ConsoleOverrides};

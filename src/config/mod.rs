//! Configuration management for the campus portal

pub mod loader;
mod schema;

pub use loader::{load_config, load_config_from_path, CONFIG_FILENAME};
pub use schema::*;

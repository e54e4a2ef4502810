/// Application settings loaded from config.toml
pub mod app;

/// Database configuration and connection management
pub mod database;

/// Catalog seeding from the `[seed]` section of config.toml
pub mod seed;

pub use app::{AppConfig, load_app_config, load_config};

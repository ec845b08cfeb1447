/// Application configuration from config.toml and the environment
pub mod app;

/// Database configuration and connection management
pub mod database;

/// Menu seeding from config.toml
pub mod menu;

pub use app::{AppConfig, load_app_configuration};

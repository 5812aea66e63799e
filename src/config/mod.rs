/// Database configuration and connection management
pub mod database;

/// Menu reference-data loading and seeding from menu.toml
pub mod menu;

/// Database configuration and connection management
pub mod database;

/// Program seed configuration loading from config.toml
pub mod programs;

/// HTTP server settings from environment variables
pub mod server;

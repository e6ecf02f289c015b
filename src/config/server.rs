//! HTTP server configuration loaded from environment variables.

use crate::errors::{Error, Result};
use std::net::SocketAddr;

/// Settings for the REST API listener.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP server binds to
    pub bind_addr: SocketAddr,
}

impl ServerConfig {
    /// Reads the server settings from the environment.
    ///
    /// `BIND_ADDR` defaults to `0.0.0.0:3000` when unset.
    pub fn from_env() -> Result<Self> {
        let bind_addr = std::env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse()
            .map_err(|e| Error::Config {
                message: format!("Invalid BIND_ADDR: {e}"),
            })?;

        Ok(Self { bind_addr })
    }
}

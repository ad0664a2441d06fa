// SPDX-License-Identifier: MIT

//! Server configuration
//!
//! Values come from the environment (a `.env` file is loaded by `main`),
//! and command line flags override them.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::canvas::error::CanvasError;

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_BODY_LIMIT: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Catalog file; the builtin catalog is used when unset
    pub catalog: Option<PathBuf>,
    /// Maximum accepted request body, in bytes
    pub body_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            catalog: None,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, CanvasError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CanvasError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("KINETIC_CANVAS_HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("PORT") {
            config.port = port
                .parse()
                .map_err(|_| CanvasError::config(format!("invalid PORT: {}", port)))?;
        }
        if let Some(path) = lookup("KINETIC_CANVAS_CATALOG") {
            config.catalog = Some(PathBuf::from(path));
        }
        if let Some(limit) = lookup("KINETIC_CANVAS_BODY_LIMIT") {
            config.body_limit = limit.parse().map_err(|_| {
                CanvasError::config(format!("invalid KINETIC_CANVAS_BODY_LIMIT: {}", limit))
            })?;
        }

        Ok(config)
    }

    pub fn addr(&self) -> Result<SocketAddr, CanvasError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| CanvasError::config(format!("invalid host: {}", self.host)))
    }
}

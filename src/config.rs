use std::env;
use std::path::PathBuf;

use anyhow::Context;

// ============================================================================
// Configuration
// ============================================================================
//
// Environment-driven, with working defaults:
//
//   FULFILLMENT_BIND  listen address          (default 0.0.0.0)
//   FULFILLMENT_PORT  listen port             (default 8080)
//   DATABASE_URL      SQLite url; when unset the in-memory store is used
//   PRODUCTS_FILE     JSON product catalog for the in-memory mode
//
// ============================================================================

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub port: u16,
    pub database_url: Option<String>,
    pub products_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            port: 8080,
            database_url: None,
            products_file: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let port = match env::var("FULFILLMENT_PORT") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("FULFILLMENT_PORT is not a port number: {raw}"))?,
            Err(_) => defaults.port,
        };

        Ok(Self {
            bind_addr: env::var("FULFILLMENT_BIND").unwrap_or(defaults.bind_addr),
            port,
            database_url: env::var("DATABASE_URL").ok(),
            products_file: env::var("PRODUCTS_FILE").ok().map(PathBuf::from),
        })
    }
}

//! Runtime settings.
//!
//! Read from an optional `config/config.toml`, then from `CATALOG_*`
//! environment variables (`CATALOG_PORT=9000`,
//! `CATALOG_CORS_ORIGINS=http://a.test,http://b.test`, ...).

use ::config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

pub const CONFIG_FILE: &str = "config/config.toml";
pub const ENV_PREFIX: &str = "CATALOG";

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default = "default_app_name")]
    pub app_name: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// JSON snapshot backing the store; in-memory only when unset.
    #[serde(default)]
    pub data_file: Option<PathBuf>,
    /// Origins allowed to make credentialed cross-origin requests.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

fn default_app_name() -> String {
    "Catalog Basket API".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

/// Local frontend dev servers (Vite picks the next free port from 5173).
fn default_cors_origins() -> Vec<String> {
    (5173..=5177)
        .map(|port| format!("http://localhost:{port}"))
        .collect()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            host: default_host(),
            port: default_port(),
            data_file: None,
            cors_origins: default_cors_origins(),
        }
    }
}

impl Settings {
    /// Loads settings from [`CONFIG_FILE`] (if present) overlaid with the
    /// environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Environment::with_prefix(ENV_PREFIX))
    }

    fn load_from(environment: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(
                environment
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cors_origins"),
            )
            .build()?
            .try_deserialize()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn welcome_message(&self) -> String {
        format!("Welcome to {}", self.app_name)
    }
}

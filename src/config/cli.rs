//! Command line flags and layered resolution.
//!
//! Precedence, highest first: flag, `STRAPI_HOOK_*` environment variable,
//! config file, built-in default. clap covers the first two; the file and
//! defaults are merged underneath here.

use std::path::PathBuf;

use clap::Parser;

use crate::config::loader::{default_config_path, load_config, ConfigError};
use crate::config::schema::{GatewayConfig, DEFAULT_PATH, DEFAULT_PORT, DEFAULT_TARGET};
use crate::config::validation::validate_config;

#[derive(Debug, Clone, Default, Parser)]
#[command(name = "strapi-hook")]
#[command(version, about = "Audits webhook calls and relays them to a target", long_about = None)]
pub struct Cli {
    /// Config file (default is $HOME/.strapi-hook.toml)
    #[arg(long, env = "STRAPI_HOOK_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Port number of the HTTP server (default is 8080)
    #[arg(short, long, env = "STRAPI_HOOK_PORT", value_parser = parse_port)]
    pub port: Option<u16>,

    /// Target server address (default is http://localhost:10080/api)
    #[arg(long, env = "STRAPI_HOOK_TARGET")]
    pub target: Option<String>,

    /// Path of the audited endpoint (default is /strapi)
    #[arg(long, env = "STRAPI_HOOK_PATH")]
    pub path: Option<String>,
}

/// An empty value parses as 0, which resolves to the default.
fn parse_port(value: &str) -> Result<u16, std::num::ParseIntError> {
    match value.trim() {
        "" => Ok(0),
        port => port.parse(),
    }
}

/// A validated configuration and the file it was read from, if any.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: GatewayConfig,
    pub file: Option<PathBuf>,
}

impl Cli {
    /// Resolve against the home directory config file.
    pub fn resolve(&self) -> Result<ResolvedConfig, ConfigError> {
        self.resolve_with(default_config_path())
    }

    /// Resolve using `fallback_file` when no `--config` was given.
    pub fn resolve_with(&self, fallback_file: Option<PathBuf>) -> Result<ResolvedConfig, ConfigError> {
        let file = self.config.clone().or(fallback_file);

        let mut config = match &file {
            Some(path) => load_config(path)?,
            None => GatewayConfig::default(),
        };

        // Zero and empty mean "unset" in every layer.
        if config.port == 0 {
            config.port = DEFAULT_PORT;
        }
        if config.target.is_empty() {
            config.target = DEFAULT_TARGET.to_string();
        }
        if config.path.is_empty() {
            config.path = DEFAULT_PATH.to_string();
        }

        if let Some(port) = self.port.filter(|p| *p != 0) {
            config.port = port;
        }
        if let Some(target) = self.target.as_deref().filter(|t| !t.is_empty()) {
            config.target = target.to_string();
        }
        if let Some(path) = self.path.as_deref().filter(|p| !p.is_empty()) {
            config.path = path.to_string();
        }

        validate_config(&config).map_err(ConfigError::Validation)?;

        Ok(ResolvedConfig { config, file })
    }
}

//! Settings of the `dompet` binary.
//!
//! Values come from an optional TOML file (`config/settings.toml` unless
//! `--config` says otherwise), then from `DOMPET__<SECTION>__<KEY>`
//! environment variables, e.g. `DOMPET__SERVER__PORT=8080`.

use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "config/settings.toml";

#[derive(Debug, Parser)]
#[command(name = "dompet", version)]
struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    /// Tracing level for the workspace crates.
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    /// Path of the database file, created when missing.
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
    pub max_upload_bytes: Option<usize>,
    pub seed_default_categories: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Option<Server>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let args = Args::parse();
        let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);

        Config::builder()
            .add_source(File::with_name(config_path).required(false))
            .add_source(
                Environment::with_prefix("DOMPET")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

impl Server {
    pub fn server_config(&self) -> server::ServerConfig {
        let defaults = server::ServerConfig::default();
        server::ServerConfig {
            bind: self.bind.clone().unwrap_or(defaults.bind),
            port: self.port,
            max_upload_bytes: self.max_upload_bytes.unwrap_or(defaults.max_upload_bytes),
            seed_default_categories: self
                .seed_default_categories
                .unwrap_or(defaults.seed_default_categories),
        }
    }
}

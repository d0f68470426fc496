//! Global configuration, loaded from `Lectern.toml` if present.
//!
//! ```toml
//! [general]
//! cache_templates = false
//! ```
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static CONFIG: OnceCell<Config> = OnceCell::new();

#[derive(Error, Debug)]
pub enum Error {
    #[error("config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("config file not found")]
    Io(#[from] std::io::Error),

    #[error("config not found")]
    NoConfig,
}

/// Global configuration.
pub struct Config {
    path: Option<PathBuf>,
    /// Use ANSI colors in log output.
    pub tty: bool,
    /// Reuse cached templates between renders. Off, every render
    /// re-extracts and recompiles; mtime invalidation usually makes
    /// turning this off unnecessary, even in development.
    pub cache_templates: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: None,
            tty: std::io::stderr().is_terminal(),
            cache_templates: true,
        }
    }
}

impl Config {
    pub fn load() -> Result<Config, Error> {
        for name in ["Lectern.toml", "lectern.toml"] {
            let path = PathBuf::from(name);

            if path.exists() {
                let config_file = ConfigFile::load(&path)?;
                let mut config = Config::default();

                config.path = Some(path);
                config.cache_templates = config_file.general.cache_templates;

                return Ok(config);
            }
        }

        Err(Error::NoConfig)
    }

    pub fn get() -> &'static Config {
        get_config()
    }

    pub fn log_info(&self) {
        match &self.path {
            Some(path) => tracing::info!("config loaded from {}", path.display()),
            None => tracing::info!("using default config"),
        }
    }
}

pub fn get_config() -> &'static Config {
    CONFIG.get_or_init(|| Config::load().unwrap_or_default())
}

#[derive(Serialize, Deserialize)]
struct ConfigFile {
    general: General,
}

impl ConfigFile {
    fn load(path: impl AsRef<Path>) -> Result<ConfigFile, Error> {
        let file = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&file)?;

        Ok(config)
    }
}

#[derive(Serialize, Deserialize)]
struct General {
    #[serde(default = "General::default_cache_templates")]
    cache_templates: bool,
}

impl General {
    fn default_cache_templates() -> bool {
        true
    }
}

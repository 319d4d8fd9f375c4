//! Configuration loading.
//!
//! Settings come from an optional TOML file. Every section has defaults, so
//! a missing file or a partial one is fine; command-line flags in the
//! binaries override whatever is loaded here.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

pub use crate::learn::TdLeafParams;
pub use crate::player::PlayerConfig;
pub use crate::selfplay::SelfPlayConfig;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "EXPENDIBOTS_CONFIG";

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "expendibots.toml";

/// Top-level configuration file layout.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_level: String,
    /// Player used by the protocol binary.
    pub player: PlayerConfig,
    pub selfplay: SelfPlayConfig,
    /// Weights loaded at startup, if any.
    pub weights: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_level: "info".to_string(),
            player: PlayerConfig::default(),
            selfplay: SelfPlayConfig::default(),
            weights: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Parses configuration from TOML text.
pub fn parse_config(text: &str, path: &Path) -> Result<Config, ConfigError> {
    toml::from_str(text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads configuration from `path`.
pub fn load_from_path(path: &Path) -> Result<Config, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&text, path)
}

/// Loads configuration from an explicit path, then `$EXPENDIBOTS_CONFIG`,
/// then `expendibots.toml` in the working directory, falling back to the
/// defaults when none exists.
pub fn load_config(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    if let Some(path) = explicit {
        info!(path = %path.display(), "loading config");
        return load_from_path(path);
    }
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        let path = PathBuf::from(path);
        info!(path = %path.display(), "loading config from {}", CONFIG_ENV);
        return load_from_path(&path);
    }
    let local = Path::new(DEFAULT_CONFIG_FILE);
    if local.exists() {
        info!(path = %local.display(), "loading config");
        return load_from_path(local);
    }
    debug!("no config file found, using built-in defaults");
    Ok(Config::default())
}

/// Installs the stderr tracing subscriber used by the binaries.
///
/// `RUST_LOG` wins over `level`. Stdout is left to the protocol.
pub fn init_tracing(level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

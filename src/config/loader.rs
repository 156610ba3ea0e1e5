//! Settings loading from disk and the process environment.
//!
//! Resolution precedence: built-in defaults < settings file < environment
//! overrides. A missing file is not an error; a file that exists but fails to
//! parse or validate aborts startup.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::Settings;
use crate::config::validation::{validate_settings, ValidationError};

/// Environment variable naming the settings file when `--config` is absent.
pub const CONFIG_PATH_ENV: &str = "SAMPLE_APP_CONFIG";

/// Environment variable overriding the listen address as `host:port`.
pub const LISTEN_ADDRESS_ENV: &str = "LISTEN_ADDRESS";

/// Environment variable whose value is appended to every instrument name,
/// letting concurrent instances report distinguishable series.
pub const INSTANCE_ID_ENV: &str = "INSTANCE_ID";

/// Settings file probed in the working directory when nothing else names one.
const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Error type for settings resolution. Always fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid settings: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("invalid {LISTEN_ADDRESS_ENV} value {0:?}, expected host:port")]
    ListenAddress(String),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Resolve the process settings.
///
/// The file is taken from `explicit_path`, then `$SAMPLE_APP_CONFIG`, then
/// `./config.toml` if present; otherwise defaults apply. `LISTEN_ADDRESS`
/// overrides host and port after file resolution.
pub fn resolve_settings(explicit_path: Option<&Path>) -> Result<Settings, ConfigError> {
    let mut settings = match settings_path(explicit_path) {
        Some(path) => load_settings(&path)?,
        None => Settings::default(),
    };

    if let Ok(addr) = env::var(LISTEN_ADDRESS_ENV) {
        apply_listen_address(&mut settings, &addr)?;
    }

    validate_settings(&settings).map_err(ConfigError::Validation)?;
    Ok(settings)
}

/// Load settings from a specific file.
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let settings = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(settings)
}

/// Optional per-instance discriminator for instrument names.
pub fn instance_id() -> Option<String> {
    env::var(INSTANCE_ID_ENV)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn settings_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Ok(path) = env::var(CONFIG_PATH_ENV) {
        return Some(PathBuf::from(path));
    }
    let default = PathBuf::from(DEFAULT_CONFIG_FILE);
    default.exists().then_some(default)
}

fn apply_listen_address(settings: &mut Settings, addr: &str) -> Result<(), ConfigError> {
    let (host, port) = addr
        .rsplit_once(':')
        .ok_or_else(|| ConfigError::ListenAddress(addr.to_string()))?;
    if host.is_empty() {
        return Err(ConfigError::ListenAddress(addr.to_string()));
    }
    let port = port
        .parse::<u16>()
        .map_err(|_| ConfigError::ListenAddress(addr.to_string()))?;

    settings.host = host.to_string();
    settings.port = port;
    Ok(())
}

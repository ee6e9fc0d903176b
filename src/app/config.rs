// mdtrace - app/config.rs
//
// Optional config.toml loading from the platform config directory
// (XDG on Linux, AppData on Windows, Library on macOS via `directories`).
//
// An absent file yields defaults; a present-but-broken file is a fatal
// startup error so a typo cannot silently change which log gets read.
// No tracing calls here: this runs before the logging subsystem is
// initialised (the chosen level may come from this very file).

use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::io;
use std::path::{Path, PathBuf};

// =============================================================================
// Raw TOML shape
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility -- a newer
/// config file can be used with an older binary without crashing.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[input]` section.
    pub input: InputSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[input]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct InputSection {
    /// Log file to analyse when -i/--input is not given.
    pub log_path: Option<PathBuf>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Tracing filter level ("info", "debug", ...).
    pub level: Option<String>,
}

// =============================================================================
// Resolved configuration
// =============================================================================

/// Validated application configuration with defaults applied.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Log file to analyse when the CLI gives none.
    pub log_path: PathBuf,

    /// Tracing filter level from the config file, if any.
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from(constants::DEFAULT_LOG_PATH),
            log_level: None,
        }
    }
}

/// Parse a TOML string into a `RawConfig`.
///
/// `source_path` is used for error messages only (not for I/O).
pub fn parse_config_toml(content: &str, source_path: &Path) -> Result<RawConfig, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::TomlParse {
        path: source_path.to_path_buf(),
        source: e,
    })
}

/// Apply defaults to a raw config.
pub fn resolve(raw: RawConfig) -> AppConfig {
    let defaults = AppConfig::default();
    AppConfig {
        log_path: raw.input.log_path.unwrap_or(defaults.log_path),
        log_level: raw.logging.level,
    }
}

/// Load config.toml from the platform config directory.
///
/// Missing directory or file both mean "use defaults"; any other read
/// or parse failure is a hard configuration error.
pub fn load() -> Result<AppConfig, ConfigError> {
    let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) else {
        return Ok(AppConfig::default());
    };
    let path = proj_dirs.config_dir().join(constants::CONFIG_FILE_NAME);

    match std::fs::read_to_string(&path) {
        Ok(content) => parse_config_toml(&content, &path).map(resolve),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(ConfigError::Io { path, source: e }),
    }
}

// =============================================================================
// Tests
// =============================================================================

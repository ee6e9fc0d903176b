// mdtrace - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// No string-based error propagation; every error names the subsystem and
// the input that produced it.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all mdtrace operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum MdTraceError {
    /// Configuration loading or validation failed.
    Config(ConfigError),

    /// Field extraction from a log line failed.
    Extract(ExtractError),

    /// Event routing failed.
    Route(RouteError),

    /// I/O error with path context.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for MdTraceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Extract(e) => write!(f, "Extraction error: {e}"),
            Self::Route(e) => write!(f, "Routing error: {e}"),
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for MdTraceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Extract(e) => Some(e),
            Self::Route(e) => Some(e),
            Self::Io { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors related to config.toml loading. These are fatal at startup:
/// a present-but-broken config file must be fixed, not silently ignored.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML file could not be parsed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// I/O error reading the config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Failed to parse TOML '{}': {source}", path.display())
            }
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
        }
    }
}

impl From<ConfigError> for MdTraceError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Extraction errors
// ---------------------------------------------------------------------------

/// Errors raised while slicing fields out of a single log line.
///
/// These are per-line and non-fatal: a matcher's required substrings were
/// present but the line is missing an expected label, so the line is
/// skipped and the rest of the file is still processed.
#[derive(Debug)]
pub enum ExtractError {
    /// An expected label did not occur in the line.
    MissingLabel {
        matcher: &'static str,
        label: &'static str,
    },

    /// The line does not begin with the two whitespace-separated
    /// timestamp tokens every controller log line carries.
    MissingTimestamp,
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingLabel { matcher, label } => {
                write!(f, "{matcher}: expected label '{label}' not found in line")
            }
            Self::MissingTimestamp => {
                write!(f, "line does not begin with '<date> <time>' tokens")
            }
        }
    }
}

impl std::error::Error for ExtractError {}

impl From<ExtractError> for MdTraceError {
    fn from(e: ExtractError) -> Self {
        Self::Extract(e)
    }
}

// ---------------------------------------------------------------------------
// Routing errors
// ---------------------------------------------------------------------------

/// Errors raised while routing an extracted event to a device timeline.
#[derive(Debug)]
pub enum RouteError {
    /// The device id was never seen by the discovery pass. The device set
    /// is fixed at construction, so the event is dropped by the caller.
    UnknownDevice { device_id: String },
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownDevice { device_id } => {
                write!(f, "unknown MAC-domain id '{device_id}'")
            }
        }
    }
}

impl std::error::Error for RouteError {}

impl From<RouteError> for MdTraceError {
    fn from(e: RouteError) -> Self {
        Self::Route(e)
    }
}

/// Convenience type alias for mdtrace results.
pub type Result<T> = std::result::Result<T, MdTraceError>;

// mdtrace - util/constants.rs
//
// Single source of truth for all named constants, marker strings, and
// defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "mdtrace";

/// Application identifier used for config directories.
pub const APP_ID: &str = "mdtrace";

/// Current application version (from Cargo.toml).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Input defaults
// =============================================================================

/// Where the MAC-domain controller writes its log on the target device.
pub const DEFAULT_LOG_PATH: &str = "/var/log/ulcmulpid.log";

/// Default tracing filter when neither RUST_LOG, --debug, nor a config
/// level is present.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Name of the optional configuration file inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

// =============================================================================
// Timeline marker strings
// =============================================================================
// These are the exact strings written into event text and searched for by
// the trim-to-last-run scan, so they must stay byte-identical across the
// matcher, timeline, and report modules.

/// Marker appended when a MAC domain is promoted to primary.
pub const PROMOTE_MARKER: &str = "^ Promote ^";

/// Marker appended when a MAC domain is demoted to backup.
pub const DEMOTE_MARKER: &str = "V Demote V";

/// Marker broadcast when the controller starts up ("lights on").
pub const STARTUP_MARKER: &str = "!-- STARTUP --!";

/// Marker broadcast when the controller shuts down ("lights off").
/// Spelling matches what the controller firmware emits.
pub const SHUTDOWN_MARKER: &str = "!-- SHOTDOWN --!";

/// Marker broadcast when a full configuration arrives.
pub const CONFIGURATION_MARKER: &str = "-- Configuration --";

/// Marker for a warm (state-preserving) slot attach.
pub const WARM_ATTACH_MARKER: &str = "-- Warm Attach --";

/// Marker for a cold slot attach.
pub const ATTACH_SLOT_MARKER: &str = "-- Attach Slot --";

/// Marker for a slot detach.
pub const DETACH_SLOT_MARKER: &str = "-- Detach Slot --";

/// Prefix for a configuration-change record; the config id follows.
pub const CONFIG_START_MARKER: &str = "Start config ID:";

// mdtrace - core/model.rs
//
// Core data model types. Pure data definitions with no I/O
// (Layer Rule: core depends on std, regex only).
//
// These types are the shared vocabulary across all layers.

use crate::util::error::ExtractError;
use regex::Regex;
use std::sync::OnceLock;

/// Opaque key identifying one MAC domain, e.g. "0x10a7000".
/// Unique within a TimelineStore; stable for the process lifetime.
pub type DeviceId = String;

// =============================================================================
// Event kind
// =============================================================================

/// Closed enumeration of the event shapes the matchers emit.
///
/// Each kind determines one render style in the report; dispatch is a
/// mapping from kind to style, never a branch on magic numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// MAC-domain state-machine transition.
    StateTransition,

    /// Controller startup/shutdown ("lights on"/"lights off").
    Lights,

    /// A full configuration arrived at the controller.
    Configuration,

    /// MAC domain promoted to primary or demoted to backup.
    PromoteDemote,

    /// Remote-PHY slot attach or detach.
    AttachDetach,

    /// Apply-configuration state-machine transition.
    ApplyState,

    /// Remove-configuration state-machine transition.
    RemoveState,

    /// Start of a configuration-change write (config id marker).
    ConfigChange,
}

// =============================================================================
// Event
// =============================================================================

/// A single timeline record for one device. Immutable after append.
#[derive(Debug, Clone)]
pub struct Event {
    /// What shape of event this is; selects the render style.
    pub kind: EventKind,

    /// Display text: the extracted message with the verbatim timestamp
    /// appended as `"<message> \t(<timestamp>)"`.
    pub text: String,

    /// Verbatim `"<date> <time>"` token pair from the source line,
    /// unparsed.
    pub timestamp: String,

    /// Per-device sequence number assigned at append time. Strictly
    /// increasing within one timeline; equals file-encounter order of
    /// that device's events.
    pub sequence: u64,
}

impl Event {
    pub(crate) fn new(kind: EventKind, message: &str, timestamp: &str, sequence: u64) -> Self {
        Self {
            kind,
            text: format!("{message} \t({timestamp})"),
            timestamp: timestamp.to_string(),
            sequence,
        }
    }
}

// =============================================================================
// Line timestamp
// =============================================================================

/// Extract the verbatim leading `"<date> <time>"` span of a log line:
/// the first two whitespace-separated tokens, including the whitespace
/// between them.
///
/// A line too short to carry both tokens is a malformed line.
pub fn line_timestamp(line: &str) -> std::result::Result<&str, ExtractError> {
    static TIMESTAMP_RE: OnceLock<Regex> = OnceLock::new();
    let re = TIMESTAMP_RE.get_or_init(|| {
        // Compiled once; the pattern is covered by the unit tests below,
        // so a mistake shows up as a failing test rather than a panic.
        Regex::new(r"^\S+\s+\S+").expect("line_timestamp: invalid regex")
    });

    re.find(line)
        .map(|m| m.as_str())
        .ok_or(ExtractError::MissingTimestamp)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_timestamp_two_tokens() {
        let line = "2023-01-01 10:00:00 MacDomain:0xAB - ::on STATE_X";
        assert_eq!(line_timestamp(line).unwrap(), "2023-01-01 10:00:00");
    }

    #[test]
    fn test_line_timestamp_is_verbatim() {
        // The span between the tokens is preserved as-is.
        let line = "Apr  2 06:00:01 kernel: boot";
        assert_eq!(line_timestamp(line).unwrap(), "Apr  2");
    }

    #[test]
    fn test_line_timestamp_missing() {
        assert!(matches!(
            line_timestamp("short"),
            Err(ExtractError::MissingTimestamp)
        ));
        assert!(matches!(
            line_timestamp(""),
            Err(ExtractError::MissingTimestamp)
        ));
    }

    #[test]
    fn test_event_text_combines_message_and_timestamp() {
        let event = Event::new(
            EventKind::StateTransition,
            "STATE_X",
            "2023-01-01 10:00:00",
            1,
        );
        assert_eq!(event.text, "STATE_X \t(2023-01-01 10:00:00)");
        assert_eq!(event.timestamp, "2023-01-01 10:00:00");
        assert_eq!(event.sequence, 1);
    }
}

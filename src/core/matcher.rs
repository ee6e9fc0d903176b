// mdtrace - core/matcher.rs
//
// The line-matcher set: one matcher per event shape the MAC-domain
// controller log can carry. Each matcher declares a required-substring
// set (AND semantics) and a substring-slicing extraction function.
//
// Matchers are independent; their substring sets are disjoint by
// log-format construction, so at most one fires per line and the fixed
// run order in `default_matchers` carries no priority semantics.

use crate::core::model::{DeviceId, EventKind};
use crate::util::constants::{
    ATTACH_SLOT_MARKER, CONFIGURATION_MARKER, CONFIG_START_MARKER, DEMOTE_MARKER,
    DETACH_SLOT_MARKER, PROMOTE_MARKER, SHUTDOWN_MARKER, STARTUP_MARKER, WARM_ATTACH_MARKER,
};
use crate::util::error::ExtractError;

// =============================================================================
// Emission
// =============================================================================

/// Where an extracted event goes: one device's timeline, or all of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Routing {
    /// Append to the timeline of the named device.
    Device(DeviceId),

    /// Append one independently-sequenced copy to every known device.
    Broadcast,
}

/// The structured output of a successful match: what happened, as text,
/// and where it belongs. The line timestamp is attached later, at
/// append time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emission {
    pub kind: EventKind,
    pub message: String,
    pub routing: Routing,
}

// =============================================================================
// LineMatcher
// =============================================================================

/// One recogniser for one event shape.
pub trait LineMatcher {
    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Substrings that must ALL be present in a line for this matcher to
    /// fire. Order-independent.
    fn required_substrings(&self) -> &'static [&'static str];

    /// Extract fields from a line that passed the substring gate.
    ///
    /// An expected label missing at this point is a malformed line; the
    /// caller skips it and keeps going.
    fn extract(&self, line: &str) -> Result<Emission, ExtractError>;

    /// Gate on the required substrings, then extract.
    /// `None` means the line is not this matcher's shape at all.
    fn try_match(&self, line: &str) -> Option<Result<Emission, ExtractError>> {
        if self.required_substrings().iter().all(|w| line.contains(w)) {
            Some(self.extract(line))
        } else {
            None
        }
    }
}

/// The full matcher set, in the fixed order the pipeline offers each
/// line to them.
pub fn default_matchers() -> Vec<Box<dyn LineMatcher>> {
    vec![
        Box::new(AttachSlot),
        Box::new(MacDomainSm),
        Box::new(DemoteMacDomain),
        Box::new(PromoteMacDomain),
        Box::new(DetachSlot),
        Box::new(ApplySm),
        Box::new(RemoveSm),
        Box::new(LightsOn),
        Box::new(LightsOff),
        Box::new(Configuration),
        Box::new(ConfigChangeCount),
    ]
}

// =============================================================================
// Extraction helpers (pure substring slicing)
// =============================================================================

/// Remainder of `line` after the first occurrence of `label`.
fn remainder_after<'a>(
    line: &'a str,
    label: &'static str,
    matcher: &'static str,
) -> Result<&'a str, ExtractError> {
    line.split_once(label)
        .map(|(_, rest)| rest)
        .ok_or(ExtractError::MissingLabel { matcher, label })
}

/// First whitespace-separated token after `label`.
fn token_after<'a>(
    line: &'a str,
    label: &'static str,
    matcher: &'static str,
) -> Result<&'a str, ExtractError> {
    let rest = remainder_after(line, label, matcher)?.trim();
    Ok(rest.split_whitespace().next().unwrap_or(rest))
}

/// Token after `label` up to the first '-', trimmed. Device ids are
/// written this way in the log ("MacDomain:0x10a7000 - ...").
fn id_after<'a>(
    line: &'a str,
    label: &'static str,
    matcher: &'static str,
) -> Result<&'a str, ExtractError> {
    let rest = remainder_after(line, label, matcher)?.trim();
    Ok(rest.split('-').next().unwrap_or(rest).trim())
}

/// Remainder of the line after the first occurrence of the device id,
/// with " -" separators collapsed to " " and the ends trimmed. This is
/// the state-machine text the report shows.
fn state_after_id(
    line: &str,
    device_id: &str,
    matcher: &'static str,
) -> Result<String, ExtractError> {
    let (_, rest) = line.split_once(device_id).ok_or(ExtractError::MissingLabel {
        matcher,
        label: "device id",
    })?;
    Ok(rest.replace(" -", " ").trim().to_string())
}

/// Common text form for slot attach/detach records.
fn slot_message(marker: &str, ip: &str, chassis: &str, slot: &str) -> String {
    format!("{marker} (ip={ip} : {chassis}/{slot})")
}

// =============================================================================
// Slot attach / detach
// =============================================================================

/// Remote-PHY slot attach, warm or cold. Concerns the whole controller,
/// so the record is broadcast to every MAC domain.
pub struct AttachSlot;

impl LineMatcher for AttachSlot {
    fn name(&self) -> &'static str {
        "AttachSlot"
    }

    fn required_substrings(&self) -> &'static [&'static str] {
        &["AttachSlot", "MdController", "warm:"]
    }

    fn extract(&self, line: &str) -> Result<Emission, ExtractError> {
        let warm = remainder_after(line, "warm:", self.name())?.trim() == "1";
        let ip = token_after(line, "rpdIp:", self.name())?;
        let chassis = token_after(line, "chassisId:", self.name())?;
        let slot = token_after(line, "slotId:", self.name())?;

        let marker = if warm {
            WARM_ATTACH_MARKER
        } else {
            ATTACH_SLOT_MARKER
        };
        Ok(Emission {
            kind: EventKind::AttachDetach,
            message: slot_message(marker, ip, chassis, slot),
            routing: Routing::Broadcast,
        })
    }
}

/// Remote-PHY slot detach. Broadcast, same field extraction as attach.
pub struct DetachSlot;

impl LineMatcher for DetachSlot {
    fn name(&self) -> &'static str {
        "DetachSlot"
    }

    fn required_substrings(&self) -> &'static [&'static str] {
        &["DetachSlot", "MdController"]
    }

    fn extract(&self, line: &str) -> Result<Emission, ExtractError> {
        let ip = token_after(line, "rpdIp:", self.name())?;
        let chassis = token_after(line, "chassisId:", self.name())?;
        let slot = token_after(line, "slotId:", self.name())?;

        Ok(Emission {
            kind: EventKind::AttachDetach,
            message: slot_message(DETACH_SLOT_MARKER, ip, chassis, slot),
            routing: Routing::Broadcast,
        })
    }
}

// =============================================================================
// State machines
// =============================================================================

/// MAC-domain state-machine transition ("MacDomain:<id> - <SM>::on...").
pub struct MacDomainSm;

impl LineMatcher for MacDomainSm {
    fn name(&self) -> &'static str {
        "MacDomainSM"
    }

    fn required_substrings(&self) -> &'static [&'static str] {
        &["MacDomain", "::on"]
    }

    fn extract(&self, line: &str) -> Result<Emission, ExtractError> {
        let device_id = id_after(line, "MacDomain:", self.name())?;
        let state = state_after_id(line, device_id, self.name())?;
        Ok(Emission {
            kind: EventKind::StateTransition,
            message: state,
            routing: Routing::Device(device_id.to_string()),
        })
    }
}

/// Apply-configuration state machine. The id is space-terminated here,
/// not dash-terminated.
pub struct ApplySm;

impl LineMatcher for ApplySm {
    fn name(&self) -> &'static str {
        "ApplySM"
    }

    fn required_substrings(&self) -> &'static [&'static str] {
        &["ApplyState", "::on"]
    }

    fn extract(&self, line: &str) -> Result<Emission, ExtractError> {
        let device_id = token_after(line, "ApplyState:", self.name())?;
        let state = state_after_id(line, device_id, self.name())?;
        Ok(Emission {
            kind: EventKind::ApplyState,
            message: state,
            routing: Routing::Device(device_id.to_string()),
        })
    }
}

/// Remove-configuration state machine.
pub struct RemoveSm;

impl LineMatcher for RemoveSm {
    fn name(&self) -> &'static str {
        "RemoveSM"
    }

    fn required_substrings(&self) -> &'static [&'static str] {
        &["RemoveState", "::on"]
    }

    fn extract(&self, line: &str) -> Result<Emission, ExtractError> {
        let device_id = id_after(line, "RemoveState:", self.name())?;
        let state = state_after_id(line, device_id, self.name())?;
        Ok(Emission {
            kind: EventKind::RemoveState,
            message: state,
            routing: Routing::Device(device_id.to_string()),
        })
    }
}

// =============================================================================
// Promote / demote
// =============================================================================

/// MAC domain promoted to primary.
pub struct PromoteMacDomain;

impl LineMatcher for PromoteMacDomain {
    fn name(&self) -> &'static str {
        "PromoteMacDomain"
    }

    fn required_substrings(&self) -> &'static [&'static str] {
        &["Promote", "MacDomain"]
    }

    fn extract(&self, line: &str) -> Result<Emission, ExtractError> {
        let device_id = id_after(line, "MacDomain:", self.name())?;
        Ok(Emission {
            kind: EventKind::PromoteDemote,
            message: PROMOTE_MARKER.to_string(),
            routing: Routing::Device(device_id.to_string()),
        })
    }
}

/// MAC domain demoted to backup. The leading space in " Demote" keeps
/// this from firing on words that merely end in "Demote".
pub struct DemoteMacDomain;

impl LineMatcher for DemoteMacDomain {
    fn name(&self) -> &'static str {
        "DemoteMacDomain"
    }

    fn required_substrings(&self) -> &'static [&'static str] {
        &[" Demote", "MacDomain"]
    }

    fn extract(&self, line: &str) -> Result<Emission, ExtractError> {
        let device_id = id_after(line, "MacDomain:", self.name())?;
        Ok(Emission {
            kind: EventKind::PromoteDemote,
            message: DEMOTE_MARKER.to_string(),
            routing: Routing::Device(device_id.to_string()),
        })
    }
}

// =============================================================================
// Configuration
// =============================================================================

/// A full configuration arrived at the controller. Broadcast.
pub struct Configuration;

impl LineMatcher for Configuration {
    fn name(&self) -> &'static str {
        "Configuration"
    }

    fn required_substrings(&self) -> &'static [&'static str] {
        &["come!!!"]
    }

    fn extract(&self, _line: &str) -> Result<Emission, ExtractError> {
        Ok(Emission {
            kind: EventKind::Configuration,
            message: CONFIGURATION_MARKER.to_string(),
            routing: Routing::Broadcast,
        })
    }
}

/// A configuration-change write started for one MAC domain; the config
/// id after "DB:" identifies the change.
pub struct ConfigChangeCount;

impl LineMatcher for ConfigChangeCount {
    fn name(&self) -> &'static str {
        "ConfigurationChangeCount"
    }

    fn required_substrings(&self) -> &'static [&'static str] {
        &["Writing update MD"]
    }

    fn extract(&self, line: &str) -> Result<Emission, ExtractError> {
        let device_id = id_after(line, "MacDomain:", self.name())?;
        let config_id = remainder_after(line, "DB:", self.name())?.trim();
        Ok(Emission {
            kind: EventKind::ConfigChange,
            message: format!("{CONFIG_START_MARKER}{config_id}"),
            routing: Routing::Device(device_id.to_string()),
        })
    }
}

// =============================================================================
// Lights (startup / shutdown)
// =============================================================================

/// Controller startup. Broadcast so every timeline carries the run
/// boundary the trim-to-last-run scan looks for.
pub struct LightsOn;

impl LineMatcher for LightsOn {
    fn name(&self) -> &'static str {
        "Lightson"
    }

    fn required_substrings(&self) -> &'static [&'static str] {
        &["lights", "on"]
    }

    fn extract(&self, _line: &str) -> Result<Emission, ExtractError> {
        Ok(Emission {
            kind: EventKind::Lights,
            message: STARTUP_MARKER.to_string(),
            routing: Routing::Broadcast,
        })
    }
}

/// Controller shutdown. Broadcast.
pub struct LightsOff;

impl LineMatcher for LightsOff {
    fn name(&self) -> &'static str {
        "Lightsoff"
    }

    fn required_substrings(&self) -> &'static [&'static str] {
        &["lights", "off"]
    }

    fn extract(&self, _line: &str) -> Result<Emission, ExtractError> {
        Ok(Emission {
            kind: EventKind::Lights,
            message: SHUTDOWN_MARKER.to_string(),
            routing: Routing::Broadcast,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

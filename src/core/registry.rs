// mdtrace - core/registry.rs
//
// MAC-domain discovery: the first pass over the log that builds the
// known device-id set (plus informational per-device metadata) before
// any event is routed. Read-only after this pass.

use crate::core::model::DeviceId;
use std::collections::BTreeMap;

/// Informational fields attached to a device id by the discovery pass.
/// Surfaced in the MDID listing only; the timeline pipeline ignores them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceMeta {
    /// Numeric designator from a "RefreshConfigData" follow-up line
    /// (the text between '(' and ')').
    pub designator: Option<String>,

    /// Port value from the same line (the text after '=').
    pub port: Option<String>,
}

/// The set of MAC-domain ids found in one log, with their metadata.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: BTreeMap<DeviceId, DeviceMeta>,
}

impl DeviceRegistry {
    /// Scan the full log content once and collect every device id.
    ///
    /// Two line shapes introduce an id:
    ///   (a) "AddMacDomain" + "MdController": id is the remainder after
    ///       the "mdId" token, trimmed;
    ///   (b) "MacDomain:0x": id is the token after "MacDomain:" up to
    ///       the first '-' or space.
    /// A line following a "RefreshConfigData" line that names a known id
    /// contributes that id's designator/port metadata, last-write-wins.
    /// Ids already seen are never duplicated.
    pub fn discover(content: &str) -> Self {
        let mut devices: BTreeMap<DeviceId, DeviceMeta> = BTreeMap::new();
        let mut prev_line = "";

        for line in content.lines() {
            if line.contains("AddMacDomain") && line.contains("MdController") {
                match line.split_once("mdId") {
                    Some((_, rest)) if !rest.trim().is_empty() => {
                        devices.entry(rest.trim().to_string()).or_default();
                    }
                    _ => {
                        tracing::warn!(line, "AddMacDomain line without an mdId value; skipped");
                    }
                }
            } else if line.contains("MacDomain:0x") {
                // The label is present by the shape check above.
                if let Some((_, rest)) = line.split_once("MacDomain:") {
                    let id = rest
                        .trim()
                        .split('-')
                        .next()
                        .unwrap_or("")
                        .trim()
                        .split(' ')
                        .next()
                        .unwrap_or("")
                        .trim();
                    if !id.is_empty() {
                        devices.entry(id.to_string()).or_default();
                    }
                }
            } else if prev_line.contains("RefreshConfigData") {
                let named: Vec<DeviceId> = devices
                    .keys()
                    .filter(|id| prev_line.contains(id.as_str()))
                    .cloned()
                    .collect();
                if !named.is_empty() {
                    match parse_meta(line) {
                        Some(meta) => {
                            for id in named {
                                devices.insert(id, meta.clone());
                            }
                        }
                        None => {
                            tracing::debug!(
                                line,
                                "RefreshConfigData follow-up without '(...)' or '='; skipped"
                            );
                        }
                    }
                }
            }
            prev_line = line;
        }

        tracing::debug!(devices = devices.len(), "Device discovery complete");
        Self { devices }
    }

    /// Iterate the discovered ids in stable (sorted) order.
    pub fn ids(&self) -> impl Iterator<Item = &DeviceId> {
        self.devices.keys()
    }

    /// Iterate ids with their metadata in stable order.
    pub fn iter(&self) -> impl Iterator<Item = (&DeviceId, &DeviceMeta)> {
        self.devices.iter()
    }

    pub fn contains(&self, device_id: &str) -> bool {
        self.devices.contains_key(device_id)
    }

    pub fn get(&self, device_id: &str) -> Option<&DeviceMeta> {
        self.devices.get(device_id)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

/// Designator/port pair from a "RefreshConfigData" follow-up line:
/// designator between '(' and ')', port after '='.
fn parse_meta(line: &str) -> Option<DeviceMeta> {
    let (_, after_open) = line.split_once('(')?;
    let (designator, _) = after_open.split_once(')')?;
    let (_, port) = line.split_once('=')?;
    Some(DeviceMeta {
        designator: Some(designator.trim().to_string()),
        port: Some(port.trim().to_string()),
    })
}

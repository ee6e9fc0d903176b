// mdtrace - core/report.rs
//
// Text rendering of device timelines and the device-id listing.
// Core layer: writes to any Write trait object, never mutates the store.

use crate::core::model::{Event, EventKind};
use crate::core::registry::DeviceRegistry;
use crate::core::timeline::{DeviceTimeline, TimelineStore};
use std::io::{self, Write};

// =============================================================================
// Render styles
// =============================================================================

/// How one event kind is laid out in the report.
struct RenderStyle {
    /// Tab depth of the event line itself.
    indent: usize,

    /// Brace-tag prefix ("{MD} ", "{Apply} ", ...). None renders the
    /// bare text at the left margin followed by a blank separator block.
    label: Option<&'static str>,

    /// Tab depth of the arrow continuation marker under the line.
    arrow_indent: Option<usize>,
}

fn style(kind: EventKind) -> RenderStyle {
    match kind {
        EventKind::StateTransition => RenderStyle {
            indent: 1,
            label: Some("{MD}"),
            arrow_indent: Some(3),
        },
        EventKind::ApplyState => RenderStyle {
            indent: 2,
            label: Some("{Apply}"),
            arrow_indent: Some(4),
        },
        EventKind::RemoveState => RenderStyle {
            indent: 2,
            label: Some("{Remove}"),
            arrow_indent: Some(3),
        },
        EventKind::ConfigChange => RenderStyle {
            indent: 1,
            label: Some("{Configuration}"),
            arrow_indent: Some(3),
        },
        EventKind::Lights
        | EventKind::Configuration
        | EventKind::PromoteDemote
        | EventKind::AttachDetach => RenderStyle {
            indent: 0,
            label: None,
            arrow_indent: None,
        },
    }
}

// =============================================================================
// Timeline report
// =============================================================================

/// Render the timelines of every device, or of the one named by
/// `device_filter`, in the store's stable iteration order.
pub fn render_report<W: Write>(
    store: &TimelineStore,
    device_filter: Option<&str>,
    out: &mut W,
) -> io::Result<()> {
    for (device_id, timeline) in store.iter() {
        if let Some(filter) = device_filter {
            if device_id.as_str() != filter {
                continue;
            }
        }
        render_timeline(timeline, out)?;
    }
    Ok(())
}

/// Render one device's timeline: header, separator, the annotated
/// events, footer.
pub fn render_timeline<W: Write>(timeline: &DeviceTimeline, out: &mut W) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out)?;
    writeln!(out, "MdId={}", timeline.device_id())?;
    writeln!(out, "-----------------")?;
    for event in timeline.events() {
        render_event(event, out)?;
    }
    writeln!(out, "\t\t ----- ")
}

fn render_event<W: Write>(event: &Event, out: &mut W) -> io::Result<()> {
    let style = style(event.kind);
    match style.label {
        Some(label) => {
            let tabs = "\t".repeat(style.indent);
            writeln!(out, "{tabs}{label} {}", event.text)?;
        }
        None => {
            // Top-level markers sit at the margin with breathing room
            // instead of an arrow.
            writeln!(out, "{}", event.text)?;
            writeln!(out)?;
            writeln!(out)?;
        }
    }
    if let Some(depth) = style.arrow_indent {
        write_arrow(out, depth)?;
    }
    Ok(())
}

/// The two-line visual continuation marker between chained records.
fn write_arrow<W: Write>(out: &mut W, depth: usize) -> io::Result<()> {
    let tabs = "\t".repeat(depth);
    writeln!(out, "{tabs}    |   ")?;
    writeln!(out, "{tabs}    V   ")
}

// =============================================================================
// Device-id listing (MDID mode)
// =============================================================================

/// Render the discovered MAC-domain ids with their designator/port
/// metadata and a trailing count.
pub fn render_device_list<W: Write>(registry: &DeviceRegistry, out: &mut W) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Mac domains list:")?;
    writeln!(out, "------------------")?;
    for (device_id, meta) in registry.iter() {
        writeln!(
            out,
            "MdId={device_id} : {} ({})",
            meta.designator.as_deref().unwrap_or("-1"),
            meta.port.as_deref().unwrap_or("")
        )?;
    }
    writeln!(out, "-----------------")?;
    writeln!(out, "Total MD in found={}", registry.len())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::EventKind;
    use crate::core::timeline::TimelineStore;

    fn rendered(store: &TimelineStore, filter: Option<&str>) -> String {
        let mut buf = Vec::new();
        render_report(store, filter, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn sample_store() -> TimelineStore {
        let mut store = TimelineStore::new(["0xAB".to_string(), "0xCD".to_string()]);
        store.broadcast(EventKind::Lights, "!-- STARTUP --!", "2023-01-01 10:00:01");
        store
            .route(
                "0xAB",
                EventKind::StateTransition,
                "CMacDomainSM::onStart INIT",
                "2023-01-01 10:00:05",
            )
            .unwrap();
        store
            .route("0xAB", EventKind::ApplyState, "CApplyCfgSM::onApply WAIT", "2023-01-01 10:00:08")
            .unwrap();
        store
    }

    #[test]
    fn test_report_has_header_per_device() {
        let output = rendered(&sample_store(), None);
        assert!(output.contains("MdId=0xAB"));
        assert!(output.contains("MdId=0xCD"));
        assert!(output.contains("-----------------"));
        assert!(output.contains("\t\t ----- "));
    }

    #[test]
    fn test_state_events_are_indented_with_labels() {
        let output = rendered(&sample_store(), None);
        assert!(output.contains("\t{MD} CMacDomainSM::onStart INIT \t(2023-01-01 10:00:05)"));
        assert!(output.contains("\t\t{Apply} CApplyCfgSM::onApply WAIT \t(2023-01-01 10:00:08)"));
        // Arrow continuation markers follow indented records.
        assert!(output.contains("\t\t\t    |   "));
        assert!(output.contains("\t\t\t    V   "));
    }

    #[test]
    fn test_top_level_markers_have_no_label() {
        let output = rendered(&sample_store(), None);
        assert!(output.contains("!-- STARTUP --! \t(2023-01-01 10:00:01)"));
        assert!(!output.contains("{MD} !-- STARTUP --!"));
    }

    #[test]
    fn test_device_filter_restricts_output() {
        let output = rendered(&sample_store(), Some("0xCD"));
        assert!(output.contains("MdId=0xCD"));
        assert!(!output.contains("MdId=0xAB"));
    }

    #[test]
    fn test_unknown_filter_renders_nothing() {
        let output = rendered(&sample_store(), Some("0xEE"));
        assert!(output.is_empty());
    }

    #[test]
    fn test_rendering_does_not_mutate_store() {
        let store = sample_store();
        let before: usize = store.iter().map(|(_, t)| t.len()).sum();
        let _ = rendered(&store, None);
        let after: usize = store.iter().map(|(_, t)| t.len()).sum();
        assert_eq!(before, after);
    }

    #[test]
    fn test_device_list_rendering() {
        let content = "2023-01-01 09:00:00 MdController AddMacDomain mdId 0xAB\n\
                       2023-01-01 09:00:03 RefreshConfigData for md 0xAB\n\
                       2023-01-01 09:00:03 md (3) port=xgmii0\n\
                       2023-01-01 09:00:05 MacDomain:0xCD - CMacDomainSM::onStart INIT\n";
        let registry = DeviceRegistry::discover(content);

        let mut buf = Vec::new();
        render_device_list(&registry, &mut buf).unwrap();
        let output = String::from_utf8(buf).unwrap();

        assert!(output.contains("Mac domains list:"));
        assert!(output.contains("MdId=0xAB : 3 (xgmii0)"));
        assert!(output.contains("MdId=0xCD : -1 ()"));
        assert!(output.contains("Total MD in found=2"));
    }
}

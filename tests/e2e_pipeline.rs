// mdtrace - tests/e2e_pipeline.rs
//
// End-to-end tests for the two-pass analysis pipeline: a raw controller
// log on disk in, rendered report text out. Everything runs against the
// real filesystem.

use mdtrace::app::pipeline::{self, PipelineOptions};
use mdtrace::util::error::MdTraceError;
use std::io::Write;
use std::path::PathBuf;

// =============================================================================
// Helpers
// =============================================================================

/// Absolute path to the on-disk fixture files.
fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Run SM mode over the sample fixture, returning the rendered report.
fn report_over_fixture(options: &PipelineOptions) -> (String, pipeline::PipelineStats) {
    let mut buf = Vec::new();
    let stats = pipeline::run_report(&fixture("ulcmulpid_sample.log"), options, &mut buf)
        .expect("pipeline should succeed on the fixture");
    (String::from_utf8(buf).unwrap(), stats)
}

// =============================================================================
// MDID mode
// =============================================================================

/// The discovery pass finds both MAC domains, with metadata for the one
/// that had a RefreshConfigData follow-up line.
#[test]
fn e2e_device_list_mode() {
    let mut buf = Vec::new();
    pipeline::run_device_list(&fixture("ulcmulpid_sample.log"), &mut buf).unwrap();
    let output = String::from_utf8(buf).unwrap();

    assert!(output.contains("Mac domains list:"), "missing header: {output}");
    assert!(output.contains("MdId=0x10a7000 : 3 (xgmii0)"), "missing metadata row: {output}");
    assert!(output.contains("MdId=0x10a8000 : -1 ()"), "missing bare row: {output}");
    assert!(output.contains("Total MD in found=2"), "missing count: {output}");
}

// =============================================================================
// SM mode
// =============================================================================

/// The full report carries every event shape with its timestamp and the
/// expected indentation.
#[test]
fn e2e_full_report() {
    let (output, stats) = report_over_fixture(&PipelineOptions::default());

    assert!(output.contains("MdId=0x10a7000"));
    assert!(output.contains("MdId=0x10a8000"));

    // State machines, indented and labelled.
    assert!(output
        .contains("\t{MD} CMacDomainSM::onStartRequest INIT_CHANNELS \t(2023-04-02 06:00:05)"));
    assert!(output.contains("\t\t{Apply} CApplyCfgSM::onApply APPLY_WAIT \t(2023-04-02 06:00:08)"));
    assert!(output
        .contains("\t\t{Remove} CRemoveCfgSM::onRemove REMOVE_DONE \t(2023-04-02 06:00:09)"));
    assert!(output.contains("\t{Configuration} Start config ID:42 \t(2023-04-02 06:00:14)"));

    // Top-level markers, unindented.
    assert!(output.contains("\n!-- STARTUP --! \t(2023-04-02 06:00:00)\n"));
    assert!(output.contains("\n^ Promote ^ \t(2023-04-02 06:00:06)\n"));
    assert!(output.contains("V Demote V \t(2023-04-02 06:00:07)"));
    assert!(output.contains("-- Warm Attach -- (ip=10.0.0.7 : 2/5) \t(2023-04-02 06:00:10)"));
    assert!(output.contains("-- Attach Slot -- (ip=10.0.0.8 : 2/6) \t(2023-04-02 06:00:11)"));
    assert!(output.contains("-- Detach Slot -- (ip=10.0.0.7 : 2/5) \t(2023-04-02 06:00:12)"));
    assert!(output.contains("-- Configuration -- \t(2023-04-02 06:00:13)"));

    assert_eq!(stats.lines, 18);
    assert_eq!(stats.events, 19); // 6 broadcasts x 2 devices + 7 routed
    assert_eq!(stats.malformed_lines, 0);
    assert_eq!(stats.dropped_events, 0);
}

/// Warm and cold attach texts are mutually exclusive per line.
#[test]
fn e2e_warm_and_cold_attach_are_distinct() {
    let (output, _) = report_over_fixture(&PipelineOptions::default());

    assert!(output.contains("-- Warm Attach -- (ip=10.0.0.7"));
    assert!(!output.contains("-- Attach Slot -- (ip=10.0.0.7"));
    assert!(output.contains("-- Attach Slot -- (ip=10.0.0.8"));
    assert!(!output.contains("-- Warm Attach -- (ip=10.0.0.8"));
}

/// A device filter restricts the report to that device's timeline.
#[test]
fn e2e_device_filter() {
    let options = PipelineOptions {
        device_filter: Some("0x10a8000".to_string()),
        last_run_only: false,
    };
    let (output, _) = report_over_fixture(&options);

    assert!(output.contains("MdId=0x10a8000"));
    assert!(!output.contains("MdId=0x10a7000"));
    assert!(output.contains("V Demote V"));
    // 0x10a7000's routed events must not leak into the filtered report.
    assert!(!output.contains("^ Promote ^"));
}

/// --last-run drops everything before the second startup marker.
#[test]
fn e2e_last_run_only() {
    let options = PipelineOptions {
        device_filter: None,
        last_run_only: true,
    };
    let (output, _) = report_over_fixture(&options);

    // The second run's startup and transition survive.
    assert!(output.contains("!-- STARTUP --! \t(2023-04-02 07:00:00)"));
    assert!(output.contains("\t{MD} CMacDomainSM::onStartRequest INIT_CHANNELS \t(2023-04-02 07:00:01)"));

    // Everything from the first run is gone.
    assert!(!output.contains("(2023-04-02 06:00:00)"));
    assert!(!output.contains("^ Promote ^"));
    assert!(!output.contains("V Demote V"));
    assert!(!output.contains("Start config ID:42"));
}

// =============================================================================
// Error paths
// =============================================================================

/// A nonexistent input file is a fatal I/O error, not a panic.
#[test]
fn e2e_missing_input_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("no-such.log");

    let result = pipeline::run_report(&missing, &PipelineOptions::default(), &mut Vec::new());
    assert!(matches!(result, Err(MdTraceError::Io { .. })));

    let result = pipeline::run_device_list(&missing, &mut Vec::new());
    assert!(matches!(result, Err(MdTraceError::Io { .. })));
}

/// Malformed lines and unknown-device events are skipped with counters;
/// the rest of the file is still analysed.
#[test]
fn e2e_malformed_lines_do_not_abort_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ulcmulpid.log");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "2023-04-02 06:00:01 MdController AddMacDomain mdId 0xAB").unwrap();
    // Gate passes for AttachSlot but rpdIp: is missing.
    writeln!(file, "2023-04-02 06:00:02 MdController AttachSlot chassisId:2 slotId:5 warm:1").unwrap();
    // Routed id that discovery never produced (no 0x prefix).
    writeln!(file, "2023-04-02 06:00:03 MacDomain:stray - ::onEvent LOST").unwrap();
    writeln!(file, "2023-04-02 06:00:04 MacDomain:0xAB - CMacDomainSM::onRecover RUNNING").unwrap();
    drop(file);

    let mut buf = Vec::new();
    let stats = pipeline::run_report(&path, &PipelineOptions::default(), &mut buf).unwrap();
    let output = String::from_utf8(buf).unwrap();

    assert_eq!(stats.malformed_lines, 1);
    assert_eq!(stats.dropped_events, 1);
    assert!(output.contains("\t{MD} CMacDomainSM::onRecover RUNNING \t(2023-04-02 06:00:04)"));
}

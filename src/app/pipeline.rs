// mdtrace - app/pipeline.rs
//
// Pipeline orchestration: read the log file, run the discovery pass,
// run the matcher pass, optionally trim to the last run, render.
//
// Two sequential full passes over the same content, single-threaded;
// the discovered-id set is the only state shared between them.
// Per-line failures are non-fatal: malformed lines are skipped and
// unknown-device events dropped, each with a diagnostic, and the rest
// of the file is still processed.

use crate::core::matcher::{default_matchers, LineMatcher};
use crate::core::model::line_timestamp;
use crate::core::registry::DeviceRegistry;
use crate::core::report;
use crate::core::timeline::TimelineStore;
use crate::util::error::{MdTraceError, Result};
use std::io::Write;
use std::path::Path;
use std::time::Instant;

// =============================================================================
// Options and summary
// =============================================================================

/// Caller-selected behaviour for a report run.
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// Restrict the report to this device id.
    pub device_filter: Option<String>,

    /// Trim every timeline to the most recent startup before rendering.
    pub last_run_only: bool,
}

/// Counters for one matcher pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Lines read from the input.
    pub lines: u64,

    /// Events appended across all timelines (a broadcast counts once
    /// per device).
    pub events: u64,

    /// Lines whose matcher gate passed but whose extraction failed.
    pub malformed_lines: u64,

    /// Events dropped because their device id was never discovered.
    pub dropped_events: u64,
}

// =============================================================================
// Matcher pass
// =============================================================================

/// Offer every line to every matcher in the fixed order, appending the
/// resulting events to the store.
pub fn collect_events(
    content: &str,
    store: &mut TimelineStore,
    matchers: &[Box<dyn LineMatcher>],
) -> PipelineStats {
    let mut stats = PipelineStats::default();

    for (line_idx, line) in content.lines().enumerate() {
        stats.lines += 1;
        let line_number = (line_idx as u64) + 1;

        for matcher in matchers {
            let Some(outcome) = matcher.try_match(line) else {
                continue;
            };

            let emission = match outcome {
                Ok(emission) => emission,
                Err(e) => {
                    tracing::warn!(
                        line_number,
                        matcher = matcher.name(),
                        error = %e,
                        "Malformed line skipped"
                    );
                    stats.malformed_lines += 1;
                    continue;
                }
            };

            let timestamp = match line_timestamp(line) {
                Ok(ts) => ts,
                Err(e) => {
                    tracing::warn!(
                        line_number,
                        matcher = matcher.name(),
                        error = %e,
                        "Malformed line skipped"
                    );
                    stats.malformed_lines += 1;
                    continue;
                }
            };

            match store.dispatch(emission, timestamp) {
                Ok(appended) => stats.events += appended as u64,
                Err(e) => {
                    tracing::warn!(line_number, error = %e, "Event dropped");
                    stats.dropped_events += 1;
                }
            }
        }
    }

    stats
}

// =============================================================================
// Modes
// =============================================================================

/// SM mode: full two-pass pipeline, report to `out`.
pub fn run_report<W: Write>(
    path: &Path,
    options: &PipelineOptions,
    out: &mut W,
) -> Result<PipelineStats> {
    let started = Instant::now();
    let content = read_log(path)?;

    let registry = DeviceRegistry::discover(&content);
    tracing::debug!(devices = registry.len(), "Discovery pass complete");

    let mut store = TimelineStore::new(registry.ids().cloned());
    let matchers = default_matchers();
    let stats = collect_events(&content, &mut store, &matchers);

    if options.last_run_only {
        store.trim_all_to_last_run();
    }

    if let Some(filter) = options.device_filter.as_deref() {
        if store.get(filter).is_none() {
            tracing::warn!(device = filter, "Filter id was not discovered in this log");
        }
    }

    report::render_report(&store, options.device_filter.as_deref(), out).map_err(|e| {
        MdTraceError::Io {
            path: path.to_path_buf(),
            operation: "write report",
            source: e,
        }
    })?;

    tracing::info!(
        lines = stats.lines,
        events = stats.events,
        malformed = stats.malformed_lines,
        dropped = stats.dropped_events,
        elapsed = ?started.elapsed(),
        "Report complete"
    );
    Ok(stats)
}

/// MDID mode: discovery pass only, id listing to `out`.
pub fn run_device_list<W: Write>(path: &Path, out: &mut W) -> Result<()> {
    let content = read_log(path)?;
    let registry = DeviceRegistry::discover(&content);

    report::render_device_list(&registry, out).map_err(|e| MdTraceError::Io {
        path: path.to_path_buf(),
        operation: "write device list",
        source: e,
    })
}

fn read_log(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| MdTraceError::Io {
        path: path.to_path_buf(),
        operation: "read log file",
        source: e,
    })
}

// =============================================================================
// Tests
// =============================================================================

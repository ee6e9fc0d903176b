// mdtrace - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. Configuration loading
// 3. Logging initialisation (debug mode support)
// 4. Mode dispatch

use clap::{Parser, ValueEnum};
use mdtrace::app::{config, pipeline};
use mdtrace::util;
use std::path::PathBuf;

/// mdtrace - Timeline analyser for MAC-domain controller logs.
///
/// Point mdtrace at a ulcmulpid.log to list the MAC domains it mentions
/// or to print an annotated per-domain event timeline.
#[derive(Parser, Debug)]
#[command(name = "mdtrace", version, about)]
struct Cli {
    /// Analysis mode.
    #[arg(short = 't', long = "mode", value_enum)]
    mode: Mode,

    /// Input log file (defaults to the configured path, then /var/log/ulcmulpid.log).
    #[arg(short = 'i', long = "input")]
    input: Option<PathBuf>,

    /// Restrict the report to one MAC-domain id (e.g. 0x10a7000).
    #[arg(short = 'f', long = "filter")]
    filter: Option<String>,

    /// Keep only events since the most recent startup marker.
    #[arg(short = 'l', long = "last-run")]
    last_run: bool,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Mode {
    /// Print the discovered MAC-domain ids and exit.
    #[value(name = "MDID", alias = "mdid")]
    MdId,

    /// Run the full pipeline and print the timeline report.
    #[value(name = "SM", alias = "sm")]
    Sm,
}

fn main() {
    let cli = Cli::parse();

    // Config before logging: the filter level may come from config.toml.
    let app_config = match config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(2);
        }
    };

    util::logging::init(cli.debug, app_config.log_level.as_deref());

    tracing::info!(
        version = util::constants::APP_VERSION,
        mode = ?cli.mode,
        debug = cli.debug,
        "mdtrace starting"
    );

    let input = match cli.input {
        Some(path) => path,
        None => {
            tracing::info!(
                path = %app_config.log_path.display(),
                "No input file given; using default"
            );
            app_config.log_path.clone()
        }
    };

    let mut stdout = std::io::stdout().lock();
    let result = match cli.mode {
        Mode::MdId => pipeline::run_device_list(&input, &mut stdout),
        Mode::Sm => {
            let options = pipeline::PipelineOptions {
                device_filter: cli.filter,
                last_run_only: cli.last_run,
            };
            pipeline::run_report(&input, &options, &mut stdout).map(|_| ())
        }
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "Analysis failed");
        eprintln!("Error: {e}");
        eprintln!("Run 'mdtrace --help' for usage.");
        std::process::exit(1);
    }
}

//! CLI entry point for the arcs tracker.
//!
//! This binary scans the local filesystem for arc directories and manages
//! the persisted registry of tracked arcs and tracked directories.
//!
//! # Usage
//!
//! ```bash
//! arcs [OPTIONS] <COMMAND>
//!
//! # Scan the root filesystem and add every new arc found
//! arcs scan --add-new
//!
//! # Scan across mounts, streaming JSON updates
//! arcs scan --full --json
//!
//! # Track a directory whose children are arcs
//! arcs track-dir ~/arcs
//!
//! # List every known arc (removes entries that no longer exist)
//! arcs list
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

use std::io::Write;

use arcs_core::{Config, ScanEvent, ScanSummary};
use arcs_registry::{ArcRegistry, JsonFileStore, SharedRegistry};
use arcs_scanner::{ArcScanner, ScanUpdate};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use futures_util::StreamExt;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// CLI ARGUMENT TYPES
// =============================================================================

/// Discover and track arc directories on the local filesystem.
///
/// An arc is a directory containing the marker file
/// (`isa.investigation.xlsx` by default).
#[derive(Parser, Debug)]
#[command(name = "arcs", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    command: Commands,

    /// Path to a JSON configuration file.
    #[arg(long, global = true, env = "ARCS_CONFIG")]
    config: Option<Utf8PathBuf>,

    /// Registry document location.
    ///
    /// Defaults to `<data dir>/arcs/localArcs.json`.
    #[arg(long, global = true, env = "ARCS_DATA_FILE")]
    data_file: Option<Utf8PathBuf>,

    /// Marker file name that identifies an arc.
    #[arg(long, global = true)]
    marker: Option<String>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan the filesystem for arcs.
    Scan {
        /// Cross filesystem boundaries and include every drive.
        #[arg(long)]
        full: bool,

        /// Add every newly discovered arc to the registry when the scan ends.
        #[arg(long)]
        add_new: bool,

        /// Stream updates as JSON lines.
        #[arg(long)]
        json: bool,

        /// Directory the search starts from (Unix only).
        #[arg(long)]
        root: Option<Utf8PathBuf>,
    },

    /// List every known arc.
    List {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Track one or more arcs.
    Add {
        /// Arc directories.
        #[arg(required = true)]
        paths: Vec<Utf8PathBuf>,
    },

    /// Stop tracking one or more arcs.
    Remove {
        /// Arc directories.
        #[arg(required = true)]
        paths: Vec<Utf8PathBuf>,
    },

    /// Track a directory whose immediate children are listed as arcs.
    TrackDir {
        /// Directory to track.
        path: Utf8PathBuf,
    },

    /// Stop tracking a directory.
    UntrackDir {
        /// Directory to stop tracking.
        path: Utf8PathBuf,
    },

    /// Show tracked directories and explicitly tracked arcs.
    Dirs,
}

// =============================================================================
// INITIALIZATION FUNCTIONS
// =============================================================================

/// Initializes the tracing subscriber for logging.
///
/// Respects the `RUST_LOG` environment variable if set. Otherwise, uses
/// `debug` level if `--verbose` is set, or `info` level by default.
/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing(verbose: bool, no_color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "info" };
        EnvFilter::new(format!("{level},mio=warn"))
    });

    // Check if colors should be disabled (flag or NO_COLOR env var)
    let use_ansi = !no_color && std::env::var("NO_COLOR").is_err();

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(use_ansi)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

/// Builds a [`Config`] from the config file and CLI overrides.
///
/// # Errors
///
/// Returns an error if the config file cannot be loaded or the resulting
/// configuration is invalid.
fn build_config(cli: &Cli) -> color_eyre::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    if let Some(data_file) = &cli.data_file {
        config.registry.data_file = Some(absolute(data_file)?);
    }
    if let Some(marker) = &cli.marker {
        config.scan.marker_file.clone_from(marker);
    }
    if let Commands::Scan {
        root: Some(root), ..
    } = &cli.command
    {
        config.scan.search_root = absolute(root)?;
    }

    config.validate()?;
    Ok(config)
}

/// Opens the registry described by the configuration.
fn open_registry(config: &Config) -> color_eyre::Result<ArcRegistry> {
    let data_file = config.registry.resolve_data_file()?;
    info!(path = %data_file, "Opening registry");

    let registry = ArcRegistry::open(JsonFileStore::new(data_file), config.scan.classifier())?;
    Ok(registry)
}

/// Makes `path` absolute against the current directory without touching
/// the filesystem.
fn absolute(path: &Utf8Path) -> color_eyre::Result<Utf8PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_owned());
    }

    let absolute = std::path::absolute(path.as_std_path())?;
    Utf8PathBuf::from_path_buf(absolute)
        .map_err(|p| color_eyre::eyre::eyre!("Path is not valid UTF-8: {}", p.display()))
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

/// Options for [`run_scan`].
#[derive(Debug, Clone, Copy)]
struct ScanOptions {
    full: bool,
    add_new: bool,
    json: bool,
}

/// Runs a scan, printing progress as it arrives.
///
/// Ctrl-C drops the update stream, which stops the search process. The
/// partial summary is still reported.
///
/// # Errors
///
/// Returns an error if writing output or adding new arcs fails.
async fn run_scan(
    config: &Config,
    registry: SharedRegistry,
    options: ScanOptions,
) -> color_eyre::Result<()> {
    let scanner = ArcScanner::new(&config.scan, registry);
    let full_scan = options.full || config.scan.full_scan;
    info!(full_scan, root = %config.scan.search_root, "Starting scan");

    let mut updates = scanner.scan(full_scan);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut last = ScanSummary::new(scanner.platform());
    let mut interrupted = false;

    loop {
        tokio::select! {
            update = updates.next() => {
                let Some(update) = update else { break };
                print_update(&update, options.json)?;
                let finished = update.is_finished();
                last = match update {
                    ScanUpdate::Progress { summary, .. } | ScanUpdate::Finished(summary) => summary,
                };
                if finished {
                    break;
                }
            }
            _ = &mut ctrl_c => {
                warn!("Interrupted, stopping scan");
                interrupted = true;
                break;
            }
        }
    }
    drop(updates);

    if !options.json {
        print_scan_summary(&last, interrupted)?;
    }

    if options.add_new && !last.new_arcs.is_empty() {
        let added = scanner
            .registry()
            .write()
            .add_arcs(last.new_arcs.iter().map(Utf8PathBuf::as_path))?;
        info!(added, "New arcs added to registry");
        if !options.json {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "Added {added} new arc(s) to the registry")?;
        }
    }

    Ok(())
}

/// Lists every known arc, repairing stale registry entries.
fn run_list(registry: &mut ArcRegistry, json: bool) -> color_eyre::Result<()> {
    let arcs = registry.list_arcs()?;

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    if json {
        serde_json::to_writer_pretty(&mut handle, &arcs)?;
        writeln!(handle)?;
        return Ok(());
    }

    if arcs.is_empty() {
        writeln!(handle, "No arcs tracked")?;
        return Ok(());
    }

    let width = arcs.iter().map(|arc| arc.name.len()).max().unwrap_or(0);
    for arc in &arcs {
        writeln!(handle, "{:<width$}  {}", arc.name, arc.location)?;
    }
    Ok(())
}

/// Tracks arcs given on the command line.
fn run_add(registry: &mut ArcRegistry, paths: &[Utf8PathBuf]) -> color_eyre::Result<()> {
    let paths = paths
        .iter()
        .map(|path| absolute(path))
        .collect::<color_eyre::Result<Vec<_>>>()?;

    for path in &paths {
        if !registry.classifier().is_arc(path) {
            warn!(
                path = %path,
                marker = registry.classifier().marker_file(),
                "Path does not look like an arc"
            );
        }
    }

    let added = registry.add_arcs(paths.iter().map(Utf8PathBuf::as_path))?;

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    writeln!(
        handle,
        "Added {added} arc(s), {} already tracked",
        paths.len() - added
    )?;
    Ok(())
}

/// Stops tracking arcs given on the command line.
fn run_remove(registry: &mut ArcRegistry, paths: &[Utf8PathBuf]) -> color_eyre::Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    for path in paths {
        let path = absolute(path)?;
        if registry.remove_arc(&path)? {
            writeln!(handle, "Removed {path}")?;
        } else {
            writeln!(handle, "Not tracked: {path}")?;
        }
    }
    Ok(())
}

/// Adds or removes a tracked directory.
fn run_track_dir(
    registry: &mut ArcRegistry,
    path: &Utf8Path,
    track: bool,
) -> color_eyre::Result<()> {
    let path = absolute(path)?;

    let changed = if track {
        if !path.is_dir() {
            warn!(path = %path, "Tracked directory does not exist yet");
        }
        registry.add_tracked_directory(&path)?
    } else {
        registry.remove_tracked_directory(&path)?
    };

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    match (track, changed) {
        (true, true) => writeln!(handle, "Tracking {path}")?,
        (true, false) => writeln!(handle, "Already tracking {path}")?,
        (false, true) => writeln!(handle, "Stopped tracking {path}")?,
        (false, false) => writeln!(handle, "Not tracked: {path}")?,
    }
    Ok(())
}

/// Prints the raw registry contents without touching the filesystem.
fn run_dirs(registry: &ArcRegistry) -> color_eyre::Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    writeln!(handle, "Tracked directories:")?;
    for directory in registry.tracked_directories() {
        writeln!(handle, "  {directory}")?;
    }
    writeln!(handle, "Tracked arcs:")?;
    for arc in registry.tracked_arcs() {
        writeln!(handle, "  {arc}")?;
    }
    Ok(())
}

// =============================================================================
// OUTPUT HELPERS
// =============================================================================

/// Prints one scan update.
fn print_update(update: &ScanUpdate, json: bool) -> std::io::Result<()> {
    if json {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        serde_json::to_writer(&mut handle, update)?;
        return writeln!(handle);
    }

    let ScanUpdate::Progress { event, .. } = update else {
        return Ok(());
    };

    match event {
        ScanEvent::Info { message } => {
            let stdout = std::io::stdout();
            writeln!(stdout.lock(), "{message}")
        }
        ScanEvent::Error { message } => {
            let stderr = std::io::stderr();
            writeln!(stderr.lock(), "error: {message}")
        }
        ScanEvent::CandidateFound { path, is_new_arc } => {
            let label = if *is_new_arc { "new  " } else { "known" };
            let stdout = std::io::stdout();
            writeln!(stdout.lock(), "  {label} {path}")
        }
    }
}

/// Prints the final scan summary.
fn print_scan_summary(summary: &ScanSummary, interrupted: bool) -> std::io::Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    let counters = &summary.counters;

    writeln!(handle)?;
    if interrupted {
        writeln!(handle, "Scan interrupted")?;
    } else {
        writeln!(handle, "Scan complete")?;
    }
    writeln!(handle, "=============")?;
    writeln!(handle, "Candidates examined: {}", counters.candidates_examined)?;
    writeln!(handle, "Arcs found:          {}", counters.arcs_found)?;
    writeln!(handle, "  New:               {}", counters.arcs_new)?;
    writeln!(handle, "  Already tracked:   {}", counters.arcs_known())?;
    writeln!(handle, "Errors:              {}", summary.error_count())?;
    Ok(())
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Application entry point.
#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    // 1. Install color-eyre FIRST (before any potential panics)
    color_eyre::install()?;

    // 2. Parse CLI arguments
    let cli = Cli::parse();

    // 3. Initialize tracing (handles --no-color for log output)
    init_tracing(cli.verbose, cli.no_color);

    // 4. Load configuration and the registry
    let config = build_config(&cli)?;
    let mut registry = open_registry(&config)?;

    // 5. Route to appropriate command
    match &cli.command {
        Commands::Scan {
            full,
            add_new,
            json,
            ..
        } => {
            let options = ScanOptions {
                full: *full,
                add_new: *add_new,
                json: *json,
            };
            run_scan(&config, registry.into_shared(), options).await
        }
        Commands::List { json } => run_list(&mut registry, *json),
        Commands::Add { paths } => run_add(&mut registry, paths),
        Commands::Remove { paths } => run_remove(&mut registry, paths),
        Commands::TrackDir { path } => run_track_dir(&mut registry, path, true),
        Commands::UntrackDir { path } => run_track_dir(&mut registry, path, false),
        Commands::Dirs => run_dirs(&registry),
    }
}

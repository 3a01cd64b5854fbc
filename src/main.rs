// LogTrail - main.rs
//
// Command-line entry point. Handles:
// 1. CLI argument parsing
// 2. config.toml loading and logging initialisation
// 3. Loading files/directories into a session
// 4. Applying the query and printing one page of the timeline
// 5. Optional JSON/CSV export of the full filtered view

use logtrail::app::loader::{self, LoadOptions};
use logtrail::app::state::{LoadOutcome, SessionStore};
use logtrail::core::discovery::DiscoveryConfig;
use logtrail::core::export;
use logtrail::core::extract::ParseConfig;
use logtrail::core::model::{format_display_date, FormatHint};
use logtrail::core::query::{IdSort, LevelSelector, SortOrder};
use logtrail::platform;
use logtrail::util::{self, error::LogTrailError};

use clap::Parser;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// LogTrail - normalise heterogeneous log files into one filterable timeline.
///
/// Accepts plain-text exports, `<Event>` XML blocks and JSON documents, and
/// directories containing them.
#[derive(Parser, Debug)]
#[command(name = "logtrail", version, about)]
struct Cli {
    /// Files or directories to load.
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Force a format for every input (line-oriented, block-tagged, hierarchical).
    #[arg(short = 'F', long = "format")]
    format: Option<FormatHint>,

    /// Search text, or a command: ID:<digits>, MSG:<text>, NIVEL:<level>.
    #[arg(short = 's', long = "search")]
    search: Option<String>,

    /// Level selector: all, critical, error, warning, info, detailed.
    #[arg(short = 'l', long = "level", default_value = "all")]
    level: LevelSelector,

    /// Date order: asc or desc.
    #[arg(long = "sort", default_value = "asc")]
    sort: SortOrder,

    /// Identifier order (overrides date order): none, asc or desc.
    #[arg(long = "sort-id", default_value = "none")]
    sort_id: IdSort,

    /// Page to print (1-based, clamped).
    #[arg(short = 'p', long = "page", default_value_t = 1)]
    page: usize,

    /// Write the filtered events as a JSON export document.
    #[arg(long = "export-json")]
    export_json: Option<PathBuf>,

    /// Write the filtered events as CSV.
    #[arg(long = "export-csv")]
    export_csv: Option<PathBuf>,

    /// Use this config.toml instead of the platform default.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    // Config is read before logging exists so its level can seed the filter;
    // its warnings are replayed once the subscriber is up.
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| platform::config::PlatformPaths::resolve().config_file());
    let (config, config_warnings) = platform::config::load_config(&config_path);

    util::logging::init(cli.debug, config.log_level.as_deref());
    for warning in &config_warnings {
        tracing::warn!(warning = %warning, "Config warning");
    }

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        "LogTrail starting"
    );

    if let Err(e) = run(&cli, &config) {
        tracing::error!(error = %e, "Run failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli, config: &platform::config::AppConfig) -> util::error::Result<()> {
    let parse_config = ParseConfig {
        max_entry_size: config.max_entry_size,
        max_file_size: config.max_file_size,
        epoch_timestamps: config.epoch_timestamps,
    };
    let options = LoadOptions {
        format_override: cli.format,
        discovery: DiscoveryConfig {
            max_depth: config.max_depth,
            include_patterns: config.include_patterns.clone(),
        },
        max_file_size: config.max_file_size,
    };

    let mut store = SessionStore::new(parse_config, config.page_size);
    let summary = loader::load_paths(&mut store, &cli.paths, &options);

    for warning in &summary.warnings {
        eprintln!("warning: {warning}");
    }
    for report in &summary.reports {
        match &report.outcome {
            LoadOutcome::Loaded { events } => eprintln!("loaded  {} ({events} events)", report.source),
            LoadOutcome::Empty => eprintln!("warning: {}: no events with a valid date", report.source),
            LoadOutcome::Duplicate => eprintln!("skipped {}: already loaded", report.source),
            LoadOutcome::Failed(e) => eprintln!("error:   {e}"),
        }
    }

    if let Some(search) = &cli.search {
        store.set_search(search);
    }
    store.set_level(cli.level);
    store.set_sort(cli.sort);
    store.set_id_sort(cli.sort_id);
    store.go_to_page(cli.page);

    print_page(&store);

    let now = chrono::Utc::now();
    if let Some(path) = &cli.export_json {
        let document = store.export_document(now);
        let count = export::export_json(&document, create(path)?, path)?;
        eprintln!("exported {count} events to {}", path.display());
    }
    if let Some(path) = &cli.export_csv {
        let count = export::export_csv(store.events(), store.ordered_indices(), create(path)?, path)?;
        eprintln!("exported {count} events to {}", path.display());
    }

    Ok(())
}

fn create(path: &Path) -> util::error::Result<BufWriter<File>> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| LogTrailError::Io {
            path: path.to_path_buf(),
            operation: "create export file",
            source: e,
        })
}

/// Print the current page and a stats footer to stdout.
fn print_page(store: &SessionStore) {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let page = store.current_page();
    let events = store.events();

    for &idx in &page.indices {
        let e = &events[idx];
        let level = e.level.map_or("-", |l| l.short_label());
        let id = e.event_id.as_deref().unwrap_or("-");
        // Broken pipe (e.g. `| head`) ends the listing quietly.
        if writeln!(
            out,
            "{:<22} {:<5} {:>6}  {}  {}",
            e.formatted_date(),
            level,
            id,
            e.source,
            e.display_message().replace('\n', "\n    ")
        )
        .is_err()
        {
            return;
        }
    }

    let stats = store.stats();
    let range = match (stats.earliest, stats.latest) {
        (Some(a), Some(b)) => format!("{} - {}", format_display_date(Some(a)), format_display_date(Some(b))),
        _ => "-".to_string(),
    };
    let _ = writeln!(
        out,
        "\npage {}/{} | {} of {} events visible | {} files | {}",
        page.page, page.total_pages, stats.visible, stats.events, stats.files, range
    );
}

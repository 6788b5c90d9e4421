use anyhow::{Context, Result};
use cellwatch::{
    DocumentSource, FileSource, HttpSource, MemoryStore, Monitor, SheetLink, SubscriptionList,
    WatchConfig, read_target,
};
use cellwatch_core::{Document, RangeReference, list_tabs};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

mod formatter;
mod logger;

use formatter::{ConsoleNotifier, Format};

#[derive(Parser)]
#[command(name = "cellwatch")]
#[command(about = "Watch cells of published spreadsheets for changes", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to configuration file (TOML)
    #[arg(short, long, global = true, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Read snapshots from DIR (<DIR>/<document id>.html) instead of fetching them
    #[arg(long, global = true, value_name = "DIR")]
    source_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "human")]
    format: OutputFormat,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// List the tabs of a spreadsheet
    Tabs {
        /// Spreadsheet link
        #[arg(value_name = "URL")]
        url: String,
    },
    /// Print the current value of a cell or range
    Get {
        /// Spreadsheet link, optionally with #gid=..&range=..
        #[arg(value_name = "URL")]
        url: String,

        /// Range to read, overriding the link ("A1" or "A1:B2")
        #[arg(short, long)]
        range: Option<String>,

        /// Tab id, overriding the link's gid
        #[arg(short, long)]
        tab: Option<String>,
    },
    /// Poll the configured subscriptions and report changes
    Watch {
        /// Stop after this many sweeps
        #[arg(long)]
        cycles: Option<usize>,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON output
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    // Load configuration
    let config = if let Some(config_path) = &cli.config {
        WatchConfig::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        // Try to load default config from current directory if it exists
        let default_config_path = PathBuf::from("cellwatch.toml");
        if default_config_path.exists() {
            WatchConfig::from_file(&default_config_path).with_context(|| {
                format!(
                    "Failed to load config from {}",
                    default_config_path.display()
                )
            })?
        } else {
            WatchConfig::default()
        }
    };

    config.validate().context("Invalid configuration")?;

    let format = match cli.format {
        OutputFormat::Human => Format::Human,
        OutputFormat::Json => Format::Json,
    };

    let source: Box<dyn DocumentSource> = match &cli.source_dir {
        Some(dir) => Box::new(FileSource::new(dir)),
        None => Box::new(
            HttpSource::new(config.global.base_url.clone(), config.fetch_timeout())
                .context("Failed to build HTTP client")?,
        ),
    };

    match cli.command {
        Command::Tabs { url } => {
            let link = SheetLink::parse(&url)?;
            let raw = source.fetch(&link.document_id)?;
            let doc = Document::parse(&raw)?;
            let tabs = list_tabs(&doc)?;
            formatter::print_tabs(&tabs, format)?;
        }
        Command::Get { url, range, tab } => {
            let mut link = SheetLink::parse(&url)?;
            if tab.is_some() {
                link.tab_id = tab;
            }
            let range = range.as_deref().map(RangeReference::parse).transpose()?;
            let target = link.into_target(range)?;

            let raw = source.fetch(&target.document_id)?;
            let value = read_target(&raw, &target, &config.limits())
                .with_context(|| format!("Failed to read {}", target.range))?;
            formatter::print_value(&target, &value, format)?;
        }
        Command::Watch { cycles } => {
            let mut monitor = Monitor::new(source, MemoryStore::new())
                .with_limits(config.limits())
                .with_poll_interval(config.poll_interval());

            let mut subscriptions = SubscriptionList::new();
            for entry in &config.subscriptions {
                monitor.subscribe(&mut subscriptions, entry.to_subscription()?)?;
            }
            if subscriptions.is_empty() {
                anyhow::bail!("No subscriptions configured. Add [[subscriptions]] to the config file.");
            }
            log::info!(
                "Watching {} subscriptions every {}s",
                subscriptions.len(),
                config.global.poll_interval_secs
            );

            monitor.run(&subscriptions, &ConsoleNotifier { format }, cycles)?;
        }
    }

    Ok(())
}

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use draft_ledger::calculate::{Dataset, RecomputeResult, SelectionRecomputer};
use draft_ledger::config::AppConfig;
use draft_ledger::models::{CardKey, EventHistoryEntry};
use draft_ledger::parse_event_list;
use draft_ledger::storage::{load_dataset, StorageConfig};

#[derive(Parser)]
#[command(name = "draft-ledger")]
#[command(about = "Pick scoring and win attribution for repeated card drafts")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recompute everything for a selection and print it as JSON
    Compute {
        /// Comma-separated event ids (default: all events)
        #[arg(long)]
        events: Option<String>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Print the best-scored cards
    Top {
        /// Comma-separated event ids (default: all events)
        #[arg(long)]
        events: Option<String>,

        /// Number of rows to print
        #[arg(long, default_value = "25")]
        limit: usize,
    },

    /// Show one card's stats, history and attribution
    Card {
        /// Card name (case-insensitive)
        name: String,

        /// Comma-separated event ids (default: all events)
        #[arg(long)]
        events: Option<String>,
    },

    /// Load and validate the configuration file
    ValidateConfig,
}

fn load_config(path: &PathBuf) -> Result<AppConfig> {
    if path.exists() {
        AppConfig::from_file(path).with_context(|| format!("Failed to load config {:?}", path))
    } else {
        Ok(AppConfig::default())
    }
}

fn init_tracing(level: &str, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn load(config: &AppConfig) -> Result<Dataset> {
    let storage = StorageConfig::new(config.data_dir.clone());
    load_dataset(&storage)
        .with_context(|| format!("Failed to load snapshot from {:?}", config.data_dir))
}

fn recompute(config: &AppConfig, dataset: &Dataset, events: Option<&str>) -> RecomputeResult {
    let recomputer = SelectionRecomputer::new(dataset, &config.scoring, &config.attribution);
    match events.and_then(parse_event_list) {
        Some(selected) => {
            tracing::info!("Recomputing for {} selected events", selected.len());
            recomputer.recompute(&selected)
        }
        None => {
            tracing::info!("Recomputing for all events");
            recomputer.recompute_all()
        }
    }
}

fn percent(rate: Option<f64>) -> String {
    rate.map(|r| format!("{:.1}%", r * 100.0))
        .unwrap_or_else(|| "-".to_string())
}

fn print_top(result: &RecomputeResult, limit: usize) {
    println!(
        "{:>4}  {:<32} {:>7} {:>7} {:>9} {:>7} {:>9} {:>7} {:>7}",
        "#", "Card", "Score", "Picked", "Avail", "Rate", "Equity", "Raw", "Games"
    );
    for (rank, stats) in result.item_stats.iter().take(limit).enumerate() {
        let equity = result.win_equity.get(&stats.key);
        let raw = result.raw_win_rate.get(&stats.key);
        let games = raw
            .map(|r| format!("{:.1}", r.games()))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:>4}  {:<32} {:>7} {:>7} {:>9} {:>7} {:>9} {:>7} {:>7}",
            rank + 1,
            stats.name,
            stats.pick_score.to_string(),
            stats.total_picked,
            stats.total_available,
            percent(stats.pick_rate()),
            percent(equity.map(|r| r.win_rate)),
            percent(raw.map(|r| r.win_rate)),
            games
        );
    }
    println!("\n(win rates are low-confidence on small samples)");
}

fn print_card(dataset: &Dataset, result: &RecomputeResult, name: &str) -> Result<()> {
    let stats = result
        .item(name)
        .with_context(|| format!("No card named {:?} in the selection", name))?;
    let key = CardKey::new(name);

    println!("=== {} ===", stats.name);
    if let Some(card) = dataset.cards.get(&key) {
        let colors = card.resolved_colors();
        let colors = if colors.is_empty() {
            "colorless".to_string()
        } else {
            colors.join("")
        };
        let kind = if card.resolved_is_land() { "land" } else { "nonland" };
        println!("Card:             {}, {}", kind, colors);
    }
    println!("Pick score:       {}", stats.pick_score);
    println!(
        "Picked:           {} / {} ({})",
        stats.total_picked,
        stats.total_available,
        percent(stats.pick_rate())
    );
    println!("Events picked in: {}", stats.events_picked_in);
    println!("Max copies:       {}", stats.max_copies_in_event);
    if let Some(copies) = result.copy_counts.get(&key) {
        println!("In latest pool:   {}", copies);
    }
    if let Some(r) = result.win_equity.get(&key) {
        println!(
            "Win equity:       {:.2}W {:.2}L ({:.1}%)",
            r.wins,
            r.losses,
            r.win_rate * 100.0
        );
    }
    if let Some(r) = result.raw_win_rate.get(&key) {
        println!(
            "Raw win rate:     {:.2}W {:.2}L ({:.1}%)",
            r.wins,
            r.losses,
            r.win_rate * 100.0
        );
    }
    println!("Distribution:     {:?}", stats.distribution.buckets());

    println!("\nHistory:");
    for entry in &stats.history {
        let date = entry.date().unwrap_or("????-??-??");
        let status = dataset
            .events
            .get(entry.event_id())
            .map(|e| e.status.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let detail = match entry {
            EventHistoryEntry::Single { was_picked: true, .. } => "picked".to_string(),
            EventHistoryEntry::Single { .. } => "unpicked".to_string(),
            EventHistoryEntry::Copies {
                picked_count,
                total_count,
                ..
            } => format!("{}/{} copies picked", picked_count, total_count),
        };
        println!(
            "  {}  {:<16} {:<9} #{:<4} {}",
            date,
            entry.event_id().as_str(),
            status,
            entry.position(),
            detail
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(&cli.config)?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    let level = cli.log_level.unwrap_or_else(|| config.log_level.clone());
    init_tracing(&level, cli.json_logs);

    tracing::info!("Starting draft-ledger v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Compute { events, pretty } => {
            let dataset = load(&config)?;
            let result = recompute(&config, &dataset, events.as_deref());
            let json = if pretty {
                serde_json::to_string_pretty(&result)?
            } else {
                serde_json::to_string(&result)?
            };
            println!("{}", json);
        }
        Commands::Top { events, limit } => {
            let dataset = load(&config)?;
            let result = recompute(&config, &dataset, events.as_deref());
            print_top(&result, limit);
        }
        Commands::Card { name, events } => {
            let dataset = load(&config)?;
            let result = recompute(&config, &dataset, events.as_deref());
            print_card(&dataset, &result, &name)?;
        }
        Commands::ValidateConfig => {
            config.validate()?;
            println!("Configuration OK: {:?}", cli.config);
            println!("Data dir:          {:?}", config.data_dir);
            println!("Copy decay:        {}", config.scoring.copy_decay);
            println!("Unpicked weight:   {}", config.scoring.unpicked_weight);
            println!(
                "Buckets:           {} x {}",
                config.scoring.bucket_count, config.scoring.bucket_width
            );
            println!("Probability tiers: {}", config.attribution.tiers.len());
        }
    }

    Ok(())
}

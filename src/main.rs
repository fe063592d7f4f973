// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use doc_track::utils::logging::{format_success, format_warning};
use doc_track::{ChangeReport, Changelog, Config, TrackOrchestrator};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "doc_track")]
#[command(author = "cipher")]
#[command(version = "0.1.0")]
#[command(about = "Track textual content changes across document revisions", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config/default.toml"
    )]
    config: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract all tracked documents, record changes, update history
    Track {
        /// Report what would change without notifying or committing
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the changelog grouped by document
    Report {
        #[arg(long)]
        json: bool,

        #[arg(short, long)]
        pretty: bool,
    },

    /// Restore the content store from a cache left by an interrupted run
    Recover,

    /// Remove empty snapshot directories from history
    Prune,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    doc_track::utils::logging::init_logger(cli.color, cli.verbose);

    info!("Document change tracker");
    info!("Loading configuration from: {}", cli.config.display());

    let config = if cli.config.exists() {
        Config::load(Some(cli.config.as_path())).context("Failed to load configuration")?
    } else {
        warn!(
            "Config file {} not found, using default configuration",
            cli.config.display()
        );
        Config::load(None).unwrap_or_else(|e| {
            warn!("Falling back to built-in defaults: {}", e);
            Config::default_config()
        })
    };

    match cli.command {
        Commands::Track { dry_run } => {
            cmd_track(&config, dry_run)?;
        }
        Commands::Report { json, pretty } => {
            cmd_report(&config, json, pretty)?;
        }
        Commands::Recover => {
            cmd_recover(&config)?;
        }
        Commands::Prune => {
            cmd_prune(&config)?;
        }
    }

    Ok(())
}

fn cmd_track(config: &Config, dry_run: bool) -> Result<()> {
    let orchestrator = TrackOrchestrator::new(config.clone());

    if dry_run {
        let planned = orchestrator.dry_run().context("Dry run failed")?;

        if planned.is_empty() {
            println!("{}", format_success("No content changes detected"));
            return Ok(());
        }

        println!("Planned changes:");
        for change in &planned {
            println!("  {:<9} {}", change.kind.to_string(), change.stem);
        }
        println!(
            "{}",
            format_warning("Dry run: nothing was notified or committed")
        );
        return Ok(());
    }

    let stats = orchestrator.run().context("Tracking run failed")?;

    if stats.total_changes() == 0 {
        println!("{}", format_success("No content changes detected"));
    } else {
        println!(
            "{}",
            format_success(&format!(
                "Recorded {} changes ({} added, {} modified, {} removed)",
                stats.total_changes(),
                stats.added,
                stats.modified,
                stats.removed
            ))
        );
    }

    Ok(())
}

fn cmd_report(config: &Config, json: bool, pretty: bool) -> Result<()> {
    let changelog = Changelog::new(config.stores.changelog.clone());
    let report = ChangeReport::from_changelog(&changelog).context("Failed to read changelog")?;

    if report.is_empty() {
        println!("{}", format_warning("Changelog is empty"));
        return Ok(());
    }

    if json {
        println!("{}", report.to_json(pretty)?);
    } else {
        println!("{}", report.render_text());
    }

    Ok(())
}

fn cmd_recover(config: &Config) -> Result<()> {
    let orchestrator = TrackOrchestrator::new(config.clone());
    let restored = orchestrator.recover().context("Recovery failed")?;

    if restored {
        println!(
            "{}",
            format_success("Restored content store from interrupted run")
        );
    } else {
        println!("{}", format_success("Nothing to recover"));
    }

    Ok(())
}

fn cmd_prune(config: &Config) -> Result<()> {
    let orchestrator = TrackOrchestrator::new(config.clone());
    let removed = orchestrator.prune().context("Pruning failed")?;

    println!(
        "{}",
        format_success(&format!("Removed {} empty snapshot directories", removed))
    );

    Ok(())
}

//! Logs command - read, prune and export the client event log

use std::path::PathBuf;

use anyhow::Result;
use chrono::{Duration, TimeZone, Utc};
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Confirm;

use bankish_core::services::{ClientEvent, EntryPoint, LogEntry, LogQuery, LoggingService};

use super::{get_bankish_dir, interactive};
use crate::output::create_table;

#[derive(Subcommand)]
pub enum LogsCommands {
    /// Show recent events, newest first
    List {
        /// Number of events to show
        #[arg(short, long, default_value = "50")]
        limit: usize,
        /// Only events that carry an error
        #[arg(long)]
        errors: bool,
        /// Only this event, e.g. fee_estimate_failed
        #[arg(long)]
        event: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete old events
    Clear {
        /// Delete events older than N days
        #[arg(long, default_value = "30")]
        older_than_days: u32,
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Copy the log database, e.g. to attach to a support request
    Export {
        /// Destination file
        output: PathBuf,
    },
    /// Totals per event and the database location
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn open_log() -> Result<LoggingService> {
    let bankish_dir = get_bankish_dir();
    std::fs::create_dir_all(&bankish_dir)?;
    LoggingService::new(&bankish_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION"))
}

fn format_time(ms: i64) -> String {
    Utc.timestamp_millis_opt(ms)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| ms.to_string())
}

pub fn run(command: LogsCommands) -> Result<()> {
    let log = open_log()?;

    match command {
        LogsCommands::List { limit, errors, event, json } => {
            let mut query = if errors { LogQuery::failures(limit) } else { LogQuery::recent(limit) };
            if let Some(name) = event {
                query = query.of(name.parse::<ClientEvent>()?);
            }
            let entries = log.entries(&query)?;

            if json {
                return crate::output::json(&entries);
            }
            if entries.is_empty() {
                println!("No events recorded.");
                return Ok(());
            }
            print_entries(entries);
        }
        LogsCommands::Clear { older_than_days, force, json } => {
            let cutoff = Utc::now() - Duration::days(i64::from(older_than_days));

            if !force && !json && interactive() {
                let confirmed = Confirm::new()
                    .with_prompt(format!("Delete events before {}?", cutoff.format("%Y-%m-%d")))
                    .default(false)
                    .interact()?;
                if !confirmed {
                    println!("Cancelled.");
                    return Ok(());
                }
            }

            let deleted = log.prune_before(cutoff.timestamp_millis())?;
            if json {
                return crate::output::json(&serde_json::json!({ "deleted": deleted }));
            }
            println!("Deleted {} events", deleted);
        }
        LogsCommands::Export { output } => {
            let path = log.export(&output)?;
            println!("{} Exported event log to {}", "✓".green(), path.display());
        }
        LogsCommands::Stats { json } => {
            let stats = log.stats()?;
            let db_path = log.db_path();
            let size_bytes = std::fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);

            if json {
                return crate::output::json(&serde_json::json!({
                    "stats": stats,
                    "databasePath": db_path,
                    "databaseSizeBytes": size_bytes,
                }));
            }

            println!("{}", "Event log".bold());
            println!("  Events:   {}", stats.total);
            println!("  Failures: {}", stats.failures);
            if let Some(oldest) = stats.oldest {
                println!("  Since:    {}", format_time(oldest));
            }
            println!("  Database: {} ({} bytes)", db_path.display(), size_bytes);

            if !stats.by_event.is_empty() {
                let mut table = create_table();
                table.set_header(vec!["Event", "Count"]);
                for (event, count) in &stats.by_event {
                    table.add_row(vec![event.clone(), count.to_string()]);
                }
                println!("\n{}", table);
            }
        }
    }

    Ok(())
}

fn print_entries(entries: Vec<LogEntry>) {
    let mut table = create_table();
    table.set_header(vec!["Time", "Area", "Event", "Subject", "Error"]);

    for entry in entries {
        let event = match entry.error {
            Some(_) => entry.event.red().to_string(),
            None => entry.event,
        };
        table.add_row(vec![
            format_time(entry.recorded_at),
            entry.area,
            event,
            entry.subject.unwrap_or_default(),
            entry.error.unwrap_or_default(),
        ]);
    }

    println!("{}", table);
}

//! Logs command - browse and prune the operator audit log

use anyhow::{anyhow, Result};
use chrono::{Local, TimeZone};
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Confirm;

use super::get_ops_dir;
use crate::output;
use clientops_core::services::logging::now_ms;
use clientops_core::services::{LogStats, Outcome};
use clientops_core::{LogEntry, LogFilter, LoggingService};

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

#[derive(Subcommand)]
pub enum LogsCommands {
    /// Show recent entries, newest first
    List {
        #[arg(short, long, default_value = "50")]
        limit: usize,
        /// Only failed operations
        #[arg(long, conflicts_with = "command")]
        failures: bool,
        /// Only entries written by this command (e.g. migrate)
        #[arg(long)]
        command: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete entries older than N days
    Clear {
        #[arg(long, default_value = "30")]
        older_than_days: u64,
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Entry counts and log file location
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn open_log() -> Result<LoggingService> {
    let ops_dir = get_ops_dir()?;
    std::fs::create_dir_all(&ops_dir)?;
    Ok(LoggingService::new(&ops_dir, env!("CARGO_PKG_VERSION"))?)
}

/// Unix ms `days` before `now`, rejecting spans that do not fit
fn cutoff_ms(now: i64, days: u64) -> Result<i64> {
    i64::try_from(days)
        .ok()
        .and_then(|d| d.checked_mul(DAY_MS))
        .and_then(|span| now.checked_sub(span))
        .ok_or_else(|| anyhow!("--older-than-days {} is out of range", days))
}

fn format_time(ms: i64) -> String {
    Local
        .timestamp_millis_opt(ms)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| ms.to_string())
}

fn outcome_cell(outcome: Outcome) -> String {
    match outcome {
        Outcome::Success => "ok".green().to_string(),
        Outcome::Failure => "failed".red().to_string(),
        Outcome::Info => String::new(),
    }
}

fn print_entries(entries: &[LogEntry]) {
    let mut table = output::create_table();
    table.set_header(vec!["Time", "Command", "Event", "Subject", "Rows", "Result"]);
    for entry in entries {
        table.add_row(vec![
            format_time(entry.logged_at),
            entry.command.clone().unwrap_or_default(),
            entry.event.clone(),
            entry.subject.clone().unwrap_or_default(),
            entry.rows_affected.map(|n| n.to_string()).unwrap_or_default(),
            outcome_cell(entry.outcome),
        ]);
    }
    println!("{}", table);

    let failures: Vec<&LogEntry> = entries
        .iter()
        .filter(|e| e.error_message.is_some())
        .take(3)
        .collect();
    if !failures.is_empty() {
        println!();
        println!("{}", "Latest failures:".red().bold());
        for entry in failures {
            println!(
                "  {} [{}] {}",
                format_time(entry.logged_at).dimmed(),
                entry.event,
                entry.error_message.as_deref().unwrap_or_default()
            );
        }
    }
}

fn print_stats(stats: &LogStats, log: &LoggingService) {
    let size = std::fs::metadata(log.db_path()).map(|m| m.len()).unwrap_or(0);

    println!("{}", "Audit log".bold());
    println!("  Entries:  {}", stats.total_entries);
    println!("  Failures: {}", stats.failures);
    if let (Some(oldest), Some(newest)) = (stats.oldest, stats.newest) {
        println!("  Span:     {} .. {}", format_time(oldest), format_time(newest));
    }
    println!("  File:     {} ({})", log.db_path().display(), output::format_size(size));
}

pub fn run(command: LogsCommands) -> Result<()> {
    let log = open_log()?;

    match command {
        LogsCommands::List { limit, failures, command, json } => {
            let filter = match (failures, command) {
                (true, _) => LogFilter::Failures,
                (false, Some(c)) => LogFilter::Command(c),
                (false, None) => LogFilter::All,
            };
            let entries = log.recent(&filter, limit)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if entries.is_empty() {
                output::info("No log entries found.");
            } else {
                print_entries(&entries);
            }
        }
        LogsCommands::Clear { older_than_days, force, json } => {
            if !force && !json {
                let confirmed = Confirm::new()
                    .with_prompt(format!("Delete log entries older than {} days?", older_than_days))
                    .default(false)
                    .interact()?;
                if !confirmed {
                    println!("Cancelled.");
                    return Ok(());
                }
            }

            let cutoff = cutoff_ms(now_ms(), older_than_days)?;
            let deleted = log.prune_before(cutoff)?;
            if json {
                println!("{}", serde_json::json!({ "deleted": deleted }));
            } else {
                output::success(&format!("Deleted {} log entries", deleted));
            }
        }
        LogsCommands::Stats { json } => {
            let stats = log.stats()?;
            if json {
                let mut value = serde_json::to_value(&stats)?;
                value["database_path"] = log.db_path().to_string_lossy().into();
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                print_stats(&stats, &log);
            }
        }
    }

    Ok(())
}

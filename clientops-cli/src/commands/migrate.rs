//! Migrate command - copy a table from the legacy store into the app store

use anyhow::Result;
use clientops_core::LogEvent;
use colored::Colorize;
use dialoguer::Confirm;

use super::{get_context, get_logger, log_event};
use crate::output;

pub fn run(table: &str, yes: bool, json: bool) -> Result<()> {
    let logger = get_logger();
    log_event(
        &logger,
        LogEvent::new("command_executed")
            .with_command("migrate")
            .with_subject(table),
    );

    let ctx = get_context()?;
    let source = ctx.legacy_db().to_path_buf();
    let target = ctx.app_db().to_path_buf();

    if !yes && !json {
        println!("{}", "Row migration".bold());
        println!("  Table:  {}", table);
        println!("  From:   {}", source.display());
        println!("  Into:   {}", target.display());
        output::warning("Rows are appended. Running this twice copies every row twice.");
        if !Confirm::new()
            .with_prompt("Start migration?")
            .default(false)
            .interact()?
        {
            println!("Cancelled.");
            return Ok(());
        }
    }

    match ctx.row_migrator.migrate_between(table, &source, &target) {
        Ok(report) => {
            log_event(
                &logger,
                LogEvent::new("migration_completed")
                    .with_command("migrate")
                    .with_subject(&report.table)
                    .with_rows_affected(report.rows_migrated)
                    .succeeded(),
            );
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                output::success(&format!(
                    "Migrated {} rows into {}",
                    report.rows_migrated, report.table
                ));
            }
            Ok(())
        }
        Err(e) => {
            log_event(
                &logger,
                LogEvent::new("migration_failed")
                    .with_command("migrate")
                    .with_subject(table)
                    .with_error(e.to_string()),
            );
            if e.row_index().is_some() && !json {
                output::info("No rows were kept; the target is unchanged.");
            }
            Err(e.into())
        }
    }
}

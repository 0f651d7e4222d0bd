//! Inspect command - list tables and columns of a store

use std::path::PathBuf;

use anyhow::{Context, Result};
use clientops_core::services::SchemaInspector;
use clientops_core::{DuckDbStore, LogEvent};
use colored::Colorize;

use super::{get_context, get_logger, log_event};
use crate::output;

pub fn run(db: &str, table: Option<&str>, json: bool) -> Result<()> {
    let logger = get_logger();
    log_event(&logger, LogEvent::new("command_executed").with_command("inspect"));

    let ctx = get_context()?;
    let path = match db {
        "app" => ctx.app_db().to_path_buf(),
        "legacy" => ctx.legacy_db().to_path_buf(),
        other => PathBuf::from(other),
    };

    let store = DuckDbStore::open_existing(&path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let tables = SchemaInspector::inspect(&store, table)?;
    drop(store);

    if json {
        println!("{}", serde_json::to_string_pretty(&tables)?);
        return Ok(());
    }

    if tables.is_empty() {
        output::info(&format!("No tables in {}", path.display()));
        return Ok(());
    }

    for info in &tables {
        println!("{}", info.name.bold());

        let mut grid = output::create_table();
        grid.set_header(vec!["#", "Column", "Type", "Nullable", "Default"]);
        for column in &info.columns {
            grid.add_row(vec![
                column.position.to_string(),
                column.name.clone(),
                column.data_type.clone(),
                if column.nullable { "yes" } else { "no" }.to_string(),
                output::or_null(column.default.as_deref()),
            ]);
        }
        println!("{}", grid);
        println!();
    }

    Ok(())
}

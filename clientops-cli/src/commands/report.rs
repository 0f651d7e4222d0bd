//! Report command - users and the clients they own

use anyhow::Result;
use clientops_core::services::ReportService;
use clientops_core::LogEvent;
use colored::Colorize;

use super::{get_context, get_logger, log_event};
use crate::output;

pub fn run(json: bool) -> Result<()> {
    let logger = get_logger();
    log_event(&logger, LogEvent::new("command_executed").with_command("report"));

    let ctx = get_context()?;
    let report = {
        let store = ctx.open_app_db()?;
        ReportService::users_with_clients(&store)?
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if report.is_empty() {
        output::info("No users found.");
        return Ok(());
    }

    for entry in &report {
        let user = &entry.user;
        println!(
            "{} {} ({})",
            format!("#{}", user.id).dimmed(),
            user.username.bold(),
            user.fullname.as_deref().unwrap_or("-")
        );
        if let Some(email) = &user.email {
            println!("  {}", email);
        }

        if entry.clients.is_empty() {
            println!("  {}", "No clients".dimmed());
            println!();
            continue;
        }

        let mut table = output::create_table();
        table.set_header(vec!["ID", "Name", "Email", "Phone"]);
        for client in &entry.clients {
            table.add_row(vec![
                client.id.to_string(),
                output::or_null(client.name.as_deref()),
                output::or_null(client.email.as_deref()),
                output::or_null(client.phone.as_deref()),
            ]);
        }
        println!("{}", table);
        println!();
    }

    Ok(())
}

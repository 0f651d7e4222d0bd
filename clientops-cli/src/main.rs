//! ClientOps CLI - maintenance tools for the clients application stores

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{inspect, login_check, logs, migrate, report, verify_password};

/// ClientOps - keep the clients application's data healthy
#[derive(Parser)]
#[command(name = "clientops", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a user's password and rehash it if it does not verify
    VerifyPassword {
        /// Account to check
        #[arg(default_value = "admin")]
        username: String,
        /// Expected password (prompted for when omitted)
        #[arg(long, env = "CLIENTOPS_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Copy a table from the legacy store into the application store
    Migrate {
        /// Table with a configured column mapping
        #[arg(default_value = "paiements")]
        table: String,
        /// Skip confirmation prompt
        #[arg(long, short)]
        yes: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List tables and their columns
    Inspect {
        /// Store to inspect: app, legacy, or a file path
        #[arg(long, default_value = "app")]
        db: String,
        /// Only show this table
        #[arg(long)]
        table: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show every user with the clients they own
    Report {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Send one login request to the running application
    LoginCheck {
        /// Login endpoint (defaults to the configured URL)
        #[arg(long)]
        url: Option<String>,
        #[arg(long, default_value = "admin")]
        username: String,
        /// Password to send (prompted for when omitted)
        #[arg(long, env = "CLIENTOPS_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// View and manage operator logs
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = run(cli);

    match result {
        Ok(code) => code,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::VerifyPassword { username, password, json } => {
            verify_password::run(&username, password, json)?
        }
        Commands::Migrate { table, yes, json } => migrate::run(&table, yes, json)?,
        Commands::Inspect { db, table, json } => inspect::run(&db, table.as_deref(), json)?,
        Commands::Report { json } => report::run(json)?,
        Commands::LoginCheck { url, username, password, json } => {
            return login_check::run(url.as_deref(), &username, password, json);
        }
        Commands::Logs { command } => logs::run(command)?,
    }
    Ok(ExitCode::SUCCESS)
}
